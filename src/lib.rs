//! Knot Registry - compatibility scoring and registry service for the Knot matchmaking app
//!
//! The core is a pure, synchronous scorer and filter/rank pipeline. Around it sit an
//! actix-web service, a pluggable `ProfileStore`, an optional Redis-backed profile cache
//! and the Paystack payment integration.

pub mod auth;
pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{calculate_match_score, compatibility, filter_candidates, rank_candidates, Ranker};
pub use error::ApiError;
pub use models::{Compatibility, FilterCriteria, MarriageTimeline, Profile, ScoredCandidate};
