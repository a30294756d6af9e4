// Core algorithm exports
pub mod currency;
pub mod filters;
pub mod ranker;
pub mod scoring;

pub use currency::{format_local_price, get_currency_for_country, CurrencyInfo};
pub use filters::{filter_candidates, filter_members, matches_criteria, registry_stats, search_registry};
pub use ranker::{rank_candidates, RankResult, Ranker};
pub use scoring::{calculate_match_score, compatibility};
