// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    AdminTab, ChildrenPreference, Compatibility, DrinkingHabit, FilterCriteria, MaritalStatus,
    MarriageTimeline, MatchReason, Message, Profile, ProfileBuilder, RegistryStats,
    ScoredCandidate, SmokingHabit, Subscription, WillingToRelocate,
};
pub use requests::{
    CompatibilityRequest, CurrencyQuery, DiscoverQuery, LikeRequest, MemberListQuery, SearchQuery,
    SendMessageRequest, VerifyPaymentRequest,
};
pub use responses::{
    ConversationResponse, CurrencyResponse, ErrorResponse, HealthResponse, LikesResponse,
    PaymentResponse, RankedProfilesResponse,
};
