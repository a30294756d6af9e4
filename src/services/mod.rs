// Service exports
pub mod cache;
pub mod paystack;
pub mod postgres;
pub mod store;

pub use cache::{CacheError, CacheKey, CacheManager};
pub use paystack::{PaystackClient, PaystackError, TransactionVerification, WebhookEvent};
pub use postgres::PostgresStore;
pub use store::{InMemoryStore, ProfileStore, StoreError};
