use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Message, Profile, Subscription};

/// Errors that can occur when reading or writing registry data
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),
}

/// Registry persistence
///
/// Every operation works on whole profile values: updates build a new `Profile`
/// and save it, nothing is patched in place. `list_profiles` returns members in
/// registration order. Emails are unique across members, ignoring case.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch one profile, `NotFound` if absent
    async fn get_profile(&self, id: &str) -> Result<Profile, StoreError>;

    /// Insert or replace a profile; a replaced profile keeps its registration position.
    /// `Conflict` if another member already uses the email.
    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError>;

    /// All registry members in registration order
    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError>;

    /// Append profiles whose ids and emails are not registered yet, returns how many were added
    async fn merge_profiles(&self, profiles: &[Profile]) -> Result<usize, StoreError>;

    /// Remove a profile with its likes and messages, returns false if it did not exist
    async fn delete_profile(&self, id: &str) -> Result<bool, StoreError>;

    /// Record that `liker_id` likes `liked_id`, returns false if already recorded
    async fn add_like(&self, liker_id: &str, liked_id: &str) -> Result<bool, StoreError>;

    /// Profiles that liked `id`, oldest like first
    async fn likes_received(&self, id: &str) -> Result<Vec<Profile>, StoreError>;

    /// Profiles `id` has liked, oldest like first
    async fn likes_sent(&self, id: &str) -> Result<Vec<Profile>, StoreError>;

    async fn send_message(&self, message: &Message) -> Result<(), StoreError>;

    /// Messages exchanged between two members in either direction, oldest first
    async fn conversation(&self, a: &str, b: &str) -> Result<Vec<Message>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;

    /// Record `reference` as spent by `profile_id`, returns false if it was already spent
    async fn claim_payment_reference(
        &self,
        reference: &str,
        profile_id: &str,
    ) -> Result<bool, StoreError>;

    /// Member registered under `email` (case-insensitive)
    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, StoreError> {
        Ok(self
            .list_profiles()
            .await?
            .into_iter()
            .find(|p| has_email(p, email)))
    }

    async fn set_verified(&self, id: &str, verified: bool) -> Result<Profile, StoreError> {
        let updated = self.get_profile(id).await?.with_verified(verified);
        self.save_profile(&updated).await?;
        Ok(updated)
    }

    async fn activate_subscription(
        &self,
        id: &str,
        subscription: Subscription,
    ) -> Result<Profile, StoreError> {
        let updated = self.get_profile(id).await?.with_subscription(subscription);
        self.save_profile(&updated).await?;
        Ok(updated)
    }
}

fn has_email(profile: &Profile, email: &str) -> bool {
    profile
        .email
        .as_deref()
        .is_some_and(|e| e.eq_ignore_ascii_case(email))
}

#[derive(Debug, Default)]
struct Registry {
    profiles: Vec<Profile>,
    likes: Vec<(String, String)>,
    messages: Vec<Message>,
    payment_references: HashMap<String, String>,
}

impl Registry {
    fn email_taken(&self, profile: &Profile) -> bool {
        profile.email.as_deref().is_some_and(|email| {
            self.profiles
                .iter()
                .any(|p| p.id != profile.id && has_email(p, email))
        })
    }

    fn profiles_by_ids<'a>(&self, ids: impl Iterator<Item = &'a String>) -> Vec<Profile> {
        ids.filter_map(|id| self.profiles.iter().find(|p| &p.id == id))
            .cloned()
            .collect()
    }
}

/// Process-local store for tests and single-node development
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Registry>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `profiles` in the given order
    pub fn with_profiles(profiles: Vec<Profile>) -> Self {
        Self {
            inner: RwLock::new(Registry {
                profiles,
                ..Registry::default()
            }),
        }
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn get_profile(&self, id: &str) -> Result<Profile, StoreError> {
        self.inner
            .read()
            .await
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found: {}", id)))
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StoreError> {
        let mut registry = self.inner.write().await;
        if registry.email_taken(profile) {
            return Err(StoreError::Conflict(format!(
                "Email already registered to another member: {}",
                profile.email.as_deref().unwrap_or_default()
            )));
        }
        match registry.profiles.iter_mut().find(|p| p.id == profile.id) {
            Some(existing) => *existing = profile.clone(),
            None => registry.profiles.push(profile.clone()),
        }
        Ok(())
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        Ok(self.inner.read().await.profiles.clone())
    }

    async fn merge_profiles(&self, profiles: &[Profile]) -> Result<usize, StoreError> {
        let mut registry = self.inner.write().await;
        let mut added = 0;
        for profile in profiles {
            if registry.profiles.iter().any(|p| p.id == profile.id) {
                continue;
            }
            if registry.email_taken(profile) {
                tracing::warn!("Skipping import of {}, email already registered", profile.id);
                continue;
            }
            registry.profiles.push(profile.clone());
            added += 1;
        }
        Ok(added)
    }

    async fn delete_profile(&self, id: &str) -> Result<bool, StoreError> {
        let mut registry = self.inner.write().await;
        let before = registry.profiles.len();
        registry.profiles.retain(|p| p.id != id);
        registry
            .likes
            .retain(|(liker, liked)| liker != id && liked != id);
        registry
            .messages
            .retain(|m| m.sender_id != id && m.recipient_id != id);
        Ok(registry.profiles.len() < before)
    }

    async fn add_like(&self, liker_id: &str, liked_id: &str) -> Result<bool, StoreError> {
        let mut registry = self.inner.write().await;
        if registry
            .likes
            .iter()
            .any(|(liker, liked)| liker == liker_id && liked == liked_id)
        {
            return Ok(false);
        }
        registry
            .likes
            .push((liker_id.to_string(), liked_id.to_string()));
        Ok(true)
    }

    async fn likes_received(&self, id: &str) -> Result<Vec<Profile>, StoreError> {
        let registry = self.inner.read().await;
        let likers = registry
            .likes
            .iter()
            .filter(|(_, liked)| liked == id)
            .map(|(liker, _)| liker);
        Ok(registry.profiles_by_ids(likers))
    }

    async fn likes_sent(&self, id: &str) -> Result<Vec<Profile>, StoreError> {
        let registry = self.inner.read().await;
        let liked = registry
            .likes
            .iter()
            .filter(|(liker, _)| liker == id)
            .map(|(_, liked)| liked);
        Ok(registry.profiles_by_ids(liked))
    }

    async fn send_message(&self, message: &Message) -> Result<(), StoreError> {
        self.inner.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn conversation(&self, a: &str, b: &str) -> Result<Vec<Message>, StoreError> {
        let registry = self.inner.read().await;
        let mut messages: Vec<Message> = registry
            .messages
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b) || (m.sender_id == b && m.recipient_id == a)
            })
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.timestamp);
        Ok(messages)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }

    async fn claim_payment_reference(
        &self,
        reference: &str,
        profile_id: &str,
    ) -> Result<bool, StoreError> {
        let mut registry = self.inner.write().await;
        if registry.payment_references.contains_key(reference) {
            return Ok(false);
        }
        registry
            .payment_references
            .insert(reference.to_string(), profile_id.to_string());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_member(id: &str, email: &str) -> Profile {
        Profile::builder(id, format!("Member {}", id), 30)
            .email(email)
            .build()
    }

    fn subscription() -> Subscription {
        Subscription {
            date: Utc::now(),
            amount_usd: 7.0,
            period: "Custom".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_preserves_registration_order() {
        let store = InMemoryStore::new();
        store.save_profile(&create_member("a", "a@knot.app")).await.unwrap();
        store.save_profile(&create_member("b", "b@knot.app")).await.unwrap();

        let renamed = Profile {
            name: "Renamed".to_string(),
            ..create_member("a", "a@knot.app")
        };
        store.save_profile(&renamed).await.unwrap();

        let ids: Vec<_> = store.list_profiles().await.unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(store.get_profile("a").await.unwrap().name, "Renamed");
    }

    #[tokio::test]
    async fn test_get_missing_profile() {
        let store = InMemoryStore::new();
        assert!(matches!(
            store.get_profile("ghost").await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_merge_skips_known_ids() {
        let store = InMemoryStore::with_profiles(vec![create_member("a", "a@knot.app")]);

        let added = store
            .merge_profiles(&[create_member("a", "dup@knot.app"), create_member("c", "c@knot.app")])
            .await
            .unwrap();

        assert_eq!(added, 1);
        let profiles = store.list_profiles().await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].email.as_deref(), Some("a@knot.app"));
    }

    #[tokio::test]
    async fn test_likes_are_idempotent() {
        let store = InMemoryStore::with_profiles(vec![
            create_member("a", "a@knot.app"),
            create_member("b", "b@knot.app"),
        ]);

        assert!(store.add_like("a", "b").await.unwrap());
        assert!(!store.add_like("a", "b").await.unwrap());

        let received = store.likes_received("b").await.unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].id, "a");
        assert_eq!(store.likes_sent("a").await.unwrap()[0].id, "b");
    }

    #[tokio::test]
    async fn test_delete_removes_likes_and_messages() {
        let store = InMemoryStore::with_profiles(vec![
            create_member("a", "a@knot.app"),
            create_member("b", "b@knot.app"),
        ]);
        store.add_like("a", "b").await.unwrap();
        store.send_message(&Message::new("a", "b", "Hello")).await.unwrap();
        store.send_message(&Message::new("b", "a", "Hi!")).await.unwrap();

        assert!(store.delete_profile("a").await.unwrap());
        assert!(!store.delete_profile("a").await.unwrap());
        assert!(store.likes_received("b").await.unwrap().is_empty());
        assert!(store.conversation("a", "b").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_email_is_unique_ignoring_case() {
        let store = InMemoryStore::with_profiles(vec![
            create_member("victim", "ada@knot.app"),
            create_member("attacker", "mallory@knot.app"),
        ]);

        let hijack = create_member("attacker", "ADA@knot.app");
        assert!(matches!(
            store.save_profile(&hijack).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(
            store.get_profile("attacker").await.unwrap().email.as_deref(),
            Some("mallory@knot.app")
        );

        // re-saving your own email is fine
        store.save_profile(&create_member("victim", "Ada@knot.app")).await.unwrap();

        let added = store
            .merge_profiles(&[create_member("imported", "ada@knot.app")])
            .await
            .unwrap();
        assert_eq!(added, 0);
    }

    #[tokio::test]
    async fn test_payment_reference_is_single_use() {
        let store = InMemoryStore::new();

        assert!(store.claim_payment_reference("ref_1", "a").await.unwrap());
        assert!(!store.claim_payment_reference("ref_1", "b").await.unwrap());
        assert!(store.claim_payment_reference("ref_2", "b").await.unwrap());
    }

    #[tokio::test]
    async fn test_conversation_both_directions() {
        let store = InMemoryStore::new();
        store.send_message(&Message::new("a", "b", "Hello")).await.unwrap();
        store.send_message(&Message::new("b", "a", "Hi!")).await.unwrap();
        store.send_message(&Message::new("a", "c", "Elsewhere")).await.unwrap();

        let messages = store.conversation("b", "a").await.unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].text, "Hello");
        assert_eq!(messages[1].text, "Hi!");
    }

    #[tokio::test]
    async fn test_set_verified_builds_new_profile() {
        let store = InMemoryStore::with_profiles(vec![create_member("a", "a@knot.app")]);

        let updated = store.set_verified("a", true).await.unwrap();

        assert!(updated.is_verified);
        assert!(store.get_profile("a").await.unwrap().is_verified);
    }

    #[tokio::test]
    async fn test_find_by_email_and_activate() {
        let store = InMemoryStore::with_profiles(vec![create_member("a", "Ada@Knot.app")]);

        let member = store
            .find_by_email("ada@knot.app")
            .await
            .unwrap()
            .expect("member should exist");
        let updated = store.activate_subscription(&member.id, subscription()).await.unwrap();
        assert!(updated.is_premium);
        assert!(store.get_profile("a").await.unwrap().is_premium);

        assert!(store.find_by_email("nobody@knot.app").await.unwrap().is_none());
    }
}
