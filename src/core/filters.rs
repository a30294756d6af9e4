use crate::models::{AdminTab, FilterCriteria, Profile, RegistryStats};

/// Check if a profile's age falls in the inclusive range
///
/// An inverted range (min > max) matches nothing; bounds are validated upstream.
#[inline]
pub fn matches_age_range(profile: &Profile, min_age: u8, max_age: u8) -> bool {
    profile.age >= min_age && profile.age <= max_age
}

/// Case-insensitive substring match of `query` against city or country
///
/// A blank query matches every profile.
#[inline]
pub fn matches_location(profile: &Profile, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return true;
    }

    let query = query.to_lowercase();
    profile.city.to_lowercase().contains(&query) || profile.country.to_lowercase().contains(&query)
}

/// Verified-only predicate; always true when the filter is off
#[inline]
pub fn matches_verified(profile: &Profile, verified_only: bool) -> bool {
    !verified_only || profile.is_verified
}

/// All registry filter predicates at once
#[inline]
pub fn matches_criteria(profile: &Profile, criteria: &FilterCriteria) -> bool {
    matches_age_range(profile, criteria.min_age, criteria.max_age)
        && matches_location(profile, &criteria.location)
        && matches_verified(profile, criteria.verified_only)
}

/// Filter a candidate list, preserving input order
pub fn filter_candidates(candidates: &[Profile], criteria: &FilterCriteria) -> Vec<Profile> {
    candidates
        .iter()
        .filter(|profile| matches_criteria(profile, criteria))
        .cloned()
        .collect()
}

/// Free-text registry search over the descriptive fields of each profile
///
/// Matches name, occupation, city, country, cultural background or origin
/// country case-insensitively. A blank query returns everything.
pub fn search_registry(query: &str, candidates: &[Profile]) -> Vec<Profile> {
    let query = query.trim();
    if query.is_empty() {
        return candidates.to_vec();
    }

    let q = query.to_lowercase();
    let contains = |field: &str| field.to_lowercase().contains(&q);

    candidates
        .iter()
        .filter(|m| {
            contains(&m.name)
                || contains(&m.occupation)
                || contains(&m.city)
                || contains(&m.country)
                || m.cultural_background.as_deref().is_some_and(contains)
                || m.origin_country.as_deref().is_some_and(contains)
        })
        .cloned()
        .collect()
}

/// Admin listing: tab predicate plus search over name, occupation and email
pub fn filter_members(members: &[Profile], tab: AdminTab, query: &str) -> Vec<Profile> {
    let q = query.trim().to_lowercase();

    members
        .iter()
        .filter(|m| match tab {
            AdminTab::All => true,
            AdminTab::Pending => !m.is_verified,
            AdminTab::Verified => m.is_verified,
            AdminTab::Subscribers => m.is_premium,
        })
        .filter(|m| {
            q.is_empty()
                || m.name.to_lowercase().contains(&q)
                || m.occupation.to_lowercase().contains(&q)
                || m.email.as_deref().is_some_and(|e| e.to_lowercase().contains(&q))
        })
        .cloned()
        .collect()
}

/// Moderation counters over the whole registry
pub fn registry_stats(members: &[Profile]) -> RegistryStats {
    let verified = members.iter().filter(|m| m.is_verified).count();

    RegistryStats {
        total: members.len(),
        pending: members.len() - verified,
        verified,
        subscribers: members.iter().filter(|m| m.is_premium).count(),
        total_revenue_usd: members
            .iter()
            .filter_map(|m| m.subscription.as_ref())
            .map(|s| s.amount_usd)
            .sum(),
    }
}
