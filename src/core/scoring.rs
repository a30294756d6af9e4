use crate::models::{Compatibility, MatchReason, Profile};
use std::collections::HashSet;

/// Neutral starting score before any bonus
const BASELINE: i32 = 50;

const RESIDENCE_COUNTRY_BONUS: i32 = 15;
const RESIDENCE_CITY_BONUS: i32 = 10;
const ORIGIN_COUNTRY_BONUS: i32 = 10;

const TIMELINE_EXACT_BONUS: i32 = 25;
const TIMELINE_ADJACENT_BONUS: i32 = 10;

const SHARED_VALUE_POINTS: i32 = 5;
const SHARED_VALUES_CAP: i32 = 20;

const RELIGION_BONUS: i32 = 10;
const CULTURE_BONUS: i32 = 5;

const CHILDREN_BONUS: i32 = 10;
const SMOKING_BONUS: i32 = 5;

/// Insight wording switches to "exceptional" above this score
const EXCEPTIONAL_THRESHOLD: u8 = 80;

/// Calculate a compatibility score (0-100) between two profiles
///
/// Scoring formula:
/// score = clamp(
///     50                           # neutral baseline
///     + location   (max 25)        # residence country 15 (+ city 10), else origin country 10
///     + timeline   (max 25)        # exact 25, adjacent rung 10
///     + values     (max 20)        # 5 per shared personal value
///     + religion   (max 15)        # religion 10, cultural background 5
///     + lifestyle  (max 15)        # children preference 10, smoking 5
/// , 0, 100)
///
/// The raw total can reach 150, so the clamp is routinely hit by close matches.
/// Missing attributes never match and contribute nothing; the function cannot fail.
pub fn calculate_match_score(viewer: &Profile, candidate: &Profile) -> u8 {
    let total = BASELINE
        + location_score(viewer, candidate)
        + timeline_score(viewer, candidate)
        + shared_values_score(viewer, candidate)
        + religion_score(viewer, candidate)
        + lifestyle_score(viewer, candidate);

    total.clamp(0, 100) as u8
}

/// Score plus the headline reason and insight text shown on match cards
pub fn compatibility(viewer: &Profile, candidate: &Profile) -> Compatibility {
    let score = calculate_match_score(viewer, candidate);
    let top_reason = top_reason(viewer, candidate);

    let insight = if score > EXCEPTIONAL_THRESHOLD {
        format!(
            "Exceptional alignment based on {} and lifestyle sync.",
            top_reason.label()
        )
    } else {
        format!(
            "Compatible foundation with strong potential in {}.",
            top_reason.label()
        )
    };

    Compatibility {
        score,
        top_reason,
        insight,
    }
}

/// Pick the most notable thing two profiles have in common
///
/// Checked in priority order; the city check deliberately ignores country.
pub fn top_reason(viewer: &Profile, candidate: &Profile) -> MatchReason {
    if same(&viewer.residence_city, &candidate.residence_city) {
        MatchReason::LocalProximity
    } else if same(&viewer.origin_country, &candidate.origin_country) {
        MatchReason::CommonHeritage
    } else if same(&viewer.marriage_timeline, &candidate.marriage_timeline) {
        MatchReason::AlignedMarriageGoals
    } else {
        MatchReason::SharedValues
    }
}

/// Both present and equal. An absent value never matches.
#[inline]
fn same<T: PartialEq>(a: &Option<T>, b: &Option<T>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if a == b)
}

/// Location score (0-25)
/// Residence bonus and heritage fallback are mutually exclusive
#[inline]
fn location_score(viewer: &Profile, candidate: &Profile) -> i32 {
    if same(&viewer.residence_country, &candidate.residence_country) {
        let mut points = RESIDENCE_COUNTRY_BONUS;
        if same(&viewer.residence_city, &candidate.residence_city) {
            points += RESIDENCE_CITY_BONUS;
        }
        points
    } else if same(&viewer.origin_country, &candidate.origin_country) {
        ORIGIN_COUNTRY_BONUS
    } else {
        0
    }
}

/// Timeline score (0-25)
#[inline]
fn timeline_score(viewer: &Profile, candidate: &Profile) -> i32 {
    match (&viewer.marriage_timeline, &candidate.marriage_timeline) {
        (Some(a), Some(b)) if a == b => TIMELINE_EXACT_BONUS,
        (Some(a), Some(b)) if a.is_adjacent_to(b) => TIMELINE_ADJACENT_BONUS,
        _ => 0,
    }
}

/// Shared personal values score (0-20)
/// Values are compared as sets, so order and duplicates do not matter
#[inline]
fn shared_values_score(viewer: &Profile, candidate: &Profile) -> i32 {
    let shared = count_shared_values(&viewer.personal_values, &candidate.personal_values);
    i32::try_from(shared)
        .unwrap_or(i32::MAX)
        .saturating_mul(SHARED_VALUE_POINTS)
        .min(SHARED_VALUES_CAP)
}

/// Number of distinct values present in both lists
pub fn count_shared_values(a: &[String], b: &[String]) -> usize {
    let a: HashSet<&str> = a.iter().map(String::as_str).collect();
    let b: HashSet<&str> = b.iter().map(String::as_str).collect();
    a.intersection(&b).count()
}

/// Religion and culture score (0-15)
#[inline]
fn religion_score(viewer: &Profile, candidate: &Profile) -> i32 {
    let mut points = 0;
    if same(&viewer.religion, &candidate.religion) {
        points += RELIGION_BONUS;
    }
    if same(&viewer.cultural_background, &candidate.cultural_background) {
        points += CULTURE_BONUS;
    }
    points
}

/// Lifestyle score (0-15)
#[inline]
fn lifestyle_score(viewer: &Profile, candidate: &Profile) -> i32 {
    let mut points = 0;
    if same(&viewer.children_preference, &candidate.children_preference) {
        points += CHILDREN_BONUS;
    }
    if same(&viewer.smoking, &candidate.smoking) {
        points += SMOKING_BONUS;
    }
    points
}
