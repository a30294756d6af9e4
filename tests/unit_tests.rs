// Unit tests for the Knot registry core

use knot_registry::core::{
    filters::{filter_candidates, matches_age_range, matches_location},
    ranker::{rank_candidates, Ranker},
    scoring::{calculate_match_score, compatibility, count_shared_values},
};
use knot_registry::models::{
    ChildrenPreference, FilterCriteria, MarriageTimeline, MatchReason, Profile, SmokingHabit,
};
use knot_registry::services::{InMemoryStore, ProfileStore};

fn create_full_profile(id: &str) -> Profile {
    Profile::builder(id, format!("Member {}", id), 30)
        .residence("USA", "New York", "NYC")
        .origin("Italy", "Lazio", "Rome")
        .marriage_timeline(MarriageTimeline::OneToTwoYears)
        .personal_values(["Honesty", "Family", "Faith", "Ambition"])
        .religion("Christian")
        .cultural_background("Italian")
        .children_preference(ChildrenPreference::WantsChildren)
        .smoking(SmokingHabit::NonSmoker)
        .build()
}

fn create_disjoint_profiles() -> (Profile, Profile) {
    let viewer = Profile::builder("a", "Amaka", 29)
        .residence("Nigeria", "Lagos", "Ikeja")
        .origin("Nigeria", "Anambra", "Onitsha")
        .marriage_timeline(MarriageTimeline::Asap)
        .personal_values(["Honesty"])
        .religion("Christian")
        .cultural_background("Igbo")
        .children_preference(ChildrenPreference::WantsChildren)
        .smoking(SmokingHabit::NonSmoker)
        .build();

    let candidate = Profile::builder("b", "Bilal", 31)
        .residence("United Kingdom", "England", "London")
        .origin("Pakistan", "Punjab", "Lahore")
        .marriage_timeline(MarriageTimeline::ThreePlusYears)
        .personal_values(["Adventure"])
        .religion("Muslim")
        .cultural_background("Punjabi")
        .children_preference(ChildrenPreference::OpenToChildren)
        .smoking(SmokingHabit::Occasional)
        .build();

    (viewer, candidate)
}

#[test]
fn test_self_comparison_clamps_to_100() {
    let profile = create_full_profile("self");
    let copy = profile.clone();

    assert_eq!(calculate_match_score(&profile, &copy), 100);
}

#[test]
fn test_disjoint_profiles_score_baseline() {
    let (viewer, candidate) = create_disjoint_profiles();

    assert_eq!(calculate_match_score(&viewer, &candidate), 50);
    assert_eq!(calculate_match_score(&candidate, &viewer), 50);
}

#[test]
fn test_score_always_in_range() {
    let (a, b) = create_disjoint_profiles();
    let profiles = vec![
        Profile::default(),
        Profile::builder("bare", "Bare", 40).build(),
        create_full_profile("full"),
        a,
        b,
    ];

    for p in &profiles {
        for q in &profiles {
            let score = calculate_match_score(p, q);
            assert!(score <= 100, "score {} out of range", score);
            assert!(score >= 50, "no attribute can lower the baseline, got {}", score);
        }
    }
}

#[test]
fn test_shared_values_progression() {
    let (viewer, candidate) = create_disjoint_profiles();
    let pool = ["Honesty", "Family", "Faith", "Kindness", "Loyalty", "Respect"];

    for n in 0..=pool.len() {
        let viewer = Profile {
            personal_values: pool.iter().map(|v| v.to_string()).collect(),
            ..viewer.clone()
        };
        let candidate = Profile {
            personal_values: pool[..n].iter().rev().map(|v| v.to_string()).collect(),
            ..candidate.clone()
        };

        let expected = 50 + (5 * n as u8).min(20);
        assert_eq!(
            calculate_match_score(&viewer, &candidate),
            expected,
            "{} shared values",
            n
        );
    }
}

#[test]
fn test_shared_values_ignore_order_and_duplicates() {
    let a = vec!["Faith".to_string(), "Family".to_string(), "Faith".to_string()];
    let b = vec!["Family".to_string(), "Faith".to_string(), "Family".to_string()];

    assert_eq!(count_shared_values(&a, &b), 2);
    assert_eq!(count_shared_values(&b, &a), 2);
}

#[test]
fn test_city_bonus_requires_matching_country() {
    let viewer = Profile::builder("a", "A", 30)
        .residence("France", "Ile-de-France", "Paris")
        .build();
    let candidate = Profile::builder("b", "B", 30)
        .residence("USA", "Texas", "Paris")
        .build();

    assert_eq!(calculate_match_score(&viewer, &candidate), 50);
}

#[test]
fn test_residence_and_heritage_are_exclusive() {
    let viewer = create_full_profile("a");
    let candidate = Profile::builder("b", "B", 30)
        .residence("USA", "New York", "NYC")
        .origin("Italy", "Lazio", "Rome")
        .build();

    // 15 country + 10 city, the shared origin adds nothing on top
    assert_eq!(calculate_match_score(&viewer, &candidate), 75);
}

#[test]
fn test_end_to_end_scenario_clamps() {
    let viewer = Profile::builder("self", "Self", 30)
        .residence("USA", "New York", "NYC")
        .marriage_timeline("1-2 years")
        .personal_values(["Honesty", "Family"])
        .religion("Christian")
        .cultural_background("Italian")
        .children_preference(ChildrenPreference::WantsChildren)
        .smoking(SmokingHabit::NonSmoker)
        .build();
    let candidate = Profile::builder("cand", "Candidate", 31)
        .residence("USA", "New York", "NYC")
        .marriage_timeline("1-2 years")
        .personal_values(["Honesty", "Ambition"])
        .religion("Christian")
        .cultural_background("Korean")
        .children_preference(ChildrenPreference::WantsChildren)
        .smoking(SmokingHabit::Occasional)
        .build();

    // 50 + 25 + 25 + 5 + 10 + 10 = 125
    let result = compatibility(&viewer, &candidate);
    assert_eq!(result.score, 100);
    assert_eq!(result.top_reason, MatchReason::LocalProximity);
    assert_eq!(
        result.insight,
        "Exceptional alignment based on local proximity and lifestyle sync."
    );
}

#[test]
fn test_rank_is_stable_for_ties() {
    let viewer = create_full_profile("viewer");
    let candidates: Vec<Profile> = ["first", "second", "third"]
        .iter()
        .map(|id| Profile::builder(*id, *id, 30).build())
        .chain(std::iter::once(create_full_profile("best")))
        .collect();

    let ids: Vec<String> = rank_candidates(&viewer, candidates)
        .into_iter()
        .map(|c| c.profile.id)
        .collect();

    assert_eq!(ids, vec!["best", "first", "second", "third"]);
}

#[test]
fn test_empty_location_equals_disabled_filter() {
    let candidates = vec![
        Profile::builder("1", "One", 28).located("Lagos", "Nigeria").build(),
        Profile::builder("2", "Two", 30).build(),
        Profile::builder("3", "Three", 33).located("Accra", "Ghana").build(),
        Profile::builder("4", "Four", 52).located("Lagos", "Nigeria").build(),
    ];
    let without_location: Vec<Profile> = candidates
        .iter()
        .filter(|p| matches_age_range(p, 25, 35))
        .cloned()
        .collect();

    for query in ["", "   "] {
        let criteria = FilterCriteria {
            location: query.to_string(),
            ..FilterCriteria::default()
        };
        assert_eq!(filter_candidates(&candidates, &criteria), without_location);
    }
    assert!(candidates.iter().all(|p| matches_location(p, "")));
}

#[test]
fn test_discover_over_stored_registry() {
    let viewer = create_full_profile("viewer");
    let store = InMemoryStore::with_profiles(vec![
        viewer.clone(),
        Profile::builder("plain", "Plain", 30).build(),
        create_full_profile("twin"),
        Profile::builder("young", "Young", 19).build(),
    ]);

    let candidates = tokio_test::block_on(store.list_profiles()).unwrap();
    let result = Ranker::default().discover(&viewer, candidates, &FilterCriteria::default(), 10);

    let ids: Vec<&str> = result.matches.iter().map(|c| c.profile.id.as_str()).collect();
    assert_eq!(ids, vec!["twin", "plain"]);
    assert_eq!(result.total_candidates, 3);
    assert_eq!(result.matches[0].compatibility_score, 100);
}
