use crate::models::{FilterCriteria, Profile, ScoredCandidate};
use crate::core::{
    filters::{filter_candidates, search_registry},
    scoring::compatibility,
};

/// Result of a discovery pass
#[derive(Debug)]
pub struct RankResult {
    pub matches: Vec<ScoredCandidate>,
    pub total_candidates: usize,
}

/// Registry ranking orchestrator
///
/// # Pipeline Stages
/// 1. Exclude the viewer
/// 2. Registry filters (age, location, verified-only)
/// 3. Compatibility scoring
/// 4. Stable score-descending sort and limit
#[derive(Debug, Clone)]
pub struct Ranker {
    default_limit: usize,
    max_limit: usize,
}

impl Ranker {
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        Self {
            default_limit,
            max_limit: max_limit.max(1),
        }
    }

    /// Resolve a requested page size against the configured bounds
    pub fn page_size(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).clamp(1, self.max_limit)
    }

    /// Discover matches for `viewer`
    ///
    /// # Arguments
    /// * `viewer` - The signed-in member
    /// * `candidates` - Registry members in registration order
    /// * `criteria` - Filter surface input
    /// * `limit` - Maximum number of matches to return
    pub fn discover(
        &self,
        viewer: &Profile,
        candidates: Vec<Profile>,
        criteria: &FilterCriteria,
        limit: usize,
    ) -> RankResult {
        let candidates: Vec<Profile> = candidates
            .into_iter()
            .filter(|profile| profile.id != viewer.id)
            .collect();
        let total_candidates = candidates.len();

        let mut matches = rank_candidates(viewer, filter_candidates(&candidates, criteria));
        matches.truncate(limit);

        RankResult {
            matches,
            total_candidates,
        }
    }

    /// Free-text search, ranked by compatibility
    pub fn search(
        &self,
        viewer: &Profile,
        query: &str,
        candidates: Vec<Profile>,
        limit: usize,
    ) -> RankResult {
        let candidates: Vec<Profile> = candidates
            .into_iter()
            .filter(|profile| profile.id != viewer.id)
            .collect();
        let total_candidates = candidates.len();

        let mut matches = rank_candidates(viewer, search_registry(query, &candidates));
        matches.truncate(limit);

        RankResult {
            matches,
            total_candidates,
        }
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(20, 100)
    }
}

/// Annotate each candidate with its compatibility and sort best first
///
/// The sort is stable: equal scores keep their input order, so newest-first
/// or registration order survives among ties.
pub fn rank_candidates(viewer: &Profile, candidates: Vec<Profile>) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .into_iter()
        .map(|profile| {
            let result = compatibility(viewer, &profile);
            ScoredCandidate {
                profile,
                compatibility_score: result.score,
                compatibility_insight: result.insight,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarriageTimeline;

    fn create_viewer() -> Profile {
        Profile::builder("viewer", "Viewer", 30)
            .located("Lagos", "Nigeria")
            .residence("Nigeria", "Lagos", "Lagos")
            .marriage_timeline(MarriageTimeline::Asap)
            .religion("Muslim")
            .build()
    }

    fn create_candidate(id: &str, age: u8, country: &str, verified: bool) -> Profile {
        Profile::builder(id, format!("User {}", id), age)
            .located("Somewhere", country)
            .residence(country, "", "Somewhere")
            .verified(verified)
            .build()
    }

    fn wide_criteria() -> FilterCriteria {
        FilterCriteria {
            min_age: 18,
            max_age: 99,
            ..FilterCriteria::default()
        }
    }

    #[test]
    fn test_rank_sorted_by_score() {
        let viewer = create_viewer();
        let candidates = vec![
            create_candidate("far", 30, "Canada", true),
            create_candidate("near", 30, "Nigeria", true),
        ];

        let ranked = rank_candidates(&viewer, candidates);

        assert_eq!(ranked[0].profile.id, "near");
        assert!(ranked[0].compatibility_score > ranked[1].compatibility_score);
    }

    #[test]
    fn test_rank_is_stable() {
        let viewer = create_viewer();
        let candidates: Vec<Profile> = ["a", "b", "c", "d"]
            .iter()
            .map(|id| create_candidate(id, 30, "Canada", true))
            .collect();

        let ranked = rank_candidates(&viewer, candidates);
        let ids: Vec<_> = ranked.iter().map(|m| m.profile.id.as_str()).collect();

        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_discover_excludes_viewer() {
        let ranker = Ranker::default();
        let viewer = create_viewer();
        let candidates = vec![viewer.clone(), create_candidate("1", 30, "Ghana", false)];

        let result = ranker.discover(&viewer, candidates, &wide_criteria(), 10);

        assert_eq!(result.total_candidates, 1);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].profile.id, "1");
    }

    #[test]
    fn test_discover_applies_filters() {
        let ranker = Ranker::default();
        let viewer = create_viewer();
        let candidates = vec![
            create_candidate("1", 30, "Ghana", true),
            create_candidate("2", 50, "Ghana", true),
            create_candidate("3", 30, "Ghana", false),
        ];
        let criteria = FilterCriteria {
            verified_only: true,
            max_age: 40,
            ..wide_criteria()
        };

        let result = ranker.discover(&viewer, candidates, &criteria, 10);

        assert_eq!(result.total_candidates, 3);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].profile.id, "1");
    }

    #[test]
    fn test_respects_limit() {
        let ranker = Ranker::default();
        let viewer = create_viewer();
        let candidates: Vec<Profile> = (0..20)
            .map(|i| create_candidate(&i.to_string(), 25 + (i % 10) as u8, "Ghana", true))
            .collect();

        let result = ranker.discover(&viewer, candidates, &wide_criteria(), 5);

        assert_eq!(result.matches.len(), 5);
    }

    #[test]
    fn test_page_size_bounds() {
        let ranker = Ranker::new(20, 50);

        assert_eq!(ranker.page_size(None), 20);
        assert_eq!(ranker.page_size(Some(0)), 1);
        assert_eq!(ranker.page_size(Some(500)), 50);
    }

    #[test]
    fn test_search_ranks_results() {
        let ranker = Ranker::default();
        let viewer = create_viewer();
        let candidates = vec![
            create_candidate("1", 30, "Ghana", true),
            create_candidate("2", 30, "Nigeria", true),
            create_candidate("3", 30, "Kenya", true),
        ];

        let result = ranker.search(&viewer, "a", candidates, 10);

        // every country contains "a"; the Nigerian resident ranks first
        assert_eq!(result.matches.len(), 3);
        assert_eq!(result.matches[0].profile.id, "2");
    }
}
