//! Filter merging and post-retrieval application.
//!
//! The store enforces `min_similarity` during retrieval; every other axis
//! is applied here, after retrieval, because SQLite cannot evaluate list
//! intersections or the duration policy.

use tracing::debug;

use crate::catalog::MatchCandidate;
use crate::model::recommendation::{DurationType, Filters};

/// Merge caller-supplied filters with LLM-inferred ones.
///
/// The caller wins per axis; an inferred value only fills an axis the
/// caller left unset. Empty lists count as unset. Merging is idempotent:
/// merging the result against the same inferred filters changes nothing.
#[must_use]
pub fn merge(caller: Option<&Filters>, inferred: &Filters) -> Filters {
    let caller = caller.cloned().unwrap_or_default();
    Filters {
        job_levels: if caller.job_levels.is_empty() {
            inferred.job_levels.clone()
        } else {
            caller.job_levels
        },
        test_types: if caller.test_types.is_empty() {
            inferred.test_types.clone()
        } else {
            caller.test_types
        },
        languages: if caller.languages.is_empty() {
            inferred.languages.clone()
        } else {
            caller.languages
        },
        max_duration_minutes: caller
            .max_duration_minutes
            .or(inferred.max_duration_minutes),
        duration_type: caller.duration_type.or(inferred.duration_type),
        min_similarity: caller.min_similarity.or(inferred.min_similarity),
        remote_testing: caller.remote_testing.or(inferred.remote_testing),
    }
}

/// Applies post-retrieval filters to match candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterEngine {
    /// Untimed assessments pass a `max_duration_minutes` filter.
    ///
    /// Canonical policy: `false` (untimed fails the filter).
    pub untimed_passes_max_duration: bool,
}

impl FilterEngine {
    #[must_use]
    pub fn new(untimed_passes_max_duration: bool) -> Self {
        Self {
            untimed_passes_max_duration,
        }
    }

    /// Keep the candidates that satisfy every set filter axis.
    #[must_use]
    pub fn apply_post(
        &self,
        candidates: Vec<MatchCandidate>,
        filters: &Filters,
    ) -> Vec<MatchCandidate> {
        candidates
            .into_iter()
            .filter(|c| self.passes(c, filters))
            .collect()
    }

    fn passes(&self, candidate: &MatchCandidate, filters: &Filters) -> bool {
        let a = &candidate.assessment;

        if !filters.job_levels.is_empty() && !intersects(&a.job_levels, &filters.job_levels) {
            return false;
        }
        if !filters.test_types.is_empty() && !intersects(&a.test_types, &filters.test_types) {
            return false;
        }
        if !filters.languages.is_empty() && !intersects(&a.languages, &filters.languages) {
            return false;
        }
        if let Some(want) = filters.remote_testing {
            if a.remote_testing != want {
                return false;
            }
        }
        if let Some(max) = filters.max_duration_minutes {
            if !self.passes_max_duration(candidate, max) {
                return false;
            }
        }
        if let Some(duration_type) = filters.duration_type {
            if !matches_duration_type(candidate, duration_type) {
                return false;
            }
        }
        true
    }

    fn passes_max_duration(&self, candidate: &MatchCandidate, max: u32) -> bool {
        let duration = &candidate.assessment.duration;
        if duration.is_untimed {
            return self.untimed_passes_max_duration;
        }
        match duration.effective_minutes() {
            Some(minutes) => minutes <= max,
            None => {
                // No number to compare against; the constraint cannot be
                // evaluated, so the candidate passes.
                debug!(
                    assessment = %candidate.assessment.name,
                    "duration unknown, max_duration filter not evaluable"
                );
                true
            }
        }
    }
}

fn matches_duration_type(candidate: &MatchCandidate, duration_type: DurationType) -> bool {
    let d = &candidate.assessment.duration;
    match duration_type {
        DurationType::Fixed => matches!(
            (d.duration_min_minutes, d.duration_max_minutes),
            (Some(lo), Some(hi)) if lo == hi
        ),
        DurationType::Variable => {
            d.is_variable
                || matches!(
                    (d.duration_min_minutes, d.duration_max_minutes),
                    (Some(lo), Some(hi)) if lo < hi
                )
        }
        DurationType::Untimed => d.is_untimed,
    }
}

fn intersects(attribute: &[String], filter: &[String]) -> bool {
    attribute.iter().any(|v| filter.contains(v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::duration::DurationInfo;
    use crate::model::assessment::Assessment;

    fn candidate(name: &str, duration: &str) -> MatchCandidate {
        MatchCandidate {
            assessment: Assessment {
                id: 1,
                name: name.to_string(),
                description: String::new(),
                url: None,
                remote_testing: true,
                adaptive_irt: false,
                test_types: vec!["Ability & Aptitude".into()],
                job_levels: vec!["Graduate".into()],
                languages: vec!["English".into()],
                key_features: vec![],
                duration: DurationInfo::parse(duration),
                embedding: None,
            },
            similarity: 0.9,
        }
    }

    #[test]
    fn test_merge_caller_wins_per_axis() {
        let caller = Filters {
            job_levels: vec!["Executive".into()],
            ..Filters::default()
        };
        let inferred = Filters {
            job_levels: vec!["Graduate".into()],
            max_duration_minutes: Some(30),
            ..Filters::default()
        };
        let merged = merge(Some(&caller), &inferred);
        assert_eq!(merged.job_levels, vec!["Executive".to_string()]);
        assert_eq!(merged.max_duration_minutes, Some(30));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let caller = Filters {
            test_types: vec!["Knowledge & Skills".into()],
            min_similarity: Some(0.0),
            ..Filters::default()
        };
        let inferred = Filters {
            test_types: vec!["Simulations".into()],
            max_duration_minutes: Some(45),
            remote_testing: Some(true),
            ..Filters::default()
        };
        let once = merge(Some(&caller), &inferred);
        let twice = merge(Some(&once), &inferred);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_membership_intersection() {
        let engine = FilterEngine::default();
        let filters = Filters {
            job_levels: vec!["Graduate".into(), "Executive".into()],
            ..Filters::default()
        };
        let kept = engine.apply_post(vec![candidate("A", "30")], &filters);
        assert_eq!(kept.len(), 1);

        let filters = Filters {
            job_levels: vec!["Executive".into()],
            ..Filters::default()
        };
        let kept = engine.apply_post(vec![candidate("A", "30")], &filters);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_max_duration_uses_upper_bound() {
        let engine = FilterEngine::default();
        let filters = Filters {
            max_duration_minutes: Some(30),
            ..Filters::default()
        };
        // 25-35 range: effective duration is the max, which exceeds 30.
        assert!(engine.apply_post(vec![candidate("A", "25 to 35")], &filters).is_empty());
        assert_eq!(engine.apply_post(vec![candidate("A", "30")], &filters).len(), 1);
        assert!(engine.apply_post(vec![candidate("A", "40")], &filters).is_empty());
    }

    #[test]
    fn test_untimed_fails_max_duration_by_default() {
        let filters = Filters {
            max_duration_minutes: Some(60),
            ..Filters::default()
        };
        let strict = FilterEngine::default();
        assert!(strict.apply_post(vec![candidate("A", "Untimed")], &filters).is_empty());

        let lenient = FilterEngine::new(true);
        assert_eq!(lenient.apply_post(vec![candidate("A", "Untimed")], &filters).len(), 1);
    }

    #[test]
    fn test_unknown_duration_passes_max_filter() {
        let engine = FilterEngine::default();
        let filters = Filters {
            max_duration_minutes: Some(10),
            ..Filters::default()
        };
        assert_eq!(engine.apply_post(vec![candidate("A", "approx.")], &filters).len(), 1);
        // Variable with no bounds is equally not evaluable.
        assert_eq!(engine.apply_post(vec![candidate("A", "TBC")], &filters).len(), 1);
    }

    #[test]
    fn test_duration_type_filter() {
        let engine = FilterEngine::default();
        let fixed = Filters {
            duration_type: Some(DurationType::Fixed),
            ..Filters::default()
        };
        let variable = Filters {
            duration_type: Some(DurationType::Variable),
            ..Filters::default()
        };
        let untimed = Filters {
            duration_type: Some(DurationType::Untimed),
            ..Filters::default()
        };

        assert_eq!(engine.apply_post(vec![candidate("A", "30")], &fixed).len(), 1);
        assert!(engine.apply_post(vec![candidate("A", "15 to 35")], &fixed).is_empty());
        assert_eq!(engine.apply_post(vec![candidate("A", "15 to 35")], &variable).len(), 1);
        assert_eq!(engine.apply_post(vec![candidate("A", "Untimed")], &untimed).len(), 1);
        assert!(engine.apply_post(vec![candidate("A", "30")], &untimed).is_empty());
    }

    #[test]
    fn test_remote_testing_equality() {
        let engine = FilterEngine::default();
        let filters = Filters {
            remote_testing: Some(false),
            ..Filters::default()
        };
        assert!(engine.apply_post(vec![candidate("A", "30")], &filters).is_empty());
    }
}
