//! Catalog records and the controlled vocabularies.

use serde::{Deserialize, Serialize};

use crate::duration::DurationInfo;

/// Canonical host prefixed to site-relative assessment URLs on output.
pub const CANONICAL_HOST: &str = "https://www.shl.com";

/// Test-type vocabulary with single-letter catalog codes.
pub const TEST_TYPES: [(&str, char); 8] = [
    ("Ability & Aptitude", 'A'),
    ("Biodata & Situational Judgement", 'B'),
    ("Competencies", 'C'),
    ("Development & 360", 'D'),
    ("Assessment Exercises", 'E'),
    ("Knowledge & Skills", 'K'),
    ("Personality & Behavior", 'P'),
    ("Simulations", 'S'),
];

/// Job-level vocabulary.
pub const JOB_LEVELS: [&str; 10] = [
    "Entry-Level",
    "Graduate",
    "Mid-Professional",
    "Professional Individual Contributor",
    "Front Line Manager",
    "Supervisor",
    "Manager",
    "Director",
    "Executive",
    "General Population",
];

/// Normalize a raw test-type value to the vocabulary.
///
/// Accepts the full name (case-insensitive) or the single-letter catalog
/// code. Returns `None` for values outside the vocabulary.
#[must_use]
pub fn normalize_test_type(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.len() == 1 {
        let code = trimmed.chars().next()?.to_ascii_uppercase();
        return TEST_TYPES
            .iter()
            .find(|(_, c)| *c == code)
            .map(|(name, _)| (*name).to_string());
    }
    TEST_TYPES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(trimmed))
        .map(|(name, _)| (*name).to_string())
}

/// A catalog assessment - the unit of recommendation.
///
/// Identity is the opaque row id; `name` is unique across the catalog and
/// serves as the ground-truth key. List-valued fields are deduped ordered
/// sets; order is presentation-significant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Assessment {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub remote_testing: bool,
    #[serde(default)]
    pub adaptive_irt: bool,
    #[serde(default)]
    pub test_types: Vec<String>,
    #[serde(default)]
    pub job_levels: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(flatten)]
    pub duration: DurationInfo,
    /// Unit-norm embedding of the description; absent until the
    /// regeneration job has processed the row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl Assessment {
    /// Absolute URL, prefixing the canonical host when the stored URL is
    /// site-relative.
    #[must_use]
    pub fn absolute_url(&self) -> String {
        match &self.url {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => url.clone(),
            Some(url) => format!("{CANONICAL_HOST}{url}"),
            None => CANONICAL_HOST.to_string(),
        }
    }
}

/// Fields for creating a new assessment (no id yet).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAssessment {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub remote_testing: bool,
    #[serde(default)]
    pub adaptive_irt: bool,
    #[serde(default)]
    pub test_types: Vec<String>,
    #[serde(default)]
    pub job_levels: Vec<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    #[serde(default)]
    pub key_features: Vec<String>,
    #[serde(flatten)]
    pub duration: DurationInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

/// Partial update for an existing assessment; unset fields are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssessmentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub remote_testing: Option<bool>,
    pub adaptive_irt: Option<bool>,
    pub test_types: Option<Vec<String>>,
    pub job_levels: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
    pub key_features: Option<Vec<String>>,
    pub duration: Option<DurationInfo>,
    /// Replacement embedding, supplied by the caller when the description
    /// changed. Without it a description change clears the stored vector
    /// so the regeneration job picks the row up.
    pub embedding: Option<Vec<f32>>,
}

/// An assessment augmented with its retrieval score and final rank.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedAssessment {
    #[serde(flatten)]
    pub assessment: Assessment,
    /// Cosine similarity from retrieval.
    pub similarity_score: f32,
    /// 1-based position in the result list.
    pub rank: usize,
    /// Human-readable relevance explanation.
    pub explanation: String,
}

/// Dedupe a list while preserving first-seen order.
#[must_use]
pub fn dedupe_ordered(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    values
        .into_iter()
        .filter(|v| !v.trim().is_empty() && seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_test_type_codes() {
        assert_eq!(normalize_test_type("K"), Some("Knowledge & Skills".into()));
        assert_eq!(normalize_test_type("a"), Some("Ability & Aptitude".into()));
        assert_eq!(normalize_test_type("X"), None);
    }

    #[test]
    fn test_normalize_test_type_full_names() {
        assert_eq!(
            normalize_test_type("personality & behavior"),
            Some("Personality & Behavior".into())
        );
        assert_eq!(normalize_test_type("Weird Type"), None);
    }

    #[test]
    fn test_absolute_url_prefixes_relative() {
        let mut a = sample();
        a.url = Some("/solutions/products/product-catalog/view/java-8/".into());
        assert!(a.absolute_url().starts_with("https://www.shl.com/solutions"));

        a.url = Some("https://example.com/x".into());
        assert_eq!(a.absolute_url(), "https://example.com/x");

        a.url = None;
        assert_eq!(a.absolute_url(), CANONICAL_HOST);
    }

    #[test]
    fn test_dedupe_ordered_keeps_first() {
        let deduped = dedupe_ordered(vec![
            "English".into(),
            "French".into(),
            "English".into(),
            " ".into(),
        ]);
        assert_eq!(deduped, vec!["English".to_string(), "French".to_string()]);
    }

    fn sample() -> Assessment {
        Assessment {
            id: 1,
            name: "Sample".into(),
            description: String::new(),
            url: None,
            remote_testing: true,
            adaptive_irt: false,
            test_types: vec!["Knowledge & Skills".into()],
            job_levels: vec![],
            languages: vec![],
            key_features: vec![],
            duration: crate::duration::DurationInfo::parse("30"),
            embedding: None,
        }
    }
}
