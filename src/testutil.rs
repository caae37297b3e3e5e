//! Shared fixtures for unit tests.
//!
//! A small in-memory catalog embedded with the deterministic providers,
//! so pipeline, API and evaluation tests exercise the exact serving path.

use crate::catalog::CatalogStore;
use crate::config::Settings;
use crate::duration::DurationInfo;
use crate::model::assessment::NewAssessment;
use crate::pipeline::Pipeline;
use crate::providers::{create_mock_providers, Providers};

/// Settings forcing the deterministic providers.
pub(crate) fn mock_settings() -> Settings {
    Settings {
        use_mock_data: true,
        ..Settings::default()
    }
}

fn seed(
    name: &str,
    description: &str,
    test_types: &[&str],
    job_levels: &[&str],
    duration: &str,
) -> NewAssessment {
    NewAssessment {
        name: name.to_string(),
        description: description.to_string(),
        url: Some(format!(
            "/solutions/products/product-catalog/view/{}/",
            name.to_lowercase().replace(' ', "-")
        )),
        remote_testing: true,
        adaptive_irt: false,
        test_types: test_types.iter().map(ToString::to_string).collect(),
        job_levels: job_levels.iter().map(ToString::to_string).collect(),
        languages: vec!["English".to_string()],
        key_features: vec!["Online proctoring".to_string()],
        duration: DurationInfo::parse(duration),
        embedding: None,
    }
}

/// Seven-assessment catalog with deterministic embeddings.
pub(crate) async fn seeded_store() -> CatalogStore {
    let mut store = CatalogStore::open_memory().expect("in-memory catalog");
    let providers = create_mock_providers(&mock_settings());

    let entries = vec![
        seed(
            "Verbal Reasoning Assessment",
            "Measures verbal reasoning and comprehension ability for graduate hiring.",
            &["Ability & Aptitude"],
            &["Graduate", "Entry-Level"],
            "30",
        ),
        seed(
            "Numerical Reasoning Assessment",
            "Measures numerical reasoning ability with data and charts.",
            &["Ability & Aptitude"],
            &["Graduate", "Mid-Professional"],
            "40",
        ),
        seed(
            "Inductive Reasoning Assessment",
            "Measures inductive reasoning and cognitive ability under time pressure.",
            &["Ability & Aptitude"],
            &["Entry-Level", "Graduate"],
            "25",
        ),
        seed(
            "Personality Assessment",
            "Workplace personality questionnaire covering behavior and motivation.",
            &["Personality & Behavior"],
            &["Professional Individual Contributor", "General Population"],
            "25 to 35",
        ),
        seed(
            "Coding Skills Assessment",
            "Coding skills assessment for software developer roles covering programming fundamentals.",
            &["Knowledge & Skills"],
            &["Mid-Professional", "Graduate"],
            "60",
        ),
        seed(
            "Situational Judgment Test",
            "Situational judgement scenarios for front line customer service roles.",
            &["Biodata & Situational Judgement"],
            &["Front Line Manager", "Executive"],
            "30",
        ),
        seed(
            "Leadership Assessment",
            "Leadership potential assessment for senior executives and directors.",
            &["Competencies", "Development & 360"],
            &["Director", "Executive"],
            "45",
        ),
    ];

    for entry in entries {
        let created = store.create(entry).expect("seed row");
        let vector = providers
            .embedder
            .embed(&created.description)
            .await
            .expect("mock embedding");
        store.set_embedding(created.id, &vector).expect("store embedding");
    }

    store
}

/// A pipeline over the seeded catalog with deterministic providers.
pub(crate) async fn seeded_pipeline() -> Pipeline {
    let settings = mock_settings();
    let providers: Providers = create_mock_providers(&settings);
    Pipeline::new(seeded_store().await, providers, settings)
}
