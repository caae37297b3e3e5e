//! SQLite catalog store.
//!
//! Persists assessments and their embedding vectors with:
//! - WAL mode for concurrent reads
//! - One transaction per write, rows swap atomically
//! - Brute-force cosine `match` with a similarity floor
//!
//! # Submodules
//!
//! - [`schema`] - Database schema definitions
//! - [`sqlite`] - The store implementation

pub mod schema;
pub mod sqlite;

pub use sqlite::{CatalogQuery, CatalogStore, EmbeddingCounts, MatchCandidate, UpsertStats};
