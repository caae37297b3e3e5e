//! SQLite catalog store implementation.
//!
//! The catalog holds a few hundred assessments, so vector search is a
//! brute-force cosine scan over the embedding column; no ANN index is
//! involved. All writes run in a transaction and swap whole rows, which
//! gives readers read-after-write consistency and never exposes a
//! half-written row.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use crate::duration::DurationInfo;
use crate::error::{Error, Result};
use crate::model::assessment::{dedupe_ordered, Assessment, AssessmentPatch, NewAssessment};

/// SQLite-backed catalog store.
#[derive(Debug)]
pub struct CatalogStore {
    conn: Connection,
}

/// Structured filter for [`CatalogStore::list`].
///
/// Boolean axes compare by equality; list-valued axes match when the
/// stored set contains the requested value.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub job_level: Option<String>,
    pub test_type: Option<String>,
    pub language: Option<String>,
    pub remote_testing: Option<bool>,
}

/// A vector-search candidate with its cosine similarity.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub assessment: Assessment,
    pub similarity: f32,
}

/// Aggregate outcome of a best-effort batch upsert.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct UpsertStats {
    pub success_count: usize,
    pub error_count: usize,
}

/// Embedding coverage counts for the regeneration job.
#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct EmbeddingCounts {
    pub with_embeddings: usize,
    pub without_embeddings: usize,
}

const SELECT_COLUMNS: &str = "id, name, description, url, remote_testing, adaptive_irt,
     test_types, job_levels, languages, key_features,
     duration_text, duration_min_minutes, duration_max_minutes,
     is_untimed, is_variable_duration, embedding";

impl CatalogStore {
    /// Open (or create) a catalog database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// schema cannot be applied.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "busy_timeout", 5000)?;
        super::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory catalog (tests and dry runs).
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        super::schema::apply_schema(&conn)?;
        Ok(Self { conn })
    }

    // ── Reads ─────────────────────────────────────────────────

    /// List assessments matching the query, ordered by id ascending.
    ///
    /// `skip`/`limit` page through the filtered result.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying query fails.
    pub fn list(
        &self,
        query: &CatalogQuery,
        skip: usize,
        limit: usize,
    ) -> Result<Vec<Assessment>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM assessments ORDER BY id ASC"
        ))?;
        let rows = stmt.query_map([], read_assessment)?;

        // List-membership filters evaluate in Rust; the catalog is small
        // enough that paging after filtering stays stable and cheap.
        let filtered: Vec<Assessment> = rows
            .filter_map(std::result::Result::ok)
            .filter(|a| {
                query
                    .remote_testing
                    .is_none_or(|want| a.remote_testing == want)
                    && query
                        .job_level
                        .as_ref()
                        .is_none_or(|level| a.job_levels.iter().any(|l| l == level))
                    && query
                        .test_type
                        .as_ref()
                        .is_none_or(|tt| a.test_types.iter().any(|t| t == tt))
                    && query
                        .language
                        .as_ref()
                        .is_none_or(|lang| a.languages.iter().any(|l| l == lang))
            })
            .skip(skip)
            .take(limit)
            .collect();

        Ok(filtered)
    }

    /// Fetch one assessment by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` when absent.
    pub fn get(&self, id: i64) -> Result<Option<Assessment>> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM assessments WHERE id = ?1"),
                [id],
                read_assessment,
            )
            .optional()?;
        Ok(found)
    }

    /// Fetch one assessment by its unique name.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails; `Ok(None)` when absent.
    pub fn get_by_name(&self, name: &str) -> Result<Option<Assessment>> {
        let found = self
            .conn
            .query_row(
                &format!("SELECT {SELECT_COLUMNS} FROM assessments WHERE name = ?1"),
                [name],
                read_assessment,
            )
            .optional()?;
        Ok(found)
    }

    /// Total number of assessments.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM assessments", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Embedding coverage for status output and the regeneration job.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn embedding_counts(&self) -> Result<EmbeddingCounts> {
        let with: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM assessments WHERE embedding IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        let without: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM assessments WHERE embedding IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(EmbeddingCounts {
            with_embeddings: usize::try_from(with).unwrap_or(0),
            without_embeddings: usize::try_from(without).unwrap_or(0),
        })
    }

    /// Assessments with no stored embedding, ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn missing_embedding(&self, limit: Option<usize>) -> Result<Vec<Assessment>> {
        let limit = limit.map_or(i64::MAX, |l| i64::try_from(l).unwrap_or(i64::MAX));
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM assessments
             WHERE embedding IS NULL ORDER BY id ASC LIMIT ?1"
        ))?;
        let rows = stmt.query_map([limit], read_assessment)?;
        Ok(rows.filter_map(std::result::Result::ok).collect())
    }

    /// All assessments, ordered by id ascending.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn all(&self) -> Result<Vec<Assessment>> {
        self.list(&CatalogQuery::default(), 0, usize::MAX)
    }

    // ── Vector search ─────────────────────────────────────────

    /// Top-`k` assessments by cosine similarity to `query_embedding`,
    /// keeping only candidates at or above `min_sim`.
    ///
    /// The query vector is L2-normalized here (idempotent for already
    /// normalized input). Ordering is similarity descending, ties broken
    /// by id ascending. An empty result is a successful empty result,
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the scan fails.
    pub fn match_assessments(
        &self,
        query_embedding: &[f32],
        k: usize,
        min_sim: f32,
    ) -> Result<Vec<MatchCandidate>> {
        let query = l2_normalize(query_embedding);

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM assessments WHERE embedding IS NOT NULL"
        ))?;
        let rows = stmt.query_map([], read_assessment)?;

        let mut candidates: Vec<MatchCandidate> = rows
            .filter_map(std::result::Result::ok)
            .filter_map(|assessment| {
                let embedding = assessment.embedding.as_deref()?;
                let similarity = cosine_similarity(&query, embedding);
                (similarity >= min_sim).then(|| MatchCandidate {
                    similarity,
                    assessment,
                })
            })
            .collect();

        candidates.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.assessment.id.cmp(&b.assessment.id))
        });
        candidates.truncate(k);

        Ok(candidates)
    }

    // ── Writes ────────────────────────────────────────────────

    /// Insert a new assessment and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `Data` when the name is empty, `Retrieval` on conflicts or
    /// database failures.
    pub fn create(&mut self, new: NewAssessment) -> Result<Assessment> {
        if new.name.trim().is_empty() {
            return Err(Error::Data("assessment name must not be empty".into()));
        }
        let now = chrono::Utc::now().timestamp_millis();
        let tx = self.conn.transaction()?;
        tx.execute(
            "INSERT INTO assessments
               (name, description, url, remote_testing, adaptive_irt,
                test_types, job_levels, languages, key_features,
                duration_text, duration_min_minutes, duration_max_minutes,
                is_untimed, is_variable_duration,
                embedding, embedding_dimensions, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)",
            params![
                new.name.trim(),
                new.description,
                new.url,
                new.remote_testing,
                new.adaptive_irt,
                serde_json::to_string(&dedupe_ordered(new.test_types))?,
                serde_json::to_string(&dedupe_ordered(new.job_levels))?,
                serde_json::to_string(&dedupe_ordered(new.languages))?,
                serde_json::to_string(&dedupe_ordered(new.key_features))?,
                new.duration.duration_text,
                new.duration.duration_min_minutes,
                new.duration.duration_max_minutes,
                new.duration.is_untimed,
                new.duration.is_variable,
                new.embedding.as_deref().map(embedding_to_blob),
                new.embedding
                    .as_ref()
                    .map(|e| i64::try_from(e.len()).unwrap_or(0)),
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;
        self.get(id)?.ok_or(Error::AssessmentNotFound { id })
    }

    /// Apply a partial update to an assessment.
    ///
    /// The row swaps atomically in one transaction. A description change
    /// without a replacement embedding clears the stored vector so the
    /// regeneration job re-embeds the row.
    ///
    /// # Errors
    ///
    /// Returns `AssessmentNotFound` when the id is unknown.
    pub fn update(&mut self, id: i64, patch: AssessmentPatch) -> Result<Assessment> {
        let mut current = self.get(id)?.ok_or(Error::AssessmentNotFound { id })?;

        let description_changed = patch
            .description
            .as_ref()
            .is_some_and(|d| *d != current.description);

        if let Some(name) = patch.name {
            current.name = name;
        }
        if let Some(description) = patch.description {
            current.description = description;
        }
        if let Some(url) = patch.url {
            current.url = Some(url);
        }
        if let Some(remote) = patch.remote_testing {
            current.remote_testing = remote;
        }
        if let Some(adaptive) = patch.adaptive_irt {
            current.adaptive_irt = adaptive;
        }
        if let Some(test_types) = patch.test_types {
            current.test_types = dedupe_ordered(test_types);
        }
        if let Some(job_levels) = patch.job_levels {
            current.job_levels = dedupe_ordered(job_levels);
        }
        if let Some(languages) = patch.languages {
            current.languages = dedupe_ordered(languages);
        }
        if let Some(key_features) = patch.key_features {
            current.key_features = dedupe_ordered(key_features);
        }
        if let Some(duration) = patch.duration {
            current.duration = duration;
        }

        if let Some(embedding) = patch.embedding {
            current.embedding = Some(embedding);
        } else if description_changed {
            // Stale vector: the stored embedding was computed from the old
            // description.
            current.embedding = None;
        }

        let now = chrono::Utc::now().timestamp_millis();
        let tx = self.conn.transaction()?;
        let changed = tx.execute(
            "UPDATE assessments SET
               name = ?1, description = ?2, url = ?3,
               remote_testing = ?4, adaptive_irt = ?5,
               test_types = ?6, job_levels = ?7, languages = ?8, key_features = ?9,
               duration_text = ?10, duration_min_minutes = ?11, duration_max_minutes = ?12,
               is_untimed = ?13, is_variable_duration = ?14,
               embedding = ?15, embedding_dimensions = ?16, updated_at = ?17
             WHERE id = ?18",
            params![
                current.name,
                current.description,
                current.url,
                current.remote_testing,
                current.adaptive_irt,
                serde_json::to_string(&current.test_types)?,
                serde_json::to_string(&current.job_levels)?,
                serde_json::to_string(&current.languages)?,
                serde_json::to_string(&current.key_features)?,
                current.duration.duration_text,
                current.duration.duration_min_minutes,
                current.duration.duration_max_minutes,
                current.duration.is_untimed,
                current.duration.is_variable,
                current.embedding.as_deref().map(embedding_to_blob),
                current
                    .embedding
                    .as_ref()
                    .map(|e| i64::try_from(e.len()).unwrap_or(0)),
                now,
                id,
            ],
        )?;
        tx.commit()?;

        if changed == 0 {
            return Err(Error::AssessmentNotFound { id });
        }
        Ok(current)
    }

    /// Delete an assessment. Returns whether a row was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn delete(&mut self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM assessments WHERE id = ?1", [id])?;
        Ok(changed > 0)
    }

    /// Store the embedding for an assessment.
    ///
    /// # Errors
    ///
    /// Returns `Data` for an empty vector, `AssessmentNotFound` for an
    /// unknown id.
    pub fn set_embedding(&mut self, id: i64, embedding: &[f32]) -> Result<()> {
        if embedding.is_empty() {
            return Err(Error::Data("embedding must not be empty".into()));
        }
        let changed = self.conn.execute(
            "UPDATE assessments SET embedding = ?1, embedding_dimensions = ?2, updated_at = ?3
             WHERE id = ?4",
            params![
                embedding_to_blob(embedding),
                i64::try_from(embedding.len()).unwrap_or(0),
                chrono::Utc::now().timestamp_millis(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(Error::AssessmentNotFound { id });
        }
        Ok(())
    }

    /// Best-effort batch upsert keyed by assessment name.
    ///
    /// A failing row is counted and skipped; it never aborts the batch.
    ///
    /// # Errors
    ///
    /// Only infrastructure failures (opening the transaction) error out.
    pub fn batch_upsert(&mut self, entries: Vec<NewAssessment>) -> Result<UpsertStats> {
        let mut stats = UpsertStats::default();
        for entry in entries {
            match self.upsert_by_name(entry) {
                Ok(()) => stats.success_count += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "batch upsert row failed, skipping");
                    stats.error_count += 1;
                }
            }
        }
        Ok(stats)
    }

    fn upsert_by_name(&mut self, entry: NewAssessment) -> Result<()> {
        if entry.name.trim().is_empty() {
            return Err(Error::Data("assessment name must not be empty".into()));
        }
        match self.get_by_name(entry.name.trim())? {
            Some(existing) => {
                self.update(
                    existing.id,
                    AssessmentPatch {
                        description: Some(entry.description),
                        url: entry.url,
                        remote_testing: Some(entry.remote_testing),
                        adaptive_irt: Some(entry.adaptive_irt),
                        test_types: Some(entry.test_types),
                        job_levels: Some(entry.job_levels),
                        languages: Some(entry.languages),
                        key_features: Some(entry.key_features),
                        duration: Some(entry.duration),
                        embedding: entry.embedding,
                        ..AssessmentPatch::default()
                    },
                )?;
            }
            None => {
                self.create(entry)?;
            }
        }
        Ok(())
    }
}

/// Map a full assessment row.
fn read_assessment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Assessment> {
    let embedding: Option<Vec<u8>> = row.get(15)?;
    Ok(Assessment {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        url: row.get(3)?,
        remote_testing: row.get(4)?,
        adaptive_irt: row.get(5)?,
        test_types: read_list(&row.get::<_, String>(6)?),
        job_levels: read_list(&row.get::<_, String>(7)?),
        languages: read_list(&row.get::<_, String>(8)?),
        key_features: read_list(&row.get::<_, String>(9)?),
        duration: DurationInfo {
            duration_text: row.get(10)?,
            duration_min_minutes: row.get(11)?,
            duration_max_minutes: row.get(12)?,
            is_untimed: row.get(13)?,
            is_variable: row.get(14)?,
        },
        embedding: embedding.map(|blob| blob_to_embedding(&blob)),
    })
}

/// Parse a JSON-array column; unparseable values read as empty.
fn read_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
        .collect()
}

/// L2-normalize a vector; zero vectors come back unchanged.
#[must_use]
pub fn l2_normalize(v: &[f32]) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm == 0.0 {
        v.to_vec()
    } else {
        v.iter().map(|x| x / norm).collect()
    }
}

/// Cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched dimensions or zero magnitude, so a stale
/// row embedded under a different model simply never matches.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot_product = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;

    for (x, y) in a.iter().zip(b.iter()) {
        dot_product += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let magnitude = (norm_a * norm_b).sqrt();
    if magnitude == 0.0 {
        0.0
    } else {
        dot_product / magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_assessment(name: &str, duration: &str) -> NewAssessment {
        NewAssessment {
            name: name.to_string(),
            description: format!("{name} description"),
            remote_testing: true,
            test_types: vec!["Knowledge & Skills".into()],
            languages: vec!["English".into()],
            duration: DurationInfo::parse(duration),
            ..NewAssessment::default()
        }
    }

    #[test]
    fn test_create_and_get_round_trip() {
        let mut store = CatalogStore::open_memory().unwrap();
        let created = store.create(new_assessment("Java Test", "30")).unwrap();
        let fetched = store.get(created.id).unwrap().unwrap();
        assert_eq!(fetched.name, "Java Test");
        assert_eq!(fetched.duration.duration_max_minutes, Some(30));
        assert_eq!(fetched.languages, vec!["English".to_string()]);
    }

    #[test]
    fn test_list_orders_by_id_and_pages() {
        let mut store = CatalogStore::open_memory().unwrap();
        for name in ["A", "B", "C", "D"] {
            store.create(new_assessment(name, "30")).unwrap();
        }
        let page = store.list(&CatalogQuery::default(), 1, 2).unwrap();
        assert_eq!(
            page.iter().map(|a| a.name.as_str()).collect::<Vec<_>>(),
            vec!["B", "C"]
        );
    }

    #[test]
    fn test_list_filters_membership_and_booleans() {
        let mut store = CatalogStore::open_memory().unwrap();
        let mut first = new_assessment("First", "30");
        first.job_levels = vec!["Graduate".into()];
        let mut second = new_assessment("Second", "30");
        second.job_levels = vec!["Executive".into()];
        second.remote_testing = false;
        store.create(first).unwrap();
        store.create(second).unwrap();

        let grads = store
            .list(
                &CatalogQuery {
                    job_level: Some("Graduate".into()),
                    ..CatalogQuery::default()
                },
                0,
                100,
            )
            .unwrap();
        assert_eq!(grads.len(), 1);
        assert_eq!(grads[0].name, "First");

        let remote = store
            .list(
                &CatalogQuery {
                    remote_testing: Some(false),
                    ..CatalogQuery::default()
                },
                0,
                100,
            )
            .unwrap();
        assert_eq!(remote.len(), 1);
        assert_eq!(remote[0].name, "Second");
    }

    #[test]
    fn test_update_swaps_row_and_clears_stale_embedding() {
        let mut store = CatalogStore::open_memory().unwrap();
        let created = store.create(new_assessment("Target", "30")).unwrap();
        store.set_embedding(created.id, &[1.0, 0.0, 0.0]).unwrap();

        let updated = store
            .update(
                created.id,
                AssessmentPatch {
                    description: Some("completely new text".into()),
                    ..AssessmentPatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.description, "completely new text");
        assert!(updated.embedding.is_none(), "stale vector must be cleared");

        // An unchanged description keeps the vector.
        store.set_embedding(created.id, &[1.0, 0.0, 0.0]).unwrap();
        let updated = store
            .update(
                created.id,
                AssessmentPatch {
                    remote_testing: Some(false),
                    ..AssessmentPatch::default()
                },
            )
            .unwrap();
        assert!(updated.embedding.is_some());
    }

    #[test]
    fn test_match_orders_by_similarity_then_id() {
        let mut store = CatalogStore::open_memory().unwrap();
        let a = store.create(new_assessment("A", "30")).unwrap();
        let b = store.create(new_assessment("B", "30")).unwrap();
        let c = store.create(new_assessment("C", "30")).unwrap();
        store.set_embedding(a.id, &[1.0, 0.0]).unwrap();
        store.set_embedding(b.id, &[0.6, 0.8]).unwrap();
        // Same direction as A: exercises the id tiebreak.
        store.set_embedding(c.id, &[2.0, 0.0]).unwrap();

        let matches = store.match_assessments(&[1.0, 0.0], 10, 0.5).unwrap();
        let names: Vec<&str> = matches
            .iter()
            .map(|m| m.assessment.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C", "B"]);
        assert!(matches.iter().all(|m| m.similarity >= 0.5));
    }

    #[test]
    fn test_match_empty_is_ok_not_error() {
        let mut store = CatalogStore::open_memory().unwrap();
        let a = store.create(new_assessment("A", "30")).unwrap();
        store.set_embedding(a.id, &[0.0, 1.0]).unwrap();

        let matches = store.match_assessments(&[1.0, 0.0], 10, 0.9).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_match_skips_rows_without_embedding() {
        let mut store = CatalogStore::open_memory().unwrap();
        store.create(new_assessment("NoVector", "30")).unwrap();
        let matches = store.match_assessments(&[1.0, 0.0], 10, 0.0).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_batch_upsert_best_effort() {
        let mut store = CatalogStore::open_memory().unwrap();
        let entries = vec![
            new_assessment("Keep", "30"),
            NewAssessment::default(), // empty name: counted, not fatal
            new_assessment("Keep", "45"), // update by name
        ];
        let stats = store.batch_upsert(entries).unwrap();
        assert_eq!(stats.success_count, 2);
        assert_eq!(stats.error_count, 1);

        let kept = store.get_by_name("Keep").unwrap().unwrap();
        assert_eq!(kept.duration.duration_max_minutes, Some(45));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_embedding_blob_round_trip() {
        let original = vec![0.25_f32, -1.5, 3.25];
        let blob = embedding_to_blob(&original);
        assert_eq!(blob_to_embedding(&blob), original);
    }

    #[test]
    fn test_l2_normalize_is_idempotent() {
        let normalized = l2_normalize(&[3.0, 4.0]);
        let twice = l2_normalize(&normalized);
        let norm: f32 = twice.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-3);
        assert!((normalized[0] - twice[0]).abs() < 1e-6);
    }
}
