//! Duration normalization.
//!
//! Catalog sources encode assessment durations as free text ("30", "max 20",
//! "15 to 35", "Untimed", "TBC", ...). [`DurationInfo::parse`] normalizes
//! every spelling into a structured tuple; it is total, so no input produces
//! an error, unparseable text just yields the "unknown" tuple, which the
//! filter engine treats as "no constraint".

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Normalized duration fields for an assessment.
///
/// At most one of `is_untimed`, `is_variable`, "minute bounds set" holds.
/// If none hold the duration is unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationInfo {
    /// The original duration text, kept for rendering fallbacks.
    #[serde(default)]
    pub duration_text: Option<String>,
    #[serde(default)]
    pub duration_min_minutes: Option<u32>,
    #[serde(default)]
    pub duration_max_minutes: Option<u32>,
    #[serde(default)]
    pub is_untimed: bool,
    #[serde(default, rename = "is_variable_duration")]
    pub is_variable: bool,
}

fn single_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\s*(minutes?|mins?|hours?|hrs?)?$").unwrap())
}

fn max_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^max\s+(\d+)\s*(minutes?|mins?|hours?|hrs?)?$").unwrap())
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+)\s*(?:to|-)\s*(\d+)\s*(minutes?|mins?|hours?|hrs?)?$").unwrap()
    })
}

/// Minutes for a captured value, converting explicit hour units.
fn to_minutes(value: u32, unit: Option<&str>) -> u32 {
    match unit {
        Some(u) if u.starts_with('h') => value.saturating_mul(60),
        _ => value,
    }
}

impl DurationInfo {
    /// Parse a free-form duration string.
    ///
    /// Rules are applied in order, first match wins:
    /// 1. pure integer `N` (optional unit) → fixed `N..N`
    /// 2. `max N` → upper bound only
    /// 3. `N to M` / `N-M` → variable range (rejected when `N > M`)
    /// 4. text starting with `untimed` (or "no time limit") → untimed
    /// 5. `variable`/`tbc`/`n/a`/`-` or text containing `variable`/`varies`
    ///    → variable without bounds
    /// 6. anything else → unknown
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();

        let keep_text = || {
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        };

        if let Some(caps) = single_re().captures(&lower) {
            if let Ok(value) = caps[1].parse::<u32>() {
                let minutes = to_minutes(value, caps.get(2).map(|m| m.as_str()));
                return Self {
                    duration_text: keep_text(),
                    duration_min_minutes: Some(minutes),
                    duration_max_minutes: Some(minutes),
                    ..Self::default()
                };
            }
        }

        if let Some(caps) = max_re().captures(&lower) {
            if let Ok(value) = caps[1].parse::<u32>() {
                let minutes = to_minutes(value, caps.get(2).map(|m| m.as_str()));
                return Self {
                    duration_text: keep_text(),
                    duration_max_minutes: Some(minutes),
                    ..Self::default()
                };
            }
        }

        if let Some(caps) = range_re().captures(&lower) {
            if let (Ok(lo), Ok(hi)) = (caps[1].parse::<u32>(), caps[2].parse::<u32>()) {
                let unit = caps.get(3).map(|m| m.as_str());
                let (lo, hi) = (to_minutes(lo, unit), to_minutes(hi, unit));
                if lo <= hi {
                    return Self {
                        duration_text: keep_text(),
                        duration_min_minutes: Some(lo),
                        duration_max_minutes: Some(hi),
                        is_variable: true,
                        ..Self::default()
                    };
                }
                // Inverted ranges fall through to unknown.
            }
        }

        if lower.starts_with("untimed") || lower.contains("no time limit") {
            return Self {
                duration_text: keep_text(),
                is_untimed: true,
                ..Self::default()
            };
        }

        if matches!(lower.as_str(), "variable" | "tbc" | "n/a" | "-")
            || lower.contains("variable")
            || lower.contains("varies")
        {
            return Self {
                duration_text: keep_text(),
                is_variable: true,
                ..Self::default()
            };
        }

        Self {
            duration_text: keep_text(),
            ..Self::default()
        }
    }

    /// Whether no duration information could be extracted.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        !self.is_untimed
            && !self.is_variable
            && self.duration_min_minutes.is_none()
            && self.duration_max_minutes.is_none()
    }

    /// The single number of minutes used against a `max_duration` filter.
    ///
    /// Prefers the upper bound; `None` when no bound exists.
    #[must_use]
    pub fn effective_minutes(&self) -> Option<u32> {
        self.duration_max_minutes.or(self.duration_min_minutes)
    }

    /// Human-readable rendering for candidate context documents.
    #[must_use]
    pub fn render(&self) -> String {
        if self.is_untimed {
            return "Untimed assessment".to_string();
        }
        if self.is_variable {
            return "Variable duration".to_string();
        }
        if let (Some(lo), Some(hi)) = (self.duration_min_minutes, self.duration_max_minutes) {
            if lo == hi {
                return format!("Duration: {lo} minutes");
            }
        }
        self.duration_text
            .clone()
            .unwrap_or_else(|| "Unknown".to_string())
    }
}
