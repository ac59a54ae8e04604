// SimLog - GPL-3.0-or-later
// This file is part of SimLog.
//
// Copyright (C) 2026 SimLog Contributors
//
// SimLog is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// SimLog is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with SimLog.  If not, see <https://www.gnu.org/licenses/>.

use chrono::Duration;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Symbolic glyph embedded in a log message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    /// ⚙
    Gear,
    /// 📊
    Chart,
}

impl Marker {
    /// First marker glyph found in `message`, if any
    pub fn find_in(message: &str) -> Option<Self> {
        message.chars().find_map(|c| match c {
            '⚙' => Some(Self::Gear),
            '📊' => Some(Self::Chart),
            _ => None,
        })
    }
}

/// Tag of a [`LogRecord`] variant, used for filtering without matching on
/// payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RecordKind {
    Log,
    Processed,
    BaselineScore,
    CiphertextScore,
}

impl RecordKind {
    pub const fn is_similarity_score(self) -> bool {
        matches!(self, Self::BaselineScore | Self::CiphertextScore)
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Log => "log",
            Self::Processed => "processed",
            Self::BaselineScore => "baseline",
            Self::CiphertextScore => "ciphertext",
        };
        f.write_str(name)
    }
}

/// Common interface for all record variants
pub trait RecordCore {
    fn header(&self) -> &RecordHeader;

    fn timestamp(&self) -> &str {
        &self.header().timestamp
    }

    fn level(&self) -> &str {
        &self.header().level
    }

    fn message(&self) -> &str {
        &self.header().message
    }

    fn correlation_id(&self) -> Option<&str> {
        self.header().correlation_id.as_deref()
    }

    fn marker(&self) -> Option<Marker> {
        self.header().marker
    }

    /// Original 1-based line number in the source file
    fn line_number(&self) -> usize {
        self.header().line_number
    }
}

/// Fields shared by every record, taken verbatim from the raw row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordHeader {
    pub timestamp: String,
    pub level: String,
    pub message: String,
    pub correlation_id: Option<String>,
    pub marker: Option<Marker>,
    pub line_number: usize,
}

impl RecordHeader {
    pub fn new(
        timestamp: String,
        level: String,
        message: String,
        correlation_id: Option<String>,
        line_number: usize,
    ) -> Self {
        let marker = Marker::find_in(&message);
        Self {
            timestamp,
            level,
            message,
            correlation_id,
            marker,
            line_number,
        }
    }
}

impl RecordCore for RecordHeader {
    fn header(&self) -> &RecordHeader {
        self
    }
}

/// Enum wrapping all record variants
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord {
    Log(RecordHeader),
    Processed(ProcessedMetric),
    BaselineScore(BaselineScore),
    CiphertextScore(CiphertextScore),
}

impl LogRecord {
    pub const fn kind(&self) -> RecordKind {
        match self {
            Self::Log(_) => RecordKind::Log,
            Self::Processed(_) => RecordKind::Processed,
            Self::BaselineScore(_) => RecordKind::BaselineScore,
            Self::CiphertextScore(_) => RecordKind::CiphertextScore,
        }
    }

    pub const fn as_processed(&self) -> Option<&ProcessedMetric> {
        match self {
            Self::Processed(r) => Some(r),
            Self::Log(_) | Self::BaselineScore(_) | Self::CiphertextScore(_) => None,
        }
    }

    pub const fn as_baseline(&self) -> Option<&BaselineScore> {
        match self {
            Self::BaselineScore(r) => Some(r),
            Self::Log(_) | Self::Processed(_) | Self::CiphertextScore(_) => None,
        }
    }

    pub const fn as_ciphertext(&self) -> Option<&CiphertextScore> {
        match self {
            Self::CiphertextScore(r) => Some(r),
            Self::Log(_) | Self::Processed(_) | Self::BaselineScore(_) => None,
        }
    }

    /// Similarity score part of the record, for both score variants
    pub const fn similarity(&self) -> Option<&SimilarityScore> {
        match self {
            Self::BaselineScore(r) => Some(&r.similarity),
            Self::CiphertextScore(r) => Some(&r.similarity),
            Self::Log(_) | Self::Processed(_) => None,
        }
    }

    /// Duration carried by the record, if the variant has one and it was found
    pub const fn duration(&self) -> Option<Duration> {
        match self {
            Self::Processed(r) => Some(r.duration),
            Self::BaselineScore(r) => r.duration,
            Self::CiphertextScore(r) => r.duration,
            Self::Log(_) => None,
        }
    }
}

impl RecordCore for LogRecord {
    fn header(&self) -> &RecordHeader {
        match self {
            Self::Log(h) => h,
            Self::Processed(r) => &r.header,
            Self::BaselineScore(r) => &r.similarity.header,
            Self::CiphertextScore(r) => &r.similarity.header,
        }
    }
}

// ============================================================================
// Processed Metric
// ============================================================================

/// Pre-processing step finished: `... Processed <n><unit> {key: value, ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedMetric {
    #[serde(flatten)]
    pub header: RecordHeader,
    /// Taken only from the text before the first `{`; zero if absent
    #[serde(serialize_with = "serialize_micros")]
    pub duration: Duration,
    pub params: IndexMap<String, String>,
}

// ============================================================================
// Similarity Scores
// ============================================================================

/// Algorithm name and score shared by baseline and ciphertext records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityScore {
    #[serde(flatten)]
    pub header: RecordHeader,
    pub algorithm: String,
    /// Unset when the message has no `=> <number> ` marker
    pub score: Option<f64>,
}

impl SimilarityScore {
    pub fn matches_algorithm(&self, algorithm: &str) -> bool {
        self.algorithm.eq_ignore_ascii_case(algorithm)
    }
}

/// Score computed on the plaintext path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineScore {
    #[serde(flatten)]
    pub similarity: SimilarityScore,
    /// From `took <n><unit>`
    #[serde(serialize_with = "serialize_opt_micros")]
    pub duration: Option<Duration>,
}

/// Score computed on the encrypted path
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CiphertextScore {
    #[serde(flatten)]
    pub similarity: SimilarityScore,
    /// From `total: <n><unit>`
    #[serde(serialize_with = "serialize_opt_micros")]
    pub duration: Option<Duration>,
    /// Per-stage breakdown found after `" in "`, in message order
    #[serde(serialize_with = "serialize_stage_micros")]
    pub stage_durations: IndexMap<String, Duration>,
}

impl RecordCore for ProcessedMetric {
    fn header(&self) -> &RecordHeader {
        &self.header
    }
}

impl RecordCore for BaselineScore {
    fn header(&self) -> &RecordHeader {
        &self.similarity.header
    }
}

impl RecordCore for CiphertextScore {
    fn header(&self) -> &RecordHeader {
        &self.similarity.header
    }
}

// Durations serialize as integer microseconds.

fn serialize_micros<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(d.num_microseconds().unwrap_or(i64::MAX))
}

#[allow(clippy::ref_option)]
fn serialize_opt_micros<S: serde::Serializer>(
    d: &Option<Duration>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match d {
        Some(d) => serialize_micros(d, s),
        None => s.serialize_none(),
    }
}

fn serialize_stage_micros<S: serde::Serializer>(
    stages: &IndexMap<String, Duration>,
    s: S,
) -> Result<S::Ok, S::Error> {
    use serde::ser::SerializeMap;
    let mut map = s.serialize_map(Some(stages.len()))?;
    for (stage, d) in stages {
        map.serialize_entry(stage, &d.num_microseconds().unwrap_or(i64::MAX))?;
    }
    map.end()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(message: &str) -> RecordHeader {
        RecordHeader::new(
            "2024-05-01 10:00:00".to_string(),
            "METRIC".to_string(),
            message.to_string(),
            None,
            2,
        )
    }

    #[test]
    fn test_marker_detection() {
        assert_eq!(Marker::find_in("⚙ Processed 3ms"), Some(Marker::Gear));
        assert_eq!(Marker::find_in("📊 KLD Plaintext Score"), Some(Marker::Chart));
        assert_eq!(Marker::find_in("📊 then ⚙"), Some(Marker::Chart));
        assert_eq!(Marker::find_in("plain text"), None);
    }

    #[test]
    fn test_kind_and_core_accessors() {
        let record = LogRecord::BaselineScore(BaselineScore {
            similarity: SimilarityScore {
                header: header("📊 KLD Plaintext Score => 0.5 took 2ms"),
                algorithm: "KLD".to_string(),
                score: Some(0.5),
            },
            duration: Some(Duration::milliseconds(2)),
        });

        assert_eq!(record.kind(), RecordKind::BaselineScore);
        assert!(record.kind().is_similarity_score());
        assert_eq!(record.level(), "METRIC");
        assert_eq!(record.marker(), Some(Marker::Chart));
        assert_eq!(record.line_number(), 2);
        assert_eq!(record.duration(), Some(Duration::milliseconds(2)));
        assert!(record.similarity().is_some_and(|s| s.matches_algorithm("kld")));
    }

    #[test]
    fn test_serialize_tagged() {
        let record = LogRecord::Log(header("hello"));
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["kind"], "log");
        assert_eq!(json["message"], "hello");
    }
}
