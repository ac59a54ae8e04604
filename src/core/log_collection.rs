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

//! Loading a benchmark log file into classified records, and the queries
//! the reporting layer runs over them.
//!
//! A [`LogCollection`] is immutable once loaded. Filtered views are
//! recomputed per query, so independent queries never share state.

use crate::error::{Error, Result};
use crate::parser::duration::as_micros;
use crate::parser::record::{LogRecord, RecordKind};
use crate::parser::{classify, split_fields};
use chrono::Duration;
use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

pub const DEFAULT_DELIMITER: char = ';';

/// timestamp;level;message
const MIN_FIELDS: usize = 3;
/// timestamp;level;message;correlationId
const MAX_FIELDS: usize = 4;

/// All classified records of one log file, in file order
#[derive(Debug, Clone, Default, Serialize)]
pub struct LogCollection {
    path: Option<PathBuf>,
    records: Vec<LogRecord>,
}

/// Record counts of a collection, overall and per algorithm
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogSummary {
    pub total: usize,
    pub baseline: usize,
    pub ciphertext: usize,
    pub per_algorithm: BTreeMap<String, AlgorithmCounts>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlgorithmCounts {
    pub baseline: usize,
    pub ciphertext: usize,
}

impl LogCollection {
    /// Build a collection from already classified records
    pub const fn from_records(records: Vec<LogRecord>) -> Self {
        Self {
            path: None,
            records,
        }
    }

    /// Load a semicolon-delimited log file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_delimiter(path, DEFAULT_DELIMITER)
    }

    /// Load a delimited log file, skipping its header row.
    ///
    /// The first row that fails to parse aborts the whole load.
    pub fn load_with_delimiter(path: impl AsRef<Path>, delimiter: char) -> Result<Self> {
        let path = path.as_ref();
        let start_time = Instant::now();
        tracing::debug!("Loading log file {}", path.display());

        let buffer = std::fs::read(path).map_err(|e| Error::from_io(path, e))?;
        // Lossy conversion keeps going over stray non-UTF-8 bytes
        let content = String::from_utf8_lossy(&buffer);

        let records = Self::parse_rows(path, &content, delimiter)?;

        tracing::info!(
            "Classified {} records from {} in {:?}",
            records.len(),
            path.display(),
            start_time.elapsed()
        );
        tracing::debug!(
            "{}: {} processed, {} baseline, {} ciphertext",
            path.display(),
            records.iter().filter(|r| r.kind() == RecordKind::Processed).count(),
            records.iter().filter(|r| r.kind() == RecordKind::BaselineScore).count(),
            records.iter().filter(|r| r.kind() == RecordKind::CiphertextScore).count()
        );

        Ok(Self {
            path: Some(path.to_path_buf()),
            records,
        })
    }

    fn parse_rows(path: &Path, content: &str, delimiter: char) -> Result<Vec<LogRecord>> {
        let mut records = Vec::new();
        let mut rows = content.lines().enumerate();

        if rows.next().is_none() {
            tracing::warn!("{} has no header row, nothing to load", path.display());
            return Ok(records);
        }

        for (idx, row) in rows {
            let line_number = idx + 1;
            if row.trim().is_empty() {
                continue;
            }

            let fields = split_fields(row, delimiter);
            if !(MIN_FIELDS..=MAX_FIELDS).contains(&fields.len()) {
                return Err(Error::MalformedRow {
                    path: path.to_path_buf(),
                    line: line_number,
                    reason: format!(
                        "expected {MIN_FIELDS} to {MAX_FIELDS} fields, found {}",
                        fields.len()
                    ),
                });
            }

            let correlation_id = fields
                .get(3)
                .map(String::as_str)
                .filter(|id| !id.is_empty());
            let record = classify(&fields[0], &fields[1], &fields[2], correlation_id, line_number)?;
            records.push(record);
        }

        Ok(records)
    }

    /// Load several files in parallel, keyed by path
    pub fn load_many<P>(paths: &[P], delimiter: char) -> Result<BTreeMap<PathBuf, Self>>
    where
        P: AsRef<Path> + Sync,
    {
        paths
            .par_iter()
            .map(|p| {
                let p = p.as_ref();
                Self::load_with_delimiter(p, delimiter).map(|c| (p.to_path_buf(), c))
            })
            .collect()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Every record, including non-metric rows
    pub fn all(&self) -> &[LogRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records of exactly `kind`, in file order
    pub fn filter_by_kind(&self, kind: RecordKind) -> Vec<&LogRecord> {
        self.records.iter().filter(|r| r.kind() == kind).collect()
    }

    /// Similarity-score records for `algorithm` (case-insensitive).
    ///
    /// `kind == None` accepts both baseline and ciphertext records.
    pub fn filter_by_algorithm(&self, algorithm: &str, kind: Option<RecordKind>) -> Vec<&LogRecord> {
        self.records
            .iter()
            .filter(|r| kind.is_none_or(|k| r.kind() == k))
            .filter(|r| {
                r.similarity()
                    .is_some_and(|s| s.matches_algorithm(algorithm))
            })
            .collect()
    }

    pub fn baseline_scores(&self) -> Vec<&LogRecord> {
        self.filter_by_kind(RecordKind::BaselineScore)
    }

    pub fn ciphertext_scores(&self) -> Vec<&LogRecord> {
        self.filter_by_kind(RecordKind::CiphertextScore)
    }

    /// Baseline and ciphertext records for `algorithm`, both non-empty
    fn comparison_sides(&self, algorithm: &str) -> Result<(Vec<&LogRecord>, Vec<&LogRecord>)> {
        let missing = |kind| Error::MissingComparisonData {
            algorithm: algorithm.to_string(),
            kind,
        };

        let baseline = self.filter_by_algorithm(algorithm, Some(RecordKind::BaselineScore));
        if baseline.is_empty() {
            return Err(missing(RecordKind::BaselineScore));
        }
        let ciphertext = self.filter_by_algorithm(algorithm, Some(RecordKind::CiphertextScore));
        if ciphertext.is_empty() {
            return Err(missing(RecordKind::CiphertextScore));
        }

        Ok((baseline, ciphertext))
    }

    /// `|Σ baseline scores − Σ ciphertext scores|` for `algorithm`.
    ///
    /// Records without a score contribute nothing to their side's sum.
    pub fn score_diff(&self, algorithm: &str) -> Result<f64> {
        let (baseline, ciphertext) = self.comparison_sides(algorithm)?;

        let sum = |records: &[&LogRecord]| -> f64 {
            records
                .iter()
                .filter_map(|r| r.similarity().and_then(|s| s.score))
                .sum()
        };

        let (baseline_sum, ciphertext_sum) = (sum(&baseline), sum(&ciphertext));
        tracing::debug!(
            "{algorithm} scores: baseline sum {baseline_sum}, ciphertext sum {ciphertext_sum}"
        );

        Ok((baseline_sum - ciphertext_sum).abs())
    }

    /// `|Σ baseline durations − Σ ciphertext durations|` in microseconds.
    ///
    /// Records without a duration contribute nothing to their side's sum.
    pub fn duration_diff_micros(&self, algorithm: &str) -> Result<f64> {
        let (baseline, ciphertext) = self.comparison_sides(algorithm)?;

        let sum = |records: &[&LogRecord]| -> f64 {
            let missing = records.iter().filter(|r| r.duration().is_none()).count();
            if missing > 0 {
                tracing::warn!("{missing} {algorithm} records have no duration, counted as zero");
            }
            records.iter().filter_map(|r| r.duration()).map(as_micros).sum()
        };

        Ok((sum(&baseline) - sum(&ciphertext)).abs())
    }

    /// Mean of the present scores of `algorithm` records of `kind`
    pub fn mean_score(&self, algorithm: &str, kind: RecordKind) -> Result<f64> {
        let scores: Vec<f64> = self
            .filter_by_algorithm(algorithm, Some(kind))
            .iter()
            .filter_map(|r| r.similarity().and_then(|s| s.score))
            .collect();

        if scores.is_empty() {
            return Err(Error::MissingComparisonData {
                algorithm: algorithm.to_string(),
                kind,
            });
        }

        Ok(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    /// Mean of the present durations of `algorithm` records of `kind`
    /// (`took` for baseline, `total:` for ciphertext)
    pub fn mean_duration(&self, algorithm: &str, kind: RecordKind) -> Result<Duration> {
        mean_of(
            self.filter_by_algorithm(algorithm, Some(kind))
                .iter()
                .filter_map(|r| r.duration()),
        )
        .ok_or_else(|| Error::MissingComparisonData {
            algorithm: algorithm.to_string(),
            kind,
        })
    }

    /// Mean pre-processing time over all `Processed` records
    pub fn mean_processed_duration(&self) -> Result<Duration> {
        mean_of(
            self.filter_by_kind(RecordKind::Processed)
                .iter()
                .filter_map(|r| r.duration()),
        )
        .ok_or(Error::EmptySeries)
    }

    /// Per stage: summed duration and number of records reporting it
    fn stage_accumulate(&self, algorithm: &str) -> IndexMap<String, (Duration, i32)> {
        let mut acc: IndexMap<String, (Duration, i32)> = IndexMap::new();
        for record in self.filter_by_algorithm(algorithm, Some(RecordKind::CiphertextScore)) {
            let Some(score) = record.as_ciphertext() else {
                continue;
            };
            for (stage, duration) in &score.stage_durations {
                let (total, count) = acc
                    .entry(stage.clone())
                    .or_insert_with(|| (Duration::zero(), 0));
                *total += *duration;
                *count += 1;
            }
        }
        acc
    }

    /// Sum of each ciphertext pipeline stage over all `algorithm` records
    pub fn stage_totals(&self, algorithm: &str) -> IndexMap<String, Duration> {
        self.stage_accumulate(algorithm)
            .into_iter()
            .map(|(stage, (total, _))| (stage, total))
            .collect()
    }

    /// Mean of each ciphertext pipeline stage over the `algorithm` records
    /// that report it
    pub fn stage_means(&self, algorithm: &str) -> IndexMap<String, Duration> {
        self.stage_accumulate(algorithm)
            .into_iter()
            .map(|(stage, (total, count))| (stage, total / count))
            .collect()
    }

    /// Counts overall and for each of `algorithms`
    pub fn summary<S: AsRef<str>>(&self, algorithms: &[S]) -> LogSummary {
        let per_algorithm = algorithms
            .iter()
            .map(|a| {
                let a = a.as_ref();
                let counts = AlgorithmCounts {
                    baseline: self
                        .filter_by_algorithm(a, Some(RecordKind::BaselineScore))
                        .len(),
                    ciphertext: self
                        .filter_by_algorithm(a, Some(RecordKind::CiphertextScore))
                        .len(),
                };
                (a.to_lowercase(), counts)
            })
            .collect();

        LogSummary {
            total: self.records.len(),
            baseline: self.baseline_scores().len(),
            ciphertext: self.ciphertext_scores().len(),
            per_algorithm,
        }
    }
}

fn mean_of(durations: impl Iterator<Item = Duration>) -> Option<Duration> {
    let (total, count) = durations.fold((Duration::zero(), 0_i32), |(total, count), d| {
        (total + d, count + 1)
    });
    (count > 0).then(|| total / count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "timestamp;level;message;correlationId";

    fn write_log(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "{HEADER}").expect("write header");
        for row in rows {
            writeln!(file, "{row}").expect("write row");
        }
        file
    }

    fn sample() -> NamedTempFile {
        write_log(&[
            "2024-05-01 10:00:00;INFO;Starting benchmark;",
            "2024-05-01 10:00:01;METRIC;⚙ Processed 2s {frames: 300};abc-1",
            "2024-05-01 10:00:02;METRIC;📊 KLD Plaintext Score => 0.25 took 10ms",
            "2024-05-01 10:00:03;METRIC;📊 KLD Ciphertext Score => 0.5 (total: 40ms) in encrypt: 10ms, compute: 30ms",
            "2024-05-01 10:00:04;METRIC;📊 kld Plaintext Score => 0.75 took 20ms",
            "2024-05-01 10:00:05;METRIC;📊 KLD Ciphertext Score => 1.0 (total: 60ms) in encrypt: 20ms, compute: 40ms",
            "2024-05-01 10:00:06;METRIC;📊 Cramer Plaintext Score => 0.1 took 1ms",
        ])
    }

    #[test]
    fn test_load_keeps_all_rows_in_order() {
        let file = sample();
        let logs = LogCollection::load(file.path()).expect("load");

        assert_eq!(logs.len(), 7);
        assert_eq!(logs.all()[0].kind(), RecordKind::Log);
        assert_eq!(logs.all()[1].kind(), RecordKind::Processed);
        assert_eq!(logs.baseline_scores().len(), 3);
        assert_eq!(logs.ciphertext_scores().len(), 2);
        assert_eq!(logs.path(), Some(file.path()));
    }

    #[test]
    fn test_correlation_id_optional() {
        use crate::parser::record::RecordCore;
        let file = sample();
        let logs = LogCollection::load(file.path()).expect("load");
        assert_eq!(logs.all()[0].correlation_id(), None);
        assert_eq!(logs.all()[1].correlation_id(), Some("abc-1"));
        assert_eq!(logs.all()[2].correlation_id(), None);
    }

    #[test]
    fn test_filter_by_algorithm_is_case_insensitive() {
        let file = sample();
        let logs = LogCollection::load(file.path()).expect("load");

        assert_eq!(logs.filter_by_algorithm("kld", None).len(), 4);
        assert_eq!(
            logs.filter_by_algorithm("KLD", Some(RecordKind::BaselineScore)).len(),
            2
        );
        assert_eq!(
            logs.filter_by_algorithm("cramer", Some(RecordKind::CiphertextScore)).len(),
            0
        );
        assert!(logs
            .filter_by_algorithm("kld", Some(RecordKind::Processed))
            .is_empty());
    }

    #[test]
    fn test_score_and_duration_diff() {
        let file = sample();
        let logs = LogCollection::load(file.path()).expect("load");

        let score = logs.score_diff("kld").expect("score diff");
        assert!((score - 0.5).abs() < 1e-12);

        // baseline 10ms + 20ms, ciphertext 40ms + 60ms
        let duration = logs.duration_diff_micros("KLD").expect("duration diff");
        assert_eq!(duration, 70_000.0);
    }

    #[test]
    fn test_diff_without_ciphertext_fails() {
        let file = sample();
        let logs = LogCollection::load(file.path()).expect("load");

        let err = logs.score_diff("cramer").expect_err("no ciphertext cramer logs");
        assert!(matches!(
            err,
            Error::MissingComparisonData {
                kind: RecordKind::CiphertextScore,
                ..
            }
        ));
        assert!(logs.duration_diff_micros("cramer").is_err());
        assert!(logs.score_diff("bhattacharyya").is_err());
    }

    #[test]
    fn test_mean_score_and_stage_totals() {
        let file = sample();
        let logs = LogCollection::load(file.path()).expect("load");

        let mean = logs
            .mean_score("kld", RecordKind::BaselineScore)
            .expect("mean");
        assert!((mean - 0.5).abs() < 1e-12);

        let stages = logs.stage_totals("kld");
        assert_eq!(stages["encrypt"], Duration::milliseconds(30));
        assert_eq!(stages["compute"], Duration::milliseconds(70));

        let means = logs.stage_means("kld");
        assert_eq!(means["encrypt"], Duration::milliseconds(15));
        assert_eq!(means["compute"], Duration::milliseconds(35));
        assert!(logs.stage_means("cramer").is_empty());
    }

    #[test]
    fn test_mean_durations() {
        let file = sample();
        let logs = LogCollection::load(file.path()).expect("load");

        assert_eq!(
            logs.mean_processed_duration().expect("processed"),
            Duration::seconds(2)
        );
        assert_eq!(
            logs.mean_duration("kld", RecordKind::BaselineScore)
                .expect("baseline"),
            Duration::milliseconds(15)
        );
        assert_eq!(
            logs.mean_duration("KLD", RecordKind::CiphertextScore)
                .expect("ciphertext"),
            Duration::milliseconds(50)
        );
    }

    #[test]
    fn test_mean_without_data_names_requested_kind() {
        let file = write_log(&["2024-05-01 10:00:00;METRIC;📊 KLD Plaintext Score pending"]);
        let logs = LogCollection::load(file.path()).expect("load");

        assert!(matches!(
            logs.mean_processed_duration(),
            Err(Error::EmptySeries)
        ));
        assert!(matches!(
            logs.mean_score("kld", RecordKind::CiphertextScore),
            Err(Error::MissingComparisonData {
                kind: RecordKind::CiphertextScore,
                ..
            })
        ));
        assert!(matches!(
            logs.mean_duration("kld", RecordKind::BaselineScore),
            Err(Error::MissingComparisonData {
                kind: RecordKind::BaselineScore,
                ..
            })
        ));
    }

    #[test]
    fn test_summary() {
        let file = sample();
        let logs = LogCollection::load(file.path()).expect("load");
        let summary = logs.summary(&["kld", "cramer", "bhattacharyya"]);

        assert_eq!(summary.total, 7);
        assert_eq!(summary.baseline, 3);
        assert_eq!(
            summary.per_algorithm["kld"],
            AlgorithmCounts {
                baseline: 2,
                ciphertext: 2
            }
        );
        assert_eq!(summary.per_algorithm["bhattacharyya"].baseline, 0);
    }

    #[test]
    fn test_missing_file() {
        let err = LogCollection::load("/definitely/not/here.csv").expect_err("missing");
        assert!(matches!(err, Error::SourceNotFound { .. }));
    }

    #[test]
    fn test_short_row_aborts_load() {
        let file = write_log(&[
            "2024-05-01 10:00:00;INFO;fine",
            "2024-05-01 10:00:01;METRIC",
        ]);
        let err = LogCollection::load(file.path()).expect_err("short row");
        assert!(matches!(err, Error::MalformedRow { line: 3, .. }));
    }

    #[test]
    fn test_malformed_message_aborts_load() {
        let file = write_log(&["2024-05-01 10:00:01;METRIC;Processed 1ms {a: 1;id"]);
        let err = LogCollection::load(file.path()).expect_err("unclosed block");
        assert!(matches!(err, Error::MalformedLogMessage { line: 2, .. }));
    }

    #[test]
    fn test_load_many() {
        let a = sample();
        let b = write_log(&["2024-05-01 10:00:00;INFO;only line"]);
        let loaded =
            LogCollection::load_many(&[a.path(), b.path()], DEFAULT_DELIMITER).expect("load");

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[b.path()].len(), 1);
    }

    #[test]
    fn test_empty_file_is_empty_collection() {
        let file = NamedTempFile::new().expect("temp file");
        let logs = LogCollection::load(file.path()).expect("load");
        assert!(logs.is_empty());
    }
}
