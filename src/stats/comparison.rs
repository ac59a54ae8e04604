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

//! Paired Dart/SSO score series read from one comparison file.
//!
//! File layout: one header row, then rows of exactly four numbers
//! `kldDart,cramerDart,kldSSO,cramerSSO`.

use crate::error::{Error, Result};
use crate::parser::split_fields;
use crate::stats::series::{standard_deviation, PairMetric};
use serde::Serialize;
use std::path::Path;

const COLUMNS: usize = 4;

/// One of the four series in a comparison file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesKind {
    KldDart,
    CramerDart,
    KldSso,
    CramerSso,
}

impl SeriesKind {
    pub const ALL: [Self; 4] = [Self::KldDart, Self::CramerDart, Self::KldSso, Self::CramerSso];
}

/// Algorithm whose Dart and SSO series are compared with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesAlgorithm {
    Kld,
    Cramer,
}

/// Four equal-length series, one value per benchmark sample
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPair {
    pub kld_dart: Vec<f64>,
    pub cramer_dart: Vec<f64>,
    pub kld_sso: Vec<f64>,
    pub cramer_sso: Vec<f64>,
}

/// Standard deviation of each series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesStdDev {
    pub kld_dart: f64,
    pub cramer_dart: f64,
    pub kld_sso: f64,
    pub cramer_sso: f64,
}

/// A Dart-vs-SSO similarity value for each algorithm
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlgorithmPair {
    pub kld: f64,
    pub cramer: f64,
}

impl SeriesPair {
    /// Read a comma-separated comparison file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::from_io(path, e))?;

        let mut pair = Self::default();
        for (idx, row) in content.lines().enumerate().skip(1) {
            let line_number = idx + 1;
            if row.trim().is_empty() {
                continue;
            }

            let fields = split_fields(row.trim(), ',');
            if fields.len() != COLUMNS {
                return Err(Error::MalformedRow {
                    path: path.to_path_buf(),
                    line: line_number,
                    reason: format!("expected {COLUMNS} numeric fields, found {}", fields.len()),
                });
            }

            let mut values = [0.0; COLUMNS];
            for (slot, field) in values.iter_mut().zip(&fields) {
                *slot = field.trim().parse().map_err(|_| Error::InvalidNumber {
                    path: path.to_path_buf(),
                    line: line_number,
                    value: field.clone(),
                })?;
            }

            let [kld_dart, cramer_dart, kld_sso, cramer_sso] = values;
            pair.kld_dart.push(kld_dart);
            pair.cramer_dart.push(cramer_dart);
            pair.kld_sso.push(kld_sso);
            pair.cramer_sso.push(cramer_sso);
        }

        tracing::debug!("Read {} samples from {}", pair.len(), path.display());
        Ok(pair)
    }

    /// Number of samples (rows)
    pub fn len(&self) -> usize {
        self.kld_dart.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kld_dart.is_empty()
    }

    pub fn series(&self, kind: SeriesKind) -> &[f64] {
        match kind {
            SeriesKind::KldDart => &self.kld_dart,
            SeriesKind::CramerDart => &self.cramer_dart,
            SeriesKind::KldSso => &self.kld_sso,
            SeriesKind::CramerSso => &self.cramer_sso,
        }
    }

    /// The (Dart, SSO) series of `algorithm`
    pub fn dart_and_sso(&self, algorithm: SeriesAlgorithm) -> (&[f64], &[f64]) {
        match algorithm {
            SeriesAlgorithm::Kld => (&self.kld_dart, &self.kld_sso),
            SeriesAlgorithm::Cramer => (&self.cramer_dart, &self.cramer_sso),
        }
    }

    pub fn standard_deviations(&self) -> Result<SeriesStdDev> {
        Ok(SeriesStdDev {
            kld_dart: standard_deviation(&self.kld_dart)?,
            cramer_dart: standard_deviation(&self.cramer_dart)?,
            kld_sso: standard_deviation(&self.kld_sso)?,
            cramer_sso: standard_deviation(&self.cramer_sso)?,
        })
    }

    /// Dart-vs-SSO similarity of both algorithms under metric `M`
    pub fn similarity<M: PairMetric>(&self) -> Result<AlgorithmPair> {
        let (kld_dart, kld_sso) = self.dart_and_sso(SeriesAlgorithm::Kld);
        let (cramer_dart, cramer_sso) = self.dart_and_sso(SeriesAlgorithm::Cramer);
        Ok(AlgorithmPair {
            kld: M::compare(kld_dart, kld_sso)?,
            cramer: M::compare(cramer_dart, cramer_sso)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::series::{Cosine, Jaccard};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(content.as_bytes()).expect("write");
        file
    }

    #[test]
    fn test_load_columns_in_order() {
        let file = write_csv("kldDart,cramerDart,kldSSO,cramerSSO\n1,2,3,4\n5,6,7,8\n");
        let pair = SeriesPair::load(file.path()).expect("load");

        assert_eq!(pair.len(), 2);
        assert_eq!(pair.kld_dart, vec![1.0, 5.0]);
        assert_eq!(pair.cramer_dart, vec![2.0, 6.0]);
        assert_eq!(pair.kld_sso, vec![3.0, 7.0]);
        assert_eq!(pair.cramer_sso, vec![4.0, 8.0]);
        assert_eq!(pair.series(SeriesKind::KldSso), &[3.0, 7.0]);
    }

    #[test]
    fn test_header_only_is_empty() {
        let file = write_csv("kldDart,cramerDart,kldSSO,cramerSSO\n");
        let pair = SeriesPair::load(file.path()).expect("load");
        assert!(pair.is_empty());
        assert!(matches!(pair.standard_deviations(), Err(Error::EmptySeries)));
    }

    #[test]
    fn test_scientific_notation_and_crlf() {
        let file = write_csv("h1,h2,h3,h4\r\n1e-3,-2.5E2,0.5,3\r\n");
        let pair = SeriesPair::load(file.path()).expect("load");
        assert_eq!(pair.kld_dart, vec![0.001]);
        assert_eq!(pair.cramer_dart, vec![-250.0]);
    }

    #[test]
    fn test_wrong_column_count() {
        let file = write_csv("h\n1,2,3\n");
        let err = SeriesPair::load(file.path()).expect_err("three columns");
        assert!(matches!(err, Error::MalformedRow { line: 2, .. }));
    }

    #[test]
    fn test_invalid_number() {
        let file = write_csv("h\n1,2,x,4\n");
        let err = SeriesPair::load(file.path()).expect_err("not a number");
        assert!(matches!(err, Error::InvalidNumber { ref value, .. } if value == "x"));
    }

    #[test]
    fn test_similarities() {
        let file = write_csv("h\n1,0,1,0\n2,1,2,1\n");
        let pair = SeriesPair::load(file.path()).expect("load");

        let jaccard = pair.similarity::<Jaccard>().expect("jaccard");
        assert_eq!(jaccard.kld, 1.0);
        assert_eq!(jaccard.cramer, 1.0);

        let cosine = pair.similarity::<Cosine>().expect("cosine");
        assert!((cosine.kld - 1.0).abs() < 1e-12);
    }
}
