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

//! Per-file and cross-file statistics over a directory of comparison files.
//!
//! Averages are unweighted: each file contributes its own statistic once,
//! regardless of how many samples it holds.

use crate::error::{Error, Result};
use crate::stats::comparison::{AlgorithmPair, SeriesPair, SeriesStdDev};
use crate::stats::series::{Cosine, Jaccard, PairMetric};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTENSIONS: &[&str] = &["csv"];

/// Statistics of a single comparison file
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FileStatistics {
    pub samples: usize,
    pub standard_deviation: SeriesStdDev,
    pub jaccard: AlgorithmPair,
    pub cosine: AlgorithmPair,
}

/// All comparison files of one directory, keyed and ordered by file name
#[derive(Debug, Clone, Default, Serialize)]
pub struct ComparisonSet {
    directory: PathBuf,
    files: BTreeMap<String, SeriesPair>,
}

impl ComparisonSet {
    /// Load every `.csv` file in `directory`
    pub fn load_directory(directory: impl AsRef<Path>) -> Result<Self> {
        Self::load_directory_with(directory, DEFAULT_EXTENSIONS)
    }

    /// Load every file whose extension matches one of `extensions`
    /// (case-insensitive). Files are parsed in parallel.
    pub fn load_directory_with<S: AsRef<str>>(
        directory: impl AsRef<Path>,
        extensions: &[S],
    ) -> Result<Self> {
        let directory = directory.as_ref();
        let entries = std::fs::read_dir(directory).map_err(|e| Error::from_io(directory, e))?;

        let mut candidates = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| Error::from_io(directory, e))?.path();
            if !path.is_file() {
                continue;
            }
            let recognized = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| extensions.iter().any(|e| e.as_ref().eq_ignore_ascii_case(ext)));
            if !recognized {
                tracing::debug!("Skipping {}", path.display());
                continue;
            }
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
                continue;
            };
            candidates.push((name, path));
        }

        let files = candidates
            .into_par_iter()
            .map(|(name, path)| SeriesPair::load(&path).map(|pair| (name, pair)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        tracing::info!(
            "Loaded {} comparison files from {}",
            files.len(),
            directory.display()
        );

        Ok(Self {
            directory: directory.to_path_buf(),
            files,
        })
    }

    pub fn from_files(directory: impl Into<PathBuf>, files: BTreeMap<String, SeriesPair>) -> Self {
        Self {
            directory: directory.into(),
            files,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Loaded series, sorted by file name
    pub const fn files(&self) -> &BTreeMap<String, SeriesPair> {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn ensure_not_empty(&self) -> Result<()> {
        if self.files.is_empty() {
            return Err(Error::EmptyDirectory(self.directory.clone()));
        }
        Ok(())
    }

    /// Standard deviation, Jaccard and cosine of every file
    pub fn file_statistics(&self) -> Result<BTreeMap<String, FileStatistics>> {
        self.files
            .iter()
            .map(|(name, pair)| {
                let stats = FileStatistics {
                    samples: pair.len(),
                    standard_deviation: pair.standard_deviations()?,
                    jaccard: pair.similarity::<Jaccard>()?,
                    cosine: pair.similarity::<Cosine>()?,
                };
                Ok((name.clone(), stats))
            })
            .collect()
    }

    /// Mean over files of each series' own standard deviation
    pub fn average_standard_deviation(&self) -> Result<SeriesStdDev> {
        self.ensure_not_empty()?;

        let mut total = SeriesStdDev {
            kld_dart: 0.0,
            cramer_dart: 0.0,
            kld_sso: 0.0,
            cramer_sso: 0.0,
        };
        for pair in self.files.values() {
            let sd = pair.standard_deviations()?;
            total.kld_dart += sd.kld_dart;
            total.cramer_dart += sd.cramer_dart;
            total.kld_sso += sd.kld_sso;
            total.cramer_sso += sd.cramer_sso;
        }

        let n = self.files.len() as f64;
        Ok(SeriesStdDev {
            kld_dart: total.kld_dart / n,
            cramer_dart: total.cramer_dart / n,
            kld_sso: total.kld_sso / n,
            cramer_sso: total.cramer_sso / n,
        })
    }

    fn average_pair_metric<M: PairMetric>(&self) -> Result<AlgorithmPair> {
        self.ensure_not_empty()?;

        let (mut kld, mut cramer) = (0.0, 0.0);
        for pair in self.files.values() {
            let value = pair.similarity::<M>()?;
            kld += value.kld;
            cramer += value.cramer;
        }

        let n = self.files.len() as f64;
        tracing::debug!("Averaged {} over {n} files", M::NAME);
        Ok(AlgorithmPair {
            kld: kld / n,
            cramer: cramer / n,
        })
    }

    /// Mean over files of the Dart-vs-SSO Jaccard coefficient
    pub fn average_jaccard(&self) -> Result<AlgorithmPair> {
        self.average_pair_metric::<Jaccard>()
    }

    /// Mean over files of the Dart-vs-SSO cosine similarity
    pub fn average_cosine(&self) -> Result<AlgorithmPair> {
        self.average_pair_metric::<Cosine>()
    }
}
