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

//! Error taxonomy shared by the parsers, the log collection and the
//! statistics engine.
//!
//! Every variant is fatal for the operation that raised it. Nothing in
//! this crate retries: inputs are static files.

use std::path::PathBuf;
use thiserror::Error;

use crate::parser::record::RecordKind;

/// Errors that can occur while loading, classifying or aggregating.
#[derive(Debug, Error)]
pub enum Error {
    /// A log file, comparison file or directory does not exist
    #[error("source not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },

    /// The source exists but could not be read
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A delimited row does not have the shape the loader requires
    #[error("malformed row at {}:{line}: {reason}", .path.display())]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A required segment inside a log message is structurally broken
    #[error("malformed log message at line {line}: {reason}")]
    MalformedLogMessage { line: usize, reason: String },

    /// A duration token carried a unit this crate does not know
    #[error("unknown duration unit: {0:?}")]
    UnknownUnit(String),

    /// A comparison cell is not a number
    #[error("invalid number at {}:{line}: {value:?}", .path.display())]
    InvalidNumber {
        path: PathBuf,
        line: usize,
        value: String,
    },

    /// Statistics requested on a series without elements
    #[error("cannot compute statistics of an empty series")]
    EmptySeries,

    /// Averages requested over a directory without comparison files
    #[error("no comparison files found in {}", .0.display())]
    EmptyDirectory(PathBuf),

    /// Pairwise operation on vectors of different length
    #[error("series length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },

    /// One side of a baseline/ciphertext comparison has no usable records
    #[error("missing {kind} logs for algorithm {algorithm:?}")]
    MissingComparisonData { algorithm: String, kind: RecordKind },
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Map an I/O failure on `path` to `SourceNotFound` or `Io`
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::SourceNotFound { path }
        } else {
            Self::Io { path, source }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_source_not_found() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::from_io("/tmp/missing.csv", io);
        assert!(matches!(err, Error::SourceNotFound { .. }));
        assert_eq!(err.to_string(), "source not found: /tmp/missing.csv");
    }

    #[test]
    fn test_other_io_errors_keep_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = Error::from_io("/root/secret", io);
        assert!(matches!(err, Error::Io { .. }));
    }
}
