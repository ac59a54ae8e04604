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

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Similarity-scoring algorithms run on both the baseline and ciphertext paths
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Kld,
    Cramer,
    Bhattacharyya,
}

impl Algorithm {
    pub const ALL: [Self; 3] = [Self::Kld, Self::Bhattacharyya, Self::Cramer];

    /// Name as it appears in log messages (matching is case-insensitive)
    pub const fn log_name(self) -> &'static str {
        match self {
            Self::Kld => "kld",
            Self::Cramer => "cramer",
            Self::Bhattacharyya => "bhattacharyya",
        }
    }

    /// Map a raw score onto a 0-100 "similar" scale.
    ///
    /// KLD is a divergence (0 is identical), Cramer a distance, and the
    /// Bhattacharyya coefficient already a similarity in [0, 1].
    pub fn normalized_percentage(self, score: f64) -> f64 {
        match self {
            Self::Kld => 100.0 / (1.0 + score),
            Self::Cramer => (1.0 - score.abs()) * 100.0,
            Self::Bhattacharyya => score * 100.0,
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Kld => "KLD",
            Self::Cramer => "Cramer",
            Self::Bhattacharyya => "BC",
        };
        f.write_str(label)
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "kld" => Ok(Self::Kld),
            "cramer" => Ok(Self::Cramer),
            "bhattacharyya" | "bc" => Ok(Self::Bhattacharyya),
            other => Err(format!("unknown algorithm: {other}")),
        }
    }
}

pub fn absolute_diff(a: f64, b: f64) -> f64 {
    (a - b).abs()
}

/// Relative cost of the encrypted path over the plaintext one, in percent.
///
/// `None` when the plaintext value is zero.
pub fn growth_percentage(fhe: f64, plain: f64) -> Option<f64> {
    if plain == 0.0 {
        return None;
    }
    Some(absolute_diff(fhe, plain) / plain * 100.0)
}
