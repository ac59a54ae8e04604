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

use crate::error::{Error, Result};
use std::collections::HashSet;

/// Similarity measure between two numeric series
pub trait PairMetric {
    /// Short name used in logs and reports
    const NAME: &'static str;

    fn compare(a: &[f64], b: &[f64]) -> Result<f64>;
}

/// Set-based intersection over union
pub struct Jaccard;

/// Normalized dot product
pub struct Cosine;

impl PairMetric for Jaccard {
    const NAME: &'static str = "jaccard";

    fn compare(a: &[f64], b: &[f64]) -> Result<f64> {
        Ok(jaccard_coefficient(a, b))
    }
}

impl PairMetric for Cosine {
    const NAME: &'static str = "cosine";

    fn compare(a: &[f64], b: &[f64]) -> Result<f64> {
        cosine_similarity(a, b)
    }
}

/// Arithmetic mean
pub fn mean(series: &[f64]) -> Result<f64> {
    if series.is_empty() {
        return Err(Error::EmptySeries);
    }
    Ok(series.iter().sum::<f64>() / series.len() as f64)
}

/// Population standard deviation (divides by N)
pub fn standard_deviation(series: &[f64]) -> Result<f64> {
    let mean = mean(series)?;
    let variance = series.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / series.len() as f64;
    Ok(variance.sqrt())
}

/// Set key with exact float equality; `-0.0` and `0.0` are the same member.
fn set_key(value: f64) -> u64 {
    if value == 0.0 {
        0.0_f64.to_bits()
    } else {
        value.to_bits()
    }
}

/// `|A ∩ B| / |A ∪ B|` over the distinct values of each series.
///
/// Values are compared exactly, duplicates collapse. Two empty series give
/// `0.0`.
pub fn jaccard_coefficient(a: &[f64], b: &[f64]) -> f64 {
    let a: HashSet<u64> = a.iter().copied().map(set_key).collect();
    let b: HashSet<u64> = b.iter().copied().map(set_key).collect();

    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Cosine of the angle between two equal-length vectors.
///
/// A zero-magnitude vector gives `0.0`.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let magnitude_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let magnitude_b = b.iter().map(|y| y * y).sum::<f64>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (magnitude_a * magnitude_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_deviation_textbook() {
        let sd = standard_deviation(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).expect("sd");
        assert_eq!(sd, 2.0);
    }

    #[test]
    fn test_standard_deviation_single_value() {
        assert_eq!(standard_deviation(&[3.5]).expect("sd"), 0.0);
    }

    #[test]
    fn test_standard_deviation_empty() {
        assert!(matches!(standard_deviation(&[]), Err(Error::EmptySeries)));
    }

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard_coefficient(&[1.0, 2.0, 3.0], &[2.0, 3.0, 4.0]), 0.5);
        assert_eq!(jaccard_coefficient(&[], &[]), 0.0);
        assert_eq!(jaccard_coefficient(&[1.0], &[]), 0.0);
    }

    #[test]
    fn test_jaccard_collapses_duplicates() {
        assert_eq!(jaccard_coefficient(&[1.0, 1.0, 1.0], &[1.0]), 1.0);
    }

    #[test]
    fn test_jaccard_exact_equality() {
        let near = 0.1 + 0.2;
        assert_eq!(jaccard_coefficient(&[0.3], &[near]), 0.0);
        assert_eq!(jaccard_coefficient(&[0.0], &[-0.0]), 1.0);
    }

    #[test]
    fn test_cosine() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).expect("cos"), 0.0);
        let same = cosine_similarity(&[1.0, 1.0], &[1.0, 1.0]).expect("cos");
        assert!((same - 1.0).abs() < 1e-12);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).expect("cos"), 0.0);
    }

    #[test]
    fn test_cosine_length_mismatch() {
        let err = cosine_similarity(&[1.0], &[1.0, 2.0]).expect_err("mismatch");
        assert!(matches!(err, Error::LengthMismatch { left: 1, right: 2 }));
    }

    #[test]
    fn test_pair_metrics() {
        assert_eq!(Jaccard::compare(&[1.0, 2.0], &[2.0, 1.0]).expect("jaccard"), 1.0);
        assert_eq!(Cosine::compare(&[0.0], &[5.0]).expect("cosine"), 0.0);
        assert_eq!(Jaccard::NAME, "jaccard");
    }
}
