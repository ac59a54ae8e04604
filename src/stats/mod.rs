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

//! Descriptive statistics over paired score series.

pub mod accuracy;
pub mod aggregate;
pub mod comparison;
pub mod series;

pub use accuracy::{absolute_diff, growth_percentage, Algorithm};
pub use aggregate::{ComparisonSet, FileStatistics, DEFAULT_EXTENSIONS};
pub use comparison::{AlgorithmPair, SeriesAlgorithm, SeriesKind, SeriesPair, SeriesStdDev};
pub use series::{
    cosine_similarity, jaccard_coefficient, mean, standard_deviation, Cosine, Jaccard, PairMetric,
};
