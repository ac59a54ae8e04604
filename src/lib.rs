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

//! Benchmark log analysis for plaintext vs. homomorphically encrypted
//! similarity scoring.
//!
//! - [`parser`] turns raw log rows into typed records.
//! - [`core`] loads a log file and answers score/duration queries.
//! - [`stats`] compares paired Dart/SSO score series across files.

pub mod config;
pub mod core;
pub mod error;
pub mod parser;
pub mod stats;

pub use error::{Error, Result};
