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

//! Turns one raw row into a typed [`LogRecord`] by sniffing the message.

use super::duration::{parse_duration, DURATION_TOKEN};
use super::record::{
    BaselineScore, CiphertextScore, LogRecord, ProcessedMetric, RecordHeader, SimilarityScore,
};
use super::{parse_number, parse_param_block, ParamBlockError};
use crate::error::{Error, Result};
use chrono::Duration;
use fancy_regex::Regex;
use indexmap::IndexMap;
use std::sync::LazyLock;

pub const METRIC_LEVEL: &str = "METRIC";

const PROCESSED_MARKER: &str = "Processed";
const PLAINTEXT_MARKER: &str = "Plaintext Score";
const CIPHERTEXT_MARKER: &str = "Ciphertext Score";
const STAGE_SEPARATOR: &str = " in ";

static SCORE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"=>\s+([0-9.eE+-]+)\s").expect("valid regex literal"));

static TOOK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("took ({DURATION_TOKEN})")).expect("valid regex literal")
});

static TOTAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("total: ({DURATION_TOKEN})")).expect("valid regex literal")
});

/// Classify one row.
///
/// Non-`METRIC` rows and metric rows without a known marker become
/// [`LogRecord::Log`]. Marker priority: `Processed`, then
/// `Plaintext Score`, then `Ciphertext Score`.
pub fn classify(
    timestamp: &str,
    level: &str,
    message: &str,
    correlation_id: Option<&str>,
    line_number: usize,
) -> Result<LogRecord> {
    let header = RecordHeader::new(
        timestamp.to_string(),
        level.to_string(),
        message.to_string(),
        correlation_id.map(str::to_string),
        line_number,
    );

    if level != METRIC_LEVEL {
        return Ok(LogRecord::Log(header));
    }

    if message.contains(PROCESSED_MARKER) {
        processed(header).map(LogRecord::Processed)
    } else if message.contains(PLAINTEXT_MARKER) {
        baseline(header).map(LogRecord::BaselineScore)
    } else if message.contains(CIPHERTEXT_MARKER) {
        ciphertext(header).map(LogRecord::CiphertextScore)
    } else {
        Ok(LogRecord::Log(header))
    }
}

fn malformed(line: usize, err: &ParamBlockError) -> Error {
    Error::MalformedLogMessage {
        line,
        reason: err.to_string(),
    }
}

fn processed(header: RecordHeader) -> Result<ProcessedMetric> {
    let message = &header.message;
    let before_brace = message.split('{').next().unwrap_or_default();
    let duration = parse_duration(before_brace)?;
    let params = parse_param_block(message).map_err(|e| malformed(header.line_number, &e))?;

    Ok(ProcessedMetric {
        header,
        duration,
        params,
    })
}

fn similarity(header: RecordHeader) -> Result<SimilarityScore> {
    let algorithm = header
        .message
        .split_whitespace()
        .nth(1)
        .ok_or_else(|| Error::MalformedLogMessage {
            line: header.line_number,
            reason: "missing algorithm name (second word)".to_string(),
        })?
        .to_string();

    let score = match SCORE_PATTERN.captures(&header.message) {
        Ok(Some(caps)) => parse_number(&caps[1]),
        _ => None,
    };

    Ok(SimilarityScore {
        header,
        algorithm,
        score,
    })
}

fn duration_after(pattern: &Regex, message: &str) -> Result<Option<Duration>> {
    match pattern.captures(message) {
        Ok(Some(caps)) => parse_duration(&caps[1]).map(Some),
        _ => Ok(None),
    }
}

fn baseline(header: RecordHeader) -> Result<BaselineScore> {
    let similarity = similarity(header)?;
    let duration = duration_after(&TOOK_PATTERN, &similarity.header.message)?;

    Ok(BaselineScore {
        similarity,
        duration,
    })
}

fn ciphertext(header: RecordHeader) -> Result<CiphertextScore> {
    let similarity = similarity(header)?;
    let message = &similarity.header.message;
    let duration = duration_after(&TOTAL_PATTERN, message)?;

    // Stage list runs from the first " in " to the next one (or end of message).
    let stage_durations = match message.split(STAGE_SEPARATOR).nth(1) {
        Some(segment) => {
            let block = format!("{{{segment}}}");
            let stages = parse_param_block(&block)
                .map_err(|e| malformed(similarity.header.line_number, &e))?;
            stages
                .into_iter()
                .map(|(stage, value)| Ok((stage, parse_duration(&value)?)))
                .collect::<Result<IndexMap<_, _>>>()?
        }
        None => IndexMap::new(),
    };

    Ok(CiphertextScore {
        similarity,
        duration,
        stage_durations,
    })
}
