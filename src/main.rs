/// `SimLog` - Baseline vs. ciphertext benchmark log analyzer
///
/// Copyright (C) 2026 SimLog Contributors
///
/// This program is free software: you can redistribute it and/or modify
/// it under the terms of the GNU General Public License as published by
/// the Free Software Foundation, either version 3 of the License, or
/// (at your option) any later version.
///
/// This program is distributed in the hope that it will be useful,
/// but WITHOUT ANY WARRANTY; without even the implied warranty of
/// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
/// GNU General Public License for more details.
///
/// You should have received a copy of the GNU General Public License
/// along with this program.  If not, see <https://www.gnu.org/licenses/>.
use anyhow::Context;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use serde::Serialize;
use simlog::config::AnalysisConfig;
use simlog::core::{LogCollection, LogSummary};
use simlog::parser::format_duration;
use simlog::parser::record::RecordKind;
use simlog::stats::{
    growth_percentage, Algorithm, AlgorithmPair, ComparisonSet, FileStatistics, SeriesStdDev,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "simlog")]
#[command(version)]
#[command(about = "Compare plaintext and ciphertext similarity-score benchmark logs", long_about = None)]
struct Args {
    /// Config file to use instead of the one in the user config directory
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize benchmark log files and diff baseline vs. ciphertext per algorithm
    Logs {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Per-file and averaged statistics of a directory of comparison files
    Compare {
        #[arg(value_name = "DIR")]
        directory: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration file
    InitConfig,
}

/// Score and duration deltas of one algorithm, or why they are unavailable
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AlgorithmReport {
    Compared {
        score_diff: f64,
        duration_diff_micros: f64,
        baseline_mean_micros: Option<i64>,
        ciphertext_mean_micros: Option<i64>,
        /// Mean ciphertext score on a 0-100 scale, for known algorithms
        accuracy_percent: Option<f64>,
        /// Ciphertext mean time over plaintext mean time
        time_overhead_percent: Option<f64>,
        stage_means_micros: IndexMap<String, i64>,
    },
    Missing {
        error: String,
    },
}

#[derive(Debug, Serialize)]
struct LogReport {
    summary: LogSummary,
    /// Mean pre-processing time, absent when the log has no `Processed` rows
    processed_mean_micros: Option<i64>,
    algorithms: BTreeMap<String, AlgorithmReport>,
}

#[derive(Debug, Serialize)]
struct CompareReport {
    files: BTreeMap<String, FileStatistics>,
    average_standard_deviation: SeriesStdDev,
    average_jaccard: AlgorithmPair,
    average_cosine: AlgorithmPair,
}

fn main() -> anyhow::Result<()> {
    // Set RUST_LOG environment variable to override (e.g., RUST_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(
        "SimLog starting up (version {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AnalysisConfig::load_from(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AnalysisConfig::load(),
    };

    match args.cmd {
        Command::Logs { files, json } => run_logs(&config, &files, json),
        Command::Compare { directory, json } => run_compare(&config, &directory, json),
        Command::InitConfig => {
            let path = AnalysisConfig::default()
                .save()
                .context("writing default config")?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

fn micros(duration: chrono::Duration) -> i64 {
    duration.num_microseconds().unwrap_or(i64::MAX)
}

fn compare_algorithm(logs: &LogCollection, algorithm: &str) -> simlog::Result<AlgorithmReport> {
    let score_diff = logs.score_diff(algorithm)?;
    let duration_diff_micros = logs.duration_diff_micros(algorithm)?;
    let baseline_mean = logs
        .mean_duration(algorithm, RecordKind::BaselineScore)
        .ok()
        .map(micros);
    let ciphertext_mean = logs
        .mean_duration(algorithm, RecordKind::CiphertextScore)
        .ok()
        .map(micros);

    let accuracy_percent = match algorithm.parse::<Algorithm>() {
        Ok(known) => logs
            .mean_score(algorithm, RecordKind::CiphertextScore)
            .ok()
            .map(|score| known.normalized_percentage(score)),
        Err(_) => None,
    };

    Ok(AlgorithmReport::Compared {
        score_diff,
        duration_diff_micros,
        baseline_mean_micros: baseline_mean,
        ciphertext_mean_micros: ciphertext_mean,
        accuracy_percent,
        time_overhead_percent: baseline_mean
            .zip(ciphertext_mean)
            .and_then(|(plain, fhe)| growth_percentage(fhe as f64, plain as f64)),
        stage_means_micros: logs
            .stage_means(algorithm)
            .into_iter()
            .map(|(stage, d)| (stage, micros(d)))
            .collect(),
    })
}

fn log_report(config: &AnalysisConfig, logs: &LogCollection) -> LogReport {
    let algorithms = config
        .algorithms
        .iter()
        .map(|algorithm| {
            let report = compare_algorithm(logs, algorithm).unwrap_or_else(|e| {
                AlgorithmReport::Missing {
                    error: e.to_string(),
                }
            });
            (algorithm.to_lowercase(), report)
        })
        .collect();

    LogReport {
        summary: logs.summary(&config.algorithms),
        processed_mean_micros: logs.mean_processed_duration().ok().map(micros),
        algorithms,
    }
}

fn run_logs(config: &AnalysisConfig, files: &[PathBuf], json: bool) -> anyhow::Result<()> {
    let loaded = LogCollection::load_many(files, config.log_delimiter)
        .context("loading benchmark logs")?;

    let reports: BTreeMap<String, LogReport> = loaded
        .iter()
        .map(|(path, logs)| (path.display().to_string(), log_report(config, logs)))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for (path, report) in &reports {
        let summary = &report.summary;
        println!("{path}");
        println!(
            "  {} records, {} baseline scores, {} ciphertext scores",
            summary.total, summary.baseline, summary.ciphertext
        );
        if let Some(processed) = report.processed_mean_micros {
            println!(
                "  pre-processing: {} on average",
                format_duration(chrono::Duration::microseconds(processed))
            );
        }
        for (algorithm, counts) in &summary.per_algorithm {
            println!(
                "  - {algorithm}: {} baseline, {} ciphertext",
                counts.baseline, counts.ciphertext
            );
        }
        for (algorithm, result) in &report.algorithms {
            match result {
                AlgorithmReport::Compared {
                    score_diff,
                    duration_diff_micros,
                    baseline_mean_micros,
                    ciphertext_mean_micros,
                    accuracy_percent,
                    time_overhead_percent,
                    stage_means_micros,
                } => {
                    let duration =
                        chrono::Duration::microseconds(duration_diff_micros.round() as i64);
                    println!(
                        "  {algorithm}: score diff {score_diff:.2e}, duration diff {}",
                        format_duration(duration)
                    );
                    if let (Some(plain), Some(fhe)) = (baseline_mean_micros, ciphertext_mean_micros)
                    {
                        println!(
                            "      mean time: plaintext {}, ciphertext {}",
                            format_duration(chrono::Duration::microseconds(*plain)),
                            format_duration(chrono::Duration::microseconds(*fhe))
                        );
                    }
                    if let Some(overhead) = time_overhead_percent {
                        println!("      time overhead: {overhead:.1}%");
                    }
                    if let Some(accuracy) = accuracy_percent {
                        println!("      accuracy: {accuracy:.2}%");
                    }
                    for (stage, mean) in stage_means_micros {
                        println!(
                            "      {stage}: {}",
                            format_duration(chrono::Duration::microseconds(*mean))
                        );
                    }
                }
                AlgorithmReport::Missing { error } => println!("  {algorithm}: {error}"),
            }
        }
    }

    Ok(())
}

fn run_compare(config: &AnalysisConfig, directory: &Path, json: bool) -> anyhow::Result<()> {
    let set = ComparisonSet::load_directory_with(directory, config.comparison_extensions.as_slice())
        .with_context(|| format!("loading comparison files from {}", directory.display()))?;

    let report = CompareReport {
        files: set.file_statistics()?,
        average_standard_deviation: set.average_standard_deviation()?,
        average_jaccard: set.average_jaccard()?,
        average_cosine: set.average_cosine()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (name, stats) in &report.files {
        let sd = &stats.standard_deviation;
        println!(
            "{name} ({} samples): stdev kldDart {:.4e} kldSSO {:.4e} cramerDart {:.4e} cramerSSO {:.4e}; \
             jaccard kld {:.3} cramer {:.3}; cosine kld {:.3} cramer {:.3}",
            stats.samples,
            sd.kld_dart,
            sd.kld_sso,
            sd.cramer_dart,
            sd.cramer_sso,
            stats.jaccard.kld,
            stats.jaccard.cramer,
            stats.cosine.kld,
            stats.cosine.cramer,
        );
    }

    let sd = &report.average_standard_deviation;
    println!(
        "average over {} files: stdev kldDart {:.4e} kldSSO {:.4e} cramerDart {:.4e} cramerSSO {:.4e}",
        set.len(),
        sd.kld_dart,
        sd.kld_sso,
        sd.cramer_dart,
        sd.cramer_sso
    );
    println!(
        "average jaccard: kld {:.3} cramer {:.3}; average cosine: kld {:.3} cramer {:.3}",
        report.average_jaccard.kld,
        report.average_jaccard.cramer,
        report.average_cosine.kld,
        report.average_cosine.cramer
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn load(rows: &[&str]) -> LogCollection {
        let mut file = NamedTempFile::new().expect("temp file");
        writeln!(file, "timestamp;level;message;correlationId").expect("write header");
        for row in rows {
            writeln!(file, "{row}").expect("write row");
        }
        LogCollection::load(file.path()).expect("load")
    }

    #[test]
    fn test_log_report_timings_and_accuracy() {
        let logs = load(&[
            "t;METRIC;⚙ Processed 2s {frames: 300}",
            "t;METRIC;⚙ Processed 4s {frames: 300}",
            "t;METRIC;📊 KLD Plaintext Score => 0.0 took 10ms",
            "t;METRIC;📊 KLD Ciphertext Score => 1.0 (total: 30ms) in encrypt: 30ms",
        ]);
        let config = AnalysisConfig {
            algorithms: vec!["kld".to_string(), "cramer".to_string()],
            ..AnalysisConfig::default()
        };

        let report = log_report(&config, &logs);
        assert_eq!(report.processed_mean_micros, Some(3_000_000));

        let AlgorithmReport::Compared {
            baseline_mean_micros,
            ciphertext_mean_micros,
            accuracy_percent,
            time_overhead_percent,
            ..
        } = &report.algorithms["kld"]
        else {
            unreachable!("kld has both sides");
        };
        assert_eq!(*baseline_mean_micros, Some(10_000));
        assert_eq!(*ciphertext_mean_micros, Some(30_000));
        assert_eq!(*accuracy_percent, Some(50.0));
        assert_eq!(*time_overhead_percent, Some(200.0));

        assert!(matches!(
            report.algorithms["cramer"],
            AlgorithmReport::Missing { .. }
        ));
    }

    #[test]
    fn test_log_report_without_processed_rows() {
        let logs = load(&["t;INFO;starting"]);
        let report = log_report(&AnalysisConfig::default(), &logs);
        assert_eq!(report.processed_mean_micros, None);
    }
}
