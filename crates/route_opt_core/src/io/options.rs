use std::{env, path::Path};

use log::LevelFilter;
use route_opt_derive::{CliOptions, CliValue, KvDisplay};

use crate::{Error, OptimizerConfig, Result, StartSampler, TwoOptConfig};

/// Runtime options for one optimizer invocation.
#[derive(Clone, Debug, CliOptions, KvDisplay)]
pub struct OptimizerOptions {
    /// Route shape: `open` path from the start or `closed` round trip.
    #[cli(long = "shape", parse_with = "RouteShape::parse", choices = "RouteShape::VARIANTS")]
    pub shape: RouteShape,
    /// Fixed start stop (0-based). `none` samples starts instead.
    #[cli(long = "start")]
    #[kv(fmt = "opt")]
    pub start: Option<usize>,
    /// Cap on full 2-opt passes per start.
    #[cli(long = "max-iterations")]
    pub max_iterations: usize,
    /// Minimum gain in km for a 2-opt swap to be applied.
    #[cli(long = "improvement-threshold")]
    pub improvement_threshold: f64,
    /// Up to this many stops every stop is tried as a start.
    #[cli(long = "exhaustive-limit")]
    pub exhaustive_limit: usize,
    #[cli(long = "max-candidates")]
    pub max_candidates: usize,
    /// Seed for the random part of start sampling.
    #[cli(long = "seed")]
    pub seed: u64,
    /// Multiple of the average edge above which an edge counts as an outlier.
    #[cli(long = "outlier-factor")]
    pub outlier_factor: f64,
    #[cli(long = "name-column")]
    pub name_column: usize,
    #[cli(long = "lat-column")]
    pub lat_column: usize,
    #[cli(long = "lng-column")]
    pub lng_column: usize,
    /// Field separator of the input file.
    #[cli(long = "delimiter", parse_with = "parse_delimiter")]
    #[kv(fmt = "debug")]
    pub delimiter: char,
    /// Whether the first non-empty input line is a header.
    #[cli(flag)]
    pub header: bool,
    /// Structured logging level.
    #[cli(long = "log-level", parse_with = "LogLevel::parse", choices = "LogLevel::VARIANTS")]
    pub log_level: LogLevel,
    /// Logging output format.
    #[cli(long = "log-format", parse_with = "LogFormat::parse", choices = "LogFormat::VARIANTS")]
    pub log_format: LogFormat,
    /// Include timestamps in log lines.
    #[cli(flag)]
    pub log_timestamp: bool,
    /// Optional output file path for logs and metrics. Empty means stderr.
    #[cli(long = "log-output")]
    #[kv(fmt = "text")]
    pub log_output: String,
    /// Optional input file path for stops. Empty means stdin.
    #[cli(long = "input")]
    #[kv(fmt = "text")]
    pub input: String,
    /// Optional output file path for the ordered route. Empty means stdout.
    #[cli(long = "output")]
    #[kv(fmt = "text")]
    pub output: String,
    /// Optional output file path for the per-start comparison table.
    #[cli(long = "candidates-output")]
    #[kv(fmt = "text")]
    pub candidates_output: String,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, CliValue)]
#[cli_value(option = "shape")]
pub enum RouteShape {
    /// Path from the start without a return leg.
    #[default]
    #[cli(alias = "path")]
    Open,
    /// Round trip back to the start.
    #[cli(alias = "loop")]
    #[cli(alias = "cycle")]
    Closed,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-level")]
pub enum LogLevel {
    Error,
    #[cli(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
    Off,
}

impl LogLevel {
    pub fn to_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
            Self::Off => LevelFilter::Off,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, CliValue)]
#[cli_value(option = "log-format")]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        let two_opt = TwoOptConfig::default();
        let sampler = StartSampler::default();
        Self {
            shape: RouteShape::Open,
            start: None,
            max_iterations: two_opt.max_iterations,
            improvement_threshold: two_opt.improvement_threshold_km,
            exhaustive_limit: sampler.exhaustive_limit,
            max_candidates: sampler.max_candidates,
            seed: sampler.seed,
            outlier_factor: 10.0,
            name_column: 0,
            lat_column: 1,
            lng_column: 2,
            delimiter: ',',
            header: true,
            log_level: LogLevel::Warn,
            log_format: LogFormat::Compact,
            log_timestamp: true,
            log_output: String::new(),
            input: String::new(),
            output: String::new(),
            candidates_output: String::new(),
        }
    }
}

impl OptimizerOptions {
    pub fn from_args() -> Result<Self> {
        Self::parse_from_iter(env::args().skip(1))
    }

    fn parse_from_iter<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        let mut args = args
            .into_iter()
            .map(|arg| arg.as_ref().to_owned())
            .peekable();

        while let Some(arg) = args.next() {
            if arg == "--help" || arg == "-h" {
                return Err(Error::invalid_input(Self::usage()));
            }

            let Some(raw_name) = arg.strip_prefix("--") else {
                return Err(Error::invalid_input(format!(
                    "Unexpected argument: {arg}\n\n{}",
                    Self::usage()
                )));
            };

            if raw_name.is_empty() {
                return Err(Error::invalid_input(format!(
                    "Invalid option name: {arg}\n\n{}",
                    Self::usage()
                )));
            }

            let (name, value) = Self::split_arg(raw_name, &mut args);
            if !options.apply_cli_option(&name, value)? {
                return Err(Error::invalid_input(format!(
                    "Unknown option: --{name}\n\n{}",
                    Self::usage()
                )));
            }
        }

        Ok(options)
    }

    pub fn usage() -> String {
        let mut text = String::from(concat!(
            "Usage:\n",
            "  route-opt [options] [--input stops.csv]\n",
            "  route-opt [options] < stops.csv\n\n",
            "Options:\n",
        ));
        for line in Self::cli_usage_lines() {
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(concat!(
            "  --help\n",
            "\n",
            "Examples:\n",
            "  route-opt --input stops.csv --output route.csv\n",
            "  route-opt --shape closed --start 0 --log-level info < stops.csv\n",
            "  route-opt --lat-column 3 --lng-column 2 --delimiter ';' --input stops.csv\n",
            "  route-opt --candidates-output starts.csv --log-level=debug --log-format=pretty < stops.csv\n",
        ));
        text
    }

    /// Core configuration assembled from the algorithm options.
    pub fn optimizer_config(&self) -> OptimizerConfig {
        OptimizerConfig {
            shape: self.shape,
            two_opt: TwoOptConfig {
                max_iterations: self.max_iterations,
                improvement_threshold_km: self.improvement_threshold,
            },
            sampler: StartSampler {
                exhaustive_limit: self.exhaustive_limit,
                max_candidates: self.max_candidates,
                seed: self.seed,
            },
            fixed_start: self.start,
        }
    }

    pub fn log_output_path(&self) -> Option<&Path> {
        optional_path(&self.log_output)
    }

    pub fn output_path(&self) -> Option<&Path> {
        optional_path(&self.output)
    }

    pub fn input_path(&self) -> Option<&Path> {
        optional_path(&self.input)
    }

    pub fn candidates_output_path(&self) -> Option<&Path> {
        optional_path(&self.candidates_output)
    }
}

fn optional_path(raw: &str) -> Option<&Path> {
    let raw = raw.trim();
    if raw.is_empty() || raw == "-" {
        None
    } else {
        Some(Path::new(raw))
    }
}

fn parse_delimiter(raw: &str) -> Result<char> {
    match raw {
        "tab" | "\\t" => return Ok('\t'),
        "space" => return Ok(' '),
        _ => {}
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) if ch.is_ascii() && !matches!(ch, '"' | '\n' | '\r') => Ok(ch),
        _ => Err(Error::invalid_input(format!(
            "Invalid value for --delimiter: {raw} (expected a single ASCII character or tab)"
        ))),
    }
}
