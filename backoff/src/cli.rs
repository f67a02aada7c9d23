use crate::config::BackoffConfig;
use crate::counter::Backoff;
use crate::output::{emit_data, OutputFormat};
use crate::util::{format_duration, parse_duration};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value as JsonValue};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

pub const MAX_SCHEDULE_COUNT: u32 = 100_000;

#[derive(Parser, Debug)]
#[command(
    name = "backoff",
    about = "Preview exponential backoff schedules",
    disable_help_subcommand = true,
    after_help = r#"Examples:
  backoff schedule
  backoff --min 250ms --max 30s --factor 1.5 schedule --count 20
  backoff --jitter --seed 42 --json schedule
  BACKOFF_MAX=1m backoff config view"#
)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Minimum (first) delay, e.g. 100ms
    #[arg(long, global = true, value_parser = parse_duration)]
    pub min: Option<Duration>,
    /// Maximum delay, e.g. 10s
    #[arg(long, global = true, value_parser = parse_duration)]
    pub max: Option<Duration>,
    /// Growth factor per attempt
    #[arg(long, global = true)]
    pub factor: Option<f64>,
    /// Randomize delays
    #[arg(long, global = true, overrides_with = "no_jitter")]
    pub jitter: bool,
    /// Disable jitter set by env or config file
    #[arg(long = "no-jitter", global = true, overrides_with = "jitter")]
    pub no_jitter: bool,
    /// Seed for reproducible jitter
    #[arg(long, global = true)]
    pub seed: Option<u64>,
    /// Config file path
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// JSON output
    #[arg(long, global = true)]
    pub json: bool,
    /// Raw output, one value per line
    #[arg(long, global = true, conflicts_with = "json")]
    pub raw: bool,
    /// Verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,
    /// Debug logging
    #[arg(long, global = true)]
    pub debug: bool,
    /// Color control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Debug, ValueEnum)]
pub enum ColorChoice {
    Always,
    Auto,
    Never,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print successive delays
    Schedule(ScheduleCmd),
    Config(ConfigCmd),
}

#[derive(Args, Debug)]
pub struct ScheduleCmd {
    /// Number of delays to compute
    #[arg(
        long,
        short = 'n',
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(..=MAX_SCHEDULE_COUNT as i64)
    )]
    pub count: u32,
}

#[derive(Args, Debug)]
pub struct ConfigCmd {
    #[command(subcommand)]
    sub: ConfigSub,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSub {
    /// Config file location
    Path,
    /// Effective configuration after env and flag overrides
    View,
}

impl Cli {
    pub fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.raw {
            OutputFormat::Raw
        } else {
            OutputFormat::Yaml
        }
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let fmt = cli.output_format();
    match &cli.command {
        Commands::Schedule(cmd) => {
            let cfg = effective_config(&cli)?;
            let mut backoff = Backoff::from_config(&cfg)?;
            let mut rng = match cli.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let data = schedule(&mut backoff, &mut rng, cmd.count as usize);
            info!(count = cmd.count, attempt = backoff.attempt(), "schedule computed");
            if fmt == OutputFormat::Raw {
                let lines: Vec<JsonValue> = data["delays"]
                    .as_array()
                    .map(|arr| arr.iter().map(|d| d["delay"].clone()).collect())
                    .unwrap_or_default();
                emit_data(&fmt, &JsonValue::Array(lines))
            } else {
                emit_data(&fmt, &data)
            }
        }
        Commands::Config(cmd) => match cmd.sub {
            ConfigSub::Path => {
                let path = match &cli.config {
                    Some(p) => Some(p.clone()),
                    None => BackoffConfig::config_path(),
                };
                let shown = path
                    .map(|p| JsonValue::String(p.display().to_string()))
                    .unwrap_or(JsonValue::Null);
                emit_data(&fmt, &shown)
            }
            ConfigSub::View => {
                let cfg = effective_config(&cli)?;
                emit_data(&fmt, &config_value(&cfg))
            }
        },
    }
}

/// Merge defaults, config file, env and flags, then validate.
pub fn effective_config(cli: &Cli) -> Result<BackoffConfig> {
    let mut cfg = match &cli.config {
        Some(path) => BackoffConfig::load_from(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => BackoffConfig::load()?,
    };
    cfg.apply_env().context("apply env overrides")?;
    cfg.apply_cli(cli);
    cfg.validate()?;
    debug!(?cfg, "effective config");
    Ok(cfg)
}

pub fn config_value(cfg: &BackoffConfig) -> JsonValue {
    json!({
        "min": format_duration(cfg.min),
        "max": format_duration(cfg.max),
        "factor": cfg.factor,
        "jitter": cfg.jitter,
    })
}

/// Advance `backoff` `count` times and describe each step.
pub fn schedule<R: Rng + ?Sized>(backoff: &mut Backoff, rng: &mut R, count: usize) -> JsonValue {
    let mut delays = Vec::new();
    for call in 1..=count {
        let before = backoff.attempt();
        let delay = backoff.next_delay_with_rng(rng);
        delays.push(json!({
            "call": call,
            "delay": format_duration(delay),
            "millis": delay.as_nanos() as f64 / 1e6,
            "attempt": backoff.attempt(),
            "capped": delay == backoff.max && backoff.attempt() == before,
        }));
    }
    json!({ "delays": delays })
}
