use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use clap::{Parser, Subcommand};
use lsuuid::{
    Clock, EntropySource, GeneratorConfig, Lsuuid, LsuuidGenerator, Mode, Prefix,
    DEFAULT_MODE_ENV, DEFAULT_PREFIX_ENV,
};
use std::io::Write;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "lsuuid")]
#[command(about = "Lexically-sortable, time-ordered UUIDs", version = lsuuid::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate identifiers
    Generate {
        /// Prefix, decimal or 0x-prefixed hex (0 to 16777215)
        #[arg(long)]
        prefix: Option<String>,
        /// Reference time in RFC 3339 (defaults to now)
        #[arg(long)]
        time: Option<String>,
        /// Fill mode: random, floor or ceil
        #[arg(long)]
        mode: Option<String>,
        /// Number of identifiers to print
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Print the lowest and highest identifiers for a time range
    Range {
        /// Start of the range in RFC 3339
        #[arg(long)]
        from: String,
        /// End of the range in RFC 3339
        #[arg(long)]
        to: String,
        /// Prefix, decimal or 0x-prefixed hex
        #[arg(long)]
        prefix: Option<String>,
    },
    /// Show the prefix, timestamp and fill of an identifier
    Decode {
        /// Identifier in 8-4-4-4-12 form
        id: String,
        /// The identifier was generated with a prefix
        #[arg(long)]
        prefixed: bool,
    },
}

/// Entry point for the `lsuuid` command.
///
/// Defaults are read once at startup from the environment (and a `.env` file if present):
/// - `LSUUID_DEFAULT_PREFIX`: prefix used when `--prefix` is not given
/// - `LSUUID_DEFAULT_MODE`: mode used when `--mode` is not given
///
/// Logs go to stderr, filtered by `RUST_LOG`, so stdout carries only identifiers.
fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("lsuuid=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = GeneratorConfig::from_env_values(
        std::env::var(DEFAULT_PREFIX_ENV).ok(),
        std::env::var(DEFAULT_MODE_ENV).ok(),
    )
    .context("invalid generator defaults in environment")?;
    tracing::debug!(?config, "resolved generator config");

    let cli = Cli::parse();
    let generator = LsuuidGenerator::new();
    run(cli, &config, &generator, &mut std::io::stdout().lock())
}

/// Executes a parsed command, writing results to `out`.
///
/// # Arguments
///
/// * `cli` - Parsed command line.
/// * `config` - Defaults applied when `--prefix` or `--mode` are omitted.
/// * `generator` - Source of identifiers; tests pass one with a fixed clock and entropy.
/// * `out` - Destination for identifiers and decoded fields.
///
/// # Errors
///
/// Returns an error for invalid prefixes, modes, times or identifiers, and for write failures.
fn run<C: Clock, E: EntropySource>(
    cli: Cli,
    config: &GeneratorConfig,
    generator: &LsuuidGenerator<C, E>,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Generate {
            prefix,
            time,
            mode,
            count,
        }) => {
            let prefix = config.resolve_prefix(parse_prefix(prefix.as_deref())?);
            let mode = config.resolve_mode(mode.as_deref().map(str::parse::<Mode>).transpose()?);
            let time = time.as_deref().map(parse_time).transpose()?;

            for _ in 0..count {
                writeln!(out, "{}", generator.generate(prefix, time, mode)?)?;
            }
        }
        Some(Commands::Range { from, to, prefix }) => {
            let prefix = config.resolve_prefix(parse_prefix(prefix.as_deref())?);
            let (lower, upper) = generator.bounds(prefix, parse_time(&from)?, parse_time(&to)?)?;
            writeln!(out, "{}", lower)?;
            writeln!(out, "{}", upper)?;
        }
        Some(Commands::Decode { id, prefixed }) => {
            let parts = id.parse::<Lsuuid>()?.decode(prefixed)?;
            match parts.prefix {
                Some(prefix) => writeln!(out, "prefix:    {} (0x{})", prefix, prefix.to_hex())?,
                None => writeln!(out, "prefix:    none")?,
            }
            writeln!(
                out,
                "timestamp: {}",
                parts.timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
            )?;
            writeln!(out, "fill:      {}", parts.fill)?;
        }
        None => {
            writeln!(out, "Use 'lsuuid --help' for commands")?;
        }
    }

    Ok(())
}

fn parse_prefix(value: Option<&str>) -> anyhow::Result<Option<Prefix>> {
    Ok(value.map(str::parse::<Prefix>).transpose()?)
}

fn parse_time(value: &str) -> anyhow::Result<DateTime<Utc>> {
    let parsed = DateTime::parse_from_rfc3339(value)
        .with_context(|| format!("invalid RFC 3339 time '{}'", value))?;
    Ok(parsed.with_timezone(&Utc))
}
