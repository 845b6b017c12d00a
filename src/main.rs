use affected_paths::commands::{self, AffectedArgs, OutputFormat};
use affected_paths::core::config::Granularity;
use affected_paths::core::error::{PathsError, print_error};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Environment variable overriding `--logging` with a full filter directive
const LOG_ENV: &str = "AFFECTED_PATHS_LOG";

/// Find the modules affected by a change set
#[derive(Parser)]
#[command(name = "affected-paths")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Repository / build root
  #[arg(long, default_value = ".")]
  dir: PathBuf,

  /// Commit to diff against HEAD (default: the previous commit)
  #[arg(long)]
  comparison_commit: Option<String>,

  /// Explicit changed files, bypassing git (one per value, or a single space-separated list)
  #[arg(long, num_args = 1..)]
  changed_files: Vec<String>,

  /// Read the module graph from this JSON file
  #[arg(long, conflicts_with = "model_command")]
  model: Option<PathBuf>,

  /// Command printing the module graph as JSON on stdout
  #[arg(long)]
  model_command: Option<String>,

  /// Exclude modules coming from included builds
  #[arg(long)]
  no_included_builds: bool,

  /// Report granularity (default: config file, then target)
  #[arg(long, value_enum)]
  granularity: Option<Granularity>,

  /// Output format
  #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
  format: OutputFormat,

  /// Show the model command's stderr
  #[arg(long)]
  log_build_tool: bool,

  /// Print addresses as Gradle project paths (`:library:foobar`)
  #[arg(long)]
  gradle_paths: bool,

  /// Log level written to stderr
  #[arg(long, default_value = "warn", value_parser = ["off", "error", "warn", "info", "debug", "trace"])]
  logging: String,
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Logs go to stderr so stdout stays parseable
fn init_logging(level: &str) {
  let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(&cli.logging);

  let args = AffectedArgs {
    dir: cli.dir,
    comparison_commit: cli.comparison_commit,
    changed_files: cli.changed_files,
    model: cli.model,
    model_command: cli.model_command,
    no_included_builds: cli.no_included_builds,
    granularity: cli.granularity,
    format: cli.format,
    log_build_tool: cli.log_build_tool,
    gradle_paths: cli.gradle_paths,
  };

  if let Err(err) = commands::run_affected(args) {
    handle_error(err);
  }
}

fn handle_error(err: PathsError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
