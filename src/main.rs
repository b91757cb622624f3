mod core;
mod release;

use crate::core::error::print_error;
use crate::release::orchestrator::{ReleaseOptions, ReleaseOrchestrator};
use crate::release::version;
use clap::Parser;
use clap::error::ErrorKind;
use std::path::PathBuf;
use std::process;

/// Cut a coordinated release of every package in the project tree
///
/// Validates the requested version against the core manifest, fans the
/// version out across every manifest, commits, publishes the packages in
/// dependency order, and force-moves the release tag locally and on origin.
#[derive(Parser)]
#[command(name = "slipway")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// The version to release (e.g. 1.2.0)
  #[arg(id = "release-version", value_name = "VERSION")]
  version: String,

  /// Project root (default: current directory)
  #[arg(long)]
  path: Option<PathBuf>,

  /// Print the release plan without touching anything
  #[arg(long)]
  dry_run: bool,

  /// Output the release plan as JSON (useful for CI/automation)
  #[arg(long)]
  json: bool,

  /// Commit, tag and push, but skip registry publishing
  #[arg(long)]
  skip_publish: bool,

  /// Skip the version-order check to re-tag an existing release
  #[arg(long)]
  force: bool,

  /// Seconds to wait between publishes for registry propagation
  #[arg(long, default_value_t = 0)]
  delay: u64,
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

fn main() {
  // Argument errors exit 1 per the CLI contract; clap's default is 2,
  // which this tool reserves for version-order rejections.
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
      let _ = e.print();
      process::exit(0);
    }
    Err(e) => {
      let _ = e.print();
      process::exit(1);
    }
  };

  let root = cli.path.clone().unwrap_or_else(|| PathBuf::from("."));
  let opts = ReleaseOptions {
    dry_run: cli.dry_run,
    json: cli.json,
    skip_publish: cli.skip_publish,
    force: cli.force,
    delay: cli.delay,
  };

  let result = version::parse_requested(&cli.version)
    .and_then(|requested| ReleaseOrchestrator::new(root).map(|o| (requested, o)))
    .and_then(|(requested, mut orchestrator)| orchestrator.run(&requested, &opts));

  if let Err(err) = result {
    print_error(&err);
    process::exit(err.exit_code());
  }
}
