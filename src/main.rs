use bundlebot::commands;
use bundlebot::core::error::{BotError, print_error};
use clap::{Parser, Subcommand};

/// Keep submodule bundles fresh, cut dated releases with synthesized notes
#[derive(Parser)]
#[command(name = "bundlebot")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct BotCli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Fetch, fast-forward, commit, push and release every configured bundle
  Update {
    /// Process a single bundle instead of all configured ones
    #[arg(long)]
    bundle: Option<String>,
    /// Show what would be committed and released without committing,
    /// pushing, or publishing
    #[arg(long)]
    dry_run: bool,
  },

  /// Show pending library changes in fetched bundle working trees
  Status {
    /// Inspect a single bundle instead of all configured ones
    #[arg(long)]
    bundle: Option<String>,
    /// Output status in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Regenerate the primary bundle's library listing document
  List,

  /// Compose and publish releases for already-fetched bundles
  Release {
    /// Release a single bundle instead of all configured ones
    #[arg(long)]
    bundle: Option<String>,
    /// Print the composed draft without creating the release
    #[arg(long)]
    dry_run: bool,
  },
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
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

  let cli = BotCli::parse();

  let result = match cli.command {
    Commands::Update { bundle, dry_run } => commands::run_update(bundle, dry_run),
    Commands::Status { bundle, json } => commands::run_status(bundle, json),
    Commands::List => commands::run_list(),
    Commands::Release { bundle, dry_run } => commands::run_release(bundle, dry_run),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: BotError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
