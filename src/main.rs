mod blueprint;
mod commands;
mod core;
mod docker;
mod logging;
mod platform;
mod publish;
mod release;
mod tagging;
mod ui;
mod utils;
mod validate;

use blueprint::{BlueprintProvider, CommandBlueprintProvider, FileBlueprintProvider};
use clap::{ArgAction, Args, Parser, Subcommand};
use commands::plan::PublishRequest;
use commands::publish::PublishOptions;
use commands::release::ReleaseRequest;
use core::context::RunContext;
use core::error::{ResultExt, ShipError, print_error};
use docker::SystemDocker;
use release::{GhCli, TarArchiver};
use std::path::PathBuf;
use tagging::StrategyRegistry;

/// Resolve monorepo release tags and publish multi-platform images from CI
#[derive(Parser)]
#[command(name = "monoship")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(flatten)]
  global: GlobalArgs,

  #[command(subcommand)]
  command: Commands,
}

/// CI inputs, settable from the environment
#[derive(Args)]
struct GlobalArgs {
  /// Project path relative to the repository root
  #[arg(long, global = true, env = "MONOSHIP_PROJECT", default_value = ".")]
  project: String,

  /// Git ref that triggered the run (refs/tags/... or refs/heads/...)
  #[arg(long = "ref", global = true, env = "GITHUB_REF")]
  git_ref: Option<String>,

  /// Commit SHA of the run
  #[arg(long, global = true, env = "GITHUB_SHA")]
  sha: Option<String>,

  /// Repository as owner/name
  #[arg(long, global = true, env = "GITHUB_REPOSITORY")]
  repository: Option<String>,

  /// Native platform of the runner (os/arch)
  #[arg(long, global = true, env = "MONOSHIP_NATIVE_PLATFORM")]
  native_platform: Option<String>,

  /// Read the blueprint from a JSON file instead of running the blueprint command
  #[arg(long, global = true)]
  blueprint: Option<PathBuf>,

  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,

  /// Emit logs as JSON lines
  #[arg(long, global = true)]
  log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
  /// Print the generated and git tags for the project
  Tag {
    /// Return only the version segment of monorepo tags
    #[arg(long)]
    trim: bool,
    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
  },

  /// Show the publish plan without touching any registry
  Plan {
    /// Base name of the locally built image
    #[arg(long)]
    image: String,
    /// Blueprint target whose platforms are published
    #[arg(long)]
    target: Option<String>,
    /// Output the plan in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Tag and push the project's images to every configured registry
  Publish {
    /// Base name of the locally built image
    #[arg(long)]
    image: String,
    /// Blueprint target whose platforms are published
    #[arg(long)]
    target: Option<String>,
    /// Publish even when not on the default branch or a tag
    #[arg(long)]
    skip_branch_check: bool,
    /// Show what would be pushed without pushing
    #[arg(long)]
    dry_run: bool,
    /// Output the result in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Archive per-platform artifacts and attach them to a release for the git tag
  Release {
    /// Directory holding one output folder per platform
    #[arg(long)]
    path: PathBuf,
    /// Blueprint target whose platforms are released
    #[arg(long)]
    target: Option<String>,
    /// Show the archives and release without creating them
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
  let cli = Cli::parse();
  let global = cli.global;

  logging::init_tracing(global.verbose, global.log_json);

  let root = match std::env::current_dir().context("Failed to get current directory") {
    Ok(dir) => dir,
    Err(e) => handle_error(e),
  };

  // Build the run context once; commands only read from it
  let ctx = match RunContext::build(
    &root,
    &global.project,
    global.git_ref,
    global.sha,
    global.repository,
    global.native_platform,
  ) {
    Ok(ctx) => ctx,
    Err(e) => handle_error(e),
  };

  let provider: Box<dyn BlueprintProvider> = match &global.blueprint {
    Some(path) => Box::new(FileBlueprintProvider::new(root.join(path))),
    None => Box::new(CommandBlueprintProvider::new(&ctx.settings.blueprint, &root)),
  };
  let strategies = StrategyRegistry::builtin();
  let tools = &ctx.settings.tools;

  let result = match cli.command {
    Commands::Tag { trim, pretty } => commands::run_tag(&ctx, provider.as_ref(), &strategies, trim, pretty),
    Commands::Plan { image, target, json } => commands::run_plan(
      &ctx,
      provider.as_ref(),
      &strategies,
      PublishRequest {
        image: &image,
        target: target.as_deref(),
      },
      json,
    ),
    Commands::Publish {
      image,
      target,
      skip_branch_check,
      dry_run,
      json,
    } => commands::run_publish(
      &ctx,
      provider.as_ref(),
      &strategies,
      &SystemDocker::new(&tools.docker),
      PublishRequest {
        image: &image,
        target: target.as_deref(),
      },
      PublishOptions {
        skip_branch_check,
        dry_run,
        json,
      },
    ),
    Commands::Release { path, target, dry_run } => commands::run_release(
      &ctx,
      provider.as_ref(),
      &TarArchiver::new(&tools.tar),
      &GhCli::new(&tools.gh, ctx.inputs.repository.clone()),
      ReleaseRequest {
        path: &path,
        target: target.as_deref(),
        dry_run,
      },
    ),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ShipError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
