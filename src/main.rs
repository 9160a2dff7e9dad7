use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::{debug, warn};

use version_extract::config::Config;
use version_extract::extractor::VersionExtractor;
use version_extract::logging;
use version_extract::output::{self, JsonStyle, OutputFormat};

#[derive(Parser)]
#[command(name = "version-extract")]
#[command(version, about = "Extract version strings from project metadata files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Project directory or a single project file
    #[arg(short, long, default_value = ".")]
    path: PathBuf,

    /// YAML project type definitions (defaults to the bundled set)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[arg(long, value_enum, default_value_t = JsonStyle::Pretty, global = true)]
    json_format: JsonStyle,

    /// Show how the version was found
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Exit with status 1 when no version is found
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    fail_on_error: bool,

    /// Use the latest Git tag for dynamically versioned projects
    #[arg(long, action = ArgAction::Set, default_value_t = true)]
    dynamic_fallback: bool,

    /// Emit log lines as JSON
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List supported project types
    List,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => {
            debug!("Loading configuration from: {}", path.display());
            Config::load(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))
        }
        None => Config::builtin().context("failed to load bundled configuration"),
    }
}

fn print_error(error: &anyhow::Error, cli: &Cli) {
    let message = format!("{error:#}");
    let rendered = output::render_error(&message, cli.format, cli.json_format);
    match cli.format {
        OutputFormat::Json => println!("{rendered}"),
        OutputFormat::Text => eprint!("{rendered}"),
    }
}

fn run(cli: &Cli) -> ExitCode {
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            print_error(&e, cli);
            return ExitCode::FAILURE;
        }
    };
    debug!("Loaded {} project configurations", config.projects.len());

    if let Some(Command::List) = cli.command {
        let rendered = output::render_projects(&config, cli.format, cli.json_format);
        println!("{}", rendered.trim_end());
        return ExitCode::SUCCESS;
    }

    debug!("Searching in path: {}", cli.path.display());
    let extractor = VersionExtractor::from_config(&config).with_dynamic_fallback(cli.dynamic_fallback);
    let outcome = extractor.extract(&cli.path);

    if let Err(e) = &outcome {
        if cli.fail_on_error {
            let error = anyhow::anyhow!("version extraction failed: {e}");
            print_error(&error, cli);
            return ExitCode::FAILURE;
        }
        warn!("{}", e);
    }

    let rendered = output::render_result(&outcome, cli.format, cli.json_format, cli.verbose);
    println!("{}", rendered.trim_end());
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_json);

    run(&cli)
}
