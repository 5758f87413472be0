mod app;
mod cache;
mod catalog;
mod engine;
mod infra;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use app::controller::ApplicationController;
use catalog::scanner;
use engine::apply::ApplyReport;
use engine::commands::SystemCommandRunner;
use engine::preflight;
use infra::config::AppConfig;
use infra::error::AppError;

#[derive(Debug, Parser)]
#[command(name = "wallpaper-switcher")]
#[command(about = "Pick a wallpaper and switch the matching desktop themes")]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip the swww/gsettings/wal availability checks
    #[arg(long, global = true)]
    skip_checks: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the wallpaper picker window (default)
    Ui,
    /// List wallpapers and the theme fragments available for each
    List,
    /// Apply a wallpaper by name without opening the window
    Apply { name: String },
    /// Show recently applied wallpapers
    History {
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        /// Include the per-component outcome of each run
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    infra::logging::init_logging();
    let cli = Cli::parse();

    let config = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("failed to load config: {error}");
            return ExitCode::from(2);
        }
    };

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<(), AppError> {
    let command = cli.command.unwrap_or(Command::Ui);
    let runner = Arc::new(SystemCommandRunner);

    if let Command::List = command {
        return print_wallpapers(&config);
    }

    if !cli.skip_checks && matches!(command, Command::Ui | Command::Apply { .. }) {
        preflight::check_environment(runner.as_ref())?;
    }

    let mut controller = ApplicationController::new(config, runner);
    controller.bootstrap()?;

    match command {
        Command::Ui => ui::app_shell::launch_window(controller),
        Command::Apply { name } => {
            let report = controller.apply_named(&name)?;
            print_report(&report);
            Ok(())
        }
        Command::History { limit, verbose } => {
            let records = controller.history(limit)?;
            if records.is_empty() {
                println!("no wallpapers applied yet");
                return Ok(());
            }
            for record in records {
                println!(
                    "#{}\t{}\t{}\t{}",
                    record.id, record.applied_at, record.name, record.wallpaper_path
                );
                if verbose {
                    println!("  {}", record.report_json);
                }
            }
            Ok(())
        }
        Command::List => Ok(()),
    }
}

fn print_wallpapers(config: &AppConfig) -> Result<(), AppError> {
    let entries = scanner::scan_wallpapers(config)?;
    if entries.is_empty() {
        println!("no wallpapers in {}", config.wallpaper_dir.display());
        return Ok(());
    }

    for entry in entries {
        let components: Vec<&str> = entry
            .components
            .iter()
            .map(|component| component.as_str())
            .collect();
        let components = if components.is_empty() {
            "(no themes)".to_string()
        } else {
            components.join(",")
        };
        println!("{}\t{}\t{}", entry.name, components, entry.path.display());
    }
    Ok(())
}

fn print_report(report: &ApplyReport) {
    println!("applied {}", report.wallpaper);
    for line in report.summary() {
        println!("  {line}");
    }
}
