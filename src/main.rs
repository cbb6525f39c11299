mod app;
mod cli;
mod config;
mod error;
mod host;
mod output;
mod platform;
mod remover;
mod session;
mod targets;
mod terminal;
mod utils;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use eframe::egui;
use log::{error, info};

use crate::cli::{Cli, Command, ProjectArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::NativePlatform;
use crate::session::SessionEnd;
use crate::targets::CleanupTarget;
use crate::terminal::TerminalHost;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_target(false)
        .init();

    match run(Cli::parse()) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Gui {
        project: ProjectArgs::default(),
    }) {
        Command::List { project } => {
            let (project_dir, targets) = resolve(&project, &config)?;
            list(&project_dir, &targets);
            Ok(ExitCode::SUCCESS)
        }
        Command::Clean {
            project,
            yes,
            no_restart,
        } => {
            let (project_dir, targets) = resolve(&project, &config)?;
            clean(&project_dir, &targets, &config, yes, no_restart)
        }
        Command::Gui { project } => {
            let (project_dir, targets) = resolve(&project, &config)?;
            gui(project_dir, targets, &config)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn resolve(args: &ProjectArgs, config: &Config) -> Result<(PathBuf, Vec<CleanupTarget>)> {
    let project_dir = match &args.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    if !project_dir.is_dir() {
        return Err(Error::ProjectDir(project_dir));
    }
    let project_dir = project_dir.canonicalize()?;

    let folders = if args.folders.is_empty() {
        &config.folders
    } else {
        &args.folders
    };
    let targets = targets::resolve_targets(&project_dir, folders);
    info!(
        "project {}: {} cache folders configured",
        project_dir.display(),
        targets.len()
    );
    Ok((project_dir, targets))
}

fn list(project_dir: &Path, targets: &[CleanupTarget]) {
    output::print_banner();
    output::print_title(&utils::display_path(project_dir));
    let mut total = 0u64;
    for target in targets {
        let size = target.measure();
        total += size.unwrap_or(0);
        output::print_target(target, size);
    }
    println!();
    output::print_message(&format!("Reclaimable: {}", utils::format_size(total)));
}

fn clean(
    project_dir: &Path,
    targets: &[CleanupTarget],
    config: &Config,
    yes: bool,
    no_restart: bool,
) -> Result<ExitCode> {
    output::print_banner();
    output::print_title(session::CONFIRM_TITLE);
    output::print_message(&utils::display_path(project_dir));
    println!();

    let restart_command = (!no_restart).then(|| config.restart_command.clone());
    let mut host = TerminalHost::stdin(yes, restart_command);
    let delay = Duration::from_secs(config.restart_delay_secs);

    let (end, outcome) = session::run(&mut host, NativePlatform, targets, delay)?;
    if end != SessionEnd::Cancelled {
        println!();
        output::print_summary(&outcome);
    }

    Ok(if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn gui(project_dir: PathBuf, targets: Vec<CleanupTarget>, config: &Config) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Clean Cache")
            .with_inner_size([560.0, 460.0])
            .with_min_inner_size([420.0, 320.0]),
        ..Default::default()
    };

    let restart_command = config.restart_command.clone();
    let delay = Duration::from_secs(config.restart_delay_secs);

    eframe::run_native(
        "Clean Cache",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::CleanCacheApp::new(
                cc,
                project_dir,
                targets,
                restart_command,
                delay,
            )))
        }),
    )
    .map_err(|e| Error::Gui(e.to_string()))
}
