//! Command dispatch: maps parsed arguments onto application services.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use termtree::Tree;
use tracing::{debug, info, instrument};

use crate::application::services::WriteMode;
use crate::application::{CancellationToken, PathContextExt};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::{DeclarationNode, EffectiveOrder, MemberKind};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::java::{JavaDeclaration, JavaSource};
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli)?;
    match &cli.command {
        Some(Commands::Sort { paths, check }) => cmd_sort(&project_dir, paths, *check),
        Some(Commands::Inspect { file }) => cmd_inspect(&project_dir, file),
        Some(Commands::Config { command }) => cmd_config(&project_dir, command),
        Some(Commands::Completion { shell }) => {
            cmd_completion(*shell);
            Ok(())
        }
        None => Ok(()),
    }
}

fn resolve_project_dir(cli: &Cli) -> CliResult<PathBuf> {
    match &cli.project_dir {
        Some(dir) => Ok(dir.clone()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("determine current directory", e))),
    }
}

fn build_container(project_dir: &Path) -> ServiceContainer {
    ServiceContainer::new(Settings::load(), project_dir)
}

/// Cancel `token` on Ctrl-C. The batch stops before its next unit.
fn install_interrupt_handler(token: &CancellationToken) -> CliResult<()> {
    let token = token.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived interrupt signal, stopping after the current file...");
        token.cancel();
    })
    .map_err(|e| {
        CliError::from(InfraError::Signal {
            message: e.to_string(),
        })
    })
}

#[instrument(skip(project_dir))]
fn cmd_sort(project_dir: &Path, paths: &[PathBuf], check: bool) -> CliResult<()> {
    let container = build_container(project_dir);
    let targets = if paths.is_empty() {
        vec![project_dir.to_path_buf()]
    } else {
        paths.to_vec()
    };

    let units = container.sort.collect_units(&targets)?;
    if units.is_empty() {
        output::warning("no Java files found");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    install_interrupt_handler(&cancel)?;

    let mode = if check {
        WriteMode::Check
    } else {
        WriteMode::Write
    };
    let report = container
        .sort
        .process_batch(&units, mode, &cancel, |progress| {
            info!("{} ({:.0}%)", progress.text(), progress.fraction() * 100.0);
        });

    let label = if check { "Would sort" } else { "Sorted" };
    for unit in report.changed() {
        output::action(label, &unit.path.display());
    }
    for unit in report.units.iter().filter(|u| u.report.skipped > 0) {
        debug!(
            "{}: {} declaration(s) left untouched",
            unit.path.display(),
            unit.report.skipped
        );
    }

    let changed = report.changed_count();
    output::info(&format!(
        "{} of {} file(s) {}",
        changed,
        report.units.len(),
        if check { "would change" } else { "changed" }
    ));

    if report.cancelled {
        return Err(CliError::Interrupted);
    }
    let failures = report.failures.len() + report.rewrite_failure_count();
    if failures > 0 {
        return Err(CliError::Incomplete(failures));
    }
    if check && changed > 0 {
        return Err(CliError::CheckFailed(changed));
    }
    Ok(())
}

#[instrument(skip(project_dir))]
fn cmd_inspect(project_dir: &Path, file: &Path) -> CliResult<()> {
    let container = build_container(project_dir);
    let text = container
        .fs
        .read_to_string(file)
        .with_path_context("read unit", file)?;
    let source = JavaSource::parse(text).map_err(InfraError::from)?;

    let settings = container.sort_settings.current();
    let order = EffectiveOrder::resolve(&settings);

    let mut tree = Tree::new(file.display().to_string());
    for root in source.roots() {
        tree.push(declaration_tree(root, &order));
    }
    output::info(&tree);
    if source.has_syntax_errors() {
        output::warning("file contains syntax errors; affected declarations are not sorted");
    }
    Ok(())
}

fn declaration_tree(decl: &JavaDeclaration, order: &EffectiveOrder<'_>) -> Tree<String> {
    let markers = decl
        .markers()
        .iter()
        .map(|m| format!("{} [{}]", m.text(), order.rank(m.qualified_name())))
        .join(" ");
    let mut label = decl.label();
    if !markers.is_empty() {
        label = format!("{}: {}", label, markers);
    }

    let mut tree = Tree::new(label);
    for kind in [
        MemberKind::Field,
        MemberKind::Method,
        MemberKind::Constructor,
        MemberKind::Inner,
    ] {
        for member in decl.members(kind) {
            tree.push(declaration_tree(member, order));
        }
    }
    tree
}

fn cmd_config(project_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let container = build_container(project_dir);
            output::header("Global settings");
            output::info(&container.settings.to_toml()?);

            let current = container.sort_settings.current();
            if current.has_project_override() {
                output::header("Project order (in effect)");
                let effective = current.effective();
                output::info(&effective.to_display_list().iter().join("\n"));
            } else {
                output::detail("no project order; global order in effect");
            }
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("Global", &path.display()),
                None => output::warning("cannot determine global config directory"),
            }
            let project = crate::config::project_settings_path(project_dir);
            output::action("Project", &project.display());
            Ok(())
        }
        ConfigCommands::Template => {
            output::info(&Settings::template());
            Ok(())
        }
        ConfigCommands::Export => {
            let container = build_container(project_dir);
            let path = container.sort_settings.export_to_project()?;
            output::success(&format!("Exported global order to {}", path.display()));
            Ok(())
        }
    }
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
