//! Zetten installer CLI entrypoint.
//!
//! This binary downloads the prebuilt zetten executable for the host
//! platform, verifies it against the published SHA-256 checksum, and moves
//! it into place. After installation, it prints shell configuration snippets
//! when the install directory is not on `PATH`.

use camino::Utf8Path;
use clap::Parser;
use std::io::Write;
use zetten_installer::cli::{Cli, Command, InstallArgs, PathArgs};
use zetten_installer::config::{ConfigFile, ConfigOverrides, InstallConfig, resolve_config};
use zetten_installer::dirs::{BaseDirs, SystemBaseDirs, default_config_file, default_prefix};
use zetten_installer::error::{InstallerError, Result};
use zetten_installer::install_flow::{install, plan};
use zetten_installer::logging;
use zetten_installer::output::{
    PathSnippet, dry_run_text, is_on_path, success_message, write_stderr_line,
};

fn main() {
    let cli = Cli::parse();
    let args = cli.install_args();
    logging::init(logging::level_for(args.verbosity, args.quiet));

    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();
    let run_result = run(&cli, &SystemBaseDirs, &mut stdout, &mut stderr);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(
    cli: &Cli,
    dirs: &dyn BaseDirs,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<()> {
    match &cli.command {
        Some(Command::Path(args)) => run_path(args, dirs, stdout),
        Some(Command::Install(args)) => run_install(args, dirs, stderr),
        None => run_install(&cli.install, dirs, stderr),
    }
}

/// Layers the config file and CLI overrides over the defaults.
///
/// An explicitly named config file must exist; the default one is optional.
fn load_config(
    config_path: Option<&Utf8Path>,
    overrides: ConfigOverrides,
    dirs: &dyn BaseDirs,
) -> Result<InstallConfig> {
    let file = match config_path {
        Some(path) => ConfigFile::load(path)?,
        None => match default_config_file(dirs) {
            Some(path) => ConfigFile::load_optional(&path)?,
            None => ConfigFile::default(),
        },
    };
    Ok(resolve_config(file, overrides, default_prefix(dirs))?)
}

/// Prints the install target without touching the network or filesystem.
fn run_path(args: &PathArgs, dirs: &dyn BaseDirs, stdout: &mut dyn Write) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.overrides(), dirs)?;
    let plan = plan(&config)?;
    writeln!(stdout, "{}", plan.target.path())
        .map_err(|source| InstallerError::WriteFailed { source })
}

fn run_install(args: &InstallArgs, dirs: &dyn BaseDirs, stderr: &mut dyn Write) -> Result<()> {
    let config = load_config(args.config.as_deref(), args.overrides(), dirs)?;

    // Dry-run mode: show what would be done without side effects
    if args.dry_run {
        let plan = plan(&config)?;
        write_stderr_line(stderr, dry_run_text(&plan));
        return Ok(());
    }

    let report = if args.quiet {
        install(&config, &mut std::io::sink())?
    } else {
        install(&config, stderr)?
    };

    if args.quiet {
        return Ok(());
    }
    write_stderr_line(stderr, "");
    write_stderr_line(stderr, success_message(&report));

    let path_var = std::env::var_os("PATH");
    let Some(bin_dir) = report.target.parent() else {
        return Ok(());
    };
    if !is_on_path(bin_dir, path_var.as_deref()) {
        write_stderr_line(stderr, "");
        write_stderr_line(stderr, PathSnippet::new(bin_dir).display_text());
    }
    Ok(())
}

fn exit_code_for_run_result(result: Result<()>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, format!("error: {err}"));
            if let Some(hint) = err.hint() {
                write_stderr_line(stderr, format!("hint: {hint}"));
            }
            1
        }
    }
}
