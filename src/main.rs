use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use envsnap::capture::env::ProcessEnv;
use envsnap::capture::runner::SystemRunner;
use envsnap::capture::{Builder, CaptureOptions};
use envsnap::cli::{Cli, Command};
use envsnap::config::Config;
use envsnap::report::{self, ListEntry};
use envsnap::store::{self, Store};
use envsnap::{completion, Error, Result};

fn init_logging(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("envsnap={level}")));

    // stdout carries command output (restore is meant to be sourced)
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Exact name when it exists, otherwise the closest stored name if close-match
/// lookup is enabled. An unmatched name falls through so the load reports it.
fn resolve_name(store: &Store, config: &Config, name: &str) -> Result<String> {
    store::validate_name(name)?;

    if !config.fuzzy_match || store.exists(name) {
        return Ok(name.to_string());
    }

    match store.resolve(name, config.fuzzy_cutoff)? {
        Some(found) => {
            eprintln!("note: no snapshot '{name}', using closest match '{found}'");
            tracing::info!(requested = name, resolved = %found, "resolved snapshot name");
            Ok(found)
        }
        None => Ok(name.to_string()),
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::from_cli(&cli)?;
    let store = Store::new(&config.store_dir);
    tracing::debug!(store = %store.base_dir().display(), "using snapshot store");

    match cli.command {
        Command::Save(args) => {
            // reject a bad name before spending time on capture
            store.path_for(&args.name)?;

            let workdir = std::env::current_dir()
                .map_err(|e| Error::Capture { tool: "cwd".into(), message: e.to_string() })?;

            let mut options = CaptureOptions::new(workdir);
            options.python = config.python.clone();
            options.strict = config.strict_capture || args.strict;
            options.platform = config.platform;

            let runner = SystemRunner::new(config.command_timeout);
            let snapshot = Builder::new(&runner, &ProcessEnv, options).capture()?;
            store.save(&args.name, &snapshot)?;

            println!("Snapshot '{}' saved.", args.name);
            if !snapshot.warnings.is_empty() {
                eprintln!("saved with {} warning(s), see 'envsnap view {}'", snapshot.warnings.len(), args.name);
            }
        }
        Command::View(args) => {
            let name = resolve_name(&store, &config, &args.name)?;
            let snapshot = store.load(&name)?;
            print!("{}", report::render_view(&name, &snapshot));
        }
        Command::Report(args) => {
            let name = resolve_name(&store, &config, &args.name)?;
            let snapshot = store.load(&name)?;
            print!("{}", report::render_report(&name, &snapshot, config.package_preview));
        }
        Command::Restore(args) => {
            if !args.env_vars {
                eprintln!("Add --env-vars to restore environment variables, e.g.");
                eprintln!("  source <(envsnap restore {} --env-vars)", args.name);
                return Ok(ExitCode::from(2));
            }

            let name = resolve_name(&store, &config, &args.name)?;
            let snapshot = store.load(&name)?;
            print!("{}", report::render_env_exports(&snapshot, args.shell));
        }
        Command::List(args) => {
            let names = store.list()?;

            if names.is_empty() {
                eprintln!("No snapshots found. Run 'envsnap save <name>' to create one.");
                return Ok(ExitCode::SUCCESS);
            }

            let entries: Vec<ListEntry> = names
                .into_iter()
                .map(|name| {
                    let snapshot = if args.long {
                        match store.load(&name) {
                            Ok(s) => Some(s),
                            Err(e) => {
                                tracing::warn!("{e}");
                                None
                            }
                        }
                    } else {
                        None
                    };
                    ListEntry { name, snapshot }
                })
                .collect();

            print!("{}", report::render_list(&entries, args.long));
        }
        Command::Completion => {
            print!("{}", completion::bash_script());
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
