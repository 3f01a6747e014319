//! prog CLI entry point.

use clap::Parser;
use prog::cli::commands::{self, transition::Transition, Globals};
use prog::cli::{Cli, Commands};
use prog::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.quiet {
        prog::QUIET.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    // JSON when asked for, or when stdout is piped
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_internal() {
                tracing::error!(code = e.error_code().as_str(), "Internal error: {e:?}");
            }
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if let Some(hint) = e.hint() {
                eprintln!("Error: {e}\n  Hint: {hint}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let globals = Globals::new(
        cli.db.as_deref(),
        cli.project.as_deref(),
        cli.actor.as_deref(),
        json,
    );

    match &cli.command {
        Commands::Init { force } => commands::init::execute(cli.db.as_deref(), *force, json),
        Commands::Version => commands::version::execute(json),
        Commands::Completions { shell } => commands::completions::execute(shell),

        // Items
        Commands::Add(args) => commands::item::add(args, &globals),
        Commands::Show { id } => commands::item::show(id, &globals),
        Commands::Edit(args) => commands::item::edit(args, &globals),
        Commands::Parent { id, epic } => commands::item::parent(id, epic.as_deref(), &globals),
        Commands::Delete { ids } => commands::item::delete(ids, &globals),
        Commands::Log { id, message } => commands::item::log(id, message, &globals),
        Commands::History { id, limit } => commands::history::execute(id, *limit, &globals),

        // Queries
        Commands::List(args) => commands::list::list(args, &globals),
        Commands::Ready { labels, limit } => commands::list::ready(labels, *limit, &globals),
        Commands::Status => commands::status::execute(&globals),
        Commands::Projects => commands::projects::execute(&globals),

        // Status transitions
        Commands::Start { ids } => commands::transition::execute(Transition::Start, ids, &globals),
        Commands::Review { ids } => {
            commands::transition::execute(Transition::Review, ids, &globals)
        }
        Commands::Block { ids } => commands::transition::execute(Transition::Block, ids, &globals),
        Commands::Done { ids } => commands::transition::execute(Transition::Done, ids, &globals),
        Commands::Cancel { ids } => {
            commands::transition::execute(Transition::Cancel, ids, &globals)
        }
        Commands::Reopen { ids } => {
            commands::transition::execute(Transition::Reopen, ids, &globals)
        }

        // Graph and labels
        Commands::Dep { command } => commands::dep::execute(command, &globals),
        Commands::Label { command } => commands::label::execute(command, &globals),
    }
}
