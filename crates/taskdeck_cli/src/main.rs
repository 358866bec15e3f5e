//! `taskdeck` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration, start logging and open local storage.
//! - Dispatch one subcommand against a `TaskBoard` with a terminal presenter.

mod cli;
mod presenter;

use clap::Parser;
use cli::{Cli, Command};
use log::{error, info};
use presenter::TerminalPresenter;
use std::error::Error;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::thread;
use taskdeck_core::db::open_db;
use taskdeck_core::{
    core_version, init_logging, CoreConfig, Filter, KvPreferencesRepository, KvTaskRepository,
    SqliteKeyValueStore, TaskBoard,
};

type Board<'conn> = TaskBoard<
    KvTaskRepository<SqliteKeyValueStore<'conn>>,
    KvPreferencesRepository<SqliteKeyValueStore<'conn>>,
    TerminalPresenter<io::Stdout, io::StdinLock<'static>>,
>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("event=cli_run module=cli status=error error={err}");
            eprintln!("taskdeck: {err}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when the command ran but reported an error to the user.
fn run(cli: Cli) -> Result<bool, Box<dyn Error>> {
    let config = CoreConfig::resolve(cli.overrides());
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }
    info!(
        "event=cli_start module=cli status=ok version={}",
        core_version()
    );

    let conn = open_db(&config.db_path)?;
    let store = SqliteKeyValueStore::try_new(&conn)?;
    let stdout = io::stdout();
    let color = stdout.is_terminal();
    let presenter = TerminalPresenter::new(stdout, io::stdin().lock()).with_color(color);
    let mut board: Board<'_> = TaskBoard::open(
        KvTaskRepository::new(store),
        KvPreferencesRepository::new(store),
        presenter,
    );

    dispatch(&mut board, cli.command, &config);
    Ok(board.presenter().error_count() == 0)
}

fn dispatch(board: &mut Board<'_>, command: Command, config: &CoreConfig) {
    match command {
        Command::Add {
            text,
            priority,
            due,
        } => {
            board.add_task(&text.join(" "), priority, due);
        }
        Command::List { filter } => board.set_filter(filter),
        Command::Done { id } => {
            board.toggle_task(id);
        }
        Command::Delete { id } => {
            board.delete_task(id);
        }
        Command::Edit { id, text } => {
            if !text.is_empty() {
                board.presenter_mut().prepare_edit_text(text.join(" "));
            }
            board.edit_task(id);
        }
        Command::ClearCompleted { yes } => {
            board.presenter_mut().assume_yes(yes);
            board.clear_completed();
        }
        Command::Sort => board.sort_by_priority(),
        Command::Reorder { ids } => {
            board.reorder(&ids);
        }
        Command::Move { id, index } => {
            board.move_task(id, index);
        }
        Command::Theme => {
            let theme = board.toggle_theme();
            println!("Theme: {}", theme.as_str());
        }
        Command::Watch { filter, ticks, .. } => watch(board, filter, ticks, config),
    }
}

fn watch(
    board: &mut Board<'_>,
    filter: Filter,
    ticks: Option<u32>,
    config: &CoreConfig,
) {
    info!(
        "event=watch_start module=cli status=ok interval_secs={}",
        config.poll_interval.as_secs()
    );
    board.set_filter(filter);

    let mut remaining = ticks;
    while remaining != Some(0) {
        thread::sleep(config.poll_interval);
        board.tick();
        remaining = remaining.map(|left| left - 1);
    }
}
