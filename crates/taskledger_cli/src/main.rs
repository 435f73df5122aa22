//! `taskledger` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from the environment and global flags.
//! - Open the store, run the legacy import hook, then dispatch one command.
//! - Report failures as `error: <message>` with exit code 1.

mod cli;
mod render;

use clap::Parser;
use cli::{Cli, Command, ListFilter};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskledger_core::db::{open_db, DbError};
use taskledger_core::{
    init_logging, AppConfig, BoardError, ConfigError, ConfigOverrides, ImportOutcome,
    RefreshPoller, RepoError, SqliteTaskRepository, TaskBoard, TaskRepository, TaskStatus,
};

#[derive(Debug)]
enum CliError {
    Config(ConfigError),
    Logging(String),
    Db(DbError),
    Repo(RepoError),
    Board(BoardError),
    Io(std::io::Error),
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(message) => write!(f, "{message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Board(err) => write!(f, "{err}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Board(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Logging(_) => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DbError> for CliError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RepoError> for CliError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<BoardError> for CliError {
    fn from(value: BoardError) -> Self {
        Self::Board(value)
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

fn resolve_config(cli: &Cli) -> Result<AppConfig, CliError> {
    let base = AppConfig::from_env()?;
    Ok(base.merge_overrides(&ConfigOverrides {
        db_path: cli.db.clone(),
        legacy_csv_path: cli.legacy_csv.clone(),
        refresh_interval: None,
        log_level: cli.log_level.clone(),
        log_dir: cli.log_dir.clone(),
    }))
}

fn absolute(path: &Path) -> Result<PathBuf, CliError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    Ok(std::env::current_dir()?.join(path))
}

fn start_logging(config: &AppConfig) -> Result<(), CliError> {
    let Some(dir) = &config.log_dir else {
        return Ok(());
    };
    init_logging(&config.log_level, absolute(dir)?).map_err(CliError::Logging)
}

fn report_import(outcome: ImportOutcome, path: &Path) {
    match outcome {
        ImportOutcome::Imported { offered, inserted } => println!(
            "Imported {inserted} of {offered} legacy rows from {}",
            path.display()
        ),
        ImportOutcome::NoRows => println!("Legacy file {} has no rows", path.display()),
        ImportOutcome::SkippedStoreNotEmpty => {
            println!("Store already has data; legacy import skipped")
        }
        ImportOutcome::SkippedMissingFile => {
            println!("Legacy file {} not found; nothing imported", path.display())
        }
    }
}

fn run_watch<R: TaskRepository>(
    board: &mut TaskBoard<R>,
    interval: Duration,
    query: Option<&str>,
    max_ticks: Option<u64>,
) -> Result<(), CliError> {
    match query {
        Some(text) => board.search(text)?,
        None => board.load(None)?,
    }
    render::print_board(board, true, true);

    let (mut poller, ticks) = RefreshPoller::start(interval)?;
    let mut handled = 0_u64;
    while max_ticks.map_or(true, |max| handled < max) {
        let Ok(tick) = ticks.recv() else {
            break;
        };
        board.refresh()?;
        handled += 1;
        println!("-- refresh #{} --", tick.sequence);
        render::print_board(board, true, true);
    }
    poller.stop();
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = resolve_config(&cli)?;
    start_logging(&config)?;

    let conn = open_db(&config.db_path)?;
    let mut board = TaskBoard::new(SqliteTaskRepository::try_new(&conn)?);

    if !matches!(cli.command, Command::ImportLegacy { .. }) {
        let outcome = board.migrate_legacy(&config.legacy_csv_path)?;
        if let ImportOutcome::Imported { .. } = outcome {
            report_import(outcome, &config.legacy_csv_path);
        }
    }

    match cli.command {
        Command::Add(fields) => {
            let stored = board.submit_new(&fields.into())?;
            println!("{} (id {})", board.status_line(), stored.id.unwrap_or_default());
        }
        Command::Edit { id, fields } => {
            let current = board
                .repo()
                .get_by_id(id)?
                .ok_or(BoardError::NotFound(id))?;
            board.submit_edit(id, &fields.apply_to(&current))?;
            println!("{}", board.status_line());
        }
        Command::Complete { id } => {
            board.set_status(id, TaskStatus::Completed)?;
            println!("{}", board.status_line());
        }
        Command::Reopen { id } => {
            board.set_status(id, TaskStatus::Pending)?;
            println!("{}", board.status_line());
        }
        Command::Delete { id } => {
            board.delete(id)?;
            println!("{}", board.status_line());
        }
        Command::Show { id } => {
            let record = board
                .repo()
                .get_by_id(id)?
                .ok_or(BoardError::NotFound(id))?;
            render::print_record(&record);
        }
        Command::List { status } => {
            board.load(None)?;
            render::print_board(
                &board,
                status != ListFilter::Completed,
                status != ListFilter::Pending,
            );
        }
        Command::Search { query } => {
            board.search(&query)?;
            render::print_board(&board, true, true);
        }
        Command::Export { path } => {
            board.export_csv(&path)?;
            println!("{}", board.status_line());
        }
        Command::Report => {
            render::print_report(&board.report()?);
        }
        Command::ImportLegacy { path } => {
            let path = path.unwrap_or_else(|| config.legacy_csv_path.clone());
            let outcome = board.migrate_legacy(&path)?;
            report_import(outcome, &path);
        }
        Command::Watch {
            interval,
            query,
            ticks,
        } => {
            let interval = interval
                .map(Duration::from_secs)
                .unwrap_or(config.refresh_interval);
            run_watch(&mut board, interval, query.as_deref(), ticks)?;
        }
    }

    info!("event=cli_command module=cli status=ok");
    Ok(())
}

fn parse_error_message(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid command").trim();
    first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string()
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.use_stderr() => {
            eprintln!("error: {}", parse_error_message(&err));
            std::process::exit(1);
        }
        Err(err) => err.exit(),
    };
    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
