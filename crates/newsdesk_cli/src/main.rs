//! Command-line inspector for `newsdesk_core`.
//!
//! # Responsibility
//! - Verify core crate linkage with a deterministic ping/version output.
//! - Inspect a store file: list newsrooms, a newsroom's articles, or its
//!   latest article.
//!
//! Set `NEWSDESK_LOG_DIR` to an absolute path to enable file logging.

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use newsdesk_core::{
    default_log_level, init_logging, NewsroomId, NewsroomRepository, RepoError, SqliteStore,
    StoreConfig,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Newsdesk store inspector
#[derive(Parser, Debug)]
#[command(name = "newsdesk_cli")]
#[command(about = "Inspect newsrooms and articles in a newsdesk store", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the SQLite store file
    db_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// List every newsroom with readable meta
    Newsrooms,
    /// List the articles of a newsroom
    Articles { newsroom_id: NewsroomId },
    /// Show the article with the most recent revision date
    Latest { newsroom_id: NewsroomId },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(log_dir) = std::env::var("NEWSDESK_LOG_DIR") {
        if let Err(err) = init_logging(default_log_level(), &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let (db_path, command) = match (cli.db_path, cli.command) {
        (None, None) => {
            println!("newsdesk_core ping={}", newsdesk_core::ping());
            println!("newsdesk_core version={}", newsdesk_core::core_version());
            return ExitCode::SUCCESS;
        }
        (Some(db_path), Some(command)) => (db_path, command),
        (Some(_), None) => Cli::command()
            .error(ErrorKind::MissingSubcommand, "a command is required after the store path")
            .exit(),
        (None, Some(_)) => Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "a store path is required")
            .exit(),
    };

    match run(&db_path, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(db_path: &Path, command: Command) -> Result<(), String> {
    let store = SqliteStore::open(&StoreConfig::file(db_path).with_min_idle(Some(1)))
        .map_err(|err| format!("failed to open `{}`: {err}", db_path.display()))?;

    match command {
        Command::Newsrooms => {
            for newsroom in store.newsrooms().map_err(|err| err.to_string())? {
                let meta = newsroom.meta.unwrap_or_default();
                println!(
                    "{}\t{}\t{}\tindex={}\tclaim={}",
                    newsroom.id, newsroom.address, newsroom.name, meta.index, meta.claim
                );
            }
            Ok(())
        }
        Command::Articles { newsroom_id } => {
            let articles = store
                .articles_for_newsroom(newsroom_id)
                .map_err(|err| err.to_string())?;
            for article in articles {
                println!(
                    "{}\t{}\t{}",
                    article.id,
                    article.indexed_timestamp.to_rfc3339(),
                    article.article_metadata.title
                );
            }
            Ok(())
        }
        Command::Latest { newsroom_id } => match store.latest_article_for_newsroom(newsroom_id) {
            Ok(article) => {
                println!("{}\t{}", article.id, article.article_metadata.title);
                Ok(())
            }
            Err(RepoError::NoArticles(_)) => {
                println!("no articles");
                Ok(())
            }
            Err(err) => Err(err.to_string()),
        },
    }
}
