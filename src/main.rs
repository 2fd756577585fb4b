mod clock;
mod config;
mod error;
mod logging;
mod models;
mod query;
mod run;
mod store;
mod summary;
mod transfer;
mod ui;

use anyhow::Result;
use tracing::info;

use clock::SystemClock;
use config::{AppConfig, Paths};
use store::{AppState, SqliteStore};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let paths = Paths::resolve()?;
    let config = AppConfig::load(&paths.config_file)?;
    let paths = paths.with_config(&config)?;
    logging::init(&paths.log_file(), &config.log_level)?;

    let db_path = paths.db_file();
    let store = SqliteStore::open(&db_path)?;
    let mut state = AppState::load(Box::new(store), Box::new(SystemClock))?;
    info!(
        db = %db_path.display(),
        categories = state.categories().len(),
        transactions = state.transactions().len(),
        "spendlens started"
    );

    match args.len() {
        1 => run::as_tui(&mut state, &config),
        2.. => run::as_cli(&args, &mut state, &config),
        _ => {
            eprintln!("Usage: spendlens [command]");
            Ok(())
        }
    }
}
