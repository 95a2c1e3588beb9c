mod cart;
mod catalog;
mod checkout;
mod error;
mod interface;
mod leaderboard;
mod reading_session;
mod settings;
mod storage;
mod store;

use anyhow::{anyhow, Context};
use catalog::SortKey;
use clap::{Arg, Command};
use dirs_next::home_dir;
use env_logger::{Env, Target};
use log::{info, warn};
use std::fs::OpenOptions;
use std::path::PathBuf;
use storage::{FileStorage, Theme};
use store::LibraryStore;

/// The terminal belongs to ratatui, so log lines go to a file.
fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path.or_else(|| home_dir().map(|home| home.join(".libraryhub.log"))) else {
        return;
    };
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            env_logger::Builder::from_env(Env::default().default_filter_or("info"))
                .target(Target::Pipe(Box::new(file)))
                .init();
        }
        Err(e) => eprintln!("logging disabled, cannot open {}: {}", path.display(), e),
    }
}

fn main() -> anyhow::Result<()> {
    let matches = Command::new("LibraryHub")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Browse, buy and read books in the terminal")
        .arg(
            Arg::new("storage")
                .long("storage")
                .num_args(1)
                .help("Path of the storage file holding the theme and signed-in user"),
        )
        .arg(
            Arg::new("sort")
                .short('s')
                .long("sort")
                .num_args(1)
                .help("Sort books by title, rating or price (overrides saved preference)"),
        )
        .arg(
            Arg::new("category")
                .short('c')
                .long("category")
                .num_args(1)
                .help("Start with this category selected (overrides saved preference)"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .num_args(1)
                .help("light or dark (saved for next time)"),
        )
        .arg(
            Arg::new("log_file")
                .long("log-file")
                .num_args(1)
                .help("Where to write the log"),
        )
        .get_matches();

    init_logging(matches.get_one::<String>("log_file").map(PathBuf::from));

    // Priority: Command-line > Saved Preferences > Defaults
    let cli_sort = match matches.get_one::<String>("sort") {
        Some(value) => Some(SortKey::parse(value).ok_or_else(|| anyhow!("unknown sort key: {}", value))?),
        None => None,
    };
    let cli_category = matches.get_one::<String>("category").cloned();
    let prefs = settings::with_known_category(
        settings::resolve(cli_sort, cli_category, settings::load_settings()),
        &catalog::categories(catalog::catalog()),
    );
    if let Err(e) = settings::save_settings(&prefs) {
        warn!("failed to save preferences: {}", e);
    }

    let storage_path = match matches.get_one::<String>("storage") {
        Some(path) => PathBuf::from(path),
        None => storage::default_storage_path().context("cannot determine home directory")?,
    };
    let storage = FileStorage::open(&storage_path)
        .with_context(|| format!("failed to open {}", storage_path.display()))?;
    info!("using storage at {}", storage.path().display());

    let mut store = LibraryStore::new(storage);
    store.set_selected_category(&prefs.category);
    store.set_sort_key(prefs.sort);

    if let Some(value) = matches.get_one::<String>("theme") {
        let theme = Theme::parse(value).ok_or_else(|| anyhow!("unknown theme: {}", value))?;
        store.set_theme(theme);
    }

    interface::run_ui(&mut store)?;

    // Remember the last filter and sort.
    let prefs = settings::Preferences {
        sort: store.sort_key(),
        category: store.selected_category().to_string(),
    };
    if let Err(e) = settings::save_settings(&prefs) {
        warn!("failed to save preferences: {}", e);
    }

    println!("Program terminated.");
    Ok(())
}
