use std::path::PathBuf;

use telegram_share_search::logging;

fn main() {
    let _logger = match logging::init(&logging::default_log_dir()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("logging disabled: {}", e);
            None
        }
    };

    let db_path = std::env::args_os().nth(1).map(PathBuf::from);
    if let Err(e) = telegram_share_search::run(db_path) {
        log::error!("{}", e);
        eprintln!("share-search: {}", e);
        std::process::exit(1);
    }
}
