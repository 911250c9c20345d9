mod cli;

use std::process;

use cadence::config::Config;
use cadence::logging;
use cadence::storage::Storage;

fn main() {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        process::exit(1);
    });

    logging::init(config.log_level.as_deref());

    let data_dir = config.data_dir().unwrap_or_else(|| {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    });

    let storage = match Storage::open(Storage::db_path(&data_dir)) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to initialize storage: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, storage) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
