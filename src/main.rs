use anyhow::Result;

use fintrack::config::Config;
use fintrack::db::Database;
use fintrack::{logging, run};

fn main() -> Result<()> {
    logging::init();

    let mut args: Vec<String> = std::env::args().collect();
    let db_flag = run::take_db_flag(&mut args)?;
    let config = Config::load(db_flag)?;
    let mut db = Database::open(&config.db_path)?;

    run::as_cli(&args, &mut db, &config)
}
