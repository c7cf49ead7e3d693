mod cli;
mod util;

pub use cli::{as_cli, take_db_flag};

#[cfg(test)]
#[path = "run/cli_tests.rs"]
mod cli_tests;

#[cfg(test)]
#[path = "run/util_tests.rs"]
mod util_tests;
