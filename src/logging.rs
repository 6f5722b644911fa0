use env_logger::{Builder, Env};
use log::LevelFilter;

/// Environment variable that overrides the `-v` level, in `env_logger` syntax.
pub const LOG_ENV: &str = "CARDIO_LOG";

pub fn log_level(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger. Panics if one is already installed, so call it
/// once, at the top of `main`.
pub fn init_logging(verbose: u8) {
    let log_level = log_level(verbose);

    let env = Env::new().filter(LOG_ENV);
    Builder::new()
        .filter(Some("cardio_pipeline"), log_level)
        .filter(Some("aggregate_mortality"), log_level)
        .parse_env(env)
        .init();
}
