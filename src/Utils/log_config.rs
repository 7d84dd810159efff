use crate::errors::RenderResult;
use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, SharedLogger, TermLogger, TerminalMode, WriteLogger,
};
use std::fs::File;
use std::path::Path;

/// Terminal logging at `level`, mirrored into `log_file` when given.
///
/// Returns `false` when a logger was already installed; the earlier one stays in place.
pub fn init_logging(level: LevelFilter, log_file: Option<&Path>) -> RenderResult<bool> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = log_file {
        loggers.push(WriteLogger::new(level, Config::default(), File::create(path)?));
    }
    Ok(CombinedLogger::init(loggers).is_ok())
}
