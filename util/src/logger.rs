//! Logger initialisation for flight executables
//!
//! Every record is stamped with the seconds since the session epoch and a short coloured level
//! tag. Debug and trace records also carry their target so noisy control loop output can be
//! traced back to its module.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use colored::{ColoredString, Colorize};
use log::{info, Level};
use thiserror::Error;

pub use log::LevelFilter;

// Internal imports
use crate::session::{self, Session};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoggerInitError {
    #[error("Minimum log level must be INFO or more verbose, got {0}")]
    InvalidMinLogLevel(LevelFilter),

    #[error("Couldn't open the log file: {0}")]
    LogFileInitError(std::io::Error),

    #[error("Couldn't install the logger: {0}")]
    FernInitError(log::SetLoggerError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Install the global logger, writing to stdout and the session's log file.
///
/// `min_level` must be at least `Info`, a flight can't be reconstructed from warnings alone.
/// Only the first call in a process can succeed.
pub fn logger_init(min_level: LevelFilter, session: &Session) -> Result<(), LoggerInitError> {
    if min_level < Level::Info {
        return Err(LoggerInitError::InvalidMinLogLevel(min_level));
    }

    let log_file =
        fern::log_file(&session.log_file_path).map_err(LoggerInitError::LogFileInitError)?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            let elapsed_s = session::get_elapsed_seconds();
            let tag = level_tag(record.level());

            match record.level() {
                Level::Debug | Level::Trace => out.finish(format_args!(
                    "[{:10.6} {}] {}: {}",
                    elapsed_s,
                    tag,
                    record.target(),
                    message
                )),
                _ => out.finish(format_args!("[{:10.6} {}] {}", elapsed_s, tag, message)),
            }
        })
        .level(min_level)
        .chain(std::io::stdout())
        .chain(log_file)
        .apply()
        .map_err(LoggerInitError::FernInitError)?;

    info!("Logger started at level {}", min_level);
    if let Ok(epoch) = session::get_epoch() {
        info!("    epoch: {}", epoch);
    }
    info!("    file: {}", session.log_file_path.display());

    Ok(())
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn level_tag(level: Level) -> ColoredString {
    match level {
        Level::Error => "ERR".red().bold(),
        Level::Warn => "WRN".yellow(),
        Level::Info => "INF".normal(),
        Level::Debug => "DBG".dimmed(),
        Level::Trace => "TRC".dimmed().italic(),
    }
}
