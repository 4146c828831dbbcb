use crate::cli::{actions::Action, commands, dispatch::handler, telemetry};
use anyhow::Result;
use tracing::Level;

/// Start the CLI
/// # Errors
/// Returns an error if telemetry setup or argument dispatch fails
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity_level = match matches.get_one::<u8>("verbosity").map_or(0, |&v| v) {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    telemetry::init(Some(verbosity_level))?;

    let action = handler(&matches)?;

    Ok(action)
}
