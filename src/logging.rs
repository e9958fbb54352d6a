//! Logging setup.
//!
//! Diagnostics go to stderr through `tracing`; stdout is reserved for
//! trade lines. `RUST_LOG` overrides the default level.

use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{Error, Result};

/// Install the global subscriber. `debug` lowers the default level to
/// `debug`, which surfaces rejected orders and skipped input lines.
pub fn init(debug: bool) -> Result<()> {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}
