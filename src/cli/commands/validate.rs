//! Configuration validation without running the engine.

use tracing::info;

use crate::cli::args::ValidateArgs;
use crate::config::load_config;
use crate::error::TideloopError;

/// Validate every listed configuration file, reporting each result.
///
/// # Errors
///
/// Returns the first validation failure after checking every file.
pub fn run(args: &ValidateArgs) -> Result<(), TideloopError> {
    let mut first_error = None;

    for path in &args.files {
        match load_config(path) {
            Ok(_) => {
                println!("{}: OK", path.display());
                info!(path = %path.display(), "configuration valid");
            }
            Err(e) => {
                println!("{}: {e}", path.display());
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    first_error.map_or(Ok(()), |e| Err(e.into()))
}
