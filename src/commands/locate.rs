//! Locate command: print one device position fix.
//!
//! Useful for checking which position source is in use and whether it can
//! produce a fix before starting a search.

use anyhow::Result;

use crate::common::constants::{EXIT_FAILURE, EXIT_SUCCESS, MESSAGE_MANUAL_HINT};
use crate::config::Config;
use crate::geo::{self, GeoProvider, round_for_display};

/// Handle the locate command.
///
/// # Returns
/// The process exit code.
pub fn handle_locate_command(debug_enabled: bool) -> Result<i32> {
    log_version!();

    let config = Config::load()?;
    if debug_enabled {
        config.log_config();
    }
    let provider = geo::create_provider(&config, debug_enabled);

    Ok(locate_with(provider.as_ref(), &config))
}

fn locate_with(provider: &dyn GeoProvider, config: &Config) -> i32 {
    let options = config.acquire_options();
    log_block_start!("Acquiring device position via '{}'", provider.name());
    log_indented!("Timeout: {}ms", options.timeout.as_millis());

    match provider.acquire(&options) {
        Ok(coord) => {
            log_block_start!("Position: {}", coord);
            if let Some(accuracy) = coord.accuracy_m {
                log_indented!("Accuracy: {} m", round_for_display(accuracy));
            }
            log_end!();
            EXIT_SUCCESS
        }
        Err(e) => {
            log_error_exit!("{}", e);
            if e.is_permanent() {
                log_indented!("{}", MESSAGE_MANUAL_HINT);
            }
            EXIT_FAILURE
        }
    }
}

/// Display detailed help for the locate command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("locate - Print the current device position");
    log_block_start!("Usage: hospital-locator locate");
    log_block_start!("Description:");
    log_indented!("Requests one position fix from the configured location provider");
    log_indented!("and prints it. With location_provider = \"fixed\" (or \"auto\" with");
    log_indented!("coordinates configured) the configured coordinates are printed.");
    log_block_start!("Exit status:");
    log_indented!("0  A position was acquired");
    log_indented!("1  Permission denied, unavailable, timed out, or unsupported");
    log_end!();
}
