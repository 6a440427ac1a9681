//! Search command: one discovery from the command line.
//!
//! Signs in, runs a single discovery (from the device position, or from a
//! place name when one is given), prints the result, and reports failure
//! through the exit code.

use anyhow::Result;

use crate::app::Services;
use crate::common::constants::{EXIT_FAILURE, EXIT_SUCCESS, MESSAGE_MANUAL_HINT};
use crate::discovery::{Controller, Status};
use crate::geo::AnchorSource;
use crate::io::signals::setup_signal_handler;
use crate::logger::Log;
use crate::presenter::list::list_lines;

/// Handle the search command.
///
/// # Arguments
/// * `place` - Free text to geocode; `None` searches around the device position
/// * `json` - Print the state snapshot as JSON instead of the list
/// * `debug_enabled` - Show provider and request details
///
/// # Returns
/// The process exit code.
pub fn handle_search_command(place: Option<&str>, json: bool, debug_enabled: bool) -> Result<i32> {
    // Keep stdout clean for the JSON document
    if json && !Log::is_file_logging() {
        Log::set_enabled(false);
    }

    log_version!();
    match place {
        Some(text) => log_block_start!("Searching for hospitals near \"{}\"", text),
        None => log_block_start!("Searching for hospitals near your location"),
    }

    let services = Services::load(debug_enabled)?;
    let mut session = services.into_session(debug_enabled);
    let _signals = setup_signal_handler(session.sender(), debug_enabled)?;

    session.search_once(place)?;
    session.teardown();

    let controller = session.controller();
    if json {
        println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    } else {
        display_result(controller);
    }

    Ok(match controller.status() {
        Status::Error(_) => EXIT_FAILURE,
        _ => EXIT_SUCCESS,
    })
}

fn display_result(controller: &Controller) {
    if let Some(anchor) = controller.anchor() {
        let source = match anchor.source {
            AnchorSource::Device => "device position",
            AnchorSource::Manual => "entered location",
        };
        log_decorated!("Anchor: {} ({})", anchor.coord, source);
    }

    match controller.status() {
        Status::Error(error) => {
            log_error_exit!("{}", error.message);
            if error.permanent {
                log_indented!("{}", MESSAGE_MANUAL_HINT);
            }
        }
        _ => {
            let results = controller.results();
            log_block_start!("Found {} facilities", results.len());
            let facilities: Vec<_> = results.iter().collect();
            for line in list_lines(&facilities, None) {
                log_indented!("{}", line);
            }
            log_end!();
        }
    }
}

/// Display detailed help for the search command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("search - Find hospitals near you or near a place");
    log_block_start!("Usage: hospital-locator search [place] [--json]");
    log_block_start!("Arguments:");
    log_indented!("[place]  Town, address, or landmark to search around");
    log_indented!("         If omitted, the device position is used");
    log_block_start!("Options:");
    log_indented!("-j, --json  Print the discovery state as JSON");
    log_block_start!("Description:");
    log_indented!("Signs in, looks up up to 15 hospitals within about 11 km of the");
    log_indented!("anchor, and lists them nearest first. The exit code is non-zero");
    log_indented!("when the lookup fails or nothing is found.");
    log_block_start!("Examples:");
    log_indented!("# Hospitals around the current device position");
    log_indented!("hospital-locator search");
    log_pipe!();
    log_indented!("# Hospitals around a place, as JSON");
    log_indented!("hospital-locator search \"Boston, MA\" --json");
    log_end!();
}
