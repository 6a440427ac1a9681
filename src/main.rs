//! Main application entry point.
//!
//! Parses the command line and dispatches to the interactive application or
//! one of the one-shot commands. Everything else lives in the library crate.

use anyhow::Result;

use hospital_locator::args::{self, CliAction, ParsedArgs};
use hospital_locator::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use hospital_locator::logger::Log;
use hospital_locator::{HospitalLocator, commands, config, log_error_exit};

/// Apply the global flags, run `command`, and turn its outcome into an exit code.
///
/// The log file (if any) stays open until the final error has been written.
fn run_with_globals<F>(config_dir: Option<String>, log_file: Option<String>, command: F) -> i32
where
    F: FnOnce() -> Result<i32>,
{
    let setup = config::set_config_dir(config_dir)
        .and_then(|()| log_file.map(Log::start_file_logging).transpose());
    let _guard = match setup {
        Ok(guard) => guard,
        Err(e) => {
            log_error_exit!("{:#}", e);
            return EXIT_FAILURE;
        }
    };

    match command() {
        Ok(code) => code,
        Err(e) => {
            Log::set_enabled(true);
            log_error_exit!("{:#}", e);
            EXIT_FAILURE
        }
    }
}

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let code = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            EXIT_SUCCESS
        }
        CliAction::ShowHelp => {
            args::display_help();
            EXIT_SUCCESS
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            EXIT_FAILURE
        }
        CliAction::HelpCommand { command } => {
            match commands::help::run_help_command(command.as_deref()) {
                Ok(()) => EXIT_SUCCESS,
                Err(_) => EXIT_FAILURE,
            }
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
            log_file,
        } => run_with_globals(config_dir, log_file, || {
            HospitalLocator::new(debug_enabled).run()?;
            Ok(EXIT_SUCCESS)
        }),
        CliAction::SearchCommand {
            debug_enabled,
            config_dir,
            log_file,
            place,
            json,
        } => run_with_globals(config_dir, log_file, || {
            commands::search::handle_search_command(place.as_deref(), json, debug_enabled)
        }),
        CliAction::LocateCommand {
            debug_enabled,
            config_dir,
            log_file,
        } => run_with_globals(config_dir, log_file, || {
            commands::locate::handle_locate_command(debug_enabled)
        }),
    };

    std::process::exit(code);
}
