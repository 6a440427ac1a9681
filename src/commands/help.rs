//! Help command implementation.
//!
//! Dispatches `hospital-locator help [command]` to the command-specific help
//! pages, or shows the command overview.

use anyhow::Result;

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("search") | Some("s") => super::search::display_help(),
        Some("locate") | Some("l") => super::locate::display_help(),
        Some("help") => display_help_help(),
        Some(unknown) => {
            log_version!();
            log_pipe!();
            log_warning!("Unknown command: {}", unknown);
            display_command_overview();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    display_command_overview();
}

fn display_command_overview() {
    log_block_start!("Available Commands:");
    log_indented!("search, s [place]   Find hospitals near you or near a place");
    log_indented!("locate, l           Print the current device position");
    log_indented!("help [COMMAND]      Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'hospital-locator help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'hospital-locator --help' to see all options and general usage.");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: hospital-locator help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("# Show general help");
    log_indented!("hospital-locator help");
    log_pipe!();
    log_indented!("# Show help for specific commands");
    log_indented!("hospital-locator help search");
    log_indented!("hospital-locator help locate");
    log_end!();
}
