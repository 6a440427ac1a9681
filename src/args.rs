//! Command-line argument parsing and processing.
//!
//! Arguments are parsed by hand into a [`CliAction`]. Global flags may appear
//! anywhere on the command line; the first non-flag argument selects a
//! command and every later non-flag argument belongs to it.

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the interactive session
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
    },
    /// Run one discovery and print the result
    SearchCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
        place: Option<String>,
        json: bool,
    },
    /// Print one device position fix
    LocateCommand {
        debug_enabled: bool,
        config_dir: Option<String>,
        log_file: Option<String>,
    },
    /// Detailed help for a command (or general help without one)
    HelpCommand { command: Option<String> },

    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// The first item is the program name and is skipped.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        let mut debug_enabled = false;
        let mut display_help = false;
        let mut display_version = false;
        let mut json = false;
        let mut unknown_arg_found = false;
        let mut config_dir: Option<String> = None;
        let mut log_file: Option<String> = None;
        let mut positionals: Vec<String> = Vec::new();

        let mut i = 0;
        while i < args_vec.len() {
            let arg_str = &args_vec[i];
            match arg_str.as_str() {
                "--help" | "-h" => display_help = true,
                "--version" | "-V" | "-v" => display_version = true,
                "--debug" | "-d" => debug_enabled = true,
                "--json" | "-j" => json = true,
                "--config" | "-c" => {
                    // Parse: --config <directory>
                    if i + 1 < args_vec.len() && !args_vec[i + 1].starts_with('-') {
                        config_dir = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning!("Missing directory for --config. Usage: --config <directory>");
                        unknown_arg_found = true;
                    }
                }
                "--log" => {
                    // Parse: --log <file>
                    if i + 1 < args_vec.len() && !args_vec[i + 1].starts_with('-') {
                        log_file = Some(args_vec[i + 1].clone());
                        i += 1;
                    } else {
                        log_warning!("Missing file for --log. Usage: --log <file>");
                        unknown_arg_found = true;
                    }
                }
                _ => {
                    if arg_str.starts_with('-') {
                        log_warning!("Unknown option: {arg_str}");
                        unknown_arg_found = true;
                    } else {
                        positionals.push(arg_str.clone());
                    }
                }
            }
            i += 1;
        }

        if display_version {
            return ParsedArgs {
                action: CliAction::ShowVersion,
            };
        }

        let command = positionals.first().cloned();
        let command_args = positionals.get(1..).unwrap_or_default();

        // `help` is itself a command; `--help` alone wins over everything else
        if display_help && command.as_deref() != Some("help") {
            return ParsedArgs {
                action: CliAction::ShowHelp,
            };
        }
        if unknown_arg_found {
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let is_search = matches!(command.as_deref(), Some("search" | "s"));
        if json && !is_search {
            log_warning!("--json can only be used with the search command");
            return ParsedArgs {
                action: CliAction::ShowHelpDueToError,
            };
        }

        let action = match command.as_deref() {
            None => CliAction::Run {
                debug_enabled,
                config_dir,
                log_file,
            },
            Some("search" | "s") => {
                let place = command_args.join(" ");
                CliAction::SearchCommand {
                    debug_enabled,
                    config_dir,
                    log_file,
                    place: (!place.trim().is_empty()).then_some(place),
                    json,
                }
            }
            Some("locate" | "l") => {
                if let Some(extra) = command_args.first() {
                    log_warning!("Unexpected argument for locate: {}", extra);
                    CliAction::ShowHelpDueToError
                } else {
                    CliAction::LocateCommand {
                        debug_enabled,
                        config_dir,
                        log_file,
                    }
                }
            }
            Some("help") => CliAction::HelpCommand {
                command: command_args.first().cloned(),
            },
            Some(other) => {
                log_warning!("Unknown command: {}", other);
                CliAction::ShowHelpDueToError
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!("{}", env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("hospital-locator [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("    --log <file>       Write log output to a file");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("search, s [place]      Find hospitals near you or near a place");
    log_indented!("locate, l              Print the current device position");
    log_indented!("help [command]         Show detailed help for a command");
    log_block_start!("Without a command the interactive map and list are started.");
    log_end!();
}
