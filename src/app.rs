//! Application coordinator for the interactive session.
//!
//! This module handles resource acquisition and orchestration:
//! - Configuration loading
//! - Position source, search client, and auth gate construction
//! - Signal handler setup
//! - Terminal ownership for the interactive loop
//!
//! Commands that only need the providers (search, locate) use [`Services`]
//! directly; the interactive application is `HospitalLocator::new(debug).run()`.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::{
    auth::{AuthGate, LocalIdentity},
    config::Config,
    geo::{self, GeoProvider},
    io::signals::setup_signal_handler,
    logger::Log,
    search::{NominatimClient, PlaceSearch},
    session::{Session, terminal::run_interactive},
};

/// Everything a session needs from the outside world.
pub struct Services {
    pub config: Config,
    pub auth: AuthGate,
    pub geo: Arc<dyn GeoProvider>,
    pub search: Arc<dyn PlaceSearch>,
}

impl Services {
    /// Load the configuration and build the configured providers.
    pub fn load(debug_enabled: bool) -> Result<Self> {
        let config = Config::load()?;
        if debug_enabled {
            config.log_config();
        }

        let geo = geo::create_provider(&config, debug_enabled);
        let search: Arc<dyn PlaceSearch> = Arc::new(
            NominatimClient::from_config(&config, debug_enabled)
                .context("failed to create the search client")?,
        );
        let auth = AuthGate::new(Box::new(LocalIdentity::new(config.account.clone())));

        Ok(Self {
            config,
            auth,
            geo,
            search,
        })
    }

    pub fn into_session(self, debug_enabled: bool) -> Session {
        Session::new(
            &self.config,
            self.auth,
            self.geo,
            self.search,
            debug_enabled,
        )
    }
}

/// Runner for the interactive application.
pub struct HospitalLocator {
    debug_enabled: bool,
}

impl HospitalLocator {
    pub fn new(debug_enabled: bool) -> Self {
        Self { debug_enabled }
    }

    /// Run the session until the user quits or a termination signal arrives.
    ///
    /// Terminal logging is suspended while the session owns the screen;
    /// `--log` output keeps flowing to its file.
    pub fn run(self) -> Result<()> {
        log_version!();
        if self.debug_enabled {
            log_pipe!();
            log_debug!("Debug mode enabled - showing provider and request details");
        }

        let services = Services::load(self.debug_enabled)?;
        let mut session = services.into_session(self.debug_enabled);
        let _signals = setup_signal_handler(session.sender(), self.debug_enabled)?;

        log_block_start!("Starting interactive session");

        let suspend_terminal_logging = !Log::is_file_logging();
        if suspend_terminal_logging {
            Log::set_enabled(false);
        }
        let result = run_interactive(&mut session);
        if suspend_terminal_logging {
            Log::set_enabled(true);
        }
        result.context("interactive session failed")?;

        log_block_start!("Session closed");
        log_end!();
        Ok(())
    }
}
