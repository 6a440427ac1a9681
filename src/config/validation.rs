//! Configuration validation.
//!
//! Runs on the merged configuration (main file plus `geo.toml`) before
//! defaults are applied, so only values the user actually wrote are checked.

use anyhow::Result;

use super::{Config, LocationProvider};
use crate::common::constants::*;

pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(endpoint) = &config.endpoint {
        let rest = endpoint
            .strip_prefix("https://")
            .or_else(|| endpoint.strip_prefix("http://"));
        if rest.is_none_or(|host| host.trim().is_empty()) {
            anyhow::bail!(
                "endpoint must be an http:// or https:// URL (got \"{}\")",
                endpoint
            );
        }
    }

    if let Some(user_agent) = &config.user_agent
        && user_agent.trim().is_empty()
    {
        anyhow::bail!("user_agent cannot be empty");
    }

    if let Some(limit) = config.result_limit
        && !(MINIMUM_RESULT_LIMIT..=MAXIMUM_RESULT_LIMIT).contains(&limit)
    {
        anyhow::bail!(
            "result_limit ({}) must be between {} and {}",
            limit,
            MINIMUM_RESULT_LIMIT,
            MAXIMUM_RESULT_LIMIT
        );
    }

    if let Some(timeout) = config.request_timeout
        && !(MINIMUM_REQUEST_TIMEOUT..=MAXIMUM_REQUEST_TIMEOUT).contains(&timeout)
    {
        anyhow::bail!(
            "request_timeout ({} s) must be between {} and {} seconds",
            timeout,
            MINIMUM_REQUEST_TIMEOUT,
            MAXIMUM_REQUEST_TIMEOUT
        );
    }

    if let Some(timeout) = config.acquire_timeout_ms
        && !(MINIMUM_ACQUIRE_TIMEOUT_MS..=MAXIMUM_ACQUIRE_TIMEOUT_MS).contains(&timeout)
    {
        anyhow::bail!(
            "acquire_timeout_ms ({} ms) must be between {} and {} milliseconds",
            timeout,
            MINIMUM_ACQUIRE_TIMEOUT_MS,
            MAXIMUM_ACQUIRE_TIMEOUT_MS
        );
    }

    validate_coordinates(config)?;

    if let Some(account) = &config.account
        && account.trim().is_empty()
    {
        anyhow::bail!("account cannot be blank (remove it to use the login name)");
    }

    Ok(())
}

fn validate_coordinates(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(lat.is_finite() && (-90.0..=90.0).contains(&lat))
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(lon.is_finite() && (-180.0..=180.0).contains(&lon))
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    match (config.latitude, config.longitude) {
        (Some(_), None) => anyhow::bail!("latitude is set but longitude is missing"),
        (None, Some(_)) => anyhow::bail!("longitude is set but latitude is missing"),
        (None, None) if config.location_provider == Some(LocationProvider::Fixed) => {
            anyhow::bail!("location_provider = \"fixed\" requires latitude and longitude")
        }
        _ => Ok(()),
    }
}
