//! Blocking HTTP client for the Nominatim `/search` endpoint.

use anyhow::{Context, Result};
use std::time::Duration;

use super::{Candidate, Facility, Place, PlaceSearch, SearchError, to_facilities, to_places};
use crate::common::constants::*;
use crate::config::Config;
use crate::geo::Coord;

/// Nominatim search client.
pub struct NominatimClient {
    endpoint: String,
    client: reqwest::blocking::Client,
    debug_enabled: bool,
}

impl NominatimClient {
    /// Create a client for `endpoint`.
    ///
    /// Without a `timeout` requests wait as long as the upstream keeps the
    /// connection open.
    pub fn new(
        endpoint: &str,
        user_agent: &str,
        timeout: Option<Duration>,
        debug_enabled: bool,
    ) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint: endpoint.to_string(),
            client,
            debug_enabled,
        })
    }

    pub fn from_config(config: &Config, debug_enabled: bool) -> Result<Self> {
        Self::new(
            &config.endpoint(),
            &config.user_agent(),
            config.request_timeout.map(Duration::from_secs),
            debug_enabled,
        )
    }

    fn fetch(&self, params: &[(&'static str, String)]) -> Result<Vec<Candidate>, SearchError> {
        if self.debug_enabled {
            log_pipe!();
            log_debug!("GET {}", self.endpoint);
            for (key, value) in params {
                log_indented!("{key} = {value}");
            }
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(params)
            .send()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Http(status.as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| SearchError::Network(e.to_string()))?;

        let candidates: Vec<Candidate> =
            serde_json::from_str(&body).map_err(|e| SearchError::Parse(e.to_string()))?;

        if self.debug_enabled {
            log_indented!("{} candidate(s) returned", candidates.len());
        }

        Ok(candidates)
    }
}

impl PlaceSearch for NominatimClient {
    fn search_near(
        &self,
        anchor: &Coord,
        text: &str,
        limit: usize,
    ) -> Result<Vec<Facility>, SearchError> {
        let limit = limit.clamp(MINIMUM_RESULT_LIMIT, MAXIMUM_RESULT_LIMIT);
        let candidates = self.fetch(&near_params(anchor, text, limit))?;
        to_facilities(candidates, anchor, limit)
    }

    fn forward_geocode(&self, text: &str, limit: usize) -> Result<Vec<Place>, SearchError> {
        let candidates = self.fetch(&forward_params(text, limit))?;
        to_places(candidates, limit)
    }
}

/// Viewbox string `"lng-Δ,lat-Δ,lng+Δ,lat+Δ"` around a coordinate.
pub fn viewbox(anchor: &Coord) -> String {
    format!(
        "{},{},{},{}",
        anchor.lng - VIEWBOX_DELTA_DEGREES,
        anchor.lat - VIEWBOX_DELTA_DEGREES,
        anchor.lng + VIEWBOX_DELTA_DEGREES,
        anchor.lat + VIEWBOX_DELTA_DEGREES
    )
}

/// Query parameters for a bounded search.
pub fn near_params(anchor: &Coord, text: &str, limit: usize) -> Vec<(&'static str, String)> {
    let query = text.trim();
    let query = if query.is_empty() { DEFAULT_QUERY } else { query };

    vec![
        ("q", query.to_string()),
        ("format", "json".to_string()),
        ("lat", anchor.lat.to_string()),
        ("lon", anchor.lng.to_string()),
        ("viewbox", viewbox(anchor)),
        ("bounded", "1".to_string()),
        ("addressdetails", "1".to_string()),
        ("limit", limit.to_string()),
    ]
}

/// Query parameters for a forward geocode.
pub fn forward_params(text: &str, limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("q", text.trim().to_string()),
        ("format", "json".to_string()),
        ("addressdetails", "1".to_string()),
        ("limit", limit.to_string()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_near_params_default_query_and_viewbox() {
        let params = near_params(&Coord::new(40.5, -74.5), "", 15);
        assert_eq!(param(&params, "q"), Some("hospital"));
        assert_eq!(param(&params, "format"), Some("json"));
        assert_eq!(param(&params, "viewbox"), Some("-74.6,40.4,-74.4,40.6"));
        assert_eq!(param(&params, "bounded"), Some("1"));
        assert_eq!(param(&params, "addressdetails"), Some("1"));
        assert_eq!(param(&params, "limit"), Some("15"));
        assert_eq!(param(&params, "lat"), Some("40.5"));
        assert_eq!(param(&params, "lon"), Some("-74.5"));
    }

    #[test]
    fn test_near_params_uses_typed_query() {
        let params = near_params(&Coord::new(0.0, 0.0), "  children's  ", 5);
        assert_eq!(param(&params, "q"), Some("children's"));
        assert_eq!(param(&params, "limit"), Some("5"));
    }

    #[test]
    fn test_forward_params_are_unbounded() {
        let params = forward_params("Boston", 1);
        assert_eq!(param(&params, "q"), Some("Boston"));
        assert_eq!(param(&params, "limit"), Some("1"));
        assert_eq!(param(&params, "addressdetails"), Some("1"));
        assert!(param(&params, "viewbox").is_none());
        assert!(param(&params, "bounded").is_none());
    }

    #[test]
    fn test_viewbox_spans_two_tenths_of_a_degree() {
        let anchor = Coord::new(10.0, 20.0);
        let parts: Vec<f64> = viewbox(&anchor)
            .split(',')
            .map(|p| p.parse().unwrap())
            .collect();
        assert!((parts[2] - parts[0] - 0.2).abs() < 1e-9);
        assert!((parts[3] - parts[1] - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_endpoint_is_network_error() {
        let client =
            NominatimClient::new("http://127.0.0.1:9/search", "test-agent", Some(Duration::from_secs(2)), false)
                .unwrap();
        let result = client.forward_geocode("Boston", 1);
        assert!(matches!(result, Err(SearchError::Network(_))));
    }
}
