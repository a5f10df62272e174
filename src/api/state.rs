//! Application State
//!
//! Shared state accessible by all API handlers: the two upstream clients
//! plus the configuration the routes need at request time.

use crate::api::error::ApiError;
use crate::config::Config;
use crate::cubejs::{CubeClient, MatchPolicy};
use crate::indicators::IndicatorSet;
use crate::tabular::TabularClient;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Client for the indicator hub (CubeJS)
    pub cube: CubeClient,
    /// Client for the data.gouv.fr tabular API
    pub tabular: TabularClient,
    /// Fallback bearer token for the indicator hub
    token: Option<String>,
    /// Commune matching policy for the aggregate route
    pub match_policy: MatchPolicy,
    /// Indicator catalog variant served by the aggregate route
    pub indicator_set: IndicatorSet,
}

impl AppState {
    /// Build the state from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            cube: CubeClient::new(config.upstream.indicateurs_base_url.clone()),
            tabular: TabularClient::new(config.upstream.tabular_base_url.clone()),
            token: config.upstream.token.clone(),
            match_policy: config.indicators.match_policy,
            indicator_set: config.indicators.set,
        }
    }

    /// Resolve the credential for a protected route: the caller-supplied
    /// parameter wins, the configured token is the fallback, absence is a
    /// 401 before any outbound call.
    pub fn resolve_token(&self, param: Option<String>) -> Result<String, ApiError> {
        param
            .filter(|t| !t.is_empty())
            .or_else(|| self.token.clone())
            .ok_or(ApiError::MissingToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_token(token: Option<&str>) -> AppState {
        let mut config = Config::default();
        config.upstream.token = token.map(str::to_string);
        AppState::from_config(&config)
    }

    #[test]
    fn test_resolve_token_prefers_parameter() {
        let state = state_with_token(Some("configured"));
        let token = state.resolve_token(Some("from-caller".to_string())).unwrap();
        assert_eq!(token, "from-caller");
    }

    #[test]
    fn test_resolve_token_falls_back_to_config() {
        let state = state_with_token(Some("configured"));
        assert_eq!(state.resolve_token(None).unwrap(), "configured");
        // An empty parameter does not count as a credential.
        assert_eq!(
            state.resolve_token(Some(String::new())).unwrap(),
            "configured"
        );
    }

    #[test]
    fn test_resolve_token_missing_is_error() {
        let state = state_with_token(None);
        assert!(matches!(
            state.resolve_token(None),
            Err(ApiError::MissingToken)
        ));
    }
}
