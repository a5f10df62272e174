//! # Ecologie API
//!
//! HTTP proxy for French ecological open data. Forwards requests to two
//! upstream services and reshapes flat query parameters into the CubeJS
//! query grammar:
//!
//! - the **data.gouv.fr tabular API** (open access, paginated resources),
//! - the **indicator hub** (CubeJS, bearer-token protected cubes of
//!   ecological measures and dimensions).
//!
//! ## Modules
//!
//! - [`cubejs`]: Query construction and client for the indicator hub
//! - [`tabular`]: Client for the tabular API
//! - [`indicators`]: Fixed-indicator aggregate (per-commune categories)
//! - [`api`]: REST API server with Axum
//! - [`config`]: TOML + environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ecologie_api::api::{serve, AppState};
//! use ecologie_api::config::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let state = AppState::from_config(&config);
//!     serve(state, &config.api).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod cubejs;
pub mod indicators;
pub mod tabular;

// Re-export top-level types for convenience
pub use api::{build_router, serve, ApiError, ApiResult, AppState};

pub use config::{Config, ConfigError};

pub use cubejs::{
    indicator_query, open_query, parse_filters, CubeClient, CubeDescriptor, CubeError,
    CubeFilter, CubeQuery, FilterOperator, MatchPolicy,
};

pub use indicators::{IndicatorSet, IndicatorSpec};

pub use tabular::{TabularClient, TabularError};
