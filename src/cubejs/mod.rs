//! CubeJS Indicator Hub Integration
//!
//! Query construction and HTTP client for the analytical-cube service.

pub mod client;
pub mod query;

pub use client::{CubeClient, CubeDescriptor, CubeError, BODY_EXCERPT_CHARS};
pub use query::{
    indicator_query, open_query, parse_filters, CubeFilter, CubeQuery, FilterOperator,
    MatchPolicy, DEFAULT_LIMIT, MAX_LIMIT,
};
