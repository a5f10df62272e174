//! Data Transfer Objects
//!
//! Query-parameter and response types for the API endpoints.

use serde::{Deserialize, Serialize};

use crate::cubejs::{CubeDescriptor, DEFAULT_LIMIT};

// ============================================
// INDICATOR DTOs
// ============================================

/// Parameters of the fixed-indicator aggregate route
#[derive(Debug, Deserialize)]
pub struct CommuneParams {
    /// Commune name to look up
    pub commune: String,
    /// Optional bearer token (falls back to configuration)
    #[serde(default)]
    pub token: Option<String>,
}

/// Parameters of the cube listing route
#[derive(Debug, Deserialize)]
pub struct CubesParams {
    /// Optional bearer token (falls back to configuration)
    #[serde(default)]
    pub token: Option<String>,
}

/// Cube listing response
#[derive(Debug, Serialize)]
pub struct CubesResponse {
    pub cubes: Vec<CubeDescriptor>,
    pub total: usize,
}

/// Parameters of the open cube query route
#[derive(Debug, Deserialize)]
pub struct CubeQueryParams {
    /// Cube name (e.g. "tri_biodechets_dpt")
    pub cube: String,
    /// Comma-separated measure identifiers
    pub measures: String,
    /// Comma-separated dimension identifiers (optional)
    #[serde(default)]
    pub dimensions: String,
    /// Semicolon-separated `member:operator:value` filters (optional)
    #[serde(default)]
    pub filters: String,
    /// Result limit, 1..=1000
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Optional bearer token (falls back to configuration)
    #[serde(default)]
    pub token: Option<String>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

// ============================================
// TABULAR DTOs
// ============================================

/// Pagination parameters of the tabular data route
#[derive(Debug, Deserialize)]
pub struct PageParams {
    /// Page number, 1-based
    #[serde(default = "default_page")]
    pub page: u32,
    /// Rows per page, 1..=100
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    20
}
