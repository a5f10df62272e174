//! CubeJS Query Construction
//!
//! Translates flat caller parameters (comma-separated measure/dimension
//! lists, semicolon-separated filter expressions) into the structured
//! query grammar the indicator hub expects.
//!
//! Queries are serialized with serde_json, so string values always end up
//! strictly double-quoted. Commune names containing apostrophes ("L'Isle")
//! pass through untouched.

use serde::{Deserialize, Serialize};

/// Default row limit for open queries.
pub const DEFAULT_LIMIT: u32 = 100;

/// Hard cap on the row limit; larger requests are clamped.
pub const MAX_LIMIT: u32 = 1000;

/// Row limit for fixed-indicator queries (latest years only).
pub const INDICATOR_LIMIT: u32 = 10;

/// Lower bound on the year dimension for fixed-indicator queries.
pub const MIN_YEAR: &str = "2020";

/// Filter operators accepted by the upstream load endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl FilterOperator {
    /// Parse the wire spelling used in filter expressions.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "equals" => Some(Self::Equals),
            "notEquals" => Some(Self::NotEquals),
            "contains" => Some(Self::Contains),
            "notContains" => Some(Self::NotContains),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            _ => None,
        }
    }
}

/// A single filter clause of a cube query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CubeFilter {
    pub member: String,
    pub operator: FilterOperator,
    pub values: Vec<String>,
}

/// A structured CubeJS query.
///
/// Invariants: `measures` is non-empty, `limit` is within `[1, MAX_LIMIT]`.
/// Empty `dimensions`/`filters` are omitted from the serialized form, as
/// the original callers did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CubeQuery {
    pub measures: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<CubeFilter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Vec<(String, String)>>,
    pub limit: u32,
}

/// How the commune filter of a fixed-indicator query matches names.
///
/// Both policies exist in production use; the choice is made once at
/// configuration time, not per route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// `equals` on the trimmed, title-cased commune name.
    #[default]
    Exact,
    /// `contains` on the raw commune string, case-sensitive.
    Substring,
}

impl MatchPolicy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact" => Some(Self::Exact),
            "substring" => Some(Self::Substring),
            _ => None,
        }
    }
}

/// Title-case a commune name: the first letter of every alphabetic run is
/// uppercased, the rest lowercased. "l'isle-adam" becomes "L'Isle-Adam".
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Build the commune filter clause for a fixed-indicator query.
fn commune_filter(cube: &str, commune: &str, policy: MatchPolicy) -> CubeFilter {
    let member = format!("{cube}.libelle_commune");
    match policy {
        MatchPolicy::Exact => CubeFilter {
            member,
            operator: FilterOperator::Equals,
            values: vec![title_case(commune.trim())],
        },
        MatchPolicy::Substring => CubeFilter {
            member,
            operator: FilterOperator::Contains,
            values: vec![commune.to_string()],
        },
    }
}

/// Build the fixed-indicator query for one cube: commune filter per the
/// matching policy, years 2020 onward, newest first, 10 rows.
pub fn indicator_query(
    cube: &str,
    measure: &str,
    commune: &str,
    policy: MatchPolicy,
) -> CubeQuery {
    let year = format!("{cube}.annee");
    CubeQuery {
        measures: vec![measure.to_string()],
        dimensions: vec![format!("{cube}.libelle_commune"), year.clone()],
        filters: vec![
            commune_filter(cube, commune, policy),
            CubeFilter {
                member: year.clone(),
                operator: FilterOperator::Gte,
                values: vec![MIN_YEAR.to_string()],
            },
        ],
        order: Some(vec![(year, "desc".to_string())]),
        limit: INDICATOR_LIMIT,
    }
}

/// Build an open query from caller-supplied parameter strings.
///
/// `measures` and `dimensions` are comma-separated, `filters` is a
/// semicolon-separated list of `member:operator:value` expressions.
/// The limit is clamped to [`MAX_LIMIT`]; values below 1 are rejected by
/// the route layer before this runs.
pub fn open_query(measures: &str, dimensions: &str, filters: &str, limit: u32) -> CubeQuery {
    CubeQuery {
        measures: split_list(measures),
        dimensions: split_list(dimensions),
        filters: parse_filters(filters),
        order: None,
        limit: limit.min(MAX_LIMIT),
    }
}

/// Split a comma-separated identifier list, trimming whitespace and
/// skipping empty entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse semicolon-separated `member:operator:value` filter expressions.
///
/// Expressions with fewer than three colon-delimited fields, or with an
/// operator the upstream would reject, are silently dropped. This leniency
/// is deliberate: a malformed filter narrows nothing instead of failing
/// the whole query.
pub fn parse_filters(raw: &str) -> Vec<CubeFilter> {
    raw.split(';')
        .filter_map(|expr| {
            let parts: Vec<&str> = expr.split(':').collect();
            if parts.len() < 3 {
                return None;
            }
            let operator = FilterOperator::parse(parts[1])?;
            Some(CubeFilter {
                member: parts[0].to_string(),
                operator,
                values: vec![parts[2].to_string()],
            })
        })
        .collect()
}
