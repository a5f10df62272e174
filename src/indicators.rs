//! Fixed-Indicator Aggregate
//!
//! A small catalog of ecological indicator categories, each backed by one
//! cube and one measure of the indicator hub. The aggregate fetch runs one
//! query per category concurrently and tolerates partial failure: a failed
//! category degrades to an empty array instead of failing the response.

use futures_util::future::join_all;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::cubejs::{indicator_query, CubeClient, MatchPolicy};

/// One indicator category: response key, backing cube, measure.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorSpec {
    pub key: &'static str,
    pub cube: &'static str,
    pub measure: &'static str,
}

/// Catalog of commune-level indicator categories. The first two entries
/// form the reduced `Core` set.
pub const CATALOG: [IndicatorSpec; 5] = [
    IndicatorSpec {
        key: "mobilite",
        cube: "lineaire_cyclable_habitant_com",
        measure: "lineaire_cyclable_habitant_com.id_839",
    },
    IndicatorSpec {
        key: "energie",
        cube: "puissance_elec_installee_com",
        measure: "puissance_elec_installee_com.id_636",
    },
    IndicatorSpec {
        key: "ges",
        cube: "emission_ges_hab_com",
        measure: "emission_ges_hab_com.id_2",
    },
    IndicatorSpec {
        key: "biodiversite",
        cube: "sequestr_nette_co2_com",
        measure: "sequestr_nette_co2_com.id_615",
    },
    IndicatorSpec {
        key: "eau",
        cube: "prelevement_eau_usage_com",
        measure: "prelevement_eau_usage_com.id_638",
    },
];

/// Which indicator catalog the aggregate route serves. Two variants exist
/// in production; they are selected by configuration, never merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorSet {
    /// All five categories: mobilite, energie, ges, biodiversite, eau.
    #[default]
    Full,
    /// Reduced variant: mobilite and energie only.
    Core,
}

impl IndicatorSet {
    pub fn specs(&self) -> &'static [IndicatorSpec] {
        match self {
            Self::Full => &CATALOG,
            Self::Core => &CATALOG[..2],
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full" => Some(Self::Full),
            "core" => Some(Self::Core),
            _ => None,
        }
    }
}

/// Fetch every category of the set for one commune, concurrently.
///
/// Each category maps to its upstream `data` rows, or `[]` when that one
/// call fails (logged at warn). The categories are independent, so one
/// failure never empties the others.
pub async fn collect(
    client: &CubeClient,
    token: &str,
    commune: &str,
    policy: MatchPolicy,
    set: IndicatorSet,
) -> Map<String, Value> {
    let fetches = set.specs().iter().map(move |spec| async move {
        let query = indicator_query(spec.cube, spec.measure, commune, policy);
        let rows = match client.run_query(token, &query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(
                    category = spec.key,
                    cube = spec.cube,
                    error = %e,
                    "indicator fetch failed, returning empty category"
                );
                Vec::new()
            }
        };
        (spec.key, Value::Array(rows))
    });

    join_all(fetches)
        .await
        .into_iter()
        .map(|(key, rows)| (key.to_string(), rows))
        .collect()
}
