use geo::MultiPolygon;
use serde::{Deserialize, Serialize};

/// The scorecard JSON document as published by the data pipeline.
///
/// Field names on the wire are the pipeline's Portuguese keys; the Rust side
/// uses English names via `serde(rename)`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScorecardDocument {
    pub summary: Vec<ContactRecord>,
    #[serde(rename = "per_responsavel")]
    pub per_owner: Vec<OwnerSummary>,
    #[serde(default, rename = "daily_data")]
    pub daily: Vec<DailyCount>,
    #[serde(default, rename = "period_info")]
    pub period: PeriodInfo,
    /// Raw goal configuration, carried through untouched for exports.
    #[serde(default, rename = "metas_gerais")]
    pub goals: serde_json::Value,
    #[serde(default, rename = "atingimento_metas_gerais")]
    pub attainment: OverallAttainment,
}

/// One raw contact row from the scorecard `summary` array.
///
/// `extra` catches whatever additional columns the pipeline ships so the
/// generic detail table can render them without code changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRecord {
    #[serde(default, rename = "responsavel")]
    pub owner: String,
    #[serde(default, rename = "origem")]
    pub origin: String,
    #[serde(default, rename = "data_cadastro")]
    pub registration_date: Option<String>,
    #[serde(default, rename = "data_conversao")]
    pub conversion_date: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ContactRecord {
    /// A registration counts only when the date field is actually populated.
    pub fn has_registration(&self) -> bool {
        self.registration_date
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }

    pub fn has_conversion(&self) -> bool {
        self.conversion_date
            .as_deref()
            .is_some_and(|d| !d.trim().is_empty())
    }
}

/// Pre-aggregated per-owner figures computed upstream. The `final_score` is
/// authoritative; this program formats it but never re-derives it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerSummary {
    #[serde(rename = "responsavel")]
    pub owner: String,
    #[serde(default, rename = "contatos")]
    pub contacts: u64,
    #[serde(default, rename = "cadastros")]
    pub registrations: u64,
    #[serde(default, rename = "conversoes")]
    pub conversions: u64,
    #[serde(default, rename = "score_final")]
    pub final_score: f64,
}

/// Daily contact/registration counts, one row per calendar day present in the
/// source. Order is as shipped (ascending by date); gaps are not filled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyCount {
    #[serde(default, rename = "data_contato")]
    pub date: String,
    #[serde(default, rename = "contatos")]
    pub contacts: f64,
    #[serde(default, rename = "cadastros")]
    pub registrations: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PeriodInfo {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Achieved-vs-goal figures for one tracked quantity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GoalAttainment {
    #[serde(default, rename = "atingido")]
    pub achieved: f64,
    #[serde(default, rename = "meta")]
    pub goal: f64,
    #[serde(default, rename = "percentual")]
    pub percent: f64,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct OverallAttainment {
    #[serde(default, rename = "contatos")]
    pub contacts: GoalAttainment,
    #[serde(default, rename = "cadastros")]
    pub registrations: GoalAttainment,
    #[serde(default, rename = "scorecard_geral")]
    pub overall_score: f64,
}

/// The partner map JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct MapDocument {
    #[serde(rename = "allMarkerData")]
    pub partners: Vec<PartnerRecord>,
    #[serde(default)]
    pub period: Period,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Period {
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub end: Option<String>,
}

/// One partner (marker) row. Numeric fields default to zero when absent so
/// aggregation never has to special-case missing data.
#[derive(Debug, Clone, Deserialize)]
pub struct PartnerRecord {
    #[serde(default)]
    pub store_id: String,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub delivery_station: String,
    #[serde(default, rename = "hub_delivey_initiatives")]
    pub initiative: Option<String>,
    #[serde(default)]
    pub jurisdiction_type: Option<String>,
    #[serde(default)]
    pub supply_run: Option<String>,
    #[serde(default, rename = "HCP_rate_card")]
    pub hcp_rate_card: Option<String>,
    #[serde(default, rename = "ADV")]
    pub adv: f64,
    #[serde(default)]
    pub eligible_packages: f64,
    #[serde(default)]
    pub overlapping_count: f64,
    /// Pre-rendered popup payload from the pipeline; opaque here.
    #[serde(default)]
    pub popup: String,
    #[serde(default, rename = "main_store_data")]
    pub metrics: Option<MetricsSnapshot>,
    #[serde(default, rename = "overlap_data")]
    pub overlaps: Vec<OverlapSnapshot>,
    /// Resolved by the region association pass; never read before it runs.
    #[serde(skip)]
    pub region: Option<String>,
}

impl PartnerRecord {
    pub fn is_active(&self) -> bool {
        self.status == "Active"
    }

    /// "BG Checks" partners are in the onboarding funnel too.
    pub fn is_onboarding(&self) -> bool {
        self.status == "Onboarding" || self.status == "BG Checks"
    }

    pub fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region)
    }
}

/// Per-store operational metrics for the comparison view and the performance
/// tab. Rate metrics (dea/ead/dcr/fdds/ftds) are fractions in [0, 1].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(default)]
    pub radius: f64,
    #[serde(default)]
    pub total_packages_allocated: f64,
    #[serde(default, rename = "ADV")]
    pub adv: f64,
    #[serde(default)]
    pub partner_capacity: f64,
    #[serde(default)]
    pub eligible_packages: f64,
    #[serde(default)]
    pub working_days: f64,
    #[serde(default)]
    pub capped_days: f64,
    #[serde(default)]
    pub overlapping_count: f64,
    #[serde(default)]
    pub dispatched_packages: f64,
    #[serde(default)]
    pub delivered_packages: f64,
    #[serde(default)]
    pub dea: f64,
    #[serde(default)]
    pub ead: f64,
    #[serde(default)]
    pub dcr: f64,
    #[serde(default)]
    pub fdds: f64,
    #[serde(default)]
    pub ftds: f64,
}

/// Metrics snapshot of a neighboring store, for side-by-side comparison.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlapSnapshot {
    #[serde(default)]
    pub overlap_id: u32,
    #[serde(default)]
    pub store_id: String,
    #[serde(flatten)]
    pub metrics: MetricsSnapshot,
}

/// A cluster polygon from the clusters GeoJSON. Input order matters: the
/// association pass assigns the first containing polygon.
#[derive(Debug, Clone)]
pub struct RegionPolygon {
    pub name: String,
    pub delivery_station: String,
    pub expected_partners: u64,
    pub color: Option<String>,
    pub geometry: MultiPolygon<f64>,
}

/// A delivery-station jurisdiction outline from the jurisdiction GeoJSON.
#[derive(Debug, Clone)]
pub struct JurisdictionArea {
    pub delivery_station: String,
    pub color: Option<String>,
    pub geometry: MultiPolygon<f64>,
}
