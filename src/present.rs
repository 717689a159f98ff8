// Presentation adapter: translates engine output into the shapes the
// rendering collaborators consume (marker lists, overlay styles, chart
// datasets, table rows). No business math happens here beyond formatting.
use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;

use crate::filter::ScorecardFilters;
use crate::metrics::{
    self, ExpansionTotals, GeneralKpis, GroupStats, PerformanceGoals, PerformanceStats,
    RegionStats, RouteStats, RouteSummary,
};
use crate::ranking;
use crate::series::ProjectionSeries;
use crate::types::{
    ContactRecord, GoalAttainment, JurisdictionArea, OwnerSummary, PartnerRecord, RegionPolygon,
};
use crate::util::{format_number, format_pct};

/// Marker fill palette, cycled over the sorted category values.
pub const PALETTE: [&str; 9] = [
    "#e41a1c", "#377eb8", "#4daf4a", "#984ea3", "#ff7f00", "#ffff33", "#a65628", "#f781bf",
    "#999999",
];
pub const FALLBACK_COLOR: &str = "#808080";
pub const DEFAULT_REGION_COLOR: &str = "#3388ff";
pub const DEFAULT_JURISDICTION_COLOR: &str = "#6E00B3";

/// Placeholder for values the source did not ship.
pub const NOT_AVAILABLE: &str = "N/A";

/// Which categorical attribute drives marker coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Status,
    Station,
    Initiative,
    Jurisdiction,
}

impl CategoryField {
    pub fn value_of(self, p: &PartnerRecord) -> String {
        let v = match self {
            CategoryField::Status => Some(p.status.as_str()),
            CategoryField::Station => Some(p.delivery_station.as_str()),
            CategoryField::Initiative => p.initiative.as_deref(),
            CategoryField::Jurisdiction => p.jurisdiction_type.as_deref(),
        };
        match v {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}

/// Deterministic category → color mapping: unique values sorted, palette
/// assigned round-robin.
pub fn color_map(partners: &[PartnerRecord], field: CategoryField) -> BTreeMap<String, &'static str> {
    let values: std::collections::BTreeSet<String> =
        partners.iter().map(|p| field.value_of(p)).collect();
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (v, PALETTE[i % PALETTE.len()]))
        .collect()
}

/// One map marker, ready for the map collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct MarkerDescriptor {
    pub store_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub color: String,
    pub popup: String,
}

pub fn marker_descriptors(
    partners: &[PartnerRecord],
    field: CategoryField,
) -> Vec<MarkerDescriptor> {
    let colors = color_map(partners, field);
    partners
        .iter()
        .map(|p| MarkerDescriptor {
            store_id: p.store_id.clone(),
            name: p.name.clone(),
            lat: p.lat,
            lon: p.lon,
            radius: p.radius,
            color: colors
                .get(&field.value_of(p))
                .copied()
                .unwrap_or(FALLBACK_COLOR)
                .to_string(),
            popup: p.popup.clone(),
        })
        .collect()
}

/// A styled region polygon overlay with its popup lines.
#[derive(Debug, Clone, Serialize)]
pub struct RegionOverlay {
    pub region: String,
    pub color: String,
    pub popup_lines: Vec<String>,
}

pub fn region_overlays(stats: &[RegionStats], polygons: &[&RegionPolygon]) -> Vec<RegionOverlay> {
    polygons
        .iter()
        .zip(stats)
        .map(|(poly, s)| RegionOverlay {
            region: poly.name.clone(),
            color: poly
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_REGION_COLOR.to_string()),
            popup_lines: vec![
                format!("Region: {}", s.region),
                format!("Expected partners: {}", s.expected),
                format!("Active partners: {}", s.active),
                format!("Onboarding partners: {}", s.onboarding),
                format!("Attainment: {}", format_pct(s.attainment, 1)),
                format!("Priority: {}", s.priority),
                format!("Mean ADV: {:.1}", s.mean_adv),
            ],
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct JurisdictionOverlay {
    pub delivery_station: String,
    pub color: String,
}

pub fn jurisdiction_overlays(areas: &[&JurisdictionArea]) -> Vec<JurisdictionOverlay> {
    areas
        .iter()
        .map(|a| JurisdictionOverlay {
            delivery_station: a.delivery_station.clone(),
            color: a
                .color
                .clone()
                .unwrap_or_else(|| DEFAULT_JURISDICTION_COLOR.to_string()),
        })
        .collect()
}

/// One endpoint of a planned supply route.
#[derive(Debug, Clone, Serialize)]
pub struct Waypoint {
    pub store_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Waypoint {
    fn of(p: &PartnerRecord) -> Self {
        Waypoint {
            store_id: p.store_id.clone(),
            name: p.name.clone(),
            lat: p.lat,
            lon: p.lon,
        }
    }
}

/// The waypoint pair handed to the routing collaborator. Resolution of the
/// two store ids happens at the call site; both endpoints are valid here.
#[derive(Debug, Clone, Serialize)]
pub struct RouteEndpoints {
    pub from: Waypoint,
    pub to: Waypoint,
}

pub fn route_endpoints(from: &PartnerRecord, to: &PartnerRecord) -> RouteEndpoints {
    RouteEndpoints {
        from: Waypoint::of(from),
        to: Waypoint::of(to),
    }
}

/// One dataset for the charting collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct ChartDataset {
    pub label: String,
    pub series: Vec<f64>,
    pub axis: &'static str,
    pub dashed: bool,
}

/// The four temporal-chart datasets: both cumulative series plus their dashed
/// target lines, paired to the contacts/registrations axes.
pub fn temporal_chart(series: &ProjectionSeries) -> Vec<ChartDataset> {
    vec![
        ChartDataset {
            label: "Contacts (cumulative + projection)".to_string(),
            series: series.contacts.clone(),
            axis: "contacts",
            dashed: false,
        },
        ChartDataset {
            label: "Registrations (cumulative + projection)".to_string(),
            series: series.registrations.clone(),
            axis: "registrations",
            dashed: false,
        },
        ChartDataset {
            label: "Contact target".to_string(),
            series: series.contact_target.clone(),
            axis: "contacts",
            dashed: true,
        },
        ChartDataset {
            label: "Registration target".to_string(),
            series: series.registration_target.clone(),
            axis: "registrations",
            dashed: true,
        },
    ]
}

/// A stat card: formatted value plus whether the goal was met (None when the
/// card carries no goal).
#[derive(Debug, Clone, Serialize)]
pub struct StatCard {
    pub title: String,
    pub value: String,
    pub met: Option<bool>,
}

impl StatCard {
    pub fn new(title: &str, value: String, numeric: f64, goal: f64) -> Self {
        StatCard {
            title: title.to_string(),
            value,
            met: (goal > 0.0).then_some(numeric >= goal),
        }
    }

    pub fn plain(title: &str, value: String) -> Self {
        StatCard {
            title: title.to_string(),
            value,
            met: None,
        }
    }
}

pub fn performance_cards(stats: &PerformanceStats, goals: &PerformanceGoals) -> Vec<StatCard> {
    vec![
        StatCard::new(
            "Active Partners",
            stats.active_partners.to_string(),
            stats.active_partners as f64,
            goals.active_partners,
        ),
        StatCard::new(
            "Mean ADV",
            format!("{:.0}", stats.avg_adv),
            stats.avg_adv,
            goals.adv,
        ),
        StatCard::new(
            "Dispatched Packages",
            format_number(stats.dispatched_packages, 0),
            stats.dispatched_packages,
            goals.dispatched_packages,
        ),
        StatCard::new(
            "Delivered Packages",
            format_number(stats.delivered_packages, 0),
            stats.delivered_packages,
            goals.delivered_packages,
        ),
        StatCard::new("EAD", format_pct(stats.ead, 1), stats.ead * 100.0, goals.ead_pct),
        StatCard::new("DEA", format_pct(stats.dea, 1), stats.dea * 100.0, goals.dea_pct),
        StatCard::new("DCR", format_pct(stats.dcr, 1), stats.dcr * 100.0, goals.dcr_pct),
        StatCard::new("FDDS", format_pct(stats.fdds, 1), stats.fdds * 100.0, goals.fdds_pct),
        StatCard::new("FTDS", format_pct(stats.ftds, 1), stats.ftds * 100.0, goals.ftds_pct),
    ]
}

pub fn expansion_cards(totals: &ExpansionTotals) -> Vec<StatCard> {
    vec![
        StatCard::plain("Expected Partners", totals.expected.to_string()),
        StatCard::new("Active Partners", totals.active.to_string(), totals.active as f64, 85.0),
        StatCard::new(
            "Onboarding Partners",
            totals.onboarding.to_string(),
            totals.onboarding as f64,
            25.0,
        ),
        StatCard::new(
            "Overall Attainment",
            format!("{:.1}%", totals.attainment_pct),
            totals.attainment_pct,
            80.0,
        ),
    ]
}

pub fn route_cards(summary: &RouteSummary) -> Vec<StatCard> {
    vec![
        StatCard::plain("Total Routes", summary.routes.to_string()),
        StatCard::new("Mean SPR", format!("{:.0}", summary.avg_spr), summary.avg_spr, 480.0),
        StatCard::new(
            "Mean CPP",
            format!("R$ {:.2}", summary.avg_cpp),
            summary.avg_cpp,
            2.5,
        ),
        StatCard::new(
            "HCP Host Partners",
            summary.hcp_host_tier1.to_string(),
            summary.hcp_host_tier1 as f64,
            summary.hcp_host_goal,
        ),
        StatCard::new(
            "HCP Pick-up Partners",
            summary.hcp_pickup_tier1.to_string(),
            summary.hcp_pickup_tier1 as f64,
            summary.hcp_pickup_goal,
        ),
        StatCard::new(
            "Pick-ups per HCP Host",
            format!("{:.0}", summary.avg_pickup_per_host),
            summary.avg_pickup_per_host,
            4.0,
        ),
    ]
}

pub fn kpi_cards(kpis: &GeneralKpis) -> Vec<StatCard> {
    vec![
        StatCard::plain("Contacts Made", format_number(kpis.contacts, 0)),
        StatCard::plain("Total Registrations", format_number(kpis.registrations, 0)),
        StatCard::plain(
            "Registration Rate",
            format!("{:.2}%", kpis.registration_rate_pct),
        ),
        StatCard::plain(
            "Overall Score",
            format!("{:.0}/100", kpis.overall_score_pct),
        ),
    ]
}

/// Goal progress rows for the weekly goals panel; pure pass-through from the
/// upstream attainment figures.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct GoalProgressRow {
    #[tabled(rename = "Goal")]
    pub name: String,
    #[tabled(rename = "Achieved")]
    pub achieved: String,
    #[tabled(rename = "Target")]
    pub target: String,
    #[tabled(rename = "Percent")]
    pub percent: String,
}

pub fn goal_progress(name: &str, attainment: &GoalAttainment) -> GoalProgressRow {
    GoalProgressRow {
        name: name.to_string(),
        achieved: format_number(attainment.achieved, 0),
        target: format_number(attainment.goal, 0),
        percent: format!("{:.1}%", attainment.percent),
    }
}

/// A podium entry: one owner's performance within an origin.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PodiumEntry {
    #[tabled(rename = "Owner")]
    pub owner: String,
    #[tabled(rename = "Rate")]
    pub rate: String,
    #[tabled(rename = "Registrations")]
    pub registrations: u64,
    #[tabled(rename = "Contacts")]
    pub contacts: u64,
}

/// Top-3 owners per origin, ranked by registration rate over the full raw
/// summary. Origins enumerate in first-occurrence order.
pub fn origin_podiums(records: &[ContactRecord]) -> Vec<(String, Vec<PodiumEntry>)> {
    let origins = metrics::aggregate_by(records, |r| r.origin.clone());
    origins
        .iter()
        .map(|(origin, _)| {
            let in_origin: Vec<ContactRecord> = records
                .iter()
                .filter(|r| &r.origin == origin)
                .cloned()
                .collect();
            let owners = metrics::aggregate_by(&in_origin, |r| r.owner.clone());
            let top = ranking::top_by_rate(&owners, |(_, g)| g.registration_rate(), 3);
            let entries = top
                .into_iter()
                .map(|(owner, g)| PodiumEntry {
                    owner,
                    rate: format_pct(g.registration_rate(), 0),
                    registrations: g.registrations,
                    contacts: g.contacts,
                })
                .collect();
            (origin.clone(), entries)
        })
        .collect()
}

/// Per-owner performance card for the scorecard view. Score comes from the
/// upstream summary; the best origin is derived from that owner's raw rows.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct OwnerCard {
    #[tabled(rename = "Owner")]
    pub owner: String,
    #[tabled(rename = "Score")]
    pub score: String,
    #[tabled(rename = "Contacts")]
    pub contacts: u64,
    #[tabled(rename = "Registrations")]
    pub registrations: u64,
    #[tabled(rename = "Conversions")]
    pub conversions: u64,
    #[tabled(rename = "Best Origin")]
    pub best_origin: String,
}

pub fn owner_cards(summaries: &[OwnerSummary], records: &[ContactRecord]) -> Vec<OwnerCard> {
    summaries
        .iter()
        .map(|s| OwnerCard {
            owner: s.owner.clone(),
            score: format!("{:.0}", s.final_score * 100.0),
            contacts: s.contacts,
            registrations: s.registrations,
            conversions: s.conversions,
            best_origin: best_origin_for_owner(records, &s.owner),
        })
        .collect()
}

fn best_origin_for_owner(records: &[ContactRecord], owner: &str) -> String {
    let filters = ScorecardFilters {
        owner: crate::filter::Selection::Only(owner.to_string()),
        origin: crate::filter::Selection::All,
    };
    let own: Vec<ContactRecord> = records.iter().filter(|r| filters.matches(r)).cloned().collect();
    let groups = metrics::aggregate_by(&own, |r| r.origin.clone());
    match metrics::best_group(&groups) {
        Some((origin, _)) => origin,
        None => NOT_AVAILABLE.to_string(),
    }
}

/// The overall best origin panel (strictly-greater rate, ties keep
/// enumeration order).
#[derive(Debug, Clone, Serialize)]
pub struct BestOriginCard {
    pub origin: String,
    pub rate: String,
    pub contacts: u64,
    pub registrations: u64,
    pub conversions: u64,
}

pub fn best_origin_card(records: &[ContactRecord]) -> Option<BestOriginCard> {
    let groups = metrics::aggregate_by(records, |r| r.origin.clone());
    metrics::best_group(&groups).map(|(origin, g): (String, GroupStats)| BestOriginCard {
        origin,
        rate: format_pct(g.registration_rate(), 1),
        contacts: g.contacts,
        registrations: g.registrations,
        conversions: g.conversions,
    })
}

/// Headers for the generic detail table: the known columns first, then
/// whatever extra columns the first record carries.
pub fn detail_headers(records: &[ContactRecord]) -> Vec<String> {
    let mut headers = vec![
        "OWNER".to_string(),
        "ORIGIN".to_string(),
        "REGISTRATION DATE".to_string(),
        "CONVERSION DATE".to_string(),
    ];
    if let Some(first) = records.first() {
        headers.extend(
            first
                .extra
                .keys()
                .map(|k| k.replace('_', " ").to_uppercase()),
        );
    }
    headers
}

/// Row cells aligned with `detail_headers`; missing values render "N/A".
pub fn detail_rows(records: &[ContactRecord]) -> Vec<Vec<String>> {
    let extra_keys: Vec<String> = records
        .first()
        .map(|r| r.extra.keys().cloned().collect())
        .unwrap_or_default();
    records
        .iter()
        .map(|r| {
            let mut row = vec![
                non_empty_or_na(&r.owner),
                non_empty_or_na(&r.origin),
                r.registration_date
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
                r.conversion_date
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ];
            for key in &extra_keys {
                row.push(match r.extra.get(key) {
                    None | Some(serde_json::Value::Null) => NOT_AVAILABLE.to_string(),
                    Some(serde_json::Value::String(s)) => s.clone(),
                    Some(v) => v.to_string(),
                });
            }
            row
        })
        .collect()
}

fn non_empty_or_na(s: &str) -> String {
    if s.is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        s.to_string()
    }
}

/// Performance-tab table row (one per partner, metrics flattened in).
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct PerformanceRow {
    #[tabled(rename = "Store ID")]
    #[serde(rename = "StoreId")]
    pub store_id: String,
    #[tabled(rename = "Store Name")]
    #[serde(rename = "StoreName")]
    pub name: String,
    #[tabled(rename = "D. Station")]
    #[serde(rename = "DeliveryStation")]
    pub delivery_station: String,
    #[tabled(rename = "ADV")]
    #[serde(rename = "ADV")]
    pub adv: String,
    #[tabled(rename = "Dispatched")]
    #[serde(rename = "DispatchedPackages")]
    pub dispatched: String,
    #[tabled(rename = "Delivered")]
    #[serde(rename = "DeliveredPackages")]
    pub delivered: String,
    #[tabled(rename = "DEA")]
    #[serde(rename = "DEA")]
    pub dea: String,
    #[tabled(rename = "EAD")]
    #[serde(rename = "EAD")]
    pub ead: String,
    #[tabled(rename = "DCR")]
    #[serde(rename = "DCR")]
    pub dcr: String,
    #[tabled(rename = "FDDS")]
    #[serde(rename = "FDDS")]
    pub fdds: String,
    #[tabled(rename = "FTDS")]
    #[serde(rename = "FTDS")]
    pub ftds: String,
}

pub fn performance_rows(partners: &[PartnerRecord]) -> Vec<PerformanceRow> {
    partners
        .iter()
        .map(|p| {
            let m = p.metrics.unwrap_or_default();
            PerformanceRow {
                store_id: p.store_id.clone(),
                name: p.name.clone(),
                delivery_station: p.delivery_station.clone(),
                adv: format!("{:.0}", p.adv),
                dispatched: format_number(m.dispatched_packages, 0),
                delivered: format_number(m.delivered_packages, 0),
                dea: format_pct(m.dea, 1),
                ead: format_pct(m.ead, 1),
                dcr: format_pct(m.dcr, 1),
                fdds: format_pct(m.fdds, 1),
                ftds: format_pct(m.ftds, 1),
            }
        })
        .collect()
}

/// Expansion-tab table row (one per region polygon in view).
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ExpansionRow {
    #[tabled(rename = "Region")]
    #[serde(rename = "Region")]
    pub region: String,
    #[tabled(rename = "D. Station")]
    #[serde(rename = "DeliveryStation")]
    pub delivery_station: String,
    #[tabled(rename = "Active")]
    #[serde(rename = "ActivePartners")]
    pub active: u64,
    #[tabled(rename = "Onboarding")]
    #[serde(rename = "OnboardingPartners")]
    pub onboarding: u64,
    #[tabled(rename = "Expected")]
    #[serde(rename = "ExpectedPartners")]
    pub expected: u64,
    #[tabled(rename = "Attainment")]
    #[serde(rename = "Attainment")]
    pub attainment: String,
    #[tabled(rename = "Priority")]
    #[serde(rename = "Priority")]
    pub priority: usize,
}

pub fn expansion_rows(stats: &[RegionStats]) -> Vec<ExpansionRow> {
    stats
        .iter()
        .map(|s| ExpansionRow {
            region: s.region.clone(),
            delivery_station: s.delivery_station.clone(),
            active: s.active,
            onboarding: s.onboarding,
            expected: s.expected,
            attainment: format_pct(s.attainment, 1),
            priority: s.priority,
        })
        .collect()
}

/// Routes-tab table row (one per supply run).
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct RouteRow {
    #[tabled(rename = "Route")]
    #[serde(rename = "Route")]
    pub route: String,
    #[tabled(rename = "D. Station")]
    #[serde(rename = "DeliveryStation")]
    pub delivery_station: String,
    #[tabled(rename = "Active")]
    #[serde(rename = "ActivePartners")]
    pub active: u64,
    #[tabled(rename = "Onboarding")]
    #[serde(rename = "OnboardingPartners")]
    pub onboarding: u64,
    #[tabled(rename = "HCP Hosts")]
    #[serde(rename = "HcpHostPartners")]
    pub hcp_host: u64,
    #[tabled(rename = "HCP Pick-ups")]
    #[serde(rename = "HcpPickupPartners")]
    pub hcp_pickup: u64,
    #[tabled(rename = "SPR")]
    #[serde(rename = "SPR")]
    pub spr: String,
    #[tabled(rename = "CPP")]
    #[serde(rename = "CPP")]
    pub cpp: String,
}

pub fn route_rows(routes: &[RouteStats]) -> Vec<RouteRow> {
    routes
        .iter()
        .map(|r| RouteRow {
            route: r.route.clone(),
            delivery_station: r.delivery_station.clone(),
            active: r.active,
            onboarding: r.onboarding,
            hcp_host: r.hcp_host,
            hcp_pickup: r.hcp_pickup,
            spr: format!("{:.0}", r.spr),
            cpp: format!("R$ {:.2}", r.cpp),
        })
        .collect()
}
