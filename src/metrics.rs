// Derived-metric aggregation over the filtered record sets.
//
// Functions here take plain slices and return plain data; rendering is the
// presentation adapter's job. Every ratio is guarded so a zero denominator
// yields 0, never NaN.
use std::collections::HashMap;
use std::hash::Hash;

use once_cell::sync::Lazy;

use crate::ranking;
use crate::types::{
    ContactRecord, MetricsSnapshot, OverallAttainment, PartnerRecord, RegionPolygon,
};
use crate::util::mean;

/// Counts for one aggregation group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    pub contacts: u64,
    pub registrations: u64,
    pub conversions: u64,
}

impl GroupStats {
    pub fn registration_rate(&self) -> f64 {
        if self.contacts == 0 {
            0.0
        } else {
            self.registrations as f64 / self.contacts as f64
        }
    }

    pub fn conversion_rate(&self) -> f64 {
        if self.contacts == 0 {
            0.0
        } else {
            self.conversions as f64 / self.contacts as f64
        }
    }
}

/// Group contact records by an arbitrary key. Enumeration order is the order
/// in which each key first occurs, so downstream consumers are deterministic
/// without sorting.
pub fn aggregate_by<K, F>(records: &[ContactRecord], key: F) -> Vec<(K, GroupStats)>
where
    K: Eq + Hash + Clone,
    F: Fn(&ContactRecord) -> K,
{
    let mut groups: Vec<(K, GroupStats)> = Vec::new();
    let mut index: HashMap<K, usize> = HashMap::new();
    for r in records {
        let k = key(r);
        let i = *index.entry(k.clone()).or_insert_with(|| {
            groups.push((k.clone(), GroupStats::default()));
            groups.len() - 1
        });
        let g = &mut groups[i].1;
        g.contacts += 1;
        if r.has_registration() {
            g.registrations += 1;
        }
        if r.has_conversion() {
            g.conversions += 1;
        }
    }
    groups
}

/// The group with the highest registration rate. Strictly-greater comparison,
/// so the first group in enumeration order wins exact ties.
pub fn best_group<K: Clone>(groups: &[(K, GroupStats)]) -> Option<(K, GroupStats)> {
    let mut best: Option<&(K, GroupStats)> = None;
    for g in groups {
        match best {
            None => best = Some(g),
            Some(b) if g.1.registration_rate() > b.1.registration_rate() => best = Some(g),
            _ => {}
        }
    }
    best.cloned()
}

/// Headline scorecard KPIs. These pass through the attainment figures
/// computed upstream; only the rate is assembled here (guarded), never the
/// underlying totals.
#[derive(Debug, Clone, Copy)]
pub struct GeneralKpis {
    pub contacts: f64,
    pub registrations: f64,
    pub registration_rate_pct: f64,
    pub overall_score_pct: f64,
}

pub fn general_kpis(attainment: &OverallAttainment) -> GeneralKpis {
    let contacts = attainment.contacts.achieved;
    let registrations = attainment.registrations.achieved;
    let registration_rate_pct = if contacts > 0.0 {
        (registrations / contacts) * 100.0
    } else {
        0.0
    };
    GeneralKpis {
        contacts,
        registrations,
        registration_rate_pct,
        overall_score_pct: attainment.overall_score * 100.0,
    }
}

/// Aggregates for the map "Performance" tab. Package totals cover the whole
/// filtered set; ADV and the rate means cover active partners only.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceStats {
    pub active_partners: usize,
    pub avg_adv: f64,
    pub dispatched_packages: f64,
    pub delivered_packages: f64,
    pub dea: f64,
    pub ead: f64,
    pub dcr: f64,
    pub fdds: f64,
    pub ftds: f64,
}

pub fn performance_stats(partners: &[PartnerRecord]) -> PerformanceStats {
    let active: Vec<&PartnerRecord> = partners.iter().filter(|p| p.is_active()).collect();
    let rate_mean = |get: fn(&MetricsSnapshot) -> f64| {
        mean(
            &active
                .iter()
                .map(|p| p.metrics.as_ref().map(get).unwrap_or(0.0))
                .collect::<Vec<_>>(),
        )
    };
    PerformanceStats {
        active_partners: active.len(),
        avg_adv: mean(&active.iter().map(|p| p.adv).collect::<Vec<_>>()),
        dispatched_packages: partners
            .iter()
            .filter_map(|p| p.metrics.as_ref())
            .map(|m| m.dispatched_packages)
            .sum(),
        delivered_packages: partners
            .iter()
            .filter_map(|p| p.metrics.as_ref())
            .map(|m| m.delivered_packages)
            .sum(),
        dea: rate_mean(|m| m.dea),
        ead: rate_mean(|m| m.ead),
        dcr: rate_mean(|m| m.dcr),
        fdds: rate_mean(|m| m.fdds),
        ftds: rate_mean(|m| m.ftds),
    }
}

/// Goal values the performance cards are judged against. The package goals
/// derive from the active-partner count and the period length.
#[derive(Debug, Clone, Copy)]
pub struct PerformanceGoals {
    pub active_partners: f64,
    pub adv: f64,
    pub dispatched_packages: f64,
    pub delivered_packages: f64,
    pub dea_pct: f64,
    pub ead_pct: f64,
    pub dcr_pct: f64,
    pub fdds_pct: f64,
    pub ftds_pct: f64,
}

pub fn performance_goals(stats: &PerformanceStats, working_days: f64) -> PerformanceGoals {
    let active = stats.active_partners as f64;
    PerformanceGoals {
        active_partners: 600.0,
        adv: 40.0,
        dispatched_packages: active * 40.0 * working_days,
        delivered_packages: active * 40.0 * 0.985,
        dea_pct: 98.5,
        ead_pct: 98.5,
        dcr_pct: 96.0,
        fdds_pct: 97.0,
        ftds_pct: 98.5,
    }
}

/// Per-region expansion figures. `priority` is the 1-based rank within the
/// owning delivery station, worst attainment first.
#[derive(Debug, Clone)]
pub struct RegionStats {
    pub region: String,
    pub delivery_station: String,
    pub active: u64,
    pub onboarding: u64,
    pub expected: u64,
    pub attainment: f64,
    pub mean_adv: f64,
    pub priority: usize,
}

impl RegionStats {
    /// Attainment of (active + onboarding) against the expected count; 0 when
    /// nothing is expected.
    fn attainment_of(active: u64, onboarding: u64, expected: u64) -> f64 {
        if expected == 0 {
            0.0
        } else {
            (active + onboarding) as f64 / expected as f64
        }
    }
}

/// One row per polygon, in polygon input order, with priorities assigned per
/// delivery station.
pub fn region_stats(partners: &[PartnerRecord], polygons: &[&RegionPolygon]) -> Vec<RegionStats> {
    let mut rows: Vec<RegionStats> = polygons
        .iter()
        .map(|poly| {
            let in_region: Vec<&PartnerRecord> =
                partners.iter().filter(|p| p.in_region(&poly.name)).collect();
            let active = in_region.iter().filter(|p| p.is_active()).count() as u64;
            let onboarding = in_region.iter().filter(|p| p.is_onboarding()).count() as u64;
            RegionStats {
                region: poly.name.clone(),
                delivery_station: poly.delivery_station.clone(),
                active,
                onboarding,
                expected: poly.expected_partners,
                attainment: RegionStats::attainment_of(active, onboarding, poly.expected_partners),
                mean_adv: mean(&in_region.iter().map(|p| p.adv).collect::<Vec<_>>()),
                priority: 0,
            }
        })
        .collect();

    let priorities = ranking::partition_priorities(
        &rows,
        |r| r.delivery_station.clone(),
        |r| r.attainment,
        |r| r.expected as f64,
    );
    for (row, priority) in rows.iter_mut().zip(priorities) {
        row.priority = priority;
    }
    rows
}

/// Totals across the regions currently in view.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpansionTotals {
    pub expected: u64,
    pub active: u64,
    pub onboarding: u64,
    pub attainment_pct: f64,
}

pub fn expansion_totals(partners: &[PartnerRecord], polygons: &[&RegionPolygon]) -> ExpansionTotals {
    let expected: u64 = polygons.iter().map(|p| p.expected_partners).sum();
    let active = partners.iter().filter(|p| p.is_active()).count() as u64;
    let onboarding = partners.iter().filter(|p| p.is_onboarding()).count() as u64;
    ExpansionTotals {
        expected,
        active,
        onboarding,
        attainment_pct: RegionStats::attainment_of(active, onboarding, expected) * 100.0,
    }
}

/// Cost of one supply run per delivery station, in BRL.
pub static COST_PER_SUPPLY_RUN: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("DSP2", 590.0),
        ("DSP3", 560.0),
        ("DSP4", 600.0),
        ("DSP5", 780.0),
        ("DBH5", 850.0),
        ("DRJ3", 680.0),
        ("DGO2", 670.0),
        ("DBS5", 550.0),
        ("DES2", 1065.0),
        ("DPE4", 700.0),
        ("DPB3", 750.0),
        ("DCE3", 820.0),
        ("DSA8", 750.0),
        ("DPR2", 1080.0),
        ("DRS5", 1060.0),
    ])
});

pub const DEFAULT_COST_PER_SUPPLY_RUN: f64 = 600.0;

fn supply_run_cost(station: &str) -> f64 {
    COST_PER_SUPPLY_RUN
        .get(station)
        .copied()
        .unwrap_or(DEFAULT_COST_PER_SUPPLY_RUN)
}

pub const HCP_HOST_INITIATIVE: &str = "HCP Host Partner";
pub const HCP_PICKUP_INITIATIVE: &str = "HCP Pick Up Partner";

/// Per-route supply-run figures. SPR is packages moved per working day; CPP
/// is the run cost spread over the packages it moved.
#[derive(Debug, Clone)]
pub struct RouteStats {
    pub route: String,
    pub delivery_station: String,
    pub active: u64,
    pub onboarding: u64,
    pub hcp_host: u64,
    pub hcp_pickup: u64,
    pub spr: f64,
    pub cpp: f64,
}

pub fn route_stats(partners: &[PartnerRecord]) -> Vec<RouteStats> {
    // Unique supply runs in first-occurrence order.
    let mut routes: Vec<&str> = Vec::new();
    for p in partners {
        if let Some(run) = p.supply_run.as_deref() {
            if !run.is_empty() && !routes.contains(&run) {
                routes.push(run);
            }
        }
    }

    routes
        .into_iter()
        .map(|run| {
            let in_route: Vec<&PartnerRecord> = partners
                .iter()
                .filter(|p| p.supply_run.as_deref() == Some(run))
                .collect();
            let station = in_route
                .first()
                .map(|p| p.delivery_station.clone())
                .unwrap_or_default();
            let total_packages: f64 = in_route
                .iter()
                .filter_map(|p| p.metrics.as_ref())
                .map(|m| m.dispatched_packages)
                .sum();
            let working_days = in_route
                .iter()
                .map(|p| p.metrics.as_ref().map(|m| m.working_days).unwrap_or(0.0))
                .fold(1.0_f64, f64::max);
            let total_cost = supply_run_cost(&station) * working_days;
            RouteStats {
                route: run.to_string(),
                delivery_station: station,
                active: in_route.iter().filter(|p| p.is_active()).count() as u64,
                onboarding: in_route
                    .iter()
                    .filter(|p| p.status == "Onboarding")
                    .count() as u64,
                hcp_host: count_initiative(&in_route, HCP_HOST_INITIATIVE),
                hcp_pickup: count_initiative(&in_route, HCP_PICKUP_INITIATIVE),
                spr: total_packages / working_days,
                cpp: if total_packages > 0.0 {
                    total_cost / total_packages
                } else {
                    0.0
                },
            }
        })
        .collect()
}

fn count_initiative(partners: &[&PartnerRecord], initiative: &str) -> u64 {
    partners
        .iter()
        .filter(|p| p.initiative.as_deref() == Some(initiative))
        .count() as u64
}

/// Roll-up across all routes plus the HCP initiative goals. The host goal is
/// 12% of active partners; each host is expected to feed four pick-ups.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteSummary {
    pub routes: usize,
    pub avg_spr: f64,
    pub avg_cpp: f64,
    pub hcp_host_tier1: u64,
    pub hcp_pickup_tier1: u64,
    pub hcp_host_goal: f64,
    pub hcp_pickup_goal: f64,
    pub avg_pickup_per_host: f64,
}

pub fn route_summary(partners: &[PartnerRecord], routes: &[RouteStats]) -> RouteSummary {
    let tier1 = |initiative: &str| {
        partners
            .iter()
            .filter(|p| {
                p.initiative.as_deref() == Some(initiative)
                    && p.is_active()
                    && p.hcp_rate_card.as_deref() == Some("Tier 1")
            })
            .count() as u64
    };
    let hcp_host_tier1 = tier1(HCP_HOST_INITIATIVE);
    let hcp_pickup_tier1 = tier1(HCP_PICKUP_INITIATIVE);
    let active = partners.iter().filter(|p| p.is_active()).count() as f64;
    let host_goal = active * 0.12;
    RouteSummary {
        routes: routes.len(),
        avg_spr: mean(&routes.iter().map(|r| r.spr).collect::<Vec<_>>()),
        avg_cpp: mean(&routes.iter().map(|r| r.cpp).collect::<Vec<_>>()),
        hcp_host_tier1,
        hcp_pickup_tier1,
        hcp_host_goal: host_goal,
        hcp_pickup_goal: host_goal * 4.0,
        avg_pickup_per_host: if hcp_host_tier1 == 0 {
            0.0
        } else {
            hcp_pickup_tier1 as f64 / hcp_host_tier1 as f64
        },
    }
}

/// Mean ADV of active partners in a delivery station, for the comparison
/// header line.
pub fn station_adv_mean(partners: &[PartnerRecord], station: &str) -> f64 {
    mean(
        &partners
            .iter()
            .filter(|p| p.delivery_station == station && p.is_active())
            .map(|p| p.adv)
            .collect::<Vec<_>>(),
    )
}

/// How an overlap's value compares against the primary store, given the
/// metric's direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum Verdict {
    Better,
    Worse,
    Even,
}

pub struct ComparisonMetric {
    pub name: &'static str,
    pub higher_is_better: bool,
    pub get: fn(&MetricsSnapshot) -> f64,
}

/// Metrics shown in the side-by-side comparison, in display order.
pub const COMPARISON_METRICS: [ComparisonMetric; 8] = [
    ComparisonMetric { name: "Radius (m)", higher_is_better: true, get: |m| m.radius },
    ComparisonMetric { name: "Total Packages Allocated", higher_is_better: true, get: |m| m.total_packages_allocated },
    ComparisonMetric { name: "ADV", higher_is_better: true, get: |m| m.adv },
    ComparisonMetric { name: "Capacity", higher_is_better: true, get: |m| m.partner_capacity },
    ComparisonMetric { name: "Eligible Packages", higher_is_better: true, get: |m| m.eligible_packages },
    ComparisonMetric { name: "Working Days", higher_is_better: true, get: |m| m.working_days },
    ComparisonMetric { name: "Capped Days (%)", higher_is_better: false, get: |m| m.capped_days },
    ComparisonMetric { name: "Overlaps", higher_is_better: false, get: |m| m.overlapping_count },
];

/// At most this many overlap columns in the comparison view.
pub const MAX_COMPARISON_OVERLAPS: usize = 4;

#[derive(Debug, Clone, serde::Serialize)]
pub struct ComparisonCell {
    pub store_id: String,
    pub value: f64,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct ComparisonRow {
    pub metric: &'static str,
    pub primary: Option<f64>,
    pub overlaps: Vec<ComparisonCell>,
}

/// One row per comparison metric: the primary store's value (absent when no
/// snapshot shipped) against up to four overlapping neighbors.
pub fn comparison_rows(partner: &PartnerRecord) -> Vec<ComparisonRow> {
    COMPARISON_METRICS
        .iter()
        .map(|metric| {
            let primary = partner.metrics.as_ref().map(|m| (metric.get)(m));
            let overlaps = partner
                .overlaps
                .iter()
                .take(MAX_COMPARISON_OVERLAPS)
                .map(|o| {
                    let value = (metric.get)(&o.metrics);
                    let verdict = match primary {
                        Some(main) if value != main => {
                            if (value > main) == metric.higher_is_better {
                                Verdict::Better
                            } else {
                                Verdict::Worse
                            }
                        }
                        _ => Verdict::Even,
                    };
                    ComparisonCell {
                        store_id: o.store_id.clone(),
                        value,
                        verdict,
                    }
                })
                .collect();
            ComparisonRow {
                metric: metric.name,
                primary,
                overlaps,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OverlapSnapshot;

    fn contact(owner: &str, origin: &str, registered: bool) -> ContactRecord {
        ContactRecord {
            owner: owner.to_string(),
            origin: origin.to_string(),
            registration_date: registered.then(|| "2025-01-10".to_string()),
            conversion_date: None,
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn group_contacts_sum_to_input_len() {
        let records = vec![
            contact("A", "X", true),
            contact("A", "Y", false),
            contact("B", "X", true),
            contact("B", "X", false),
        ];
        let groups = aggregate_by(&records, |r| r.owner.clone());
        let total: u64 = groups.iter().map(|(_, g)| g.contacts).sum();
        assert_eq!(total, records.len() as u64);
    }

    #[test]
    fn enumeration_follows_first_occurrence() {
        let records = vec![
            contact("B", "X", false),
            contact("A", "Y", false),
            contact("B", "Z", false),
        ];
        let groups = aggregate_by(&records, |r| r.owner.clone());
        let keys: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["B", "A"]);
    }

    #[test]
    fn rate_is_zero_without_contacts_and_bounded_otherwise() {
        let empty = GroupStats::default();
        assert_eq!(empty.registration_rate(), 0.0);

        let records = vec![contact("A", "X", true), contact("A", "X", false)];
        let groups = aggregate_by(&records, |r| r.origin.clone());
        let rate = groups[0].1.registration_rate();
        assert!((0.0..=1.0).contains(&rate));
        assert_eq!(rate, 0.5);
    }

    #[test]
    fn best_origin_for_single_owner() {
        // owner=A: origin X converts 1/1, origin Y converts 0/1.
        let records = vec![
            contact("A", "X", true),
            contact("A", "Y", false),
            contact("B", "X", true),
        ];
        let only_a: Vec<ContactRecord> =
            records.iter().filter(|r| r.owner == "A").cloned().collect();
        assert_eq!(only_a.len(), 2);

        let groups = aggregate_by(&only_a, |r| r.origin.clone());
        let (origin, stats) = best_group(&groups).unwrap();
        assert_eq!(origin, "X");
        assert_eq!(stats.registration_rate(), 1.0);
    }

    #[test]
    fn best_group_tie_keeps_first_encountered() {
        let records = vec![
            contact("A", "X", true),
            contact("A", "Y", true),
        ];
        let groups = aggregate_by(&records, |r| r.origin.clone());
        let (origin, _) = best_group(&groups).unwrap();
        assert_eq!(origin, "X");
        assert!(best_group::<String>(&[]).is_none());
    }

    #[test]
    fn kpis_pass_through_attainment() {
        let mut attainment = OverallAttainment::default();
        attainment.contacts.achieved = 200.0;
        attainment.registrations.achieved = 30.0;
        attainment.overall_score = 0.87;
        let kpis = general_kpis(&attainment);
        assert_eq!(kpis.contacts, 200.0);
        assert_eq!(kpis.registration_rate_pct, 15.0);
        assert_eq!(kpis.overall_score_pct, 87.0);

        // Zero contacts must not produce NaN.
        let kpis = general_kpis(&OverallAttainment::default());
        assert_eq!(kpis.registration_rate_pct, 0.0);
    }

    fn partner(status: &str, station: &str, adv: f64, region: Option<&str>) -> PartnerRecord {
        PartnerRecord {
            store_id: String::new(),
            name: String::new(),
            lat: 0.0,
            lon: 0.0,
            radius: 0.0,
            status: status.to_string(),
            delivery_station: station.to_string(),
            initiative: None,
            jurisdiction_type: None,
            supply_run: None,
            hcp_rate_card: None,
            adv,
            eligible_packages: 0.0,
            overlapping_count: 0.0,
            popup: String::new(),
            metrics: None,
            overlaps: Vec::new(),
            region: region.map(str::to_string),
        }
    }

    #[test]
    fn performance_means_cover_active_only() {
        let mut active = partner("Active", "DSP2", 50.0, None);
        active.metrics = Some(MetricsSnapshot {
            dispatched_packages: 100.0,
            delivered_packages: 98.0,
            dea: 0.9,
            ..MetricsSnapshot::default()
        });
        let mut onboarding = partner("Onboarding", "DSP2", 10.0, None);
        onboarding.metrics = Some(MetricsSnapshot {
            dispatched_packages: 40.0,
            delivered_packages: 39.0,
            dea: 0.1,
            ..MetricsSnapshot::default()
        });
        let stats = performance_stats(&[active, onboarding]);
        assert_eq!(stats.active_partners, 1);
        assert_eq!(stats.avg_adv, 50.0);
        // Package totals include non-active partners.
        assert_eq!(stats.dispatched_packages, 140.0);
        assert_eq!(stats.delivered_packages, 137.0);
        assert_eq!(stats.dea, 0.9);
    }

    fn region_polygon(name: &str, station: &str, expected: u64) -> RegionPolygon {
        RegionPolygon {
            name: name.to_string(),
            delivery_station: station.to_string(),
            expected_partners: expected,
            color: None,
            geometry: geo::MultiPolygon(vec![]),
        }
    }

    #[test]
    fn region_attainment_and_priority() {
        let partners = vec![
            partner("Active", "DSP2", 0.0, Some("R1")),
            partner("BG Checks", "DSP2", 0.0, Some("R1")),
            partner("Active", "DSP2", 0.0, Some("R2")),
        ];
        let polys = [
            region_polygon("R1", "DSP2", 4),
            region_polygon("R2", "DSP2", 4),
            region_polygon("R3", "DSP2", 0),
        ];
        let refs: Vec<&RegionPolygon> = polys.iter().collect();
        let rows = region_stats(&partners, &refs);

        assert_eq!(rows[0].attainment, 0.5);
        assert_eq!(rows[1].attainment, 0.25);
        // Zero expected never divides.
        assert_eq!(rows[2].attainment, 0.0);

        // Worst attainment gets priority 1 within the station.
        let by_name: HashMap<&str, usize> =
            rows.iter().map(|r| (r.region.as_str(), r.priority)).collect();
        assert_eq!(by_name["R3"], 1);
        assert_eq!(by_name["R2"], 2);
        assert_eq!(by_name["R1"], 3);
    }

    #[test]
    fn route_spr_and_cpp() {
        let mut a = partner("Active", "DSP2", 0.0, None);
        a.supply_run = Some("SR-1".to_string());
        a.metrics = Some(MetricsSnapshot {
            dispatched_packages: 500.0,
            working_days: 5.0,
            ..MetricsSnapshot::default()
        });
        let mut b = partner("Onboarding", "DSP2", 0.0, None);
        b.supply_run = Some("SR-1".to_string());
        b.metrics = Some(MetricsSnapshot {
            dispatched_packages: 100.0,
            working_days: 4.0,
            ..MetricsSnapshot::default()
        });

        let routes = route_stats(&[a, b]);
        assert_eq!(routes.len(), 1);
        let r = &routes[0];
        assert_eq!(r.spr, 120.0); // 600 packages over max(5, 4) days
        assert_eq!(r.cpp, 590.0 * 5.0 / 600.0); // DSP2 run cost
        assert_eq!(r.active, 1);
        assert_eq!(r.onboarding, 1);
    }

    #[test]
    fn route_cpp_zero_when_no_packages() {
        let mut a = partner("Active", "DXX1", 0.0, None);
        a.supply_run = Some("SR-9".to_string());
        let routes = route_stats(&[a]);
        assert_eq!(routes[0].cpp, 0.0);
        // Unknown station uses the default run cost (visible through SPR math
        // only when packages exist, so just check it does not panic).
        assert_eq!(routes[0].spr, 0.0);
    }

    #[test]
    fn comparison_marks_better_and_worse() {
        let mut p = partner("Active", "DSP2", 0.0, None);
        p.metrics = Some(MetricsSnapshot {
            adv: 40.0,
            capped_days: 10.0,
            ..MetricsSnapshot::default()
        });
        p.overlaps = vec![OverlapSnapshot {
            overlap_id: 1,
            store_id: "S9".to_string(),
            metrics: MetricsSnapshot {
                adv: 50.0,
                capped_days: 20.0,
                ..MetricsSnapshot::default()
            },
        }];

        let rows = comparison_rows(&p);
        let adv = rows.iter().find(|r| r.metric == "ADV").unwrap();
        assert_eq!(adv.overlaps[0].verdict, Verdict::Better);
        // capped days: lower is better, overlap is higher.
        let capped = rows.iter().find(|r| r.metric == "Capped Days (%)").unwrap();
        assert_eq!(capped.overlaps[0].verdict, Verdict::Worse);
    }

    #[test]
    fn comparison_without_snapshot_is_even() {
        let mut p = partner("Active", "DSP2", 0.0, None);
        p.overlaps = vec![OverlapSnapshot::default()];
        let rows = comparison_rows(&p);
        assert!(rows.iter().all(|r| r.primary.is_none()));
        assert!(rows
            .iter()
            .all(|r| r.overlaps.iter().all(|c| c.verdict == Verdict::Even)));
    }
}
