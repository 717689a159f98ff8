// Filter predicates over the loaded datasets.
//
// Everything in here is a pure function of (record, criteria): no side
// effects, input order preserved, and a record can only shrink out of the
// result set, never be reordered. Missing fields never match a specific
// filter value but always match "all".
use std::collections::BTreeSet;

use crate::types::{ContactRecord, JurisdictionArea, OwnerSummary, PartnerRecord, RegionPolygon};

/// Single-valued filter dimension: either everything or one exact value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Parse a user-facing choice; empty input and "all" mean no filtering.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            Selection::All
        } else {
            Selection::Only(trimmed.to_string())
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

/// Station filter is a set membership test, not an equality test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StationSelection {
    #[default]
    All,
    Stations(BTreeSet<String>),
}

impl StationSelection {
    /// Parse a comma-separated station list; empty or "all" selects all.
    pub fn parse(input: &str) -> Self {
        let stations: BTreeSet<String> = input
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if stations.is_empty() || stations.iter().any(|s| s.eq_ignore_ascii_case("all")) {
            StationSelection::All
        } else {
            StationSelection::Stations(stations)
        }
    }

    pub fn matches(&self, station: &str) -> bool {
        match self {
            StationSelection::All => true,
            StationSelection::Stations(set) => set.contains(station),
        }
    }
}

/// Filter state for the map view. All dimensions AND together.
#[derive(Debug, Clone, Default)]
pub struct MapFilters {
    pub status: Selection,
    pub stations: StationSelection,
    pub initiative: Selection,
    pub jurisdiction: Selection,
}

impl MapFilters {
    pub fn matches(&self, p: &PartnerRecord) -> bool {
        self.status.matches(Some(&p.status))
            && self.stations.matches(&p.delivery_station)
            && self.initiative.matches(p.initiative.as_deref())
            && self.jurisdiction.matches(p.jurisdiction_type.as_deref())
    }
}

/// Filter state for the scorecard view.
#[derive(Debug, Clone, Default)]
pub struct ScorecardFilters {
    pub owner: Selection,
    pub origin: Selection,
}

impl ScorecardFilters {
    pub fn matches(&self, r: &ContactRecord) -> bool {
        self.owner.matches(Some(&r.owner)) && self.origin.matches(Some(&r.origin))
    }
}

pub fn filter_partners(partners: &[PartnerRecord], filters: &MapFilters) -> Vec<PartnerRecord> {
    partners
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect()
}

pub fn filter_contacts(
    records: &[ContactRecord],
    filters: &ScorecardFilters,
) -> Vec<ContactRecord> {
    records
        .iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect()
}

/// Owner summaries only carry the owner dimension.
pub fn filter_owner_summaries(summaries: &[OwnerSummary], owner: &Selection) -> Vec<OwnerSummary> {
    summaries
        .iter()
        .filter(|s| owner.matches(Some(&s.owner)))
        .cloned()
        .collect()
}

pub fn filter_polygons<'a>(
    polygons: &'a [RegionPolygon],
    stations: &StationSelection,
) -> Vec<&'a RegionPolygon> {
    polygons
        .iter()
        .filter(|p| stations.matches(&p.delivery_station))
        .collect()
}

pub fn filter_jurisdictions<'a>(
    areas: &'a [JurisdictionArea],
    stations: &StationSelection,
) -> Vec<&'a JurisdictionArea> {
    areas
        .iter()
        .filter(|a| stations.matches(&a.delivery_station))
        .collect()
}

/// Comparison operator for the numeric highlight criteria.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumOp {
    #[default]
    Gt,
    Lt,
    Eq,
}

impl NumOp {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "lt" | "<" => NumOp::Lt,
            "eq" | "=" => NumOp::Eq,
            _ => NumOp::Gt,
        }
    }
}

/// Store-highlight criteria: numeric thresholds on eligible packages, ADV and
/// overlap count plus an optional status. A threshold value of zero disables
/// that criterion (except the `eq` overlap test, which stays meaningful at 0).
#[derive(Debug, Clone, Default)]
pub struct HighlightCriteria {
    pub eligible_op: NumOp,
    pub eligible_val: f64,
    pub adv_op: NumOp,
    pub adv_val: f64,
    pub overlapping_op: NumOp,
    pub overlapping_val: f64,
    pub status: Selection,
}

impl HighlightCriteria {
    pub fn matches(&self, p: &PartnerRecord) -> bool {
        let status_ok = self.status.matches(Some(&p.status));
        let eligible_ok = self.eligible_val <= 0.0
            || match self.eligible_op {
                NumOp::Lt => p.eligible_packages < self.eligible_val,
                _ => p.eligible_packages > self.eligible_val,
            };
        let adv_ok = self.adv_val <= 0.0
            || match self.adv_op {
                NumOp::Lt => p.adv < self.adv_val,
                _ => p.adv > self.adv_val,
            };
        let overlapping_ok = if self.overlapping_val > 0.0 || self.overlapping_op == NumOp::Eq {
            match self.overlapping_op {
                NumOp::Gt => p.overlapping_count > self.overlapping_val,
                NumOp::Lt => p.overlapping_count < self.overlapping_val,
                NumOp::Eq => (p.overlapping_count - self.overlapping_val).abs() < 0.001,
            }
        } else {
            true
        };
        status_ok && eligible_ok && adv_ok && overlapping_ok
    }
}

pub fn highlight_partners<'a>(
    partners: &'a [PartnerRecord],
    criteria: &HighlightCriteria,
) -> Vec<&'a PartnerRecord> {
    partners.iter().filter(|p| criteria.matches(p)).collect()
}

/// Exact store-id lookup (case-insensitive), used to resolve route endpoints.
/// Unlike `find_partner`, name substrings do not match; a route needs an
/// unambiguous store.
pub fn partner_by_id<'a>(partners: &'a [PartnerRecord], id: &str) -> Option<&'a PartnerRecord> {
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    partners.iter().find(|p| p.store_id.eq_ignore_ascii_case(id))
}

/// Find a partner by exact store id (case-insensitive) or name substring.
/// Returns `None` on no match; "not found" is a notice, not an error.
pub fn find_partner<'a>(partners: &'a [PartnerRecord], term: &str) -> Option<&'a PartnerRecord> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return None;
    }
    partners.iter().find(|p| {
        p.store_id.to_lowercase() == term || p.name.to_lowercase().contains(&term)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn partner(id: &str, status: &str, station: &str, initiative: Option<&str>) -> PartnerRecord {
        PartnerRecord {
            store_id: id.to_string(),
            name: format!("Store {id}"),
            lat: 0.0,
            lon: 0.0,
            radius: 0.0,
            status: status.to_string(),
            delivery_station: station.to_string(),
            initiative: initiative.map(str::to_string),
            jurisdiction_type: None,
            supply_run: None,
            hcp_rate_card: None,
            adv: 0.0,
            eligible_packages: 0.0,
            overlapping_count: 0.0,
            popup: String::new(),
            metrics: None,
            overlaps: Vec::new(),
            region: None,
        }
    }

    fn sample() -> Vec<PartnerRecord> {
        vec![
            partner("S1", "Active", "DSP2", Some("HCP Host Partner")),
            partner("S2", "Onboarding", "DSP3", None),
            partner("S3", "Active", "DSP2", None),
        ]
    }

    #[test]
    fn all_filters_return_input_unchanged() {
        let partners = sample();
        let out = filter_partners(&partners, &MapFilters::default());
        let ids: Vec<&str> = out.iter().map(|p| p.store_id.as_str()).collect();
        assert_eq!(ids, ["S1", "S2", "S3"]);
    }

    #[test]
    fn filtered_output_is_an_ordered_subset() {
        let partners = sample();
        let filters = MapFilters {
            status: Selection::Only("Active".to_string()),
            ..MapFilters::default()
        };
        let out = filter_partners(&partners, &filters);
        let ids: Vec<&str> = out.iter().map(|p| p.store_id.as_str()).collect();
        assert_eq!(ids, ["S1", "S3"]);
    }

    #[test]
    fn station_filter_is_set_membership() {
        let partners = sample();
        let filters = MapFilters {
            stations: StationSelection::parse("DSP2, DSP3"),
            ..MapFilters::default()
        };
        assert_eq!(filter_partners(&partners, &filters).len(), 3);

        let filters = MapFilters {
            stations: StationSelection::parse("DSP3"),
            ..MapFilters::default()
        };
        let out = filter_partners(&partners, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].store_id, "S2");
    }

    #[test]
    fn missing_field_matches_all_but_not_specific_values() {
        let partners = sample();
        let filters = MapFilters {
            initiative: Selection::Only("HCP Host Partner".to_string()),
            ..MapFilters::default()
        };
        let out = filter_partners(&partners, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].store_id, "S1");
    }

    #[test]
    fn selection_parse_handles_all_spellings() {
        assert_eq!(Selection::parse("  "), Selection::All);
        assert_eq!(Selection::parse("ALL"), Selection::All);
        assert_eq!(
            Selection::parse(" Active "),
            Selection::Only("Active".to_string())
        );
        assert_eq!(StationSelection::parse("DSP2, all"), StationSelection::All);
    }

    #[test]
    fn scorecard_filter_by_owner() {
        let mk = |owner: &str, origin: &str, reg: Option<&str>| ContactRecord {
            owner: owner.to_string(),
            origin: origin.to_string(),
            registration_date: reg.map(str::to_string),
            conversion_date: None,
            extra: serde_json::Map::new(),
        };
        let records = vec![
            mk("A", "X", Some("2025-01-01")),
            mk("A", "Y", None),
            mk("B", "X", Some("2025-01-02")),
        ];
        let filters = ScorecardFilters {
            owner: Selection::Only("A".to_string()),
            origin: Selection::All,
        };
        let out = filter_contacts(&records, &filters);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|r| r.owner == "A"));
    }

    #[test]
    fn zero_thresholds_disable_highlight_criteria() {
        let partners = sample();
        let criteria = HighlightCriteria::default();
        assert_eq!(highlight_partners(&partners, &criteria).len(), 3);
    }

    #[test]
    fn highlight_numeric_and_status_tests_combine() {
        let mut partners = sample();
        partners[0].eligible_packages = 120.0;
        partners[2].eligible_packages = 40.0;
        let criteria = HighlightCriteria {
            eligible_op: NumOp::Gt,
            eligible_val: 100.0,
            status: Selection::Only("Active".to_string()),
            ..HighlightCriteria::default()
        };
        let out = highlight_partners(&partners, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].store_id, "S1");
    }

    #[test]
    fn overlap_eq_uses_tolerance() {
        let mut partners = sample();
        partners[1].overlapping_count = 2.0;
        let criteria = HighlightCriteria {
            overlapping_op: NumOp::Eq,
            overlapping_val: 2.0,
            ..HighlightCriteria::default()
        };
        let out = highlight_partners(&partners, &criteria);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].store_id, "S2");
    }

    #[test]
    fn route_endpoint_lookup_needs_an_exact_id() {
        let partners = sample();
        assert_eq!(
            partner_by_id(&partners, " s2 ").map(|p| p.store_id.as_str()),
            Some("S2")
        );
        // Name fragments and unknown ids resolve to nothing; the caller
        // reports a notice instead of routing.
        assert!(partner_by_id(&partners, "Store S2").is_none());
        assert!(partner_by_id(&partners, "S9").is_none());
        assert!(partner_by_id(&partners, "").is_none());
    }

    #[test]
    fn search_matches_id_then_name() {
        let partners = sample();
        assert_eq!(find_partner(&partners, "s2").map(|p| p.store_id.as_str()), Some("S2"));
        assert_eq!(
            find_partner(&partners, "store s3").map(|p| p.store_id.as_str()),
            Some("S3")
        );
        assert!(find_partner(&partners, "nope").is_none());
        assert!(find_partner(&partners, "  ").is_none());
    }
}
