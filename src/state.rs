// Application state: everything loaded at startup plus the current filter
// selections. Built once and passed by reference into every handler; raw
// records are never mutated by filtering, and each view is recomputed in
// full from the raw data on every event.
use crate::filter::{self, MapFilters, ScorecardFilters};
use crate::types::{
    ContactRecord, JurisdictionArea, OwnerSummary, PartnerRecord, Period, RegionPolygon,
    ScorecardDocument,
};
use crate::util::period_working_days;

/// The map-view datasets: partners plus the two polygon layers.
#[derive(Debug, Clone)]
pub struct MapData {
    pub partners: Vec<PartnerRecord>,
    pub period: Period,
    pub regions: Vec<RegionPolygon>,
    pub jurisdictions: Vec<JurisdictionArea>,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub scorecard: ScorecardDocument,
    pub map: MapData,
    pub map_filters: MapFilters,
    pub scorecard_filters: ScorecardFilters,
}

impl AppState {
    pub fn new(scorecard: ScorecardDocument, map: MapData) -> Self {
        AppState {
            scorecard,
            map,
            map_filters: MapFilters::default(),
            scorecard_filters: ScorecardFilters::default(),
        }
    }

    pub fn filtered_partners(&self) -> Vec<PartnerRecord> {
        filter::filter_partners(&self.map.partners, &self.map_filters)
    }

    pub fn filtered_contacts(&self) -> Vec<ContactRecord> {
        filter::filter_contacts(&self.scorecard.summary, &self.scorecard_filters)
    }

    pub fn filtered_owner_summaries(&self) -> Vec<OwnerSummary> {
        filter::filter_owner_summaries(&self.scorecard.per_owner, &self.scorecard_filters.owner)
    }

    /// Region polygons surviving the station filter, in input order.
    pub fn visible_regions(&self) -> Vec<&RegionPolygon> {
        filter::filter_polygons(&self.map.regions, &self.map_filters.stations)
    }

    pub fn visible_jurisdictions(&self) -> Vec<&JurisdictionArea> {
        filter::filter_jurisdictions(&self.map.jurisdictions, &self.map_filters.stations)
    }

    /// Working days covered by the map data period.
    pub fn period_days(&self) -> f64 {
        period_working_days(
            self.map.period.start.as_deref(),
            self.map.period.end.as_deref(),
        )
    }

    pub fn reset_filters(&mut self) {
        self.map_filters = MapFilters::default();
        self.scorecard_filters = ScorecardFilters::default();
    }

    /// Distinct owner names from the raw summary, sorted, for filter prompts.
    pub fn owner_choices(&self) -> Vec<String> {
        let mut owners: Vec<String> = self
            .scorecard
            .summary
            .iter()
            .map(|r| r.owner.clone())
            .collect();
        owners.sort();
        owners.dedup();
        owners
    }

    pub fn origin_choices(&self) -> Vec<String> {
        let mut origins: Vec<String> = self
            .scorecard
            .summary
            .iter()
            .map(|r| r.origin.clone())
            .collect();
        origins.sort();
        origins.dedup();
        origins
    }

    pub fn station_choices(&self) -> Vec<String> {
        let mut stations: Vec<String> = self
            .map
            .partners
            .iter()
            .map(|p| p.delivery_station.clone())
            .filter(|s| !s.is_empty())
            .collect();
        stations.sort();
        stations.dedup();
        stations
    }

    pub fn initiative_choices(&self) -> Vec<String> {
        let mut initiatives: Vec<String> = self
            .map
            .partners
            .iter()
            .filter_map(|p| p.initiative.clone())
            .filter(|s| !s.is_empty())
            .collect();
        initiatives.sort();
        initiatives.dedup();
        initiatives
    }
}
