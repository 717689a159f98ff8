// Initial data load.
//
// The four documents are fetched concurrently but nothing downstream runs
// until all of them arrived and parsed: partial results are never exposed.
// Any failure here is fatal for the session.
use anyhow::{bail, Context, Result};
use geo::MultiPolygon;
use geojson::GeoJson;
use tracing::{info, warn};

use crate::state::MapData;
use crate::types::{JurisdictionArea, MapDocument, RegionPolygon, ScorecardDocument};

/// Where the four input documents live. Each entry is a filesystem path or an
/// http(s) URL.
#[derive(Debug, Clone)]
pub struct DataSources {
    pub scorecard: String,
    pub map: String,
    pub clusters: String,
    pub jurisdictions: String,
}

/// Counts reported after a successful load.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadReport {
    pub partners: usize,
    pub contacts: usize,
    pub daily_days: usize,
    pub regions: usize,
    pub jurisdictions: usize,
    pub skipped_features: usize,
}

/// Fetch and parse everything. Returns only when all four documents are in;
/// the `try_join!` acts as the load barrier.
pub async fn load_all(sources: &DataSources) -> Result<(ScorecardDocument, MapData, LoadReport)> {
    let (scorecard_text, map_text, clusters_text, jurisdiction_text) = tokio::try_join!(
        fetch_text(&sources.scorecard),
        fetch_text(&sources.map),
        fetch_text(&sources.clusters),
        fetch_text(&sources.jurisdictions),
    )?;

    let scorecard: ScorecardDocument = serde_json::from_str(&scorecard_text)
        .with_context(|| format!("malformed scorecard document from {}", sources.scorecard))?;
    let map_doc: MapDocument = serde_json::from_str(&map_text)
        .with_context(|| format!("malformed map document from {}", sources.map))?;
    let (regions, skipped_regions) = parse_regions(&clusters_text)
        .with_context(|| format!("malformed clusters GeoJSON from {}", sources.clusters))?;
    let (jurisdictions, skipped_jurisdictions) = parse_jurisdictions(&jurisdiction_text)
        .with_context(|| {
            format!(
                "malformed jurisdiction GeoJSON from {}",
                sources.jurisdictions
            )
        })?;

    let report = LoadReport {
        partners: map_doc.partners.len(),
        contacts: scorecard.summary.len(),
        daily_days: scorecard.daily.len(),
        regions: regions.len(),
        jurisdictions: jurisdictions.len(),
        skipped_features: skipped_regions + skipped_jurisdictions,
    };
    info!(
        "loaded {} partners, {} contact rows, {} daily rows, {} regions, {} jurisdictions",
        report.partners, report.contacts, report.daily_days, report.regions, report.jurisdictions
    );

    let map_data = MapData {
        partners: map_doc.partners,
        period: map_doc.period,
        regions,
        jurisdictions,
    };
    Ok((scorecard, map_data, report))
}

async fn fetch_text(source: &str) -> Result<String> {
    if source.starts_with("http://") || source.starts_with("https://") {
        let response = reqwest::get(source)
            .await
            .with_context(|| format!("request to {source} failed"))?
            .error_for_status()
            .with_context(|| format!("request to {source} was rejected"))?;
        response
            .text()
            .await
            .with_context(|| format!("failed to read response body from {source}"))
    } else {
        tokio::fs::read_to_string(source)
            .await
            .with_context(|| format!("failed to read {source}"))
    }
}

fn parse_regions(text: &str) -> Result<(Vec<RegionPolygon>, usize)> {
    let mut regions = Vec::new();
    let mut skipped = 0usize;
    for (geometry, properties) in feature_parts(text)? {
        let name = prop_string(&properties, "cluster");
        let (Some(geometry), Some(name)) = (geometry, name) else {
            skipped += 1;
            warn!("skipping cluster feature without usable geometry or name");
            continue;
        };
        regions.push(RegionPolygon {
            name,
            delivery_station: prop_string(&properties, "delivery_station").unwrap_or_default(),
            expected_partners: properties
                .get("num_points")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0),
            color: prop_string(&properties, "cor"),
            geometry,
        });
    }
    Ok((regions, skipped))
}

fn parse_jurisdictions(text: &str) -> Result<(Vec<JurisdictionArea>, usize)> {
    let mut areas = Vec::new();
    let mut skipped = 0usize;
    for (geometry, properties) in feature_parts(text)? {
        let station = prop_string(&properties, "delivery_station");
        let (Some(geometry), Some(station)) = (geometry, station) else {
            skipped += 1;
            warn!("skipping jurisdiction feature without usable geometry or station");
            continue;
        };
        areas.push(JurisdictionArea {
            delivery_station: station,
            color: prop_string(&properties, "cor"),
            geometry,
        });
    }
    Ok((areas, skipped))
}

type FeatureParts = (Option<MultiPolygon<f64>>, geojson::JsonObject);

/// Split a FeatureCollection into (geometry, properties) pairs, preserving
/// feature order; the association pass depends on it.
fn feature_parts(text: &str) -> Result<Vec<FeatureParts>> {
    let geojson: GeoJson = text.parse().context("invalid GeoJSON")?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        bail!("expected a GeoJSON FeatureCollection");
    };
    Ok(collection
        .features
        .into_iter()
        .map(|feature| {
            let geometry = feature.geometry.and_then(to_multipolygon);
            let properties = feature.properties.unwrap_or_default();
            (geometry, properties)
        })
        .collect())
}

/// Accept both Polygon and MultiPolygon features; anything else is skipped.
fn to_multipolygon(geometry: geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geometry: geo::Geometry<f64> = geometry.try_into().ok()?;
    match geometry {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

fn prop_string(properties: &geojson::JsonObject, key: &str) -> Option<String> {
    properties
        .get(key)
        .and_then(serde_json::Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTERS: &str = r##"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {"cluster": "R1", "delivery_station": "DSP2", "num_points": 12, "cor": "#ff0000"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"delivery_station": "DSP2"},
                "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]}
            },
            {
                "type": "Feature",
                "properties": {"cluster": "R2", "delivery_station": "DSP3"},
                "geometry": {"type": "Point", "coordinates": [5, 5]}
            }
        ]
    }"##;

    #[test]
    fn parses_polygon_features_and_skips_bad_ones() {
        let (regions, skipped) = parse_regions(CLUSTERS).unwrap();
        assert_eq!(regions.len(), 1);
        // One feature lacks a cluster name, one is not a polygon.
        assert_eq!(skipped, 2);
        let r = &regions[0];
        assert_eq!(r.name, "R1");
        assert_eq!(r.delivery_station, "DSP2");
        assert_eq!(r.expected_partners, 12);
        assert_eq!(r.color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn rejects_non_feature_collections() {
        let err = parse_regions(r#"{"type": "Point", "coordinates": [0, 0]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn missing_optional_properties_default() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"cluster": "R9"},
                "geometry": {"type": "MultiPolygon", "coordinates": [[[[0,0],[2,0],[2,2],[0,2],[0,0]]]]}
            }]
        }"#;
        let (regions, skipped) = parse_regions(text).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(regions[0].expected_partners, 0);
        assert_eq!(regions[0].delivery_station, "");
        assert!(regions[0].color.is_none());
    }

    #[test]
    fn jurisdictions_require_station() {
        let text = r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"delivery_station": "DSP5"},
                    "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}
                },
                {
                    "type": "Feature",
                    "properties": {},
                    "geometry": {"type": "Polygon", "coordinates": [[[0,0],[2,0],[2,2],[0,2],[0,0]]]}
                }
            ]
        }"#;
        let (areas, skipped) = parse_jurisdictions(text).unwrap();
        assert_eq!(areas.len(), 1);
        assert_eq!(skipped, 1);
        assert_eq!(areas[0].delivery_station, "DSP5");
    }
}
