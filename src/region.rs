// Partner-to-region association.
//
// Linear scan over polygons per partner; fine at the current scale (hundreds
// of partners, dozens of polygons).
use geo::{Contains, Point};
use tracing::info;

use crate::types::{PartnerRecord, RegionPolygon};

/// Region label for partners no cluster polygon contains.
pub const UNASSIGNED_REGION: &str = "Unassigned";

/// Resolve every partner's region: the first polygon (in input order) whose
/// geometry contains the partner's location wins, otherwise the unassigned
/// sentinel. Recomputes from scratch, so re-running on the same inputs is
/// idempotent.
pub fn associate_regions(partners: &mut [PartnerRecord], polygons: &[RegionPolygon]) -> usize {
    let mut associated = 0usize;
    for partner in partners.iter_mut() {
        let point = Point::new(partner.lon, partner.lat);
        partner.region = polygons
            .iter()
            .find(|poly| poly.geometry.contains(&point))
            .map(|poly| {
                associated += 1;
                poly.name.clone()
            })
            .or_else(|| Some(UNASSIGNED_REGION.to_string()));
    }
    info!(
        "associated {} of {} partners to cluster polygons",
        associated,
        partners.len()
    );
    associated
}
