//! Translates aggregated severities into positioned, sized markers.

use tracing::debug;

use vigilance::{
    aggregate, phenomenon_glyph, severity_color, HazardFilters, HazardRecord, IconScaler,
    RegionShape, SeverityMap,
};

use crate::binding::SeverityMarker;

/// Reduce fetched records to per-region severities, applying the active
/// filters first so the aggregate reflects the selection.
pub fn severity_from(records: Vec<HazardRecord>, filters: &HazardFilters) -> SeverityMap {
    if filters.is_empty() {
        aggregate(records)
    } else {
        aggregate(filters.apply(&records))
    }
}

/// One marker per region that both carries an alert and has a known
/// boundary shape. Regions without geometry are skipped with a debug log;
/// the feed sometimes carries overseas codes the boundary file lacks.
pub fn build_markers(severity: &SeverityMap, shapes: &[RegionShape], zoom: f64) -> Vec<SeverityMarker> {
    let scaler = IconScaler::new();
    let mut markers = Vec::new();

    for shape in shapes {
        let Some(record) = severity.dominant(&shape.code) else {
            continue;
        };
        markers.push(SeverityMarker {
            region: shape.code.clone(),
            glyph: phenomenon_glyph(record.phenomenon_id).to_string(),
            color: severity_color(record.color_id).to_string(),
            center: shape.center(),
            size_px: scaler.glyph_size(shape.diagonal_m(), zoom),
        });
    }

    let missing = severity.len().saturating_sub(markers.len());
    if missing > 0 {
        debug!(missing, "Alerted regions without boundary geometry");
    }
    markers
}
