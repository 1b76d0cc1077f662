//! Vector field assembly from per-point (speed, direction) samples.

use chrono::{DateTime, Utc};

use overlay_common::{
    wind::wind_vector, BandHeader, FieldBand, OverlayError, SamplingGrid, WindField, WindQuantity,
};

/// Build the two-band field from samples aligned with `grid` (row-major,
/// one pair per point). Both bands share the grid's geographic header; only
/// the quantity identifier and the data differ.
pub fn build_wind_field(
    grid: &SamplingGrid,
    samples: &[(f64, f64)],
    ref_time: DateTime<Utc>,
) -> Result<WindField, OverlayError> {
    if samples.len() != grid.len() {
        return Err(OverlayError::FieldMismatch(format!(
            "{} samples for a {}x{} grid",
            samples.len(),
            grid.nx(),
            grid.ny()
        )));
    }

    let mut u_data = Vec::with_capacity(samples.len());
    let mut v_data = Vec::with_capacity(samples.len());
    for &(speed, direction) in samples {
        let (u, v) = wind_vector(speed, direction);
        u_data.push(u);
        v_data.push(v);
    }

    let u_header = BandHeader::new(
        WindQuantity::U,
        grid.bbox(),
        grid.nx(),
        grid.ny(),
        grid.dx(),
        grid.dy(),
        ref_time,
    );
    let v_header = BandHeader::new(
        WindQuantity::V,
        grid.bbox(),
        grid.nx(),
        grid.ny(),
        grid.dx(),
        grid.dy(),
        ref_time,
    );

    WindField::new(
        FieldBand {
            header: u_header,
            data: u_data,
        },
        FieldBand {
            header: v_header,
            data: v_data,
        },
    )
}
