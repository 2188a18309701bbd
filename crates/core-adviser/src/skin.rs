//! Conductor loss models backing the adviser's scoring filters.
//!
//! Deliberately lightweight: the adviser only needs a monotonic, physically
//! sensible ordering between candidate wires at the operating point, not a
//! loss prediction. The full winding-loss models live with the physical
//! models that read the finished layout.

use core_model::{ModelError, Wire, WireType};

/// Copper resistivity at 20 °C, Ω·m.
pub const COPPER_RESISTIVITY_20C: f64 = 1.7241e-8;
/// Copper temperature coefficient, 1/K.
pub const COPPER_TEMPERATURE_COEFFICIENT: f64 = 0.00393;
pub const VACUUM_PERMEABILITY: f64 = 4.0e-7 * std::f64::consts::PI;

pub fn copper_resistivity(temperature: f64) -> f64 {
    COPPER_RESISTIVITY_20C * (1.0 + COPPER_TEMPERATURE_COEFFICIENT * (temperature - 20.0))
}

/// Skin depth in copper at `frequency` Hz and `temperature` °C.
pub fn skin_depth(frequency: f64, temperature: f64) -> f64 {
    (copper_resistivity(temperature) / (std::f64::consts::PI * frequency * VACUUM_PERMEABILITY))
        .sqrt()
}

/// DC resistance per metre of one parallel.
pub fn dc_resistance_per_metre(wire: &Wire, temperature: f64) -> Result<f64, ModelError> {
    Ok(copper_resistivity(temperature) / wire.conducting_area_value()?)
}

/// AC-over-DC resistance factor at the operating frequency.
///
/// Round conductors conduct in a skin-depth annulus once the radius exceeds
/// the depth; litz inherits the strand behaviour; flat conductors crowd into
/// two skin depths of their thickness.
pub fn ac_resistance_factor(
    wire: &Wire,
    frequency: f64,
    temperature: f64,
) -> Result<f64, ModelError> {
    let depth = skin_depth(frequency, temperature);
    match wire.wire_type {
        WireType::Round => {
            let radius = wire
                .conducting_diameter
                .and_then(|d| d.resolve())
                .ok_or(ModelError::MissingWireDimension {
                    wire: wire.display_name().to_string(),
                    field: "conductingDiameter",
                })?
                / 2.0;
            if radius <= depth {
                return Ok(1.0);
            }
            let full = radius * radius;
            let conducting = full - (radius - depth) * (radius - depth);
            Ok(full / conducting)
        }
        WireType::Litz => ac_resistance_factor(wire.resolve_strand()?, frequency, temperature),
        WireType::Rectangular | WireType::Foil | WireType::Planar => {
            let thickness = wire
                .conducting_width
                .and_then(|d| d.resolve())
                .or_else(|| wire.conducting_height.and_then(|d| d.resolve()))
                .ok_or(ModelError::MissingWireDimension {
                    wire: wire.display_name().to_string(),
                    field: "conductingWidth",
                })?;
            Ok((thickness / (2.0 * depth)).max(1.0))
        }
    }
}

/// Effective (AC) resistance per metre of the whole winding cross-section,
/// all parallels conducting.
pub fn effective_resistance_per_metre(
    wire: &Wire,
    number_parallels: u64,
    frequency: f64,
    temperature: f64,
) -> Result<f64, ModelError> {
    let dc = dc_resistance_per_metre(wire, temperature)?;
    let factor = ac_resistance_factor(wire, frequency, temperature)?;
    Ok(dc * factor / number_parallels.max(1) as f64)
}

/// Proximity-effect multiplier: grows with the square of the conductor size
/// in skin depths.
pub fn proximity_factor(wire: &Wire, frequency: f64, temperature: f64) -> Result<f64, ModelError> {
    let depth = skin_depth(frequency, temperature);
    let size = match wire.wire_type {
        WireType::Round => wire
            .conducting_diameter
            .and_then(|d| d.resolve())
            .ok_or(ModelError::MissingWireDimension {
                wire: wire.display_name().to_string(),
                field: "conductingDiameter",
            })?,
        WireType::Litz => wire
            .resolve_strand()?
            .conducting_diameter
            .and_then(|d| d.resolve())
            .unwrap_or(0.0),
        WireType::Rectangular | WireType::Foil | WireType::Planar => wire
            .conducting_width
            .and_then(|d| d.resolve())
            .or_else(|| wire.conducting_height.and_then(|d| d.resolve()))
            .unwrap_or(0.0),
    };
    let x = size / depth;
    Ok(1.0 + x * x / 24.0)
}

/// Ohmic loss per square metre of trace at the operating point, the planar
/// pipeline's ranking metric.
pub fn skin_loss_density(
    wire: &Wire,
    current_rms: f64,
    number_parallels: u64,
    frequency: f64,
    temperature: f64,
) -> Result<f64, ModelError> {
    let resistance = effective_resistance_per_metre(wire, number_parallels, frequency, temperature)?;
    let width = wire.maximum_outer_width()?;
    Ok(current_rms * current_rms * resistance / width.max(f64::MIN_POSITIVE))
}
