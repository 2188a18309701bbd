//! Wire descriptions.
//!
//! A wire is a tagged variant over round, litz, rectangular, foil and planar
//! constructions. It carries an *outer* bounding box (what the winder packs)
//! and a *conducting* bounding box (what carries current), with the
//! invariant conducting ≤ outer on every axis. Foil and planar wires are
//! elastic: the layout engine and the adviser resize them to the section
//! they land in before packing.

use serde::{Deserialize, Serialize};

use crate::coil::Section;
use crate::{CoordinateSystem, DimensionWithTolerance, ModelError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireType {
    #[serde(rename = "round")]
    Round,
    #[serde(rename = "litz")]
    Litz,
    #[serde(rename = "rectangular")]
    Rectangular,
    #[serde(rename = "foil")]
    Foil,
    #[serde(rename = "planar")]
    Planar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireStandard {
    #[serde(rename = "IEC 60317")]
    Iec60317,
    #[serde(rename = "NEMA MW 1000 C")]
    NemaMw1000C,
    #[serde(rename = "JIS C3202")]
    JisC3202,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsulationWireCoatingType {
    #[serde(rename = "bare")]
    Bare,
    #[serde(rename = "enamelled")]
    Enamelled,
    #[serde(rename = "served")]
    Served,
    #[serde(rename = "taped")]
    Taped,
    #[serde(rename = "insulated")]
    Insulated,
}

/// Solid insulation build of a wire. The adviser's solid-insulation filter
/// reads layer count, per-layer thickness and breakdown voltage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCoating {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub coating_type: Option<InsulationWireCoatingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_layers: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thickness: Option<DimensionWithTolerance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown_voltage: Option<f64>,
}

/// A wire given by value or referenced by catalogue name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireOrName {
    Wire(Wire),
    Name(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wire {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub wire_type: WireType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard: Option<WireStandard>,
    /// Strand count for litz; 1 otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_conductors: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conducting_diameter: Option<DimensionWithTolerance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_diameter: Option<DimensionWithTolerance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conducting_width: Option<DimensionWithTolerance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conducting_height: Option<DimensionWithTolerance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_width: Option<DimensionWithTolerance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outer_height: Option<DimensionWithTolerance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conducting_area: Option<DimensionWithTolerance>,
    /// Strand wire for litz constructions, by value or by catalogue name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strand: Option<Box<WireOrName>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coating: Option<WireCoating>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<String>,
}

impl Wire {
    fn bare(wire_type: WireType, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            wire_type,
            standard: None,
            number_conductors: None,
            conducting_diameter: None,
            outer_diameter: None,
            conducting_width: None,
            conducting_height: None,
            outer_width: None,
            outer_height: None,
            conducting_area: None,
            strand: None,
            coating: None,
            material: Some("copper".into()),
        }
    }

    pub fn round(name: impl Into<String>, conducting_diameter: f64, outer_diameter: f64) -> Self {
        let mut wire = Self::bare(WireType::Round, name);
        wire.number_conductors = Some(1);
        wire.conducting_diameter = Some(conducting_diameter.into());
        wire.outer_diameter = Some(outer_diameter.into());
        wire
    }

    pub fn litz(name: impl Into<String>, strand: Wire, number_strands: u64, outer_diameter: f64) -> Self {
        let mut wire = Self::bare(WireType::Litz, name);
        wire.number_conductors = Some(number_strands);
        wire.outer_diameter = Some(outer_diameter.into());
        wire.strand = Some(Box::new(WireOrName::Wire(strand)));
        wire
    }

    pub fn rectangular(
        name: impl Into<String>,
        conducting_width: f64,
        conducting_height: f64,
        outer_width: f64,
        outer_height: f64,
    ) -> Self {
        let mut wire = Self::bare(WireType::Rectangular, name);
        wire.number_conductors = Some(1);
        wire.conducting_width = Some(conducting_width.into());
        wire.conducting_height = Some(conducting_height.into());
        wire.outer_width = Some(outer_width.into());
        wire.outer_height = Some(outer_height.into());
        wire
    }

    pub fn foil(name: impl Into<String>, thickness: f64, height: f64) -> Self {
        let mut wire = Self::bare(WireType::Foil, name);
        wire.number_conductors = Some(1);
        wire.conducting_width = Some(thickness.into());
        wire.conducting_height = Some(height.into());
        wire.outer_width = Some(thickness.into());
        wire.outer_height = Some(height.into());
        wire
    }

    pub fn planar(name: impl Into<String>, conducting_height: f64) -> Self {
        let mut wire = Self::bare(WireType::Planar, name);
        wire.number_conductors = Some(1);
        wire.conducting_height = Some(conducting_height.into());
        wire.outer_height = Some(conducting_height.into());
        wire
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("unnamed")
    }

    fn dimension(
        &self,
        value: Option<DimensionWithTolerance>,
        field: &'static str,
    ) -> Result<f64, ModelError> {
        value
            .and_then(|d| d.resolve())
            .ok_or_else(|| ModelError::MissingWireDimension {
                wire: self.display_name().to_string(),
                field,
            })
    }

    /// Width of the outer bounding box: the packing footprint along the
    /// layers axis. Round and litz wires use the outer diameter.
    pub fn maximum_outer_width(&self) -> Result<f64, ModelError> {
        match self.wire_type {
            WireType::Round | WireType::Litz => self.dimension(self.outer_diameter, "outerDiameter"),
            WireType::Rectangular | WireType::Foil | WireType::Planar => self
                .dimension(self.outer_width, "outerWidth")
                .or_else(|_| self.dimension(self.conducting_width, "conductingWidth")),
        }
    }

    /// Height of the outer bounding box: the packing footprint along the
    /// turns axis.
    pub fn maximum_outer_height(&self) -> Result<f64, ModelError> {
        match self.wire_type {
            WireType::Round | WireType::Litz => self.dimension(self.outer_diameter, "outerDiameter"),
            WireType::Rectangular | WireType::Foil | WireType::Planar => self
                .dimension(self.outer_height, "outerHeight")
                .or_else(|_| self.dimension(self.conducting_height, "conductingHeight")),
        }
    }

    pub fn maximum_outer_dimensions(&self) -> Result<[f64; 2], ModelError> {
        Ok([self.maximum_outer_width()?, self.maximum_outer_height()?])
    }

    /// Area of the outer bounding box. Filling factors compare the summed
    /// bounding boxes of the packed wires against the container area, so a
    /// round wire contributes `d²`, not `πd²/4`.
    pub fn outer_bounding_area(&self) -> Result<f64, ModelError> {
        Ok(self.maximum_outer_width()? * self.maximum_outer_height()?)
    }

    pub fn resolve_strand(&self) -> Result<&Wire, ModelError> {
        match self.strand.as_deref() {
            Some(WireOrName::Wire(strand)) => Ok(strand),
            Some(WireOrName::Name(name)) => Err(ModelError::UnresolvedReference(name.clone())),
            None => Err(ModelError::MissingStrand(self.display_name().to_string())),
        }
    }

    /// Copper cross-section of the wire. Litz multiplies the strand area by
    /// the strand count; the rest fall back to the stated conducting area or
    /// to the conducting bounding box.
    pub fn conducting_area_value(&self) -> Result<f64, ModelError> {
        if let Some(area) = self.conducting_area.and_then(|d| d.resolve()) {
            return Ok(area);
        }
        match self.wire_type {
            WireType::Round => {
                let d = self.dimension(self.conducting_diameter, "conductingDiameter")?;
                Ok(std::f64::consts::PI * d * d / 4.0)
            }
            WireType::Litz => {
                let strands = self.number_conductors.unwrap_or(1) as f64;
                Ok(strands * self.resolve_strand()?.conducting_area_value()?)
            }
            WireType::Rectangular | WireType::Foil | WireType::Planar => {
                let w = self.dimension(self.conducting_width, "conductingWidth")?;
                let h = self.dimension(self.conducting_height, "conductingHeight")?;
                Ok(w * h)
            }
        }
    }

    /// Resize a foil wire to span the section it lands in: the foil height
    /// follows the section height (cartesian) or radial height (polar).
    pub fn cut_foil_wire_to_section(&mut self, section: &Section) {
        let height = match section.coordinate_system {
            Some(CoordinateSystem::Polar) => section.dimensions[0],
            _ => section.dimensions[1],
        };
        let margin: f64 = section.margin.map(|m| m[0] + m[1]).unwrap_or(0.0);
        let height = (height - margin).max(0.0);
        self.conducting_height = Some(height.into());
        self.outer_height = Some(height.into());
        if let Some(width) = self.conducting_width.and_then(|d| d.resolve()) {
            self.conducting_area = Some((width * height).into());
        }
    }

    /// Resize a planar wire (a PCB trace) to the section width. The copper
    /// thickness stays; the trace widens to the available span.
    pub fn cut_planar_wire_to_section(&mut self, section: &Section) {
        let width = section.dimensions[0];
        let margin: f64 = section.margin.map(|m| m[0] + m[1]).unwrap_or(0.0);
        let width = (width - margin).max(0.0);
        self.conducting_width = Some(width.into());
        self.outer_width = Some(width.into());
        if let Some(height) = self.conducting_height.and_then(|d| d.resolve()) {
            self.conducting_area = Some((width * height).into());
        }
    }

    /// Minimum number of parallels so the effective current density stays at
    /// or below `maximum_current_density` (A/m²).
    pub fn calculate_number_parallels_needed(
        &self,
        current_rms: f64,
        maximum_current_density: f64,
    ) -> Result<usize, ModelError> {
        let area = self.conducting_area_value()?;
        let needed = (current_rms / (maximum_current_density * area)).ceil();
        Ok((needed as usize).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_wire_footprint_uses_outer_diameter() {
        let wire = Wire::round("Round 1.00 - Grade 1", 1.0e-3, 1.062e-3);
        assert_eq!(wire.maximum_outer_width().unwrap(), 1.062e-3);
        assert_eq!(wire.maximum_outer_height().unwrap(), 1.062e-3);
        let area = wire.conducting_area_value().unwrap();
        assert!((area - std::f64::consts::PI * 0.25e-6).abs() < 1e-12);
    }

    #[test]
    fn litz_area_scales_with_strand_count() {
        let strand = Wire::round("Round 0.05", 0.05e-3, 0.06e-3);
        let strand_area = strand.conducting_area_value().unwrap();
        let litz = Wire::litz("Litz 25x0.05", strand, 25, 0.4e-3);
        let area = litz.conducting_area_value().unwrap();
        assert!((area - 25.0 * strand_area).abs() < 1e-15);
    }

    #[test]
    fn conducting_never_exceeds_outer_in_constructors() {
        let wire = Wire::rectangular("Rect 2x1", 2.0e-3, 1.0e-3, 2.08e-3, 1.08e-3);
        assert!(
            wire.conducting_area_value().unwrap()
                <= wire.outer_bounding_area().unwrap() + 1e-12
        );
    }

    #[test]
    fn parallels_needed_rounds_up() {
        let wire = Wire::round("Round 0.50", 0.5e-3, 0.55e-3);
        // 5 A over a 0.196 mm² wire at 5 A/mm² needs ceil(5.09) = 6 parallels.
        let parallels = wire
            .calculate_number_parallels_needed(5.0, 5.0e6)
            .unwrap();
        assert_eq!(parallels, 6);
    }

    #[test]
    fn missing_dimension_is_reported_with_field_name() {
        let mut wire = Wire::round("broken", 1.0e-3, 1.1e-3);
        wire.outer_diameter = None;
        let err = wire.maximum_outer_width().unwrap_err();
        assert!(err.to_string().contains("outerDiameter"));
    }

    #[test]
    fn wire_json_names_are_camel_case() {
        let wire = Wire::round("Round 0.20", 0.2e-3, 0.239e-3);
        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(json["type"], "round");
        assert!(json.get("conductingDiameter").is_some());
        assert!(json.get("outerDiameter").is_some());
    }
}
