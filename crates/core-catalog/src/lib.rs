//! Embedded catalogues: wires, bobbins, insulation materials.
//!
//! Each catalogue parses once per process from JSON embedded at compile time
//! and is immutable afterwards. Lookups are by the exact catalogue name.
//! Initialisation is idempotent; the engine never mutates a catalogue.
//!
//! Litz strands referenced by name are resolved to values at load so
//! downstream code never sees a dangling strand reference.

use std::sync::OnceLock;

use thiserror::Error;
use tracing::debug;

use core_model::wire::WireOrName;
use core_model::{Bobbin, InsulationMaterial, Wire};

const WIRES_JSON: &str = include_str!("../data/wires.json");
const INSULATION_MATERIALS_JSON: &str = include_str!("../data/insulation_materials.json");
const BOBBINS_JSON: &str = include_str!("../data/bobbins.json");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("wire `{0}` not found in catalogue")]
    WireNotFound(String),
    #[error("bobbin `{0}` not found in catalogue")]
    BobbinNotFound(String),
    #[error("insulation material `{0}` not found in catalogue")]
    InsulationMaterialNotFound(String),
}

/// All catalogued wires, strand references resolved.
pub fn wires() -> &'static [Wire] {
    static WIRES: OnceLock<Vec<Wire>> = OnceLock::new();
    WIRES.get_or_init(|| {
        let mut wires: Vec<Wire> =
            serde_json::from_str(WIRES_JSON).expect("embedded wire catalogue is well-formed");
        let by_name = wires.clone();
        for wire in &mut wires {
            if let Some(strand) = wire.strand.as_deref()
                && let WireOrName::Name(name) = strand
            {
                let resolved = by_name
                    .iter()
                    .find(|w| w.name.as_deref() == Some(name))
                    .expect("embedded litz strands reference catalogued wires")
                    .clone();
                wire.strand = Some(Box::new(WireOrName::Wire(resolved)));
            }
        }
        debug!(target: "catalog", count = wires.len(), "wire catalogue loaded");
        wires
    })
}

pub fn find_wire(name: &str) -> Result<&'static Wire, CatalogError> {
    wires()
        .iter()
        .find(|w| w.name.as_deref() == Some(name))
        .ok_or_else(|| CatalogError::WireNotFound(name.to_string()))
}

pub fn insulation_materials() -> &'static [InsulationMaterial] {
    static MATERIALS: OnceLock<Vec<InsulationMaterial>> = OnceLock::new();
    MATERIALS.get_or_init(|| {
        let materials: Vec<InsulationMaterial> = serde_json::from_str(INSULATION_MATERIALS_JSON)
            .expect("embedded insulation catalogue is well-formed");
        debug!(target: "catalog", count = materials.len(), "insulation material catalogue loaded");
        materials
    })
}

pub fn find_insulation_material(name: &str) -> Result<&'static InsulationMaterial, CatalogError> {
    insulation_materials()
        .iter()
        .find(|m| m.name == name)
        .ok_or_else(|| CatalogError::InsulationMaterialNotFound(name.to_string()))
}

/// Material used when no insulation requirements pick another one.
pub fn default_insulation_material() -> &'static InsulationMaterial {
    find_insulation_material("Kapton HN").expect("default material is catalogued")
}

pub fn bobbins() -> &'static [Bobbin] {
    static BOBBINS: OnceLock<Vec<Bobbin>> = OnceLock::new();
    BOBBINS.get_or_init(|| {
        let bobbins: Vec<Bobbin> =
            serde_json::from_str(BOBBINS_JSON).expect("embedded bobbin catalogue is well-formed");
        debug!(target: "catalog", count = bobbins.len(), "bobbin catalogue loaded");
        bobbins
    })
}

pub fn find_bobbin(name: &str) -> Result<&'static Bobbin, CatalogError> {
    bobbins()
        .iter()
        .find(|b| b.name.as_deref() == Some(name))
        .ok_or_else(|| CatalogError::BobbinNotFound(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::WireType;

    #[test]
    fn wire_lookup_by_exact_name() {
        let wire = find_wire("Round 0.50 - Grade 1").unwrap();
        assert_eq!(wire.wire_type, WireType::Round);
        assert!(find_wire("Round 99").is_err());
    }

    #[test]
    fn litz_strands_are_resolved_at_load() {
        let litz = find_wire("Litz 225x0.05").unwrap();
        let strand = litz.resolve_strand().unwrap();
        assert_eq!(strand.name.as_deref(), Some("Round 0.05 - Grade 1"));
        // 225 strands of 0.05 mm: conducting area scales with the count.
        let area = litz.conducting_area_value().unwrap();
        let strand_area = strand.conducting_area_value().unwrap();
        assert!((area / strand_area - 225.0).abs() < 1e-9);
    }

    #[test]
    fn every_wire_keeps_conducting_inside_outer() {
        for wire in wires() {
            // Planar wires are elastic: width is unset until cut to a section.
            let (Ok(outer), Ok(conducting)) =
                (wire.outer_bounding_area(), wire.conducting_area_value())
            else {
                assert_eq!(wire.wire_type, WireType::Planar, "{}", wire.display_name());
                continue;
            };
            assert!(
                conducting <= outer + 1e-12,
                "{}: conducting {conducting} > outer {outer}",
                wire.display_name()
            );
        }
    }

    #[test]
    fn default_insulation_material_has_tape_thicknesses() {
        let material = default_insulation_material();
        assert!(material.thinner_tape_thickness().unwrap() > 0.0);
        assert!(material.breakdown_voltage_at(25e-6).unwrap() > 1000.0);
    }

    #[test]
    fn bobbin_catalogue_windows_are_rectangular() {
        let bobbin = find_bobbin("Bobbin E 42/33/20").unwrap();
        let window = bobbin.winding_window().unwrap();
        assert!(window.width.is_some());
        assert!(window.height.is_some());
    }

    #[test]
    fn catalogue_initialisation_is_idempotent() {
        let first = wires().as_ptr();
        let second = wires().as_ptr();
        assert_eq!(first, second);
    }
}
