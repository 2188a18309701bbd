//! Insulation planner.
//!
//! Produces, for every ordered pair of windings, the number and thickness of
//! insulation layers (and optionally a margin-tape distance) that the
//! section planner injects between their sections.
//!
//! Two modes. **Mechanical**: no requirements supplied; a single layer of
//! the default material's thinnest tape separates every distinct pair.
//! **Coordinated**: iterate the insulation-material catalogue and pick the
//! material/thickness/layer-count combination that satisfies the required
//! withstand voltage with the least total build. When margin tape is
//! allowed, the required creepage is paid with margin instead of extra
//! layers.

use ahash::AHashMap;
use tracing::debug;

use core_config::Settings;
use core_model::coil::{CoilSectionInterface, ElectricalType, InsulationLayerPurpose, Layer};
use core_model::{CoordinateSystem, InsulationMaterialOrName, WindingOrientation};

use crate::{CoilError, Winder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsulationType {
    Functional,
    Basic,
    Supplementary,
    Double,
    Reinforced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollutionDegree {
    P1,
    P2,
    P3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OvervoltageCategory {
    OvcI,
    OvcII,
    OvcIII,
    OvcIV,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsulationRequirements {
    pub working_voltage: f64,
    pub insulation_type: InsulationType,
    pub pollution_degree: PollutionDegree,
    pub overvoltage_category: OvervoltageCategory,
    /// Metres above sea level; clearances derate above 2000 m.
    pub altitude: f64,
}

impl InsulationRequirements {
    pub fn new(working_voltage: f64, insulation_type: InsulationType) -> Self {
        Self {
            working_voltage,
            insulation_type,
            pollution_degree: PollutionDegree::P2,
            overvoltage_category: OvervoltageCategory::OvcII,
            altitude: 2000.0,
        }
    }

    /// Dielectric withstand the solid insulation must block.
    fn withstand_voltage(&self) -> f64 {
        let single = 2.0 * self.working_voltage + 1000.0;
        match self.insulation_type {
            InsulationType::Functional | InsulationType::Basic | InsulationType::Supplementary => {
                single
            }
            InsulationType::Double | InsulationType::Reinforced => 2.0 * single,
        }
    }

    /// Required creepage distance along surfaces between the two windings.
    fn required_creepage(&self) -> f64 {
        let pollution_factor = match self.pollution_degree {
            PollutionDegree::P1 => 0.8,
            PollutionDegree::P2 => 1.0,
            PollutionDegree::P3 => 1.6,
        };
        let overvoltage_factor = match self.overvoltage_category {
            OvervoltageCategory::OvcI => 0.8,
            OvervoltageCategory::OvcII => 1.0,
            OvervoltageCategory::OvcIII => 1.25,
            OvervoltageCategory::OvcIV => 1.6,
        };
        let altitude_factor = if self.altitude > 2000.0 { 1.25 } else { 1.0 };
        6.3e-3 * (self.working_voltage / 1000.0)
            * pollution_factor
            * overvoltage_factor
            * altitude_factor
    }
}

/// Computed (or overridden) inter-winding insulation, keyed by the ordered
/// winding index pair.
#[derive(Debug, Clone, Default)]
pub struct InsulationPlan {
    interfaces: AHashMap<(usize, usize), CoilSectionInterface>,
    materials: AHashMap<(usize, usize), String>,
    overrides: AHashMap<(usize, usize), (CoilSectionInterface, Option<String>)>,
    global_override: Option<(CoilSectionInterface, Option<String>)>,
}

impl InsulationPlan {
    pub fn interface(&self, a: usize, b: usize) -> Option<&CoilSectionInterface> {
        self.interfaces.get(&(a, b))
    }

    /// Total solid insulation build between two windings.
    pub fn thickness_between(&self, a: usize, b: usize) -> f64 {
        self.interface(a, b)
            .map(|i| i.number_layers_insulation as f64 * i.layer_thickness)
            .unwrap_or(0.0)
    }

    pub fn margin_between(&self, a: usize, b: usize) -> f64 {
        self.interface(a, b)
            .map(|i| i.total_margin_tape_distance)
            .unwrap_or(0.0)
    }

    pub fn material_between(&self, a: usize, b: usize) -> Option<&str> {
        self.materials.get(&(a, b)).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }

    fn resolved(&self, pair: (usize, usize)) -> Option<(CoilSectionInterface, Option<String>)> {
        self.overrides
            .get(&pair)
            .cloned()
            .or_else(|| self.global_override.clone())
    }

    /// Instantiate the insulation layer templates between two windings:
    /// `number_layers` layers of `layer_thickness`, window-sized, filled.
    pub fn build_layers(
        &self,
        a: usize,
        b: usize,
        section_name: &str,
        section_coordinates: [f64; 2],
        section_dimensions: [f64; 2],
        orientation: WindingOrientation,
        coordinate_system: CoordinateSystem,
    ) -> Vec<Layer> {
        let Some(interface) = self.interface(a, b) else {
            return Vec::new();
        };
        let count = interface.number_layers_insulation.max(1) as usize;
        let material = self.material_between(a, b).map(str::to_string);
        let mut layers = Vec::with_capacity(count);
        // The section spans the full build; each layer takes an equal slice
        // of the stacking axis.
        let (stack_extent, stack_axis) = match orientation {
            WindingOrientation::Overlapping => (section_dimensions[0], 0),
            WindingOrientation::Contiguous => (section_dimensions[1], 1),
        };
        let slice = stack_extent / count as f64;
        for index in 0..count {
            let mut coordinates = section_coordinates;
            let offset = -stack_extent / 2.0 + slice * (index as f64 + 0.5);
            // Radial stacking in polar windows walks inward.
            if coordinate_system == CoordinateSystem::Polar && stack_axis == 0 {
                coordinates[0] = section_coordinates[0] + stack_extent / 2.0 - slice * (index as f64 + 0.5);
            } else {
                coordinates[stack_axis] += offset;
            }
            let mut dimensions = section_dimensions;
            dimensions[stack_axis] = slice;
            layers.push(Layer {
                name: format!("{section_name} layer {index}"),
                layer_type: ElectricalType::Insulation,
                section: Some(section_name.to_string()),
                partial_windings: Vec::new(),
                orientation,
                turns_alignment: None,
                coordinates,
                dimensions,
                coordinate_system: Some(coordinate_system),
                filling_factor: Some(1.0),
                insulation_material: material.clone().map(InsulationMaterialOrName::Name),
                additional_coordinates: None,
            });
        }
        layers
    }
}

impl Winder {
    /// Build the insulation plan for every ordered pair of windings.
    pub(crate) fn calculate_insulation(&mut self, settings: &Settings) -> Result<(), CoilError> {
        let windings = self.coil.functional_description.len();
        let mut interfaces = AHashMap::new();
        let mut materials = AHashMap::new();
        for a in 0..windings {
            for b in 0..windings {
                if a == b {
                    continue;
                }
                let (interface, material) = match self.insulation_plan.resolved((a, b)) {
                    Some(overridden) => overridden,
                    None => match self.insulation_requirements {
                        Some(requirements) => coordinated_interface(&requirements, settings),
                        None => mechanical_interface(),
                    },
                };
                interfaces.insert((a, b), interface);
                if let Some(material) = material {
                    materials.insert((a, b), material);
                }
            }
        }
        debug!(target: "coil.insulation", pairs = interfaces.len(), "insulation plan computed");
        self.insulation_plan.interfaces = interfaces;
        self.insulation_plan.materials = materials;
        Ok(())
    }

    /// Drop any insulation requirements and overrides: the next wind plans
    /// plain mechanical separation between windings.
    pub fn calculate_mechanical_insulation(&mut self) {
        self.insulation_requirements = None;
        self.insulation_plan.overrides.clear();
        self.insulation_plan.global_override = None;
        self.unwind();
    }

    /// Force a single insulation layer of `thickness` between every pair.
    pub fn calculate_custom_thickness_insulation(&mut self, thickness: f64) {
        self.insulation_plan.global_override = Some((
            CoilSectionInterface {
                number_layers_insulation: 1,
                layer_thickness: thickness,
                total_margin_tape_distance: 0.0,
                layer_purpose: InsulationLayerPurpose::Mechanical,
            },
            None,
        ));
        self.unwind();
    }

    /// Override the inter-section insulation for one winding pair (or for
    /// every pair when none is named).
    pub fn set_intersection_insulation(
        &mut self,
        layer_thickness: f64,
        number_layers: u32,
        material: Option<String>,
        pair: Option<(usize, usize)>,
    ) {
        let interface = CoilSectionInterface {
            number_layers_insulation: number_layers,
            layer_thickness,
            total_margin_tape_distance: 0.0,
            layer_purpose: InsulationLayerPurpose::Insulating,
        };
        match pair {
            Some((a, b)) => {
                self.insulation_plan
                    .overrides
                    .insert((a, b), (interface.clone(), material.clone()));
                self.insulation_plan
                    .overrides
                    .insert((b, a), (interface, material));
            }
            None => self.insulation_plan.global_override = Some((interface, material)),
        }
        self.unwind();
    }

    /// Interlayer insulation thickness for one winding (or all windings),
    /// consumed by the planar section planner.
    pub fn set_interlayer_insulation(&mut self, layer_thickness: f64, winding: Option<&str>) {
        let key = winding.unwrap_or("*").to_string();
        self.interlayer_insulation.insert(key, layer_thickness);
        self.unwind();
    }

    pub(crate) fn interlayer_insulation_for(&self, winding: &str) -> Option<f64> {
        self.interlayer_insulation
            .get(winding)
            .or_else(|| self.interlayer_insulation.get("*"))
            .copied()
    }

    pub fn insulation_plan(&self) -> &InsulationPlan {
        &self.insulation_plan
    }

    /// Thickness of a named insulation section, from its dimensions and
    /// coordinate system.
    pub fn insulation_section_thickness(&self, section_name: &str) -> Option<f64> {
        let section = self.coil.section_by_name(section_name)?;
        if section.section_type != ElectricalType::Insulation {
            return None;
        }
        match (section.coordinate_system, self.winding_orientation) {
            (Some(CoordinateSystem::Polar), WindingOrientation::Contiguous) => Some(
                core_geometry::angle_to_wound_distance(section.dimensions[1], section.coordinates[0]),
            ),
            (_, WindingOrientation::Overlapping) => Some(section.dimensions[0]),
            (_, WindingOrientation::Contiguous) => Some(section.dimensions[1]),
        }
    }

    pub fn insulation_layer_thickness(&self, layer_name: &str) -> Option<f64> {
        let layer = self.coil.layer_by_name(layer_name)?;
        if layer.layer_type != ElectricalType::Insulation {
            return None;
        }
        match layer.orientation {
            WindingOrientation::Overlapping => Some(layer.dimensions[0]),
            WindingOrientation::Contiguous => Some(layer.dimensions[1]),
        }
    }

    pub fn resolve_insulation_layer_material(
        &self,
        layer_name: &str,
    ) -> Result<&'static core_model::InsulationMaterial, CoilError> {
        let Some(layer) = self.coil.layer_by_name(layer_name) else {
            return Err(CoilError::MissingPrerequisite("layer not found"));
        };
        match &layer.insulation_material {
            Some(InsulationMaterialOrName::Name(name)) => {
                Ok(core_catalog::find_insulation_material(name)?)
            }
            _ => Ok(core_catalog::default_insulation_material()),
        }
    }

    /// Relative permittivity of a named insulation layer's material, read by
    /// the stray-capacitance collaborator.
    pub fn insulation_layer_relative_permittivity(
        &self,
        layer_name: &str,
    ) -> Result<f64, CoilError> {
        let material = self.resolve_insulation_layer_material(layer_name)?;
        Ok(material.relative_permittivity.unwrap_or(1.0))
    }
}

/// Mechanical separation only: one thinnest-tape layer of the default
/// material, no margin.
fn mechanical_interface() -> (CoilSectionInterface, Option<String>) {
    let material = core_catalog::default_insulation_material();
    let thickness = material.thinner_tape_thickness().unwrap_or(25.0e-6);
    (
        CoilSectionInterface {
            number_layers_insulation: 1,
            layer_thickness: thickness,
            total_margin_tape_distance: 0.0,
            layer_purpose: InsulationLayerPurpose::Mechanical,
        },
        Some(material.name.clone()),
    )
}

/// Coordinated insulation: the cheapest catalogue combination that blocks
/// the withstand voltage; creepage paid with margin tape when allowed.
fn coordinated_interface(
    requirements: &InsulationRequirements,
    settings: &Settings,
) -> (CoilSectionInterface, Option<String>) {
    let withstand = requirements.withstand_voltage();
    let creepage = requirements.required_creepage();

    let mut best: Option<(f64, u32, f64, String)> = None;
    for material in core_catalog::insulation_materials() {
        for &thickness in &material.available_thicknesses {
            let Some(breakdown) = material.breakdown_voltage_at(thickness) else {
                continue;
            };
            if breakdown <= 0.0 {
                continue;
            }
            let layers = (withstand / breakdown).ceil().max(1.0) as u32;
            let build = layers as f64 * thickness;
            let better = match &best {
                Some((best_build, ..)) => build < *best_build - 1e-12,
                None => true,
            };
            if better {
                best = Some((build, layers, thickness, material.name.clone()));
            }
        }
    }
    let (_, mut layers, thickness, material) = best.expect("insulation catalogue is not empty");

    let margin = if settings.coil.allow_margin_tape {
        creepage
    } else {
        // Without margin tape the surface distance is lost; one extra layer
        // stands in for it.
        layers += 1;
        0.0
    };
    (
        CoilSectionInterface {
            number_layers_insulation: layers,
            layer_thickness: thickness,
            total_margin_tape_distance: margin,
            layer_purpose: InsulationLayerPurpose::Insulating,
        },
        Some(material),
    )
}
