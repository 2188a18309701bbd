//! Winding description entities: the functional inputs (windings, wires,
//! bobbin) and the computed hierarchy of sections, layers and turns.
//!
//! Naming contract: every section, layer and turn carries a name unique
//! within its kind, and cross-references between kinds are those names.
//! `Section "Primary section 0"` ⇄ `Layer "Primary section 0 layer 1"` ⇄
//! `Turn "Primary parallel 0 turn 4"`. The query helpers here resolve them
//! linearly; the layout engine keeps its own hashed indexes while winding.

use serde::{Deserialize, Serialize};

use crate::bobbin::Bobbin;
use crate::core::Core;
use crate::insulation::InsulationMaterialOrName;
use crate::wire::{Wire, WireOrName, WireType};
use crate::{CoordinateSystem, ModelError, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindingOrientation {
    /// Containers stack along the window width (cartesian) or radial axis.
    #[serde(rename = "overlapping")]
    Overlapping,
    /// Containers stack along the window height or angular axis.
    #[serde(rename = "contiguous")]
    Contiguous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoilAlignment {
    #[serde(rename = "inner or top")]
    InnerOrTop,
    #[serde(rename = "outer or bottom")]
    OuterOrBottom,
    #[serde(rename = "centered")]
    Centered,
    #[serde(rename = "spread")]
    Spread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindingStyle {
    /// All turns of one parallel, then the next parallel.
    #[serde(rename = "wind by consecutive turns")]
    WindByConsecutiveTurns,
    /// Turn 0 of every parallel, then turn 1 of every parallel.
    #[serde(rename = "wind by consecutive parallels")]
    WindByConsecutiveParallels,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElectricalType {
    #[serde(rename = "conduction")]
    Conduction,
    #[serde(rename = "insulation")]
    Insulation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WiringTechnology {
    #[serde(rename = "wound")]
    Wound,
    #[serde(rename = "printed")]
    Printed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnOrientation {
    #[serde(rename = "clockwise")]
    Clockwise,
    #[serde(rename = "counter clockwise")]
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InsulationLayerPurpose {
    #[serde(rename = "mechanical")]
    Mechanical,
    #[serde(rename = "insulating")]
    Insulating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IsolationSide {
    #[serde(rename = "primary")]
    Primary,
    #[serde(rename = "secondary")]
    Secondary,
    #[serde(rename = "tertiary")]
    Tertiary,
    #[serde(rename = "quaternary")]
    Quaternary,
    #[serde(rename = "quinary")]
    Quinary,
    #[serde(rename = "senary")]
    Senary,
    #[serde(rename = "septenary")]
    Septenary,
    #[serde(rename = "octonary")]
    Octonary,
    #[serde(rename = "nonary")]
    Nonary,
    #[serde(rename = "denary")]
    Denary,
    #[serde(rename = "undenary")]
    Undenary,
    #[serde(rename = "duodenary")]
    Duodenary,
}

impl IsolationSide {
    /// Ordinal-indexed isolation side: winding 0 ⇒ primary, 1 ⇒ secondary…
    pub fn from_index(index: usize) -> Self {
        use IsolationSide::*;
        const SIDES: [IsolationSide; 12] = [
            Primary, Secondary, Tertiary, Quaternary, Quinary, Senary, Septenary, Octonary,
            Nonary, Denary, Undenary, Duodenary,
        ];
        SIDES[index.min(SIDES.len() - 1)]
    }
}

/// A slice of a winding carried by one section or layer: per parallel, the
/// fraction of that parallel's turns that live in the container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialWinding {
    /// Name of the winding (functional description) this slice belongs to.
    pub winding: String,
    pub parallels_proportion: Vec<f64>,
}

impl PartialWinding {
    pub fn full(winding: impl Into<String>, number_parallels: usize) -> Self {
        Self {
            winding: winding.into(),
            parallels_proportion: vec![1.0; number_parallels],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub name: String,
    #[serde(rename = "type")]
    pub section_type: ElectricalType,
    #[serde(default)]
    pub partial_windings: Vec<PartialWinding>,
    /// Orientation of the layers this section will be split into.
    pub layers_orientation: WindingOrientation,
    /// Centre: `[x, y]` or `[radius, angle°]`.
    pub coordinates: Point,
    /// `[width, height]` or `[radial_height, angle°]`.
    pub dimensions: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winding_style: Option<WindingStyle>,
    /// Reserved empty bands at the two ends (top/bottom or inner/outer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_system: Option<CoordinateSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filling_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layer {
    pub name: String,
    #[serde(rename = "type")]
    pub layer_type: ElectricalType,
    /// Owning section, by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    #[serde(default)]
    pub partial_windings: Vec<PartialWinding>,
    pub orientation: WindingOrientation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turns_alignment: Option<CoilAlignment>,
    pub coordinates: Point,
    pub dimensions: Point,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_system: Option<CoordinateSystem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filling_factor: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insulation_material: Option<InsulationMaterialOrName>,
    /// Outer-side centres for toroidal insulation layers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_coordinates: Option<Vec<Point>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Owning winding, by name.
    pub winding: String,
    /// Index of the parallel this turn belongs to.
    pub parallel: usize,
    pub coordinates: Point,
    /// Bounding box of the wire footprint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orientation: Option<TurnOrientation>,
    /// Wound length of this turn around the column.
    pub length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    /// Outer-side centre(s) for turns wrapping a toroidal core.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_coordinates: Option<Vec<Point>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinate_system: Option<CoordinateSystem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: WiringTechnology,
    pub coordinates: Point,
    pub dimensions: Point,
    pub sections_orientation: WindingOrientation,
    pub sections_alignment: CoilAlignment,
}

/// Insulation requirement computed for an ordered pair of windings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoilSectionInterface {
    pub number_layers_insulation: u32,
    /// Thickness of each insulation layer in the interface.
    pub layer_thickness: f64,
    pub total_margin_tape_distance: f64,
    pub layer_purpose: InsulationLayerPurpose,
}

/// One winding: electrical turns/parallels plus the wire that realises them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoilFunctionalDescription {
    pub name: String,
    pub number_turns: u64,
    pub number_parallels: u64,
    pub isolation_side: IsolationSide,
    pub wire: WireOrName,
}

impl CoilFunctionalDescription {
    pub fn new(
        name: impl Into<String>,
        number_turns: u64,
        number_parallels: u64,
        isolation_side: IsolationSide,
        wire: Wire,
    ) -> Self {
        Self {
            name: name.into(),
            number_turns,
            number_parallels,
            isolation_side,
            wire: WireOrName::Wire(wire),
        }
    }

    pub fn physical_turns(&self) -> u64 {
        self.number_turns * self.number_parallels
    }

    /// The wire when given by value; by-name references must be resolved
    /// against the catalogue first.
    pub fn wire(&self) -> Result<&Wire, ModelError> {
        match &self.wire {
            WireOrName::Wire(wire) => Ok(wire),
            WireOrName::Name(name) => Err(ModelError::UnresolvedReference(name.clone())),
        }
    }

    pub fn wire_type(&self) -> Result<WireType, ModelError> {
        Ok(self.wire()?.wire_type)
    }
}

/// A bobbin given by value or referenced by catalogue name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BobbinOrName {
    Bobbin(Bobbin),
    Name(String),
}

/// The coil document: functional inputs plus, once wound, the computed
/// sections/layers/turns/groups hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coil {
    pub bobbin: BobbinOrName,
    pub functional_description: Vec<CoilFunctionalDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections_description: Option<Vec<Section>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layers_description: Option<Vec<Layer>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turns_description: Option<Vec<Turn>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups_description: Option<Vec<Group>>,
}

impl Coil {
    pub fn new(bobbin: Bobbin, functional_description: Vec<CoilFunctionalDescription>) -> Self {
        Self {
            bobbin: BobbinOrName::Bobbin(bobbin),
            functional_description,
            sections_description: None,
            layers_description: None,
            turns_description: None,
            groups_description: None,
        }
    }

    pub fn bobbin(&self) -> Result<&Bobbin, ModelError> {
        match &self.bobbin {
            BobbinOrName::Bobbin(bobbin) => Ok(bobbin),
            BobbinOrName::Name(name) => Err(ModelError::UnresolvedReference(name.clone())),
        }
    }

    pub fn winding_by_name(&self, name: &str) -> Option<&CoilFunctionalDescription> {
        self.functional_description.iter().find(|w| w.name == name)
    }

    pub fn winding_index_by_name(&self, name: &str) -> Option<usize> {
        self.functional_description.iter().position(|w| w.name == name)
    }

    pub fn number_turns(&self) -> Vec<u64> {
        self.functional_description.iter().map(|w| w.number_turns).collect()
    }

    pub fn number_parallels(&self) -> Vec<u64> {
        self.functional_description.iter().map(|w| w.number_parallels).collect()
    }

    pub fn isolation_sides(&self) -> Vec<IsolationSide> {
        self.functional_description.iter().map(|w| w.isolation_side).collect()
    }

    /// Turns ratios of the first winding against every other winding.
    pub fn turns_ratios(&self) -> Vec<f64> {
        match self.functional_description.split_first() {
            Some((first, rest)) => rest
                .iter()
                .map(|w| first.number_turns as f64 / w.number_turns as f64)
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn sections(&self) -> &[Section] {
        self.sections_description.as_deref().unwrap_or(&[])
    }

    pub fn layers(&self) -> &[Layer] {
        self.layers_description.as_deref().unwrap_or(&[])
    }

    pub fn turns(&self) -> &[Turn] {
        self.turns_description.as_deref().unwrap_or(&[])
    }

    pub fn groups(&self) -> &[Group] {
        self.groups_description.as_deref().unwrap_or(&[])
    }

    pub fn section_by_name(&self, name: &str) -> Option<&Section> {
        self.sections().iter().find(|s| s.name == name)
    }

    pub fn section_index_by_name(&self, name: &str) -> Option<usize> {
        self.sections().iter().position(|s| s.name == name)
    }

    pub fn layer_by_name(&self, name: &str) -> Option<&Layer> {
        self.layers().iter().find(|l| l.name == name)
    }

    pub fn layer_index_by_name(&self, name: &str) -> Option<usize> {
        self.layers().iter().position(|l| l.name == name)
    }

    pub fn turn_by_name(&self, name: &str) -> Option<&Turn> {
        self.turns().iter().find(|t| t.name == name)
    }

    pub fn turn_index_by_name(&self, name: &str) -> Option<usize> {
        self.turns().iter().position(|t| t.name == name)
    }

    pub fn sections_by_type(&self, section_type: ElectricalType) -> Vec<&Section> {
        self.sections().iter().filter(|s| s.section_type == section_type).collect()
    }

    pub fn sections_by_winding(&self, winding: &str) -> Vec<&Section> {
        self.sections()
            .iter()
            .filter(|s| s.partial_windings.iter().any(|p| p.winding == winding))
            .collect()
    }

    pub fn sections_by_group(&self, group: &str) -> Vec<&Section> {
        self.sections()
            .iter()
            .filter(|s| s.group.as_deref() == Some(group))
            .collect()
    }

    pub fn layers_by_type(&self, layer_type: ElectricalType) -> Vec<&Layer> {
        self.layers().iter().filter(|l| l.layer_type == layer_type).collect()
    }

    pub fn layers_by_section(&self, section: &str) -> Vec<&Layer> {
        self.layers()
            .iter()
            .filter(|l| l.section.as_deref() == Some(section))
            .collect()
    }

    pub fn layers_by_winding_index(&self, winding_index: usize) -> Vec<&Layer> {
        let Some(winding) = self.functional_description.get(winding_index) else {
            return Vec::new();
        };
        self.layers()
            .iter()
            .filter(|l| l.partial_windings.iter().any(|p| p.winding == winding.name))
            .collect()
    }

    pub fn turns_by_layer(&self, layer: &str) -> Vec<&Turn> {
        self.turns()
            .iter()
            .filter(|t| t.layer.as_deref() == Some(layer))
            .collect()
    }

    pub fn turns_by_section(&self, section: &str) -> Vec<&Turn> {
        self.turns()
            .iter()
            .filter(|t| t.section.as_deref() == Some(section))
            .collect()
    }

    pub fn turns_by_winding(&self, winding: &str) -> Vec<&Turn> {
        self.turns().iter().filter(|t| t.winding == winding).collect()
    }

    pub fn turns_indexes_by_layer(&self, layer: &str) -> Vec<usize> {
        self.turns()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.layer.as_deref() == Some(layer))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn turns_indexes_by_section(&self, section: &str) -> Vec<usize> {
        self.turns()
            .iter()
            .enumerate()
            .filter(|(_, t)| t.section.as_deref() == Some(section))
            .map(|(i, _)| i)
            .collect()
    }

    /// Physical turns a container holds for one winding, from its
    /// proportion slice: `Σ_p round(proportion[p] · number_turns)`.
    pub fn partial_winding_physical_turns(&self, partial: &PartialWinding) -> u64 {
        let Some(winding) = self.winding_by_name(&partial.winding) else {
            return 0;
        };
        partial
            .parallels_proportion
            .iter()
            .map(|p| (p * winding.number_turns as f64).round() as u64)
            .sum()
    }

    pub fn number_turns_in_section(&self, section: &Section) -> u64 {
        section
            .partial_windings
            .iter()
            .map(|p| self.partial_winding_physical_turns(p))
            .sum()
    }

    pub fn number_turns_in_layer(&self, layer: &Layer) -> u64 {
        layer
            .partial_windings
            .iter()
            .map(|p| self.partial_winding_physical_turns(p))
            .sum()
    }
}

/// Top-level document: `{"magnetic": {"core": …, "coil": …}}` on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Magnetic {
    pub core: Core,
    pub coil: Coil,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer_info: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distributors_info: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct MagneticEnvelope {
    magnetic: Magnetic,
}

impl Magnetic {
    pub fn from_document(document: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<MagneticEnvelope>(document).map(|e| e.magnetic)
    }

    pub fn to_document(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&MagneticEnvelope {
            magnetic: self.clone(),
        })
    }
}
