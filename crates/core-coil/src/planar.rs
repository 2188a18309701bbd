//! Planar (printed) winding.
//!
//! A planar transformer names its copper layers top-down in a *stack-up* of
//! winding indices. Each copper layer becomes one conduction section holding
//! exactly one winding, one layer and a row of traces; user-thickness
//! insulation sections separate consecutive copper layers. Trace widths are
//! derived from the window width, the border-to-wire distance and the
//! wire-to-wire spacing, so every section is filled edge to edge.

use tracing::debug;

use core_model::bobbin::WindingWindowShape;
use core_model::coil::{
    ElectricalType, Layer, PartialWinding, Section, Turn, TurnOrientation, WiringTechnology,
};
use core_model::{CoordinateSystem, WindingOrientation, WireType};

use crate::layers::{parallel_turn_counts, winding_order};
use crate::sections::{parallels_proportions, turn_boundaries};
use crate::turns::turn_length;
use crate::{CoilError, Winder};

/// Inter-layer dielectric used when neither the call nor
/// `set_interlayer_insulation` names a thickness.
pub const DEFAULT_PCB_INSULATION_THICKNESS: f64 = 100.0e-6;

impl Winder {
    /// Wind a planar stack-up. `stack_up` lists the winding index of each
    /// copper layer from the top of the window down.
    pub fn wind_planar(
        &mut self,
        stack_up: Vec<usize>,
        border_to_wire_distance: Option<f64>,
        wire_to_wire_distance: Option<f64>,
        insulation_thickness: Option<f64>,
        core_to_layer_distance: f64,
    ) -> crate::WindResult {
        let settings = self.effective_settings();
        let windings = self.coil.functional_description.len();
        if stack_up.is_empty() {
            return Err(CoilError::InvalidInput("planar stack-up is empty".into()));
        }
        if let Some(bad) = stack_up.iter().find(|w| **w >= windings) {
            return Err(CoilError::InvalidInput(format!(
                "stack-up references winding {bad}, coil has {windings}"
            )));
        }
        if self.bobbin.winding_window_shape()? != WindingWindowShape::Rectangular {
            return Err(CoilError::InvalidInput(
                "planar winding requires a rectangular window".into(),
            ));
        }
        if stack_up.len() > settings.coil.maximum_layers_planar {
            debug!(target: "coil.planar", layers = stack_up.len(), "stack-up exceeds the planar layer cap");
            return Ok(false);
        }

        self.unwind();
        self.winding_orientation = WindingOrientation::Contiguous;
        self.layers_orientation = WindingOrientation::Contiguous;
        let group = self.ensure_default_group(WiringTechnology::Printed);
        let border = border_to_wire_distance.unwrap_or(0.0);
        let spacing = wire_to_wire_distance.unwrap_or(0.0);

        let window = self.winding_window()?.clone();
        let width = window.width.unwrap_or(0.0);
        let height = window.height.unwrap_or(0.0);
        let centre = window.centre();
        let top = centre[1] + height / 2.0;

        let slots_per_winding: Vec<usize> = (0..windings)
            .map(|w| stack_up.iter().filter(|s| **s == w).count())
            .collect();

        let mut sections: Vec<Section> = Vec::new();
        let mut layers: Vec<Layer> = Vec::new();
        let mut turns: Vec<Turn> = Vec::new();
        let mut ordinals: Vec<Vec<u64>> = self
            .coil
            .functional_description
            .iter()
            .map(|w| vec![0u64; w.number_parallels as usize])
            .collect();
        let mut slots_seen = vec![0usize; windings];
        let mut cursor = core_to_layer_distance;
        let mut insulation_counter = 0usize;

        for (stack_index, &winding_index) in stack_up.iter().enumerate() {
            let functional = self.coil.functional_description[winding_index].clone();
            let wire = self.wires[winding_index].clone();
            let copper_height = match wire.wire_type {
                WireType::Planar | WireType::Rectangular | WireType::Foil => wire
                    .conducting_height
                    .and_then(|d| d.resolve())
                    .ok_or(CoilError::Model(
                        core_model::ModelError::MissingWireDimension {
                            wire: wire.display_name().to_string(),
                            field: "conductingHeight",
                        },
                    ))?,
                _ => {
                    return Err(CoilError::InvalidInput(format!(
                        "winding `{}` uses a {:?} wire, planar stacks need planar traces",
                        functional.name, wire.wire_type
                    )));
                }
            };

            // Insulation between consecutive copper layers.
            if stack_index > 0 {
                let thickness = insulation_thickness
                    .or_else(|| self.interlayer_insulation_for(&functional.name))
                    .unwrap_or(DEFAULT_PCB_INSULATION_THICKNESS);
                let name = format!("Insulation section {insulation_counter}");
                let previous_winding = stack_up[stack_index - 1];
                self.insulation_section_pairs
                    .insert(name.clone(), (previous_winding, winding_index));
                sections.push(Section {
                    name,
                    section_type: ElectricalType::Insulation,
                    partial_windings: Vec::new(),
                    layers_orientation: WindingOrientation::Contiguous,
                    coordinates: [centre[0], top - cursor - thickness / 2.0],
                    dimensions: [width, thickness],
                    winding_style: None,
                    margin: Some([0.0, 0.0]),
                    coordinate_system: Some(CoordinateSystem::Cartesian),
                    filling_factor: Some(1.0),
                    group: Some(group.clone()),
                });
                insulation_counter += 1;
                cursor += thickness;
            }

            let slot = slots_seen[winding_index];
            slots_seen[winding_index] += 1;
            let total = functional.physical_turns();
            let boundaries = turn_boundaries(total, slots_per_winding[winding_index], None);
            let (start, end) = (boundaries[slot], boundaries[slot + 1]);
            let style = Winder::decide_winding_style(
                functional.number_turns,
                functional.number_parallels,
                slots_per_winding[winding_index],
            );
            let proportion_slice = parallels_proportions(
                style,
                functional.number_turns,
                functional.number_parallels,
                start,
                end,
            );
            let turns_here = (end - start) as usize;

            let section_y = top - cursor - copper_height / 2.0;
            if cursor + copper_height > height {
                debug!(target: "coil.planar", "stack-up taller than the winding window");
                return Ok(false);
            }
            let available_copper =
                width - 2.0 * border - spacing * (turns_here.saturating_sub(1)) as f64;
            if available_copper <= 0.0 && turns_here > 0 {
                return Ok(false);
            }
            let trace_width = if turns_here > 0 {
                available_copper / turns_here as f64
            } else {
                0.0
            };

            let section_name = format!("{} section {}", functional.name, slot);
            let filling_factor = if turns_here > 0 {
                (turns_here as f64 * trace_width * copper_height)
                    / (width * copper_height)
            } else {
                0.0
            };
            sections.push(Section {
                name: section_name.clone(),
                section_type: ElectricalType::Conduction,
                partial_windings: vec![PartialWinding {
                    winding: functional.name.clone(),
                    parallels_proportion: proportion_slice.clone(),
                }],
                layers_orientation: WindingOrientation::Contiguous,
                coordinates: [centre[0], section_y],
                dimensions: [width, copper_height],
                winding_style: Some(style),
                margin: Some([border, border]),
                coordinate_system: Some(CoordinateSystem::Cartesian),
                filling_factor: Some(filling_factor),
                group: Some(group.clone()),
            });

            let layer_name = format!("{section_name} layer 0");
            layers.push(Layer {
                name: layer_name.clone(),
                layer_type: ElectricalType::Conduction,
                section: Some(section_name.clone()),
                partial_windings: vec![PartialWinding {
                    winding: functional.name.clone(),
                    parallels_proportion: proportion_slice,
                }],
                orientation: WindingOrientation::Contiguous,
                turns_alignment: Some(self.turns_alignment(Some(&section_name))),
                coordinates: [centre[0], section_y],
                dimensions: [width, copper_height],
                coordinate_system: Some(CoordinateSystem::Cartesian),
                filling_factor: Some(filling_factor),
                insulation_material: None,
                additional_coordinates: None,
            });

            // Traces walk left to right; widths already fill the row.
            let counts = parallel_turn_counts(
                &sections.last().unwrap().partial_windings[0].parallels_proportion,
                functional.number_turns,
            );
            let order = winding_order(style, &counts);
            let left = centre[0] - width / 2.0 + border;
            for (turn_index, &parallel) in order.iter().enumerate() {
                let x = left
                    + (trace_width + spacing) * turn_index as f64
                    + trace_width / 2.0;
                let ordinal = ordinals[winding_index][parallel];
                ordinals[winding_index][parallel] += 1;
                let length = turn_length(
                    self.bobbin.column_shape(),
                    self.bobbin.column_width(),
                    self.bobbin.column_depth(),
                    x,
                    CoordinateSystem::Cartesian,
                    0.0,
                );
                if length <= 0.0 {
                    return Ok(false);
                }
                turns.push(Turn {
                    name: format!("{} parallel {} turn {}", functional.name, parallel, ordinal),
                    layer: Some(layer_name.clone()),
                    section: Some(section_name.clone()),
                    winding: functional.name.clone(),
                    parallel,
                    coordinates: [x, section_y],
                    dimensions: Some([trace_width, copper_height]),
                    orientation: Some(TurnOrientation::Clockwise),
                    length,
                    rotation: None,
                    additional_coordinates: None,
                    coordinate_system: Some(CoordinateSystem::Cartesian),
                });
            }

            cursor += copper_height;
        }

        // Insulation layers inside the insulation sections.
        let insulation_sections: Vec<Section> = sections
            .iter()
            .filter(|s| s.section_type == ElectricalType::Insulation)
            .cloned()
            .collect();
        self.coil.sections_description = Some(sections);
        let mut all_layers = layers;
        for section in &insulation_sections {
            self.insulation_section_layers_planar(section, &mut all_layers);
        }
        self.coil.layers_description = Some(all_layers);
        self.coil.turns_description = Some(turns);

        debug!(
            target: "coil.planar",
            stack = stack_up.len(),
            "planar stack wound"
        );
        Ok(self.are_sections_and_layers_fitting() && self.coil.turns_description.is_some())
    }

    /// One monolithic dielectric layer per planar insulation section.
    fn insulation_section_layers_planar(&self, section: &Section, out: &mut Vec<Layer>) {
        out.push(Layer {
            name: format!("{} layer 0", section.name),
            layer_type: ElectricalType::Insulation,
            section: Some(section.name.clone()),
            partial_windings: Vec::new(),
            orientation: WindingOrientation::Contiguous,
            turns_alignment: None,
            coordinates: section.coordinates,
            dimensions: section.dimensions,
            coordinate_system: section.coordinate_system,
            filling_factor: Some(1.0),
            insulation_material: None,
            additional_coordinates: None,
        });
    }
}
