//! Layer planner.
//!
//! Subdivides every conduction section into layers sized by the wire
//! footprint, and materialises the insulation plan's layers inside
//! insulation sections.
//!
//! Rectangular windows: overlapping layers are vertical strips one wire
//! wide; contiguous layers are horizontal rows one wire tall. Polar windows
//! only overlap: each layer is a thin annular arc one wire thick, filled
//! from the window wall inward, with the turn capacity recomputed at each
//! layer's radius.

use tracing::{debug, trace};

use core_config::Settings;
use core_geometry::wound_distance_to_angle;
use core_model::coil::{ElectricalType, Layer, PartialWinding, Section};
use core_model::{CoordinateSystem, WindingOrientation, WindingStyle, WireType};

use crate::{CoilError, Winder};

/// Integer per-parallel turn counts a container holds, from its proportion
/// slice.
pub(crate) fn parallel_turn_counts(proportions: &[f64], number_turns: u64) -> Vec<u64> {
    proportions
        .iter()
        .map(|p| (p * number_turns as f64).round() as u64)
        .collect()
}

/// Emit the (parallel index per physical turn) sequence of a container in
/// winding order.
pub(crate) fn winding_order(style: WindingStyle, counts: &[u64]) -> Vec<usize> {
    let mut order = Vec::with_capacity(counts.iter().sum::<u64>() as usize);
    match style {
        WindingStyle::WindByConsecutiveTurns => {
            for (parallel, &count) in counts.iter().enumerate() {
                for _ in 0..count {
                    order.push(parallel);
                }
            }
        }
        WindingStyle::WindByConsecutiveParallels => {
            let longest = counts.iter().copied().max().unwrap_or(0);
            for turn in 0..longest {
                for (parallel, &count) in counts.iter().enumerate() {
                    if turn < count {
                        order.push(parallel);
                    }
                }
            }
        }
    }
    order
}

/// Distribute a winding-order sequence over layers with the given per-layer
/// capacities, returning per-layer per-parallel counts.
fn chunk_by_capacity(order: &[usize], capacities: &[u64], parallels: usize) -> Vec<Vec<u64>> {
    let mut result = Vec::with_capacity(capacities.len());
    let mut cursor = 0usize;
    for (index, &capacity) in capacities.iter().enumerate() {
        let mut counts = vec![0u64; parallels];
        let take = if index + 1 == capacities.len() {
            order.len() - cursor
        } else {
            (capacity as usize).min(order.len() - cursor)
        };
        for &parallel in &order[cursor..cursor + take] {
            counts[parallel] += 1;
        }
        cursor += take;
        result.push(counts);
    }
    result
}

impl Winder {
    pub(crate) fn wind_by_layers(&mut self, settings: &Settings) -> crate::WindResult {
        let Some(sections) = self.coil.sections_description.clone() else {
            return Err(CoilError::MissingPrerequisite("layers require sections"));
        };
        let mut layers: Vec<Layer> = Vec::new();
        for section in &sections {
            let ok = match section.section_type {
                ElectricalType::Conduction => match section.coordinate_system {
                    Some(CoordinateSystem::Polar) => {
                        self.round_section_layers(section, &mut layers)?
                    }
                    _ => self.rectangular_section_layers(section, settings, &mut layers)?,
                },
                ElectricalType::Insulation => {
                    self.insulation_section_layers(section, &mut layers);
                    true
                }
            };
            if !ok {
                return Ok(false);
            }
        }
        debug!(target: "coil.layers", count = layers.len(), "layers planned");
        self.coil.layers_description = Some(layers);
        Ok(true)
    }

    fn rectangular_section_layers(
        &self,
        section: &Section,
        settings: &Settings,
        out: &mut Vec<Layer>,
    ) -> Result<bool, CoilError> {
        let partial = section
            .partial_windings
            .first()
            .ok_or(CoilError::MissingPrerequisite("conduction section without winding"))?;
        let winding_index = self
            .coil
            .winding_index_by_name(&partial.winding)
            .ok_or(CoilError::MissingPrerequisite("section references unknown winding"))?;
        let functional = &self.coil.functional_description[winding_index];
        let wire = &self.wires[winding_index];
        let wire_bbox = wire.maximum_outer_dimensions()?;
        let margin = section.margin.unwrap_or([0.0, 0.0]);
        let counts = parallel_turn_counts(&partial.parallels_proportion, functional.number_turns);
        let physical_turns: u64 = counts.iter().sum();
        if physical_turns == 0 {
            return Ok(true);
        }
        let orientation = section.layers_orientation;
        let [section_width, section_height] = section.dimensions;

        let (strip_extent, turn_extent, wire_along_strip, wire_along_turn) = match orientation {
            WindingOrientation::Overlapping => {
                (section_width, section_height, wire_bbox[0], wire_bbox[1])
            }
            WindingOrientation::Contiguous => {
                (section_height, section_width, wire_bbox[1], wire_bbox[0])
            }
        };
        let usable_turn_extent = turn_extent - margin[0] - margin[1];
        if usable_turn_extent.is_nan() || wire_along_turn.is_nan() {
            return Ok(false);
        }

        let one_turn_per_layer = matches!(wire.wire_type, WireType::Foil)
            || (wire.wire_type == WireType::Rectangular
                && orientation == WindingOrientation::Contiguous
                && settings.coil.only_one_turn_per_layer_in_contiguous_rectangular);
        let max_turns_per_layer = if one_turn_per_layer {
            1
        } else {
            ((usable_turn_extent / wire_along_turn).floor() as u64).max(1)
        };
        let max_fitting_layers = ((strip_extent / wire_along_strip).floor() as u64).max(1);
        let number_layers = physical_turns
            .div_ceil(max_turns_per_layer)
            .min(max_fitting_layers)
            .clamp(1, physical_turns);
        let turns_per_layer = physical_turns.div_ceil(number_layers);

        let style = section
            .winding_style
            .unwrap_or(WindingStyle::WindByConsecutiveTurns);
        let order = winding_order(style, &counts);
        let capacities = vec![turns_per_layer; number_layers as usize];
        let per_layer_counts = chunk_by_capacity(&order, &capacities, counts.len());

        for (index, layer_counts) in per_layer_counts.iter().enumerate() {
            let turns_here: u64 = layer_counts.iter().sum();
            if turns_here == 0 {
                continue;
            }
            let offset = wire_along_strip * (index as f64 + 0.5) - strip_extent / 2.0;
            let (dimensions, coordinates) = match orientation {
                WindingOrientation::Overlapping => (
                    [wire_bbox[0], section_height],
                    [section.coordinates[0] + offset, section.coordinates[1]],
                ),
                WindingOrientation::Contiguous => (
                    [section_width, wire_bbox[1]],
                    // Rows stack top-down, like contiguous sections.
                    [section.coordinates[0], section.coordinates[1] - offset],
                ),
            };
            let area = dimensions[0] * dimensions[1];
            let filling_factor =
                turns_here as f64 * wire_bbox[0] * wire_bbox[1] / area.max(f64::MIN_POSITIVE);
            if filling_factor.is_nan() {
                return Ok(false);
            }
            trace!(target: "coil.layers", section = %section.name, index, turns = turns_here, filling_factor, "conduction layer");
            out.push(Layer {
                name: format!("{} layer {}", section.name, index),
                layer_type: ElectricalType::Conduction,
                section: Some(section.name.clone()),
                partial_windings: vec![PartialWinding {
                    winding: partial.winding.clone(),
                    parallels_proportion: layer_counts
                        .iter()
                        .map(|c| *c as f64 / functional.number_turns as f64)
                        .collect(),
                }],
                orientation,
                turns_alignment: Some(self.turns_alignment(Some(&section.name))),
                coordinates,
                dimensions,
                coordinate_system: Some(CoordinateSystem::Cartesian),
                filling_factor: Some(filling_factor),
                insulation_material: None,
                additional_coordinates: None,
            });
        }
        Ok(true)
    }

    /// Polar layering: annular arcs filled wall-inward, with the capacity
    /// simulation and outer-in correction.
    fn round_section_layers(
        &self,
        section: &Section,
        out: &mut Vec<Layer>,
    ) -> Result<bool, CoilError> {
        let partial = section
            .partial_windings
            .first()
            .ok_or(CoilError::MissingPrerequisite("conduction section without winding"))?;
        let winding_index = self
            .coil
            .winding_index_by_name(&partial.winding)
            .ok_or(CoilError::MissingPrerequisite("section references unknown winding"))?;
        let functional = &self.coil.functional_description[winding_index];
        let wire = &self.wires[winding_index];
        let wire_bbox = wire.maximum_outer_dimensions()?;
        let margin = section.margin.unwrap_or([0.0, 0.0]);
        let counts = parallel_turn_counts(&partial.parallels_proportion, functional.number_turns);
        let physical_turns: u64 = counts.iter().sum();
        if physical_turns == 0 {
            return Ok(true);
        }

        let section_angle = section.dimensions[1];
        let outer_radius = section.coordinates[0] + section.dimensions[0] / 2.0;
        let (capacities, radii) = match number_layers_needed_and_turn_capacities(
            outer_radius,
            section_angle,
            margin,
            wire_bbox,
            physical_turns,
        ) {
            Some(plan) => plan,
            None => return Ok(false),
        };

        let style = section
            .winding_style
            .unwrap_or(WindingStyle::WindByConsecutiveTurns);
        let order = winding_order(style, &counts);
        let per_layer_counts = chunk_by_capacity(&order, &capacities, counts.len());

        for (index, layer_counts) in per_layer_counts.iter().enumerate() {
            let turns_here: u64 = layer_counts.iter().sum();
            if turns_here == 0 {
                continue;
            }
            let radius = radii[index];
            let outer = radius + wire_bbox[0] / 2.0;
            let inner = radius - wire_bbox[0] / 2.0;
            let area =
                std::f64::consts::PI * (outer * outer - inner * inner) * section_angle / 360.0;
            let filling_factor =
                turns_here as f64 * wire_bbox[0] * wire_bbox[1] / area.max(f64::MIN_POSITIVE);
            if filling_factor.is_nan() {
                return Ok(false);
            }
            trace!(target: "coil.layers", section = %section.name, index, turns = turns_here, filling_factor, "polar conduction layer");
            out.push(Layer {
                name: format!("{} layer {}", section.name, index),
                layer_type: ElectricalType::Conduction,
                section: Some(section.name.clone()),
                partial_windings: vec![PartialWinding {
                    winding: partial.winding.clone(),
                    parallels_proportion: layer_counts
                        .iter()
                        .map(|c| *c as f64 / functional.number_turns as f64)
                        .collect(),
                }],
                orientation: WindingOrientation::Overlapping,
                turns_alignment: Some(self.turns_alignment(Some(&section.name))),
                coordinates: [radius, section.coordinates[1]],
                dimensions: [wire_bbox[0], section_angle],
                coordinate_system: Some(CoordinateSystem::Polar),
                filling_factor: Some(filling_factor),
                insulation_material: None,
                additional_coordinates: None,
            });
        }
        Ok(true)
    }

    fn insulation_section_layers(&self, section: &Section, out: &mut Vec<Layer>) {
        let Some(&(a, b)) = self.insulation_section_pairs.get(&section.name) else {
            return;
        };
        let orientation = self.winding_orientation;
        let coordinate_system = section
            .coordinate_system
            .unwrap_or(CoordinateSystem::Cartesian);
        out.extend(self.insulation_plan.build_layers(
            a,
            b,
            &section.name,
            section.coordinates,
            section.dimensions,
            orientation,
            coordinate_system,
        ));
    }
}

/// Simulate polar layering from the window wall inward. Returns per-layer
/// turn capacities (corrected outer-in so they sum to `physical_turns`) and
/// each layer's centre radius, or `None` when a single wire cannot fit.
fn number_layers_needed_and_turn_capacities(
    outer_radius: f64,
    section_angle: f64,
    margin: [f64; 2],
    wire_bbox: [f64; 2],
    physical_turns: u64,
) -> Option<(Vec<u64>, Vec<f64>)> {
    let mut capacities = Vec::new();
    let mut radii = Vec::new();
    let mut placed = 0u64;
    let mut index = 0usize;
    while placed < physical_turns {
        let radius = outer_radius - wire_bbox[0] * (index as f64 + 0.5);
        if radius <= wire_bbox[0] / 2.0 {
            // Out of radial room: remaining turns pile into the innermost
            // layer and show up as overflow in its filling factor.
            if capacities.is_empty() {
                return None;
            }
            *capacities.last_mut().unwrap() += physical_turns - placed;
            placed = physical_turns;
            break;
        }
        let wire_angle = wound_distance_to_angle(wire_bbox[1], radius);
        if wire_angle.is_nan() || wire_angle >= 180.0 {
            return None;
        }
        let margin_angle = wound_distance_to_angle(margin[0] + margin[1], radius);
        let available_angle = (section_angle - margin_angle).max(0.0);
        let fits = ((available_angle / wire_angle).floor() as u64).max(1);
        capacities.push(fits);
        radii.push(radius);
        placed += fits;
        index += 1;
    }
    // Correction: excess capacity is walked off from the outermost layer in.
    let mut excess = capacities.iter().sum::<u64>().saturating_sub(physical_turns);
    while excess > 0 {
        let mut shrunk = false;
        for capacity in capacities.iter_mut() {
            if excess == 0 {
                break;
            }
            if *capacity > 1 {
                *capacity -= 1;
                excess -= 1;
                shrunk = true;
            }
        }
        if !shrunk {
            break;
        }
    }
    Some((capacities, radii))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winding_order_consecutive_turns_is_parallel_major() {
        let order = winding_order(WindingStyle::WindByConsecutiveTurns, &[2, 3]);
        assert_eq!(order, vec![0, 0, 1, 1, 1]);
    }

    #[test]
    fn winding_order_consecutive_parallels_is_turn_major() {
        let order = winding_order(WindingStyle::WindByConsecutiveParallels, &[2, 3]);
        assert_eq!(order, vec![0, 1, 0, 1, 1]);
    }

    #[test]
    fn chunking_preserves_every_turn() {
        let order = winding_order(WindingStyle::WindByConsecutiveTurns, &[5, 5]);
        let chunks = chunk_by_capacity(&order, &[4, 4, 4], 2);
        let total: u64 = chunks.iter().flatten().sum();
        assert_eq!(total, 10);
        assert_eq!(chunks[0], vec![4, 0]);
        assert_eq!(chunks[1], vec![1, 3]);
        assert_eq!(chunks[2], vec![0, 2]);
    }

    #[test]
    fn polar_capacity_simulation_fills_wall_first() {
        // 10 mm wall radius, 1x2 mm wire: the wall layer holds 29 turns, so
        // 40 turns need a second layer further in.
        let plan = number_layers_needed_and_turn_capacities(
            10.0e-3,
            360.0,
            [0.0, 0.0],
            [1.0e-3, 2.0e-3],
            40,
        )
        .unwrap();
        let (capacities, radii) = plan;
        assert_eq!(capacities.len(), 2);
        assert_eq!(capacities.iter().sum::<u64>(), 40);
        assert!(radii[0] > radii[1]);
    }

    #[test]
    fn polar_wire_angle_over_180_refuses() {
        // A wire taller than the semi-perimeter cannot wrap.
        let plan = number_layers_needed_and_turn_capacities(
            1.0e-3,
            360.0,
            [0.0, 0.0],
            [0.5e-3, 4.0e-3],
            4,
        );
        assert!(plan.is_none());
    }

    #[test]
    fn correction_walks_outer_in() {
        let plan = number_layers_needed_and_turn_capacities(
            10.0e-3,
            360.0,
            [0.0, 0.0],
            [1.0e-3, 2.0e-3],
            16,
        )
        .unwrap();
        let (capacities, _) = plan;
        // Total capacity equals the requested turns exactly after correction.
        assert_eq!(capacities.iter().sum::<u64>(), 16);
    }
}
