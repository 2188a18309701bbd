//! Turn placer.
//!
//! Walks every conduction layer in order and emits one [`Turn`] per physical
//! turn, advancing by the wire footprint (or by an even slot size under
//! `Spread` alignment) and computing the wound length from the bobbin
//! column shape.
//!
//! Polar radial coordinates are distances from the torus centre; the wound
//! length formulas measure the wire's depth from the window wall, so a turn
//! deeper in the window wraps a longer path around the core cross-section.

use tracing::debug;

use core_config::Settings;
use core_geometry::wound_distance_to_angle;
use core_model::bobbin::ColumnShape;
use core_model::coil::{ElectricalType, Turn, TurnOrientation};
use core_model::{CoilAlignment, CoordinateSystem, WindingStyle};

use crate::layers::{parallel_turn_counts, winding_order};
use crate::{CoilError, Winder};

/// Wound length of one turn around the column.
///
/// `radial` is the turn's x-coordinate for cartesian windows, or its radius
/// from the torus centre for polar windows (converted internally to depth
/// from the window wall). Column dimensions are half-dimensions.
pub(crate) fn turn_length(
    column_shape: ColumnShape,
    column_width: f64,
    column_depth: f64,
    radial: f64,
    coordinate_system: CoordinateSystem,
    window_radial_height: f64,
) -> f64 {
    let tau = 2.0 * std::f64::consts::PI;
    match coordinate_system {
        CoordinateSystem::Cartesian => match column_shape {
            ColumnShape::Round => tau * radial,
            ColumnShape::Oblong => tau * radial + 4.0 * (column_depth - column_width),
            ColumnShape::Rectangular | ColumnShape::Irregular => {
                4.0 * (column_depth + column_width) + tau * (radial - column_width)
            }
        },
        CoordinateSystem::Polar => {
            let depth_from_wall = window_radial_height - radial;
            match column_shape {
                ColumnShape::Round => tau * (depth_from_wall + column_width),
                ColumnShape::Oblong => {
                    tau * (depth_from_wall + column_width) + 4.0 * (column_depth - column_width)
                }
                ColumnShape::Rectangular | ColumnShape::Irregular => {
                    4.0 * (column_depth + column_width) + tau * depth_from_wall
                }
            }
        }
    }
}

/// Centre positions of `count` footprints of size `extent` inside the band
/// `[band_start, band_end]`, walking from `band_start` towards `band_end`,
/// under the given alignment.
pub(crate) fn aligned_positions(
    band_start: f64,
    band_end: f64,
    extent: f64,
    count: usize,
    alignment: CoilAlignment,
) -> Vec<f64> {
    let span = band_end - band_start;
    let occupied = extent * count as f64;
    let direction = if span >= 0.0 { 1.0 } else { -1.0 };
    let mut positions = Vec::with_capacity(count);
    match alignment {
        CoilAlignment::InnerOrTop => {
            for index in 0..count {
                positions.push(band_start + direction * extent * (index as f64 + 0.5));
            }
        }
        CoilAlignment::OuterOrBottom => {
            let start = band_end - direction * occupied;
            for index in 0..count {
                positions.push(start + direction * extent * (index as f64 + 0.5));
            }
        }
        CoilAlignment::Centered => {
            let start = band_start + (span - direction * occupied) / 2.0;
            for index in 0..count {
                positions.push(start + direction * extent * (index as f64 + 0.5));
            }
        }
        CoilAlignment::Spread => {
            let slot = span / count as f64;
            for index in 0..count {
                positions.push(band_start + slot * (index as f64 + 0.5));
            }
        }
    }
    positions
}

impl Winder {
    pub(crate) fn wind_by_turns(&mut self, _settings: &Settings) -> crate::WindResult {
        let Some(sections) = self.coil.sections_description.clone() else {
            return Err(CoilError::MissingPrerequisite("turns require sections"));
        };
        let Some(layers) = self.coil.layers_description.clone() else {
            return Err(CoilError::MissingPrerequisite("turns require layers"));
        };
        let window = self.winding_window()?.clone();
        let window_radial_height = window.radial_height.unwrap_or(0.0);
        let column_shape = self.bobbin.column_shape();
        let column_width = self.bobbin.column_width();
        let column_depth = self.bobbin.column_depth();

        // Turn ordinal per (winding, parallel), so names stay unique across
        // sections.
        let mut ordinals: Vec<Vec<u64>> = self
            .coil
            .functional_description
            .iter()
            .map(|w| vec![0u64; w.number_parallels as usize])
            .collect();

        let mut turns: Vec<Turn> = Vec::new();
        for section in &sections {
            if section.section_type != ElectricalType::Conduction {
                continue;
            }
            let margin = section.margin.unwrap_or([0.0, 0.0]);
            let style = section
                .winding_style
                .unwrap_or(WindingStyle::WindByConsecutiveTurns);
            for layer in layers.iter().filter(|l| {
                l.section.as_deref() == Some(section.name.as_str())
                    && l.layer_type == ElectricalType::Conduction
            }) {
                let partial = layer
                    .partial_windings
                    .first()
                    .ok_or(CoilError::MissingPrerequisite("conduction layer without winding"))?;
                let winding_index = self
                    .coil
                    .winding_index_by_name(&partial.winding)
                    .ok_or(CoilError::MissingPrerequisite("layer references unknown winding"))?;
                let functional = &self.coil.functional_description[winding_index];
                let wire = &self.wires[winding_index];
                let wire_bbox = wire.maximum_outer_dimensions()?;
                let counts =
                    parallel_turn_counts(&partial.parallels_proportion, functional.number_turns);
                let order = winding_order(style, &counts);
                if order.is_empty() {
                    continue;
                }
                let alignment = layer.turns_alignment.unwrap_or(self.turns_alignment(None));
                let coordinate_system = layer
                    .coordinate_system
                    .unwrap_or(CoordinateSystem::Cartesian);

                let placements: Vec<[f64; 2]> = match coordinate_system {
                    CoordinateSystem::Cartesian => {
                        let vertical = layer.dimensions[0] <= layer.dimensions[1];
                        if vertical {
                            // Vertical strip: walk top-down along y.
                            let band_start =
                                layer.coordinates[1] + layer.dimensions[1] / 2.0 - margin[0];
                            let band_end =
                                layer.coordinates[1] - layer.dimensions[1] / 2.0 + margin[1];
                            aligned_positions(
                                band_start,
                                band_end,
                                wire_bbox[1],
                                order.len(),
                                alignment,
                            )
                            .into_iter()
                            .map(|y| [layer.coordinates[0], y])
                            .collect()
                        } else {
                            // Horizontal row: walk left-right along x.
                            let band_start =
                                layer.coordinates[0] - layer.dimensions[0] / 2.0 + margin[0];
                            let band_end =
                                layer.coordinates[0] + layer.dimensions[0] / 2.0 - margin[1];
                            aligned_positions(
                                band_start,
                                band_end,
                                wire_bbox[0],
                                order.len(),
                                alignment,
                            )
                            .into_iter()
                            .map(|x| [x, layer.coordinates[1]])
                            .collect()
                        }
                    }
                    CoordinateSystem::Polar => {
                        let radius = layer.coordinates[0];
                        let wire_angle = wound_distance_to_angle(wire_bbox[1], radius);
                        if wire_angle.is_nan() {
                            return Ok(false);
                        }
                        let margin_start = wound_distance_to_angle(margin[0], radius);
                        let margin_end = wound_distance_to_angle(margin[1], radius);
                        let band_start =
                            layer.coordinates[1] - layer.dimensions[1] / 2.0 + margin_start;
                        let band_end =
                            layer.coordinates[1] + layer.dimensions[1] / 2.0 - margin_end;
                        aligned_positions(band_start, band_end, wire_angle, order.len(), alignment)
                            .into_iter()
                            .map(|angle| [radius, angle])
                            .collect()
                    }
                };

                for (&parallel, coordinates) in order.iter().zip(placements) {
                    let ordinal = ordinals[winding_index][parallel];
                    ordinals[winding_index][parallel] += 1;
                    let length = turn_length(
                        column_shape,
                        column_width,
                        column_depth,
                        coordinates[0],
                        coordinate_system,
                        window_radial_height,
                    );
                    if length <= 0.0 {
                        debug!(target: "coil.turns", section = %section.name, "turn length not positive");
                        return Ok(false);
                    }
                    turns.push(Turn {
                        name: format!("{} parallel {} turn {}", functional.name, parallel, ordinal),
                        layer: Some(layer.name.clone()),
                        section: Some(section.name.clone()),
                        winding: functional.name.clone(),
                        parallel,
                        coordinates,
                        dimensions: Some(wire_bbox),
                        orientation: Some(TurnOrientation::Clockwise),
                        length,
                        rotation: (coordinate_system == CoordinateSystem::Polar)
                            .then_some(coordinates[1]),
                        additional_coordinates: None,
                        coordinate_system: Some(coordinate_system),
                    });
                }
            }
        }
        debug!(target: "coil.turns", count = turns.len(), "turns placed");
        self.coil.turns_description = Some(turns);
        Ok(true)
    }
}
