//! Delimit and compact.
//!
//! **Delimit** tightens every conduction layer to the bounding box of its
//! turns, every conduction section to the box of its layers, and printed
//! groups (height axis) to the box of their sections. Insulation containers
//! keep their planned geometry.
//!
//! **Compact** then re-packs the delimited sections along the stacking axis
//! per the section alignment, places each section on the orthogonal axis
//! per its own turns alignment, and drags layers and turns along, with turn
//! lengths recomputed at the new radii. Polar windows run the radial pass
//! first, then the angular pass with margin angles taken at each section's
//! radius. Both passes are idempotent: running compact twice equals running
//! it once.

use ahash::AHashMap;
use tracing::debug;

use core_config::Settings;
use core_geometry::wound_distance_to_angle;
use core_model::bobbin::WindingWindowShape;
use core_model::coil::{ElectricalType, WiringTechnology};
use core_model::{CoilAlignment, CoordinateSystem, WindingOrientation};

use crate::turns::{aligned_positions, turn_length};
use crate::{CoilError, Winder};

/// Pack `extents` (with per-item leading/trailing gaps) into the span from
/// `start` towards `end`, returning centre positions. The span may descend.
fn pack_positions(
    extents: &[f64],
    gaps: &[[f64; 2]],
    start: f64,
    end: f64,
    alignment: CoilAlignment,
) -> Vec<f64> {
    let span = end - start;
    let direction = if span >= 0.0 { 1.0 } else { -1.0 };
    let occupied: f64 = extents
        .iter()
        .zip(gaps)
        .map(|(e, g)| e + g[0] + g[1])
        .sum();
    let count = extents.len();
    let padding = match alignment {
        CoilAlignment::Spread if count > 1 => {
            (span.abs() - occupied).max(0.0) / (count as f64 - 1.0)
        }
        _ => 0.0,
    };
    let mut cursor = match alignment {
        CoilAlignment::InnerOrTop | CoilAlignment::Spread => start,
        CoilAlignment::OuterOrBottom => end - direction * occupied,
        CoilAlignment::Centered => start + direction * (span.abs() - occupied) / 2.0,
    };
    let mut positions = Vec::with_capacity(count);
    for (extent, gap) in extents.iter().zip(gaps) {
        cursor += direction * gap[0];
        positions.push(cursor + direction * extent / 2.0);
        cursor += direction * (extent + gap[1] + padding);
    }
    positions
}

struct Bbox {
    min: [f64; 2],
    max: [f64; 2],
}

impl Bbox {
    fn new() -> Self {
        Self {
            min: [f64::INFINITY, f64::INFINITY],
            max: [f64::NEG_INFINITY, f64::NEG_INFINITY],
        }
    }

    fn include(&mut self, centre: [f64; 2], dimensions: [f64; 2]) {
        for axis in 0..2 {
            self.min[axis] = self.min[axis].min(centre[axis] - dimensions[axis] / 2.0);
            self.max[axis] = self.max[axis].max(centre[axis] + dimensions[axis] / 2.0);
        }
    }

    fn is_empty(&self) -> bool {
        self.min[0] > self.max[0]
    }

    fn centre(&self) -> [f64; 2] {
        [
            (self.min[0] + self.max[0]) / 2.0,
            (self.min[1] + self.max[1]) / 2.0,
        ]
    }

    fn dimensions(&self) -> [f64; 2] {
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }
}

impl Winder {
    pub(crate) fn delimit_and_compact_with(&mut self, settings: &Settings) -> crate::WindResult {
        if self.coil.turns_description.is_none() {
            return Err(CoilError::MissingPrerequisite(
                "delimit and compact requires placed turns",
            ));
        }
        self.delimit()?;
        let shape = self.bobbin.winding_window_shape()?;
        match shape {
            WindingWindowShape::Rectangular => self.compact_rectangular_window()?,
            WindingWindowShape::Round => self.compact_round_window()?,
        }
        if settings.coil.fill_sections_with_margin_tape {
            self.fill_sections_with_margin_tape();
        }
        self.recompute_turn_lengths()?;
        if settings.coil.include_additional_coordinates && shape == WindingWindowShape::Round {
            return self.wind_toroidal_additional_turns();
        }
        Ok(true)
    }

    /// Tighten layers to their turns, sections to their layers, printed
    /// groups (height axis) to their sections.
    fn delimit(&mut self) -> Result<(), CoilError> {
        let turns = self
            .coil
            .turns_description
            .clone()
            .ok_or(CoilError::MissingPrerequisite("delimit requires turns"))?;

        // Turn bounding boxes per layer. Polar boxes live in (radius,
        // angle) space, the angular footprint taken at each turn's radius.
        let mut per_layer: AHashMap<String, Bbox> = AHashMap::new();
        for turn in &turns {
            let Some(layer) = turn.layer.clone() else { continue };
            let dims = turn.dimensions.unwrap_or([0.0, 0.0]);
            let footprint = match turn.coordinate_system {
                Some(CoordinateSystem::Polar) => [
                    dims[0],
                    wound_distance_to_angle(dims[1], turn.coordinates[0].max(f64::MIN_POSITIVE)),
                ],
                _ => dims,
            };
            per_layer
                .entry(layer)
                .or_insert_with(Bbox::new)
                .include(turn.coordinates, footprint);
        }

        if let Some(layers) = self.coil.layers_description.as_mut() {
            for layer in layers.iter_mut() {
                if layer.layer_type != ElectricalType::Conduction {
                    continue;
                }
                if let Some(bbox) = per_layer.get(&layer.name)
                    && !bbox.is_empty()
                {
                    layer.coordinates = bbox.centre();
                    layer.dimensions = bbox.dimensions();
                }
            }
        }

        let layers = self.coil.layers_description.clone().unwrap_or_default();
        if let Some(sections) = self.coil.sections_description.as_mut() {
            for section in sections.iter_mut() {
                if section.section_type != ElectricalType::Conduction {
                    continue;
                }
                let mut bbox = Bbox::new();
                for layer in layers
                    .iter()
                    .filter(|l| l.section.as_deref() == Some(section.name.as_str()))
                {
                    bbox.include(layer.coordinates, layer.dimensions);
                }
                if !bbox.is_empty() {
                    section.coordinates = bbox.centre();
                    section.dimensions = bbox.dimensions();
                }
            }
        }

        let sections = self.coil.sections_description.clone().unwrap_or_default();
        if let Some(groups) = self.coil.groups_description.as_mut() {
            for group in groups.iter_mut() {
                if group.group_type != WiringTechnology::Printed {
                    continue;
                }
                let mut bbox = Bbox::new();
                for section in sections
                    .iter()
                    .filter(|s| s.group.as_deref() == Some(group.name.as_str()))
                {
                    bbox.include(section.coordinates, section.dimensions);
                }
                if !bbox.is_empty() {
                    // Printed groups delimit on the height axis only.
                    group.coordinates[1] = bbox.centre()[1];
                    group.dimensions[1] = bbox.dimensions()[1];
                }
            }
        }
        debug!(target: "coil.compact", "delimited to tight bounding boxes");
        Ok(())
    }

    fn compact_rectangular_window(&mut self) -> Result<(), CoilError> {
        let window = self.winding_window()?.clone();
        let width = window.width.unwrap_or(0.0);
        let height = window.height.unwrap_or(0.0);
        let centre = window.centre();
        let orientation = self.winding_orientation;
        let alignment = self.section_alignment;
        let Some(sections) = self.coil.sections_description.clone() else {
            return Ok(());
        };

        // Stacking axis packing. Margins act as spacing only when the
        // stacking axis is the turn axis (contiguous winding).
        let (stack_axis, span_start, span_end) = match orientation {
            WindingOrientation::Overlapping => (0usize, centre[0] - width / 2.0, centre[0] + width / 2.0),
            WindingOrientation::Contiguous => (1usize, centre[1] + height / 2.0, centre[1] - height / 2.0),
        };
        let extents: Vec<f64> = sections.iter().map(|s| s.dimensions[stack_axis]).collect();
        let gaps: Vec<[f64; 2]> = sections
            .iter()
            .map(|s| match orientation {
                WindingOrientation::Overlapping => [0.0, 0.0],
                WindingOrientation::Contiguous => s.margin.unwrap_or([0.0, 0.0]),
            })
            .collect();
        let positions = pack_positions(&extents, &gaps, span_start, span_end, alignment);

        for (section, position) in sections.iter().zip(&positions) {
            let delta_stack = position - section.coordinates[stack_axis];
            // Orthogonal placement per the section's own turns alignment.
            let orthogonal_axis = 1 - stack_axis;
            let delta_orthogonal = if section.section_type == ElectricalType::Conduction {
                let margin = section.margin.unwrap_or([0.0, 0.0]);
                let (band_start, band_end) = if orthogonal_axis == 1 {
                    (
                        centre[1] + height / 2.0 - margin[0],
                        centre[1] - height / 2.0 + margin[1],
                    )
                } else {
                    (
                        centre[0] - width / 2.0 + margin[0],
                        centre[0] + width / 2.0 - margin[1],
                    )
                };
                let target = aligned_positions(
                    band_start,
                    band_end,
                    section.dimensions[orthogonal_axis],
                    1,
                    self.turns_alignment(Some(&section.name)),
                )[0];
                target - section.coordinates[orthogonal_axis]
            } else {
                0.0
            };
            let mut delta = [0.0f64; 2];
            delta[stack_axis] = delta_stack;
            delta[orthogonal_axis] = delta_orthogonal;
            self.shift_section(&section.name, delta);
        }
        Ok(())
    }

    fn compact_round_window(&mut self) -> Result<(), CoilError> {
        let window = self.winding_window()?.clone();
        let radial_height = window.radial_height.unwrap_or(0.0);
        let window_angle = window.angle.unwrap_or(360.0);
        let orientation = self.winding_orientation;
        let alignment = self.section_alignment;
        let Some(sections) = self.coil.sections_description.clone() else {
            return Ok(());
        };

        match orientation {
            WindingOrientation::Overlapping => {
                // Radial pass in depth-from-wall coordinates, then the
                // angular placement per turns alignment.
                let extents: Vec<f64> = sections.iter().map(|s| s.dimensions[0]).collect();
                let gaps = vec![[0.0f64; 2]; sections.len()];
                let depths = pack_positions(&extents, &gaps, 0.0, radial_height, alignment);
                for (section, depth) in sections.iter().zip(&depths) {
                    let target_radius = radial_height - depth;
                    let delta_radial = target_radius - section.coordinates[0];
                    let delta_angular = if section.section_type == ElectricalType::Conduction {
                        let margin = section.margin.unwrap_or([0.0, 0.0]);
                        let radius = target_radius.max(f64::MIN_POSITIVE);
                        let band_start = wound_distance_to_angle(margin[0], radius);
                        let band_end = window_angle - wound_distance_to_angle(margin[1], radius);
                        let target = aligned_positions(
                            band_start,
                            band_end,
                            section.dimensions[1],
                            1,
                            self.turns_alignment(Some(&section.name)),
                        )[0];
                        target - section.coordinates[1]
                    } else {
                        0.0
                    };
                    self.shift_polar_section(&section.name, delta_radial, delta_angular);
                }
            }
            WindingOrientation::Contiguous => {
                // Angular pass with margin angles at each section's radius.
                let extents: Vec<f64> = sections.iter().map(|s| s.dimensions[1]).collect();
                let gaps: Vec<[f64; 2]> = sections
                    .iter()
                    .map(|s| {
                        let margin = s.margin.unwrap_or([0.0, 0.0]);
                        let radius = (s.coordinates[0] + s.dimensions[0] / 2.0)
                            .max(f64::MIN_POSITIVE);
                        [
                            wound_distance_to_angle(margin[0], radius),
                            wound_distance_to_angle(margin[1], radius),
                        ]
                    })
                    .collect();
                let positions = pack_positions(&extents, &gaps, 0.0, window_angle, alignment);
                for (section, position) in sections.iter().zip(&positions) {
                    let delta_angular = position - section.coordinates[1];
                    self.shift_polar_section(&section.name, 0.0, delta_angular);
                }
            }
        }
        Ok(())
    }

    fn shift_section(&mut self, section_name: &str, delta: [f64; 2]) {
        if delta[0].abs() < 1e-15 && delta[1].abs() < 1e-15 {
            return;
        }
        if let Some(sections) = self.coil.sections_description.as_mut()
            && let Some(section) = sections.iter_mut().find(|s| s.name == section_name)
        {
            section.coordinates[0] += delta[0];
            section.coordinates[1] += delta[1];
        }
        if let Some(layers) = self.coil.layers_description.as_mut() {
            for layer in layers
                .iter_mut()
                .filter(|l| l.section.as_deref() == Some(section_name))
            {
                layer.coordinates[0] += delta[0];
                layer.coordinates[1] += delta[1];
            }
        }
        if let Some(turns) = self.coil.turns_description.as_mut() {
            for turn in turns
                .iter_mut()
                .filter(|t| t.section.as_deref() == Some(section_name))
            {
                turn.coordinates[0] += delta[0];
                turn.coordinates[1] += delta[1];
            }
        }
    }

    fn shift_polar_section(&mut self, section_name: &str, delta_radial: f64, delta_angular: f64) {
        self.shift_section(section_name, [delta_radial, delta_angular]);
        if delta_angular.abs() < 1e-15 {
            return;
        }
        if let Some(turns) = self.coil.turns_description.as_mut() {
            for turn in turns
                .iter_mut()
                .filter(|t| t.section.as_deref() == Some(section_name))
            {
                if let Some(rotation) = turn.rotation.as_mut() {
                    *rotation += delta_angular;
                }
            }
        }
    }

    /// Inflate conduction section margins to absorb residual window space
    /// along the turn axis. A no-op when the sections already span the
    /// window.
    fn fill_sections_with_margin_tape(&mut self) {
        let Ok(window) = self.winding_window().cloned() else {
            return;
        };
        let orientation = self.winding_orientation;
        let Some(sections) = self.coil.sections_description.as_mut() else {
            return;
        };
        for section in sections.iter_mut() {
            if section.section_type != ElectricalType::Conduction {
                continue;
            }
            let margin = section.margin.unwrap_or([0.0, 0.0]);
            let residual = match (section.coordinate_system, orientation) {
                (Some(CoordinateSystem::Polar), WindingOrientation::Overlapping) => {
                    let radius = (section.coordinates[0] + section.dimensions[0] / 2.0)
                        .max(f64::MIN_POSITIVE);
                    let span = core_geometry::angle_to_wound_distance(
                        window.angle.unwrap_or(360.0) - section.dimensions[1],
                        radius,
                    );
                    span - margin[0] - margin[1]
                }
                (Some(CoordinateSystem::Polar), WindingOrientation::Contiguous) => 0.0,
                (_, WindingOrientation::Overlapping) => {
                    window.height.unwrap_or(0.0) - section.dimensions[1] - margin[0] - margin[1]
                }
                (_, WindingOrientation::Contiguous) => {
                    window.width.unwrap_or(0.0) - section.dimensions[0] - margin[0] - margin[1]
                }
            };
            if residual > 0.0 {
                section.margin = Some([margin[0] + residual / 2.0, margin[1] + residual / 2.0]);
            }
        }
    }

    /// Re-derive every turn's wound length from its (possibly shifted)
    /// position. Toroidal outer-side lengths are overwritten afterwards by
    /// the outer-turn placer when it runs.
    fn recompute_turn_lengths(&mut self) -> Result<(), CoilError> {
        let window = self.winding_window()?.clone();
        let window_radial_height = window.radial_height.unwrap_or(0.0);
        let column_shape = self.bobbin.column_shape();
        let column_width = self.bobbin.column_width();
        let column_depth = self.bobbin.column_depth();
        let Some(turns) = self.coil.turns_description.as_mut() else {
            return Ok(());
        };
        for turn in turns.iter_mut() {
            let coordinate_system = turn
                .coordinate_system
                .unwrap_or(CoordinateSystem::Cartesian);
            turn.length = turn_length(
                column_shape,
                column_width,
                column_depth,
                turn.coordinates[0],
                coordinate_system,
                window_radial_height,
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn packing_flush_to_the_first_edge() {
        let positions = pack_positions(
            &[2.0, 4.0],
            &[[0.0, 0.0], [0.0, 0.0]],
            0.0,
            10.0,
            CoilAlignment::InnerOrTop,
        );
        assert!(close(positions[0], 1.0));
        assert!(close(positions[1], 4.0));
    }

    #[test]
    fn packing_flush_to_the_last_edge() {
        let positions = pack_positions(
            &[2.0, 4.0],
            &[[0.0, 0.0], [0.0, 0.0]],
            0.0,
            10.0,
            CoilAlignment::OuterOrBottom,
        );
        assert!(close(positions[0], 5.0));
        assert!(close(positions[1], 8.0));
    }

    #[test]
    fn packing_centres_the_block() {
        let positions = pack_positions(
            &[2.0, 2.0],
            &[[0.0, 0.0], [0.0, 0.0]],
            0.0,
            10.0,
            CoilAlignment::Centered,
        );
        assert!(close(positions[0], 4.0));
        assert!(close(positions[1], 6.0));
    }

    #[test]
    fn packing_spread_distributes_free_space() {
        let positions = pack_positions(
            &[2.0, 2.0, 2.0],
            &[[0.0, 0.0]; 3],
            0.0,
            12.0,
            CoilAlignment::Spread,
        );
        // 6 units free over 2 interior gaps: 3 units of padding each.
        assert!(close(positions[0], 1.0));
        assert!(close(positions[1], 6.0));
        assert!(close(positions[2], 11.0));
    }

    #[test]
    fn packing_respects_descending_spans() {
        let positions = pack_positions(
            &[2.0, 2.0],
            &[[0.0, 0.0], [0.0, 0.0]],
            10.0,
            -10.0,
            CoilAlignment::InnerOrTop,
        );
        assert!(close(positions[0], 9.0));
        assert!(close(positions[1], 7.0));
    }

    #[test]
    fn packing_margins_act_as_gaps() {
        let positions = pack_positions(
            &[2.0, 2.0],
            &[[1.0, 1.0], [1.0, 1.0]],
            0.0,
            12.0,
            CoilAlignment::InnerOrTop,
        );
        assert!(close(positions[0], 2.0));
        assert!(close(positions[1], 6.0));
    }

    #[test]
    fn bbox_accumulates_extremes() {
        let mut bbox = Bbox::new();
        bbox.include([0.0, 0.0], [2.0, 2.0]);
        bbox.include([5.0, 1.0], [2.0, 2.0]);
        assert!(close(bbox.centre()[0], 2.5));
        assert!(close(bbox.dimensions()[0], 8.0));
        assert!(close(bbox.dimensions()[1], 3.0));
    }
}
