//! Toroidal outer-side turn placement.
//!
//! A turn wound through a toroid's window wraps around the core ring, so
//! besides its inner-side centre it owns an *additional* centre on the
//! outer side of the core. This module projects every conduction turn onto
//! the outer side and resolves turn-turn collisions with a prioritised move
//! ladder, preserving the ladder order so placements stay reproducible.
//!
//! Convention: all radial coordinates are distances from the torus centre.
//! The window wall sits at the window radial height `R`, the core outer
//! wall at `R + 2·column_width` (column dimensions are halves), and a turn
//! at inner radius `r` projects to `2·column_width + 2·R − r`: the deeper a
//! turn sits in the window, the further out it lands on the core.

use tracing::{debug, trace};

use core_geometry::{ellipse_perimeter, polar_distance, wound_distance_to_angle};
use core_model::bobbin::ColumnShape;
use core_model::coil::ElectricalType;
use core_model::Point;

use crate::{CoilError, Winder};

/// Iteration cap for the collision-avoidance loop.
pub const TOROIDAL_PLACEMENT_ITERATIONS: usize = 1000;

/// Collision distances between a candidate outer coordinate and previously
/// placed ones: up to the two nearest placed coordinates closer than
/// `wire_height`, nearest first.
pub(crate) fn get_collision_distances(
    candidate: Point,
    placed: &[Point],
    wire_height: f64,
) -> Vec<(f64, Point)> {
    let mut collisions: Vec<(f64, Point)> = placed
        .iter()
        .map(|coord| (polar_distance(candidate, *coord), *coord))
        .filter(|(distance, _)| *distance < wire_height)
        .collect();
    collisions.sort_by(|a, b| a.0.total_cmp(&b.0));
    collisions.truncate(2);
    collisions
}

/// The move ladder for one escape attempt: the candidate itself, snap-away,
/// a proportional angular shift, its reverse, then oblique offsets around
/// the colliding turn at 0°, ±30°, ±45°, ±60°.
fn candidate_moves(
    radius: f64,
    angle: f64,
    collision: Option<(f64, Point)>,
    wire_height: f64,
) -> Vec<Point> {
    let mut moves = vec![[radius, angle]];
    let Some((distance, colliding)) = collision else {
        return moves;
    };
    // Escape away from the colliding turn; ties break towards increasing
    // angle so reruns reproduce bit-for-bit.
    let direction = if angle >= colliding[1] { 1.0 } else { -1.0 };
    let snap = wound_distance_to_angle(wire_height - distance, radius);
    moves.push([radius, angle + direction * snap]);
    let shift = wound_distance_to_angle(wire_height, radius);
    moves.push([radius, angle + direction * shift]);
    moves.push([radius, angle - direction * shift]);
    for oblique in [0.0f64, 30.0, -30.0, 45.0, -45.0, 60.0, -60.0] {
        let radial_offset = wire_height * oblique.to_radians().sin();
        let angular_offset = wound_distance_to_angle(
            wire_height * oblique.to_radians().cos(),
            colliding[0].max(f64::MIN_POSITIVE),
        );
        moves.push([
            colliding[0] + radial_offset,
            colliding[1] + direction * angular_offset,
        ]);
    }
    moves
}

impl Winder {
    /// Place the outer-side coordinate of every conduction turn, then give
    /// inter-section insulation layers their mid-way outer coordinates.
    pub(crate) fn wind_toroidal_additional_turns(&mut self) -> crate::WindResult {
        let window = self.winding_window()?.clone();
        let window_radius = window.radial_height.unwrap_or(0.0);
        let column_width = self.bobbin.column_width();
        let column_depth = self.bobbin.column_depth();
        let column_shape = self.bobbin.column_shape();
        let Some(sections) = self.coil.sections_description.clone() else {
            return Err(CoilError::MissingPrerequisite("toroidal placement requires sections"));
        };
        let Some(mut turns) = self.coil.turns_description.take() else {
            return Err(CoilError::MissingPrerequisite("toroidal placement requires turns"));
        };

        let mut placed: Vec<Point> = Vec::new();
        // Outermost radius any turn has reached; later non-wall turns try to
        // re-pack against it instead of their raw projection.
        let mut current_base_radial_height: Option<f64> = None;
        let mut total_iterations = 0usize;
        // Outermost outer-side radius per conduction section, for the
        // insulation layers afterwards.
        let mut section_outer_radius: Vec<(String, f64)> = Vec::new();

        for section in sections
            .iter()
            .filter(|s| s.section_type == ElectricalType::Conduction)
        {
            let section_layers = self.coil.layers_by_section(&section.name);
            let first_layer_name = section_layers
                .iter()
                .find(|l| l.layer_type == ElectricalType::Conduction)
                .map(|l| l.name.clone());
            let angle_window = (
                section.coordinates[1] - section.dimensions[1] / 2.0,
                section.coordinates[1] + section.dimensions[1] / 2.0,
            );
            let mut outermost = 0.0f64;

            for turn in turns
                .iter_mut()
                .filter(|t| t.section.as_deref() == Some(section.name.as_str()))
            {
                let wire_height = turn.dimensions.map(|d| d[1]).unwrap_or(0.0);
                let wire_width = turn.dimensions.map(|d| d[0]).unwrap_or(0.0);
                let inner_radius = turn.coordinates[0];
                let projection_angle = turn.coordinates[1];
                let projected_radius = 2.0 * column_width + 2.0 * window_radius - inner_radius;
                let in_first_layer = turn.layer.as_deref() == first_layer_name.as_deref();
                let mut radius = if in_first_layer {
                    projected_radius
                } else {
                    // Re-pack deeper turns against the outermost ring so far.
                    current_base_radial_height
                        .map(|base| base.max(projected_radius))
                        .unwrap_or(projected_radius)
                };
                let mut angle = projection_angle;
                let mut iterations = 0usize;

                let chosen = 'search: loop {
                    let collision =
                        get_collision_distances([radius, angle], &placed, wire_height)
                            .first()
                            .copied();
                    for candidate in candidate_moves(radius, angle, collision, wire_height) {
                        iterations += 1;
                        if iterations > TOROIDAL_PLACEMENT_ITERATIONS {
                            return Err(CoilError::Timeout(TOROIDAL_PLACEMENT_ITERATIONS));
                        }
                        // Abandon candidates that drift out of the section.
                        if candidate[1] < angle_window.0 - 1e-9
                            || candidate[1] > angle_window.1 + 1e-9
                        {
                            continue;
                        }
                        if candidate[0] <= window_radius {
                            continue;
                        }
                        if get_collision_distances(candidate, &placed, wire_height).is_empty() {
                            break 'search candidate;
                        }
                    }
                    // Every move collided: step half a turn further out and
                    // restart from the projection angle.
                    radius += wire_height / 2.0;
                    angle = projection_angle;
                };

                placed.push(chosen);
                total_iterations += iterations;
                outermost = outermost.max(chosen[0] + wire_width / 2.0);
                current_base_radial_height = Some(
                    current_base_radial_height
                        .unwrap_or(chosen[0])
                        .max(chosen[0]),
                );
                trace!(
                    target: "coil.toroid",
                    turn = %turn.name,
                    radius = chosen[0],
                    angle = chosen[1],
                    "outer coordinate placed"
                );

                // Wound length around the ring: Ramanujan ellipse between
                // the wire's depth in the window and its reach across the
                // core, corrected for the column shape.
                let depth = window_radius - inner_radius;
                let a = depth.max(wire_height / 2.0);
                let b = column_width + depth;
                let correction = match column_shape {
                    ColumnShape::Round => 0.0,
                    ColumnShape::Oblong => 4.0 * (column_depth - column_width),
                    ColumnShape::Rectangular | ColumnShape::Irregular => {
                        4.0 * (column_depth + column_width)
                    }
                };
                let length = ellipse_perimeter(a, b) + correction;
                if length <= 0.0 {
                    self.coil.turns_description = Some(turns);
                    return Ok(false);
                }
                turn.length = length;
                turn.additional_coordinates = Some(vec![chosen]);
            }
            section_outer_radius.push((section.name.clone(), outermost));
        }

        self.coil.turns_description = Some(turns);

        // Insulation layers between two conduction sections sit mid-way
        // between the sections' outer rings.
        if let Some(layers) = self.coil.layers_description.as_mut() {
            let insulation_layer_names: Vec<(String, usize)> = layers
                .iter()
                .enumerate()
                .filter(|(_, l)| l.layer_type == ElectricalType::Insulation)
                .map(|(i, l)| (l.name.clone(), i))
                .collect();
            for (name, index) in insulation_layer_names {
                let Some(section_name) = layers[index].section.clone() else {
                    continue;
                };
                let position = sections.iter().position(|s| s.name == section_name);
                let Some(position) = position else { continue };
                let before = sections[..position]
                    .iter()
                    .rev()
                    .find(|s| s.section_type == ElectricalType::Conduction)
                    .and_then(|s| {
                        section_outer_radius
                            .iter()
                            .find(|(n, _)| *n == s.name)
                            .map(|(_, r)| *r)
                    });
                let after = sections[position + 1..]
                    .iter()
                    .find(|s| s.section_type == ElectricalType::Conduction)
                    .and_then(|s| {
                        section_outer_radius
                            .iter()
                            .find(|(n, _)| *n == s.name)
                            .map(|(_, r)| *r)
                    });
                if let (Some(before), Some(after)) = (before, after) {
                    let layer = &mut layers[index];
                    layer.additional_coordinates =
                        Some(vec![[(before + after) / 2.0, layer.coordinates[1]]]);
                    trace!(target: "coil.toroid", layer = %name, "insulation outer coordinate placed");
                }
            }
        }

        debug!(target: "coil.toroid", turns = placed.len(), total_iterations, "outer side placed");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_geometry::angular_difference;

    #[test]
    fn collision_query_returns_nearest_two() {
        let placed = vec![[10.0e-3, 0.0], [10.0e-3, 8.0], [10.0e-3, 120.0]];
        let collisions = get_collision_distances([10.0e-3, 4.0], &placed, 2.0e-3);
        assert_eq!(collisions.len(), 2);
        assert!(collisions[0].0 <= collisions[1].0);
        // The far coordinate does not collide.
        assert!(collisions.iter().all(|(_, c)| c[1] != 120.0));
    }

    #[test]
    fn no_collision_outside_wire_height() {
        let placed = vec![[10.0e-3, 180.0]];
        let collisions = get_collision_distances([10.0e-3, 0.0], &placed, 1.0e-3);
        assert!(collisions.is_empty());
    }

    #[test]
    fn ladder_starts_with_the_unmoved_candidate() {
        let moves = candidate_moves(12.0e-3, 45.0, None, 1.0e-3);
        assert_eq!(moves, vec![[12.0e-3, 45.0]]);
        let with_collision =
            candidate_moves(12.0e-3, 45.0, Some((0.5e-3, [12.0e-3, 44.0])), 1.0e-3);
        assert_eq!(with_collision[0], [12.0e-3, 45.0]);
        // Unmoved, snap, shift, reverse shift, 7 obliques.
        assert_eq!(with_collision.len(), 11);
    }

    #[test]
    fn angular_difference_helper_agrees_with_geometry() {
        assert!((angular_difference(359.0, 1.0) - 2.0).abs() < 1e-9);
    }
}
