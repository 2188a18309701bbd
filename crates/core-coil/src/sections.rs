//! Section planner.
//!
//! Allocates the winding window to an ordered list of conduction sections
//! (pattern × repetitions, weighted by the per-winding proportions) and
//! injects insulation sections between windings of different index.
//!
//! Turn bookkeeping runs on *global physical-turn boundaries*: a winding's
//! `turns · parallels` physical turns form one contiguous range, each slot
//! takes a sub-range, and a slot's per-parallel proportion is the exact
//! overlap of its range with that parallel's turns divided by the turn
//! count. Summed over slots this reconstructs 1 per parallel with no
//! rounding drift, which is what the proportion-conservation invariant
//! demands.

use tracing::{debug, trace};

use core_config::Settings;
use core_geometry::wound_distance_to_angle;
use core_model::bobbin::WindingWindowShape;
use core_model::coil::{ElectricalType, PartialWinding, Section, WiringTechnology};
use core_model::{CoordinateSystem, WindingOrientation, WindingStyle};

use crate::{CoilError, Winder};

/// One entry of the section walk, before geometry is assigned.
#[derive(Debug, Clone)]
pub(crate) enum SectionEntry {
    Conduction {
        winding: usize,
        /// Ordinal among this winding's sections.
        slot: usize,
        /// Extent along the section-building axis (metres or degrees).
        space: f64,
    },
    Insulation {
        pair: (usize, usize),
        /// Extent along the axis (metres or degrees).
        space: f64,
    },
}

/// Exact sub-range boundaries for `total` physical turns split over `slots`
/// weighted slots. `weights` defaults to equal. Boundaries are monotonic and
/// cover `0..=total`.
pub(crate) fn turn_boundaries(total: u64, slots: usize, weights: Option<&[f64]>) -> Vec<u64> {
    let slots = slots.max(1);
    let weight_sum: f64 = match weights {
        Some(w) => w.iter().sum(),
        None => slots as f64,
    };
    let mut boundaries = Vec::with_capacity(slots + 1);
    boundaries.push(0u64);
    let mut cumulative = 0.0;
    for index in 0..slots {
        cumulative += weights.map(|w| w[index]).unwrap_or(1.0);
        let boundary = if index + 1 == slots {
            total
        } else {
            ((cumulative / weight_sum) * total as f64).round() as u64
        };
        let previous = *boundaries.last().unwrap();
        boundaries.push(boundary.clamp(previous, total));
    }
    boundaries
}

/// Per-parallel proportion of the physical-turn range `[start, end)`.
///
/// Consecutive turns orders turns parallel-major (all of parallel 0, then
/// parallel 1…); consecutive parallels orders them turn-major (turn 0 of
/// every parallel, then turn 1…).
pub(crate) fn parallels_proportions(
    style: WindingStyle,
    number_turns: u64,
    number_parallels: u64,
    start: u64,
    end: u64,
) -> Vec<f64> {
    let mut proportions = Vec::with_capacity(number_parallels as usize);
    match style {
        WindingStyle::WindByConsecutiveTurns => {
            for parallel in 0..number_parallels {
                let p_start = parallel * number_turns;
                let p_end = p_start + number_turns;
                let overlap = end.min(p_end).saturating_sub(start.max(p_start));
                proportions.push(overlap as f64 / number_turns as f64);
            }
        }
        WindingStyle::WindByConsecutiveParallels => {
            for parallel in 0..number_parallels {
                let mut count = 0u64;
                for turn in 0..number_turns {
                    let index = turn * number_parallels + parallel;
                    if index >= start && index < end {
                        count += 1;
                    }
                }
                proportions.push(count as f64 / number_turns as f64);
            }
        }
    }
    proportions
}

impl Winder {
    /// Normalise pattern and repetitions: a winding cannot be divided into
    /// more sections than it has physical turns, so an over-divided request
    /// is expanded into a compound pattern replayed once.
    pub fn check_pattern_and_repetitions_integrity(
        &self,
        pattern: &[usize],
        repetitions: usize,
    ) -> Result<(Vec<usize>, usize), CoilError> {
        if repetitions == 0 {
            return Err(CoilError::InvalidInput("repetitions must be at least 1".into()));
        }
        let physical_turns: Vec<u64> = self
            .coil
            .functional_description
            .iter()
            .map(|w| w.physical_turns())
            .collect();
        let over_divided = (0..physical_turns.len()).any(|w| {
            let occurrences = pattern.iter().filter(|p| **p == w).count();
            (physical_turns[w] as usize) < occurrences * repetitions
        });
        if !over_divided {
            return Ok((pattern.to_vec(), repetitions));
        }
        let mut compound = Vec::new();
        let mut counts = vec![0usize; physical_turns.len()];
        for _ in 0..repetitions {
            for &w in pattern {
                if counts[w] < physical_turns[w] as usize {
                    compound.push(w);
                    counts[w] += 1;
                }
            }
        }
        debug!(target: "coil.sections", ?compound, "pattern expanded, repetitions collapsed to 1");
        Ok((compound, 1))
    }

    pub(crate) fn wind_by_sections(
        &mut self,
        proportions: &[f64],
        pattern: &[usize],
        repetitions: usize,
        settings: &Settings,
    ) -> crate::WindResult {
        let (pattern, repetitions) =
            self.check_pattern_and_repetitions_integrity(pattern, repetitions)?;
        let shape = self.bobbin.winding_window_shape()?;
        let group = self.ensure_default_group(WiringTechnology::Wound);
        match shape {
            WindingWindowShape::Rectangular => {
                self.wind_by_rectangular_sections(proportions, &pattern, repetitions, settings, &group)
            }
            WindingWindowShape::Round => {
                self.wind_by_round_sections(proportions, &pattern, repetitions, settings, &group)
            }
        }
    }

    /// Sections per winding for a normalised pattern.
    fn sections_per_winding(&self, pattern: &[usize], repetitions: usize) -> Vec<usize> {
        let mut counts = vec![0usize; self.coil.functional_description.len()];
        for &w in pattern {
            counts[w] += repetitions;
        }
        counts
    }

    /// Walk the pattern and interleave insulation entries. `axis_space` and
    /// the returned spaces share one unit: metres for cartesian windows and
    /// polar radial stacking, degrees for polar angular stacking.
    fn ordered_entries(
        &self,
        axis_space: f64,
        proportions: &[f64],
        pattern: &[usize],
        repetitions: usize,
        insulation_space: impl Fn(usize, usize) -> f64,
    ) -> Vec<SectionEntry> {
        let per_winding = self.sections_per_winding(pattern, repetitions);
        let mut entries: Vec<SectionEntry> = Vec::new();
        let mut slots_seen = vec![0usize; per_winding.len()];
        for _ in 0..repetitions {
            for &winding in pattern {
                let space = axis_space * proportions[winding] / per_winding[winding] as f64;
                if let Some(SectionEntry::Conduction { winding: previous, .. }) = entries
                    .iter()
                    .rev()
                    .find(|e| matches!(e, SectionEntry::Conduction { .. }))
                    .cloned()
                    && previous != winding
                {
                    let thickness = insulation_space(previous, winding);
                    if thickness > 0.0 {
                        entries.push(SectionEntry::Insulation {
                            pair: (previous, winding),
                            space: thickness,
                        });
                        // The insulation build is paid by both neighbours.
                        if let Some(SectionEntry::Conduction { space, .. }) = entries
                            .iter_mut()
                            .rev()
                            .find(|e| matches!(e, SectionEntry::Conduction { .. }))
                        {
                            *space -= thickness / 2.0;
                        }
                        entries.push(SectionEntry::Conduction {
                            winding,
                            slot: slots_seen[winding],
                            space: space - thickness / 2.0,
                        });
                        slots_seen[winding] += 1;
                        continue;
                    }
                }
                entries.push(SectionEntry::Conduction {
                    winding,
                    slot: slots_seen[winding],
                    space,
                });
                slots_seen[winding] += 1;
            }
        }
        entries
    }

    fn wind_by_rectangular_sections(
        &mut self,
        proportions: &[f64],
        pattern: &[usize],
        repetitions: usize,
        settings: &Settings,
        group: &str,
    ) -> crate::WindResult {
        let window = self.winding_window()?.clone();
        let width = window.width.unwrap_or(0.0);
        let height = window.height.unwrap_or(0.0);
        if width <= 0.0 || height <= 0.0 {
            return Err(CoilError::InvalidInput(
                "winding window dimensions must be positive".into(),
            ));
        }
        let centre = window.centre();
        let orientation = self.winding_orientation;
        let axis_space = match orientation {
            WindingOrientation::Overlapping => width,
            WindingOrientation::Contiguous => height,
        };
        let plan = self.insulation_plan.clone();
        let entries = self.ordered_entries(axis_space, proportions, pattern, repetitions, |a, b| {
            plan.thickness_between(a, b)
        });

        let per_winding = self.sections_per_winding(pattern, repetitions);
        let mut sections = Vec::with_capacity(entries.len());
        let mut cursor = -axis_space / 2.0;
        let mut insulation_counter = 0usize;
        let mut conduction_counter = 0usize;
        for entry in &entries {
            match entry {
                SectionEntry::Conduction { winding, slot, space } => {
                    if *space <= 0.0 {
                        return Ok(false);
                    }
                    let functional = &self.coil.functional_description[*winding];
                    let wire = self.wires[*winding].clone();
                    let wire_bbox = wire.maximum_outer_dimensions()?;
                    let margin = self.effective_margin(conduction_counter, *winding, settings);
                    let turn_axis_extent = match orientation {
                        WindingOrientation::Overlapping => height,
                        WindingOrientation::Contiguous => width,
                    };
                    let wire_along_turn_axis = match orientation {
                        WindingOrientation::Overlapping => wire_bbox[1],
                        WindingOrientation::Contiguous => wire_bbox[0],
                    };
                    if margin[0] + margin[1] + wire_along_turn_axis > turn_axis_extent {
                        debug!(target: "coil.sections", "margin plus one wire exceeds the section extent");
                        return Ok(false);
                    }
                    let style = Winder::decide_winding_style(
                        functional.number_turns,
                        functional.number_parallels,
                        per_winding[*winding],
                    );
                    let total = functional.physical_turns();
                    let boundaries = turn_boundaries(total, per_winding[*winding], None);
                    let (start, end) = (boundaries[*slot], boundaries[*slot + 1]);
                    let proportion_slice = parallels_proportions(
                        style,
                        functional.number_turns,
                        functional.number_parallels,
                        start,
                        end,
                    );
                    let physical_turns = (end - start) as f64;
                    let (dimensions, coordinates) = match orientation {
                        WindingOrientation::Overlapping => (
                            [*space, height],
                            [centre[0] + cursor + space / 2.0, centre[1]],
                        ),
                        WindingOrientation::Contiguous => (
                            [width, *space],
                            // Contiguous sections stack top-down.
                            [centre[0], centre[1] - cursor - space / 2.0],
                        ),
                    };
                    let area = dimensions[0] * dimensions[1];
                    let filling_factor =
                        physical_turns * wire_bbox[0] * wire_bbox[1] / area.max(f64::MIN_POSITIVE);
                    trace!(target: "coil.sections", winding = %functional.name, slot, filling_factor, "conduction section");
                    let name = format!("{} section {}", functional.name, slot);
                    sections.push(Section {
                        layers_orientation: self.layers_orientation(Some(&name)),
                        name,
                        section_type: ElectricalType::Conduction,
                        partial_windings: vec![PartialWinding {
                            winding: functional.name.clone(),
                            parallels_proportion: proportion_slice,
                        }],
                        coordinates,
                        dimensions,
                        winding_style: Some(style),
                        margin: Some(margin),
                        coordinate_system: Some(CoordinateSystem::Cartesian),
                        filling_factor: Some(filling_factor),
                        group: Some(group.to_string()),
                    });
                    conduction_counter += 1;
                    cursor += space;
                }
                SectionEntry::Insulation { pair, space } => {
                    let (dimensions, coordinates) = match orientation {
                        WindingOrientation::Overlapping => (
                            [*space, height],
                            [centre[0] + cursor + space / 2.0, centre[1]],
                        ),
                        WindingOrientation::Contiguous => (
                            [width, *space],
                            [centre[0], centre[1] - cursor - space / 2.0],
                        ),
                    };
                    sections.push(self.insulation_section(
                        insulation_counter,
                        *pair,
                        coordinates,
                        dimensions,
                        CoordinateSystem::Cartesian,
                        group,
                    ));
                    insulation_counter += 1;
                    cursor += space;
                }
            }
        }

        if settings.coil.equalize_margins {
            equalize_adjacent_margins(&mut sections);
        }
        self.coil.sections_description = Some(sections);
        Ok(true)
    }

    fn wind_by_round_sections(
        &mut self,
        proportions: &[f64],
        pattern: &[usize],
        repetitions: usize,
        settings: &Settings,
        group: &str,
    ) -> crate::WindResult {
        let window = self.winding_window()?.clone();
        let radial_height = window.radial_height.unwrap_or(0.0);
        let window_angle = window.angle.unwrap_or(360.0);
        if radial_height <= 0.0 || window_angle <= 0.0 {
            return Err(CoilError::InvalidInput(
                "winding window dimensions must be positive".into(),
            ));
        }
        let orientation = self.winding_orientation;
        // Radius used to convert wound distances into arcs for full-height
        // sections: the window's radial midpoint.
        let conversion_radius = radial_height / 2.0;
        let plan = self.insulation_plan.clone();

        let per_winding = self.sections_per_winding(pattern, repetitions);
        let entries = match orientation {
            WindingOrientation::Overlapping => {
                self.ordered_entries(radial_height, proportions, pattern, repetitions, |a, b| {
                    plan.thickness_between(a, b)
                })
            }
            WindingOrientation::Contiguous => {
                self.ordered_entries(window_angle, proportions, pattern, repetitions, |a, b| {
                    let insulation_angle = wound_distance_to_angle(
                        plan.thickness_between(a, b),
                        conversion_radius,
                    );
                    // Margin tape already separating the pair swallows
                    // thinner insulation sections entirely.
                    let margin_angle =
                        wound_distance_to_angle(plan.margin_between(a, b), conversion_radius);
                    if margin_angle >= insulation_angle {
                        0.0
                    } else {
                        insulation_angle
                    }
                })
            }
        };

        // Weights for splitting one winding over several radial slots: outer
        // slots hold more copper per radial metre, proportionally to their
        // mean radius.
        let mut sections = Vec::with_capacity(entries.len());
        let mut cursor = 0.0f64;
        let mut insulation_counter = 0usize;
        let mut conduction_counter = 0usize;

        // Precompute radial weights per winding for overlapping stacking.
        let radial_weights: Vec<Vec<f64>> = if orientation == WindingOrientation::Overlapping {
            let mut weights = vec![Vec::new(); per_winding.len()];
            let mut walk = 0.0f64;
            for entry in &entries {
                match entry {
                    SectionEntry::Conduction { winding, space, .. } => {
                        let mean_radius = radial_height - walk - space / 2.0;
                        weights[*winding].push(mean_radius.max(f64::MIN_POSITIVE));
                        walk += space;
                    }
                    SectionEntry::Insulation { space, .. } => walk += space,
                }
            }
            weights
        } else {
            Vec::new()
        };

        for entry in &entries {
            match entry {
                SectionEntry::Conduction { winding, slot, space } => {
                    if *space <= 0.0 {
                        return Ok(false);
                    }
                    let functional = &self.coil.functional_description[*winding];
                    let wire = self.wires[*winding].clone();
                    let wire_bbox = wire.maximum_outer_dimensions()?;
                    let margin = self.effective_margin(conduction_counter, *winding, settings);
                    let style = Winder::decide_winding_style(
                        functional.number_turns,
                        functional.number_parallels,
                        per_winding[*winding],
                    );
                    let total = functional.physical_turns();
                    let weights = radial_weights
                        .get(*winding)
                        .filter(|w| !w.is_empty())
                        .map(Vec::as_slice);
                    let boundaries = turn_boundaries(total, per_winding[*winding], weights);
                    let (start, end) = (boundaries[*slot], boundaries[*slot + 1]);
                    let proportion_slice = parallels_proportions(
                        style,
                        functional.number_turns,
                        functional.number_parallels,
                        start,
                        end,
                    );
                    let physical_turns = (end - start) as f64;

                    let (dimensions, coordinates, area) = match orientation {
                        WindingOrientation::Overlapping => {
                            let outer = radial_height - cursor;
                            let inner = outer - space;
                            if inner < -1e-12 {
                                return Ok(false);
                            }
                            let area = std::f64::consts::PI
                                * (outer * outer - inner * inner)
                                * window_angle
                                / 360.0;
                            (
                                [*space, window_angle],
                                [outer - space / 2.0, 180.0],
                                area,
                            )
                        }
                        WindingOrientation::Contiguous => {
                            let angle = *space;
                            if angle <= 0.0 {
                                return Ok(false);
                            }
                            let margin_angle = wound_distance_to_angle(
                                margin[0] + margin[1],
                                conversion_radius,
                            );
                            let wire_angle = wound_distance_to_angle(
                                wire_bbox[1],
                                radial_height - wire_bbox[0] / 2.0,
                            );
                            if margin_angle + wire_angle > angle {
                                debug!(target: "coil.sections", "margin plus one wire exceeds the section angle");
                                return Ok(false);
                            }
                            let area = std::f64::consts::PI
                                * radial_height
                                * radial_height
                                * angle
                                / 360.0;
                            (
                                [radial_height, angle],
                                [radial_height / 2.0, cursor + angle / 2.0],
                                area,
                            )
                        }
                    };
                    let filling_factor =
                        physical_turns * wire_bbox[0] * wire_bbox[1] / area.max(f64::MIN_POSITIVE);
                    trace!(target: "coil.sections", winding = %functional.name, slot, filling_factor, "conduction section");
                    sections.push(Section {
                        name: format!("{} section {}", functional.name, slot),
                        section_type: ElectricalType::Conduction,
                        partial_windings: vec![PartialWinding {
                            winding: functional.name.clone(),
                            parallels_proportion: proportion_slice,
                        }],
                        layers_orientation: WindingOrientation::Overlapping,
                        coordinates,
                        dimensions,
                        winding_style: Some(style),
                        margin: Some(margin),
                        coordinate_system: Some(CoordinateSystem::Polar),
                        filling_factor: Some(filling_factor),
                        group: Some(group.to_string()),
                    });
                    conduction_counter += 1;
                    cursor += space;
                }
                SectionEntry::Insulation { pair, space } => {
                    let (dimensions, coordinates) = match orientation {
                        WindingOrientation::Overlapping => {
                            let outer = radial_height - cursor;
                            ([*space, window_angle], [outer - space / 2.0, 180.0])
                        }
                        WindingOrientation::Contiguous => (
                            [radial_height, *space],
                            [radial_height / 2.0, cursor + space / 2.0],
                        ),
                    };
                    sections.push(self.insulation_section(
                        insulation_counter,
                        *pair,
                        coordinates,
                        dimensions,
                        CoordinateSystem::Polar,
                        group,
                    ));
                    insulation_counter += 1;
                    cursor += space;
                }
            }
        }

        if settings.coil.equalize_margins {
            equalize_adjacent_margins(&mut sections);
        }
        self.coil.sections_description = Some(sections);
        Ok(true)
    }

    fn insulation_section(
        &mut self,
        index: usize,
        pair: (usize, usize),
        coordinates: [f64; 2],
        dimensions: [f64; 2],
        coordinate_system: CoordinateSystem,
        group: &str,
    ) -> Section {
        let name = format!("Insulation section {index}");
        self.insulation_section_pairs.insert(name.clone(), pair);
        Section {
            name,
            section_type: ElectricalType::Insulation,
            partial_windings: Vec::new(),
            layers_orientation: self.layers_orientation(None),
            coordinates,
            dimensions,
            winding_style: None,
            margin: Some([0.0, 0.0]),
            coordinate_system: Some(coordinate_system),
            filling_factor: Some(1.0),
            group: Some(group.to_string()),
        }
    }

    /// Margin of a conduction section: the preloaded value merged with the
    /// margin tape the insulation plan asks for around this winding.
    fn effective_margin(
        &self,
        conduction_index: usize,
        winding: usize,
        settings: &Settings,
    ) -> [f64; 2] {
        let preloaded = self.margin_for_conduction_section(conduction_index);
        if !settings.coil.allow_margin_tape {
            return preloaded;
        }
        let mut tape = 0.0f64;
        for other in 0..self.coil.functional_description.len() {
            if other != winding {
                tape = tape.max(self.insulation_plan.margin_between(winding, other) / 2.0);
            }
        }
        [preloaded[0].max(tape), preloaded[1].max(tape)]
    }
}

/// Under `coil_equalize_margins`, facing margins of neighbouring conduction
/// sections settle at their common mean.
fn equalize_adjacent_margins(sections: &mut [Section]) {
    let conduction: Vec<usize> = sections
        .iter()
        .enumerate()
        .filter(|(_, s)| s.section_type == ElectricalType::Conduction)
        .map(|(i, _)| i)
        .collect();
    for window in conduction.windows(2) {
        let (a, b) = (window[0], window[1]);
        let first = sections[a].margin.unwrap_or([0.0, 0.0]);
        let second = sections[b].margin.unwrap_or([0.0, 0.0]);
        let mean = (first[1] + second[0]) / 2.0;
        sections[a].margin = Some([first[0], mean]);
        sections[b].margin = Some([mean, second[1]]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_cover_the_full_range() {
        let b = turn_boundaries(100, 4, None);
        assert_eq!(b, vec![0, 25, 50, 75, 100]);
        let weighted = turn_boundaries(100, 2, Some(&[3.0, 1.0]));
        assert_eq!(weighted, vec![0, 75, 100]);
    }

    #[test]
    fn boundaries_stay_monotonic_with_tiny_weights() {
        let b = turn_boundaries(7, 3, Some(&[1e-9, 1.0, 1e-9]));
        assert_eq!(b.first(), Some(&0));
        assert_eq!(b.last(), Some(&7));
        assert!(b.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn consecutive_turns_proportions_split_whole_parallels() {
        // 10 turns x 4 parallels over 2 slots: slot 0 takes parallels 0-1.
        let p = parallels_proportions(WindingStyle::WindByConsecutiveTurns, 10, 4, 0, 20);
        assert_eq!(p, vec![1.0, 1.0, 0.0, 0.0]);
        let p = parallels_proportions(WindingStyle::WindByConsecutiveTurns, 10, 4, 20, 40);
        assert_eq!(p, vec![0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn consecutive_parallels_proportions_split_turns_evenly() {
        // 10 turns x 3 parallels over 2 slots turn-major: 15 physical turns
        // each, 5 turns of every parallel.
        let p = parallels_proportions(WindingStyle::WindByConsecutiveParallels, 10, 3, 0, 15);
        assert_eq!(p, vec![0.5, 0.5, 0.5]);
        let p = parallels_proportions(WindingStyle::WindByConsecutiveParallels, 10, 3, 15, 30);
        assert_eq!(p, vec![0.5, 0.5, 0.5]);
    }

    #[test]
    fn proportions_conserve_across_any_split() {
        for style in [
            WindingStyle::WindByConsecutiveTurns,
            WindingStyle::WindByConsecutiveParallels,
        ] {
            let (turns, parallels) = (17u64, 5u64);
            let total = turns * parallels;
            let boundaries = turn_boundaries(total, 3, None);
            let mut sums = vec![0.0f64; parallels as usize];
            for pair in boundaries.windows(2) {
                let p = parallels_proportions(style, turns, parallels, pair[0], pair[1]);
                for (sum, value) in sums.iter_mut().zip(p) {
                    *sum += value;
                }
            }
            for sum in sums {
                assert!((sum - 1.0).abs() < 1e-9, "style {style:?}: {sum}");
            }
        }
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_proportions_conserve(
                turns in 1u64..300,
                parallels in 1u64..12,
                slots in 1usize..8,
                turn_style in proptest::bool::ANY,
            ) {
                let style = if turn_style {
                    WindingStyle::WindByConsecutiveTurns
                } else {
                    WindingStyle::WindByConsecutiveParallels
                };
                let boundaries = turn_boundaries(turns * parallels, slots, None);
                let mut sums = vec![0.0f64; parallels as usize];
                for pair in boundaries.windows(2) {
                    let p = parallels_proportions(style, turns, parallels, pair[0], pair[1]);
                    for (sum, value) in sums.iter_mut().zip(p) {
                        *sum += value;
                    }
                }
                for sum in sums {
                    prop_assert!((sum - 1.0).abs() < 1e-9);
                }
            }

            #[test]
            fn prop_weighted_boundaries_partition(
                total in 1u64..2000,
                weights in proptest::collection::vec(0.01f64..10.0, 1..6),
            ) {
                let boundaries = turn_boundaries(total, weights.len(), Some(&weights));
                prop_assert_eq!(boundaries[0], 0);
                prop_assert_eq!(*boundaries.last().unwrap(), total);
                prop_assert!(boundaries.windows(2).all(|w| w[0] <= w[1]));
            }
        }
    }
}
