//! Ordered scoring filters of the wire adviser pipeline.
//!
//! Every filter walks the surviving candidates, yields a (validity, score)
//! pair per candidate, drops the invalid ones, min-max normalises the
//! scores to [0, 1] (inverted for lower-is-better metrics), adds them to
//! the running totals and re-sorts best first.

use core_model::coil::{CoilFunctionalDescription, Section};
use core_model::{CoordinateSystem, InsulationWireCoatingType, Wire};

use crate::skin;
use crate::{AdviserError, WireSolidInsulationRequirements};

#[derive(Debug, Clone)]
pub struct Candidate {
    pub description: CoilFunctionalDescription,
    pub score: f64,
}

impl Candidate {
    pub fn wire(&self) -> Result<&Wire, AdviserError> {
        Ok(self.description.wire()?)
    }
}

/// Geometric area of a section, either coordinate system.
pub fn section_area(section: &Section) -> f64 {
    match section.coordinate_system {
        Some(CoordinateSystem::Polar) => {
            std::f64::consts::PI
                * section.dimensions[0]
                * section.dimensions[0]
                * section.dimensions[1]
                / 360.0
        }
        _ => section.dimensions[0] * section.dimensions[1],
    }
}

/// Min-max normalise `scores` to [0, 1] (inverted when lower is better) and
/// fold them into the candidates, best first.
pub fn normalize_scoring(candidates: &mut Vec<Candidate>, scores: &[f64], invert: bool) {
    debug_assert_eq!(candidates.len(), scores.len());
    let minimum = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = maximum - minimum;
    for (candidate, score) in candidates.iter_mut().zip(scores) {
        let normalised = if range <= f64::EPSILON {
            1.0
        } else if invert {
            (maximum - score) / range
        } else {
            (score - minimum) / range
        };
        candidate.score += normalised;
    }
    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
}

/// Validity: one wire footprint fits across the section. Score: footprint
/// area, smaller preferred.
pub fn filter_by_area_no_parallels(
    candidates: Vec<Candidate>,
    section: &Section,
) -> Result<Vec<Candidate>, AdviserError> {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut scores = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let wire = candidate.wire()?;
        let footprint = wire.maximum_outer_width()?;
        if footprint <= section.dimensions[0] {
            scores.push(wire.outer_bounding_area()?);
            kept.push(candidate);
        }
    }
    let mut kept = kept;
    normalize_scoring(&mut kept, &scores, true);
    Ok(kept)
}

/// Validity: the candidate's copper at its parallel count fits the section
/// share. Score: the fitting headroom. Returns the kept candidates plus the
/// worst-case outer-area proportion, fed back to the layout engine.
pub fn filter_by_area_with_parallels(
    candidates: Vec<Candidate>,
    section: &Section,
    number_sections: usize,
    allow_not_fit: bool,
) -> Result<(Vec<Candidate>, Option<f64>), AdviserError> {
    let area = section_area(section) / number_sections.max(1) as f64;
    let mut kept = Vec::with_capacity(candidates.len());
    let mut scores = Vec::with_capacity(candidates.len());
    let mut worst_proportion: Option<f64> = None;
    for candidate in candidates {
        let turns_per_section = candidate
            .description
            .number_turns
            .div_ceil(number_sections.max(1) as u64);
        let needed = candidate.wire()?.outer_bounding_area()?
            * candidate.description.number_parallels as f64
            * turns_per_section as f64;
        let proportion = needed / area.max(f64::MIN_POSITIVE);
        if proportion <= 1.0 || allow_not_fit {
            worst_proportion = Some(worst_proportion.map_or(proportion, |w: f64| w.max(proportion)));
            scores.push(1.0 - proportion);
            kept.push(candidate);
        }
    }
    let mut kept = kept;
    normalize_scoring(&mut kept, &scores, false);
    Ok((kept, worst_proportion))
}

/// Validity: the wire coating satisfies the solid-insulation floor. Score:
/// the coating's breakdown voltage, higher preferred.
pub fn filter_by_solid_insulation_requirements(
    candidates: Vec<Candidate>,
    requirements: &WireSolidInsulationRequirements,
) -> Result<Vec<Candidate>, AdviserError> {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut scores = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let wire = candidate.wire()?;
        let Some(coating) = wire.coating.as_ref() else {
            continue;
        };
        if coating.coating_type == Some(InsulationWireCoatingType::Bare) {
            continue;
        }
        let breakdown = coating.breakdown_voltage.unwrap_or(0.0);
        let grade_ok = requirements
            .minimum_grade
            .is_none_or(|g| coating.grade.unwrap_or(0) >= g);
        let layers_ok = requirements
            .minimum_number_layers
            .is_none_or(|l| coating.number_layers.unwrap_or(1) >= l);
        let breakdown_ok = requirements
            .minimum_breakdown_voltage
            .is_none_or(|v| breakdown >= v);
        if grade_ok && layers_ok && breakdown_ok {
            scores.push(breakdown);
            kept.push(candidate);
        }
    }
    let mut kept = kept;
    normalize_scoring(&mut kept, &scores, false);
    Ok(kept)
}

/// Score: AC resistance per metre at the effective frequency, lower
/// preferred.
pub fn filter_by_effective_resistance(
    candidates: Vec<Candidate>,
    effective_frequency: f64,
    temperature: f64,
) -> Result<Vec<Candidate>, AdviserError> {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut scores = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let resistance = skin::effective_resistance_per_metre(
            candidate.wire()?,
            candidate.description.number_parallels,
            effective_frequency,
            temperature,
        )?;
        scores.push(resistance);
        kept.push(candidate);
    }
    let mut kept = kept;
    normalize_scoring(&mut kept, &scores, true);
    Ok(kept)
}

/// Score: proximity-effect multiplier, lower preferred.
pub fn filter_by_proximity_factor(
    candidates: Vec<Candidate>,
    effective_frequency: f64,
    temperature: f64,
) -> Result<Vec<Candidate>, AdviserError> {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut scores = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let factor =
            skin::proximity_factor(candidate.wire()?, effective_frequency, temperature)?;
        scores.push(factor);
        kept.push(candidate);
    }
    let mut kept = kept;
    normalize_scoring(&mut kept, &scores, true);
    Ok(kept)
}

/// Score: ohmic loss per trace area, lower preferred. Planar pipeline only.
pub fn filter_by_skin_losses_density(
    candidates: Vec<Candidate>,
    current_rms: f64,
    effective_frequency: f64,
    temperature: f64,
) -> Result<Vec<Candidate>, AdviserError> {
    let mut kept = Vec::with_capacity(candidates.len());
    let mut scores = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let density = skin::skin_loss_density(
            candidate.wire()?,
            current_rms,
            candidate.description.number_parallels,
            effective_frequency,
            temperature,
        )?;
        scores.push(density);
        kept.push(candidate);
    }
    let mut kept = kept;
    normalize_scoring(&mut kept, &scores, true);
    Ok(kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::coil::IsolationSide;

    fn candidate(wire: Wire, parallels: u64) -> Candidate {
        Candidate {
            description: CoilFunctionalDescription::new(
                "Primary",
                30,
                parallels,
                IsolationSide::Primary,
                wire,
            ),
            score: 0.0,
        }
    }

    fn test_section() -> Section {
        Section {
            name: "Primary section 0".into(),
            section_type: core_model::ElectricalType::Conduction,
            partial_windings: vec![],
            layers_orientation: core_model::WindingOrientation::Overlapping,
            coordinates: [9.6e-3, 0.0],
            dimensions: [3.5e-3, 26.0e-3],
            winding_style: None,
            margin: None,
            coordinate_system: Some(CoordinateSystem::Cartesian),
            filling_factor: None,
            group: None,
        }
    }

    #[test]
    fn min_max_normalisation_spans_unit_interval() {
        let mut candidates = vec![
            candidate(Wire::round("a", 0.2e-3, 0.226e-3), 1),
            candidate(Wire::round("b", 0.5e-3, 0.544e-3), 1),
            candidate(Wire::round("c", 1.0e-3, 1.062e-3), 1),
        ];
        normalize_scoring(&mut candidates, &[3.0, 1.0, 2.0], false);
        assert_eq!(candidates[0].score, 1.0);
        assert_eq!(candidates[2].score, 0.0);
        // Best first after folding.
        assert!(candidates.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn equal_scores_normalise_to_one() {
        let mut candidates = vec![
            candidate(Wire::round("a", 0.2e-3, 0.226e-3), 1),
            candidate(Wire::round("b", 0.5e-3, 0.544e-3), 1),
        ];
        normalize_scoring(&mut candidates, &[2.0, 2.0], true);
        assert!(candidates.iter().all(|c| c.score == 1.0));
    }

    #[test]
    fn oversized_wire_fails_the_no_parallels_area_filter() {
        let fits = candidate(Wire::round("small", 1.0e-3, 1.062e-3), 1);
        let too_wide = candidate(Wire::round("huge", 4.0e-3, 4.2e-3), 1);
        let kept = filter_by_area_no_parallels(vec![fits, too_wide], &test_section()).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].wire().unwrap().display_name(), "small");
    }

    #[test]
    fn area_with_parallels_reports_the_worst_proportion() {
        let candidates = vec![candidate(Wire::round("w", 1.0e-3, 1.062e-3), 2)];
        let (kept, proportion) =
            filter_by_area_with_parallels(candidates, &test_section(), 1, false).unwrap();
        assert_eq!(kept.len(), 1);
        // 30 turns x 2 parallels x 1.062 mm boxes over a 91 mm² section.
        let expected = 30.0 * 2.0 * 1.062e-3 * 1.062e-3 / (3.5e-3 * 26.0e-3);
        assert!((proportion.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn not_fitting_candidates_survive_only_with_allow_not_fit() {
        let big = || vec![candidate(Wire::round("w", 2.0e-3, 2.07e-3), 4)];
        let (kept, _) =
            filter_by_area_with_parallels(big(), &test_section(), 1, false).unwrap();
        assert!(kept.is_empty());
        let (kept, proportion) =
            filter_by_area_with_parallels(big(), &test_section(), 1, true).unwrap();
        assert_eq!(kept.len(), 1);
        assert!(proportion.unwrap() > 1.0);
    }

    #[test]
    fn solid_insulation_floor_drops_bare_and_low_grade_wires() {
        let mut served = candidate(Wire::round("grade2", 0.5e-3, 0.566e-3), 1);
        if let core_model::wire::WireOrName::Wire(wire) = &mut served.description.wire {
            wire.coating = Some(core_model::WireCoating {
                coating_type: Some(InsulationWireCoatingType::Enamelled),
                grade: Some(2),
                number_layers: Some(1),
                thickness: None,
                breakdown_voltage: Some(4800.0),
            });
        }
        let bare = candidate(Wire::foil("bare", 0.1e-3, 20.0e-3), 1);
        let requirements = WireSolidInsulationRequirements {
            minimum_grade: Some(2),
            minimum_number_layers: None,
            minimum_breakdown_voltage: Some(2000.0),
        };
        let kept = filter_by_solid_insulation_requirements(vec![served, bare], &requirements)
            .unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].wire().unwrap().display_name(), "grade2");
    }

    #[test]
    fn resistance_filter_prefers_more_copper() {
        let thin = candidate(Wire::round("thin", 0.2e-3, 0.226e-3), 1);
        let thick = candidate(Wire::round("thick", 0.8e-3, 0.861e-3), 1);
        let kept =
            filter_by_effective_resistance(vec![thin, thick], 100.0e3, 40.0).unwrap();
        assert_eq!(kept[0].wire().unwrap().display_name(), "thick");
    }
}
