//! Wire adviser: a ranking pipeline over the wire catalogue.
//!
//! For one winding of one section at one operating point, the adviser
//! expands the catalogue into candidates (each wire at its needed parallel
//! count and one more), then runs the ordered scoring filters (geometric
//! fit first, then solid insulation, then the loss models), summing the
//! normalised scores. The result is the top-N candidates, best first, plus
//! a worst-case outer-area proportion the layout engine uses to anticipate
//! compaction overshoot.

use thiserror::Error;
use tracing::debug;

use core_catalog::CatalogError;
use core_config::Settings;
use core_model::coil::{CoilFunctionalDescription, Section};
use core_model::wire::WireOrName;
use core_model::{CoordinateSystem, ModelError, Wire, WireStandard, WireType};

pub mod filters;
pub mod skin;

use filters::Candidate;

#[derive(Debug, Error)]
pub enum AdviserError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("invalid operating point: {0}")]
    InvalidOperatingPoint(String),
}

/// Operating-point current, already processed into the figures the filters
/// read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentSignal {
    pub rms: f64,
    /// Frequency carrying the bulk of the harmonic energy.
    pub effective_frequency: f64,
    pub peak: Option<f64>,
}

impl CurrentSignal {
    pub fn sinusoidal(rms: f64, frequency: f64) -> Self {
        Self {
            rms,
            effective_frequency: frequency,
            peak: Some(rms * std::f64::consts::SQRT_2),
        }
    }
}

/// Solid-insulation floor a candidate's coating must clear.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WireSolidInsulationRequirements {
    pub minimum_grade: Option<u8>,
    pub minimum_number_layers: Option<u8>,
    pub minimum_breakdown_voltage: Option<f64>,
}

pub struct WireAdviser {
    maximum_effective_current_density: f64,
    maximum_number_parallels: u64,
    common_wire_standard: Option<WireStandard>,
    wire_solid_insulation_requirements: Option<WireSolidInsulationRequirements>,
    border_to_wire_distance: f64,
    wire_to_wire_distance: f64,
    /// Worst outer-area proportion among the surviving candidates, written
    /// back after each run.
    pub maximum_outer_area_proportion: Option<f64>,
}

impl Default for WireAdviser {
    fn default() -> Self {
        Self {
            maximum_effective_current_density: 6.0e6,
            maximum_number_parallels: 10,
            common_wire_standard: None,
            wire_solid_insulation_requirements: None,
            border_to_wire_distance: 0.0,
            wire_to_wire_distance: 0.0,
            maximum_outer_area_proportion: None,
        }
    }
}

impl WireAdviser {
    pub fn set_maximum_effective_current_density(&mut self, value: f64) {
        self.maximum_effective_current_density = value;
    }

    pub fn set_maximum_number_parallels(&mut self, value: u64) {
        self.maximum_number_parallels = value;
    }

    pub fn set_common_wire_standard(&mut self, standard: Option<WireStandard>) {
        self.common_wire_standard = standard;
    }

    pub fn set_wire_solid_insulation_requirements(
        &mut self,
        requirements: Option<WireSolidInsulationRequirements>,
    ) {
        self.wire_solid_insulation_requirements = requirements;
    }

    pub fn set_border_to_wire_distance(&mut self, value: f64) {
        self.border_to_wire_distance = value;
    }

    pub fn set_wire_to_wire_distance(&mut self, value: f64) {
        self.wire_to_wire_distance = value;
    }

    /// Advise from the whole embedded catalogue.
    pub fn advise(
        &mut self,
        functional: &CoilFunctionalDescription,
        section: &Section,
        current: &CurrentSignal,
        temperature: f64,
        number_sections: usize,
        maximum_results: usize,
    ) -> Result<Vec<(CoilFunctionalDescription, f64)>, AdviserError> {
        let settings = Settings::snapshot();
        let wires: Vec<Wire> = core_catalog::wires()
            .iter()
            .filter(|wire| self.wire_admitted(wire, section, &settings))
            .cloned()
            .collect();
        self.advise_from(
            &wires,
            functional,
            section,
            current,
            temperature,
            number_sections,
            maximum_results,
        )
    }

    /// Advise from an explicit wire list (already gate-checked callers).
    #[allow(clippy::too_many_arguments)]
    pub fn advise_from(
        &mut self,
        wires: &[Wire],
        functional: &CoilFunctionalDescription,
        section: &Section,
        current: &CurrentSignal,
        temperature: f64,
        number_sections: usize,
        maximum_results: usize,
    ) -> Result<Vec<(CoilFunctionalDescription, f64)>, AdviserError> {
        if current.effective_frequency <= 0.0 {
            return Err(AdviserError::InvalidOperatingPoint(
                "effective frequency must be positive".into(),
            ));
        }
        let mut candidates = self.create_dataset(wires, functional, section, current)?;
        debug!(target: "adviser", count = candidates.len(), "candidate dataset built");

        candidates = filters::filter_by_area_no_parallels(candidates, section)?;
        if let Some(requirements) = &self.wire_solid_insulation_requirements {
            candidates =
                filters::filter_by_solid_insulation_requirements(candidates, requirements)?;
        }
        let (mut kept, mut proportion) = filters::filter_by_area_with_parallels(
            candidates.clone(),
            section,
            number_sections,
            false,
        )?;
        if kept.is_empty() {
            // Nothing fits outright; keep the least-overflowing candidates
            // and let the scoring sort them.
            (kept, proportion) =
                filters::filter_by_area_with_parallels(candidates, section, number_sections, true)?;
        }
        candidates = kept;
        self.maximum_outer_area_proportion = proportion;

        candidates = filters::filter_by_effective_resistance(
            candidates,
            current.effective_frequency,
            temperature,
        )?;
        candidates = filters::filter_by_proximity_factor(
            candidates,
            current.effective_frequency,
            temperature,
        )?;
        if candidates
            .iter()
            .all(|c| matches!(c.wire().map(|w| w.wire_type), Ok(WireType::Planar)))
            && !candidates.is_empty()
        {
            candidates = filters::filter_by_skin_losses_density(
                candidates,
                current.rms,
                current.effective_frequency,
                temperature,
            )?;
        }

        candidates.truncate(maximum_results);
        debug!(target: "adviser", survivors = candidates.len(), "pipeline finished");
        Ok(candidates
            .into_iter()
            .map(|c| (c.description, c.score))
            .collect())
    }

    /// Type gates, toroid gate and standard match for one catalogue wire.
    fn wire_admitted(&self, wire: &Wire, section: &Section, settings: &Settings) -> bool {
        let gates = &settings.wire_adviser;
        let cartesian = section.coordinate_system != Some(CoordinateSystem::Polar);
        let admitted = match wire.wire_type {
            WireType::Round => gates.include_round,
            WireType::Litz => gates.include_litz,
            WireType::Rectangular => {
                gates.include_rectangular
                    && (cartesian || gates.allow_rectangular_in_toroidal_cores)
            }
            WireType::Foil => gates.include_foil,
            WireType::Planar => gates.include_planar,
        };
        if !admitted {
            return false;
        }
        match (self.common_wire_standard, wire.standard) {
            (Some(required), Some(standard)) => required == standard,
            _ => true,
        }
    }

    /// Candidate expansion: each admitted wire at the parallel count that
    /// honours the current-density ceiling, and at one parallel more while
    /// still under the cap. Elastic wires are cut to the section first.
    fn create_dataset(
        &self,
        wires: &[Wire],
        functional: &CoilFunctionalDescription,
        section: &Section,
        current: &CurrentSignal,
    ) -> Result<Vec<Candidate>, AdviserError> {
        let mut candidates = Vec::new();
        for wire in wires {
            let mut wire = wire.clone();
            match wire.wire_type {
                WireType::Foil => wire.cut_foil_wire_to_section(section),
                WireType::Planar => wire.cut_planar_wire_to_section(section),
                _ => {}
            }
            let parallels_needed = if wire.wire_type == WireType::Rectangular {
                1
            } else {
                wire.calculate_number_parallels_needed(
                    current.rms,
                    self.maximum_effective_current_density,
                )? as u64
            };
            if parallels_needed > self.maximum_number_parallels {
                continue;
            }
            let mut description = functional.clone();
            description.number_parallels = parallels_needed;
            description.wire = WireOrName::Wire(wire.clone());
            candidates.push(Candidate {
                description: description.clone(),
                score: 0.0,
            });
            if parallels_needed < self.maximum_number_parallels {
                description.number_parallels = parallels_needed + 1;
                candidates.push(Candidate {
                    description,
                    score: 0.0,
                });
            }
        }
        Ok(candidates)
    }

    /// Planar dataset: trace widths derived from the section width, the
    /// border and the wire-to-wire spacing, at one parallel and at
    /// 2..=number_sections parallels.
    pub fn create_planar_dataset(
        &self,
        functional: &CoilFunctionalDescription,
        section: &Section,
        number_sections: usize,
    ) -> Result<Vec<Candidate>, AdviserError> {
        let mut candidates = Vec::new();
        let planar_wires: Vec<&Wire> = core_catalog::wires()
            .iter()
            .filter(|w| w.wire_type == WireType::Planar)
            .collect();
        let section_height = section.dimensions[1];

        let mut push_variants =
            |turns_per_section: u64, parallels: std::ops::RangeInclusive<u64>| {
                let width_for_copper = section.dimensions[0]
                    - 2.0 * self.border_to_wire_distance
                    - (turns_per_section.saturating_sub(1)) as f64 * self.wire_to_wire_distance;
                if width_for_copper <= 0.0 || turns_per_section == 0 {
                    return;
                }
                let trace_width = width_for_copper / turns_per_section as f64;
                for wire in &planar_wires {
                    let Some(height) = wire.conducting_height.and_then(|d| d.resolve()) else {
                        continue;
                    };
                    if height >= section_height {
                        continue;
                    }
                    for number_parallels in parallels.clone() {
                        let mut sized = (*wire).clone();
                        sized.conducting_width = Some(trace_width.into());
                        sized.outer_width = Some(trace_width.into());
                        sized.conducting_area = Some((trace_width * height).into());
                        let mut description = functional.clone();
                        description.wire = WireOrName::Wire(sized);
                        description.number_parallels = number_parallels;
                        candidates.push(Candidate {
                            description,
                            score: 0.0,
                        });
                    }
                }
            };

        // One parallel: the winding's turns share the stack sections.
        let turns_per_section = functional.number_turns.div_ceil(number_sections.max(1) as u64);
        push_variants(turns_per_section, 1..=1);
        // Parallel copies: every section holds the full turn count.
        if number_sections >= 2 {
            push_variants(functional.number_turns, 2..=number_sections as u64);
        }
        Ok(candidates)
    }
}
