//! Coil layout engine.
//!
//! [`Winder`] owns a [`core_model::Coil`] and rebuilds its computed
//! hierarchy deterministically: insulation plan → sections → layers →
//! turns → (optional) delimit-and-compact → (toroids) outer-side turn
//! placement. A rewind pass re-proportions window space once when filling
//! factors overshoot.
//!
//! Phase contract: a phase returns `Ok(false)` when the requested geometry
//! cannot be realised (margin larger than a section, polar wire angle ≥
//! 180°, negative turn length). Hard faults are `Err`: invalid inputs,
//! catalogue misses, the toroidal placement iteration cap. `wind()` absorbs
//! only the soft filling overflow, and only while `coil.try_rewind` allows
//! a second pass.
//!
//! Within one `wind()` the settings are a snapshot taken at entry; the
//! shared instance is never re-read mid-algorithm.

use ahash::AHashMap;
use thiserror::Error;
use tracing::{debug, warn};

use core_catalog::CatalogError;
use core_config::Settings;
use core_model::bobbin::{Bobbin, WindingWindow, WindingWindowShape};
use core_model::coil::{BobbinOrName, Coil, ElectricalType, Group, WiringTechnology};
use core_model::wire::WireOrName;
use core_model::{CoilAlignment, ModelError, Wire, WindingOrientation, WindingStyle};

pub mod compact;
pub mod insulation;
pub mod layers;
pub mod planar;
pub mod sections;
pub mod toroid;
pub mod turns;

pub use insulation::{InsulationPlan, InsulationRequirements, InsulationType};

/// Filling factors up to `1 + FILLING_TOLERANCE` count as fitting.
pub const FILLING_TOLERANCE: f64 = 1e-6;

const PROPORTION_TOLERANCE: f64 = 1e-4;

#[derive(Debug, Error)]
pub enum CoilError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("toroidal outer turn placement exceeded {0} iterations")]
    Timeout(usize),
    #[error(transparent)]
    Lookup(#[from] CatalogError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("missing prerequisite: {0}")]
    MissingPrerequisite(&'static str),
}

pub type WindResult = Result<bool, CoilError>;

/// The layout engine. One logical owner at a time; structural setters clear
/// the computed descriptions so the next `wind()` recomputes from scratch.
pub struct Winder {
    pub(crate) coil: Coil,
    pub(crate) bobbin: Bobbin,
    /// Wire per winding, catalogue references resolved.
    pub(crate) wires: Vec<Wire>,
    pinned_settings: Option<Settings>,
    pub(crate) interleaving_level: usize,
    pub(crate) winding_orientation: WindingOrientation,
    pub(crate) layers_orientation: WindingOrientation,
    pub(crate) turns_alignment: CoilAlignment,
    pub(crate) section_alignment: CoilAlignment,
    pub(crate) layers_orientation_per_section: AHashMap<String, WindingOrientation>,
    pub(crate) turns_alignment_per_section: AHashMap<String, CoilAlignment>,
    /// Preloaded margin per conduction section, `[top, bottom]` metres
    /// (inner/outer wound distance for polar windows).
    pub(crate) margins_per_section: Vec<[f64; 2]>,
    pub(crate) insulation_plan: InsulationPlan,
    /// Winding pair behind each insulation section, by section name.
    pub(crate) insulation_section_pairs: AHashMap<String, (usize, usize)>,
    pub(crate) insulation_requirements: Option<InsulationRequirements>,
    /// Interlayer insulation overrides per winding name (planar builds).
    pub(crate) interlayer_insulation: AHashMap<String, f64>,
    pub(crate) current_proportions: Vec<f64>,
    pub(crate) current_pattern: Vec<usize>,
    pub(crate) current_repetitions: usize,
    pub(crate) strict: bool,
    /// Adviser feedback: expected bbox overshoot of the chosen wire family.
    pub maximum_outer_area_proportion: Option<f64>,
}

impl Winder {
    /// Resolve the coil's bobbin and wires and build an engine around it.
    pub fn new(mut coil: Coil) -> Result<Self, CoilError> {
        let bobbin = match &coil.bobbin {
            BobbinOrName::Bobbin(bobbin) => bobbin.clone(),
            BobbinOrName::Name(name) => {
                let resolved = core_catalog::find_bobbin(name)?.clone();
                coil.bobbin = BobbinOrName::Bobbin(resolved.clone());
                resolved
            }
        };
        let mut wires = Vec::with_capacity(coil.functional_description.len());
        for winding in &mut coil.functional_description {
            let wire = match &winding.wire {
                WireOrName::Wire(wire) => wire.clone(),
                WireOrName::Name(name) => {
                    let resolved = core_catalog::find_wire(name)?.clone();
                    winding.wire = WireOrName::Wire(resolved.clone());
                    resolved
                }
            };
            wires.push(wire);
        }
        if coil.functional_description.is_empty() {
            return Err(CoilError::InvalidInput("coil has no windings".into()));
        }
        Ok(Self {
            coil,
            bobbin,
            wires,
            pinned_settings: None,
            interleaving_level: 1,
            winding_orientation: WindingOrientation::Overlapping,
            layers_orientation: WindingOrientation::Overlapping,
            turns_alignment: CoilAlignment::Centered,
            section_alignment: CoilAlignment::InnerOrTop,
            layers_orientation_per_section: AHashMap::new(),
            turns_alignment_per_section: AHashMap::new(),
            margins_per_section: Vec::new(),
            insulation_plan: InsulationPlan::default(),
            insulation_section_pairs: AHashMap::new(),
            insulation_requirements: None,
            interlayer_insulation: AHashMap::new(),
            current_proportions: Vec::new(),
            current_pattern: Vec::new(),
            current_repetitions: 1,
            strict: true,
            maximum_outer_area_proportion: None,
        })
    }

    /// Pin a settings value, overriding the process-wide shared instance for
    /// this engine.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.pinned_settings = Some(settings);
        self
    }

    pub(crate) fn effective_settings(&self) -> Settings {
        self.pinned_settings.unwrap_or_else(Settings::snapshot)
    }

    // ----- accessors ------------------------------------------------------

    pub fn coil(&self) -> &Coil {
        &self.coil
    }

    pub fn into_coil(self) -> Coil {
        self.coil
    }

    pub fn bobbin(&self) -> &Bobbin {
        &self.bobbin
    }

    pub(crate) fn winding_window(&self) -> Result<&WindingWindow, CoilError> {
        Ok(self.bobbin.winding_window()?)
    }

    pub fn resolve_wire(&self, winding_index: usize) -> Result<&Wire, CoilError> {
        self.wires
            .get(winding_index)
            .ok_or_else(|| CoilError::InvalidInput(format!("no winding {winding_index}")))
    }

    pub fn sections_description(&self) -> Option<&[core_model::Section]> {
        self.coil.sections_description.as_deref()
    }

    pub fn layers_description(&self) -> Option<&[core_model::Layer]> {
        self.coil.layers_description.as_deref()
    }

    pub fn turns_description(&self) -> Option<&[core_model::Turn]> {
        self.coil.turns_description.as_deref()
    }

    pub fn groups_description(&self) -> Option<&[Group]> {
        self.coil.groups_description.as_deref()
    }

    /// Outer bounding box of the wound component.
    pub fn maximum_dimensions(&self) -> Result<[f64; 2], CoilError> {
        Ok(self.bobbin.maximum_outer_dimensions()?)
    }

    pub fn interleaving_level(&self) -> usize {
        self.interleaving_level
    }

    pub fn winding_orientation(&self) -> WindingOrientation {
        self.winding_orientation
    }

    pub fn layers_orientation(&self, section: Option<&str>) -> WindingOrientation {
        section
            .and_then(|name| self.layers_orientation_per_section.get(name).copied())
            .unwrap_or(self.layers_orientation)
    }

    pub fn turns_alignment(&self, section: Option<&str>) -> CoilAlignment {
        section
            .and_then(|name| self.turns_alignment_per_section.get(name).copied())
            .unwrap_or(self.turns_alignment)
    }

    pub fn section_alignment(&self) -> CoilAlignment {
        self.section_alignment
    }

    // ----- structural setters (invalidate computed descriptions) ----------

    pub fn set_interleaving_level(&mut self, level: usize) {
        self.interleaving_level = level.max(1);
        self.unwind();
    }

    pub fn set_winding_orientation(&mut self, orientation: WindingOrientation) {
        self.winding_orientation = orientation;
        self.unwind();
    }

    pub fn set_layers_orientation(
        &mut self,
        orientation: WindingOrientation,
        section: Option<&str>,
    ) {
        match section {
            Some(name) => {
                self.layers_orientation_per_section
                    .insert(name.to_string(), orientation);
            }
            None => self.layers_orientation = orientation,
        }
        self.unwind();
    }

    pub fn set_turns_alignment(&mut self, alignment: CoilAlignment, section: Option<&str>) {
        match section {
            Some(name) => {
                self.turns_alignment_per_section
                    .insert(name.to_string(), alignment);
            }
            None => self.turns_alignment = alignment,
        }
        self.unwind();
    }

    pub fn set_section_alignment(&mut self, alignment: CoilAlignment) {
        self.section_alignment = alignment;
        self.unwind();
    }

    pub fn set_number_turns(&mut self, number_turns: Vec<u64>) {
        for (winding, turns) in self
            .coil
            .functional_description
            .iter_mut()
            .zip(number_turns)
        {
            winding.number_turns = turns;
        }
        self.unwind();
    }

    pub fn set_number_parallels(&mut self, number_parallels: Vec<u64>) {
        for (winding, parallels) in self
            .coil
            .functional_description
            .iter_mut()
            .zip(number_parallels)
        {
            winding.number_parallels = parallels;
        }
        self.unwind();
    }

    /// Non-strict engines accept proportions that do not sum to 1 (callers
    /// exploring partial windows).
    pub fn set_strict(&mut self, strict: bool) {
        self.strict = strict;
    }

    pub fn set_insulation_requirements(&mut self, requirements: InsulationRequirements) {
        self.insulation_requirements = Some(requirements);
        self.unwind();
    }

    // ----- margins --------------------------------------------------------

    /// Preload `[first, second]` margins per conduction section ahead of the
    /// next wind.
    pub fn preload_margins(&mut self, margin_pairs: Vec<[f64; 2]>) {
        self.margins_per_section = margin_pairs;
    }

    pub fn reset_margins_per_section(&mut self) {
        self.margins_per_section.clear();
    }

    /// Set the margin of one conduction section and re-wind with the current
    /// proportions, pattern and repetitions.
    pub fn add_margin_to_section_by_index(
        &mut self,
        section_index: usize,
        margins: [f64; 2],
    ) -> WindResult {
        if self.margins_per_section.len() <= section_index {
            self.margins_per_section
                .resize(section_index + 1, [0.0, 0.0]);
        }
        self.margins_per_section[section_index] = margins;
        let proportions = self.current_proportions.clone();
        let pattern = self.current_pattern.clone();
        let repetitions = self.current_repetitions;
        if proportions.is_empty() {
            return Err(CoilError::MissingPrerequisite(
                "add_margin_to_section_by_index requires a prior wind",
            ));
        }
        self.wind(proportions, pattern, repetitions)
    }

    pub(crate) fn margin_for_conduction_section(&self, conduction_index: usize) -> [f64; 2] {
        self.margins_per_section
            .get(conduction_index)
            .copied()
            .unwrap_or([0.0, 0.0])
    }

    // ----- lifecycle ------------------------------------------------------

    /// Drop the computed hierarchy; functional inputs and groups survive.
    pub fn unwind(&mut self) {
        self.coil.sections_description = None;
        self.coil.layers_description = None;
        self.coil.turns_description = None;
        self.insulation_section_pairs.clear();
    }

    /// Drop everything computed, including groups and the insulation plan.
    pub fn clear(&mut self) {
        self.unwind();
        self.coil.groups_description = None;
        self.insulation_plan = InsulationPlan::default();
        self.margins_per_section.clear();
    }

    // ----- winding entry points -------------------------------------------

    /// Full wind with explicit proportions, pattern and repetitions.
    pub fn wind(
        &mut self,
        proportion_per_winding: Vec<f64>,
        pattern: Vec<usize>,
        repetitions: usize,
    ) -> WindResult {
        let settings = self.effective_settings();
        self.validate_wind_inputs(&proportion_per_winding, &pattern, repetitions)?;
        self.current_proportions = proportion_per_winding.clone();
        self.current_pattern = pattern.clone();
        self.current_repetitions = repetitions;

        let mut wound =
            self.wind_attempt(&proportion_per_winding, &pattern, repetitions, &settings)?;

        if wound && !self.are_sections_and_layers_fitting() && settings.coil.try_rewind {
            if let Some(rewound) = self.rewound_proportions(&proportion_per_winding) {
                warn!(target: "coil", ?rewound, "filling overflow, rewinding with adjusted proportions");
                self.current_proportions = rewound.clone();
                wound = self.wind_attempt(&rewound, &pattern, repetitions, &settings)?;
            }
        }

        if wound && settings.coil.delimit_and_compact {
            wound = self.delimit_and_compact_with(&settings)?;
        }
        if wound
            && !settings.coil.delimit_and_compact
            && settings.coil.include_additional_coordinates
            && self.bobbin.winding_window_shape().map_err(CoilError::from)?
                == WindingWindowShape::Round
        {
            wound = self.wind_toroidal_additional_turns()?;
        }

        Ok(wound && self.are_sections_and_layers_fitting() && self.coil.turns_description.is_some())
    }

    /// Wind with proportions derived from the wire areas and a pattern from
    /// the isolation sides, repeated `interleaving_level` times.
    pub fn wind_default(&mut self) -> WindResult {
        let proportions = self.proportion_per_winding_based_on_wires()?;
        let pattern = self.default_pattern();
        let repetitions = self.interleaving_level;
        self.wind(proportions, pattern, repetitions)
    }

    pub fn wind_with_pattern(&mut self, pattern: Vec<usize>, repetitions: usize) -> WindResult {
        let proportions = self.proportion_per_winding_based_on_wires()?;
        self.wind(proportions, pattern, repetitions)
    }

    pub fn wind_with_repetitions(&mut self, repetitions: usize) -> WindResult {
        let proportions = self.proportion_per_winding_based_on_wires()?;
        let pattern = self.default_pattern();
        self.wind(proportions, pattern, repetitions)
    }

    /// Quick geometry preview: winds without compaction, without toroidal
    /// outer coordinates and without the rewind loop.
    pub fn fast_wind(&mut self) -> WindResult {
        let mut settings = self.effective_settings();
        settings.coil.delimit_and_compact = false;
        settings.coil.include_additional_coordinates = false;
        settings.coil.try_rewind = false;
        let proportions = self.proportion_per_winding_based_on_wires()?;
        let pattern = self.default_pattern();
        let repetitions = self.interleaving_level;
        self.validate_wind_inputs(&proportions, &pattern, repetitions)?;
        self.current_proportions = proportions.clone();
        self.current_pattern = pattern.clone();
        self.current_repetitions = repetitions;
        let wound = self.wind_attempt(&proportions, &pattern, repetitions, &settings)?;
        Ok(wound && self.are_sections_and_layers_fitting() && self.coil.turns_description.is_some())
    }

    /// Delimit and compact the already wound hierarchy.
    pub fn delimit_and_compact(&mut self) -> WindResult {
        let settings = self.effective_settings();
        self.delimit_and_compact_with(&settings)
    }

    fn wind_attempt(
        &mut self,
        proportions: &[f64],
        pattern: &[usize],
        repetitions: usize,
        settings: &Settings,
    ) -> WindResult {
        self.unwind();
        self.calculate_insulation(settings)?;
        if !self.wind_by_sections(proportions, pattern, repetitions, settings)? {
            debug!(target: "coil", "section planning infeasible");
            return Ok(false);
        }
        if !self.wind_by_layers(settings)? {
            debug!(target: "coil", "layer planning infeasible");
            return Ok(false);
        }
        if !self.are_sections_and_layers_fitting()
            && !settings.coil.wind_even_if_not_fit
            && !settings.coil.try_rewind
        {
            return Ok(false);
        }
        if !self.wind_by_turns(settings)? {
            debug!(target: "coil", "turn placement infeasible");
            return Ok(false);
        }
        Ok(true)
    }

    fn validate_wind_inputs(
        &self,
        proportions: &[f64],
        pattern: &[usize],
        repetitions: usize,
    ) -> Result<(), CoilError> {
        let windings = self.coil.functional_description.len();
        if repetitions == 0 {
            return Err(CoilError::InvalidInput("repetitions must be at least 1".into()));
        }
        if proportions.len() != windings {
            return Err(CoilError::InvalidInput(format!(
                "expected {windings} proportions, got {}",
                proportions.len()
            )));
        }
        if proportions.iter().any(|p| !(0.0..=1.0).contains(p) || p.is_nan()) {
            return Err(CoilError::InvalidInput(
                "winding proportions must lie in [0, 1]".into(),
            ));
        }
        let sum: f64 = proportions.iter().sum();
        if self.strict && (sum - 1.0).abs() > PROPORTION_TOLERANCE {
            return Err(CoilError::InvalidInput(format!(
                "winding proportions must sum to 1, got {sum}"
            )));
        }
        if pattern.is_empty() {
            return Err(CoilError::InvalidInput("pattern is empty".into()));
        }
        if let Some(bad) = pattern.iter().find(|w| **w >= windings) {
            return Err(CoilError::InvalidInput(format!(
                "pattern references winding {bad}, coil has {windings}"
            )));
        }
        for index in 0..windings {
            if !pattern.contains(&index) {
                return Err(CoilError::InvalidInput(format!(
                    "winding {index} missing from pattern"
                )));
            }
        }
        Ok(())
    }

    /// Pattern from the isolation sides: winding indices ordered as given.
    pub fn default_pattern(&self) -> Vec<usize> {
        (0..self.coil.functional_description.len()).collect()
    }

    /// Window proportions from the copper each winding has to place: the
    /// bounding-box area of all its physical turns, normalised.
    pub fn proportion_per_winding_based_on_wires(&self) -> Result<Vec<f64>, CoilError> {
        let mut areas = Vec::with_capacity(self.wires.len());
        for (winding, wire) in self.coil.functional_description.iter().zip(&self.wires) {
            let area = wire.outer_bounding_area()? * winding.physical_turns() as f64;
            areas.push(area);
        }
        let total: f64 = areas.iter().sum();
        if total <= 0.0 {
            return Err(CoilError::InvalidInput("windings carry no copper".into()));
        }
        Ok(areas.iter().map(|a| a / total).collect())
    }

    // ----- filling --------------------------------------------------------

    /// True when layers exist and every section and layer filling factor
    /// stays at or below `1 + FILLING_TOLERANCE`.
    pub fn are_sections_and_layers_fitting(&self) -> bool {
        let Some(layers) = self.coil.layers_description.as_deref() else {
            return false;
        };
        let sections_fit = self
            .coil
            .sections()
            .iter()
            .all(|s| s.filling_factor.unwrap_or(0.0) <= 1.0 + FILLING_TOLERANCE);
        let layers_fit = layers
            .iter()
            .all(|l| l.filling_factor.unwrap_or(0.0) <= 1.0 + FILLING_TOLERANCE);
        sections_fit && layers_fit
    }

    /// Bounding-box filling factor of one section against its own area.
    pub fn section_filling_factor(&self, section: &core_model::Section) -> f64 {
        section.filling_factor.unwrap_or(0.0)
    }

    /// Occupancy of a conduction section along its stacking axis: how much
    /// of the section width its layers consume.
    pub fn overlapping_filling_factor(&self, section: &core_model::Section) -> f64 {
        let layers = self.coil.layers_by_section(&section.name);
        let stacked: f64 = layers
            .iter()
            .filter(|l| l.layer_type == ElectricalType::Conduction)
            .map(|l| l.dimensions[0])
            .sum();
        stacked / section.dimensions[0].max(f64::MIN_POSITIVE)
    }

    /// Occupancy of a conduction section along its turn axis: how much of
    /// the section height the fullest layer consumes.
    pub fn contiguous_filling_factor(&self, section: &core_model::Section) -> f64 {
        let layers = self.coil.layers_by_section(&section.name);
        let widest: f64 = layers
            .iter()
            .filter(|l| l.layer_type == ElectricalType::Conduction)
            .map(|l| {
                let turns = self.coil.number_turns_in_layer(l) as f64;
                let extent = l
                    .partial_windings
                    .first()
                    .and_then(|p| self.coil.winding_index_by_name(&p.winding))
                    .and_then(|i| self.wires.get(i))
                    .and_then(|w| w.maximum_outer_height().ok())
                    .unwrap_or(0.0);
                turns * extent
            })
            .fold(0.0, f64::max);
        widest / section.dimensions[1].max(f64::MIN_POSITIVE)
    }

    /// One-shot rewind: grow each overflowing winding's share of the window
    /// by its deficit, funded by the free remainder. `None` when nothing
    /// overflows, the window has no remainder, or the proportions reached a
    /// fixed point (oscillation guard).
    fn rewound_proportions(&self, current: &[f64]) -> Option<Vec<f64>> {
        let sections = self.coil.sections_description.as_deref()?;

        let windings = self.coil.functional_description.len();
        let mut space = vec![0.0; windings];
        let mut deficit = vec![0.0; windings];
        // The redistribution is funded by the window remainder: the space
        // under-filled sections hold beyond what their copper needs.
        let mut remainder = 0.0;
        for section in sections {
            let extent = self.section_extent_along_axis(section);
            if section.section_type != ElectricalType::Conduction {
                continue;
            }
            let Some(winding) = section
                .partial_windings
                .first()
                .and_then(|p| self.coil.winding_index_by_name(&p.winding))
            else {
                continue;
            };
            space[winding] += extent;
            let mut worst = section.filling_factor.unwrap_or(0.0);
            for layer in self.coil.layers_by_section(&section.name) {
                worst = worst.max(layer.filling_factor.unwrap_or(0.0));
            }
            if worst > 1.0 + FILLING_TOLERANCE {
                deficit[winding] += (worst - 1.0) * extent;
            } else {
                remainder += (1.0 - worst).max(0.0) * extent;
            }
        }
        let total_deficit: f64 = deficit.iter().sum();
        if total_deficit <= 0.0 || remainder <= 0.0 {
            return None;
        }
        let new_space: Vec<f64> = space
            .iter()
            .zip(&deficit)
            .map(|(s, d)| s + remainder * d / total_deficit)
            .collect();
        let total: f64 = new_space.iter().sum();
        let proportions: Vec<f64> = new_space.iter().map(|s| s / total).collect();
        let moved = proportions
            .iter()
            .zip(current)
            .any(|(new, old)| (new - old).abs() > PROPORTION_TOLERANCE);
        moved.then_some(proportions)
    }

    /// A section's extent along the section-building axis.
    pub(crate) fn section_extent_along_axis(&self, section: &core_model::Section) -> f64 {
        match self.winding_orientation {
            WindingOrientation::Overlapping => section.dimensions[0],
            WindingOrientation::Contiguous => section.dimensions[1],
        }
    }

    /// Winding-style rule: a winding split over `slots` sections winds by
    /// consecutive turns when its parallels divide evenly over the slots,
    /// by consecutive parallels when its turns do, and by consecutive turns
    /// otherwise.
    pub fn decide_winding_style(
        number_turns: u64,
        number_parallels: u64,
        number_slots: usize,
    ) -> WindingStyle {
        let slots = number_slots.max(1) as u64;
        if slots == number_parallels || number_parallels % slots == 0 {
            WindingStyle::WindByConsecutiveTurns
        } else if slots == number_turns || number_turns % slots == 0 {
            WindingStyle::WindByConsecutiveParallels
        } else {
            WindingStyle::WindByConsecutiveTurns
        }
    }

    /// Ensure there is a default group for wound sections to reference.
    pub(crate) fn ensure_default_group(&mut self, technology: WiringTechnology) -> String {
        let name = "Default group".to_string();
        let window = self
            .bobbin
            .winding_window()
            .ok()
            .cloned()
            .unwrap_or_default();
        let (dimensions, coordinates) = match window.shape() {
            WindingWindowShape::Rectangular => (
                [window.width.unwrap_or(0.0), window.height.unwrap_or(0.0)],
                window.centre(),
            ),
            WindingWindowShape::Round => (
                [
                    window.radial_height.unwrap_or(0.0),
                    window.angle.unwrap_or(360.0),
                ],
                [0.0, 0.0],
            ),
        };
        let group = Group {
            name: name.clone(),
            group_type: technology,
            coordinates,
            dimensions,
            sections_orientation: self.winding_orientation,
            sections_alignment: self.section_alignment,
        };
        self.coil.groups_description = Some(vec![group]);
        name
    }

    /// Estimate how far outside a toroidal core the winding bulges, as a
    /// proportion of the core outer radius. Painters scale canvases with it.
    pub fn external_proportion_for_toroidal_cores(&self) -> Result<f64, CoilError> {
        let window = self.winding_window()?;
        if window.shape() != WindingWindowShape::Round {
            return Ok(0.0);
        }
        let window_radius = window.radial_height.unwrap_or(0.0);
        let column_width = self.bobbin.column_width();
        let outer_radius = window_radius + column_width;
        let mut build = 0.0f64;
        for (winding, wire) in self.coil.functional_description.iter().zip(&self.wires) {
            let width = wire.maximum_outer_width()?;
            let height = wire.maximum_outer_height()?;
            let per_layer = (core_geometry::circle_perimeter(outer_radius) / height).floor().max(1.0);
            let layers = (winding.physical_turns() as f64 / per_layer).ceil();
            build += layers * width;
        }
        Ok((outer_radius + build) / outer_radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::coil::{CoilFunctionalDescription, IsolationSide};
    use core_model::core::{Core, CoreShapeFamily};

    fn two_winding_coil() -> Coil {
        let core = Core::two_column("E 42/33/20", CoreShapeFamily::E, 7.0e-3, 29.5e-3, 12.2e-3, 20.0e-3);
        let bobbin = Bobbin::simple_bobbin(&core).unwrap();
        Coil::new(
            bobbin,
            vec![
                CoilFunctionalDescription::new(
                    "Primary",
                    20,
                    1,
                    IsolationSide::Primary,
                    Wire::round("Round 0.50", 0.5e-3, 0.544e-3),
                ),
                CoilFunctionalDescription::new(
                    "Secondary",
                    20,
                    1,
                    IsolationSide::Secondary,
                    Wire::round("Round 0.50", 0.5e-3, 0.544e-3),
                ),
            ],
        )
    }

    #[test]
    fn invalid_inputs_are_rejected_before_mutation() {
        let mut winder = Winder::new(two_winding_coil()).unwrap();
        assert!(matches!(
            winder.wind(vec![0.5, 0.5], vec![0, 1], 0),
            Err(CoilError::InvalidInput(_))
        ));
        assert!(matches!(
            winder.wind(vec![0.7, 0.5], vec![0, 1], 1),
            Err(CoilError::InvalidInput(_))
        ));
        assert!(matches!(
            winder.wind(vec![0.5, 0.5], vec![0, 7], 1),
            Err(CoilError::InvalidInput(_))
        ));
        assert!(matches!(
            winder.wind(vec![0.5, 0.5], vec![0], 1),
            Err(CoilError::InvalidInput(_))
        ));
        assert!(winder.coil().sections_description.is_none());
    }

    #[test]
    fn winding_style_rule() {
        // parallels divide over slots -> consecutive turns
        assert_eq!(
            Winder::decide_winding_style(10, 4, 2),
            WindingStyle::WindByConsecutiveTurns
        );
        // turns divide, parallels do not -> consecutive parallels
        assert_eq!(
            Winder::decide_winding_style(10, 3, 2),
            WindingStyle::WindByConsecutiveParallels
        );
        // neither divides -> default consecutive turns
        assert_eq!(
            Winder::decide_winding_style(7, 3, 2),
            WindingStyle::WindByConsecutiveTurns
        );
    }

    #[test]
    fn proportions_follow_wire_areas() {
        let winder = Winder::new(two_winding_coil()).unwrap();
        let proportions = winder.proportion_per_winding_based_on_wires().unwrap();
        assert_eq!(proportions.len(), 2);
        assert!((proportions[0] - 0.5).abs() < 1e-12);
        assert!((proportions.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn structural_setters_invalidate_descriptions() {
        let mut winder = Winder::new(two_winding_coil())
            .unwrap()
            .with_settings(Settings::default());
        assert!(winder.wind(vec![0.5, 0.5], vec![0, 1], 1).unwrap());
        assert!(winder.coil().sections_description.is_some());
        winder.set_interleaving_level(2);
        assert!(winder.coil().sections_description.is_none());
    }

    #[test]
    fn missing_catalogue_wire_is_a_lookup_error() {
        let mut coil = two_winding_coil();
        coil.functional_description[0].wire = WireOrName::Name("No such wire".into());
        assert!(matches!(Winder::new(coil), Err(CoilError::Lookup(_))));
    }
}
