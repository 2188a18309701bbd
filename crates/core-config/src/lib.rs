//! Settings loading and the process-wide shared instance.
//!
//! Every knob the winding pipeline recognises lives in [`Settings`], grouped
//! by subsystem (`[coil]`, `[wire_adviser]`, `[leakage_inductance]` in the
//! optional `magnetics.toml`). Files may specify any subset; every field has
//! a default. Unknown keys are ignored (TOML deserialization tolerance) so
//! configs survive version skew in both directions.
//!
//! Algorithms never read the shared instance mid-flight: entry points take a
//! [`Settings`] snapshot once (`Settings::snapshot()`) and thread it through,
//! so a concurrent `replace()` cannot tear a wind in progress.

use std::path::PathBuf;
use std::sync::{OnceLock, RwLock};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Knobs consumed by the layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoilSettings {
    /// Proceed to turn placement even when a filling factor exceeds 1.
    pub wind_even_if_not_fit: bool,
    /// Run delimit-and-compact after turn placement.
    pub delimit_and_compact: bool,
    /// Re-proportion window space and re-wind once on overflow.
    pub try_rewind: bool,
    /// Compute toroidal outer-side coordinates after compaction.
    pub include_additional_coordinates: bool,
    /// Redistribute margin between adjacent sections by relative free space.
    pub equalize_margins: bool,
    /// Cap rectangular wires at one turn per layer in contiguous layers.
    pub only_one_turn_per_layer_in_contiguous_rectangular: bool,
    /// Let the insulation planner trade insulation layers for margin tape.
    pub allow_margin_tape: bool,
    /// After compaction, inflate margins to consume residual window space.
    pub fill_sections_with_margin_tape: bool,
    /// Planar winds with more copper layers than this fail.
    pub maximum_layers_planar: usize,
}

impl Default for CoilSettings {
    fn default() -> Self {
        Self {
            wind_even_if_not_fit: false,
            delimit_and_compact: true,
            try_rewind: true,
            include_additional_coordinates: true,
            equalize_margins: true,
            only_one_turn_per_layer_in_contiguous_rectangular: false,
            allow_margin_tape: true,
            fill_sections_with_margin_tape: false,
            maximum_layers_planar: 64,
        }
    }
}

/// Candidate gates for the wire adviser.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WireAdviserSettings {
    pub include_round: bool,
    pub include_litz: bool,
    pub include_rectangular: bool,
    pub include_foil: bool,
    pub include_planar: bool,
    pub allow_rectangular_in_toroidal_cores: bool,
}

impl Default for WireAdviserSettings {
    fn default() -> Self {
        Self {
            include_round: true,
            include_litz: true,
            include_rectangular: true,
            include_foil: true,
            include_planar: false,
            allow_rectangular_in_toroidal_cores: false,
        }
    }
}

/// Recorded untouched for the leakage-inductance collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeakageInductanceSettings {
    pub grid_precision_level_wound: u8,
    pub grid_auto_scaling: bool,
}

impl Default for LeakageInductanceSettings {
    fn default() -> Self {
        Self {
            grid_precision_level_wound: 1,
            grid_auto_scaling: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub coil: CoilSettings,
    pub wire_adviser: WireAdviserSettings,
    pub leakage_inductance: LeakageInductanceSettings,
}

impl Settings {
    /// The process-wide shared instance, initialised from `magnetics.toml`
    /// discovery on first use.
    pub fn shared() -> &'static RwLock<Settings> {
        static SHARED: OnceLock<RwLock<Settings>> = OnceLock::new();
        SHARED.get_or_init(|| RwLock::new(load_from(None).unwrap_or_default()))
    }

    /// Copy of the shared instance; entry points snapshot once and never
    /// re-read while an algorithm runs.
    pub fn snapshot() -> Settings {
        *Self::shared().read().expect("settings lock poisoned")
    }

    pub fn replace(settings: Settings) {
        *Self::shared().write().expect("settings lock poisoned") = settings;
    }
}

/// Best-effort config path: local working directory first, then the
/// platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("magnetics.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("magnetics").join("magnetics.toml");
    }
    PathBuf::from("magnetics.toml")
}

/// Load settings from `path` (or the discovered location). A missing file or
/// a parse error falls back to defaults; partial files override only the
/// keys they name.
pub fn load_from(path: Option<PathBuf>) -> Result<Settings> {
    let path = path.unwrap_or_else(discover);
    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<Settings>(&content) {
            Ok(settings) => {
                info!(target: "config", path = %path.display(), "settings loaded");
                Ok(settings)
            }
            Err(error) => {
                info!(target: "config", path = %path.display(), %error, "settings parse failed, using defaults");
                Ok(Settings::default())
            }
        },
        Err(_) => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn defaults_are_conservative() {
        let settings = Settings::default();
        assert!(!settings.coil.wind_even_if_not_fit);
        assert!(settings.coil.delimit_and_compact);
        assert!(settings.coil.try_rewind);
        assert!(settings.wire_adviser.include_round);
        assert!(!settings.wire_adviser.include_planar);
        assert!(!settings.wire_adviser.allow_rectangular_in_toroidal_cores);
    }

    #[test]
    fn partial_file_overrides_named_keys_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[coil]\ntry_rewind = false\n\n[wire_adviser]\ninclude_planar = true"
        )
        .unwrap();
        let settings = load_from(Some(file.path().to_path_buf())).unwrap();
        assert!(!settings.coil.try_rewind);
        assert!(settings.wire_adviser.include_planar);
        // Unnamed keys keep their defaults.
        assert!(settings.coil.delimit_and_compact);
        assert_eq!(settings.leakage_inductance.grid_precision_level_wound, 1);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[coil\nnot toml at all").unwrap();
        let settings = load_from(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn missing_file_is_defaults() {
        let settings = load_from(Some(PathBuf::from("/nonexistent/magnetics.toml"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[coil]\ntry_rewind = false\nfuture_knob = 3").unwrap();
        let settings = load_from(Some(file.path().to_path_buf())).unwrap();
        assert!(!settings.coil.try_rewind);
    }
}
