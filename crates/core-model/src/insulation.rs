//! Insulation material descriptions consumed by the insulation planner and
//! referenced from insulation layers.

use serde::{Deserialize, Serialize};

/// A tape/film insulation material. The planner iterates the available tape
/// thicknesses and multiplies the per-layer breakdown voltage to reach a
/// required withstand voltage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsulationMaterial {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    /// Tape thicknesses the material ships in, metres, unsorted.
    pub available_thicknesses: Vec<f64>,
    /// Withstand voltage of one layer at the thinnest available thickness.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakdown_voltage_per_layer: Option<f64>,
    /// V/m; scales breakdown with thickness when per-layer voltage is absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dielectric_strength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_permittivity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_temperature: Option<f64>,
}

impl InsulationMaterial {
    pub fn thinner_tape_thickness(&self) -> Option<f64> {
        self.available_thicknesses
            .iter()
            .copied()
            .fold(None, |acc: Option<f64>, t| match acc {
                Some(best) if best <= t => Some(best),
                _ => Some(t),
            })
    }

    /// Withstand voltage of one layer at the given thickness.
    pub fn breakdown_voltage_at(&self, thickness: f64) -> Option<f64> {
        if let Some(strength) = self.dielectric_strength {
            return Some(strength * thickness);
        }
        match (self.breakdown_voltage_per_layer, self.thinner_tape_thickness()) {
            (Some(voltage), Some(thinnest)) if thinnest > 0.0 => {
                Some(voltage * thickness / thinnest)
            }
            (voltage, _) => voltage,
        }
    }
}

/// An insulation material given by value or referenced by catalogue name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InsulationMaterialOrName {
    Material(InsulationMaterial),
    Name(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kapton() -> InsulationMaterial {
        InsulationMaterial {
            name: "Kapton HN".into(),
            manufacturer: Some("DuPont".into()),
            available_thicknesses: vec![50.0e-6, 25.0e-6, 75.0e-6],
            breakdown_voltage_per_layer: None,
            dielectric_strength: Some(154.0e6),
            relative_permittivity: Some(3.4),
            maximum_temperature: Some(400.0),
        }
    }

    #[test]
    fn thinner_tape_is_minimum_thickness() {
        assert_eq!(kapton().thinner_tape_thickness(), Some(25.0e-6));
    }

    #[test]
    fn breakdown_scales_with_thickness() {
        let material = kapton();
        let at_25 = material.breakdown_voltage_at(25.0e-6).unwrap();
        let at_50 = material.breakdown_voltage_at(50.0e-6).unwrap();
        assert!((at_50 / at_25 - 2.0).abs() < 1e-9);
        assert!(at_25 > 3000.0);
    }
}
