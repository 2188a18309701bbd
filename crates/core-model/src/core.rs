//! Core description, consumed here purely as geometry.
//!
//! The layout engine only needs the shape family (which decides the window
//! coordinate system), the winding windows and the column the turns wrap
//! around. Saturation flux density and initial permeability ride along as
//! hooks for the physical models that read the produced layout.

use serde::{Deserialize, Serialize};

use crate::bobbin::{ColumnShape, WindingWindow};
use crate::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreType {
    #[serde(rename = "two-piece set")]
    TwoPieceSet,
    #[serde(rename = "toroidal")]
    Toroidal,
    #[serde(rename = "piece and plate")]
    PieceAndPlate,
    #[serde(rename = "closed shape")]
    ClosedShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreShapeFamily {
    #[serde(rename = "e")]
    E,
    #[serde(rename = "etd")]
    Etd,
    #[serde(rename = "er")]
    Er,
    #[serde(rename = "pq")]
    Pq,
    #[serde(rename = "rm")]
    Rm,
    #[serde(rename = "pot")]
    Pot,
    #[serde(rename = "u")]
    U,
    #[serde(rename = "ur")]
    Ur,
    #[serde(rename = "t")]
    T,
    #[serde(rename = "planar e")]
    PlanarE,
}

impl CoreShapeFamily {
    pub fn core_type(self) -> CoreType {
        match self {
            CoreShapeFamily::T => CoreType::Toroidal,
            CoreShapeFamily::U | CoreShapeFamily::Ur => CoreType::TwoPieceSet,
            _ => CoreType::TwoPieceSet,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoreColumnType {
    #[serde(rename = "central")]
    Central,
    #[serde(rename = "lateral")]
    Lateral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreColumn {
    #[serde(rename = "type")]
    pub column_type: CoreColumnType,
    pub shape: ColumnShape,
    /// Full width (diameter for round columns).
    pub width: f64,
    pub depth: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Point>,
}

/// Material hooks the physical models consume; the layout engine carries
/// them untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreMaterial {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnetic_flux_density_saturation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_permeability: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreShape {
    pub family: CoreShapeFamily,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Core {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub shape: CoreShape,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material: Option<CoreMaterial>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<CoreColumn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub winding_windows: Vec<WindingWindow>,
}

impl Core {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.shape.name.as_deref())
            .unwrap_or("unnamed core")
    }

    pub fn core_type(&self) -> CoreType {
        self.shape.family.core_type()
    }

    pub fn winding_window(&self) -> Option<&WindingWindow> {
        self.winding_windows.first()
    }

    /// The column the winding wraps: the central one when present,
    /// otherwise the first described.
    pub fn main_column(&self) -> Option<&CoreColumn> {
        self.columns
            .iter()
            .find(|c| c.column_type == CoreColumnType::Central)
            .or_else(|| self.columns.first())
    }

    pub fn magnetic_flux_density_saturation(&self) -> Option<f64> {
        self.material
            .as_ref()
            .and_then(|m| m.magnetic_flux_density_saturation)
    }

    pub fn initial_permeability(&self) -> Option<f64> {
        self.material.as_ref().and_then(|m| m.initial_permeability)
    }

    /// Two-column (E-like) core described straight from its window and
    /// column dimensions, for tests and ad-hoc designs.
    pub fn two_column(
        name: impl Into<String>,
        family: CoreShapeFamily,
        window_width: f64,
        window_height: f64,
        column_width: f64,
        column_depth: f64,
    ) -> Self {
        let window_centre = [column_width / 2.0 + window_width / 2.0, 0.0];
        Self {
            name: Some(name.into()),
            shape: CoreShape { family, name: None },
            material: None,
            columns: vec![CoreColumn {
                column_type: CoreColumnType::Central,
                shape: ColumnShape::Round,
                width: column_width,
                depth: column_depth,
                height: window_height,
                coordinates: Some([0.0, 0.0]),
            }],
            winding_windows: vec![WindingWindow::rectangular(
                window_width,
                window_height,
                window_centre,
            )],
        }
    }

    /// Toroidal core from its outer diameter, inner diameter and height.
    pub fn toroidal(name: impl Into<String>, outer_diameter: f64, inner_diameter: f64, height: f64) -> Self {
        let ring_thickness = (outer_diameter - inner_diameter) / 2.0;
        Self {
            name: Some(name.into()),
            shape: CoreShape {
                family: CoreShapeFamily::T,
                name: None,
            },
            material: None,
            columns: vec![CoreColumn {
                column_type: CoreColumnType::Central,
                shape: ColumnShape::Rectangular,
                width: ring_thickness,
                depth: height,
                height: ring_thickness,
                coordinates: Some([0.0, 0.0]),
            }],
            winding_windows: vec![WindingWindow::radial(inner_diameter / 2.0, 360.0)],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toroid_family_maps_to_toroidal_type() {
        let core = Core::toroidal("T 48/28/16", 48.0e-3, 28.0e-3, 16.0e-3);
        assert_eq!(core.core_type(), CoreType::Toroidal);
        let window = core.winding_window().unwrap();
        assert_eq!(window.radial_height, Some(14.0e-3));
        assert_eq!(window.angle, Some(360.0));
    }

    #[test]
    fn two_column_window_centre_sits_past_the_column() {
        let core = Core::two_column("E 42/33/20", CoreShapeFamily::E, 7.0e-3, 29.5e-3, 12.2e-3, 20.0e-3);
        let window = core.winding_window().unwrap();
        let centre = window.centre();
        assert!(centre[0] > 12.2e-3 / 2.0);
        assert_eq!(core.core_type(), CoreType::TwoPieceSet);
    }

    #[test]
    fn material_hooks_pass_through() {
        let mut core = Core::toroidal("T", 48.0e-3, 28.0e-3, 16.0e-3);
        core.material = Some(CoreMaterial {
            name: "3C97".into(),
            magnetic_flux_density_saturation: Some(0.41),
            initial_permeability: Some(3000.0),
        });
        assert_eq!(core.magnetic_flux_density_saturation(), Some(0.41));
        assert_eq!(core.initial_permeability(), Some(3000.0));
    }
}
