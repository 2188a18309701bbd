//! Bobbin geometry: the winding window the layout engine packs into, plus
//! the column the turns wrap around.
//!
//! Two window flavours exist. Rectangular windows (two-column cores wound on
//! a physical bobbin) are described by `width × height` around a centre in
//! cartesian metres. Radial windows (toroids, wound without a bobbin) are
//! described by `radial_height × angle` where the radial height is the
//! usable depth from the window edge towards the centre and the angle is the
//! covered arc in degrees, normally 360.

use serde::{Deserialize, Serialize};

use crate::core::{Core, CoreType};
use crate::{CoilAlignment, ModelError, Point, WindingOrientation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnShape {
    #[serde(rename = "round")]
    Round,
    #[serde(rename = "rectangular")]
    Rectangular,
    #[serde(rename = "oblong")]
    Oblong,
    #[serde(rename = "irregular")]
    Irregular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindingWindowShape {
    #[serde(rename = "rectangular")]
    Rectangular,
    #[serde(rename = "round")]
    Round,
}

/// One winding window. Field presence decides the shape: rectangular
/// windows carry `width`/`height`, radial windows `radial_height`/`angle`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindingWindow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radial_height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections_orientation: Option<WindingOrientation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections_alignment: Option<CoilAlignment>,
}

impl WindingWindow {
    pub fn rectangular(width: f64, height: f64, coordinates: Point) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            area: Some(width * height),
            coordinates: Some(coordinates),
            ..Default::default()
        }
    }

    pub fn radial(radial_height: f64, angle: f64) -> Self {
        Self {
            radial_height: Some(radial_height),
            angle: Some(angle),
            area: Some(std::f64::consts::PI * radial_height * radial_height * angle / 360.0),
            coordinates: Some([0.0, 0.0]),
            ..Default::default()
        }
    }

    pub fn shape(&self) -> WindingWindowShape {
        if self.radial_height.is_some() && self.angle.is_some() {
            WindingWindowShape::Round
        } else {
            WindingWindowShape::Rectangular
        }
    }

    pub fn centre(&self) -> Point {
        self.coordinates.unwrap_or([0.0, 0.0])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BobbinProcessedDescription {
    pub column_shape: ColumnShape,
    /// Column radius along the window axis (x for cartesian windows).
    pub column_width: f64,
    /// Column half-depth orthogonal to the window plane.
    pub column_depth: f64,
    #[serde(default)]
    pub column_thickness: f64,
    #[serde(default)]
    pub wall_thickness: f64,
    pub winding_windows: Vec<WindingWindow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Point>,
}

/// A bobbin, possibly virtual. Toroids and coil formers without a physical
/// bobbin still get one so the engine has a single source for window and
/// column geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bobbin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub processed_description: BobbinProcessedDescription,
}

impl Bobbin {
    pub fn new(processed_description: BobbinProcessedDescription) -> Self {
        Self {
            name: None,
            processed_description,
        }
    }

    /// Build the virtual bobbin for a core wound without one. For toroids
    /// the winding window is the full inner circle; for two-column cores the
    /// core window is taken as-is with zero wall and column thickness.
    pub fn simple_bobbin(core: &Core) -> Result<Self, ModelError> {
        let window = core
            .winding_window()
            .ok_or_else(|| ModelError::MissingCoreWindow(core.display_name().to_string()))?;
        let column = core.main_column();
        let toroidal = core.core_type() == CoreType::Toroidal;
        let processed = BobbinProcessedDescription {
            // A toroid's "column" is the core ring cross-section itself.
            column_shape: if toroidal {
                column.map(|c| c.shape).unwrap_or(ColumnShape::Rectangular)
            } else {
                column.map(|c| c.shape).unwrap_or(ColumnShape::Round)
            },
            // Half-dimensions throughout, so the turn-length formulas treat
            // two-column and toroidal columns alike.
            column_width: column.map(|c| c.width / 2.0).unwrap_or(0.0),
            column_depth: column.map(|c| c.depth / 2.0).unwrap_or(0.0),
            column_thickness: 0.0,
            wall_thickness: 0.0,
            winding_windows: vec![window.clone()],
            coordinates: Some([0.0, 0.0]),
        };
        Ok(Self {
            name: core.name.clone().map(|n| format!("Bobbin for {n}")),
            processed_description: processed,
        })
    }

    pub fn winding_window(&self) -> Result<&WindingWindow, ModelError> {
        self.processed_description
            .winding_windows
            .first()
            .ok_or(ModelError::MissingBobbinDescription)
    }

    pub fn winding_window_shape(&self) -> Result<WindingWindowShape, ModelError> {
        Ok(self.winding_window()?.shape())
    }

    pub fn column_shape(&self) -> ColumnShape {
        self.processed_description.column_shape
    }

    pub fn column_width(&self) -> f64 {
        self.processed_description.column_width
    }

    pub fn column_depth(&self) -> f64 {
        self.processed_description.column_depth
    }

    /// Outer bounding box of a fully wound bobbin, used by collaborators to
    /// reserve space around the component.
    pub fn maximum_outer_dimensions(&self) -> Result<[f64; 2], ModelError> {
        let window = self.winding_window()?;
        match window.shape() {
            WindingWindowShape::Rectangular => {
                let width = window.width.unwrap_or(0.0);
                let height = window.height.unwrap_or(0.0);
                let centre = window.centre();
                Ok([2.0 * (centre[0] + width / 2.0), height + 2.0 * self.processed_description.wall_thickness])
            }
            WindingWindowShape::Round => {
                let radial = window.radial_height.unwrap_or(0.0);
                Ok([2.0 * radial, 2.0 * radial])
            }
        }
    }
}
