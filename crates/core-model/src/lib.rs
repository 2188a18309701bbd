//! Data model for magnetic component descriptions.
//!
//! Every public entity here round-trips through a canonical camelCase JSON
//! form: struct fields serialise with camelCase names and enumerations as
//! lower-case name strings (`"overlapping"`, `"inner or top"`, `"round"`).
//! The on-disk document is a UTF-8 object with a top-level `magnetic` key
//! holding `{core, coil, manufacturerInfo?, rotation?}`.
//!
//! Ownership model: a [`coil::Coil`] exclusively owns its functional
//! descriptions, groups, sections, layers and turns. Sections, layers and
//! turns refer to one another *by unique name*, never by pointer, so the
//! serialised form carries no cycles. The layout engine (crate `core-coil`)
//! guarantees name uniqueness per kind.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod bobbin;
pub mod coil;
pub mod core;
pub mod insulation;
pub mod wire;

pub use bobbin::{Bobbin, BobbinProcessedDescription, ColumnShape, WindingWindow, WindingWindowShape};
pub use coil::{
    Coil, CoilAlignment, CoilFunctionalDescription, CoilSectionInterface, ElectricalType, Group,
    InsulationLayerPurpose, IsolationSide, Layer, Magnetic, PartialWinding, Section, Turn,
    TurnOrientation, WindingOrientation, WindingStyle, WiringTechnology,
};
pub use coil::BobbinOrName;
pub use core::{Core, CoreColumn, CoreShapeFamily, CoreType};
pub use insulation::{InsulationMaterial, InsulationMaterialOrName};
pub use wire::{InsulationWireCoatingType, Wire, WireCoating, WireOrName, WireStandard, WireType};

pub use core_geometry::Point;

/// Faults raised while resolving model data (missing dimensions, by-name
/// references that were never resolved, malformed documents).
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("wire `{wire}` is missing dimension `{field}`")]
    MissingWireDimension { wire: String, field: &'static str },
    #[error("bobbin has no processed description")]
    MissingBobbinDescription,
    #[error("core `{0}` has no processed winding window")]
    MissingCoreWindow(String),
    #[error("litz wire `{0}` carries no strand description")]
    MissingStrand(String),
    #[error("reference `{0}` has not been resolved against the catalogue")]
    UnresolvedReference(String),
}

/// Coordinate system tag carried by sections, layers and turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSystem {
    #[serde(rename = "cartesian")]
    Cartesian,
    #[serde(rename = "polar")]
    Polar,
}

/// A dimension that may carry manufacturing tolerance. Catalogue entries
/// usually provide all three bounds; ad-hoc wires often only the nominal.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionWithTolerance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nominal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
}

impl DimensionWithTolerance {
    pub fn nominal(value: f64) -> Self {
        Self {
            nominal: Some(value),
            ..Default::default()
        }
    }

    /// Resolution rule: nominal wins; otherwise the mean of whichever bounds
    /// exist; `None` when the dimension is completely unspecified.
    pub fn resolve(&self) -> Option<f64> {
        if let Some(nominal) = self.nominal {
            return Some(nominal);
        }
        match (self.minimum, self.maximum) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            (Some(min), None) => Some(min),
            (None, Some(max)) => Some(max),
            (None, None) => None,
        }
    }
}

impl From<f64> for DimensionWithTolerance {
    fn from(value: f64) -> Self {
        Self::nominal(value)
    }
}
