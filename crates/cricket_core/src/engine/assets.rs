//! Asset boundary
//!
//! The renderer's loader reports which models it managed to load. The core
//! only hands out identifiers; anything missing is swapped for a primitive
//! placeholder so the match keeps going.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::error::CoreError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    Batsman,
    Bowler,
    Fielder,
    WicketKeeper,
    Ball,
    Bat,
    Stumps,
    Pitch,
    Stadium,
}

impl AssetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKind::Batsman => "batsman",
            AssetKind::Bowler => "bowler",
            AssetKind::Fielder => "fielder",
            AssetKind::WicketKeeper => "wicket_keeper",
            AssetKind::Ball => "ball",
            AssetKind::Bat => "bat",
            AssetKind::Stumps => "stumps",
            AssetKind::Pitch => "pitch",
            AssetKind::Stadium => "stadium",
        }
    }

    pub fn placeholder(&self) -> PlaceholderShape {
        match self {
            AssetKind::Batsman | AssetKind::Bowler | AssetKind::Fielder | AssetKind::WicketKeeper => {
                PlaceholderShape::Capsule { radius_m: 0.3, height_m: 1.8 }
            }
            AssetKind::Ball => PlaceholderShape::Sphere { radius_m: 0.036 },
            AssetKind::Bat => PlaceholderShape::Box { size_m: [0.11, 0.86, 0.06] },
            AssetKind::Stumps => PlaceholderShape::Box { size_m: [0.23, 0.71, 0.04] },
            AssetKind::Pitch => PlaceholderShape::Box { size_m: [3.05, 0.01, 20.12] },
            AssetKind::Stadium => PlaceholderShape::Cylinder { radius_m: 70.0, height_m: 0.5 },
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PlaceholderShape {
    Capsule { radius_m: f32, height_m: f32 },
    Sphere { radius_m: f32 },
    Box { size_m: [f32; 3] },
    Cylinder { radius_m: f32, height_m: f32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AssetRef {
    Loaded { id: String },
    Placeholder { shape: PlaceholderShape },
}

impl AssetRef {
    pub fn is_placeholder(&self) -> bool {
        matches!(self, AssetRef::Placeholder { .. })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetCatalog {
    loaded: HashMap<AssetKind, String>,
    warned: HashSet<AssetKind>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader reports a model as available
    pub fn register(&mut self, kind: AssetKind, id: impl Into<String>) {
        self.loaded.insert(kind, id.into());
        self.warned.remove(&kind);
    }

    /// Loader reports a model failed or was unloaded
    pub fn mark_unavailable(&mut self, kind: AssetKind) {
        self.loaded.remove(&kind);
    }

    pub fn is_loaded(&self, kind: AssetKind) -> bool {
        self.loaded.contains_key(&kind)
    }

    /// Model to draw for `kind`; a placeholder if it never loaded.
    /// The first miss per kind is logged.
    pub fn model_for(&mut self, kind: AssetKind) -> AssetRef {
        if let Some(id) = self.loaded.get(&kind) {
            return AssetRef::Loaded { id: id.clone() };
        }
        if self.warned.insert(kind) {
            let err = CoreError::AssetUnavailable { kind: kind.to_string() };
            log::warn!("{err}; using placeholder");
        }
        AssetRef::Placeholder { shape: kind.placeholder() }
    }

    /// Kinds that have fallen back to a placeholder at least once
    pub fn substituted(&self) -> impl Iterator<Item = AssetKind> + '_ {
        self.warned.iter().copied()
    }
}
