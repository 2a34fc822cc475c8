//! Seam to the external model loader.
//!
//! The simulation only asks for a model by key and records whether it got
//! one. A missing model never blocks spawning.

use serde::{Deserialize, Serialize};

use crate::enums::HullKind;

/// Opaque handle issued by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelHandle(pub u64);

/// External model cache.
pub trait ModelLoader: Send {
    /// Look up (or start loading) a model. `None` means "use the fallback".
    fn load(&mut self, key: &str) -> Option<ModelHandle>;
}

/// Loader that never has anything. Used by headless runs and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLoader;

impl ModelLoader for NullLoader {
    fn load(&mut self, _key: &str) -> Option<ModelHandle> {
        None
    }
}

/// Which model a hull uses and how big to draw it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullModelSpec {
    pub asset_key: &'static str,
    pub scale: f64,
}

/// Asset key for hostile fighters.
pub const HOSTILE_MODEL_KEY: &str = "hostile_fighter";

pub fn hull_model_spec(hull: HullKind) -> HullModelSpec {
    match hull {
        HullKind::Interceptor => HullModelSpec {
            asset_key: "interceptor",
            scale: 0.45,
        },
        HullKind::Bomber => HullModelSpec {
            asset_key: "bomber",
            scale: 0.65,
        },
        HullKind::Dreadnought => HullModelSpec {
            asset_key: "capital",
            scale: 0.9,
        },
    }
}
