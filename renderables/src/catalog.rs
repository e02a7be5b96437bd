//! Synchronous readiness queries answered by the effect material and
//! texture subsystems.
//!
//! Plain closures implement both traits:
//!
//! ```ignore
//! let effects: Arc<dyn EffectMaterialQuery> = Arc::new(|id: &EffectMaterialId| library.has(id));
//! ```

use crate::id::{EffectMaterialId, TextureId};

pub trait EffectMaterialQuery: Send + Sync {
    /// Whether the effect material is already loaded.
    fn is_ready(&self, id: &EffectMaterialId) -> bool;
}

pub trait TextureQuery: Send + Sync {
    /// Whether the texture is already loaded.
    fn is_ready(&self, id: &TextureId) -> bool;
}

impl<F> EffectMaterialQuery for F
where
    F: Fn(&EffectMaterialId) -> bool + Send + Sync,
{
    fn is_ready(&self, id: &EffectMaterialId) -> bool {
        self(id)
    }
}

impl<F> TextureQuery for F
where
    F: Fn(&TextureId) -> bool + Send + Sync,
{
    fn is_ready(&self, id: &TextureId) -> bool {
        self(id)
    }
}
