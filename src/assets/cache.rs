use std::collections::HashMap;
use std::sync::Arc;

use rayon::prelude::*;

use crate::assets::decode::{PreparedImage, decode_image};
use crate::assets::resolver::AssetResolver;
use crate::foundation::error::{ReelError, ReelResult};
use crate::scene::model::Storyboard;

/// Write-once store of decoded scene images, aligned 1:1 with the storyboard.
///
/// Populated by the first successful [`AssetCache::ensure_loaded`]; read-only afterwards.
/// A failed load leaves the cache cold so the next session retries from scratch.
#[derive(Debug, Default)]
pub(crate) struct AssetCache {
    images: Option<Arc<[PreparedImage]>>,
}

impl AssetCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// `true` once every scene image is decoded.
    pub(crate) fn is_warm(&self) -> bool {
        self.images.is_some()
    }

    /// Decode every scene image, in parallel, unless already cached.
    ///
    /// Duplicate references are fetched and decoded once. The first failure aborts the whole
    /// load with [`ReelError::AssetLoad`] naming the reference; nothing is retried.
    #[tracing::instrument(skip_all, fields(scenes = storyboard.len()))]
    pub(crate) fn ensure_loaded(
        &mut self,
        storyboard: &Storyboard,
        resolver: &dyn AssetResolver,
    ) -> ReelResult<Arc<[PreparedImage]>> {
        if let Some(images) = &self.images {
            tracing::trace!("asset cache hit");
            return Ok(Arc::clone(images));
        }

        let mut unique: Vec<&str> = Vec::new();
        let mut slot_of: HashMap<&str, usize> = HashMap::new();
        for scene in storyboard.scenes() {
            slot_of.entry(scene.image.as_str()).or_insert_with(|| {
                unique.push(scene.image.as_str());
                unique.len() - 1
            });
        }

        let decoded: Vec<PreparedImage> = unique
            .par_iter()
            .map(|&reference| load_one(resolver, reference))
            .collect::<ReelResult<_>>()?;

        let images: Arc<[PreparedImage]> = storyboard
            .scenes()
            .iter()
            .map(|scene| decoded[slot_of[scene.image.as_str()]].clone())
            .collect();

        tracing::info!(
            scenes = images.len(),
            unique = decoded.len(),
            "scene images decoded"
        );
        self.images = Some(Arc::clone(&images));
        Ok(images)
    }
}

fn load_one(resolver: &dyn AssetResolver, reference: &str) -> ReelResult<PreparedImage> {
    let bytes = resolver
        .fetch(reference)
        .map_err(|e| ReelError::asset_load(reference, format!("{e:#}")))?;
    decode_image(&bytes).map_err(|e| ReelError::asset_load(reference, format!("{e:#}")))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
