use std::collections::BTreeMap;
use std::rc::Rc;

use foundation::signature::Signature;

use crate::layer::RenderableLayer;

/// Last build of one layer id. `renderable` is `None` when the build
/// produced nothing to draw; that outcome is cached too.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub renderable: Option<Rc<RenderableLayer>>,
    pub signature: Signature,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoizes built layers keyed by id and the signature of their inputs.
///
/// A hit hands back the same `Rc`, so callers (and the renderer) can detect
/// an unchanged layer with `Rc::ptr_eq`.
#[derive(Debug, Default)]
pub struct LayerCache {
    entries: BTreeMap<String, CacheEntry>,
    stats: CacheStats,
}

impl LayerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build<F>(
        &mut self,
        layer_id: &str,
        signature: Signature,
        build: F,
    ) -> Option<Rc<RenderableLayer>>
    where
        F: FnOnce() -> Option<RenderableLayer>,
    {
        if let Some(entry) = self.entries.get(layer_id)
            && entry.signature == signature
        {
            self.stats.hits += 1;
            return entry.renderable.clone();
        }

        self.stats.misses += 1;
        let renderable = build().map(Rc::new);
        self.entries.insert(
            layer_id.to_string(),
            CacheEntry {
                renderable: renderable.clone(),
                signature,
            },
        );
        renderable
    }

    pub fn get(&self, layer_id: &str) -> Option<&CacheEntry> {
        self.entries.get(layer_id)
    }

    pub fn invalidate(&mut self, layer_id: &str) -> bool {
        self.entries.remove(layer_id).is_some()
    }

    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}
