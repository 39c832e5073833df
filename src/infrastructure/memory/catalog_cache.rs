//! In-Memory Catalog Cache Implementation

use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{CatalogCachePort, CatalogSnapshot};

#[derive(Default)]
struct Slot {
    generation: u64,
    snapshot: Option<Arc<CatalogSnapshot>>,
}

/// 内存目录缓存
///
/// 关闭时 `get` 永远未命中，`put` 只包装快照不保存。
/// 世代号的比较与写入在同一个分片锁内完成，与 `invalidate` 互斥。
pub struct InMemoryCatalogCache {
    slots: DashMap<Uuid, Slot>,
    enabled: bool,
}

impl InMemoryCatalogCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            slots: DashMap::new(),
            enabled,
        }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 已缓存的快照数量
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.snapshot.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryCatalogCache {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CatalogCachePort for InMemoryCatalogCache {
    fn get(&self, novel_id: Uuid) -> Option<Arc<CatalogSnapshot>> {
        if !self.enabled {
            return None;
        }
        let hit = self
            .slots
            .get(&novel_id)
            .and_then(|slot| slot.snapshot.clone());
        tracing::trace!(novel_id = %novel_id, hit = hit.is_some(), "Catalog cache lookup");
        hit
    }

    fn generation(&self, novel_id: Uuid) -> u64 {
        self.slots
            .get(&novel_id)
            .map(|slot| slot.generation)
            .unwrap_or(0)
    }

    fn put(&self, snapshot: CatalogSnapshot, generation: u64) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(snapshot);
        if !self.enabled {
            return snapshot;
        }

        let mut slot = self.slots.entry(snapshot.novel.id).or_default();
        if slot.generation == generation {
            slot.snapshot = Some(snapshot.clone());
        } else {
            tracing::debug!(
                novel_id = %snapshot.novel.id,
                read_generation = generation,
                current_generation = slot.generation,
                "Discarding catalog snapshot read before invalidation"
            );
        }
        snapshot
    }

    fn invalidate(&self, novel_id: Uuid) {
        if !self.enabled {
            return;
        }
        let mut slot = self.slots.entry(novel_id).or_default();
        slot.generation += 1;
        if slot.snapshot.take().is_some() {
            tracing::debug!(novel_id = %novel_id, "Catalog cache invalidated");
        }
    }
}
