// ── Generic entity collection ──
//
// Concurrent id index plus an ordered snapshot. The snapshot keeps
// server order and is swapped whole on every write.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::EntityId;

/// Storage for a single entity type.
///
/// `DashMap` gives O(1) lookups by id; the `watch` cell holds the
/// records in the order the server returned them, so readers clone an
/// `Arc` instead of taking a lock over the whole list.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    by_id: DashMap<EntityId, Arc<T>>,

    /// Ordered snapshot, rebuilt on every write.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            snapshot,
        }
    }

    /// Replace the whole collection with a fresh fetch (last fetch wins).
    pub(crate) fn replace_all(&self, items: Vec<(EntityId, T)>) {
        self.by_id.clear();
        let mut ordered = Vec::with_capacity(items.len());
        for (id, item) in items {
            let item = Arc::new(item);
            self.by_id.insert(id, Arc::clone(&item));
            ordered.push(item);
        }
        self.snapshot.send_replace(Arc::new(ordered));
    }

    /// Insert or update one entity. New ids go to the front of the
    /// snapshot; existing ones are replaced in place. Returns `true`
    /// if the id was new.
    pub(crate) fn upsert(&self, id: EntityId, entity: T) -> bool {
        let entity = Arc::new(entity);
        let previous = self.by_id.insert(id, Arc::clone(&entity));
        let is_new = previous.is_none();

        self.snapshot.send_modify(|snap| {
            let mut items: Vec<Arc<T>> = snap.as_ref().clone();
            match previous.and_then(|old| items.iter().position(|i| Arc::ptr_eq(i, &old))) {
                Some(pos) => items[pos] = Arc::clone(&entity),
                None => items.insert(0, Arc::clone(&entity)),
            }
            *snap = Arc::new(items);
        });

        is_new
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_id.len()
    }
}
