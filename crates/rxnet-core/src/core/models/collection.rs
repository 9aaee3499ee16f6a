use slotmap::{Key, SlotMap};
use std::collections::HashMap;

/// Slot-map storage addressed by name, iterated in insertion order.
#[derive(Debug, Clone)]
pub(crate) struct NamedCollection<K: Key, T> {
    items: SlotMap<K, T>,
    order: Vec<K>,
    by_name: HashMap<String, K>,
}

impl<K: Key, T> Default for NamedCollection<K, T> {
    fn default() -> Self {
        Self {
            items: SlotMap::with_key(),
            order: Vec::new(),
            by_name: HashMap::new(),
        }
    }
}

impl<K: Key, T> NamedCollection<K, T> {
    pub fn get(&self, name: &str) -> Option<&T> {
        self.by_name.get(name).and_then(|&id| self.items.get(id))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let id = *self.by_name.get(name)?;
        self.items.get_mut(id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Inserts `item` under `name`. An existing entry with the same name is
    /// replaced in place and returned.
    pub fn insert(&mut self, name: String, item: T) -> Option<T> {
        if let Some(&id) = self.by_name.get(&name) {
            return self.items.get_mut(id).map(|slot| std::mem::replace(slot, item));
        }
        let id = self.items.insert(item);
        self.order.push(id);
        self.by_name.insert(name, id);
        None
    }

    pub fn remove(&mut self, name: &str) -> Option<T> {
        let id = self.by_name.remove(name)?;
        self.order.retain(|&k| k != id);
        self.items.remove(id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.order.clear();
        self.by_name.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|&id| self.items.get(id))
    }
}
