use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use super::model::Item;

/// In-memory item storage shared across requests
#[derive(Default)]
pub struct ItemStore {
    items: RwLock<HashMap<Uuid, Item>>,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, done: Option<bool>) -> Vec<Item> {
        let items = self.items.read().unwrap();
        let mut listed: Vec<Item> = items
            .values()
            .filter(|item| done.is_none_or(|done| item.done == done))
            .cloned()
            .collect();
        listed.sort_by_key(|item| item.created_at);
        listed
    }

    pub fn get(&self, id: &Uuid) -> Option<Item> {
        self.items.read().unwrap().get(id).cloned()
    }

    pub fn find_by_label(&self, label: &str) -> Option<Item> {
        self.items
            .read()
            .unwrap()
            .values()
            .find(|item| item.label == label)
            .cloned()
    }

    pub fn insert(&self, item: Item) {
        self.items.write().unwrap().insert(item.id, item);
    }

    pub fn update(&self, id: &Uuid, apply: impl FnOnce(&mut Item)) -> Option<Item> {
        let mut items = self.items.write().unwrap();
        let item = items.get_mut(id)?;
        apply(item);
        Some(item.clone())
    }

    pub fn remove(&self, id: &Uuid) -> Option<Item> {
        self.items.write().unwrap().remove(id)
    }
}
