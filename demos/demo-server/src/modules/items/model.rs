use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub label: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(label: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            label,
            done: false,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateItem {
    pub label: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateItem {
    pub label: Option<String>,
    pub done: Option<bool>,
}
