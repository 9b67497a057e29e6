//! Contact model - owner-scoped address book entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "_id")]
    pub id: String,
    /// Id of the user this contact belongs to. Every query is scoped by it.
    pub owner_id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub favorite: bool,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn new(owner_id: String, name: String, email: String, phone: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            owner_id,
            name,
            email,
            phone,
            favorite: false,
            created_at: Utc::now(),
        }
    }
}

/// Partial update for a contact; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub favorite: Option<bool>,
}

impl ContactUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.favorite.is_none()
    }
}
