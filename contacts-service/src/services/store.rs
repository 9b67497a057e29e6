//! Storage contracts for user and contact records, plus the in-memory
//! implementation used by tests.
//!
//! The traits capture the narrow store surface the services rely on:
//! lookups by email/token/id, conflict-checked inserts, and typed partial
//! updates. MongoDB provides the production implementation in
//! `database.rs`; `MemoryStore` mirrors its semantics (including unique
//! emails and atomic token-matched verification) behind a mutex.

use async_trait::async_trait;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{Contact, ContactUpdate, User, UserUpdate};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user. Fails with `AppError::Conflict` when the email is
    /// already taken; uniqueness is enforced by the store, not by callers.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    /// Apply a partial update, returning the updated record.
    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>, AppError>;

    /// Atomically mark the user holding `token` as verified and clear the
    /// token. Returns `None` when no user holds the token, which is also
    /// what a second verification attempt sees.
    async fn verify_user_by_token(&self, token: &str) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn list_contacts(&self, owner_id: &str) -> Result<Vec<Contact>, AppError>;

    async fn find_contact(&self, owner_id: &str, id: &str) -> Result<Option<Contact>, AppError>;

    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError>;

    async fn update_contact(
        &self,
        owner_id: &str,
        id: &str,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, AppError>;

    async fn delete_contact(&self, owner_id: &str, id: &str) -> Result<Option<Contact>, AppError>;
}

/// Combined store handle with a liveness probe, so the router and health
/// check can hold a single `Arc<dyn Store>`.
#[async_trait]
pub trait Store: UserStore + ContactStore {
    async fn health_check(&self) -> Result<(), AppError>;
}

fn apply_user_update(user: &mut User, update: UserUpdate) {
    if let Some(verified) = update.verified {
        user.verified = verified;
    }
    if let Some(token) = update.verification_token {
        user.verification_token = token;
    }
    if let Some(token) = update.session_token {
        user.session_token = token;
    }
    if let Some(tier) = update.subscription {
        user.subscription = tier;
    }
    if let Some(url) = update.avatar_url {
        user.avatar_url = url;
    }
}

fn apply_contact_update(contact: &mut Contact, update: ContactUpdate) {
    if let Some(name) = update.name {
        contact.name = name;
    }
    if let Some(email) = update.email {
        contact.email = email;
    }
    if let Some(phone) = update.phone {
        contact.phone = phone;
    }
    if let Some(favorite) = update.favorite {
        contact.favorite = favorite;
    }
}

/// In-memory store used by unit and integration tests, same role as the
/// mock email provider.
#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<String, User>>,
    contacts: Mutex<HashMap<String, Contact>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().expect("users lock poisoned");
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().expect("users lock poisoned");
        Ok(users.get(id).cloned())
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.lock().expect("users lock poisoned");
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict(anyhow::anyhow!("Email in use")));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().expect("users lock poisoned");
        Ok(users.get_mut(id).map(|user| {
            apply_user_update(user, update);
            user.clone()
        }))
    }

    async fn verify_user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        let mut users = self.users.lock().expect("users lock poisoned");
        let user = users
            .values_mut()
            .find(|u| u.verification_token.as_deref() == Some(token));

        Ok(user.map(|user| {
            user.verified = true;
            user.verification_token = None;
            user.clone()
        }))
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn list_contacts(&self, owner_id: &str) -> Result<Vec<Contact>, AppError> {
        let contacts = self.contacts.lock().expect("contacts lock poisoned");
        let mut owned: Vec<Contact> = contacts
            .values()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(owned)
    }

    async fn find_contact(&self, owner_id: &str, id: &str) -> Result<Option<Contact>, AppError> {
        let contacts = self.contacts.lock().expect("contacts lock poisoned");
        Ok(contacts
            .get(id)
            .filter(|c| c.owner_id == owner_id)
            .cloned())
    }

    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError> {
        let mut contacts = self.contacts.lock().expect("contacts lock poisoned");
        contacts.insert(contact.id.clone(), contact.clone());
        Ok(())
    }

    async fn update_contact(
        &self,
        owner_id: &str,
        id: &str,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, AppError> {
        let mut contacts = self.contacts.lock().expect("contacts lock poisoned");
        Ok(contacts
            .get_mut(id)
            .filter(|c| c.owner_id == owner_id)
            .map(|contact| {
                apply_contact_update(contact, update);
                contact.clone()
            }))
    }

    async fn delete_contact(&self, owner_id: &str, id: &str) -> Result<Option<Contact>, AppError> {
        let mut contacts = self.contacts.lock().expect("contacts lock poisoned");
        match contacts.get(id) {
            Some(c) if c.owner_id == owner_id => Ok(contacts.remove(id)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
