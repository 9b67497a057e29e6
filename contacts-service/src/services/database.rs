//! MongoDB-backed store.
//!
//! Index initialization runs once at startup; the unique index on
//! `users.email` is what turns a duplicate registration into a write
//! error, which we translate to a conflict here instead of pre-checking
//! in the service layer.

use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, IndexOptions, ReturnDocument};
use mongodb::{Client, Collection, Database, IndexModel};
use service_core::error::AppError;
use tracing::info;

use crate::models::{Contact, ContactUpdate, User, UserUpdate};
use crate::services::store::{ContactStore, Store, UserStore};

const USERS_COLLECTION: &str = "users";
const CONTACTS_COLLECTION: &str = "contacts";

/// Mongo duplicate-key write error.
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Clone)]
pub struct MongoDb {
    db: Database,
}

impl MongoDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        let client = Client::with_uri_str(uri).await?;
        let db = client.database(database);
        info!(database, "connected to MongoDB");
        Ok(Self { db })
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection(USERS_COLLECTION)
    }

    pub fn contacts(&self) -> Collection<Contact> {
        self.db.collection(CONTACTS_COLLECTION)
    }

    /// Create the indexes the queries rely on. Safe to call on every boot;
    /// Mongo treats matching index specs as a no-op.
    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        let unique_email = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        let verification_token = IndexModel::builder()
            .keys(doc! { "verification_token": 1 })
            .options(IndexOptions::builder().sparse(true).build())
            .build();
        self.users()
            .create_indexes([unique_email, verification_token], None)
            .await?;

        let owner = IndexModel::builder().keys(doc! { "owner_id": 1 }).build();
        self.contacts().create_indexes([owner], None).await?;

        info!("database indexes initialized");
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_err)) => {
            write_err.code == DUPLICATE_KEY_CODE
        }
        _ => false,
    }
}

fn optional_string(value: &Option<String>) -> Bson {
    match value {
        Some(s) => Bson::String(s.clone()),
        None => Bson::Null,
    }
}

fn user_update_doc(update: &UserUpdate) -> Document {
    let mut set = Document::new();
    if let Some(verified) = update.verified {
        set.insert("verified", verified);
    }
    if let Some(token) = &update.verification_token {
        set.insert("verification_token", optional_string(token));
    }
    if let Some(token) = &update.session_token {
        set.insert("session_token", optional_string(token));
    }
    if let Some(tier) = update.subscription {
        set.insert("subscription", tier.as_str());
    }
    if let Some(url) = &update.avatar_url {
        set.insert("avatar_url", url.clone());
    }
    doc! { "$set": set }
}

fn contact_update_doc(update: &ContactUpdate) -> Document {
    let mut set = Document::new();
    if let Some(name) = &update.name {
        set.insert("name", name.clone());
    }
    if let Some(email) = &update.email {
        set.insert("email", email.clone());
    }
    if let Some(phone) = &update.phone {
        set.insert("phone", phone.clone());
    }
    if let Some(favorite) = update.favorite {
        set.insert("favorite", favorite);
    }
    doc! { "$set": set }
}

fn return_after() -> FindOneAndUpdateOptions {
    FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build()
}

#[async_trait]
impl UserStore for MongoDb {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "email": email }, None).await?)
    }

    async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users().find_one(doc! { "_id": id }, None).await?)
    }

    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        match self.users().insert_one(user, None).await {
            Ok(_) => Ok(()),
            Err(err) if is_duplicate_key(&err) => {
                Err(AppError::Conflict(anyhow::anyhow!("Email in use")))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update_user(&self, id: &str, update: UserUpdate) -> Result<Option<User>, AppError> {
        if update.is_empty() {
            return self.find_user_by_id(id).await;
        }
        Ok(self
            .users()
            .find_one_and_update(doc! { "_id": id }, user_update_doc(&update), return_after())
            .await?)
    }

    async fn verify_user_by_token(&self, token: &str) -> Result<Option<User>, AppError> {
        // Single findOneAndUpdate so two concurrent attempts with the same
        // token cannot both succeed.
        Ok(self
            .users()
            .find_one_and_update(
                doc! { "verification_token": token },
                doc! { "$set": { "verified": true, "verification_token": Bson::Null } },
                return_after(),
            )
            .await?)
    }
}

#[async_trait]
impl ContactStore for MongoDb {
    async fn list_contacts(&self, owner_id: &str) -> Result<Vec<Contact>, AppError> {
        let cursor = self
            .contacts()
            .find(doc! { "owner_id": owner_id }, None)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_contact(&self, owner_id: &str, id: &str) -> Result<Option<Contact>, AppError> {
        Ok(self
            .contacts()
            .find_one(doc! { "_id": id, "owner_id": owner_id }, None)
            .await?)
    }

    async fn insert_contact(&self, contact: &Contact) -> Result<(), AppError> {
        self.contacts().insert_one(contact, None).await?;
        Ok(())
    }

    async fn update_contact(
        &self,
        owner_id: &str,
        id: &str,
        update: ContactUpdate,
    ) -> Result<Option<Contact>, AppError> {
        if update.is_empty() {
            return self.find_contact(owner_id, id).await;
        }
        Ok(self
            .contacts()
            .find_one_and_update(
                doc! { "_id": id, "owner_id": owner_id },
                contact_update_doc(&update),
                return_after(),
            )
            .await?)
    }

    async fn delete_contact(&self, owner_id: &str, id: &str) -> Result<Option<Contact>, AppError> {
        Ok(self
            .contacts()
            .find_one_and_delete(doc! { "_id": id, "owner_id": owner_id }, None)
            .await?)
    }
}

#[async_trait]
impl Store for MongoDb {
    async fn health_check(&self) -> Result<(), AppError> {
        self.db.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}
