use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{Contact, ContactUpdate};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateContactRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Ada Lovelace")]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "ada@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Phone is required"))]
    #[schema(example = "(044) 123-4567")]
    pub phone: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateContactRequest {
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 1, message = "Phone must not be empty"))]
    pub phone: Option<String>,

    pub favorite: Option<bool>,
}

impl From<UpdateContactRequest> for ContactUpdate {
    fn from(req: UpdateContactRequest) -> Self {
        ContactUpdate {
            name: req.name,
            email: req.email,
            phone: req.phone,
            favorite: req.favorite,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateFavoriteRequest {
    pub favorite: bool,
}

/// Client-facing view of a contact; omits the owner id.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub favorite: bool,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<Contact> for ContactResponse {
    fn from(c: Contact) -> Self {
        Self {
            id: c.id,
            name: c.name,
            email: c.email,
            phone: c.phone,
            favorite: c.favorite,
            created_at: c.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_omits_owner_id() {
        let contact = Contact::new(
            "owner-1".to_string(),
            "Ada".to_string(),
            "ada@example.com".to_string(),
            "123".to_string(),
        );
        let json = serde_json::to_string(&ContactResponse::from(contact)).unwrap();
        assert!(!json.contains("owner"));
    }

    #[test]
    fn update_request_with_no_fields_becomes_empty_update() {
        let req: UpdateContactRequest = serde_json::from_str("{}").unwrap();
        let update = ContactUpdate::from(req);
        assert!(update.is_empty());
    }
}
