//! Owner-scoped contact CRUD. Every query includes the authenticated
//! user's id, so one user can never see or touch another's contacts.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use service_core::error::AppError;

use crate::dtos::contact::{
    ContactResponse, CreateContactRequest, UpdateContactRequest, UpdateFavoriteRequest,
};
use crate::dtos::{ErrorResponse, MessageResponse};
use crate::middleware::AuthUser;
use crate::models::{Contact, ContactUpdate};
use crate::services::ServiceError;
use crate::utils::validation::ValidatedJson;
use crate::AppState;

/// List the caller's contacts.
#[utoipa::path(
    get,
    path = "/api/contacts",
    responses(
        (status = 200, description = "Contacts", body = [ContactResponse]),
        (status = 401, description = "Not authorized", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "contacts"
)]
pub async fn list_contacts(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<Vec<ContactResponse>>, AppError> {
    let contacts = state.store.list_contacts(&user.id).await?;
    Ok(Json(contacts.into_iter().map(Into::into).collect()))
}

/// Fetch one contact by id.
#[utoipa::path(
    get,
    path = "/api/contacts/{id}",
    params(("id" = String, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact", body = ContactResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "contacts"
)]
pub async fn get_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ContactResponse>, AppError> {
    let contact = state
        .store
        .find_contact(&user.id, &id)
        .await?
        .ok_or(ServiceError::ContactNotFound)?;
    Ok(Json(contact.into()))
}

/// Create a contact.
#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = CreateContactRequest,
    responses(
        (status = 201, description = "Contact created", body = ContactResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "contacts"
)]
pub async fn create_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(req): ValidatedJson<CreateContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), AppError> {
    let contact = Contact::new(user.id, req.name, req.email, req.phone);
    state.store.insert_contact(&contact).await?;
    Ok((StatusCode::CREATED, Json(contact.into())))
}

/// Update contact fields. An empty body is rejected.
#[utoipa::path(
    put,
    path = "/api/contacts/{id}",
    params(("id" = String, Path, description = "Contact id")),
    request_body = UpdateContactRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 400, description = "No fields to update", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "contacts"
)]
pub async fn update_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateContactRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let update = ContactUpdate::from(req);
    if update.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("Missing fields")));
    }

    let contact = state
        .store
        .update_contact(&user.id, &id, update)
        .await?
        .ok_or(ServiceError::ContactNotFound)?;
    Ok(Json(contact.into()))
}

/// Toggle the favorite flag.
#[utoipa::path(
    patch,
    path = "/api/contacts/{id}/favorite",
    params(("id" = String, Path, description = "Contact id")),
    request_body = UpdateFavoriteRequest,
    responses(
        (status = 200, description = "Contact updated", body = ContactResponse),
        (status = 400, description = "Missing favorite field", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "contacts"
)]
pub async fn update_favorite(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateFavoriteRequest>,
) -> Result<Json<ContactResponse>, AppError> {
    let update = ContactUpdate {
        favorite: Some(req.favorite),
        ..ContactUpdate::default()
    };
    let contact = state
        .store
        .update_contact(&user.id, &id, update)
        .await?
        .ok_or(ServiceError::ContactNotFound)?;
    Ok(Json(contact.into()))
}

/// Delete a contact.
#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    params(("id" = String, Path, description = "Contact id")),
    responses(
        (status = 200, description = "Contact deleted", body = MessageResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = [])),
    tag = "contacts"
)]
pub async fn delete_contact(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state
        .store
        .delete_contact(&user.id, &id)
        .await?
        .ok_or(ServiceError::ContactNotFound)?;
    Ok(Json(MessageResponse {
        message: "Contact deleted".to_string(),
    }))
}
