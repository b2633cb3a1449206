//! Category management - admin only.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Category;
use quill_core::policy::{self, Actor};
use quill_shared::ApiResponse;
use quill_shared::dto::{CategoryPayload, CategoryResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn require_admin(actor: &Actor) -> Result<(), AppError> {
    if policy::can_manage_categories(actor) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}

/// GET /categories
pub async fn index(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    require_admin(&identity.actor())?;

    let categories = state.categories.list_all().await?;
    let categories: Vec<CategoryResponse> = categories.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(categories))
}

/// POST /categories - slug is derived from the name.
pub async fn store(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CategoryPayload>,
) -> AppResult<HttpResponse> {
    require_admin(&identity.actor())?;

    let payload = body.into_inner();
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let category = state
        .categories
        .insert(Category::new(payload.name, payload.description))
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        CategoryResponse::from(category),
        "Category created successfully.",
    )))
}

/// GET /categories/{id}
pub async fn show(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_admin(&identity.actor())?;

    let category = state
        .categories
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// PUT /categories/{id} - renaming re-derives the slug.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CategoryPayload>,
) -> AppResult<HttpResponse> {
    require_admin(&identity.actor())?;

    let payload = body.into_inner();
    let errors = payload.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut category = state
        .categories
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    category.rename(payload.name, payload.description);
    let category = state.categories.update(category).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        CategoryResponse::from(category),
        "Category updated successfully.",
    )))
}

/// DELETE /categories/{id} - posts in the category keep existing with no
/// category (the FK nulls out).
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    require_admin(&identity.actor())?;

    state.categories.delete(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Category deleted successfully.")))
}
