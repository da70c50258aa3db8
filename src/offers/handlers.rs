use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::{delete, get, post, put},
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::auth::extractors::AuthUser;
use crate::error::ApiError;
use crate::offers::dto::{
    DeleteResponse, OfferFields, OfferListResponse, OfferResponse, Picture,
};
use crate::offers::query::{build_query, OfferListParams};
use crate::offers::{repo, services};
use crate::state::AppState;

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/offers", get(list_offers))
        .route("/offer/:id", get(get_offer))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/offer/publish", post(publish_offer))
        .route("/offer/update/:id", put(update_offer))
        .route("/offer/delete/:id", delete(delete_offer))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state))]
pub async fn list_offers(
    State(state): State<AppState>,
    Query(params): Query<OfferListParams>,
) -> Result<Json<OfferListResponse>, ApiError> {
    let (filter, sort, page) = build_query(&params);
    let rows = repo::search(&state.db, &filter, sort, page).await?;
    let counter = repo::count(&state.db, &filter).await?;
    Ok(Json(OfferListResponse {
        offers: rows.into_iter().map(OfferResponse::from).collect(),
        counter,
    }))
}

#[instrument(skip(state))]
pub async fn get_offer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OfferResponse>, ApiError> {
    let offer = repo::get(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound("offer"))?;
    Ok(Json(OfferResponse::from(offer)))
}

#[instrument(skip(state, user, mp))]
pub async fn publish_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    mp: Multipart,
) -> Result<Json<OfferResponse>, ApiError> {
    let (fields, picture) = parse_offer_form(mp).await?;
    let offer = services::create_offer(&state, &user, fields, picture).await?;
    info!(offer_id = %offer.id, owner_id = %user.id, "offer published");
    Ok(Json(OfferResponse::from(offer)))
}

#[instrument(skip(state, user, mp))]
pub async fn update_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<OfferResponse>, ApiError> {
    let (fields, picture) = parse_offer_form(mp).await?;
    let offer = services::update_offer(&state, &user, id, fields, picture).await?;
    info!(offer_id = %id, owner_id = %user.id, "offer updated");
    Ok(Json(OfferResponse::from(offer)))
}

#[instrument(skip(state, user))]
pub async fn delete_offer(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    services::delete_offer(&state, &user, id).await?;
    info!(offer_id = %id, owner_id = %user.id, "offer deleted");
    Ok(Json(DeleteResponse {
        message: "Offer deleted successfully",
    }))
}

/// Pull the text fields and the picture out of the publish/update form.
/// Unknown parts are ignored; required ones are checked once the body
/// is fully read.
async fn parse_offer_form(mut mp: Multipart) -> Result<(OfferFields, Picture), ApiError> {
    let mut title: Option<String> = None;
    let mut description: Option<String> = None;
    let mut price: Option<String> = None;
    let mut brand: Option<String> = None;
    let mut size: Option<String> = None;
    let mut condition: Option<String> = None;
    let mut color: Option<String> = None;
    let mut city: Option<String> = None;
    let mut picture: Option<(Bytes, String)> = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().map(|s| s.to_string()).unwrap_or_default();
        match name.as_str() {
            "picture" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".into());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::Validation(format!("unreadable picture: {}", e)))?;
                picture = Some((data, content_type));
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::Validation(format!("unreadable field: {}", e)))?;
                match other {
                    "title" => title = Some(value),
                    "description" => description = Some(value),
                    "price" => price = Some(value),
                    "brand" => brand = Some(value),
                    "size" => size = Some(value),
                    "condition" => condition = Some(value),
                    "color" => color = Some(value),
                    "city" => city = Some(value),
                    _ => {}
                }
            }
        }
    }

    let title = title.ok_or(ApiError::MissingField("title"))?;
    let description = description.ok_or(ApiError::MissingField("description"))?;
    let price = price
        .ok_or(ApiError::MissingField("price"))?
        .parse::<f64>()
        .map_err(|_| ApiError::Validation("price must be a number".into()))?;
    let (bytes, content_type) = picture.ok_or(ApiError::MissingField("picture"))?;

    Ok((
        OfferFields {
            title,
            description,
            price,
            brand,
            size,
            condition,
            color,
            city,
        },
        Picture {
            bytes,
            content_type,
        },
    ))
}
