use tracing::warn;
use uuid::Uuid;

use crate::auth::repo::User;
use crate::error::ApiError;
use crate::offers::dto::{OfferFields, Picture};
use crate::offers::repo::{self, OfferRecord, OfferWithOwner};
use crate::state::AppState;
use crate::storage::ext_from_mime;

pub const MAX_PRICE: f64 = 100_000.0;
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Short-circuit validation: the first violated rule is reported, the
/// rest are not evaluated. Order matches the pricing rules first.
pub fn validate(fields: &OfferFields) -> Result<(), ApiError> {
    // NaN compares false against both bounds; reject it up front.
    if !fields.price.is_finite() {
        return Err(ApiError::Validation("Price must be a finite number".into()));
    }
    if fields.price > MAX_PRICE {
        return Err(ApiError::Validation("Maximum price: 100000".into()));
    }
    if fields.price <= 0.0 {
        return Err(ApiError::Validation("Minimum price: 1".into()));
    }
    if fields.title.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::Validation(
            "Title length must be under 50 characters".into(),
        ));
    }
    if fields.description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::Validation(
            "Description length must be under 500 characters".into(),
        ));
    }
    Ok(())
}

fn media_prefix(offer_id: Uuid) -> String {
    format!("offers/{}/", offer_id)
}

fn media_key(offer_id: Uuid, content_type: &str) -> String {
    let ext = ext_from_mime(content_type).unwrap_or("bin");
    format!("offers/{}/preview.{}", offer_id, ext)
}

fn record_from(fields: OfferFields, image_key: String, image_url: String) -> OfferRecord {
    OfferRecord {
        name: fields.title,
        description: fields.description,
        price: fields.price,
        brand: fields.brand,
        size: fields.size,
        condition: fields.condition,
        color: fields.color,
        city: fields.city,
        image_key,
        image_url,
    }
}

/// Two phases: upload the picture under the new offer's path, then persist
/// the row. If the insert fails the upload is rolled back best-effort so
/// no orphaned media is left behind.
pub async fn create_offer(
    st: &AppState,
    owner: &User,
    fields: OfferFields,
    picture: Picture,
) -> Result<OfferWithOwner, ApiError> {
    validate(&fields)?;

    let id = Uuid::new_v4();
    let key = media_key(id, &picture.content_type);
    let handle = st
        .media
        .upload(&key, picture.bytes, &picture.content_type)
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?;

    let record = record_from(fields, handle.key, handle.url);
    if let Err(e) = repo::insert(&st.db, id, owner.id, &record).await {
        if let Err(cleanup) = st.media.delete_prefix(&media_prefix(id)).await {
            warn!(offer_id = %id, error = %cleanup, "orphaned media cleanup failed");
        }
        return Err(ApiError::Internal(e));
    }

    repo::get(&st.db, id)
        .await?
        .ok_or(ApiError::NotFound("offer"))
}

/// Full replacement: same validation as publish, picture always
/// re-uploaded, every mutable column overwritten.
pub async fn update_offer(
    st: &AppState,
    caller: &User,
    id: Uuid,
    fields: OfferFields,
    picture: Picture,
) -> Result<OfferWithOwner, ApiError> {
    validate(&fields)?;

    let existing = repo::get(&st.db, id)
        .await?
        .ok_or(ApiError::NotFound("offer"))?;
    if existing.owner_id != caller.id {
        return Err(ApiError::Forbidden);
    }

    let key = media_key(id, &picture.content_type);
    let handle = st
        .media
        .upload(&key, picture.bytes, &picture.content_type)
        .await
        .map_err(|e| ApiError::Upload(e.to_string()))?;

    let record = record_from(fields, handle.key, handle.url);
    if !repo::update(&st.db, id, &record).await? {
        return Err(ApiError::NotFound("offer"));
    }

    repo::get(&st.db, id)
        .await?
        .ok_or(ApiError::NotFound("offer"))
}

/// Media removal is best-effort: a store failure is logged and the
/// record is still deleted.
pub async fn delete_offer(st: &AppState, caller: &User, id: Uuid) -> Result<(), ApiError> {
    let existing = repo::get(&st.db, id)
        .await?
        .ok_or(ApiError::NotFound("offer"))?;
    if existing.owner_id != caller.id {
        return Err(ApiError::Forbidden);
    }

    if let Err(e) = st.media.delete_prefix(&media_prefix(id)).await {
        warn!(offer_id = %id, error = %e, "media delete failed, removing record anyway");
    }

    if !repo::delete(&st.db, id).await? {
        return Err(ApiError::NotFound("offer"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(title: &str, description: &str, price: f64) -> OfferFields {
        OfferFields {
            title: title.into(),
            description: description.into(),
            price,
            brand: None,
            size: None,
            condition: None,
            color: None,
            city: None,
        }
    }

    #[test]
    fn price_bounds_are_exclusive_zero_inclusive_max() {
        assert!(validate(&fields("ok", "ok", 0.0)).is_err());
        assert!(validate(&fields("ok", "ok", -5.0)).is_err());
        assert!(validate(&fields("ok", "ok", 100_001.0)).is_err());
        assert!(validate(&fields("ok", "ok", 1.0)).is_ok());
        assert!(validate(&fields("ok", "ok", 100_000.0)).is_ok());
    }

    // A NaN price slips past both range comparisons; it must be caught
    // before the picture upload, not by the database.
    #[test]
    fn non_finite_prices_are_rejected() {
        for price in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            match validate(&fields("ok", "ok", price)) {
                Err(ApiError::Validation(msg)) => assert!(msg.contains("finite")),
                other => panic!("expected validation error for {}, got {:?}", price, other),
            }
        }
    }

    #[test]
    fn name_length_boundary() {
        assert!(validate(&fields(&"x".repeat(50), "ok", 10.0)).is_ok());
        assert!(validate(&fields(&"x".repeat(51), "ok", 10.0)).is_err());
    }

    #[test]
    fn description_length_boundary() {
        assert!(validate(&fields("ok", &"x".repeat(500), 10.0)).is_ok());
        assert!(validate(&fields("ok", &"x".repeat(501), 10.0)).is_err());
    }

    // Multiple violations: only the first rule in check order is reported.
    #[test]
    fn validation_short_circuits_in_order() {
        let bad = fields(&"x".repeat(51), &"y".repeat(501), 200_000.0);
        match validate(&bad) {
            Err(ApiError::Validation(msg)) => assert!(msg.contains("Maximum price")),
            other => panic!("expected validation error, got {:?}", other),
        }

        let bad_title = fields(&"x".repeat(51), &"y".repeat(501), 10.0);
        match validate(&bad_title) {
            Err(ApiError::Validation(msg)) => assert!(msg.contains("Title")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn media_key_is_scoped_to_the_offer() {
        let id = Uuid::new_v4();
        let key = media_key(id, "image/png");
        assert_eq!(key, format!("offers/{}/preview.png", id));
        assert!(key.starts_with(&media_prefix(id)));
        assert_eq!(media_key(id, "text/plain"), format!("offers/{}/preview.bin", id));
    }
}
