use bytes::Bytes;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::dto::Account;
use crate::offers::repo::OfferWithOwner;

/// Fixed detail record. Create and update both address it by field,
/// never as a free-form list.
#[derive(Debug, Clone, Serialize)]
pub struct OfferDetails {
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub color: Option<String>,
    pub city: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OfferResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub details: OfferDetails,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub owner: Account,
}

impl From<OfferWithOwner> for OfferResponse {
    fn from(row: OfferWithOwner) -> Self {
        OfferResponse {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            details: OfferDetails {
                brand: row.brand,
                size: row.size,
                condition: row.condition,
                color: row.color,
                city: row.city,
            },
            image_url: row.image_url,
            created_at: row.created_at,
            owner: Account {
                username: row.owner_username,
                phone: row.owner_phone,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OfferListResponse {
    pub offers: Vec<OfferResponse>,
    pub counter: i64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
}

/// Text fields of the publish/update multipart form.
#[derive(Debug, Clone)]
pub struct OfferFields {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub color: Option<String>,
    pub city: Option<String>,
}

/// The uploaded picture, held in memory until the media store accepts it.
#[derive(Debug, Clone)]
pub struct Picture {
    pub bytes: Bytes,
    pub content_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offer_response_resolves_owner_account_only() {
        let row = OfferWithOwner {
            id: Uuid::new_v4(),
            name: "Blue Jacket".into(),
            description: "Barely worn".into(),
            price: 42.0,
            brand: Some("Acme".into()),
            size: Some("M".into()),
            condition: Some("good".into()),
            color: Some("blue".into()),
            city: Some("Lyon".into()),
            image_key: Some("offers/x/preview.jpg".into()),
            image_url: Some("https://media.local/offers/x/preview.jpg".into()),
            created_at: OffsetDateTime::UNIX_EPOCH,
            owner_id: Uuid::new_v4(),
            owner_username: "marie".into(),
            owner_phone: None,
        };

        let json = serde_json::to_string(&OfferResponse::from(row)).unwrap();
        assert!(json.contains("Blue Jacket"));
        assert!(json.contains("marie"));
        // credential columns never leave the repo layer
        assert!(!json.contains("token"));
        assert!(!json.contains("password"));
    }
}
