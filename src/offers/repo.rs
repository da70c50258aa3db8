use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::offers::query::{OfferFilter, OfferSort, Page};

/// Offer row joined with the owner's public account columns.
#[derive(Debug, Clone, FromRow)]
pub struct OfferWithOwner {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub color: Option<String>,
    pub city: Option<String>,
    pub image_key: Option<String>,
    pub image_url: Option<String>,
    pub created_at: OffsetDateTime,
    pub owner_id: Uuid,
    pub owner_username: String,
    pub owner_phone: Option<String>,
}

/// Mutable offer fields, already validated by the service layer.
#[derive(Debug, Clone)]
pub struct OfferRecord {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub brand: Option<String>,
    pub size: Option<String>,
    pub condition: Option<String>,
    pub color: Option<String>,
    pub city: Option<String>,
    pub image_key: String,
    pub image_url: String,
}

const SELECT_COLUMNS: &str = "o.id, o.name, o.description, o.price, \
     o.brand, o.size, o.condition, o.color, o.city, \
     o.image_key, o.image_url, o.created_at, o.owner_id, \
     u.username AS owner_username, u.phone AS owner_phone";

// Binds: $1 title pattern, $2 price_min, $3 price_max. NULL params are
// no-ops so one statement covers every filter combination.
const FILTER_WHERE: &str = "($1::text IS NULL OR o.name ILIKE $1) \
     AND ($2::float8 IS NULL OR o.price >= $2) \
     AND ($3::float8 IS NULL OR o.price <= $3)";

pub(crate) fn search_sql(sort: OfferSort) -> String {
    format!(
        "SELECT {SELECT_COLUMNS} FROM offers o JOIN users u ON u.id = o.owner_id \
         WHERE {FILTER_WHERE} {} LIMIT $4 OFFSET $5",
        sort.order_clause()
    )
}

/// Page of offers matching the filter, in the requested order.
pub async fn search(
    db: &PgPool,
    filter: &OfferFilter,
    sort: OfferSort,
    page: Page,
) -> anyhow::Result<Vec<OfferWithOwner>> {
    let rows = sqlx::query_as::<_, OfferWithOwner>(&search_sql(sort))
        .bind(filter.title_pattern())
        .bind(filter.price_min)
        .bind(filter.price_max)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Total number of offers matching the filter, ignoring pagination.
pub async fn count(db: &PgPool, filter: &OfferFilter) -> anyhow::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM offers o WHERE {FILTER_WHERE}");
    let (n,): (i64,) = sqlx::query_as(&sql)
        .bind(filter.title_pattern())
        .bind(filter.price_min)
        .bind(filter.price_max)
        .fetch_one(db)
        .await?;
    Ok(n)
}

pub async fn get(db: &PgPool, id: Uuid) -> anyhow::Result<Option<OfferWithOwner>> {
    let sql = format!(
        "SELECT {SELECT_COLUMNS} FROM offers o JOIN users u ON u.id = o.owner_id \
         WHERE o.id = $1"
    );
    let row = sqlx::query_as::<_, OfferWithOwner>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Insert with a caller-minted id, so the media path can be keyed by the
/// offer before the row exists.
pub async fn insert(
    db: &PgPool,
    id: Uuid,
    owner_id: Uuid,
    record: &OfferRecord,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO offers
            (id, name, description, price, brand, size, condition, color, city,
             image_key, image_url, owner_id)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        "#,
    )
    .bind(id)
    .bind(&record.name)
    .bind(&record.description)
    .bind(record.price)
    .bind(&record.brand)
    .bind(&record.size)
    .bind(&record.condition)
    .bind(&record.color)
    .bind(&record.city)
    .bind(&record.image_key)
    .bind(&record.image_url)
    .bind(owner_id)
    .execute(db)
    .await?;
    Ok(())
}

/// Full replacement of the mutable fields. Returns false when the id is gone.
pub async fn update(db: &PgPool, id: Uuid, record: &OfferRecord) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE offers
        SET name = $2, description = $3, price = $4,
            brand = $5, size = $6, condition = $7, color = $8, city = $9,
            image_key = $10, image_url = $11
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(&record.name)
    .bind(&record.description)
    .bind(record.price)
    .bind(&record.brand)
    .bind(&record.size)
    .bind(&record.condition)
    .bind(&record.color)
    .bind(&record.city)
    .bind(&record.image_key)
    .bind(&record.image_url)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete(db: &PgPool, id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query("DELETE FROM offers WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}
