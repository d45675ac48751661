// File: streamwatch-core/src/repositories/postgres/streamers.rs

use std::collections::HashSet;

use async_trait::async_trait;
use futures_util::future::try_join_all;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, QueryBuilder, Row};
use tracing::{debug, trace};

use crate::Error;
use crate::models::StreamerRecord;
use crate::repositories::StreamerRepository;
use crate::repositories::partial_update::{FieldValue, PartialUpdate};

/// Ids per bulk read statement.
pub const READ_CHUNK_SIZE: usize = 100;
/// Rows per registration insert statement.
pub const WRITE_CHUNK_SIZE: usize = 25;

const SELECT_COLUMNS: &str = r#"
    SELECT
        broadcaster_id,
        broadcaster_name,
        category,
        title,
        is_live,
        profile_picture,
        created,
        updated
    FROM streamers
"#;

#[derive(Clone)]
pub struct PostgresStreamerRepository {
    pub pool: Pool<Postgres>,
}

impl PostgresStreamerRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

fn row_to_record(r: &PgRow) -> Result<StreamerRecord, Error> {
    Ok(StreamerRecord {
        broadcaster_id: r.try_get("broadcaster_id")?,
        broadcaster_name: r.try_get("broadcaster_name")?,
        category: r.try_get("category")?,
        title: r.try_get("title")?,
        is_live: r.try_get("is_live")?,
        profile_picture: r.try_get("profile_picture")?,
        created: r.try_get("created")?,
        updated: r.try_get("updated")?,
    })
}

/// Upsert touching only the columns present in `update`.
///
/// A missing row is created with column defaults for everything else; an
/// existing row keeps every column the update does not name. Returns `None`
/// for an empty update so no statement is issued at all.
pub fn build_upsert(update: &PartialUpdate) -> Option<QueryBuilder<'static, Postgres>> {
    if update.is_noop() {
        return None;
    }

    let mut qb = QueryBuilder::new("INSERT INTO streamers (broadcaster_id");
    for (field, _) in update.fields() {
        qb.push(", ");
        qb.push(field.column());
    }

    qb.push(") VALUES (");
    qb.push_bind(update.key().to_string());
    for (_, value) in update.fields() {
        qb.push(", ");
        match value {
            FieldValue::Text(s) => qb.push_bind(s.clone()),
            FieldValue::Bool(b) => qb.push_bind(*b),
            FieldValue::Timestamp(t) => qb.push_bind(*t),
        };
    }

    qb.push(") ON CONFLICT (broadcaster_id) DO UPDATE SET ");
    let mut assignments = qb.separated(", ");
    for (field, _) in update.fields() {
        assignments.push(format!("{col} = EXCLUDED.{col}", col = field.column()));
    }

    Some(qb)
}

#[async_trait]
impl StreamerRepository for PostgresStreamerRepository {
    async fn update_partial(&self, update: &PartialUpdate) -> Result<(), Error> {
        let Some(mut qb) = build_upsert(update) else {
            trace!("Skipping empty write for {}", update.key());
            return Ok(());
        };

        qb.build().execute(&self.pool).await?;
        Ok(())
    }

    async fn get(&self, broadcaster_id: &str) -> Result<Option<StreamerRecord>, Error> {
        let sql = format!("{SELECT_COLUMNS} WHERE broadcaster_id = $1");
        let row = sqlx::query(&sql)
            .bind(broadcaster_id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => Ok(Some(row_to_record(&r)?)),
            None => Ok(None),
        }
    }

    async fn batch_get(&self, broadcaster_ids: &[String]) -> Result<Vec<StreamerRecord>, Error> {
        if broadcaster_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!("{SELECT_COLUMNS} WHERE broadcaster_id = ANY($1)");
        let chunks = broadcaster_ids.chunks(READ_CHUNK_SIZE).map(|chunk| {
            let sql = sql.as_str();
            async move {
                sqlx::query(sql)
                    .bind(chunk.to_vec())
                    .fetch_all(&self.pool)
                    .await
            }
        });
        let results = try_join_all(chunks).await?;

        let mut records = Vec::with_capacity(broadcaster_ids.len());
        for rows in results {
            for r in rows {
                records.push(row_to_record(&r)?);
            }
        }
        debug!(
            "Bulk read returned {} of {} requested streamers",
            records.len(),
            broadcaster_ids.len()
        );
        Ok(records)
    }

    async fn insert_if_absent(&self, records: &[StreamerRecord]) -> Result<HashSet<String>, Error> {
        let mut inserted = HashSet::new();

        for chunk in records.chunks(WRITE_CHUNK_SIZE) {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
                "INSERT INTO streamers (broadcaster_id, broadcaster_name, category, title, is_live, profile_picture, created, updated) ",
            );
            qb.push_values(chunk, |mut b, r| {
                b.push_bind(r.broadcaster_id.clone())
                    .push_bind(r.broadcaster_name.clone())
                    .push_bind(r.category.clone())
                    .push_bind(r.title.clone())
                    .push_bind(r.is_live)
                    .push_bind(r.profile_picture.clone())
                    .push_bind(r.created.unwrap_or_else(chrono::Utc::now))
                    .push_bind(r.updated);
            });
            qb.push(" ON CONFLICT (broadcaster_id) DO NOTHING RETURNING broadcaster_id");

            let rows = qb.build().fetch_all(&self.pool).await?;
            for r in rows {
                inserted.insert(r.try_get::<String, _>("broadcaster_id")?);
            }
        }

        debug!("Registered {} new streamers", inserted.len());
        Ok(inserted)
    }
}
