use anyhow::{Context, Result};
use log::info;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::collections::BTreeSet;

use crate::model::{ResourceRef, Tag, TagName, TagOperation, UpdateMethod};
use crate::store::traits::{ResourceTagStore, TagCatalogStore};

const CREATE_TAGS_TABLE: &str = "CREATE TABLE IF NOT EXISTS tags (
    tag_name TEXT PRIMARY KEY,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)";

const CREATE_RESOURCE_TAGS_TABLE: &str = "CREATE TABLE IF NOT EXISTS resource_tags (
    resource_type TEXT NOT NULL,
    resource_key TEXT NOT NULL,
    tag_name TEXT NOT NULL REFERENCES tags (tag_name),
    PRIMARY KEY (resource_type, resource_key, tag_name)
)";

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the tag tables if they do not exist yet
    pub async fn migrate(&self) -> Result<()> {
        for statement in [CREATE_TAGS_TABLE, CREATE_RESOURCE_TAGS_TABLE] {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .context("Failed to create tag tables")?;
        }
        info!("Tag tables ready");
        Ok(())
    }
}

#[async_trait::async_trait]
impl TagCatalogStore for PostgresStore {
    async fn get_tag_catalog(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT t.tag_name, COUNT(rt.tag_name) AS tag_count
             FROM tags t
             LEFT JOIN resource_tags rt ON rt.tag_name = t.tag_name
             GROUP BY t.tag_name
             ORDER BY t.tag_name",
        )
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch tag catalog")?;

        let tags = rows
            .into_iter()
            .map(|row| {
                let tag_count: i64 = row.get("tag_count");
                Tag::new(
                    TagName::from_catalog(row.get::<String, _>("tag_name")),
                    u32::try_from(tag_count).unwrap_or(u32::MAX),
                )
            })
            .collect();

        Ok(tags)
    }

    async fn register_tags(&self, tag_names: &[TagName]) -> Result<()> {
        for tag_name in tag_names {
            sqlx::query("INSERT INTO tags (tag_name) VALUES ($1) ON CONFLICT DO NOTHING")
                .bind(tag_name.as_str())
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to register tag '{}'", tag_name))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResourceTagStore for PostgresStore {
    async fn get_resource_tags(&self, resource: &ResourceRef) -> Result<BTreeSet<TagName>> {
        let rows = sqlx::query(
            "SELECT tag_name FROM resource_tags
             WHERE resource_type = $1 AND resource_key = $2",
        )
        .bind(resource.resource_type.to_string())
        .bind(&resource.key)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch resource tags")?;

        Ok(rows
            .into_iter()
            .map(|row| TagName::from_catalog(row.get::<String, _>("tag_name")))
            .collect())
    }

    async fn apply_tag_operations(
        &self,
        resource: &ResourceRef,
        operations: &[TagOperation],
    ) -> Result<()> {
        let resource_type = resource.resource_type.to_string();
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start tag update transaction")?;

        for operation in operations {
            match operation.method {
                UpdateMethod::Add => {
                    sqlx::query("INSERT INTO tags (tag_name) VALUES ($1) ON CONFLICT DO NOTHING")
                        .bind(operation.tag_name.as_str())
                        .execute(&mut *tx)
                        .await
                        .context("Failed to insert tag")?;
                    sqlx::query(
                        "INSERT INTO resource_tags (resource_type, resource_key, tag_name)
                         VALUES ($1, $2, $3) ON CONFLICT DO NOTHING",
                    )
                    .bind(&resource_type)
                    .bind(&resource.key)
                    .bind(operation.tag_name.as_str())
                    .execute(&mut *tx)
                    .await
                    .context("Failed to attach tag")?;
                }
                UpdateMethod::Remove => {
                    sqlx::query(
                        "DELETE FROM resource_tags
                         WHERE resource_type = $1 AND resource_key = $2 AND tag_name = $3",
                    )
                    .bind(&resource_type)
                    .bind(&resource.key)
                    .bind(operation.tag_name.as_str())
                    .execute(&mut *tx)
                    .await
                    .context("Failed to detach tag")?;
                }
            }
        }

        tx.commit()
            .await
            .context("Failed to commit tag update transaction")?;

        Ok(())
    }
}
