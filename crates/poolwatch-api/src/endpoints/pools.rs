// Pool collection endpoints.

use serde::Serialize;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{PageDto, PoolDto, PoolWrite};

/// Query parameters for the paged pool listing.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolListQuery {
    pub current: u64,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ApiClient {
    /// `GET /pools` -- paged pool listing.
    pub async fn list_pools(&self, query: &PoolListQuery) -> Result<PageDto<PoolDto>, Error> {
        self.get_with_query("pools", query).await
    }

    /// `GET /pools/{id}` -- single pool.
    pub async fn get_pool(&self, id: &str) -> Result<PoolDto, Error> {
        self.get(&format!("pools/{id}")).await
    }

    /// `GET /pools/public` -- pools flagged for public display.
    pub async fn list_public_pools(&self) -> Result<Vec<PoolDto>, Error> {
        self.get("pools/public").await
    }

    /// `GET /pools/enabled` -- all enabled pools.
    pub async fn list_enabled_pools(&self) -> Result<Vec<PoolDto>, Error> {
        self.get("pools/enabled").await
    }

    /// `POST /pools` -- create a pool, returning the stored entity.
    pub async fn create_pool(&self, body: &PoolWrite) -> Result<PoolDto, Error> {
        self.post("pools", body).await
    }

    /// `PUT /pools/{id}` -- full update of a pool.
    pub async fn update_pool(&self, id: &str, body: &PoolWrite) -> Result<PoolDto, Error> {
        self.put(&format!("pools/{id}"), body).await
    }

    /// `DELETE /pools/{id}`.
    pub async fn delete_pool(&self, id: &str) -> Result<(), Error> {
        self.delete::<Option<serde_json::Value>>(&format!("pools/{id}"))
            .await?;
        Ok(())
    }

    /// `DELETE /pools/batch` -- delete several pools in one call.
    pub async fn delete_pools(&self, ids: &[String]) -> Result<(), Error> {
        self.delete_with_body::<Option<serde_json::Value>>("pools/batch", &ids)
            .await?;
        Ok(())
    }

    /// `PUT /pools/{id}/toggle?enabled=` -- enable or disable a pool.
    pub async fn toggle_pool_enabled(&self, id: &str, enabled: bool) -> Result<(), Error> {
        self.put_with_query::<Option<serde_json::Value>>(
            &format!("pools/{id}/toggle"),
            &[("enabled", enabled)],
        )
        .await?;
        Ok(())
    }
}
