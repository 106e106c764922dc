// Pool status and trend endpoints.

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{OverviewStatsDto, PoolStatusDto, TrendQuery};

impl ApiClient {
    /// `GET /pool-status/latest/{poolId}` -- freshest sample for one pool.
    pub async fn latest_pool_status(&self, pool_id: &str) -> Result<PoolStatusDto, Error> {
        self.get(&format!("pool-status/latest/{pool_id}")).await
    }

    /// `GET /pool-status/latest` -- freshest sample for every pool.
    pub async fn all_latest_pool_statuses(&self) -> Result<Vec<PoolStatusDto>, Error> {
        self.get("pool-status/latest").await
    }

    /// `POST /pool-status/latest/batch` -- freshest samples for a set of pools.
    pub async fn latest_pool_statuses_by_ids(
        &self,
        pool_ids: &[String],
    ) -> Result<Vec<PoolStatusDto>, Error> {
        self.post("pool-status/latest/batch", &pool_ids).await
    }

    /// `GET /pool-status/trend/{poolId}` -- history samples inside a window.
    pub async fn pool_trend(
        &self,
        pool_id: &str,
        query: &TrendQuery,
    ) -> Result<Vec<PoolStatusDto>, Error> {
        self.get_with_query(&format!("pool-status/trend/{pool_id}"), query)
            .await
    }

    /// `GET /pool-status/overview` -- fleet-wide totals.
    pub async fn overview_stats(&self) -> Result<OverviewStatsDto, Error> {
        self.get("pool-status/overview").await
    }
}
