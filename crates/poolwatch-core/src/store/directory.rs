// ── Pool directory store ──
//
// Server-paginated pool list, per-pool status cache, and virtual pool
// CRUD for the admin views. Each operation category carries its own
// loading flag and error slot so one failing category never blocks the
// others.
//
// Degradation policy: the status cache is authoritative state, so a
// failed refresh preserves the last-known-good entry. The error slot
// records the failure either way.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::join_all;
use tokio::sync::watch;
use tracing::debug;

use poolwatch_api::models::{PoolWrite, VirtualPoolWrite};
use poolwatch_api::{ApiClient, PoolListQuery};

use crate::error::CoreError;
use crate::model::{
    DataSourceType, Pagination, Pool, PoolId, PoolStatus, PoolWithStatus, VirtualPool,
};

use super::flags::OpState;

// ── Operation categories ────────────────────────────────────────────

/// The directory's independently-flagged operation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryOp {
    Pools,
    Status,
    Virtual,
    Create,
    Update,
    Delete,
}

struct OpSet {
    pools: OpState,
    status: OpState,
    virtual_pools: OpState,
    create: OpState,
    update: OpState,
    delete: OpState,
}

impl OpSet {
    fn new() -> Self {
        Self {
            pools: OpState::new(),
            status: OpState::new(),
            virtual_pools: OpState::new(),
            create: OpState::new(),
            update: OpState::new(),
            delete: OpState::new(),
        }
    }

    fn get(&self, op: DirectoryOp) -> &OpState {
        match op {
            DirectoryOp::Pools => &self.pools,
            DirectoryOp::Status => &self.status,
            DirectoryOp::Virtual => &self.virtual_pools,
            DirectoryOp::Create => &self.create,
            DirectoryOp::Update => &self.update,
            DirectoryOp::Delete => &self.delete,
        }
    }

    fn all(&self) -> [&OpState; 6] {
        [
            &self.pools,
            &self.status,
            &self.virtual_pools,
            &self.create,
            &self.update,
            &self.delete,
        ]
    }
}

// ── PageQuery ───────────────────────────────────────────────────────

/// Caller-supplied page parameters, merged over the current pagination.
#[derive(Debug, Clone, Default)]
pub struct PageQuery {
    pub current: Option<u64>,
    pub size: Option<u64>,
    pub name: Option<String>,
    pub enabled: Option<bool>,
}

// ── DirectoryStore ──────────────────────────────────────────────────

/// Reactive store backing the pool directory and virtual pool views.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct DirectoryStore {
    inner: Arc<DirectoryInner>,
}

struct DirectoryInner {
    api: ApiClient,
    pools: watch::Sender<Arc<Vec<Pool>>>,
    pagination: watch::Sender<Pagination>,
    statuses: DashMap<PoolId, PoolStatus>,
    /// Bumped on every status-cache mutation so subscribers can re-read.
    statuses_rev: watch::Sender<u64>,
    virtual_pools: watch::Sender<Arc<Vec<VirtualPool>>>,
    /// Populated once on first successful fetch, then served from cache.
    data_source_types: watch::Sender<Option<Arc<Vec<DataSourceType>>>>,
    ops: OpSet,
}

impl DirectoryStore {
    pub fn new(api: ApiClient) -> Self {
        let (pools, _) = watch::channel(Arc::new(Vec::new()));
        let (pagination, _) = watch::channel(Pagination::default());
        let (statuses_rev, _) = watch::channel(0);
        let (virtual_pools, _) = watch::channel(Arc::new(Vec::new()));
        let (data_source_types, _) = watch::channel(None);

        Self {
            inner: Arc::new(DirectoryInner {
                api,
                pools,
                pagination,
                statuses: DashMap::new(),
                statuses_rev,
                virtual_pools,
                data_source_types,
                ops: OpSet::new(),
            }),
        }
    }

    // ── Pool listing ─────────────────────────────────────────────────

    /// Fetch one page of pools, replacing the list and pagination
    /// atomically from the page envelope.
    ///
    /// Caller params are merged over the current pagination, so
    /// `PageQuery::default()` re-fetches the current page. A page
    /// envelope without a `records` array clears the list and fails
    /// validation.
    pub async fn fetch_pools(&self, query: PageQuery) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Pools);
        op.begin();

        let pagination = self.inner.pagination.borrow().clone();
        let wire = PoolListQuery {
            current: query.current.unwrap_or(pagination.current),
            size: query.size.unwrap_or(pagination.size),
            name: query.name,
            enabled: query.enabled,
        };

        let page = match self.inner.api.list_pools(&wire).await {
            Ok(page) => page,
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                return Err(err);
            }
        };

        let Some(records) = page.records else {
            self.inner.pools.send_modify(|p| *p = Arc::new(Vec::new()));
            let err = CoreError::Validation("pool page response missing records".into());
            op.finish_err(err.to_string());
            return Err(err);
        };

        let pools: Vec<Pool> = records.into_iter().map(Pool::from).collect();
        let total_pages = if page.pages > 0 {
            page.pages
        } else {
            page.total.div_ceil(page.size.max(1))
        };

        self.inner.pools.send_modify(|p| *p = Arc::new(pools));
        self.inner.pagination.send_modify(|p| {
            *p = Pagination {
                current: page.current.max(1),
                size: page.size.max(1),
                total: page.total,
                total_pages,
            };
        });

        op.finish_ok();
        Ok(())
    }

    /// Move to another page, clamped to the known page range. Does not
    /// fetch; call [`fetch_pools`](Self::fetch_pools) afterwards.
    pub fn set_current_page(&self, page: u64) {
        self.inner.pagination.send_modify(|p| {
            p.current = page.clamp(1, p.total_pages.max(1));
        });
    }

    // ── Status cache ─────────────────────────────────────────────────

    /// Refresh the latest status for one pool.
    ///
    /// On failure the cached entry is left untouched.
    pub async fn fetch_pool_status(&self, id: &PoolId) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Status);
        op.begin();

        match self.inner.api.latest_pool_status(id.as_str()).await {
            Ok(dto) => {
                self.inner.statuses.insert(id.clone(), dto.into());
                self.bump_statuses();
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    /// Refresh statuses for every pool in the current list, one request
    /// per pool. A failing pool is skipped; the rest still land.
    pub async fn fetch_all_pool_statuses(&self) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Status);
        op.begin();

        let ids: Vec<PoolId> = self.pools().iter().map(|p| p.id.clone()).collect();
        let results = join_all(ids.into_iter().map(|id| {
            let api = self.inner.api.clone();
            async move {
                let result = api.latest_pool_status(id.as_str()).await;
                (id, result)
            }
        }))
        .await;

        let mut failed = 0u32;
        for (id, result) in results {
            match result {
                Ok(dto) => {
                    self.inner.statuses.insert(id, dto.into());
                }
                Err(e) => {
                    debug!(pool = %id, error = %e, "status fetch failed, keeping cached entry");
                    failed += 1;
                }
            }
        }
        self.bump_statuses();

        if failed > 0 {
            op.finish_err(format!("{failed} pool status fetches failed"));
        } else {
            op.finish_ok();
        }
        Ok(())
    }

    /// Refresh statuses for a specific set of pools via the batch
    /// endpoint.
    pub async fn fetch_pool_statuses(&self, ids: &[PoolId]) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Status);
        op.begin();

        let raw: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();
        match self.inner.api.latest_pool_statuses_by_ids(&raw).await {
            Ok(dtos) => {
                for dto in dtos {
                    let status = PoolStatus::from(dto);
                    self.inner.statuses.insert(status.pool_id.clone(), status);
                }
                self.bump_statuses();
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    // ── Pool CRUD ────────────────────────────────────────────────────

    /// Create a pool and append the stored entity to the current page.
    pub async fn create_pool(&self, body: &PoolWrite) -> Result<Pool, CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Create);
        op.begin();

        match self.inner.api.create_pool(body).await {
            Ok(dto) => {
                let pool = Pool::from(dto);
                let created = pool.clone();
                self.inner.pools.send_modify(|p| {
                    let mut next = (**p).clone();
                    next.push(pool);
                    *p = Arc::new(next);
                });
                self.inner.pagination.send_modify(|p| p.total += 1);
                op.finish_ok();
                Ok(created)
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    /// Update a pool. The local list is deliberately not patched;
    /// callers re-fetch the page to pick up server-side normalization.
    pub async fn update_pool(&self, id: &PoolId, body: &PoolWrite) -> Result<Pool, CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Update);
        op.begin();

        match self.inner.api.update_pool(id.as_str(), body).await {
            Ok(dto) => {
                op.finish_ok();
                Ok(Pool::from(dto))
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete a pool, splicing it out of the list and dropping its
    /// cached status.
    pub async fn delete_pool(&self, id: &PoolId) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Delete);
        op.begin();

        match self.inner.api.delete_pool(id.as_str()).await {
            Ok(()) => {
                self.inner.pools.send_modify(|p| {
                    let next: Vec<Pool> =
                        p.iter().filter(|pool| pool.id != *id).cloned().collect();
                    *p = Arc::new(next);
                });
                if self.inner.statuses.remove(id).is_some() {
                    self.bump_statuses();
                }
                self.inner
                    .pagination
                    .send_modify(|p| p.total = p.total.saturating_sub(1));
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete several pools in one call. No local splice; callers
    /// re-fetch the page.
    pub async fn delete_pools(&self, ids: &[PoolId]) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Delete);
        op.begin();

        let raw: Vec<String> = ids.iter().map(|id| id.as_str().to_owned()).collect();
        match self.inner.api.delete_pools(&raw).await {
            Ok(()) => {
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    /// Enable or disable a pool. No optimistic update; callers re-fetch.
    pub async fn toggle_pool_enabled(&self, id: &PoolId, enabled: bool) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Update);
        op.begin();

        match self.inner.api.toggle_pool_enabled(id.as_str(), enabled).await {
            Ok(()) => {
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    // ── Virtual pools ────────────────────────────────────────────────

    /// Replace the virtual pool list from the backend.
    pub async fn fetch_virtual_pools(&self) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Virtual);
        op.begin();

        match self.inner.api.list_virtual_pools().await {
            Ok(dtos) => {
                let list: Vec<VirtualPool> = dtos.into_iter().map(VirtualPool::from).collect();
                self.inner
                    .virtual_pools
                    .send_modify(|v| *v = Arc::new(list));
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn create_virtual_pool(
        &self,
        body: &VirtualPoolWrite,
    ) -> Result<VirtualPool, CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Create);
        op.begin();

        match self.inner.api.create_virtual_pool(body).await {
            Ok(dto) => {
                let vp = VirtualPool::from(dto);
                let created = vp.clone();
                self.inner.virtual_pools.send_modify(|v| {
                    let mut next = (**v).clone();
                    next.push(vp);
                    *v = Arc::new(next);
                });
                op.finish_ok();
                Ok(created)
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn update_virtual_pool(
        &self,
        id: &PoolId,
        body: &VirtualPoolWrite,
    ) -> Result<VirtualPool, CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Update);
        op.begin();

        match self.inner.api.update_virtual_pool(id.as_str(), body).await {
            Ok(dto) => {
                let vp = VirtualPool::from(dto);
                let updated = vp.clone();
                self.inner.virtual_pools.send_modify(|v| {
                    let next: Vec<VirtualPool> = v
                        .iter()
                        .map(|existing| {
                            if existing.id == *id {
                                vp.clone()
                            } else {
                                existing.clone()
                            }
                        })
                        .collect();
                    *v = Arc::new(next);
                });
                op.finish_ok();
                Ok(updated)
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    pub async fn delete_virtual_pool(&self, id: &PoolId) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DirectoryOp::Delete);
        op.begin();

        match self.inner.api.delete_virtual_pool(id.as_str()).await {
            Ok(()) => {
                self.inner.virtual_pools.send_modify(|v| {
                    let next: Vec<VirtualPool> =
                        v.iter().filter(|vp| vp.id != *id).cloned().collect();
                    *v = Arc::new(next);
                });
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    /// Resolve a virtual pool's members against the current pool list.
    ///
    /// Member ids are weak references; ids without a matching pool are
    /// skipped.
    pub fn resolve_member_pools(&self, virtual_pool: &VirtualPool) -> Vec<Pool> {
        let pools = self.pools();
        virtual_pool
            .pool_ids
            .iter()
            .filter_map(|id| {
                let found = pools.iter().find(|p| p.id == *id).cloned();
                if found.is_none() {
                    debug!(virtual_pool = %virtual_pool.id, member = %id, "skipping dangling member id");
                }
                found
            })
            .collect()
    }

    // ── Data source types ────────────────────────────────────────────

    /// Backend-registered data source implementations, fetched once and
    /// then served from cache.
    pub async fn fetch_data_source_types(&self) -> Result<Arc<Vec<DataSourceType>>, CoreError> {
        if let Some(cached) = self.inner.data_source_types.borrow().clone() {
            return Ok(cached);
        }

        let dtos = self.inner.api.data_source_types().await?;
        let types = Arc::new(
            dtos.into_iter()
                .map(DataSourceType::from)
                .collect::<Vec<_>>(),
        );
        self.inner
            .data_source_types
            .send_modify(|t| *t = Some(Arc::clone(&types)));
        Ok(types)
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn pools(&self) -> Arc<Vec<Pool>> {
        self.inner.pools.borrow().clone()
    }

    pub fn pool(&self, id: &PoolId) -> Option<Pool> {
        self.pools().iter().find(|p| p.id == *id).cloned()
    }

    pub fn pool_status(&self, id: &PoolId) -> Option<PoolStatus> {
        self.inner.statuses.get(id).map(|s| s.clone())
    }

    /// The current page joined with cached statuses.
    pub fn pools_with_status(&self) -> Vec<PoolWithStatus> {
        self.pools()
            .iter()
            .map(|pool| PoolWithStatus {
                status: self.pool_status(&pool.id),
                pool: pool.clone(),
            })
            .collect()
    }

    /// Pools whose health is anything but offline.
    pub fn active_pools(&self) -> Vec<Pool> {
        self.pools()
            .iter()
            .filter(|p| !p.health.is_offline())
            .cloned()
            .collect()
    }

    pub fn virtual_pools(&self) -> Arc<Vec<VirtualPool>> {
        self.inner.virtual_pools.borrow().clone()
    }

    pub fn virtual_pool(&self, id: &PoolId) -> Option<VirtualPool> {
        self.virtual_pools().iter().find(|v| v.id == *id).cloned()
    }

    pub fn pagination(&self) -> Pagination {
        self.inner.pagination.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.ops.all().iter().any(|op| op.is_loading())
    }

    pub fn is_op_loading(&self, op: DirectoryOp) -> bool {
        self.inner.ops.get(op).is_loading()
    }

    pub fn has_error(&self) -> bool {
        self.inner.ops.all().iter().any(|op| op.error().is_some())
    }

    pub fn error(&self, op: DirectoryOp) -> Option<String> {
        self.inner.ops.get(op).error()
    }

    pub fn clear_error(&self, op: DirectoryOp) {
        self.inner.ops.get(op).clear_error();
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_pools(&self) -> watch::Receiver<Arc<Vec<Pool>>> {
        self.inner.pools.subscribe()
    }

    pub fn subscribe_virtual_pools(&self) -> watch::Receiver<Arc<Vec<VirtualPool>>> {
        self.inner.virtual_pools.subscribe()
    }

    pub fn subscribe_pagination(&self) -> watch::Receiver<Pagination> {
        self.inner.pagination.subscribe()
    }

    /// Bumped whenever the status cache changes.
    pub fn subscribe_statuses(&self) -> watch::Receiver<u64> {
        self.inner.statuses_rev.subscribe()
    }

    pub fn subscribe_loading(&self, op: DirectoryOp) -> watch::Receiver<bool> {
        self.inner.ops.get(op).subscribe_loading()
    }

    pub fn subscribe_error(&self, op: DirectoryOp) -> watch::Receiver<Option<String>> {
        self.inner.ops.get(op).subscribe_error()
    }

    /// Drop all cached state back to the initial snapshot.
    pub fn reset(&self) {
        self.inner.pools.send_modify(|p| *p = Arc::new(Vec::new()));
        self.inner
            .pagination
            .send_modify(|p| *p = Pagination::default());
        self.inner.statuses.clear();
        self.bump_statuses();
        self.inner
            .virtual_pools
            .send_modify(|v| *v = Arc::new(Vec::new()));
        self.inner.data_source_types.send_modify(|t| *t = None);
        for op in self.inner.ops.all() {
            op.clear_error();
        }
    }

    fn bump_statuses(&self) {
        self.inner.statuses_rev.send_modify(|r| *r += 1);
    }
}
