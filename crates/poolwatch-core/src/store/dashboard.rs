// ── Dashboard polling store ──
//
// Public pool overview with pool selection, trend charts, and a
// recurring refresh task. Everything published here is a derived view
// rebuilt per fetch, so failures blank the affected slot rather than
// preserving stale data.
//
// Stale-response guard: every history/latest-status fetch takes a
// monotonically increasing generation token for its slot; a completion
// whose token is no longer the latest issued for that slot is discarded.
// Rapid pool switching therefore cannot let an older response overwrite
// newer state.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use poolwatch_api::ApiClient;
use poolwatch_api::models::TrendQuery;

use crate::chart;
use crate::error::CoreError;
use crate::model::{
    ChartSeries, OverviewStats, Pool, PoolId, PoolStatus, PoolWithStatus, TimeRange,
};

use super::flags::OpState;

// ── Operation categories ────────────────────────────────────────────

/// The dashboard's independently-flagged operation categories.
///
/// History and latest-status fetches run concurrently for the selected
/// pool, so each gets its own flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardOp {
    /// Public pool list + status join.
    Pools,
    /// Overview totals.
    Overview,
    /// Selected-pool trend history.
    History,
    /// Selected-pool latest status.
    Status,
}

struct OpSet {
    pools: OpState,
    overview: OpState,
    history: OpState,
    status: OpState,
}

impl OpSet {
    fn new() -> Self {
        Self {
            pools: OpState::new(),
            overview: OpState::new(),
            history: OpState::new(),
            status: OpState::new(),
        }
    }

    fn get(&self, op: DashboardOp) -> &OpState {
        match op {
            DashboardOp::Pools => &self.pools,
            DashboardOp::Overview => &self.overview,
            DashboardOp::History => &self.history,
            DashboardOp::Status => &self.status,
        }
    }

    fn all(&self) -> [&OpState; 4] {
        [&self.pools, &self.overview, &self.history, &self.status]
    }
}

struct RefreshTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

// ── DashboardStore ──────────────────────────────────────────────────

/// Reactive store backing the public dashboard view.
///
/// Cheap to clone; the auto-refresh task holds a clone.
#[derive(Clone)]
pub struct DashboardStore {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    api: ApiClient,
    pools: watch::Sender<Arc<Vec<PoolWithStatus>>>,
    overview: watch::Sender<Option<OverviewStats>>,
    selected: watch::Sender<Option<PoolId>>,
    selected_status: watch::Sender<Option<PoolStatus>>,
    time_range: watch::Sender<TimeRange>,
    charts: DashMap<(PoolId, TimeRange), ChartSeries>,
    charts_rev: watch::Sender<u64>,
    /// Source of generation tokens for the stale-response guard.
    generation: AtomicU64,
    /// Latest issued generation per chart slot.
    chart_gens: DashMap<(PoolId, TimeRange), u64>,
    /// Latest issued generation for the selected-status slot.
    status_gen: AtomicU64,
    ops: OpSet,
    refresh: Mutex<Option<RefreshTask>>,
}

impl DashboardStore {
    pub fn new(api: ApiClient) -> Self {
        let (pools, _) = watch::channel(Arc::new(Vec::new()));
        let (overview, _) = watch::channel(None);
        let (selected, _) = watch::channel(None);
        let (selected_status, _) = watch::channel(None);
        let (time_range, _) = watch::channel(TimeRange::default());
        let (charts_rev, _) = watch::channel(0);

        Self {
            inner: Arc::new(DashboardInner {
                api,
                pools,
                overview,
                selected,
                selected_status,
                time_range,
                charts: DashMap::new(),
                charts_rev,
                generation: AtomicU64::new(0),
                chart_gens: DashMap::new(),
                status_gen: AtomicU64::new(0),
                ops: OpSet::new(),
                refresh: Mutex::new(None),
            }),
        }
    }

    // ── Fetches ──────────────────────────────────────────────────────

    /// Fetch the public pool list and all latest statuses concurrently,
    /// join them in one pass, and publish the enriched list.
    ///
    /// When nothing is selected yet, the first pool becomes selected
    /// (without triggering detail fetches). Failure blanks the list.
    pub async fn fetch_public_pools(&self) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DashboardOp::Pools);
        op.begin();

        let (pools_res, statuses_res) = tokio::join!(
            self.inner.api.list_public_pools(),
            self.inner.api.all_latest_pool_statuses(),
        );

        let (pool_dtos, status_dtos) = match (pools_res, statuses_res) {
            (Ok(pools), Ok(statuses)) => (pools, statuses),
            (Err(e), _) | (_, Err(e)) => {
                self.inner.pools.send_modify(|p| *p = Arc::new(Vec::new()));
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                return Err(err);
            }
        };

        // Index statuses once so the join is O(pools + statuses).
        let mut index: HashMap<String, PoolStatus> = status_dtos
            .into_iter()
            .map(|dto| {
                let status = PoolStatus::from(dto);
                (status.pool_id.as_str().to_owned(), status)
            })
            .collect();

        let enriched: Vec<PoolWithStatus> = pool_dtos
            .into_iter()
            .map(Pool::from)
            .map(|pool| PoolWithStatus {
                status: index.remove(pool.id.as_str()),
                pool,
            })
            .collect();

        match self.selected() {
            None => {
                if let Some(first) = enriched.first() {
                    debug!(pool = %first.pool.id, "auto-selecting first public pool");
                    self.inner
                        .selected
                        .send_modify(|s| *s = Some(first.pool.id.clone()));
                    self.inner
                        .selected_status
                        .send_modify(|s| *s = first.status.clone());
                }
            }
            Some(id) => {
                // Keep the selected status fresh from the joined data.
                if let Some(entry) = enriched.iter().find(|e| e.pool.id == id) {
                    if entry.status.is_some() {
                        self.inner
                            .selected_status
                            .send_modify(|s| s.clone_from(&entry.status));
                    }
                }
            }
        }

        self.inner.pools.send_modify(|p| *p = Arc::new(enriched));
        op.finish_ok();
        Ok(())
    }

    /// Fetch the aggregate overview totals. Failure blanks the slot.
    pub async fn fetch_overview_stats(&self) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DashboardOp::Overview);
        op.begin();

        match self.inner.api.overview_stats().await {
            Ok(dto) => {
                self.inner
                    .overview
                    .send_modify(|o| *o = Some(OverviewStats::from(dto)));
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                self.inner.overview.send_modify(|o| *o = None);
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    /// Fetch the latest status for one pool into the selected-status
    /// slot, discarding the response if a newer fetch was issued
    /// meanwhile.
    pub async fn fetch_latest_pool_status(&self, id: &PoolId) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DashboardOp::Status);
        op.begin();

        let generation = self.next_generation();
        self.inner.status_gen.store(generation, Ordering::SeqCst);

        match self.inner.api.latest_pool_status(id.as_str()).await {
            Ok(dto) => {
                if self.inner.status_gen.load(Ordering::SeqCst) == generation {
                    self.inner
                        .selected_status
                        .send_modify(|s| *s = Some(dto.into()));
                } else {
                    debug!(pool = %id, "discarding stale status response");
                }
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                if self.inner.status_gen.load(Ordering::SeqCst) == generation {
                    self.inner.selected_status.send_modify(|s| *s = None);
                }
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    /// Fetch trend history for a pool and range, rebuilding that chart
    /// slot wholesale. The window is computed from the range token
    /// relative to fetch time. Stale completions are discarded; failure
    /// blanks the slot.
    pub async fn fetch_pool_history(
        &self,
        id: &PoolId,
        range: TimeRange,
    ) -> Result<(), CoreError> {
        let op = self.inner.ops.get(DashboardOp::History);
        op.begin();

        let key = (id.clone(), range);
        let generation = self.next_generation();
        self.inner.chart_gens.insert(key.clone(), generation);

        let end = Utc::now();
        let start = end - range.window();
        let query = TrendQuery {
            time_range: range.to_string(),
            start_time: start.timestamp_millis(),
            end_time: end.timestamp_millis(),
        };

        match self.inner.api.pool_trend(id.as_str(), &query).await {
            Ok(dtos) => {
                if self.is_current_chart_generation(&key, generation) {
                    let records: Vec<PoolStatus> =
                        dtos.into_iter().map(PoolStatus::from).collect();
                    match chart::build_series(&records, range) {
                        Some(series) => {
                            self.inner.charts.insert(key, series);
                        }
                        None => {
                            self.inner.charts.remove(&key);
                        }
                    }
                    self.bump_charts();
                } else {
                    debug!(pool = %id, range = %range, "discarding stale history response");
                }
                op.finish_ok();
                Ok(())
            }
            Err(e) => {
                if self.is_current_chart_generation(&key, generation) {
                    self.inner.charts.remove(&key);
                    self.bump_charts();
                }
                let err = CoreError::from(e);
                op.finish_err(err.to_string());
                Err(err)
            }
        }
    }

    // ── Selection ────────────────────────────────────────────────────

    /// Change the selected pool.
    ///
    /// Selecting the already-selected id is a no-op (no requests).
    /// Selecting a new id fetches its history and latest status
    /// concurrently; chart entries for other pools are retained.
    /// `None` clears the selection, the selected status, and all chart
    /// data.
    pub async fn set_selected_pool(&self, id: Option<PoolId>) {
        if *self.inner.selected.borrow() == id {
            return;
        }

        match id {
            None => {
                self.inner.selected.send_modify(|s| *s = None);
                self.inner.selected_status.send_modify(|s| *s = None);
                // Invalidate in-flight detail fetches along with the data.
                self.inner.status_gen.store(self.next_generation(), Ordering::SeqCst);
                self.inner.chart_gens.clear();
                self.inner.charts.clear();
                self.bump_charts();
            }
            Some(id) => {
                self.inner.selected.send_modify(|s| *s = Some(id.clone()));
                let range = *self.inner.time_range.borrow();
                let (history, status) = tokio::join!(
                    self.fetch_pool_history(&id, range),
                    self.fetch_latest_pool_status(&id),
                );
                if let Err(e) = history {
                    warn!(pool = %id, error = %e, "history fetch failed");
                }
                if let Err(e) = status {
                    warn!(pool = %id, error = %e, "status fetch failed");
                }
            }
        }
    }

    /// Change the chart time range; refetches history for the selected
    /// pool when one is set.
    pub async fn set_time_range(&self, range: TimeRange) {
        self.inner.time_range.send_modify(|r| *r = range);
        if let Some(id) = self.selected() {
            if let Err(e) = self.fetch_pool_history(&id, range).await {
                warn!(pool = %id, error = %e, "history fetch failed");
            }
        }
    }

    // ── Auto refresh ─────────────────────────────────────────────────

    /// Install the recurring refresh task, replacing any previous one.
    ///
    /// Each tick refreshes overview + public pools concurrently, then
    /// (if a pool is selected) its history and latest status. Failures
    /// are logged and never stop the task.
    pub async fn start_auto_refresh(&self, period: Duration) {
        self.stop_auto_refresh().await;

        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        let store = self.clone();

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // consume the immediate first tick

            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    _ = interval.tick() => store.refresh_cycle().await,
                }
            }
        });

        *self.inner.refresh.lock().await = Some(RefreshTask { cancel, handle });
    }

    /// Cancel the refresh task and wait for it to finish. Safe to call
    /// when no task is active; after it returns the task performs no
    /// further mutations.
    pub async fn stop_auto_refresh(&self) {
        let task = self.inner.refresh.lock().await.take();
        if let Some(task) = task {
            task.cancel.cancel();
            let _ = task.handle.await;
        }
    }

    async fn refresh_cycle(&self) {
        debug!("dashboard refresh tick");
        let (overview, pools) = tokio::join!(
            self.fetch_overview_stats(),
            self.fetch_public_pools(),
        );
        if let Err(e) = overview {
            warn!(error = %e, "overview refresh failed");
        }
        if let Err(e) = pools {
            warn!(error = %e, "public pool refresh failed");
        }

        if let Some(id) = self.selected() {
            let range = *self.inner.time_range.borrow();
            let (history, status) = tokio::join!(
                self.fetch_pool_history(&id, range),
                self.fetch_latest_pool_status(&id),
            );
            if let Err(e) = history {
                warn!(pool = %id, error = %e, "history refresh failed");
            }
            if let Err(e) = status {
                warn!(pool = %id, error = %e, "status refresh failed");
            }
        }
    }

    // ── Getters ──────────────────────────────────────────────────────

    pub fn pools(&self) -> Arc<Vec<PoolWithStatus>> {
        self.inner.pools.borrow().clone()
    }

    pub fn overview(&self) -> Option<OverviewStats> {
        self.inner.overview.borrow().clone()
    }

    pub fn selected(&self) -> Option<PoolId> {
        self.inner.selected.borrow().clone()
    }

    /// The selected pool joined with its freshest status (the dedicated
    /// status slot when populated, otherwise the listing join).
    pub fn selected_pool(&self) -> Option<PoolWithStatus> {
        let id = self.selected()?;
        let entry = self.pools().iter().find(|e| e.pool.id == id).cloned()?;
        let status = self
            .inner
            .selected_status
            .borrow()
            .clone()
            .or(entry.status);
        Some(PoolWithStatus {
            pool: entry.pool,
            status,
        })
    }

    pub fn selected_status(&self) -> Option<PoolStatus> {
        self.inner.selected_status.borrow().clone()
    }

    pub fn time_range(&self) -> TimeRange {
        *self.inner.time_range.borrow()
    }

    pub fn chart_data(&self, id: &PoolId, range: TimeRange) -> Option<ChartSeries> {
        self.inner
            .charts
            .get(&(id.clone(), range))
            .map(|s| s.clone())
    }

    /// Chart data for the selected pool.
    pub fn current_chart_data(&self, range: TimeRange) -> Option<ChartSeries> {
        let id = self.selected()?;
        self.chart_data(&id, range)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.ops.all().iter().any(|op| op.is_loading())
    }

    pub fn is_op_loading(&self, op: DashboardOp) -> bool {
        self.inner.ops.get(op).is_loading()
    }

    pub fn has_error(&self) -> bool {
        self.inner.ops.all().iter().any(|op| op.error().is_some())
    }

    pub fn error(&self, op: DashboardOp) -> Option<String> {
        self.inner.ops.get(op).error()
    }

    pub fn clear_error(&self, op: DashboardOp) {
        self.inner.ops.get(op).clear_error();
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_pools(&self) -> watch::Receiver<Arc<Vec<PoolWithStatus>>> {
        self.inner.pools.subscribe()
    }

    pub fn subscribe_overview(&self) -> watch::Receiver<Option<OverviewStats>> {
        self.inner.overview.subscribe()
    }

    pub fn subscribe_selected(&self) -> watch::Receiver<Option<PoolId>> {
        self.inner.selected.subscribe()
    }

    pub fn subscribe_selected_status(&self) -> watch::Receiver<Option<PoolStatus>> {
        self.inner.selected_status.subscribe()
    }

    /// Bumped whenever any chart slot changes.
    pub fn subscribe_charts(&self) -> watch::Receiver<u64> {
        self.inner.charts_rev.subscribe()
    }

    /// Stop the refresh task and drop all published state.
    pub async fn reset(&self) {
        self.stop_auto_refresh().await;
        self.inner.pools.send_modify(|p| *p = Arc::new(Vec::new()));
        self.inner.overview.send_modify(|o| *o = None);
        self.inner.selected.send_modify(|s| *s = None);
        self.inner.selected_status.send_modify(|s| *s = None);
        self.inner.time_range.send_modify(|r| *r = TimeRange::default());
        self.inner.status_gen.store(self.next_generation(), Ordering::SeqCst);
        self.inner.chart_gens.clear();
        self.inner.charts.clear();
        self.bump_charts();
        for op in self.inner.ops.all() {
            op.clear_error();
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current_chart_generation(&self, key: &(PoolId, TimeRange), generation: u64) -> bool {
        self.inner
            .chart_gens
            .get(key)
            .is_some_and(|g| *g == generation)
    }

    fn bump_charts(&self) {
        self.inner.charts_rev.send_modify(|r| *r += 1);
    }
}
