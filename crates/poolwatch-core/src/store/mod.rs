// ── Reactive stores ──
//
// Two stores sit between the HTTP adapter and UI consumers: the pool
// directory (admin CRUD views) and the dashboard (public polling view).
// Both publish snapshots through `tokio::sync::watch` channels.

pub mod dashboard;
pub mod directory;
mod flags;

pub use dashboard::{DashboardOp, DashboardStore};
pub use directory::{DirectoryOp, DirectoryStore, PageQuery};
