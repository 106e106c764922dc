// Endpoint groups, each a set of inherent methods on `ApiClient`.

pub mod auth;
pub mod pools;
pub mod status;
pub mod system;
pub mod virtual_pools;

pub use pools::PoolListQuery;
