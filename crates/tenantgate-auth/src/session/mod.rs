//! Cache-backed session store.

pub mod store;

pub use store::CachedSessionStore;
