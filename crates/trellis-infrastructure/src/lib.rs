//! Infrastructure adapters for the Trellis sync engine.
//!
//! Platform paths, atomic local storage, and the TOML-backed persisted
//! session cache.

pub mod paths;
pub mod session_cache;
pub mod storage;

pub use paths::TrellisPaths;
pub use session_cache::TomlSessionCache;
