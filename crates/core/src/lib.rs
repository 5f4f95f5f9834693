//! # ZeroCost Core
//!
//! Business logic for the ZeroCost catalog of free/open-source alternatives
//! to paid software.
//!
//! ## Architecture
//!
//! - `model` - Tool and StarterPack records plus the category/platform vocabulary
//! - `store/` - SQLite-backed catalog persistence with default-dataset fallback
//! - `query` - Pure filter/sort pipeline over the catalog
//! - `compare` - Transient, size-capped comparison set
//! - `recommend/` - Gateway to the external AI advisory service
//!
//! ## Usage
//!
//! ```rust,ignore
//! use zerocost_core::store::{CatalogDb, CatalogStore};
//! use zerocost_core::query::{self, QuerySpec};
//!
//! let store = CatalogStore::new(CatalogDb::open()?);
//! let (tools, _packs) = store.load()?;
//! let visible = query::run(&tools, &QuerySpec::default());
//! ```

pub mod compare;
pub mod model;
pub mod query;
pub mod recommend;
pub mod store;
