pub mod catalog;
pub mod db;
pub mod defaults;

pub use catalog::{new_tool_id, remove, resolve_pack, upsert, CatalogStore};
pub use db::CatalogDb;
