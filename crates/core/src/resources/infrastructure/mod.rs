pub mod asset_resolver;
pub mod file_asset_source;
pub mod resource_cache;
