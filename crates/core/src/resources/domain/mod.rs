pub mod asset_source;
pub mod render_assets;
