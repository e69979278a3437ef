pub mod capability;
pub mod frame;
pub mod overlay;
pub mod resources;
pub mod scene;
pub mod session;
pub mod shared;
pub mod tracking;
