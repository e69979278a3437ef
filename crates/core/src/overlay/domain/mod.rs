pub mod detection_registry;
pub mod overlay_object;
