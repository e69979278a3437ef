pub mod detection;
pub mod detection_arena;
pub mod face_tracker;
