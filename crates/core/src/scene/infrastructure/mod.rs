pub mod in_memory_scene;
