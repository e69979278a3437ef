pub mod wgpu_environment;
