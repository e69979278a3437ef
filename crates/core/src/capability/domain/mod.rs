pub mod capability_gate;
pub mod environment;
