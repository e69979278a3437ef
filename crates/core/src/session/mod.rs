pub mod overlay_session;
pub mod session_logger;
