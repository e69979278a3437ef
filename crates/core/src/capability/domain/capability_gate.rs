use thiserror::Error;

use super::environment::{Environment, RenderApiVersion, TrackerAvailability};
use crate::shared::constants::MIN_RENDER_API_VERSION;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("Augmented faces require a face tracker, which this device does not support")]
    TrackerNotCapable,
    #[error("No renderer available; OpenGL ES {required} or later is required")]
    NoRenderer { required: RenderApiVersion },
    #[error("Rendering requires OpenGL ES {required} or later (found {found})")]
    RenderApiTooOld {
        found: RenderApiVersion,
        required: RenderApiVersion,
    },
    #[error("Could not read render API version: {0}")]
    UnreadableVersion(String),
}

/// One-time startup check that the device can run face overlays.
pub struct CapabilityGate {
    min_version: RenderApiVersion,
}

impl CapabilityGate {
    pub fn new(min_version: RenderApiVersion) -> Self {
        Self { min_version }
    }

    /// Tracker must not be known-incapable and the renderer must meet the
    /// minimum version.
    pub fn evaluate(&self, env: &dyn Environment) -> Result<(), CapabilityError> {
        if env.tracker_availability() == TrackerAvailability::NotCapable {
            return Err(CapabilityError::TrackerNotCapable);
        }
        let raw = env
            .render_api_version()
            .ok_or(CapabilityError::NoRenderer {
                required: self.min_version,
            })?;
        let found: RenderApiVersion = raw.parse().map_err(CapabilityError::UnreadableVersion)?;
        if found < self.min_version {
            return Err(CapabilityError::RenderApiTooOld {
                found,
                required: self.min_version,
            });
        }
        Ok(())
    }

    pub fn check_supported(&self, env: &dyn Environment) -> bool {
        match self.evaluate(env) {
            Ok(()) => true,
            Err(e) => {
                log::error!("{e}");
                false
            }
        }
    }
}

impl Default for CapabilityGate {
    fn default() -> Self {
        let (major, minor) = MIN_RENDER_API_VERSION;
        Self::new(RenderApiVersion::new(major, minor))
    }
}

/// [`CapabilityGate::check_supported`] with the default 3.0 minimum.
pub fn check_supported(env: &dyn Environment) -> bool {
    CapabilityGate::default().check_supported(env)
}
