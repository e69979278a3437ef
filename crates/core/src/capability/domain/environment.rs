use std::fmt;
use std::str::FromStr;

/// Whether the device can run the face tracker at all.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackerAvailability {
    Supported,
    /// Availability could not be determined yet; startup proceeds.
    Unknown,
    /// The device can never run the tracker.
    NotCapable,
}

/// Render API version in OpenGL ES terms, e.g. `3.0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RenderApiVersion {
    pub major: u32,
    pub minor: u32,
}

impl RenderApiVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for RenderApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for RenderApiVersion {
    type Err = String;

    /// Accepts `"3"`, `"3.0"` or `"3.2.1"` (patch ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let parse = |part: Option<&str>| -> Result<u32, String> {
            part.unwrap_or("0")
                .parse::<u32>()
                .map_err(|_| format!("invalid render API version '{s}'"))
        };
        let major = match parts.next() {
            Some(p) if !p.is_empty() => parse(Some(p))?,
            _ => return Err(format!("invalid render API version '{s}'")),
        };
        let minor = parse(parts.next())?;
        Ok(Self::new(major, minor))
    }
}

/// Domain interface for the environment-capability collaborator.
pub trait Environment {
    fn tracker_availability(&self) -> TrackerAvailability;

    /// Version string as the platform reports it (e.g. `"3.0"`), or `None`
    /// if there is no usable renderer.
    fn render_api_version(&self) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("3.0", 3, 0)]
    #[case("3.2", 3, 2)]
    #[case("2", 2, 0)]
    #[case(" 3.1 ", 3, 1)]
    #[case("4.6.0", 4, 6)]
    fn test_parses_version(#[case] input: &str, #[case] major: u32, #[case] minor: u32) {
        assert_eq!(
            input.parse::<RenderApiVersion>().unwrap(),
            RenderApiVersion::new(major, minor)
        );
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("3.x")]
    #[case(".5")]
    fn test_rejects_garbage(#[case] input: &str) {
        assert!(input.parse::<RenderApiVersion>().is_err());
    }

    #[test]
    fn test_versions_order_numerically() {
        assert!(RenderApiVersion::new(3, 10) > RenderApiVersion::new(3, 2));
        assert!(RenderApiVersion::new(2, 9) < RenderApiVersion::new(3, 0));
    }

    #[test]
    fn test_display() {
        assert_eq!(RenderApiVersion::new(3, 1).to_string(), "3.1");
    }
}
