use crate::capability::domain::environment::{Environment, RenderApiVersion, TrackerAvailability};

/// Environment backed by a wgpu adapter probe.
///
/// wgpu has no OpenGL ES version query, so the adapter is mapped onto the
/// GLES feature level it guarantees: the GL backend needs at least GLES 3.0
/// (3.1 once compute shaders are exposed), and native backends cover GLES
/// 3.2. Tracker availability comes from the caller.
pub struct WgpuEnvironment {
    tracker: TrackerAvailability,
    version: Option<RenderApiVersion>,
}

impl WgpuEnvironment {
    /// Probes for an adapter. Blocks briefly while wgpu enumerates devices.
    pub fn probe(tracker: TrackerAvailability) -> Self {
        let instance = wgpu::Instance::default();
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }));

        let version = adapter.and_then(|adapter| {
            let info = adapter.get_info();
            let compute = adapter
                .get_downlevel_capabilities()
                .flags
                .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS);
            let version = gles_equivalent(info.backend, compute);
            log::info!(
                "Using {} ({:?}), render API level {}",
                info.name,
                info.backend,
                version.map_or_else(|| "none".to_string(), |v| v.to_string())
            );
            version
        });
        if version.is_none() {
            log::warn!("No usable GPU adapter found");
        }

        Self { tracker, version }
    }
}

impl Environment for WgpuEnvironment {
    fn tracker_availability(&self) -> TrackerAvailability {
        self.tracker
    }

    fn render_api_version(&self) -> Option<String> {
        self.version.map(|v| v.to_string())
    }
}

fn gles_equivalent(backend: wgpu::Backend, compute_shaders: bool) -> Option<RenderApiVersion> {
    match backend {
        wgpu::Backend::Gl if compute_shaders => Some(RenderApiVersion::new(3, 1)),
        wgpu::Backend::Gl => Some(RenderApiVersion::new(3, 0)),
        wgpu::Backend::Vulkan | wgpu::Backend::Metal | wgpu::Backend::Dx12 => {
            Some(RenderApiVersion::new(3, 2))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(wgpu::Backend::Gl, false, Some((3, 0)))]
    #[case(wgpu::Backend::Gl, true, Some((3, 1)))]
    #[case(wgpu::Backend::Vulkan, true, Some((3, 2)))]
    #[case(wgpu::Backend::Metal, true, Some((3, 2)))]
    #[case(wgpu::Backend::Dx12, false, Some((3, 2)))]
    #[case(wgpu::Backend::Empty, true, None)]
    fn test_gles_equivalent(
        #[case] backend: wgpu::Backend,
        #[case] compute: bool,
        #[case] expected: Option<(u32, u32)>,
    ) {
        let expected = expected.map(|(major, minor)| RenderApiVersion::new(major, minor));
        assert_eq!(gles_equivalent(backend, compute), expected);
    }

    #[test]
    fn test_probe_reports_caller_tracker_availability() {
        // Adapter result depends on hardware; only the tracker flag is fixed.
        let env = WgpuEnvironment::probe(TrackerAvailability::Unknown);
        assert_eq!(env.tracker_availability(), TrackerAvailability::Unknown);
        if let Some(version) = env.render_api_version() {
            assert!(version.parse::<RenderApiVersion>().is_ok());
        }
    }
}
