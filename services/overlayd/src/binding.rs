//! Binding between acquired data and an injected renderer.
//!
//! The binding owns the latest wind field and severity markers and decides
//! when the renderer must be handed a new frame: display option changes
//! re-render the data already in hand, data changes go back through the
//! acquisition pipeline first.

use std::sync::Arc;

use tracing::{debug, info, warn};

use overlay_common::{BoundingBox, RenderConfig, WindField};
use wind_pipeline::{Acquired, FieldOrigin, Orchestrator};

/// Fixed velocity range of the overlay, km/h.
const MIN_VELOCITY: f64 = 0.0;
const MAX_VELOCITY: f64 = 25.0;
/// Particle advection scale handed to the renderer.
const VELOCITY_SCALE: f64 = 0.005;

/// Everything the renderer needs to draw the velocity layer.
#[derive(Debug, Clone)]
pub struct DisplayOptions {
    pub min_velocity: f64,
    pub max_velocity: f64,
    pub velocity_scale: f64,
    pub color_stops: Vec<String>,
    pub particle_multiplier: f64,
    pub line_width: f64,
}

impl DisplayOptions {
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            min_velocity: MIN_VELOCITY,
            max_velocity: MAX_VELOCITY,
            velocity_scale: VELOCITY_SCALE,
            color_stops: config.color_scale.stops(),
            particle_multiplier: config.particle_multiplier(),
            line_width: config.effective_line_width(),
        }
    }
}

/// One department marker, fully resolved for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityMarker {
    pub region: String,
    pub glyph: String,
    pub color: String,
    /// (lat, lon) of the region's bounding-box center.
    pub center: (f64, f64),
    pub size_px: u32,
}

/// Render sink. Implementations own the pixels; the binding only decides
/// what and when to hand over.
pub trait OverlayRenderer: Send + Sync {
    fn render(&self, field: &WindField, options: &DisplayOptions, markers: &[SeverityMarker]);
    fn clear(&self);
}

/// Renderer that narrates frames to the log. Stands in where no drawing
/// surface is attached (single-shot runs, smoke tests).
pub struct TracingRenderer;

impl OverlayRenderer for TracingRenderer {
    fn render(&self, field: &WindField, options: &DisplayOptions, markers: &[SeverityMarker]) {
        info!(
            nx = field.nx(),
            ny = field.ny(),
            markers = markers.len(),
            particle_multiplier = options.particle_multiplier,
            line_width = options.line_width,
            "Rendered overlay frame"
        );
    }

    fn clear(&self) {
        info!("Cleared overlay");
    }
}

/// Couples the acquisition pipeline to a renderer.
pub struct RenderBinding {
    orchestrator: Arc<Orchestrator>,
    renderer: Box<dyn OverlayRenderer>,
    bbox: BoundingBox,
    nx: usize,
    ny: usize,
    config: RenderConfig,
    current: Option<Acquired>,
    markers: Vec<SeverityMarker>,
}

impl RenderBinding {
    pub fn new(
        orchestrator: Arc<Orchestrator>,
        renderer: Box<dyn OverlayRenderer>,
        bbox: BoundingBox,
        nx: usize,
        ny: usize,
        config: RenderConfig,
    ) -> Self {
        Self {
            orchestrator,
            renderer,
            bbox,
            nx,
            ny,
            config,
            current: None,
            markers: Vec::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn field(&self) -> Option<&WindField> {
        self.current.as_ref().map(|a| &a.field)
    }

    /// Swap display options and redraw the field already in hand. Never
    /// touches the network or the cache.
    pub fn set_config(&mut self, config: RenderConfig) {
        if config == self.config {
            return;
        }
        self.config = config;
        self.render();
    }

    /// Replace the severity markers and redraw.
    pub fn set_markers(&mut self, markers: Vec<SeverityMarker>) {
        self.markers = markers;
        self.render();
    }

    /// Run acquisition and draw the result. Returns false when acquisition
    /// came up empty; the previous frame is cleared in that case so a stale
    /// field never lingers.
    pub async fn reload(&mut self) -> bool {
        match self.orchestrator.acquire(self.bbox, self.nx, self.ny).await {
            Some(acquired) => {
                debug!(
                    origin = ?acquired.origin,
                    nx = acquired.nx,
                    ny = acquired.ny,
                    "Wind field acquired"
                );
                if acquired.origin == FieldOrigin::Network && acquired.nx < self.nx {
                    info!(
                        requested = self.nx,
                        achieved = acquired.nx,
                        "Field acquired at degraded resolution"
                    );
                }
                self.current = Some(acquired);
                self.render();
                true
            }
            None => {
                warn!("Wind acquisition failed; clearing overlay");
                self.current = None;
                self.renderer.clear();
                false
            }
        }
    }

    /// Drop cached wind entries, then re-acquire from the network.
    pub async fn purge_and_reload(&mut self) -> bool {
        let removed = self.orchestrator.purge().await;
        debug!(removed, "Cache purged before reload");
        self.reload().await
    }

    fn render(&self) {
        if let Some(acquired) = &self.current {
            let options = DisplayOptions::from_config(&self.config);
            self.renderer.render(&acquired.field, &options, &self.markers);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use overlay_common::ColorScale;
    use wind_pipeline::{
        AcquireConfig, LocationSeries, PointSeries, ProviderError, WindProvider,
    };
    use field_cache::MemoryFieldCache;
    use overlay_common::SamplePoint;

    struct CountingRenderer {
        frames: Mutex<Vec<(usize, f64, usize)>>,
        clears: AtomicUsize,
    }

    impl CountingRenderer {
        fn new() -> Self {
            Self {
                frames: Mutex::new(Vec::new()),
                clears: AtomicUsize::new(0),
            }
        }
    }

    impl OverlayRenderer for CountingRenderer {
        fn render(&self, field: &WindField, options: &DisplayOptions, markers: &[SeverityMarker]) {
            self.frames.lock().unwrap().push((
                field.nx(),
                options.particle_multiplier,
                markers.len(),
            ));
        }

        fn clear(&self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct StaticProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl WindProvider for StaticProvider {
        async fn fetch_points(
            &self,
            _points: &[SamplePoint],
        ) -> Result<PointSeries, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Status(500));
            }
            Ok(PointSeries::Single(LocationSeries {
                time: vec!["2024-03-07T14:00".to_string()],
                wind_speed_10m: vec![Some(10.0)],
                wind_direction_10m: vec![Some(90.0)],
            }))
        }
    }

    fn binding_with(
        fail: bool,
    ) -> (
        RenderBinding,
        Arc<StaticProvider>,
        Arc<CountingRenderer>,
    ) {
        let provider = Arc::new(StaticProvider {
            calls: AtomicUsize::new(0),
            fail,
        });
        let cache = Arc::new(MemoryFieldCache::new(16));
        let orchestrator = Arc::new(Orchestrator::new(
            provider.clone(),
            cache,
            AcquireConfig {
                backoff: std::time::Duration::from_millis(1),
                ..AcquireConfig::default()
            },
        ));
        let renderer = Arc::new(CountingRenderer::new());

        struct Shared(Arc<CountingRenderer>);
        impl OverlayRenderer for Shared {
            fn render(
                &self,
                field: &WindField,
                options: &DisplayOptions,
                markers: &[SeverityMarker],
            ) {
                self.0.render(field, options, markers)
            }
            fn clear(&self) {
                self.0.clear()
            }
        }

        let binding = RenderBinding::new(
            orchestrator,
            Box::new(Shared(renderer.clone())),
            overlay_common::FRANCE,
            4,
            4,
            RenderConfig::default(),
        );
        (binding, provider, renderer)
    }

    #[tokio::test]
    async fn test_reload_renders_acquired_field() {
        let (mut binding, provider, renderer) = binding_with(false);
        assert!(binding.reload().await);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let frames = renderer.frames.lock().unwrap();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].0, 4);
    }

    #[tokio::test]
    async fn test_set_config_rerenders_without_refetch() {
        let (mut binding, provider, renderer) = binding_with(false);
        binding.reload().await;

        let mut config = binding.config().clone();
        config.particle_density = 8000;
        config.color_scale = ColorScale::Spectral;
        binding.set_config(config);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        let frames = renderer.frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert!(frames[1].1 > frames[0].1);
    }

    #[tokio::test]
    async fn test_identical_config_is_a_no_op() {
        let (mut binding, _provider, renderer) = binding_with(false);
        binding.reload().await;
        let config = binding.config().clone();
        binding.set_config(config);
        assert_eq!(renderer.frames.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_reload_clears_overlay() {
        let (mut binding, _provider, renderer) = binding_with(true);
        assert!(!binding.reload().await);
        assert!(binding.field().is_none());
        assert_eq!(renderer.clears.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_purge_and_reload_fetches_fresh() {
        let (mut binding, provider, _renderer) = binding_with(false);
        binding.reload().await;
        binding.purge_and_reload().await;
        // The purge removed the cached entry, so the second reload had to
        // go back to the provider.
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_markers_flow_to_renderer() {
        let (mut binding, _provider, renderer) = binding_with(false);
        binding.reload().await;
        binding.set_markers(vec![SeverityMarker {
            region: "75".to_string(),
            glyph: "\u{26a1}".to_string(),
            color: "#f44336".to_string(),
            center: (48.85, 2.35),
            size_px: 14,
        }]);
        let frames = renderer.frames.lock().unwrap();
        assert_eq!(frames.last().unwrap().2, 1);
    }
}
