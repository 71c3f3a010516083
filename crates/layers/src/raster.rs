use std::sync::Arc;

use catalog::{ConfigurationError, ImageryItemConfig, SourceToken};
use foundation::time::{Time, TimeSpan};
use runtime::clock::{Clock, ClockTick};
use runtime::metrics::Metrics;
use runtime::notifications::NotificationSink;
use tracing::info;

use crate::error::LayerError;
use crate::layer::LayerId;
use crate::symbology::LayerStyle;
use crate::time_dynamic::{ControllerState, LayerContent, TimeDynamicLayerController};
use crate::viewer::ViewerPort;

/// A raster imagery catalog item: configuration resolved into an interval
/// index, a start time and the controller that drives its layers.
#[derive(Debug)]
pub struct ImageryLayerItem {
    bounds: Option<TimeSpan>,
    initial_time: Option<Time>,
    clock_initialized: bool,
    controller: TimeDynamicLayerController,
}

impl ImageryLayerItem {
    /// Fails on malformed intervals, an unparsable `initialTimeSource`, or a
    /// static item without a source. `now` feeds the `present` policy.
    pub fn from_config(config: &ImageryItemConfig, now: Time) -> Result<Self, LayerError> {
        let style = LayerStyle::from_config(config);
        let (content, bounds, initial_time) = match config.interval_index()? {
            Some(index) => {
                let policy = config.initial_time_source()?;
                let bounds = index.bounds();
                let initial_time = bounds.map(|b| policy.resolve(b, now));
                (LayerContent::TimeDynamic(Arc::new(index)), bounds, initial_time)
            }
            None => {
                let source = config
                    .source
                    .clone()
                    .ok_or_else(|| ConfigurationError::MissingSource {
                        name: config.name.clone(),
                    })?;
                (LayerContent::Static(source), None, None)
            }
        };

        Ok(Self {
            bounds,
            initial_time,
            clock_initialized: false,
            controller: TimeDynamicLayerController::new(config.name.clone(), content, style),
        })
    }

    pub fn name(&self) -> &str {
        self.controller.name()
    }

    pub fn is_time_dynamic(&self) -> bool {
        self.controller.is_time_dynamic()
    }

    pub fn is_enabled(&self) -> bool {
        self.controller.state() != ControllerState::Disabled
    }

    pub fn is_shown(&self) -> bool {
        self.controller.style().shown
    }

    pub fn time_bounds(&self) -> Option<TimeSpan> {
        self.bounds
    }

    pub fn initial_time(&self) -> Option<Time> {
        self.initial_time
    }

    pub fn controller(&self) -> &TimeDynamicLayerController {
        &self.controller
    }

    pub fn current_source(&self) -> Option<&SourceToken> {
        self.controller.current_source()
    }

    pub fn next_source(&self) -> Option<&SourceToken> {
        self.controller.next_source()
    }

    /// The first enable moves the clock to the item's initial time.
    pub fn enable(&mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) {
        if !self.clock_initialized {
            if let Some(t) = self.initial_time {
                info!(item = %self.name(), time = ?t.to_iso8601(), "clock set to initial time");
                clock.set_current_time(t);
            }
            self.clock_initialized = true;
        }
        self.controller.enable(clock, viewer);
    }

    pub fn disable(&mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) {
        self.controller.disable(clock, viewer);
    }

    /// Tear the item down for removal from the catalog: every layer is
    /// destroyed and the clock subscription cancelled. Returns the
    /// controller's final counters.
    pub fn remove(mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) -> Metrics {
        self.controller.disable(clock, viewer);
        info!(item = %self.name(), "imagery item removed");
        self.controller.metrics().clone()
    }

    pub fn show(&mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) {
        self.controller.show(clock, viewer);
    }

    pub fn hide(&mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) {
        self.controller.hide(clock, viewer);
    }

    pub fn set_opacity(&mut self, opacity: f32, viewer: &mut dyn ViewerPort) {
        self.controller.set_opacity(opacity, viewer);
    }

    /// Deliver a tick if this item is currently subscribed to `clock`.
    pub fn on_clock_tick(&mut self, clock: &Clock, tick: ClockTick, viewer: &mut dyn ViewerPort) {
        if let Some(token) = self.controller.subscription()
            && clock.is_subscribed(token)
        {
            self.controller.on_tick(tick, viewer);
        }
    }

    pub fn process_faults(
        &mut self,
        viewer: &mut dyn ViewerPort,
        sink: &mut dyn NotificationSink,
    ) -> usize {
        self.controller.process_faults(viewer, sink)
    }

    pub fn pickable_layer(&self, viewer: &dyn ViewerPort) -> Result<Option<LayerId>, LayerError> {
        self.controller.pickable_layer(viewer)
    }
}

#[cfg(test)]
mod tests {
    use super::ImageryLayerItem;
    use crate::error::LayerError;
    use crate::testing::RecordingViewer;
    use catalog::{ConfigurationError, ImageryItemConfig, IntervalEntry};
    use foundation::time::Time;
    use runtime::clock::Clock;

    fn daily() -> ImageryItemConfig {
        let mut cfg = ImageryItemConfig::new("daily");
        cfg.intervals = vec![
            IntervalEntry::new("2020-01-01/2020-01-02", "d1".into()),
            IntervalEntry::new("2020-01-02/2020-01-03", "d2".into()),
            IntervalEntry::new("2020-01-03/2020-01-04", "d3".into()),
        ];
        cfg
    }

    #[test]
    fn first_enable_moves_clock_to_initial_time() {
        let mut cfg = daily();
        cfg.initial_time_source = Some("start".to_string());
        let mut item = ImageryLayerItem::from_config(&cfg, Time(0.0)).unwrap();
        let start = Time(1_577_836_800.0);
        assert_eq!(item.initial_time(), Some(start));

        let mut clock = Clock::new(Time(0.0), 1.0);
        let mut viewer = RecordingViewer::new();
        item.enable(&mut clock, &mut viewer);
        assert_eq!(clock.current_time(), start);
        assert_eq!(item.current_source().unwrap().as_str(), Some("d1"));
        assert_eq!(item.next_source().unwrap().as_str(), Some("d2"));

        // Later enables leave the clock where the user put it.
        item.disable(&mut clock, &mut viewer);
        clock.set_current_time(Time(start.0 + 86_400.0 * 2.5));
        item.enable(&mut clock, &mut viewer);
        assert_eq!(item.current_source().unwrap().as_str(), Some("d3"));
        item.disable(&mut clock, &mut viewer);
        assert_eq!(viewer.created(), viewer.destroyed());
    }

    #[test]
    fn removing_an_enabled_item_releases_everything() {
        let mut item = ImageryLayerItem::from_config(&daily(), Time(0.0)).unwrap();
        let mut clock = Clock::new(Time(0.0), 1.0);
        let mut viewer = RecordingViewer::new();
        item.enable(&mut clock, &mut viewer);
        assert_eq!(viewer.live(), 2);
        assert_eq!(clock.subscriber_count(), 1);

        let metrics = item.remove(&mut clock, &mut viewer);
        assert_eq!(metrics.counter("layers.released"), 2);
        assert_eq!(viewer.live(), 0);
        assert_eq!(viewer.created(), viewer.destroyed());
        assert_eq!(clock.subscriber_count(), 0);
    }

    #[test]
    fn present_policy_clamps_now() {
        let item = ImageryLayerItem::from_config(&daily(), Time(2e9)).unwrap();
        assert_eq!(item.initial_time(), Some(Time(1_577_836_800.0 + 3.0 * 86_400.0)));
    }

    #[test]
    fn bad_initial_time_aborts_construction() {
        let mut cfg = daily();
        cfg.initial_time_source = Some("someday".to_string());
        let err = ImageryLayerItem::from_config(&cfg, Time(0.0)).unwrap_err();
        assert!(matches!(
            err,
            LayerError::Configuration(ConfigurationError::InvalidInitialTime { .. })
        ));
    }

    #[test]
    fn static_item_needs_a_source() {
        let cfg = ImageryItemConfig::new("empty");
        let err = ImageryLayerItem::from_config(&cfg, Time(0.0)).unwrap_err();
        assert!(matches!(
            err,
            LayerError::Configuration(ConfigurationError::MissingSource { .. })
        ));
    }

    #[test]
    fn ticks_only_reach_subscribed_items() {
        let mut item = ImageryLayerItem::from_config(&daily(), Time(0.0)).unwrap();
        let mut clock = Clock::new(Time(0.0), 86_400.0);
        let mut viewer = RecordingViewer::new();
        item.enable(&mut clock, &mut viewer);
        assert_eq!(item.current_source().unwrap().as_str(), Some("d1"));

        item.hide(&mut clock, &mut viewer);
        let tick = clock.advance(1.5);
        item.on_clock_tick(&clock, tick, &mut viewer);
        assert_eq!(item.current_source().unwrap().as_str(), Some("d1"));

        // Showing again catches up with the clock.
        item.show(&mut clock, &mut viewer);
        assert_eq!(item.current_source().unwrap().as_str(), Some("d2"));
        item.disable(&mut clock, &mut viewer);
    }
}
