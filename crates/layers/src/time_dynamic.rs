//! Double-buffered imagery layers driven by a playback clock.
//!
//! While a time-dynamic item is enabled it owns up to two renderer layers:
//! `current`, the one the user sees, and `next`, the interval the clock will
//! reach next in its direction of travel. `next` is created shown but fully
//! transparent so its tiles load before it is needed; at the interval
//! boundary it is promoted to full opacity and the outgoing layer destroyed.
//!
//! Tick order is fixed: discard stale `next` → create fresh `next` → promote
//! → prefetch the following interval. Any other order shows a blank or a
//! double-exposed frame at the boundary.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};

use catalog::{IntervalIndex, SourceToken};
use foundation::math::precision::unit_interval_f32;
use runtime::clock::{Clock, ClockTick, PlaybackDirection, SubscriptionToken};
use runtime::metrics::Metrics;
use runtime::notifications::{Notification, NotificationSink};
use tracing::{debug, warn};

use crate::error::LayerError;
use crate::layer::LayerId;
use crate::slot::LayerSlot;
use crate::symbology::LayerStyle;
use crate::viewer::{FaultKind, FaultReporter, LayerFault, LayerRequest, ViewerPort};

/// What an imagery item displays.
#[derive(Debug, Clone)]
pub enum LayerContent {
    /// One source, no clock involvement.
    Static(SourceToken),
    /// One source per interval.
    TimeDynamic(Arc<IntervalIndex<SourceToken>>),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControllerState {
    /// No layers, no clock subscription.
    Disabled,
    /// A single static layer.
    Static,
    /// Clock-driven `current`/`next` layers.
    Dynamic,
}

pub struct TimeDynamicLayerController {
    name: String,
    content: LayerContent,
    style: LayerStyle,
    state: ControllerState,
    current: Option<LayerSlot>,
    next: Option<LayerSlot>,
    subscription: Option<SubscriptionToken>,
    /// Held while `apply_tick` runs.
    tick_in_progress: bool,
    faults_tx: Sender<LayerFault>,
    faults_rx: Receiver<LayerFault>,
    metrics: Metrics,
}

impl std::fmt::Debug for TimeDynamicLayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeDynamicLayerController")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("current", &self.current_interval())
            .field("next", &self.next_interval())
            .field("subscribed", &self.subscription.is_some())
            .finish()
    }
}

fn predicted_interval(idx: usize, direction: PlaybackDirection, len: usize) -> Option<usize> {
    match direction {
        PlaybackDirection::Forward => (idx + 1 < len).then_some(idx + 1),
        PlaybackDirection::Backward => idx.checked_sub(1),
    }
}

/// First interval the clock will enter from a gap at `insertion`.
fn upcoming_interval(insertion: usize, direction: PlaybackDirection, len: usize) -> Option<usize> {
    match direction {
        PlaybackDirection::Forward => (insertion < len).then_some(insertion),
        PlaybackDirection::Backward => insertion.checked_sub(1),
    }
}

impl TimeDynamicLayerController {
    pub fn new(name: impl Into<String>, content: LayerContent, style: LayerStyle) -> Self {
        let (faults_tx, faults_rx) = mpsc::channel();
        Self {
            name: name.into(),
            content,
            style: LayerStyle {
                opacity: unit_interval_f32(style.opacity),
                ..style
            },
            state: ControllerState::Disabled,
            current: None,
            next: None,
            subscription: None,
            tick_in_progress: false,
            faults_tx,
            faults_rx,
            metrics: Metrics::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn style(&self) -> &LayerStyle {
        &self.style
    }

    pub fn is_time_dynamic(&self) -> bool {
        matches!(self.content, LayerContent::TimeDynamic(_))
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn subscription(&self) -> Option<SubscriptionToken> {
        self.subscription
    }

    pub fn current_interval(&self) -> Option<usize> {
        self.current.as_ref().and_then(LayerSlot::interval)
    }

    pub fn next_interval(&self) -> Option<usize> {
        self.next.as_ref().and_then(LayerSlot::interval)
    }

    pub fn current_source(&self) -> Option<&SourceToken> {
        self.current.as_ref().map(LayerSlot::source)
    }

    pub fn next_source(&self) -> Option<&SourceToken> {
        self.next.as_ref().map(LayerSlot::source)
    }

    pub fn current_layer(&self) -> Option<LayerId> {
        self.current.as_ref().and_then(LayerSlot::id)
    }

    pub fn next_layer(&self) -> Option<LayerId> {
        self.next.as_ref().and_then(LayerSlot::id)
    }

    /// Counters: `layers.created`, `layers.released`, `prefetch.created`,
    /// `prefetch.discarded`, `promotions`, `faults`, `ticks.reentrant`.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Create the item's layers. Time-dynamic items also start listening to
    /// the clock while shown.
    pub fn enable(&mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) {
        if self.state != ControllerState::Disabled {
            debug!(item = %self.name, "enable ignored: already enabled");
            return;
        }

        match self.content.clone() {
            LayerContent::Static(source) => {
                let mut slot = self.acquire(viewer, source, None, self.style.opacity, true);
                if self.style.shown {
                    slot.show(viewer);
                }
                self.current = Some(slot);
                self.state = ControllerState::Static;
            }
            LayerContent::TimeDynamic(index) => {
                let tick = clock.tick();
                let direction = tick.direction();
                match index.index_of_containing(tick.time) {
                    Ok(idx) => {
                        let source = index.get(idx).map(|iv| iv.data.clone());
                        if let Some(source) = source {
                            let mut slot =
                                self.acquire(viewer, source, Some(idx), self.style.opacity, true);
                            if self.style.shown {
                                slot.show(viewer);
                            }
                            self.current = Some(slot);
                        }
                        if let Some(p) = predicted_interval(idx, direction, index.len()) {
                            self.next = self.prefetch(viewer, &index, p);
                        }
                    }
                    Err(insertion) => {
                        // In a gap: nothing to show yet, preload what comes next.
                        if let Some(p) = upcoming_interval(insertion, direction, index.len()) {
                            self.next = self.prefetch(viewer, &index, p);
                        }
                    }
                }
                self.state = ControllerState::Dynamic;
                self.sync_subscription(clock);
                debug!(
                    item = %self.name,
                    current = ?self.current_interval(),
                    next = ?self.next_interval(),
                    "time-dynamic layer enabled"
                );
            }
        }
    }

    /// Release every layer and stop listening to the clock.
    pub fn disable(&mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) {
        if self.state == ControllerState::Disabled {
            return;
        }
        if let Some(slot) = self.current.take() {
            self.release(viewer, slot);
        }
        if let Some(slot) = self.next.take() {
            self.release(viewer, slot);
        }
        self.state = ControllerState::Disabled;
        self.sync_subscription(clock);
        debug!(item = %self.name, "layer disabled");
    }

    /// Handle one clock notification.
    ///
    /// Ignored unless the controller is dynamic, shown and subscribed. A tick
    /// that arrives while another is still being applied is dropped.
    pub fn on_tick(&mut self, tick: ClockTick, viewer: &mut dyn ViewerPort) {
        if self.tick_in_progress {
            warn!(item = %self.name, time = tick.time.0, "re-entrant clock tick ignored");
            self.metrics.inc("ticks.reentrant");
            return;
        }
        if self.state != ControllerState::Dynamic || !self.style.shown || self.subscription.is_none()
        {
            return;
        }
        let LayerContent::TimeDynamic(index) = &self.content else {
            return;
        };
        let index = Arc::clone(index);

        self.tick_in_progress = true;
        self.apply_tick(&index, tick, viewer);
        self.tick_in_progress = false;
    }

    fn apply_tick(
        &mut self,
        index: &IntervalIndex<SourceToken>,
        tick: ClockTick,
        viewer: &mut dyn ViewerPort,
    ) {
        debug_assert!(self.tick_in_progress);
        let direction = tick.direction();

        let still_current = self
            .current_interval()
            .and_then(|i| index.get(i))
            .is_some_and(|iv| iv.contains(tick.time));
        if still_current {
            if let Some(idx) = self.current_interval() {
                self.aim_prefetch(index, idx, direction, viewer);
            }
            return;
        }

        let idx = match index.index_of_containing(tick.time) {
            Ok(idx) => idx,
            Err(insertion) => {
                if let Some(slot) = self.current.take() {
                    debug!(item = %self.name, time = tick.time.0, "no interval covers time");
                    self.release(viewer, slot);
                }
                let wanted = upcoming_interval(insertion, direction, index.len());
                self.retarget_prefetch(index, wanted, viewer);
                return;
            }
        };

        // Stale prefetch: the clock jumped somewhere other than where we
        // predicted.
        if self.next_interval() != Some(idx) {
            if let Some(stale) = self.next.take() {
                self.discard_prefetch(viewer, stale);
            }
            self.next = self.prefetch(viewer, index, idx);
        }

        let Some(mut incoming) = self.next.take() else {
            return;
        };
        match self.current.take() {
            Some(mut outgoing) => {
                // Hide first so the two are never both fully opaque.
                outgoing.hide(viewer);
                incoming.promote(viewer, self.style.opacity);
                if viewer.capabilities().ordering {
                    incoming.place_adjacent_to(viewer, &outgoing);
                }
                self.release(viewer, outgoing);
            }
            None => incoming.promote(viewer, self.style.opacity),
        }
        self.current = Some(incoming);
        self.metrics.inc("promotions");
        debug!(item = %self.name, interval = idx, time = tick.time.0, "promoted prefetched layer");

        if let Some(p) = predicted_interval(idx, direction, index.len()) {
            self.next = self.prefetch(viewer, index, p);
        }
    }

    /// Keep `next` on the neighbour of `idx` in the direction of travel.
    fn aim_prefetch(
        &mut self,
        index: &IntervalIndex<SourceToken>,
        idx: usize,
        direction: PlaybackDirection,
        viewer: &mut dyn ViewerPort,
    ) {
        let wanted = predicted_interval(idx, direction, index.len());
        self.retarget_prefetch(index, wanted, viewer);
    }

    /// Replace `next` unless it already holds `wanted`.
    fn retarget_prefetch(
        &mut self,
        index: &IntervalIndex<SourceToken>,
        wanted: Option<usize>,
        viewer: &mut dyn ViewerPort,
    ) {
        if wanted == self.next_interval() {
            return;
        }
        if let Some(stale) = self.next.take() {
            self.discard_prefetch(viewer, stale);
        }
        if let Some(p) = wanted {
            self.next = self.prefetch(viewer, index, p);
        }
    }

    /// Applies to the visible layer only; `next` stays transparent until
    /// promoted.
    pub fn set_opacity(&mut self, opacity: f32, viewer: &mut dyn ViewerPort) {
        self.style.opacity = unit_interval_f32(opacity);
        if self.state == ControllerState::Disabled || !self.style.shown {
            return;
        }
        if let Some(slot) = self.current.as_mut() {
            slot.set_opacity(viewer, self.style.opacity);
        }
    }

    /// Show both layers and, for time-dynamic items, resume listening to the
    /// clock and catch up with any ticks missed while hidden.
    pub fn show(&mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) {
        self.style.shown = true;
        if self.state == ControllerState::Disabled {
            return;
        }
        if let Some(slot) = self.current.as_mut() {
            slot.set_opacity(viewer, self.style.opacity);
            slot.show(viewer);
        }
        if let Some(slot) = self.next.as_mut() {
            slot.show(viewer);
        }
        self.sync_subscription(clock);
        if self.state == ControllerState::Dynamic {
            self.on_tick(clock.tick(), viewer);
        }
    }

    /// Hide both layers without destroying them.
    pub fn hide(&mut self, clock: &mut Clock, viewer: &mut dyn ViewerPort) {
        self.style.shown = false;
        if self.state == ControllerState::Disabled {
            return;
        }
        if let Some(slot) = self.current.as_mut() {
            slot.hide(viewer);
        }
        if let Some(slot) = self.next.as_mut() {
            slot.hide(viewer);
        }
        self.sync_subscription(clock);
    }

    /// Apply renderer faults reported since the last call.
    ///
    /// The failing layer is hidden and the user notified; nothing is retried
    /// and other intervals keep playing. Faults for layers already released
    /// are dropped. Returns the number of faults acted on.
    pub fn process_faults(
        &mut self,
        viewer: &mut dyn ViewerPort,
        sink: &mut dyn NotificationSink,
    ) -> usize {
        let mut handled = 0;
        while let Ok(fault) = self.faults_rx.try_recv() {
            let slot = [self.current.as_mut(), self.next.as_mut()]
                .into_iter()
                .flatten()
                .find(|s| s.id() == Some(fault.layer));
            let Some(slot) = slot else {
                debug!(layer = %fault.layer, "fault for released layer ignored");
                continue;
            };
            if slot.is_failed() {
                continue;
            }
            warn!(
                item = %self.name,
                layer = %fault.layer,
                kind = ?fault.kind,
                "{}",
                fault.message
            );
            slot.mark_failed(viewer);
            let title = match fault.kind {
                FaultKind::Load => "Error loading imagery",
                FaultKind::Projection => "Imagery projection error",
            };
            let message = format!(
                "{}: imagery `{}` could not be displayed: {}",
                self.name,
                slot.source(),
                fault.message
            );
            sink.notify(Notification::new(title, message));
            self.metrics.inc("faults");
            handled += 1;
        }
        handled
    }

    /// The layer feature picking should target.
    ///
    /// `NotSupported` when the viewer cannot pick at all, or when the only
    /// layer is still preloading.
    pub fn pickable_layer(&self, viewer: &dyn ViewerPort) -> Result<Option<LayerId>, LayerError> {
        if !viewer.capabilities().picking {
            return Err(LayerError::NotSupported {
                capability: "feature picking",
                viewer: viewer.kind(),
            });
        }
        match (&self.current, &self.next) {
            (Some(cur), _) if cur.is_pickable() && !cur.is_failed() => Ok(cur.id()),
            (None, Some(_)) => Err(LayerError::NotSupported {
                capability: "picking from a preloading layer",
                viewer: viewer.kind(),
            }),
            _ => Ok(None),
        }
    }

    fn sync_subscription(&mut self, clock: &mut Clock) {
        let wanted = self.state == ControllerState::Dynamic && self.style.shown;
        match (wanted, self.subscription) {
            (true, None) => self.subscription = Some(clock.subscribe()),
            (false, Some(token)) => {
                clock.unsubscribe(token);
                self.subscription = None;
            }
            _ => {}
        }
    }

    fn acquire(
        &mut self,
        viewer: &mut dyn ViewerPort,
        source: SourceToken,
        interval: Option<usize>,
        opacity: f32,
        pickable: bool,
    ) -> LayerSlot {
        let request = LayerRequest {
            source,
            rectangle: self.style.rectangle,
            clip_to_rectangle: self.style.clip_to_rectangle,
            opacity,
            pickable,
            faults: FaultReporter::new(self.faults_tx.clone()),
        };
        self.metrics.inc("layers.created");
        LayerSlot::acquire(viewer, request, interval)
    }

    /// Transparent, unpickable, shown (when the item is) so tiles start
    /// loading now.
    fn prefetch(
        &mut self,
        viewer: &mut dyn ViewerPort,
        index: &IntervalIndex<SourceToken>,
        idx: usize,
    ) -> Option<LayerSlot> {
        let source = index.get(idx)?.data.clone();
        let mut slot = self.acquire(viewer, source, Some(idx), 0.0, false);
        if self.style.shown {
            slot.show(viewer);
        }
        self.metrics.inc("prefetch.created");
        Some(slot)
    }

    fn discard_prefetch(&mut self, viewer: &mut dyn ViewerPort, stale: LayerSlot) {
        debug!(item = %self.name, interval = ?stale.interval(), "discarding stale prefetch");
        self.metrics.inc("prefetch.discarded");
        self.release(viewer, stale);
    }

    fn release(&mut self, viewer: &mut dyn ViewerPort, slot: LayerSlot) {
        self.metrics.inc("layers.released");
        slot.release(viewer);
    }
}
