//! Offline drivers behind the `atlas` binary: configuration summaries and a
//! headless playback simulation.

use catalog::{ConfigurationError, ImageryItemConfig};
use foundation::time::{Time, TimeSpan};
use layers::{ImageryLayerItem, LayerError, ViewerPort};
use runtime::clock::Clock;
use runtime::notifications::{Notification, NotificationBus};
use serde::Serialize;
use tracing::info;

pub fn format_time(t: Time) -> String {
    t.to_iso8601().unwrap_or_else(|| format!("{}s", t.0))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigSummary {
    pub name: String,
    pub time_dynamic: bool,
    pub intervals: usize,
    pub start: Option<String>,
    pub stop: Option<String>,
    pub gaps: usize,
}

/// Validate an item and describe its time coverage.
pub fn check(config: &ImageryItemConfig) -> Result<ConfigSummary, ConfigurationError> {
    // Validate the policy even for static items; a typo should not wait
    // until the item gains intervals.
    config.initial_time_source()?;
    let index = config.interval_index()?;
    let bounds = index.as_ref().and_then(|i| i.bounds());
    let gaps = index.as_ref().map_or(0, |index| {
        index
            .iter()
            .zip(index.iter().skip(1))
            .filter(|(a, b)| a.span.stop < b.span.start)
            .count()
    });
    Ok(ConfigSummary {
        name: config.name.clone(),
        time_dynamic: index.is_some(),
        intervals: index.as_ref().map_or(0, |i| i.len()),
        start: bounds.map(|b| format_time(b.start)),
        stop: bounds.map(|b| format_time(b.stop)),
        gaps,
    })
}

/// Where playback would begin, `None` for static items.
pub fn initial_time(config: &ImageryItemConfig, now: Time) -> Result<Option<Time>, LayerError> {
    Ok(ImageryLayerItem::from_config(config, now)?.initial_time())
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SimulationOptions {
    /// Wall seconds between ticks.
    pub step_s: f64,
    pub ticks: u32,
    pub multiplier: f64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            step_s: 1.0,
            ticks: 10,
            multiplier: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickRecord {
    pub time: String,
    pub current: Option<String>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub item: String,
    pub viewer: String,
    pub span: Option<(String, String)>,
    pub ticks: Vec<TickRecord>,
    pub layers_created: u64,
    pub layers_released: u64,
    pub promotions: u64,
    pub prefetch_discarded: u64,
    pub notifications: Vec<String>,
    /// Every controller counter, sorted by name.
    pub counters: Vec<(&'static str, u64)>,
}

/// Enable the item, run the clock for `options.ticks` steps and disable it
/// again. Faults the viewer reports are applied after every tick.
pub fn simulate(
    config: &ImageryItemConfig,
    viewer: &mut dyn ViewerPort,
    now: Time,
    options: SimulationOptions,
) -> Result<SimulationReport, LayerError> {
    let mut item = ImageryLayerItem::from_config(config, now)?;
    let mut clock = Clock::new(now, options.multiplier);
    let mut bus = NotificationBus::new();
    let mut ticks = Vec::with_capacity(options.ticks as usize + 1);

    item.enable(&mut clock, viewer);
    ticks.push(record(&item, clock.current_time()));

    for _ in 0..options.ticks {
        let tick = clock.advance(options.step_s);
        item.on_clock_tick(&clock, tick, viewer);
        item.process_faults(viewer, &mut bus);
        let rec = record(&item, tick.time);
        info!(
            time = %rec.time,
            current = rec.current.as_deref().unwrap_or("-"),
            next = rec.next.as_deref().unwrap_or("-"),
            "tick"
        );
        ticks.push(rec);
    }

    let name = item.name().to_string();
    let span = item
        .time_bounds()
        .map(|TimeSpan { start, stop }| (format_time(start), format_time(stop)));
    let metrics = item.remove(&mut clock, viewer);

    Ok(SimulationReport {
        item: name,
        viewer: viewer.kind().to_string(),
        span,
        ticks,
        layers_created: metrics.counter("layers.created"),
        layers_released: metrics.counter("layers.released"),
        promotions: metrics.counter("promotions"),
        prefetch_discarded: metrics.counter("prefetch.discarded"),
        notifications: bus
            .drain()
            .into_iter()
            .map(|Notification { title, message }| format!("{title}: {message}"))
            .collect(),
        counters: metrics.snapshot().counters,
    })
}

fn record(item: &ImageryLayerItem, time: Time) -> TickRecord {
    TickRecord {
        time: format_time(time),
        current: item.current_source().map(ToString::to_string),
        next: item.next_source().map(ToString::to_string),
    }
}
