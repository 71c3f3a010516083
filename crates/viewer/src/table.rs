//! Layer bookkeeping shared by the in-memory viewer backends.

use std::collections::BTreeMap;

use catalog::SourceToken;
use foundation::bounds::Rectangle;
use foundation::handles::HandleAllocator;
use layers::{FaultKind, FaultReporter, LayerHandle, LayerId, LayerRequest};
use runtime::metrics::Metrics;
use tracing::{debug, trace};

/// What a backend knows about one of its layers.
#[derive(Debug, Clone)]
pub struct LayerRecord {
    pub source: SourceToken,
    pub rectangle: Option<Rectangle>,
    pub clip_to_rectangle: bool,
    pub opacity: f32,
    pub pickable: bool,
    pub visible: bool,
    faults: FaultReporter,
}

impl LayerRecord {
    /// Visible and not fully transparent.
    pub fn is_opaque(&self) -> bool {
        self.visible && self.opacity > 0.0
    }
}

#[derive(Debug, Default)]
pub struct LayerTable {
    handles: HandleAllocator,
    layers: BTreeMap<LayerId, LayerRecord>,
    metrics: Metrics,
}

impl LayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, request: LayerRequest) -> LayerHandle {
        let id = LayerId(self.handles.alloc());
        trace!(layer = %id, source = %request.source, "layer added");
        self.layers.insert(
            id,
            LayerRecord {
                source: request.source,
                rectangle: request.rectangle,
                clip_to_rectangle: request.clip_to_rectangle,
                opacity: request.opacity,
                pickable: request.pickable,
                visible: false,
                faults: request.faults,
            },
        );
        self.metrics.inc("layers.created");
        self.metrics.set_gauge("layers.live", self.layers.len() as i64);
        LayerHandle::new(id)
    }

    /// Unknown or stale ids return `None` and change nothing.
    pub fn remove(&mut self, id: LayerId) -> Option<LayerRecord> {
        if !self.handles.free(id.0) {
            debug!(layer = %id, "destroy of unknown layer ignored");
            return None;
        }
        let record = self.layers.remove(&id);
        self.metrics.inc("layers.destroyed");
        self.metrics.set_gauge("layers.live", self.layers.len() as i64);
        record
    }

    pub fn get(&self, id: LayerId) -> Option<&LayerRecord> {
        self.layers.get(&id)
    }

    pub fn get_mut(&mut self, id: LayerId) -> Option<&mut LayerRecord> {
        self.layers.get_mut(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = LayerId> + '_ {
        self.layers.keys().copied()
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Report a failure through the layer's own fault channel, as a tile
    /// fetch or reprojection would. Returns `false` if the layer is gone.
    pub fn inject_fault(&self, id: LayerId, kind: FaultKind, message: &str) -> bool {
        match self.layers.get(&id) {
            Some(record) => {
                record.faults.report(id, kind, message);
                true
            }
            None => false,
        }
    }
}
