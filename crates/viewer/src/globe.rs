//! In-memory stand-in for the 3D globe engine.
//!
//! The globe keeps an explicit bottom-to-top draw order, so
//! `reorder_to_be_adjacent` is honoured exactly.

use layers::{
    Capabilities, FaultKind, LayerHandle, LayerId, LayerRequest, ViewerKind, ViewerPort,
};
use runtime::metrics::Metrics;
use tracing::debug;

use crate::table::{LayerRecord, LayerTable};

#[derive(Debug, Default)]
pub struct GlobeViewer {
    table: LayerTable,
    /// Bottom to top.
    draw_order: Vec<LayerId>,
}

impl GlobeViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerRecord> {
        self.table.get(id)
    }

    /// Live layers in draw order, bottom first.
    pub fn live_layers(&self) -> &[LayerId] {
        &self.draw_order
    }

    /// Layers that would contribute pixels, bottom first.
    pub fn visible_layers(&self) -> Vec<LayerId> {
        self.draw_order
            .iter()
            .copied()
            .filter(|id| self.table.get(*id).is_some_and(LayerRecord::is_opaque))
            .collect()
    }

    pub fn metrics(&self) -> &Metrics {
        self.table.metrics()
    }

    pub fn inject_fault(&self, id: LayerId, kind: FaultKind, message: &str) -> bool {
        self.table.inject_fault(id, kind, message)
    }

    fn position(&self, id: LayerId) -> Option<usize> {
        self.draw_order.iter().position(|l| *l == id)
    }
}

impl ViewerPort for GlobeViewer {
    fn kind(&self) -> ViewerKind {
        ViewerKind::Globe
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            ordering: true,
            picking: true,
        }
    }

    fn create_layer(&mut self, request: LayerRequest) -> LayerHandle {
        let handle = self.table.insert(request);
        self.draw_order.push(handle.id());
        handle
    }

    fn destroy_layer(&mut self, handle: LayerHandle) {
        let id = handle.id();
        if self.table.remove(id).is_some()
            && let Some(pos) = self.position(id)
        {
            self.draw_order.remove(pos);
        }
    }

    fn show_layer(&mut self, handle: &LayerHandle) {
        if let Some(record) = self.table.get_mut(handle.id()) {
            record.visible = true;
        }
    }

    fn hide_layer(&mut self, handle: &LayerHandle) {
        if let Some(record) = self.table.get_mut(handle.id()) {
            record.visible = false;
        }
    }

    fn set_opacity(&mut self, handle: &LayerHandle, opacity: f32) {
        if let Some(record) = self.table.get_mut(handle.id()) {
            record.opacity = opacity;
        }
    }

    fn set_pickable(&mut self, handle: &LayerHandle, pickable: bool) {
        if let Some(record) = self.table.get_mut(handle.id()) {
            record.pickable = pickable;
        }
    }

    fn reorder_to_be_adjacent(&mut self, handle: &LayerHandle, anchor: &LayerHandle) {
        let (id, anchor_id) = (handle.id(), anchor.id());
        if id == anchor_id {
            return;
        }
        let Some(from) = self.position(id) else {
            return;
        };
        self.draw_order.remove(from);
        match self.position(anchor_id) {
            Some(at) => self.draw_order.insert(at + 1, id),
            None => {
                debug!(layer = %id, anchor = %anchor_id, "reorder anchor not on globe");
                self.draw_order.insert(from, id);
            }
        }
    }
}
