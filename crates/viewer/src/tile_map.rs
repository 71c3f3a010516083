//! In-memory stand-in for the 2D tile-map engine.
//!
//! The map has no user-controlled z-order: layers draw in the order they were
//! put on the map, and hiding a layer takes it off the map entirely.

use std::collections::BTreeSet;

use layers::{
    Capabilities, FaultKind, LayerHandle, LayerId, LayerRequest, ViewerKind, ViewerPort,
};
use runtime::metrics::Metrics;
use tracing::trace;

use crate::table::{LayerRecord, LayerTable};

#[derive(Debug, Default)]
pub struct TileMapViewer {
    table: LayerTable,
    on_map: BTreeSet<LayerId>,
}

impl TileMapViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, id: LayerId) -> Option<&LayerRecord> {
        self.table.get(id)
    }

    pub fn live_layers(&self) -> Vec<LayerId> {
        self.table.ids().collect()
    }

    pub fn visible_layers(&self) -> Vec<LayerId> {
        self.on_map
            .iter()
            .copied()
            .filter(|id| self.table.get(*id).is_some_and(|r| r.opacity > 0.0))
            .collect()
    }

    pub fn is_on_map(&self, id: LayerId) -> bool {
        self.on_map.contains(&id)
    }

    pub fn metrics(&self) -> &Metrics {
        self.table.metrics()
    }

    pub fn inject_fault(&self, id: LayerId, kind: FaultKind, message: &str) -> bool {
        self.table.inject_fault(id, kind, message)
    }
}

impl ViewerPort for TileMapViewer {
    fn kind(&self) -> ViewerKind {
        ViewerKind::TileMap
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            ordering: false,
            picking: true,
        }
    }

    fn create_layer(&mut self, request: LayerRequest) -> LayerHandle {
        self.table.insert(request)
    }

    fn destroy_layer(&mut self, handle: LayerHandle) {
        let id = handle.id();
        if self.table.remove(id).is_some() {
            self.on_map.remove(&id);
        }
    }

    fn show_layer(&mut self, handle: &LayerHandle) {
        let id = handle.id();
        if let Some(record) = self.table.get_mut(id) {
            record.visible = true;
            self.on_map.insert(id);
        }
    }

    fn hide_layer(&mut self, handle: &LayerHandle) {
        let id = handle.id();
        if let Some(record) = self.table.get_mut(id) {
            record.visible = false;
            self.on_map.remove(&id);
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
        trace!(layer = %handle.id(), anchor = %anchor.id(), "tile map has no z-order; reorder ignored");
    }
}
