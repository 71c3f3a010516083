//! In-crate viewer double that records every call.

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, Sender};

use catalog::SourceToken;
use foundation::handles::HandleAllocator;

use crate::layer::{LayerHandle, LayerId};
use crate::viewer::{
    Capabilities, FaultKind, FaultReporter, LayerFault, LayerRequest, ViewerKind, ViewerPort,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Create { id: LayerId, source: String },
    Destroy(LayerId),
    Show(LayerId),
    Hide(LayerId),
    Opacity(LayerId, f32),
    Pickable(LayerId, bool),
    Reorder { layer: LayerId, anchor: LayerId },
}

#[derive(Debug)]
struct RecordedLayer {
    source: SourceToken,
    visible: bool,
    opacity: f32,
    pickable: bool,
    faults: FaultReporter,
}

#[derive(Debug)]
pub struct RecordingViewer {
    handles: HandleAllocator,
    layers: BTreeMap<LayerId, RecordedLayer>,
    ops: Vec<Op>,
    created: usize,
    destroyed: usize,
    max_opaque_visible: usize,
    capabilities: Capabilities,
    tx: Sender<LayerFault>,
    _rx: Receiver<LayerFault>,
}

impl RecordingViewer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            handles: HandleAllocator::new(),
            layers: BTreeMap::new(),
            ops: Vec::new(),
            created: 0,
            destroyed: 0,
            max_opaque_visible: 0,
            capabilities: Capabilities {
                ordering: true,
                picking: true,
            },
            tx,
            _rx: rx,
        }
    }

    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            ..Self::new()
        }
    }

    /// A standalone request whose faults go nowhere.
    pub fn request(&self, source: &str, opacity: f32, pickable: bool) -> LayerRequest {
        LayerRequest {
            source: source.into(),
            rectangle: None,
            clip_to_rectangle: true,
            opacity,
            pickable,
            faults: FaultReporter::new(self.tx.clone()),
        }
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    pub fn created(&self) -> usize {
        self.created
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed
    }

    pub fn live(&self) -> usize {
        self.layers.len()
    }

    pub fn max_opaque_visible(&self) -> usize {
        self.max_opaque_visible
    }

    pub fn opacity_of(&self, id: LayerId) -> Option<f32> {
        self.layers.get(&id).map(|l| l.opacity)
    }

    pub fn is_visible(&self, id: LayerId) -> bool {
        self.layers.get(&id).is_some_and(|l| l.visible)
    }

    pub fn is_pickable(&self, id: LayerId) -> bool {
        self.layers.get(&id).is_some_and(|l| l.pickable)
    }

    /// Sources of layers that are shown and not fully transparent.
    pub fn opaque_sources(&self) -> Vec<String> {
        self.layers
            .values()
            .filter(|l| l.visible && l.opacity > 0.0)
            .map(|l| l.source.to_string())
            .collect()
    }

    pub fn fail(&self, id: LayerId, kind: FaultKind, message: &str) {
        if let Some(layer) = self.layers.get(&id) {
            layer.faults.report(id, kind, message);
        }
    }

    fn record(&mut self, op: Op) {
        self.ops.push(op);
        let opaque = self
            .layers
            .values()
            .filter(|l| l.visible && l.opacity > 0.0)
            .count();
        self.max_opaque_visible = self.max_opaque_visible.max(opaque);
    }
}

impl ViewerPort for RecordingViewer {
    fn kind(&self) -> ViewerKind {
        ViewerKind::Globe
    }

    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn create_layer(&mut self, request: LayerRequest) -> LayerHandle {
        let id = LayerId(self.handles.alloc());
        self.created += 1;
        let source = request.source.to_string();
        self.layers.insert(
            id,
            RecordedLayer {
                source: request.source,
                visible: false,
                opacity: request.opacity,
                pickable: request.pickable,
                faults: request.faults,
            },
        );
        self.record(Op::Create { id, source });
        LayerHandle::new(id)
    }

    fn destroy_layer(&mut self, handle: LayerHandle) {
        let id = handle.id();
        self.destroyed += 1;
        if self.layers.remove(&id).is_some() {
            self.handles.free(id.0);
        }
        self.record(Op::Destroy(id));
    }

    fn show_layer(&mut self, handle: &LayerHandle) {
        if let Some(l) = self.layers.get_mut(&handle.id()) {
            l.visible = true;
        }
        self.record(Op::Show(handle.id()));
    }

    fn hide_layer(&mut self, handle: &LayerHandle) {
        if let Some(l) = self.layers.get_mut(&handle.id()) {
            l.visible = false;
        }
        self.record(Op::Hide(handle.id()));
    }

    fn set_opacity(&mut self, handle: &LayerHandle, opacity: f32) {
        if let Some(l) = self.layers.get_mut(&handle.id()) {
            l.opacity = opacity;
        }
        self.record(Op::Opacity(handle.id(), opacity));
    }

    fn set_pickable(&mut self, handle: &LayerHandle, pickable: bool) {
        if let Some(l) = self.layers.get_mut(&handle.id()) {
            l.pickable = pickable;
        }
        self.record(Op::Pickable(handle.id(), pickable));
    }

    fn reorder_to_be_adjacent(&mut self, handle: &LayerHandle, anchor: &LayerHandle) {
        self.record(Op::Reorder {
            layer: handle.id(),
            anchor: anchor.id(),
        });
    }
}
