//! The boundary between layer controllers and a concrete rendering engine.
//!
//! Controllers are written once against [`ViewerPort`]; each engine (3D globe,
//! 2D tile map) supplies its own implementation. All calls are synchronous
//! from the caller's side, but layer content loads later and failures come
//! back through the [`FaultReporter`] handed over at creation.

use std::sync::mpsc::Sender;

use catalog::SourceToken;
use foundation::bounds::Rectangle;

use crate::layer::{LayerHandle, LayerId};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewerKind {
    Globe,
    TileMap,
}

impl std::fmt::Display for ViewerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewerKind::Globe => write!(f, "3D globe"),
            ViewerKind::TileMap => write!(f, "2D map"),
        }
    }
}

/// Optional behaviour a viewer may decline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Capabilities {
    /// Layers have an explicit draw order that `reorder_to_be_adjacent` honours.
    pub ordering: bool,
    /// Features can be picked from layers.
    pub picking: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FaultKind {
    Load,
    Projection,
}

/// A renderer-level failure for one layer, delivered after the fact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerFault {
    pub layer: LayerId,
    pub kind: FaultKind,
    pub message: String,
}

/// Channel a viewer uses to report asynchronous load/projection failures.
///
/// Reporting after the receiving controller is gone is a silent no-op, which
/// makes destroying a layer with loads still in flight safe.
#[derive(Debug, Clone)]
pub struct FaultReporter {
    tx: Sender<LayerFault>,
}

impl FaultReporter {
    pub fn new(tx: Sender<LayerFault>) -> Self {
        Self { tx }
    }

    pub fn report(&self, layer: LayerId, kind: FaultKind, message: impl Into<String>) {
        let _ = self.tx.send(LayerFault {
            layer,
            kind,
            message: message.into(),
        });
    }

    pub fn load_error(&self, layer: LayerId, message: impl Into<String>) {
        self.report(layer, FaultKind::Load, message);
    }

    pub fn projection_error(&self, layer: LayerId, message: impl Into<String>) {
        self.report(layer, FaultKind::Projection, message);
    }
}

/// Everything a viewer needs to create one imagery layer.
#[derive(Debug, Clone)]
pub struct LayerRequest {
    pub source: SourceToken,
    pub rectangle: Option<Rectangle>,
    pub clip_to_rectangle: bool,
    pub opacity: f32,
    pub pickable: bool,
    pub faults: FaultReporter,
}

pub trait ViewerPort {
    fn kind(&self) -> ViewerKind;

    fn capabilities(&self) -> Capabilities;

    /// Add a layer (initially hidden) and return its ownership token.
    fn create_layer(&mut self, request: LayerRequest) -> LayerHandle;

    /// Remove the layer and free its resources. Unknown or already destroyed
    /// layers are ignored.
    fn destroy_layer(&mut self, handle: LayerHandle);

    fn show_layer(&mut self, handle: &LayerHandle);

    fn hide_layer(&mut self, handle: &LayerHandle);

    fn set_opacity(&mut self, handle: &LayerHandle, opacity: f32);

    /// Allow or forbid feature picking on the layer.
    fn set_pickable(&mut self, handle: &LayerHandle, pickable: bool);

    /// Move `handle` so it draws directly above `anchor`. Best effort: viewers
    /// without explicit ordering may ignore it.
    fn reorder_to_be_adjacent(&mut self, handle: &LayerHandle, anchor: &LayerHandle);
}
