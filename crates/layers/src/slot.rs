use catalog::SourceToken;
use tracing::{debug, error};

use crate::layer::{LayerHandle, LayerId};
use crate::viewer::{LayerRequest, ViewerPort};

/// One renderer layer owned by a controller, plus what the controller needs
/// to know about it.
///
/// A slot is acquired with exactly one `create_layer` and must be handed back
/// through [`LayerSlot::release`], which consumes it and issues exactly one
/// `destroy_layer`. Dropping an unreleased slot leaks the renderer layer and
/// is logged as an error.
#[derive(Debug)]
pub struct LayerSlot {
    handle: Option<LayerHandle>,
    interval: Option<usize>,
    source: SourceToken,
    pickable: bool,
    opacity: f32,
    shown: bool,
    failed: bool,
}

impl LayerSlot {
    /// `interval` is the position in the item's interval index, `None` for a
    /// static layer.
    pub fn acquire(
        viewer: &mut dyn ViewerPort,
        request: LayerRequest,
        interval: Option<usize>,
    ) -> Self {
        let source = request.source.clone();
        let pickable = request.pickable;
        let opacity = request.opacity;
        let handle = viewer.create_layer(request);
        debug!(layer = %handle.id(), ?interval, %source, opacity, "layer created");
        Self {
            handle: Some(handle),
            interval,
            source,
            pickable,
            opacity,
            shown: false,
            failed: false,
        }
    }

    pub fn id(&self) -> Option<LayerId> {
        self.handle.as_ref().map(LayerHandle::id)
    }

    pub fn interval(&self) -> Option<usize> {
        self.interval
    }

    pub fn source(&self) -> &SourceToken {
        &self.source
    }

    pub fn is_pickable(&self) -> bool {
        self.pickable
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn is_failed(&self) -> bool {
        self.failed
    }

    /// Failed layers stay hidden.
    pub fn show(&mut self, viewer: &mut dyn ViewerPort) {
        if self.failed {
            return;
        }
        if let Some(h) = &self.handle {
            viewer.show_layer(h);
            self.shown = true;
        }
    }

    pub fn hide(&mut self, viewer: &mut dyn ViewerPort) {
        if let Some(h) = &self.handle {
            viewer.hide_layer(h);
            self.shown = false;
        }
    }

    pub fn set_opacity(&mut self, viewer: &mut dyn ViewerPort, opacity: f32) {
        if let Some(h) = &self.handle {
            viewer.set_opacity(h, opacity);
            self.opacity = opacity;
        }
    }

    pub fn set_pickable(&mut self, viewer: &mut dyn ViewerPort, pickable: bool) {
        if let Some(h) = &self.handle {
            viewer.set_pickable(h, pickable);
            self.pickable = pickable;
        }
    }

    /// Turn a prefetched slot into the visible one.
    pub fn promote(&mut self, viewer: &mut dyn ViewerPort, opacity: f32) {
        self.set_opacity(viewer, opacity);
        self.set_pickable(viewer, true);
    }

    pub fn place_adjacent_to(&self, viewer: &mut dyn ViewerPort, anchor: &LayerSlot) {
        if let (Some(h), Some(a)) = (&self.handle, &anchor.handle) {
            viewer.reorder_to_be_adjacent(h, a);
        }
    }

    pub fn mark_failed(&mut self, viewer: &mut dyn ViewerPort) {
        self.hide(viewer);
        self.set_pickable(viewer, false);
        self.failed = true;
    }

    pub fn release(mut self, viewer: &mut dyn ViewerPort) {
        if let Some(h) = self.handle.take() {
            let id = h.id();
            viewer.destroy_layer(h);
            debug!(layer = %id, interval = ?self.interval, "layer released");
        }
    }
}

impl Drop for LayerSlot {
    fn drop(&mut self) {
        if let Some(h) = &self.handle {
            error!(layer = %h.id(), interval = ?self.interval, "layer slot dropped without release; renderer layer leaked");
        }
    }
}
