use foundation::handles::Handle;

/// Renderer-assigned identity of one layer. Cheap to copy and compare; used
/// to match asynchronous fault reports against live slots.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub Handle);

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer#{}.{}", self.0.index(), self.0.generation())
    }
}

/// Ownership token for one renderer layer.
///
/// Not `Clone`: `ViewerPort::destroy_layer` consumes it, so whoever holds the
/// handle is the only party able to release the layer, and only once.
#[derive(Debug, PartialEq, Eq)]
pub struct LayerHandle {
    id: LayerId,
}

impl LayerHandle {
    /// Only viewer implementations should mint handles.
    pub fn new(id: LayerId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerHandle, LayerId};
    use foundation::handles::Handle;

    #[test]
    fn display_includes_generation() {
        let id = LayerId(Handle::new(3, 1));
        assert_eq!(id.to_string(), "layer#3.1");
        assert_eq!(LayerHandle::new(id).id(), id);
    }
}
