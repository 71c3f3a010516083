use catalog::ConfigurationError;

use crate::viewer::ViewerKind;

#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// The active viewer, or the layer a request targets, cannot do this.
    /// Fatal to the request only.
    #[error("{capability} is not supported by the {viewer}")]
    NotSupported {
        capability: &'static str,
        viewer: ViewerKind,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
