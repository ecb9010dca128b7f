use thiserror::Error;

/// Errors surfaced by scene import and viewer setup.
///
/// Runtime interaction (picking, toggling, theme changes) never fails; only
/// the loading edges do.
#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("mount element #{0} not found")]
    MissingMount(String),

    #[error("glTF parse error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("buffer {index} references `{uri}` which was not provided")]
    MissingBuffer { index: usize, uri: String },

    #[error("buffer {index} holds {actual} bytes, expected at least {expected}")]
    BufferTooShort { index: usize, expected: usize, actual: usize },

    #[error("mesh `{mesh}` primitive {primitive} has no POSITION attribute")]
    MissingPositions { mesh: String, primitive: usize },

    #[error("scene contains no triangle meshes")]
    EmptyScene,

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, ViewerError>;
