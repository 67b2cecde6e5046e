//! Error types for Framecut.

use thiserror::Error;

/// Main error type for Framecut operations.
///
/// Per-layer failures (`MediaNotFound`, `Decode*`) are recovered locally
/// by the compositor: the layer is skipped, the frame still renders.
/// `InvalidOutputDimensions` is fatal for a single composite call and is
/// never cached.
#[derive(Error, Debug)]
pub enum FramecutError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("media item not found: {0}")]
    MediaNotFound(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("decode timed out")]
    DecodeTimeout,

    #[error("decode request superseded by a newer seek")]
    DecodeSuperseded,

    #[error("invalid output dimensions: {width}x{height}")]
    InvalidOutputDimensions { width: u32, height: u32 },

    #[error("invalid element: {0}")]
    InvalidElement(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl FramecutError {
    /// Whether this failure is recoverable at the layer level (the
    /// compositor skips the layer instead of aborting the frame).
    pub fn is_layer_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MediaNotFound(_) | Self::Decode(_) | Self::DecodeTimeout | Self::DecodeSuperseded
        )
    }
}

/// Result type alias for Framecut operations.
pub type Result<T> = std::result::Result<T, FramecutError>;
