//! Framecut Media - media resolution and frame decoding
//!
//! This crate handles:
//! - The media library: metadata lookup and source resolution
//! - Decoder sessions: one seekable decode pipeline per video source
//! - Decode backends: FFmpeg via ffmpeg-sidecar, plus a synthetic
//!   test-pattern backend for environments without FFmpeg

pub mod decode;
pub mod library;
pub mod session;

pub use decode::{DecodeBackend, FfmpegBackend, TestPatternBackend};
pub use library::{MediaItem, MediaKind, MediaLibrary, SourceHandle};
pub use session::DecoderSession;
