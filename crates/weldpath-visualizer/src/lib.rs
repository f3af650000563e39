//! # Weldpath Visualizer
//!
//! Boundary between coordinate tables and an external renderer.
//!
//! The renderer itself lives outside this workspace. This crate turns a
//! [`CoordinateTable`](weldpath_core::CoordinateTable) into a deterministic
//! sequence of frames and drives any [`FrameSink`] with it, at a target
//! frame rate and quality. Coordinate data is only ever read.

pub mod frames;

pub use frames::{
    frame_plan, play, Frame, FrameEvent, FrameSink, FrameRecorder, PlaybackSummary, RenderQuality,
    RenderSettings, TextFrameSink, VisualizerError,
};
