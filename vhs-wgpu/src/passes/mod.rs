//! Render pass implementations for the VHS pipeline.

pub mod postprocess;
