//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the batch and the view; they never mutate either.
//! - The view transform is rotate-then-translate: `R_y(yaw) · R_axis(-pitch) · T(-position)`.
//!
//! Backends (wgpu, text) implement [`Renderer`]; the camera model lives here
//! so it can be driven and tested without a GPU.

mod camera;
mod renderer;

pub use camera::{CameraConfig, CameraModel};
pub use renderer::{DebugTextRenderer, RenderView, Renderer};
