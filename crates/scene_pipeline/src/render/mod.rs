//! # Rendering Interfaces
//!
//! Everything the scene needs to decide what gets drawn, without drawing it.
//!
//! ## Architecture
//!
//! - **Camera**: lazily derived matrices, frustum, picking rays and orbit mode
//! - **Render passes**: `RenderPass`, the per-walk `RenderParam` and the
//!   `Renderable` capability objects implement for GPU submission
//! - **Input**: the normalised `InputInjector` the orbit camera consumes
//!
//! GPU submission and material binding live behind [`Renderable`]; this
//! crate only decides who is called and in which order.

pub mod camera;
pub mod input;
pub mod pass;

pub use camera::{Camera, CameraId, CameraObserver, MatrixKind, OrbitController, OrbitParams};
pub use input::{InputInjector, InputState, ModifierKey};
pub use pass::{RenderParam, RenderParamOut, RenderPass, Renderable};
