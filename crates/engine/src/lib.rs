// Library crate: the geometry engine. Front ends (viewer, image service, the
// export binary in main.rs) only call `build::render` / `SceneBuilder` and
// consume the returned `SceneGraph`.

pub mod build;
pub mod error;
pub mod export;
pub mod fixtures;
pub mod mesh;
pub mod scene;
pub mod units;
pub mod validation;

pub use build::{render, BuildOptions, CsgMode, SceneBuilder};
pub use error::{RenderError, RenderResult, Warning};
pub use scene::{FloorGroup, NodeKind, SceneGraph, SceneNode};
