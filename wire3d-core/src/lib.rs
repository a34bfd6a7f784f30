/// Wire3D Core Library - mesh loading, transform pipeline and wireframe rasterizer
///
/// This library turns a plain-text polygon mesh into a wireframe image: it
/// parses the mesh, projects it through an orbit camera and draws the face
/// edges into a pixel buffer in parallel.

pub mod camera;
pub mod error;
pub mod mesh;
pub mod obj;
pub mod raster;
pub mod scene;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use camera::Camera;
pub use error::{Error, Result};
pub use mesh::{Face, FaceIndex, Mesh};
pub use raster::{Color, PixelBuffer, WireframeRasterizer};
pub use scene::Scene;
pub use transform::{RotationState, Transform};
pub use viewer::{DragButton, PanDirection, Viewer, ViewerConfig};
