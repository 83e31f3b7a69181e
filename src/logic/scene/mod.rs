//! 3D scene: camera, ray casting, terrain and the pointer surface.

pub mod camera;
pub mod color;
pub mod raycast;
pub mod surface;
pub mod terrain;

pub use camera::{OrbitCamera, OrbitLimits};
pub use color::Rgb;
pub use surface::{render_frame, Frame, PointerEvent, PointerTarget, SceneSurface, Viewport, WorldPoint};
pub use terrain::{Block, Terrain};
