// 场景画布引擎的模块声明
pub mod canvas;
pub mod color;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod message;
pub mod object;
pub mod render;

// 重新导出主要类型
pub use canvas::{Canvas, StaticCanvas};
pub use color::Color;
pub use config::CanvasConfig;
pub use error::CanvasError;
pub use geometry::{Intersection, Point};
pub use message::{CanvasEvent, Command, Layer};
pub use object::{SceneObject, Shape};
pub use render::{CursorStyle, RenderContext, SkiaContext};
