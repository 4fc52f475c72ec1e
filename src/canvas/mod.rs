// 画布模块
//
// 静态渲染表面与交互控制器：
// - [`StaticCanvas`]: 对象列表、z 序、整场合成、批量序列化
// - [`Canvas`]: 指针事件状态机、命中测试、变换会话、多选编组

pub mod free_draw;
pub mod interactive;
pub mod static_canvas;

pub use interactive::{Canvas, InteractionState, TransformAction, TransformSession};
pub use static_canvas::{CanvasImage, ClipFn, StaticCanvas};
