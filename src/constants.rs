use crate::color::Color;

// 变换与手柄几何
/// 缩放下限，低于该值静默收紧（保持可见可操作）
pub const MIN_SCALE_LIMIT: f64 = 0.1;
/// 旋转手柄沿旋转后上向量偏移的像素距离
pub const ROTATE_HANDLE_OFFSET: f64 = 40.0;
/// 控制手柄命中四边形边长
pub const CORNER_SIZE: f64 = 12.0;
/// 拖拽阈值：移动超过该距离才算拖拽
pub const DRAG_THRESHOLD: f64 = 2.0;
/// 角度吸附步长（straighten 用）
pub const STRAIGHTEN_STEP_DEGREES: f64 = 90.0;

// 选择框与边框颜色
pub const COLOR_SELECTION_FILL: Color = Color {
    r: 100,
    g: 100,
    b: 255,
    a: 0.3,
};
pub const COLOR_SELECTION_BORDER: Color = Color {
    r: 51,
    g: 51,
    b: 51,
    a: 1.0,
};
pub const COLOR_OBJECT_BORDER: Color = Color {
    r: 0,
    g: 120,
    b: 215,
    a: 1.0,
};
pub const COLOR_CORNER_FILL: Color = Color {
    r: 255,
    g: 255,
    b: 255,
    a: 1.0,
};
pub const COLOR_CORNER_BORDER: Color = Color {
    r: 0,
    g: 120,
    b: 215,
    a: 1.0,
};

// 对象默认值
pub const DEFAULT_FILL: Color = Color {
    r: 0,
    g: 0,
    b: 0,
    a: 1.0,
};
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;
pub const DEFAULT_OPACITY: f64 = 1.0;
pub const DEFAULT_FONT_SIZE: f64 = 20.0;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";
pub const DEFAULT_LINE_HEIGHT: f64 = 1.16;

// 自由绘制
pub const DEFAULT_FREE_DRAW_WIDTH: f64 = 2.0;
pub const DEFAULT_FREE_DRAW_COLOR: Color = Color {
    r: 0,
    g: 0,
    b: 0,
    a: 1.0,
};

// 选择框边框虚线样式
pub const SELECTION_DASH: [f64; 2] = [6.0, 3.0];

// 序列化
/// 线格式数值保留的小数位
pub const WIRE_DECIMALS: i32 = 2;
