// 场景对象模型
//
// 包含对象基础状态、形状变体和派生的角点缓存。
//
// 设计要点：
// - 共享的变换状态放在 [`SceneObject`] 上，按形状区分的数据放在
//   [`Shape`] 枚举里，反序列化按 type 标签直接分发；
// - `angle`（度）与 `theta`(弧度) 始终同步，只能通过 set_angle /
//   set_theta 修改；
// - 角点缓存仅在 `set_coords()` 之后有效，任何位置/缩放/旋转/尺寸
//   修改都会使其失效，命中测试前必须重算。

pub mod corners;
pub mod group;
pub mod serde_repr;
pub mod shapes;
pub mod text;

pub use corners::{ControlPoint, Corner, CornerCoords};
pub use shapes::{PathCommand, Shape};
pub use text::{BoxTextEngine, TextEngine, TextMetrics, TextStyle};

use crate::color::Color;
use crate::constants::{
    DEFAULT_FILL, DEFAULT_OPACITY, DEFAULT_STROKE_WIDTH, MIN_SCALE_LIMIT,
    STRAIGHTEN_STEP_DEGREES,
};
use crate::error::ObjectError;
use crate::render::RenderContext;

/// 状态快照中的属性值
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Float(f64),
    Bool(bool),
    Color(Option<Color>),
    Str(String),
}

/// 参与脏检查的属性列表（名称 + 访问器，见 get_prop/set_prop）
pub const STATE_PROPERTIES: [&str; 13] = [
    "left",
    "top",
    "width",
    "height",
    "scale_x",
    "scale_y",
    "angle",
    "opacity",
    "flip_x",
    "flip_y",
    "fill",
    "stroke",
    "stroke_width",
];

/// 场景对象：共享变换状态 + 形状变体
#[derive(Clone)]
pub struct SceneObject {
    /// 对象中心的父坐标
    pub left: f64,
    pub top: f64,
    /// 未缩放尺寸
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// 旋转角（度），与 theta 同步
    angle: f64,
    /// 旋转角（弧度），与 angle 同步
    theta: f64,
    pub opacity: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
    pub selectable: bool,
    pub has_controls: bool,
    pub has_borders: bool,
    pub has_rotating_point: bool,
    pub lock_movement_x: bool,
    pub lock_movement_y: bool,
    pub lock_rotation: bool,
    pub lock_scaling_x: bool,
    pub lock_scaling_y: bool,
    /// 当前是否被选中
    pub active: bool,
    pub shape: Shape,
    /// 角点缓存，仅在 set_coords() 后有效
    pub(crate) coords: Option<CornerCoords>,
    saved_state: Option<Vec<(&'static str, PropValue)>>,
}

impl SceneObject {
    /// 用默认属性包装一个形状变体
    pub fn with_shape(shape: Shape) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            theta: 0.0,
            opacity: DEFAULT_OPACITY,
            flip_x: false,
            flip_y: false,
            fill: Some(DEFAULT_FILL),
            stroke: None,
            stroke_width: DEFAULT_STROKE_WIDTH,
            selectable: true,
            has_controls: true,
            has_borders: true,
            has_rotating_point: true,
            lock_movement_x: false,
            lock_movement_y: false,
            lock_rotation: false,
            lock_scaling_x: false,
            lock_scaling_y: false,
            active: false,
            shape,
            coords: None,
            saved_state: None,
        }
    }

    /// 对象类型的线格式名称
    pub fn kind_name(&self) -> &'static str {
        self.shape.kind_name()
    }

    // ==================== 角度同步 ====================

    pub fn get_angle(&self) -> f64 {
        self.angle
    }

    pub fn theta(&self) -> f64 {
        self.theta
    }

    /// 设置角度（度），同步弧度并使角点缓存失效
    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = degrees;
        self.theta = degrees.to_radians();
        self.invalidate_coords();
    }

    /// 设置角度（弧度），同步度数并使角点缓存失效
    pub fn set_theta(&mut self, radians: f64) {
        self.theta = radians;
        self.angle = radians.to_degrees();
        self.invalidate_coords();
    }

    /// 吸附到最近的直角倍数
    pub fn straighten(&mut self) {
        let snapped = (self.angle / STRAIGHTEN_STEP_DEGREES).round() * STRAIGHTEN_STEP_DEGREES;
        self.set_angle(snapped);
    }

    // ==================== 尺寸与缩放 ====================

    /// 对象中心（position 即中心）
    pub fn get_center(&self) -> crate::geometry::Point {
        crate::geometry::Point::new(self.left, self.top)
    }

    /// 缩放后的宽度
    pub fn get_width(&self) -> f64 {
        self.width * self.scale_x
    }

    /// 缩放后的高度
    pub fn get_height(&self) -> f64 {
        self.height * self.scale_y
    }

    /// 双轴等比缩放，低于下限静默收紧
    pub fn scale(&mut self, value: f64) {
        let clamped = value.max(MIN_SCALE_LIMIT);
        self.scale_x = clamped;
        self.scale_y = clamped;
        self.invalidate_coords();
    }

    /// 缩放到目标显示宽度
    pub fn scale_to_width(&mut self, value: f64) {
        if self.width != 0.0 {
            self.scale(value / self.width);
        }
    }

    /// 缩放到目标显示高度
    pub fn scale_to_height(&mut self, value: f64) {
        if self.height != 0.0 {
            self.scale(value / self.height);
        }
    }

    pub(crate) fn invalidate_coords(&mut self) {
        self.coords = None;
    }

    // ==================== 通用属性访问 ====================

    /// 按名称读取状态属性
    pub fn get_prop(&self, name: &str) -> Result<PropValue, ObjectError> {
        let value = match name {
            "left" => PropValue::Float(self.left),
            "top" => PropValue::Float(self.top),
            "width" => PropValue::Float(self.width),
            "height" => PropValue::Float(self.height),
            "scale_x" => PropValue::Float(self.scale_x),
            "scale_y" => PropValue::Float(self.scale_y),
            "angle" => PropValue::Float(self.angle),
            "opacity" => PropValue::Float(self.opacity),
            "flip_x" => PropValue::Bool(self.flip_x),
            "flip_y" => PropValue::Bool(self.flip_y),
            "fill" => PropValue::Color(self.fill),
            "stroke" => PropValue::Color(self.stroke),
            "stroke_width" => PropValue::Float(self.stroke_width),
            _ => return Err(ObjectError::UnknownProperty(name.to_string())),
        };
        Ok(value)
    }

    /// 按名称写状态属性；未知名称报错而不是静默接受。
    /// 编组对 fill/opacity 的写入会向所有成员传播。
    pub fn set_prop(&mut self, name: &str, value: PropValue) -> Result<(), ObjectError> {
        let type_err = || ObjectError::PropertyType(name.to_string());
        match (name, &value) {
            ("left", PropValue::Float(v)) => self.left = *v,
            ("top", PropValue::Float(v)) => self.top = *v,
            ("width", PropValue::Float(v)) => self.width = *v,
            ("height", PropValue::Float(v)) => self.height = *v,
            ("scale_x", PropValue::Float(v)) => self.scale_x = v.max(MIN_SCALE_LIMIT),
            ("scale_y", PropValue::Float(v)) => self.scale_y = v.max(MIN_SCALE_LIMIT),
            ("angle", PropValue::Float(v)) => {
                self.set_angle(*v);
                return Ok(());
            }
            ("opacity", PropValue::Float(v)) => {
                self.opacity = v.clamp(0.0, 1.0);
                self.propagate_to_children(name, &value);
            }
            ("flip_x", PropValue::Bool(v)) => self.flip_x = *v,
            ("flip_y", PropValue::Bool(v)) => self.flip_y = *v,
            ("fill", PropValue::Color(v)) => {
                self.fill = *v;
                self.propagate_to_children(name, &value);
            }
            ("stroke", PropValue::Color(v)) => self.stroke = *v,
            ("stroke_width", PropValue::Float(v)) => self.stroke_width = *v,
            (
                "left" | "top" | "width" | "height" | "scale_x" | "scale_y" | "angle" | "opacity"
                | "flip_x" | "flip_y" | "fill" | "stroke" | "stroke_width",
                _,
            ) => return Err(type_err()),
            _ => return Err(ObjectError::UnknownProperty(name.to_string())),
        }
        self.invalidate_coords();
        Ok(())
    }

    fn propagate_to_children(&mut self, name: &str, value: &PropValue) {
        if let Shape::Group { children } | Shape::PathGroup { children, .. } = &mut self.shape {
            for child in children {
                // 忽略子对象的传播错误：属性集对所有类型一致
                let _ = child.set_prop(name, value.clone());
            }
        }
    }

    // ==================== 状态快照与脏检查 ====================

    /// 记录当前状态快照（手势开始时调用）
    pub fn save_state(&mut self) {
        let snapshot = STATE_PROPERTIES
            .iter()
            .map(|name| (*name, self.get_prop(name).unwrap()))
            .collect();
        self.saved_state = Some(snapshot);
    }

    /// 与最近快照比较；没有快照时视为未变化
    pub fn has_state_changed(&self) -> bool {
        match &self.saved_state {
            Some(snapshot) => snapshot
                .iter()
                .any(|(name, saved)| self.get_prop(name).unwrap() != *saved),
            None => false,
        }
    }

    /// 取最近快照中某属性的值（取消手势时恢复用）
    pub fn saved_prop(&self, name: &str) -> Option<PropValue> {
        self.saved_state
            .as_ref()
            .and_then(|s| s.iter().find(|(n, _)| *n == name))
            .map(|(_, v)| v.clone())
    }

    /// 恢复到最近快照（Escape 取消手势）
    pub fn restore_state(&mut self) {
        let Some(snapshot) = self.saved_state.clone() else {
            return;
        };
        for (name, value) in snapshot {
            let _ = self.set_prop(name, value);
        }
        self.invalidate_coords();
    }

    // ==================== 渲染 ====================

    /// 绘制对象：平移到中心、旋转、缩放（含翻转），再按形状画。
    /// 宽或高为零的退化对象整帧跳过，避免奇异变换。
    pub fn render(&mut self, ctx: &mut dyn RenderContext, engine: &dyn TextEngine) {
        if self.width == 0.0 || self.height == 0.0 {
            // 文本对象的尺寸来自量度，首帧前是 0，先补一次量度
            if !matches!(self.shape, Shape::Text { .. }) {
                return;
            }
        }
        ctx.save();
        ctx.translate(self.left, self.top);
        ctx.rotate(self.theta);
        let fx = if self.flip_x { -1.0 } else { 1.0 };
        let fy = if self.flip_y { -1.0 } else { 1.0 };
        ctx.scale(self.scale_x * fx, self.scale_y * fy);
        ctx.set_global_alpha(self.opacity);
        shapes::render_shape(self, ctx, engine);
        ctx.restore();
    }

    /// 渲染复杂度估计
    pub fn complexity(&self) -> usize {
        self.shape.complexity()
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_theta_kept_in_sync() {
        let mut obj = SceneObject::with_shape(Shape::Rect { rx: 0.0, ry: 0.0 });
        obj.set_angle(90.0);
        assert_eq!(obj.get_angle(), 90.0);
        assert!((obj.theta() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        obj.set_theta(std::f64::consts::PI);
        assert_eq!(obj.get_angle(), 180.0);
    }

    #[test]
    fn test_unknown_property_rejected() {
        let mut obj = SceneObject::with_shape(Shape::Rect { rx: 0.0, ry: 0.0 });
        assert!(obj.get_prop("bogus").is_err());
        assert!(obj.set_prop("bogus", PropValue::Float(1.0)).is_err());
    }

    #[test]
    fn test_state_snapshot_dirty_check() {
        let mut obj = SceneObject::with_shape(Shape::Rect { rx: 0.0, ry: 0.0 });
        obj.left = 10.0;
        obj.save_state();
        assert!(!obj.has_state_changed());

        obj.left = 20.0;
        assert!(obj.has_state_changed());

        obj.restore_state();
        assert_eq!(obj.left, 10.0);
        assert!(!obj.has_state_changed());
    }

    #[test]
    fn test_scale_clamped_to_min() {
        let mut obj = SceneObject::with_shape(Shape::Rect { rx: 0.0, ry: 0.0 });
        obj.scale(0.0001);
        assert_eq!(obj.scale_x, crate::constants::MIN_SCALE_LIMIT);
    }

    #[test]
    fn test_straighten_snaps_to_right_angle() {
        let mut obj = SceneObject::with_shape(Shape::Rect { rx: 0.0, ry: 0.0 });
        obj.set_angle(47.0);
        obj.straighten();
        assert_eq!(obj.get_angle(), 90.0);

        obj.set_angle(-130.0);
        obj.straighten();
        assert_eq!(obj.get_angle(), -90.0);
    }

    #[test]
    fn test_group_fill_propagates() {
        let a = shapes::rect(0.0, 0.0, 10.0, 10.0);
        let b = shapes::rect(20.0, 0.0, 10.0, 10.0);
        let mut group = group::make_group(vec![a, b]).unwrap();
        let red = Some(Color::from_rgb(255, 0, 0));
        group.set_prop("fill", PropValue::Color(red)).unwrap();
        if let Shape::Group { children } = &group.shape {
            assert!(children.iter().all(|c| c.fill == red));
        } else {
            panic!("not a group");
        }
    }
}
