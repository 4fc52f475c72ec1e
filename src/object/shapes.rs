//! 形状变体
//!
//! 每种形状的构造、本地坐标绘制和 SVG 片段生成。
//! 所有绘制都发生在对象本地坐标系：原点在对象中心，
//! 变换（平移/旋转/缩放/翻转）已由基类 render 应用。

use std::sync::Arc;

use tiny_skia::Pixmap;

use crate::color::Color;
use crate::constants::{DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE, DEFAULT_LINE_HEIGHT};
use crate::error::ObjectError;
use crate::geometry::Point;
use crate::render::RenderContext;

use super::text::{TextEngine, TextStyle};
use super::SceneObject;

/// 路径指令，线格式为 ["M",x,y] 风格的数组
#[derive(Debug, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    QuadTo(Point, Point),
    CubicTo(Point, Point, Point),
    Close,
}

/// 形状数据：type 标签分发的变体集合
#[derive(Clone)]
pub enum Shape {
    Rect {
        rx: f64,
        ry: f64,
    },
    Circle {
        radius: f64,
    },
    Ellipse {
        rx: f64,
        ry: f64,
    },
    /// 端点只保留方向信息，位置由 left/top/width/height 决定
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Triangle,
    /// 顶点存对象本地坐标（包围盒中心为原点）
    Polygon {
        points: Vec<Point>,
    },
    Polyline {
        points: Vec<Point>,
    },
    Path {
        commands: Vec<PathCommand>,
        source_path: Option<String>,
    },
    /// 永久复合形状，区别于多选生成的临时编组
    PathGroup {
        children: Vec<SceneObject>,
        source_path: Option<String>,
    },
    Group {
        children: Vec<SceneObject>,
    },
    Image {
        src: String,
        pixmap: Option<Arc<Pixmap>>,
    },
    Text {
        text: String,
        style: TextStyle,
    },
}

impl Shape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Rect { .. } => "rect",
            Shape::Circle { .. } => "circle",
            Shape::Ellipse { .. } => "ellipse",
            Shape::Line { .. } => "line",
            Shape::Triangle => "triangle",
            Shape::Polygon { .. } => "polygon",
            Shape::Polyline { .. } => "polyline",
            Shape::Path { .. } => "path",
            Shape::PathGroup { .. } => "path-group",
            Shape::Group { .. } => "group",
            Shape::Image { .. } => "image",
            Shape::Text { .. } => "text",
        }
    }

    pub fn complexity(&self) -> usize {
        match self {
            Shape::Polygon { points } | Shape::Polyline { points } => points.len(),
            Shape::Path { commands, .. } => commands.len(),
            Shape::PathGroup { children, .. } | Shape::Group { children } => {
                children.iter().map(SceneObject::complexity).sum()
            }
            _ => 1,
        }
    }
}

// ==================== 构造器 ====================

pub fn rect(left: f64, top: f64, width: f64, height: f64) -> SceneObject {
    let mut obj = SceneObject::with_shape(Shape::Rect { rx: 0.0, ry: 0.0 });
    obj.left = left;
    obj.top = top;
    obj.width = width;
    obj.height = height;
    obj
}

pub fn circle(left: f64, top: f64, radius: f64) -> SceneObject {
    let mut obj = SceneObject::with_shape(Shape::Circle { radius });
    obj.left = left;
    obj.top = top;
    obj.width = radius * 2.0;
    obj.height = radius * 2.0;
    obj
}

pub fn ellipse(left: f64, top: f64, rx: f64, ry: f64) -> SceneObject {
    let mut obj = SceneObject::with_shape(Shape::Ellipse { rx, ry });
    obj.left = left;
    obj.top = top;
    obj.width = rx * 2.0;
    obj.height = ry * 2.0;
    obj
}

pub fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> SceneObject {
    let mut obj = SceneObject::with_shape(Shape::Line { x1, y1, x2, y2 });
    obj.left = (x1 + x2) / 2.0;
    obj.top = (y1 + y2) / 2.0;
    obj.width = (x2 - x1).abs();
    obj.height = (y2 - y1).abs();
    obj
}

pub fn triangle(left: f64, top: f64, width: f64, height: f64) -> SceneObject {
    let mut obj = SceneObject::with_shape(Shape::Triangle);
    obj.left = left;
    obj.top = top;
    obj.width = width;
    obj.height = height;
    obj
}

/// 顶点归一化到包围盒中心；空列表是构造错误
pub fn polygon(points: Vec<Point>) -> Result<SceneObject, ObjectError> {
    let (center, width, height, normalized) = normalize_points(points)?;
    let mut obj = SceneObject::with_shape(Shape::Polygon { points: normalized });
    obj.left = center.x;
    obj.top = center.y;
    obj.width = width;
    obj.height = height;
    Ok(obj)
}

pub fn polyline(points: Vec<Point>) -> Result<SceneObject, ObjectError> {
    let (center, width, height, normalized) = normalize_points(points)?;
    let mut obj = SceneObject::with_shape(Shape::Polyline { points: normalized });
    obj.left = center.x;
    obj.top = center.y;
    obj.width = width;
    obj.height = height;
    Ok(obj)
}

/// 指令端点归一化到包围盒中心；空路径是构造错误
pub fn path(commands: Vec<PathCommand>) -> Result<SceneObject, ObjectError> {
    if commands.is_empty() {
        return Err(ObjectError::EmptyPath);
    }
    let (min, max) = path_extent(&commands);
    let center = min.midpoint_from(&max);
    let normalized = commands
        .iter()
        .map(|c| offset_command(c, -center.x, -center.y))
        .collect();
    let mut obj = SceneObject::with_shape(Shape::Path {
        commands: normalized,
        source_path: None,
    });
    obj.left = center.x;
    obj.top = center.y;
    obj.width = max.x - min.x;
    obj.height = max.y - min.y;
    Ok(obj)
}

/// 永久复合路径：子对象坐标转为相对编组中心
pub fn path_group(mut children: Vec<SceneObject>) -> Result<SceneObject, ObjectError> {
    if children.is_empty() {
        return Err(ObjectError::EmptyPoints);
    }
    let (center, width, height) = super::group::bounds_of(&mut children)?;
    for child in &mut children {
        child.left -= center.x;
        child.top -= center.y;
        child.invalidate_coords();
    }
    let mut obj = SceneObject::with_shape(Shape::PathGroup {
        children,
        source_path: None,
    });
    obj.left = center.x;
    obj.top = center.y;
    obj.width = width;
    obj.height = height;
    Ok(obj)
}

/// 图像对象；像素在异步加载完成前为空，期间按退化对象跳过绘制
pub fn image(src: &str) -> SceneObject {
    let mut obj = SceneObject::with_shape(Shape::Image {
        src: src.to_string(),
        pixmap: None,
    });
    obj.fill = None;
    obj
}

pub fn text(content: &str, left: f64, top: f64) -> SceneObject {
    let mut obj = SceneObject::with_shape(Shape::Text {
        text: content.to_string(),
        style: TextStyle {
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_weight: "normal".to_string(),
            line_height: DEFAULT_LINE_HEIGHT,
        },
    });
    obj.left = left;
    obj.top = top;
    obj
}

fn normalize_points(
    points: Vec<Point>,
) -> Result<(Point, f64, f64, Vec<Point>), ObjectError> {
    if points.is_empty() {
        return Err(ObjectError::EmptyPoints);
    }
    let mut min = points[0];
    let mut max = points[0];
    for p in &points[1..] {
        min = min.min(p);
        max = max.max(p);
    }
    let center = min.midpoint_from(&max);
    let normalized = points
        .into_iter()
        .map(|p| p.subtract(&center))
        .collect();
    Ok((center, max.x - min.x, max.y - min.y, normalized))
}

/// 指令端点（含控制点）的包围范围
fn path_extent(commands: &[PathCommand]) -> (Point, Point) {
    let mut min = Point::new(f64::MAX, f64::MAX);
    let mut max = Point::new(f64::MIN, f64::MIN);
    let mut touch = |p: &Point| {
        min = min.min(p);
        max = max.max(p);
    };
    for command in commands {
        match command {
            PathCommand::MoveTo(p) | PathCommand::LineTo(p) => touch(p),
            PathCommand::QuadTo(c, p) => {
                touch(c);
                touch(p);
            }
            PathCommand::CubicTo(c1, c2, p) => {
                touch(c1);
                touch(c2);
                touch(p);
            }
            PathCommand::Close => {}
        }
    }
    if min.x > max.x {
        (Point::default(), Point::default())
    } else {
        (min, max)
    }
}

fn offset_command(command: &PathCommand, dx: f64, dy: f64) -> PathCommand {
    let off = |p: &Point| Point::new(p.x + dx, p.y + dy);
    match command {
        PathCommand::MoveTo(p) => PathCommand::MoveTo(off(p)),
        PathCommand::LineTo(p) => PathCommand::LineTo(off(p)),
        PathCommand::QuadTo(c, p) => PathCommand::QuadTo(off(c), off(p)),
        PathCommand::CubicTo(c1, c2, p) => PathCommand::CubicTo(off(c1), off(c2), off(p)),
        PathCommand::Close => PathCommand::Close,
    }
}

// ==================== 绘制 ====================

/// 填充在前、描边在后
fn apply_paint(ctx: &mut dyn RenderContext, fill: Option<Color>, stroke: Option<Color>, width: f64) {
    if let Some(color) = fill {
        ctx.set_fill(color);
        ctx.fill();
    }
    if let Some(color) = stroke {
        ctx.set_stroke(color);
        ctx.set_line_width(width);
        ctx.stroke();
    }
}

pub(super) fn render_shape(
    obj: &mut SceneObject,
    ctx: &mut dyn RenderContext,
    engine: &dyn TextEngine,
) {
    let w = obj.width;
    let h = obj.height;
    let fill = obj.fill;
    let stroke = obj.stroke;
    let stroke_width = obj.stroke_width;

    match &mut obj.shape {
        Shape::Rect { rx, ry } => {
            let (x, y) = (-w / 2.0, -h / 2.0);
            ctx.begin_path();
            if *rx > 0.0 || *ry > 0.0 {
                let rx = rx.min(w / 2.0);
                let ry = ry.min(h / 2.0);
                ctx.move_to(x + rx, y);
                ctx.line_to(x + w - rx, y);
                ctx.quad_to(x + w, y, x + w, y + ry);
                ctx.line_to(x + w, y + h - ry);
                ctx.quad_to(x + w, y + h, x + w - rx, y + h);
                ctx.line_to(x + rx, y + h);
                ctx.quad_to(x, y + h, x, y + h - ry);
                ctx.line_to(x, y + ry);
                ctx.quad_to(x, y, x + rx, y);
                ctx.close_path();
            } else {
                ctx.rect(x, y, w, h);
            }
            apply_paint(ctx, fill, stroke, stroke_width);
        }
        Shape::Circle { radius } => {
            ctx.begin_path();
            ctx.ellipse(0.0, 0.0, *radius, *radius);
            apply_paint(ctx, fill, stroke, stroke_width);
        }
        Shape::Ellipse { rx, ry } => {
            ctx.begin_path();
            ctx.ellipse(0.0, 0.0, *rx, *ry);
            apply_paint(ctx, fill, stroke, stroke_width);
        }
        Shape::Line { x1, y1, x2, y2 } => {
            // 只有方向有意义：按端点顺序决定对角走向
            let sx = if *x1 <= *x2 { -1.0 } else { 1.0 };
            let sy = if *y1 <= *y2 { -1.0 } else { 1.0 };
            ctx.begin_path();
            ctx.move_to(sx * w / 2.0, sy * h / 2.0);
            ctx.line_to(-sx * w / 2.0, -sy * h / 2.0);
            let color = stroke.or(fill);
            apply_paint(ctx, None, color, stroke_width);
        }
        Shape::Triangle => {
            ctx.begin_path();
            ctx.move_to(-w / 2.0, h / 2.0);
            ctx.line_to(0.0, -h / 2.0);
            ctx.line_to(w / 2.0, h / 2.0);
            ctx.close_path();
            apply_paint(ctx, fill, stroke, stroke_width);
        }
        Shape::Polygon { points } => {
            trace_polyline(ctx, points);
            ctx.close_path();
            apply_paint(ctx, fill, stroke, stroke_width);
        }
        Shape::Polyline { points } => {
            trace_polyline(ctx, points);
            apply_paint(ctx, None, stroke.or(fill), stroke_width);
        }
        Shape::Path { commands, .. } => {
            trace_path(ctx, commands);
            apply_paint(ctx, fill, stroke, stroke_width);
        }
        Shape::PathGroup { children, .. } | Shape::Group { children } => {
            for child in children {
                child.render(ctx, engine);
            }
        }
        Shape::Image { pixmap, .. } => {
            if let Some(px) = pixmap {
                let px = Arc::clone(px);
                ctx.draw_pixmap(&px, -w / 2.0, -h / 2.0, w, h, 1.0);
            }
        }
        Shape::Text { text, style } => {
            // 两段式：先量度更新自身包围盒，再交给文本引擎绘制
            let metrics = engine.measure(text, style);
            obj.width = metrics.width;
            obj.height = metrics.height;
            engine.paint(ctx, text, style, &metrics, fill);
        }
    }
}

fn trace_polyline(ctx: &mut dyn RenderContext, points: &[Point]) {
    ctx.begin_path();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        ctx.move_to(first.x, first.y);
        for p in iter {
            ctx.line_to(p.x, p.y);
        }
    }
}

fn trace_path(ctx: &mut dyn RenderContext, commands: &[PathCommand]) {
    ctx.begin_path();
    for command in commands {
        match command {
            PathCommand::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathCommand::LineTo(p) => ctx.line_to(p.x, p.y),
            PathCommand::QuadTo(c, p) => ctx.quad_to(c.x, c.y, p.x, p.y),
            PathCommand::CubicTo(c1, c2, p) => ctx.cubic_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathCommand::Close => ctx.close_path(),
        }
    }
}

// ==================== SVG 导出 ====================

fn fmt_num(v: f64) -> String {
    if v == v.trunc() {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

fn svg_style(obj: &SceneObject) -> String {
    let stroke = obj
        .stroke
        .map_or("none".to_string(), |c| c.to_rgb_string());
    let fill = obj.fill.map_or("none".to_string(), |c| c.to_rgb_string());
    format!(
        "stroke: {}; stroke-width: {}; fill: {}; opacity: {};",
        stroke,
        fmt_num(obj.stroke_width),
        fill,
        fmt_num(obj.opacity)
    )
}

fn svg_transform(obj: &SceneObject) -> String {
    format!(
        "translate({} {}) rotate({}) scale({} {})",
        fmt_num(obj.left),
        fmt_num(obj.top),
        fmt_num(obj.get_angle()),
        fmt_num(obj.scale_x * if obj.flip_x { -1.0 } else { 1.0 }),
        fmt_num(obj.scale_y * if obj.flip_y { -1.0 } else { 1.0 }),
    )
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn points_attr(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", fmt_num(p.x), fmt_num(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// 指令序列转 d 属性
pub fn path_data(commands: &[PathCommand]) -> String {
    commands
        .iter()
        .map(|c| match c {
            PathCommand::MoveTo(p) => format!("M {} {}", fmt_num(p.x), fmt_num(p.y)),
            PathCommand::LineTo(p) => format!("L {} {}", fmt_num(p.x), fmt_num(p.y)),
            PathCommand::QuadTo(c1, p) => format!(
                "Q {} {} {} {}",
                fmt_num(c1.x),
                fmt_num(c1.y),
                fmt_num(p.x),
                fmt_num(p.y)
            ),
            PathCommand::CubicTo(c1, c2, p) => format!(
                "C {} {} {} {} {} {}",
                fmt_num(c1.x),
                fmt_num(c1.y),
                fmt_num(c2.x),
                fmt_num(c2.y),
                fmt_num(p.x),
                fmt_num(p.y)
            ),
            PathCommand::Close => "z".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl SceneObject {
    /// SVG 1.1 片段，变换顺序固定 translate→rotate→scale
    pub fn to_svg(&self) -> String {
        let transform = svg_transform(self);
        let style = svg_style(self);
        let w = self.width;
        let h = self.height;
        match &self.shape {
            Shape::Rect { rx, ry } => format!(
                "<rect x=\"{}\" y=\"{}\" rx=\"{}\" ry=\"{}\" width=\"{}\" height=\"{}\" style=\"{}\" transform=\"{}\"/>",
                fmt_num(-w / 2.0),
                fmt_num(-h / 2.0),
                fmt_num(*rx),
                fmt_num(*ry),
                fmt_num(w),
                fmt_num(h),
                style,
                transform
            ),
            Shape::Circle { radius } => format!(
                "<circle cx=\"0\" cy=\"0\" r=\"{}\" style=\"{}\" transform=\"{}\"/>",
                fmt_num(*radius),
                style,
                transform
            ),
            Shape::Ellipse { rx, ry } => format!(
                "<ellipse cx=\"0\" cy=\"0\" rx=\"{}\" ry=\"{}\" style=\"{}\" transform=\"{}\"/>",
                fmt_num(*rx),
                fmt_num(*ry),
                style,
                transform
            ),
            Shape::Line { x1, y1, x2, y2 } => {
                let sx = if *x1 <= *x2 { -1.0 } else { 1.0 };
                let sy = if *y1 <= *y2 { -1.0 } else { 1.0 };
                format!(
                    "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" style=\"{}\" transform=\"{}\"/>",
                    fmt_num(sx * w / 2.0),
                    fmt_num(sy * h / 2.0),
                    fmt_num(-sx * w / 2.0),
                    fmt_num(-sy * h / 2.0),
                    style,
                    transform
                )
            }
            Shape::Triangle => {
                let points = [
                    Point::new(-w / 2.0, h / 2.0),
                    Point::new(0.0, -h / 2.0),
                    Point::new(w / 2.0, h / 2.0),
                ];
                format!(
                    "<polygon points=\"{}\" style=\"{}\" transform=\"{}\"/>",
                    points_attr(&points),
                    style,
                    transform
                )
            }
            Shape::Polygon { points } => format!(
                "<polygon points=\"{}\" style=\"{}\" transform=\"{}\"/>",
                points_attr(points),
                style,
                transform
            ),
            Shape::Polyline { points } => format!(
                "<polyline points=\"{}\" style=\"{}\" transform=\"{}\"/>",
                points_attr(points),
                style,
                transform
            ),
            Shape::Path { commands, .. } => format!(
                "<path d=\"{}\" style=\"{}\" transform=\"{}\"/>",
                path_data(commands),
                style,
                transform
            ),
            Shape::PathGroup { children, .. } | Shape::Group { children } => {
                let inner: String = children.iter().map(SceneObject::to_svg).collect();
                format!("<g transform=\"{}\" style=\"{}\">{}</g>", transform, style, inner)
            }
            Shape::Image { src, .. } => format!(
                "<image xlink:href=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" style=\"{}\" transform=\"{}\"/>",
                escape_xml(src),
                fmt_num(-w / 2.0),
                fmt_num(-h / 2.0),
                fmt_num(w),
                fmt_num(h),
                style,
                transform
            ),
            Shape::Text { text, style: ts } => format!(
                "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" font-weight=\"{}\" style=\"{}\" transform=\"{}\">{}</text>",
                fmt_num(-w / 2.0),
                fmt_num(h / 2.0),
                escape_xml(&ts.font_family),
                fmt_num(ts.font_size),
                escape_xml(&ts.font_weight),
                style,
                transform,
                escape_xml(text)
            ),
        }
    }
}

// ==================== 单元测试 ====================
