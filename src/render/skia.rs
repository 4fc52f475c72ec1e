//! tiny-skia 渲染后端
//!
//! 用状态栈 + 当前路径把 tiny-skia 的无状态 API 适配成
//! [`RenderContext`] 的画布语义。变换矩阵在提交绘制时传给
//! tiny-skia，路径点保持用户空间坐标。

use tiny_skia::{
    FillRule, Mask, Paint, Path, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, StrokeDash,
    Transform,
};

use super::RenderContext;
use crate::color::Color;
use crate::error::RenderError;

/// 单层绘制状态
#[derive(Clone)]
struct DrawState {
    transform: Transform,
    fill: Color,
    stroke: Color,
    line_width: f64,
    global_alpha: f64,
    dash: Option<Vec<f32>>,
    clip: Option<Mask>,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            transform: Transform::identity(),
            fill: Color::from_rgb(0, 0, 0),
            stroke: Color::from_rgb(0, 0, 0),
            line_width: 1.0,
            global_alpha: 1.0,
            dash: None,
            clip: None,
        }
    }
}

/// tiny-skia 像素图渲染上下文
pub struct SkiaContext {
    pixmap: Pixmap,
    states: Vec<DrawState>,
    builder: PathBuilder,
}

impl SkiaContext {
    /// 创建指定尺寸的上下文；零尺寸视为环境错误
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::SurfaceCreation { width, height })?;
        Ok(Self {
            pixmap,
            states: vec![DrawState::default()],
            builder: PathBuilder::new(),
        })
    }

    fn state(&self) -> &DrawState {
        self.states.last().unwrap()
    }

    fn state_mut(&mut self) -> &mut DrawState {
        self.states.last_mut().unwrap()
    }

    fn current_path(&self) -> Option<Path> {
        self.builder.clone().finish()
    }

    fn skia_color(color: Color, alpha: f64) -> tiny_skia::Color {
        tiny_skia::Color::from_rgba8(
            color.r,
            color.g,
            color.b,
            (color.effective_alpha(alpha) * 255.0).round() as u8,
        )
    }

    fn make_paint(color: Color, alpha: f64) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(Self::skia_color(color, alpha));
        paint.anti_alias = true;
        paint
    }

    fn make_stroke(&self) -> Stroke {
        let state = self.state();
        Stroke {
            width: state.line_width as f32,
            dash: state
                .dash
                .as_ref()
                .and_then(|d| StrokeDash::new(d.clone(), 0.0)),
            ..Stroke::default()
        }
    }

    fn fill_path_internal(&mut self, path: &Path) {
        let paint = Self::make_paint(self.state().fill, self.state().global_alpha);
        let transform = self.state().transform;
        let clip = self.state().clip.clone();
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, transform, clip.as_ref());
    }

    fn stroke_path_internal(&mut self, path: &Path) {
        let paint = Self::make_paint(self.state().stroke, self.state().global_alpha);
        let stroke = self.make_stroke();
        let transform = self.state().transform;
        let clip = self.state().clip.clone();
        self.pixmap
            .stroke_path(path, &paint, &stroke, transform, clip.as_ref());
    }
}

impl RenderContext for SkiaContext {
    fn width(&self) -> u32 {
        self.pixmap.width()
    }

    fn height(&self) -> u32 {
        self.pixmap.height()
    }

    fn save(&mut self) {
        let top = self.state().clone();
        self.states.push(top);
    }

    fn restore(&mut self) {
        if self.states.len() > 1 {
            self.states.pop();
        }
    }

    fn translate(&mut self, tx: f64, ty: f64) {
        let state = self.state_mut();
        state.transform = state.transform.pre_translate(tx as f32, ty as f32);
    }

    fn rotate(&mut self, radians: f64) {
        let state = self.state_mut();
        state.transform = state
            .transform
            .pre_concat(Transform::from_rotate(radians.to_degrees() as f32));
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        let state = self.state_mut();
        state.transform = state.transform.pre_scale(sx as f32, sy as f32);
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.state_mut().global_alpha = alpha.clamp(0.0, 1.0);
    }

    fn set_fill(&mut self, color: Color) {
        self.state_mut().fill = color;
    }

    fn set_stroke(&mut self, color: Color) {
        self.state_mut().stroke = color;
    }

    fn set_line_width(&mut self, width: f64) {
        self.state_mut().line_width = width.max(0.0);
    }

    fn set_line_dash(&mut self, dash: &[f64]) {
        self.state_mut().dash = if dash.is_empty() {
            None
        } else {
            Some(dash.iter().map(|v| *v as f32).collect())
        };
    }

    fn clear(&mut self, color: Option<Color>) {
        match color {
            Some(c) => self.pixmap.fill(Self::skia_color(c, 1.0)),
            None => self.pixmap.fill(tiny_skia::Color::TRANSPARENT),
        }
    }

    fn begin_path(&mut self) {
        self.builder = PathBuilder::new();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        self.builder.move_to(x as f32, y as f32);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.builder.line_to(x as f32, y as f32);
    }

    fn quad_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.builder
            .quad_to(cx as f32, cy as f32, x as f32, y as f32);
    }

    fn cubic_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.builder.cubic_to(
            c1x as f32, c1y as f32, c2x as f32, c2y as f32, x as f32, y as f32,
        );
    }

    fn close_path(&mut self) {
        self.builder.close();
    }

    fn rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) {
            self.builder.push_rect(rect);
        }
    }

    fn ellipse(&mut self, cx: f64, cy: f64, rx: f64, ry: f64) {
        let bounds = Rect::from_xywh(
            (cx - rx) as f32,
            (cy - ry) as f32,
            (rx * 2.0) as f32,
            (ry * 2.0) as f32,
        );
        if let Some(rect) = bounds {
            self.builder.push_oval(rect);
        }
    }

    fn fill(&mut self) {
        if let Some(path) = self.current_path() {
            self.fill_path_internal(&path);
        }
    }

    fn stroke(&mut self) {
        if let Some(path) = self.current_path() {
            self.stroke_path_internal(&path);
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut builder = PathBuilder::new();
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) {
            builder.push_rect(rect);
            if let Some(path) = builder.finish() {
                self.fill_path_internal(&path);
            }
        }
    }

    fn stroke_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut builder = PathBuilder::new();
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, width as f32, height as f32) {
            builder.push_rect(rect);
            if let Some(path) = builder.finish() {
                self.stroke_path_internal(&path);
            }
        }
    }

    fn clip(&mut self) {
        let Some(path) = self.current_path() else {
            return;
        };
        let transform = self.state().transform;
        let width = self.pixmap.width();
        let height = self.pixmap.height();
        let state = self.state_mut();
        match state.clip.take() {
            Some(mut mask) => {
                mask.intersect_path(&path, FillRule::Winding, true, transform);
                state.clip = Some(mask);
            }
            None => {
                if let Some(mut mask) = Mask::new(width, height) {
                    mask.fill_path(&path, FillRule::Winding, true, transform);
                    state.clip = Some(mask);
                }
            }
        }
    }

    fn draw_pixmap(
        &mut self,
        pixmap: &Pixmap,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        opacity: f64,
    ) {
        if pixmap.width() == 0 || pixmap.height() == 0 || width <= 0.0 || height <= 0.0 {
            return;
        }
        let sx = width / pixmap.width() as f64;
        let sy = height / pixmap.height() as f64;
        let transform = self
            .state()
            .transform
            .pre_translate(x as f32, y as f32)
            .pre_scale(sx as f32, sy as f32);
        let paint = PixmapPaint {
            opacity: (opacity * self.state().global_alpha).clamp(0.0, 1.0) as f32,
            quality: tiny_skia::FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        let clip = self.state().clip.clone();
        self.pixmap
            .draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, clip.as_ref());
    }

    fn pixmap(&self) -> Option<&Pixmap> {
        Some(&self.pixmap)
    }
}

// ==================== 单元测试 ====================
