//! 静态渲染表面
//!
//! 持有有序的对象列表（数组顺序即 z 序、由后往前为从底到顶的唯一
//! 依据）、背景色/背景图与可选裁剪回调，负责整场合成、z 序调整和
//! 批量序列化。调整顺序的操作之后必须触发一次重绘。

use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tiny_skia::Pixmap;

use crate::color::Color;
use crate::error::{CanvasError, LoadError, RenderError};
use crate::loader::ImageLoader;
use crate::message::{CanvasEvent, Command, Layer};
use crate::object::serde_repr::SceneRecord;
use crate::object::{BoxTextEngine, SceneObject, Shape, TextEngine};
use crate::render::{RenderContext, SkiaContext};

/// 背景/覆盖图状态
pub struct CanvasImage {
    pub src: String,
    pub pixmap: Option<Arc<Pixmap>>,
    pub opacity: f64,
    /// 拉伸铺满画布，否则按自然尺寸
    pub stretch: bool,
}

/// 裁剪回调：在上下文里描出裁剪路径
pub type ClipFn = Box<dyn Fn(&mut dyn RenderContext)>;

/// 静态画布
pub struct StaticCanvas {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) context: Box<dyn RenderContext>,
    pub(crate) objects: Vec<SceneObject>,
    pub(crate) background_color: Option<Color>,
    pub(crate) background_image: Option<CanvasImage>,
    pub(crate) overlay_image: Option<CanvasImage>,
    pub(crate) clip_fn: Option<ClipFn>,
    pub(crate) text_engine: Box<dyn TextEngine>,
    pub(crate) loader: ImageLoader,
    pub(crate) events: Vec<CanvasEvent>,
}

impl StaticCanvas {
    /// 创建 tiny-skia 表面的画布；表面创建失败是硬错误
    pub fn new(width: u32, height: u32) -> Result<Self, CanvasError> {
        Self::with_context(Box::new(SkiaContext::new(width, height)?))
    }

    /// 用外部渲染上下文创建画布
    pub fn with_context(context: Box<dyn RenderContext>) -> Result<Self, CanvasError> {
        Ok(Self {
            width: context.width(),
            height: context.height(),
            context,
            objects: Vec::new(),
            background_color: None,
            background_image: None,
            overlay_image: None,
            clip_fn: None,
            text_engine: Box::new(BoxTextEngine),
            loader: ImageLoader::new()?,
            events: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 替换文本引擎（默认只有量度、不出字形）
    pub fn set_text_engine(&mut self, engine: Box<dyn TextEngine>) {
        self.text_engine = engine;
    }

    /// 设置裁剪回调
    pub fn set_clip(&mut self, clip: Option<ClipFn>) {
        self.clip_fn = clip;
    }

    /// 取走积累的事件
    pub fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    // ==================== 对象列表 ====================

    /// 追加对象到最顶层，返回索引
    pub fn add(&mut self, mut object: SceneObject) -> usize {
        object.set_coords();
        request_sources(&self.loader, &object);
        self.objects.push(object);
        let index = self.objects.len() - 1;
        self.events.push(CanvasEvent::ObjectAdded { index });
        index
    }

    /// 插入到指定 z 序位置
    pub fn insert_at(&mut self, mut object: SceneObject, index: usize) {
        object.set_coords();
        request_sources(&self.loader, &object);
        let index = index.min(self.objects.len());
        self.objects.insert(index, object);
        self.events.push(CanvasEvent::ObjectAdded { index });
    }

    /// 移除并返回对象
    pub fn remove(&mut self, index: usize) -> Option<SceneObject> {
        if index >= self.objects.len() {
            return None;
        }
        let object = self.objects.remove(index);
        self.events.push(CanvasEvent::ObjectRemoved { index });
        Some(object)
    }

    pub fn item(&self, index: usize) -> Option<&SceneObject> {
        self.objects.get(index)
    }

    pub fn item_mut(&mut self, index: usize) -> Option<&mut SceneObject> {
        self.objects.get_mut(index)
    }

    pub fn get_objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn size(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// 场景总复杂度
    pub fn complexity(&self) -> usize {
        self.objects.iter().map(SceneObject::complexity).sum()
    }

    /// 清空场景
    pub fn clear(&mut self) {
        self.objects.clear();
        self.background_color = None;
        self.background_image = None;
        self.overlay_image = None;
    }

    // ==================== z 序 ====================

    /// 移到最顶层（数组末尾），返回新索引
    pub fn bring_to_front(&mut self, index: usize) -> Option<usize> {
        if index >= self.objects.len() {
            return None;
        }
        let object = self.objects.remove(index);
        self.objects.push(object);
        Some(self.objects.len() - 1)
    }

    /// 移到最底层（数组开头），返回新索引
    pub fn send_to_back(&mut self, index: usize) -> Option<usize> {
        if index >= self.objects.len() {
            return None;
        }
        let object = self.objects.remove(index);
        self.objects.insert(0, object);
        Some(0)
    }

    /// 上移一层
    pub fn bring_forward(&mut self, index: usize) -> Option<usize> {
        if index + 1 < self.objects.len() {
            self.objects.swap(index, index + 1);
            Some(index + 1)
        } else {
            None
        }
    }

    /// 下移一层
    pub fn send_backwards(&mut self, index: usize) -> Option<usize> {
        if index > 0 && index < self.objects.len() {
            self.objects.swap(index, index - 1);
            Some(index - 1)
        } else {
            None
        }
    }

    // ==================== 背景与覆盖 ====================

    pub fn set_background_color(&mut self, color: Option<Color>) {
        self.background_color = color;
    }

    pub fn background_color(&self) -> Option<Color> {
        self.background_color
    }

    /// 设置背景图并发起异步加载
    pub fn set_background_image(&mut self, src: &str, opacity: f64, stretch: bool) {
        self.loader.request(src);
        self.background_image = Some(CanvasImage {
            src: src.to_string(),
            pixmap: None,
            opacity,
            stretch,
        });
    }

    /// 设置覆盖图（画在所有对象之上）并发起异步加载
    pub fn set_overlay_image(&mut self, src: &str) {
        self.loader.request(src);
        self.overlay_image = Some(CanvasImage {
            src: src.to_string(),
            pixmap: None,
            opacity: 1.0,
            stretch: false,
        });
    }

    /// 对象居中（水平）
    pub fn center_object_h(&mut self, index: usize) {
        let center = self.width as f64 / 2.0;
        if let Some(obj) = self.objects.get_mut(index) {
            obj.left = center;
            obj.set_coords();
        }
    }

    /// 对象居中（垂直）
    pub fn center_object_v(&mut self, index: usize) {
        let center = self.height as f64 / 2.0;
        if let Some(obj) = self.objects.get_mut(index) {
            obj.top = center;
            obj.set_coords();
        }
    }

    /// 角度吸附到直角
    pub fn straighten_object(&mut self, index: usize) {
        if let Some(obj) = self.objects.get_mut(index) {
            obj.straighten();
            obj.set_coords();
        }
    }

    // ==================== 渲染 ====================

    /// 整场重绘（无交互层状态）
    pub fn render_all(&mut self) {
        self.render_scene(None);
    }

    /// 合成顺序：清除 → 裁剪 → 背景色 → 背景图 → 对象（编组成员
    /// 已移入编组、自然跳过）→ 活动编组 → 覆盖图 → AfterRender
    pub(crate) fn render_scene(&mut self, active_group: Option<&mut SceneObject>) {
        let Self {
            width,
            height,
            context,
            objects,
            background_color,
            background_image,
            overlay_image,
            clip_fn,
            text_engine,
            events,
            ..
        } = self;
        let ctx = context.as_mut();
        let engine = text_engine.as_ref();

        ctx.clear(None);
        ctx.save();
        if let Some(clip) = clip_fn {
            ctx.begin_path();
            clip(ctx);
            ctx.clip();
        }
        if let Some(color) = background_color {
            ctx.set_fill(*color);
            ctx.fill_rect(0.0, 0.0, *width as f64, *height as f64);
        }
        if let Some(bg) = background_image {
            if let Some(pixmap) = &bg.pixmap {
                let (w, h) = if bg.stretch {
                    (*width as f64, *height as f64)
                } else {
                    (pixmap.width() as f64, pixmap.height() as f64)
                };
                ctx.draw_pixmap(pixmap, 0.0, 0.0, w, h, bg.opacity);
            }
        }
        for object in objects.iter_mut() {
            object.render(ctx, engine);
        }
        if let Some(group) = active_group {
            group.render(ctx, engine);
        }
        if let Some(overlay) = overlay_image {
            if let Some(pixmap) = &overlay.pixmap {
                let (w, h) = if overlay.stretch {
                    (*width as f64, *height as f64)
                } else {
                    (pixmap.width() as f64, pixmap.height() as f64)
                };
                ctx.draw_pixmap(pixmap, 0.0, 0.0, w, h, overlay.opacity);
            }
        }
        ctx.restore();
        events.push(CanvasEvent::AfterRender);
    }

    // ==================== 异步加载结果 ====================

    /// 应用已完成的图像加载（修改 + 请求重绘）
    pub fn poll_loaded(&mut self) -> Vec<Command> {
        let mut commands = Vec::new();
        for result in self.loader.drain() {
            match result.result {
                Ok(pixmap) => {
                    let shared = Arc::new(pixmap);
                    let mut applied = false;
                    for object in &mut self.objects {
                        applied |= apply_pixmap(object, &result.src, &shared);
                    }
                    for slot in [&mut self.background_image, &mut self.overlay_image] {
                        if let Some(img) = slot {
                            if img.src == result.src && img.pixmap.is_none() {
                                img.pixmap = Some(Arc::clone(&shared));
                                applied = true;
                            }
                        }
                    }
                    if applied {
                        self.events.push(CanvasEvent::ImageLoaded {
                            src: result.src.clone(),
                        });
                        commands.push(Command::RequestRedraw(Layer::All));
                    }
                }
                Err(e) => tracing::warn!("图像源加载失败: {e}"),
            }
        }
        commands
    }

    // ==================== 序列化 ====================

    /// 整场线格式记录
    fn to_scene_record(&self, dataless: bool) -> SceneRecord {
        SceneRecord {
            objects: self
                .objects
                .iter()
                .map(|o| {
                    if dataless {
                        o.to_dataless_object()
                    } else {
                        o.to_object()
                    }
                })
                .collect(),
            background: self
                .background_color
                .map(|c| c.to_rgba_string())
                .unwrap_or_default(),
            background_image: self.background_image.as_ref().map(|i| i.src.clone()),
            background_image_opacity: self.background_image.as_ref().map(|i| i.opacity),
            background_image_stretch: self.background_image.as_ref().map(|i| i.stretch),
            overlay_image: self.overlay_image.as_ref().map(|i| i.src.clone()),
        }
    }

    /// 整场 JSON 值
    pub fn to_object(&self) -> Value {
        serde_json::to_value(self.to_scene_record(false)).unwrap_or(Value::Null)
    }

    /// 整场 JSON 字符串
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.to_scene_record(false)).unwrap_or_default()
    }

    /// dataless 变体：重负载换引用
    pub fn to_dataless_json(&self) -> String {
        serde_json::to_string(&self.to_scene_record(true)).unwrap_or_default()
    }

    /// 从 JSON 重建场景。只有结构性坏载荷（缺 objects 键）才中止；
    /// 单个坏对象告警后跳过。
    pub fn load_from_json(&mut self, json: &str) -> Result<(), LoadError> {
        let value: Value = serde_json::from_str(json)?;
        let entries = value
            .get("objects")
            .and_then(Value::as_array)
            .ok_or(LoadError::MissingObjects)?;

        self.objects.clear();
        for (i, entry) in entries.iter().enumerate() {
            match SceneObject::from_object(entry) {
                Ok(object) => {
                    request_sources(&self.loader, &object);
                    self.objects.push(object);
                }
                Err(e) => tracing::warn!(index = i, "跳过无法加载的对象: {e}"),
            }
        }

        self.background_color = value
            .get("background")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse().ok());

        if let Some(src) = value.get("backgroundImage").and_then(Value::as_str) {
            let opacity = value
                .get("backgroundImageOpacity")
                .and_then(Value::as_f64)
                .unwrap_or(1.0);
            let stretch = value
                .get("backgroundImageStretch")
                .and_then(Value::as_bool)
                .unwrap_or(true);
            self.set_background_image(src, opacity, stretch);
        } else {
            self.background_image = None;
        }
        if let Some(src) = value.get("overlayImage").and_then(Value::as_str) {
            self.set_overlay_image(src);
        } else {
            self.overlay_image = None;
        }
        Ok(())
    }

    /// SVG 1.1 文档导出
    pub fn to_svg(&self) -> String {
        let mut svg = format!(
            "<?xml version=\"1.0\" standalone=\"no\"?>\
             <!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \
             \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\
             <svg xmlns=\"http://www.w3.org/2000/svg\" \
             xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
             version=\"1.1\" width=\"{}\" height=\"{}\">",
            self.width, self.height
        );
        if let Some(color) = self.background_color {
            svg.push_str(&format!(
                "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
                self.width,
                self.height,
                color.to_rgb_string()
            ));
        }
        for object in &self.objects {
            svg.push_str(&object.to_svg());
        }
        svg.push_str("</svg>");
        svg
    }

    /// 把背景层像素编码为 PNG
    pub fn to_png(&self) -> Result<Vec<u8>, RenderError> {
        let pixmap = self
            .context
            .pixmap()
            .ok_or_else(|| RenderError::Encoding("backend has no pixmap".to_string()))?;
        let mut data = Vec::with_capacity((pixmap.width() * pixmap.height() * 4) as usize);
        for px in pixmap.pixels() {
            let d = px.demultiply();
            data.extend_from_slice(&[d.red(), d.green(), d.blue(), d.alpha()]);
        }
        let img = image::RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
            .ok_or_else(|| RenderError::Encoding("pixel buffer mismatch".to_string()))?;
        let mut buf = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| RenderError::Encoding(e.to_string()))?;
        Ok(buf)
    }

    /// 保存 PNG 到文件
    pub fn save_png(&self, path: &Path) -> Result<(), CanvasError> {
        let bytes = self.to_png()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// 递归请求对象树里尚未加载的图像源
fn request_sources(loader: &ImageLoader, object: &SceneObject) {
    match &object.shape {
        Shape::Image { src, pixmap } if pixmap.is_none() => loader.request(src),
        Shape::Group { children } | Shape::PathGroup { children, .. } => {
            for child in children {
                request_sources(loader, child);
            }
        }
        _ => {}
    }
}

/// 把加载完的像素应用到 src 匹配的图像对象；返回是否有改动
fn apply_pixmap(object: &mut SceneObject, src: &str, pixmap: &Arc<Pixmap>) -> bool {
    let natural = (pixmap.width() as f64, pixmap.height() as f64);
    match &mut object.shape {
        Shape::Image {
            src: own,
            pixmap: slot,
        } if own == src && slot.is_none() => {
            *slot = Some(Arc::clone(pixmap));
            if object.width == 0.0 || object.height == 0.0 {
                object.width = natural.0;
                object.height = natural.1;
            }
            object.set_coords();
            true
        }
        Shape::Group { children } | Shape::PathGroup { children, .. } => {
            let mut applied = false;
            for child in children {
                applied |= apply_pixmap(child, src, pixmap);
            }
            applied
        }
        _ => false,
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::shapes;

    #[test]
    fn test_zero_size_canvas_is_hard_error() {
        assert!(StaticCanvas::new(0, 100).is_err());
    }

    #[test]
    fn test_add_remove_and_order() {
        let mut canvas = StaticCanvas::new(100, 100).unwrap();
        let a = canvas.add(shapes::rect(10.0, 10.0, 5.0, 5.0));
        let _b = canvas.add(shapes::rect(20.0, 20.0, 5.0, 5.0));
        assert_eq!(canvas.size(), 2);
        assert_eq!(a, 0);

        let removed = canvas.remove(0).unwrap();
        assert_eq!(removed.left, 10.0);
        assert_eq!(canvas.size(), 1);
        assert!(canvas.remove(5).is_none());
    }

    #[test]
    fn test_z_order_mutations() {
        let mut canvas = StaticCanvas::new(100, 100).unwrap();
        canvas.add(shapes::rect(1.0, 0.0, 5.0, 5.0));
        canvas.add(shapes::rect(2.0, 0.0, 5.0, 5.0));
        canvas.add(shapes::rect(3.0, 0.0, 5.0, 5.0));

        canvas.bring_to_front(0);
        assert_eq!(canvas.get_objects().last().unwrap().left, 1.0);

        canvas.send_to_back(2);
        assert_eq!(canvas.get_objects()[0].left, 1.0);

        let idx = canvas.bring_forward(0).unwrap();
        assert_eq!(idx, 1);
        let idx = canvas.send_backwards(1).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn test_scene_json_round_trip() {
        let mut canvas = StaticCanvas::new(200, 200).unwrap();
        canvas.add(shapes::rect(50.0, 50.0, 20.0, 30.0));
        canvas.add(shapes::circle(100.0, 100.0, 15.0));
        canvas.set_background_color(Some(Color::from_rgb(240, 240, 240)));

        let json = canvas.to_json();
        let mut restored = StaticCanvas::new(200, 200).unwrap();
        restored.load_from_json(&json).unwrap();

        assert_eq!(restored.size(), 2);
        assert_eq!(restored.item(0).unwrap().kind_name(), "rect");
        assert_eq!(restored.item(1).unwrap().kind_name(), "circle");
        assert_eq!(
            restored.background_color,
            Some(Color::from_rgb(240, 240, 240))
        );
    }

    #[test]
    fn test_load_missing_objects_key_aborts() {
        let mut canvas = StaticCanvas::new(100, 100).unwrap();
        let err = canvas.load_from_json("{\"background\":\"\"}").unwrap_err();
        assert!(matches!(err, LoadError::MissingObjects));
    }

    #[test]
    fn test_load_skips_bad_objects() {
        let mut canvas = StaticCanvas::new(100, 100).unwrap();
        let json = r#"{"objects":[
            {"type":"hexagon","left":0,"top":0,"width":1,"height":1,
             "scaleX":1,"scaleY":1,"angle":0,"flipX":false,"flipY":false,
             "opacity":1,"fill":null,"stroke":null,"strokeWidth":1},
            {"type":"rect","left":5,"top":5,"width":10,"height":10,
             "scaleX":1,"scaleY":1,"angle":0,"flipX":false,"flipY":false,
             "opacity":1,"fill":null,"stroke":null,"strokeWidth":1,"rx":0,"ry":0}
        ],"background":""}"#;
        canvas.load_from_json(json).unwrap();
        assert_eq!(canvas.size(), 1);
        assert_eq!(canvas.item(0).unwrap().kind_name(), "rect");
    }

    #[test]
    fn test_render_background_color() {
        let mut canvas = StaticCanvas::new(20, 20).unwrap();
        canvas.set_background_color(Some(Color::from_rgb(255, 0, 0)));
        canvas.render_all();
        let px = canvas
            .context
            .pixmap()
            .unwrap()
            .pixel(10, 10)
            .unwrap()
            .demultiply();
        assert_eq!(px.red(), 255);
        assert!(canvas
            .take_events()
            .contains(&CanvasEvent::AfterRender));
    }

    #[test]
    fn test_degenerate_object_skips_render() {
        let mut canvas = StaticCanvas::new(20, 20).unwrap();
        let mut bad = shapes::rect(10.0, 10.0, 0.0, 10.0);
        bad.fill = Some(Color::from_rgb(255, 0, 0));
        canvas.add(bad);
        canvas.render_all();
        let px = canvas.context.pixmap().unwrap().pixel(10, 10).unwrap();
        assert_eq!(px.alpha(), 0);
    }

    #[test]
    fn test_svg_document_export() {
        let mut canvas = StaticCanvas::new(300, 150).unwrap();
        canvas.add(shapes::rect(10.0, 10.0, 20.0, 20.0));
        let svg = canvas.to_svg();
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains("width=\"300\" height=\"150\""));
        assert!(svg.contains("<rect"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_to_png_encodes() {
        let mut canvas = StaticCanvas::new(10, 10).unwrap();
        canvas.set_background_color(Some(Color::from_rgb(0, 0, 255)));
        canvas.render_all();
        let png = canvas.to_png().unwrap();
        // PNG 魔数
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
