//! 文本对象的外部协作契约
//!
//! 字体光栅化不在引擎内实现。文本引擎是一个两段式契约：
//! 先 `measure` 报告宽/高/行数，文本对象据此更新自身包围盒，
//! 再 `paint` 在对象本地坐标系里绘制。
//!
//! 默认的 [`BoxTextEngine`] 只做等宽近似量度，不产生字形；
//! 宿主应接入真实的排版引擎。

use crate::color::Color;
use crate::render::RenderContext;

/// 文本样式选项包
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font_size: f64,
    pub font_family: String,
    pub font_weight: String,
    pub line_height: f64,
}

/// 引擎回报的量度结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f64,
    pub height: f64,
    pub line_count: usize,
}

/// 文本引擎接口
pub trait TextEngine {
    /// 量度文本；返回的宽高会写回文本对象的包围盒
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics;

    /// 在本地坐标系绘制（原点在对象中心）
    fn paint(
        &self,
        ctx: &mut dyn RenderContext,
        text: &str,
        style: &TextStyle,
        metrics: &TextMetrics,
        fill: Option<Color>,
    );
}

/// 等宽近似引擎：字宽 ≈ 0.55 × 字号
const ADVANCE_RATIO: f64 = 0.55;

/// 默认量度引擎，不绘制字形
#[derive(Debug, Default, Clone, Copy)]
pub struct BoxTextEngine;

impl TextEngine for BoxTextEngine {
    fn measure(&self, text: &str, style: &TextStyle) -> TextMetrics {
        let lines: Vec<&str> = text.split('\n').collect();
        let line_count = lines.len();
        let longest = lines
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        TextMetrics {
            width: longest as f64 * style.font_size * ADVANCE_RATIO,
            height: line_count as f64 * style.font_size * style.line_height,
            line_count,
        }
    }

    fn paint(
        &self,
        _ctx: &mut dyn RenderContext,
        _text: &str,
        _style: &TextStyle,
        _metrics: &TextMetrics,
        _fill: Option<Color>,
    ) {
        // 量度引擎不产生字形
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            font_size: 20.0,
            font_family: "sans-serif".to_string(),
            font_weight: "normal".to_string(),
            line_height: 1.16,
        }
    }

    #[test]
    fn test_measure_single_line() {
        let m = BoxTextEngine.measure("hello", &style());
        assert_eq!(m.line_count, 1);
        assert_eq!(m.width, 5.0 * 20.0 * 0.55);
        assert_eq!(m.height, 20.0 * 1.16);
    }

    #[test]
    fn test_measure_multiline_uses_longest() {
        let m = BoxTextEngine.measure("ab\nlonger line\nx", &style());
        assert_eq!(m.line_count, 3);
        assert_eq!(m.width, 11.0 * 20.0 * 0.55);
        assert_eq!(m.height, 3.0 * 20.0 * 1.16);
    }

    #[test]
    fn test_text_object_updates_box_after_render() {
        use super::super::shapes;
        use crate::render::{RenderContext, SkiaContext};

        let mut obj = shapes::text("hi", 50.0, 50.0);
        assert_eq!(obj.width, 0.0);

        let mut ctx = SkiaContext::new(100, 100).unwrap();
        let engine = BoxTextEngine;
        obj.render(&mut ctx as &mut dyn RenderContext, &engine);

        assert!(obj.width > 0.0);
        assert!(obj.height > 0.0);
    }
}
