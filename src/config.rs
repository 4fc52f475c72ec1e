//! 引擎配置
//!
//! 选择框与手柄的外观、自由绘制画笔默认值。
//! 从 JSON 文件读写；读取失败回落到默认值并告警。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::constants::{
    CORNER_SIZE, COLOR_CORNER_BORDER, COLOR_CORNER_FILL, COLOR_OBJECT_BORDER,
    COLOR_SELECTION_BORDER, COLOR_SELECTION_FILL, DEFAULT_FREE_DRAW_COLOR,
    DEFAULT_FREE_DRAW_WIDTH, SELECTION_DASH,
};
use crate::error::CanvasError;

/// 画布配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// 橡皮筋选区的填充色
    pub selection_color: Color,
    /// 橡皮筋选区的边框色
    pub selection_border_color: Color,
    pub selection_line_width: f64,
    /// 选区边框虚线样式；空为实线
    pub selection_dash: Vec<f64>,
    /// 活动对象边框色
    pub border_color: Color,
    pub corner_color: Color,
    pub corner_border_color: Color,
    pub corner_size: f64,
    pub free_draw_color: Color,
    pub free_draw_width: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            selection_color: COLOR_SELECTION_FILL,
            selection_border_color: COLOR_SELECTION_BORDER,
            selection_line_width: 1.0,
            selection_dash: SELECTION_DASH.to_vec(),
            border_color: COLOR_OBJECT_BORDER,
            corner_color: COLOR_CORNER_FILL,
            corner_border_color: COLOR_CORNER_BORDER,
            corner_size: CORNER_SIZE,
            free_draw_color: DEFAULT_FREE_DRAW_COLOR,
            free_draw_width: DEFAULT_FREE_DRAW_WIDTH,
        }
    }
}

impl CanvasConfig {
    /// 从文件加载；任何失败回落到默认配置
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("配置解析失败，使用默认值: {e}");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// 保存到文件
    pub fn save(&self, path: &Path) -> Result<(), CanvasError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| CanvasError::Config(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_constants() {
        let config = CanvasConfig::default();
        assert_eq!(config.corner_size, CORNER_SIZE);
        assert_eq!(config.free_draw_width, DEFAULT_FREE_DRAW_WIDTH);
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = CanvasConfig::load(Path::new("/nonexistent/scene_canvas.json"));
        assert_eq!(config.corner_size, CanvasConfig::default().corner_size);
    }

    #[test]
    fn test_json_round_trip() {
        let config = CanvasConfig::default();
        let text = serde_json::to_string(&config).unwrap();
        let back: CanvasConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back.selection_color, config.selection_color);
        assert_eq!(back.selection_dash, config.selection_dash);
    }
}
