//! 线格式（JSON 场景）
//!
//! 对象通过带 type 标签的记录序列化；反序列化按标签直接分发到对应
//! 构造器，而不是按名字查构造函数。数值统一保留两位小数，角度在线
//! 格式里始终是度。

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::color::Color;
use crate::error::LoadError;
use crate::geometry::Point;

use super::shapes::{self, PathCommand, Shape};
use super::text::TextStyle;
use super::SceneObject;

/// 线格式数值取两位小数
pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// 整个场景的持久化布局
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRecord {
    /// 原始 JSON 值：单个坏对象可以跳过而不拖垮整次加载
    pub objects: Vec<Value>,
    #[serde(default)]
    pub background: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image_stretch: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_image: Option<String>,
}

/// 单个对象的线格式记录
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    #[serde(flatten)]
    pub kind: KindRecord,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    /// 线格式始终是度
    pub angle: f64,
    pub flip_x: bool,
    pub flip_y: bool,
    pub opacity: f64,
    pub fill: Option<Color>,
    pub stroke: Option<Color>,
    pub stroke_width: f64,
}

/// type 标签分发的按类型字段
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum KindRecord {
    Rect {
        #[serde(default)]
        rx: f64,
        #[serde(default)]
        ry: f64,
    },
    Circle {
        radius: f64,
    },
    Ellipse {
        rx: f64,
        ry: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Triangle,
    Polygon {
        points: Vec<Point>,
    },
    Polyline {
        points: Vec<Point>,
    },
    #[serde(rename_all = "camelCase")]
    Path {
        path: Vec<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_path: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    PathGroup {
        paths: Vec<ObjectRecord>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_path: Option<String>,
    },
    Group {
        objects: Vec<ObjectRecord>,
    },
    Image {
        src: String,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        font_size: f64,
        #[serde(default)]
        font_family: String,
        #[serde(default)]
        font_weight: String,
        #[serde(default)]
        line_height: f64,
    },
}

/// 指令序列 → ["M",x,y] 风格数组
pub fn commands_to_wire(commands: &[PathCommand]) -> Vec<Value> {
    commands
        .iter()
        .map(|c| match c {
            PathCommand::MoveTo(p) => json!(["M", round2(p.x), round2(p.y)]),
            PathCommand::LineTo(p) => json!(["L", round2(p.x), round2(p.y)]),
            PathCommand::QuadTo(c1, p) => {
                json!(["Q", round2(c1.x), round2(c1.y), round2(p.x), round2(p.y)])
            }
            PathCommand::CubicTo(c1, c2, p) => json!([
                "C",
                round2(c1.x),
                round2(c1.y),
                round2(c2.x),
                round2(c2.y),
                round2(p.x),
                round2(p.y)
            ]),
            PathCommand::Close => json!(["z"]),
        })
        .collect()
}

/// ["M",x,y] 风格数组 → 指令序列
pub fn commands_from_wire(values: &[Value]) -> Result<Vec<PathCommand>, LoadError> {
    let bad = || LoadError::Invalid("malformed path command".to_string());
    values
        .iter()
        .map(|entry| {
            let parts = entry.as_array().ok_or_else(bad)?;
            let op = parts.first().and_then(Value::as_str).ok_or_else(bad)?;
            let num = |i: usize| -> Result<f64, LoadError> {
                parts.get(i).and_then(Value::as_f64).ok_or_else(bad)
            };
            let command = match op {
                "M" => PathCommand::MoveTo(Point::new(num(1)?, num(2)?)),
                "L" => PathCommand::LineTo(Point::new(num(1)?, num(2)?)),
                "Q" => PathCommand::QuadTo(
                    Point::new(num(1)?, num(2)?),
                    Point::new(num(3)?, num(4)?),
                ),
                "C" => PathCommand::CubicTo(
                    Point::new(num(1)?, num(2)?),
                    Point::new(num(3)?, num(4)?),
                    Point::new(num(5)?, num(6)?),
                ),
                "z" | "Z" => PathCommand::Close,
                _ => return Err(bad()),
            };
            Ok(command)
        })
        .collect()
}

fn round_points(points: &[Point]) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point::new(round2(p.x), round2(p.y)))
        .collect()
}

impl SceneObject {
    /// 生成线格式记录。dataless 时路径类对象只保留 sourcePath 引用。
    pub fn to_record(&self, dataless: bool) -> ObjectRecord {
        let kind = match &self.shape {
            Shape::Rect { rx, ry } => KindRecord::Rect {
                rx: round2(*rx),
                ry: round2(*ry),
            },
            Shape::Circle { radius } => KindRecord::Circle {
                radius: round2(*radius),
            },
            Shape::Ellipse { rx, ry } => KindRecord::Ellipse {
                rx: round2(*rx),
                ry: round2(*ry),
            },
            Shape::Line { x1, y1, x2, y2 } => KindRecord::Line {
                x1: round2(*x1),
                y1: round2(*y1),
                x2: round2(*x2),
                y2: round2(*y2),
            },
            Shape::Triangle => KindRecord::Triangle,
            Shape::Polygon { points } => KindRecord::Polygon {
                points: round_points(points),
            },
            Shape::Polyline { points } => KindRecord::Polyline {
                points: round_points(points),
            },
            Shape::Path {
                commands,
                source_path,
            } => KindRecord::Path {
                path: if dataless && source_path.is_some() {
                    Vec::new()
                } else {
                    commands_to_wire(commands)
                },
                source_path: source_path.clone(),
            },
            Shape::PathGroup {
                children,
                source_path,
            } => KindRecord::PathGroup {
                paths: if dataless && source_path.is_some() {
                    Vec::new()
                } else {
                    children.iter().map(|c| c.to_record(dataless)).collect()
                },
                source_path: source_path.clone(),
            },
            Shape::Group { children } => KindRecord::Group {
                objects: children.iter().map(|c| c.to_record(dataless)).collect(),
            },
            Shape::Image { src, .. } => KindRecord::Image { src: src.clone() },
            Shape::Text { text, style } => KindRecord::Text {
                text: text.clone(),
                font_size: round2(style.font_size),
                font_family: style.font_family.clone(),
                font_weight: style.font_weight.clone(),
                line_height: round2(style.line_height),
            },
        };
        ObjectRecord {
            kind,
            left: round2(self.left),
            top: round2(self.top),
            width: round2(self.width),
            height: round2(self.height),
            scale_x: round2(self.scale_x),
            scale_y: round2(self.scale_y),
            angle: round2(self.get_angle()),
            flip_x: self.flip_x,
            flip_y: self.flip_y,
            opacity: round2(self.opacity),
            fill: self.fill,
            stroke: self.stroke,
            stroke_width: round2(self.stroke_width),
        }
    }

    /// 线格式 JSON 值
    pub fn to_object(&self) -> Value {
        serde_json::to_value(self.to_record(false)).unwrap_or(Value::Null)
    }

    /// dataless 变体：重负载换成引用
    pub fn to_dataless_object(&self) -> Value {
        serde_json::to_value(self.to_record(true)).unwrap_or(Value::Null)
    }

    /// 从记录重建对象，按 type 标签分发构造
    pub fn from_record(record: ObjectRecord) -> Result<SceneObject, LoadError> {
        let mut obj = match record.kind {
            KindRecord::Rect { rx, ry } => {
                let mut o = shapes::rect(0.0, 0.0, 0.0, 0.0);
                o.shape = Shape::Rect { rx, ry };
                o
            }
            KindRecord::Circle { radius } => shapes::circle(0.0, 0.0, radius),
            KindRecord::Ellipse { rx, ry } => shapes::ellipse(0.0, 0.0, rx, ry),
            KindRecord::Line { x1, y1, x2, y2 } => shapes::line(x1, y1, x2, y2),
            KindRecord::Triangle => shapes::triangle(0.0, 0.0, 0.0, 0.0),
            KindRecord::Polygon { points } => {
                shapes::polygon(points).map_err(|e| LoadError::Invalid(e.to_string()))?
            }
            KindRecord::Polyline { points } => {
                shapes::polyline(points).map_err(|e| LoadError::Invalid(e.to_string()))?
            }
            KindRecord::Path { path, source_path } => {
                if path.is_empty() && source_path.is_some() {
                    // dataless：负载待加载器按 sourcePath 补齐
                    SceneObject::with_shape(Shape::Path {
                        commands: Vec::new(),
                        source_path,
                    })
                } else {
                    let commands = commands_from_wire(&path)?;
                    let mut o = shapes::path(commands)
                        .map_err(|e| LoadError::Invalid(e.to_string()))?;
                    if let Shape::Path {
                        source_path: sp, ..
                    } = &mut o.shape
                    {
                        *sp = source_path;
                    }
                    o
                }
            }
            KindRecord::PathGroup { paths, source_path } => {
                let children = paths
                    .into_iter()
                    .map(SceneObject::from_record)
                    .collect::<Result<Vec<_>, _>>()?;
                SceneObject::with_shape(Shape::PathGroup {
                    children,
                    source_path,
                })
            }
            KindRecord::Group { objects } => {
                let children = objects
                    .into_iter()
                    .map(SceneObject::from_record)
                    .collect::<Result<Vec<_>, _>>()?;
                SceneObject::with_shape(Shape::Group { children })
            }
            KindRecord::Image { src } => shapes::image(&src),
            KindRecord::Text {
                text,
                font_size,
                font_family,
                font_weight,
                line_height,
            } => {
                let mut o = shapes::text(&text, 0.0, 0.0);
                if let Shape::Text { style, .. } = &mut o.shape {
                    *style = TextStyle {
                        font_size,
                        font_family: if font_family.is_empty() {
                            crate::constants::DEFAULT_FONT_FAMILY.to_string()
                        } else {
                            font_family
                        },
                        font_weight: if font_weight.is_empty() {
                            "normal".to_string()
                        } else {
                            font_weight
                        },
                        line_height: if line_height == 0.0 {
                            crate::constants::DEFAULT_LINE_HEIGHT
                        } else {
                            line_height
                        },
                    };
                }
                o
            }
        };

        obj.left = record.left;
        obj.top = record.top;
        obj.width = record.width;
        obj.height = record.height;
        obj.scale_x = record.scale_x;
        obj.scale_y = record.scale_y;
        obj.set_angle(record.angle);
        obj.flip_x = record.flip_x;
        obj.flip_y = record.flip_y;
        obj.opacity = record.opacity;
        obj.fill = record.fill;
        obj.stroke = record.stroke;
        obj.stroke_width = record.stroke_width;
        obj.set_coords();
        Ok(obj)
    }

    /// 从线格式 JSON 值重建对象
    pub fn from_object(value: &Value) -> Result<SceneObject, LoadError> {
        let record: ObjectRecord = serde_json::from_value(value.clone())?;
        SceneObject::from_record(record)
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_wire_shape() {
        let r = shapes::rect(100.0, 100.0, 50.0, 50.0);
        let value = r.to_object();
        assert_eq!(value["type"], "rect");
        assert_eq!(value["left"], 100.0);
        assert_eq!(value["width"], 50.0);
        assert_eq!(value["scaleX"], 1.0);
        assert_eq!(value["angle"], 0.0);
        assert_eq!(value["flipX"], false);
        assert_eq!(value["strokeWidth"], 1.0);
    }

    #[test]
    fn test_numbers_rounded_to_two_digits() {
        let mut r = shapes::rect(10.0, 10.0, 5.0, 5.0);
        r.left = 1.23456;
        r.set_angle(33.33333);
        let value = r.to_object();
        assert_eq!(value["left"], 1.23);
        assert_eq!(value["angle"], 33.33);
    }

    #[test]
    fn test_round_trip_preserves_state() {
        let mut c = shapes::circle(42.5, 17.25, 20.0);
        c.scale_x = 1.5;
        c.set_angle(45.0);
        c.opacity = 0.75;
        c.stroke = Some(Color::from_rgb(10, 20, 30));
        let value = c.to_object();

        let back = SceneObject::from_object(&value).unwrap();
        assert_eq!(back.kind_name(), "circle");
        assert_eq!(back.left, 42.5);
        assert_eq!(back.top, 17.25);
        assert_eq!(back.scale_x, 1.5);
        assert_eq!(back.get_angle(), 45.0);
        assert_eq!(back.opacity, 0.75);
        assert_eq!(back.stroke, Some(Color::from_rgb(10, 20, 30)));
        // 内部弧度保持同步
        assert!((back.theta() - std::f64::consts::FRAC_PI_4).abs() < 1e-9);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let value = json!({
            "type": "hexagon",
            "left": 0.0, "top": 0.0, "width": 1.0, "height": 1.0,
            "scaleX": 1.0, "scaleY": 1.0, "angle": 0.0,
            "flipX": false, "flipY": false, "opacity": 1.0,
            "fill": null, "stroke": null, "strokeWidth": 1.0
        });
        assert!(SceneObject::from_object(&value).is_err());
    }

    #[test]
    fn test_path_commands_round_trip() {
        let commands = vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::CubicTo(
                Point::new(1.0, 2.0),
                Point::new(3.0, 4.0),
                Point::new(5.0, 6.0),
            ),
            PathCommand::Close,
        ];
        let wire = commands_to_wire(&commands);
        let back = commands_from_wire(&wire).unwrap();
        assert_eq!(back, commands);
    }

    #[test]
    fn test_dataless_path_keeps_reference_only() {
        let mut p = shapes::path(vec![
            PathCommand::MoveTo(Point::new(0.0, 0.0)),
            PathCommand::LineTo(Point::new(10.0, 10.0)),
        ])
        .unwrap();
        if let Shape::Path { source_path, .. } = &mut p.shape {
            *source_path = Some("shapes/arrow.svg".to_string());
        }
        let value = p.to_dataless_object();
        assert_eq!(value["sourcePath"], "shapes/arrow.svg");
        assert_eq!(value["path"].as_array().unwrap().len(), 0);

        // dataless 记录可以重建（负载待补）
        let back = SceneObject::from_object(&value).unwrap();
        assert_eq!(back.kind_name(), "path");
    }

    #[test]
    fn test_group_nests_children() {
        let a = shapes::rect(0.0, 0.0, 10.0, 10.0);
        let b = shapes::circle(20.0, 20.0, 5.0);
        let group = super::super::group::make_group(vec![a, b]).unwrap();
        let value = group.to_object();
        assert_eq!(value["type"], "group");
        assert_eq!(value["objects"].as_array().unwrap().len(), 2);

        let back = SceneObject::from_object(&value).unwrap();
        assert_eq!(back.group_size(), 2);
    }
}
