//! 自由绘制
//!
//! 指针采样累积成折线，松开时转换为路径对象。
//! 零长度（不足两个去重点）的涂画直接丢弃。

use crate::color::Color;
use crate::geometry::Point;
use crate::object::{shapes, PathCommand, SceneObject};

/// 把采样点转成路径对象；退化涂画返回 None
pub(crate) fn path_from_points(
    points: &[Point],
    color: Color,
    width: f64,
) -> Option<SceneObject> {
    // 去掉连续重复的采样
    let mut deduped: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if deduped.last().map(|last| last.eq(p)) != Some(true) {
            deduped.push(*p);
        }
    }
    if deduped.len() < 2 {
        return None;
    }

    let mut commands = Vec::with_capacity(deduped.len());
    let mut iter = deduped.into_iter();
    commands.push(PathCommand::MoveTo(iter.next().unwrap()));
    commands.extend(iter.map(PathCommand::LineTo));

    let mut obj = shapes::path(commands).ok()?;
    obj.fill = None;
    obj.stroke = Some(color);
    obj.stroke_width = width;
    obj.set_coords();
    Some(obj)
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_becomes_path() {
        let points = [
            Point::new(10.0, 10.0),
            Point::new(20.0, 15.0),
            Point::new(30.0, 40.0),
        ];
        let obj = path_from_points(&points, Color::from_rgb(0, 0, 0), 2.0).unwrap();
        assert_eq!(obj.kind_name(), "path");
        assert_eq!((obj.left, obj.top), (20.0, 25.0));
        assert_eq!(obj.stroke_width, 2.0);
        assert!(obj.fill.is_none());
    }

    #[test]
    fn test_zero_length_stroke_skipped() {
        let p = Point::new(5.0, 5.0);
        assert!(path_from_points(&[p, p, p], Color::from_rgb(0, 0, 0), 2.0).is_none());
        assert!(path_from_points(&[p], Color::from_rgb(0, 0, 0), 2.0).is_none());
        assert!(path_from_points(&[], Color::from_rgb(0, 0, 0), 2.0).is_none());
    }
}
