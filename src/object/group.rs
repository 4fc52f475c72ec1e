//! 多选编组
//!
//! 编组在多选时临时生成：成员坐标转换到编组本地空间（编组中心为
//! 原点），解散时把编组自身的变换应用回每个成员。
//!
//! 不变量：对编组未施加任何变换时，解散必须逐属性还原成员的
//! left/top/scaleX/scaleY/angle。

use crate::error::ObjectError;
use crate::geometry::Point;

use super::shapes::Shape;
use super::SceneObject;

/// 成员旋转包围盒的合并范围：中心点与宽高。
/// 会先为每个成员重算角点缓存。
pub fn bounds_of(members: &mut [SceneObject]) -> Result<(Point, f64, f64), ObjectError> {
    if members.is_empty() {
        return Err(ObjectError::EmptyPoints);
    }
    let mut min = Point::new(f64::MAX, f64::MAX);
    let mut max = Point::new(f64::MIN, f64::MIN);
    for member in members.iter_mut() {
        member.set_coords();
        if let Some((lo, hi)) = member.bounding_rect() {
            min = min.min(&lo);
            max = max.max(&hi);
        }
    }
    Ok((min.midpoint_from(&max), max.x - min.x, max.y - min.y))
}

/// 由成员列表合成编组；left/top 取合并包围盒的中点，
/// 成员坐标改为相对编组中心。
pub fn make_group(mut members: Vec<SceneObject>) -> Result<SceneObject, ObjectError> {
    let (center, width, height) = bounds_of(&mut members)?;
    for member in &mut members {
        member.left -= center.x;
        member.top -= center.y;
        member.active = false;
        member.invalidate_coords();
    }
    let mut group = SceneObject::with_shape(Shape::Group { children: members });
    group.left = center.x;
    group.top = center.y;
    group.width = width;
    group.height = height;
    group.fill = None;
    Ok(group)
}

/// 解散编组：把编组的缩放/旋转/平移施加到每个成员，
/// 返回恢复为绝对坐标的成员列表。
pub fn destroy_group(group: SceneObject) -> Vec<SceneObject> {
    let Shape::Group { children } = group.shape else {
        return Vec::new();
    };
    let theta = group.theta;
    let (sin_th, cos_th) = theta.sin_cos();
    let angle = group.angle;
    children
        .into_iter()
        .map(|mut member| {
            let rx = member.left * group.scale_x;
            let ry = member.top * group.scale_y;
            member.left = group.left + rx * cos_th - ry * sin_th;
            member.top = group.top + rx * sin_th + ry * cos_th;
            member.scale_x *= group.scale_x;
            member.scale_y *= group.scale_y;
            member.set_angle(member.get_angle() + angle);
            member.set_coords();
            member
        })
        .collect()
}

impl SceneObject {
    pub(crate) fn group_children(&self) -> Option<&[SceneObject]> {
        match &self.shape {
            Shape::Group { children } => Some(children),
            _ => None,
        }
    }

    /// 编组成员数量；非编组为 0
    pub fn group_size(&self) -> usize {
        self.group_children().map_or(0, <[SceneObject]>::len)
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::super::shapes;
    use super::*;

    #[test]
    fn test_group_bounds_cover_members() {
        let a = shapes::rect(50.0, 50.0, 20.0, 20.0);
        let b = shapes::rect(110.0, 90.0, 20.0, 20.0);
        let group = make_group(vec![a, b]).unwrap();

        // a 覆盖 [40,60]，b 覆盖 [100,120]/[80,100]
        assert_eq!((group.left, group.top), (80.0, 70.0));
        assert_eq!((group.width, group.height), (80.0, 60.0));
    }

    #[test]
    fn test_members_relative_to_group_center() {
        let a = shapes::rect(50.0, 50.0, 20.0, 20.0);
        let b = shapes::rect(110.0, 90.0, 20.0, 20.0);
        let group = make_group(vec![a, b]).unwrap();
        let children = group.group_children().unwrap();
        assert_eq!((children[0].left, children[0].top), (-30.0, -20.0));
        assert_eq!((children[1].left, children[1].top), (30.0, 20.0));
    }

    #[test]
    fn test_destroy_without_transform_restores_exactly() {
        let mut a = shapes::rect(50.0, 50.0, 20.0, 20.0);
        a.set_angle(15.0);
        a.scale_x = 2.0;
        let b = shapes::circle(110.0, 90.0, 10.0);

        let before: Vec<(f64, f64, f64, f64, f64)> = [&a, &b]
            .iter()
            .map(|o| (o.left, o.top, o.scale_x, o.scale_y, o.get_angle()))
            .collect();

        let group = make_group(vec![a, b]).unwrap();
        let restored = destroy_group(group);

        for (obj, saved) in restored.iter().zip(before) {
            assert!((obj.left - saved.0).abs() < 1e-9);
            assert!((obj.top - saved.1).abs() < 1e-9);
            assert_eq!(obj.scale_x, saved.2);
            assert_eq!(obj.scale_y, saved.3);
            assert_eq!(obj.get_angle(), saved.4);
        }
    }

    #[test]
    fn test_destroy_applies_group_translation() {
        let a = shapes::rect(50.0, 50.0, 20.0, 20.0);
        let b = shapes::rect(110.0, 90.0, 20.0, 20.0);
        let mut group = make_group(vec![a, b]).unwrap();
        group.left += 25.0;
        group.top -= 10.0;

        let restored = destroy_group(group);
        assert_eq!((restored[0].left, restored[0].top), (75.0, 40.0));
        assert_eq!((restored[1].left, restored[1].top), (135.0, 80.0));
    }

    #[test]
    fn test_destroy_applies_group_scale_and_rotation() {
        let a = shapes::rect(50.0, 50.0, 20.0, 20.0);
        let b = shapes::rect(110.0, 90.0, 20.0, 20.0);
        let mut group = make_group(vec![a, b]).unwrap();
        group.scale_x = 2.0;
        group.scale_y = 2.0;
        group.set_angle(90.0);

        let restored = destroy_group(group);
        // 成员 a 原相对坐标 (-30,-20)，缩放后 (-60,-40)，旋转 90° 后 (40,-60)
        assert!((restored[0].left - (80.0 + 40.0)).abs() < 1e-9);
        assert!((restored[0].top - (70.0 - 60.0)).abs() < 1e-9);
        assert_eq!(restored[0].scale_x, 2.0);
        assert_eq!(restored[0].get_angle(), 90.0);
    }
}
