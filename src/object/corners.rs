//! 角点缓存与命中测试
//!
//! `set_coords()` 根据 left/top/width/height/scaleX/scaleY/theta 计算
//! 旋转包围盒的四角、四边中点和两个旋转手柄锚点，并为每个点生成
//! 随对象旋转的小命中四边形。缓存仅在调用后立即有效。
//!
//! 命中测试用水平射线的交点计数法（crossing number），垂直边单独
//! 处理避免除零。

use crate::constants::{CORNER_SIZE, ROTATE_HANDLE_OFFSET};
use crate::geometry::{Intersection, IntersectionStatus, Point};

use super::SceneObject;

/// 控制点：锚点坐标 + 命中四边形
#[derive(Debug, Clone, Copy)]
pub struct ControlPoint {
    pub point: Point,
    /// 随对象旋转的正方形命中区（tl,tr,br,bl 顺序）
    pub corner: [Point; 4],
}

/// 八个边角/中点手柄 + 两个旋转手柄
#[derive(Debug, Clone, Copy)]
pub struct CornerCoords {
    pub tl: ControlPoint,
    pub tr: ControlPoint,
    pub br: ControlPoint,
    pub bl: ControlPoint,
    pub ml: ControlPoint,
    pub mt: ControlPoint,
    pub mr: ControlPoint,
    pub mb: ControlPoint,
    pub mtr: ControlPoint,
    pub mbr: ControlPoint,
}

/// 手柄标识，检测顺序固定（并列时取先者，不按面积/距离）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomRight,
    BottomLeft,
    MidLeft,
    MidTop,
    MidRight,
    MidBottom,
    RotateTop,
    RotateBottom,
}

/// 固定检测顺序
const CORNER_ORDER: [Corner; 10] = [
    Corner::TopLeft,
    Corner::TopRight,
    Corner::BottomRight,
    Corner::BottomLeft,
    Corner::MidLeft,
    Corner::MidTop,
    Corner::MidRight,
    Corner::MidBottom,
    Corner::RotateTop,
    Corner::RotateBottom,
];

impl CornerCoords {
    pub fn control(&self, corner: Corner) -> &ControlPoint {
        match corner {
            Corner::TopLeft => &self.tl,
            Corner::TopRight => &self.tr,
            Corner::BottomRight => &self.br,
            Corner::BottomLeft => &self.bl,
            Corner::MidLeft => &self.ml,
            Corner::MidTop => &self.mt,
            Corner::MidRight => &self.mr,
            Corner::MidBottom => &self.mb,
            Corner::RotateTop => &self.mtr,
            Corner::RotateBottom => &self.mbr,
        }
    }

    /// 外接四边形顶点（tl→tr→br→bl）
    pub fn outline(&self) -> [Point; 4] {
        [self.tl.point, self.tr.point, self.br.point, self.bl.point]
    }
}

/// 以 center 为中心、随 theta 旋转的正方形命中区
fn corner_quad(center: Point, sin_th: f64, cos_th: f64, size: f64) -> [Point; 4] {
    let half = size / 2.0;
    let dx = Point::new(cos_th * half, sin_th * half);
    let dy = Point::new(-sin_th * half, cos_th * half);
    [
        center.subtract(&dx).subtract(&dy),
        center.add(&dx).subtract(&dy),
        center.add(&dx).add(&dy),
        center.subtract(&dx).add(&dy),
    ]
}

/// 水平射线与四边形各边的交点计数；奇数在内。
/// 垂直边直接取其 x，避免斜率除零。
fn find_cross_points(ex: f64, ey: f64, quad: &[Point; 4]) -> u32 {
    let mut count = 0;
    for i in 0..4 {
        let o1 = quad[i];
        let o2 = quad[(i + 1) % 4];
        // y 区间不跨过射线的边不参与
        if (o1.y < ey && o2.y < ey) || (o1.y >= ey && o2.y >= ey) {
            continue;
        }
        let xi = if o1.x == o2.x {
            o1.x
        } else {
            let slope = (o2.y - o1.y) / (o2.x - o1.x);
            o1.x + (ey - o1.y) / slope
        };
        if xi >= ex {
            count += 1;
        }
    }
    count
}

impl SceneObject {
    /// 重算角点缓存。
    ///
    /// 前置顺序（显式约定）：先由 width/height × scale 得出当前缩放
    /// 尺寸，再据其推导角点，最后生成每个角的命中四边形。
    /// 零宽或零高为退化盒：全部点塌缩到中心，不产生算术错误。
    pub fn set_coords(&mut self) {
        let w = self.width * self.scale_x;
        let h = self.height * self.scale_y;
        let theta = self.theta;
        let (sin_th, cos_th) = theta.sin_cos();
        let center = Point::new(self.left, self.top);

        let make = |p: Point| ControlPoint {
            point: p,
            corner: corner_quad(p, sin_th, cos_th, CORNER_SIZE),
        };

        if w == 0.0 || h == 0.0 {
            let cp = make(center);
            self.coords = Some(CornerCoords {
                tl: cp,
                tr: cp,
                br: cp,
                bl: cp,
                ml: cp,
                mt: cp,
                mr: cp,
                mb: cp,
                mtr: cp,
                mbr: cp,
            });
            return;
        }

        let hyp = (w / 2.0).hypot(h / 2.0);
        let ang = (h / w).atan();
        let offset_x = (ang + theta).cos() * hyp;
        let offset_y = (ang + theta).sin() * hyp;

        let tl = Point::new(self.left - offset_x, self.top - offset_y);
        let tr = Point::new(tl.x + w * cos_th, tl.y + w * sin_th);
        let br = Point::new(tr.x - h * sin_th, tr.y + h * cos_th);
        let bl = Point::new(tl.x - h * sin_th, tl.y + h * cos_th);
        let ml = tl.midpoint_from(&bl);
        let mt = tl.midpoint_from(&tr);
        let mr = tr.midpoint_from(&br);
        let mb = bl.midpoint_from(&br);
        // 旋转手柄沿旋转后的上向量偏移固定像素距离
        let mtr = Point::new(
            mt.x + ROTATE_HANDLE_OFFSET * sin_th,
            mt.y - ROTATE_HANDLE_OFFSET * cos_th,
        );
        let mbr = Point::new(
            mb.x - ROTATE_HANDLE_OFFSET * sin_th,
            mb.y + ROTATE_HANDLE_OFFSET * cos_th,
        );

        self.coords = Some(CornerCoords {
            tl: make(tl),
            tr: make(tr),
            br: make(br),
            bl: make(bl),
            ml: make(ml),
            mt: make(mt),
            mr: make(mr),
            mb: make(mb),
            mtr: make(mtr),
            mbr: make(mbr),
        });
    }

    /// 角点缓存（仅 set_coords() 后有效）
    pub fn corner_coords(&self) -> Option<&CornerCoords> {
        self.coords.as_ref()
    }

    /// 指针是否在对象的旋转包围盒内
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let Some(coords) = &self.coords else {
            return false;
        };
        let count = find_cross_points(x, y, &coords.outline());
        count % 2 == 1
    }

    /// 指针命中的控制手柄。按固定顺序返回第一个命中者；
    /// 旋转手柄仅在 has_rotating_point 时参与。
    pub fn find_target_corner(&self, x: f64, y: f64) -> Option<Corner> {
        if !self.has_controls {
            return None;
        }
        let coords = self.coords.as_ref()?;
        for corner in CORNER_ORDER {
            if matches!(corner, Corner::RotateTop | Corner::RotateBottom)
                && !self.has_rotating_point
            {
                continue;
            }
            let quad = &coords.control(corner).corner;
            if find_cross_points(x, y, quad) % 2 == 1 {
                return Some(corner);
            }
        }
        None
    }

    /// 外接四边形是否与选区矩形（tl/br）相交
    pub fn intersects_with_rect(&self, tl: &Point, br: &Point) -> bool {
        let Some(coords) = &self.coords else {
            return false;
        };
        let result = Intersection::intersect_polygon_rectangle(&coords.outline(), tl, br);
        result.status == IntersectionStatus::Intersection
    }

    /// 外接四边形是否完全落在选区矩形内
    pub fn is_contained_within_rect(&self, tl: &Point, br: &Point) -> bool {
        let Some(coords) = &self.coords else {
            return false;
        };
        let (min, max) = self.bounding_extent(coords);
        min.x >= tl.x && max.x <= br.x && min.y >= tl.y && max.y <= br.y
    }

    /// 四角的轴对齐包围范围
    fn bounding_extent(&self, coords: &CornerCoords) -> (Point, Point) {
        let pts = coords.outline();
        let mut min = pts[0];
        let mut max = pts[0];
        for p in &pts[1..] {
            min = min.min(p);
            max = max.max(p);
        }
        (min, max)
    }

    /// 四角的轴对齐包围盒（min, max）
    pub fn bounding_rect(&self) -> Option<(Point, Point)> {
        self.coords.as_ref().map(|c| self.bounding_extent(c))
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::super::shapes;
    use super::*;

    fn rect_at(left: f64, top: f64, w: f64, h: f64) -> SceneObject {
        let mut obj = shapes::rect(left, top, w, h);
        obj.set_coords();
        obj
    }

    #[test]
    fn test_corner_symmetry_unrotated() {
        let obj = rect_at(100.0, 100.0, 60.0, 40.0);
        let c = obj.corner_coords().unwrap();

        assert!((c.tr.point.x - c.tl.point.x - 60.0).abs() < 1e-9);
        assert!((c.bl.point.y - c.tl.point.y - 40.0).abs() < 1e-9);

        // 中点是相邻角的精确算术平均
        assert_eq!(c.mt.point, c.tl.point.midpoint_from(&c.tr.point));
        assert_eq!(c.ml.point, c.tl.point.midpoint_from(&c.bl.point));
        assert_eq!(c.mr.point, c.tr.point.midpoint_from(&c.br.point));
        assert_eq!(c.mb.point, c.bl.point.midpoint_from(&c.br.point));
    }

    #[test]
    fn test_rotate_handle_offset() {
        let obj = rect_at(0.0, 0.0, 50.0, 30.0);
        let c = obj.corner_coords().unwrap();
        // 未旋转时旋转手柄在上边中点正上方 40px
        assert!((c.mtr.point.x - c.mt.point.x).abs() < 1e-9);
        assert!((c.mt.point.y - c.mtr.point.y - 40.0).abs() < 1e-9);
        // 对称的下手柄
        assert!((c.mbr.point.y - c.mb.point.y - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_box_collapses_to_center() {
        let mut obj = shapes::rect(10.0, 20.0, 0.0, 40.0);
        obj.set_coords();
        let c = obj.corner_coords().unwrap();
        assert_eq!(c.tl.point, Point::new(10.0, 20.0));
        assert_eq!(c.br.point, Point::new(10.0, 20.0));
    }

    #[test]
    fn test_contains_point_center_and_outside() {
        let obj = rect_at(100.0, 100.0, 50.0, 50.0);
        assert!(obj.contains_point(100.0, 100.0));
        // 任一边外一像素
        assert!(!obj.contains_point(100.0, 126.0));
        assert!(!obj.contains_point(126.0, 100.0));
        assert!(!obj.contains_point(74.0, 100.0));
    }

    #[test]
    fn test_contains_point_after_rotation() {
        let mut obj = rect_at(100.0, 100.0, 50.0, 50.0);
        obj.set_angle(45.0);
        obj.set_coords();

        // 中心始终在内
        assert!(obj.contains_point(100.0, 100.0));
        // 旋转 45° 后原角落位置已在盒外
        assert!(!obj.contains_point(124.0, 124.0));
        // 旋转后的顶点方向在内（对角线半径约 35.36）
        assert!(obj.contains_point(100.0, 130.0));
    }

    #[test]
    fn test_find_target_corner_fixed_order() {
        let obj = rect_at(100.0, 100.0, 50.0, 50.0);
        let c = obj.corner_coords().unwrap();
        let tl = c.tl.point;
        assert_eq!(
            obj.find_target_corner(tl.x, tl.y),
            Some(Corner::TopLeft)
        );
        let mtr = c.mtr.point;
        assert_eq!(
            obj.find_target_corner(mtr.x, mtr.y),
            Some(Corner::RotateTop)
        );
    }

    #[test]
    fn test_rotate_handles_skipped_without_flag() {
        let mut obj = rect_at(100.0, 100.0, 50.0, 50.0);
        obj.has_rotating_point = false;
        obj.set_coords();
        let mtr = obj.corner_coords().unwrap().mtr.point;
        assert_eq!(obj.find_target_corner(mtr.x, mtr.y), None);
    }

    #[test]
    fn test_stale_cache_misses() {
        let mut obj = rect_at(100.0, 100.0, 50.0, 50.0);
        obj.set_angle(45.0);
        // set_angle 使缓存失效，重新 set_coords 前不可命中
        assert!(!obj.contains_point(100.0, 100.0));
    }
}
