//! 线段与多边形相交检测
//!
//! 框选（橡皮筋）判定使用：选区矩形与对象外接四边形相交、
//! 或对象完全落在选区内，均计为命中。

use super::point::Point;

/// 相交状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionStatus {
    /// 存在交点
    Intersection,
    /// 无交点
    NoIntersection,
    /// 两线段平行
    Parallel,
    /// 两线段共线
    Coincident,
}

/// 相交检测结果：状态 + 交点集合
#[derive(Debug, Clone)]
pub struct Intersection {
    pub status: IntersectionStatus,
    pub points: Vec<Point>,
}

impl Intersection {
    fn new(status: IntersectionStatus) -> Self {
        Self {
            status,
            points: Vec::new(),
        }
    }

    fn append_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// 线段 a1-a2 与线段 b1-b2 的相交检测
    pub fn intersect_line_line(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Intersection {
        let ua_t = (b2.x - b1.x) * (a1.y - b1.y) - (b2.y - b1.y) * (a1.x - b1.x);
        let ub_t = (a2.x - a1.x) * (a1.y - b1.y) - (a2.y - a1.y) * (a1.x - b1.x);
        let u_b = (b2.y - b1.y) * (a2.x - a1.x) - (b2.x - b1.x) * (a2.y - a1.y);

        if u_b != 0.0 {
            let ua = ua_t / u_b;
            let ub = ub_t / u_b;
            if (0.0..=1.0).contains(&ua) && (0.0..=1.0).contains(&ub) {
                let mut result = Intersection::new(IntersectionStatus::Intersection);
                result.append_point(Point::new(
                    a1.x + ua * (a2.x - a1.x),
                    a1.y + ua * (a2.y - a1.y),
                ));
                result
            } else {
                Intersection::new(IntersectionStatus::NoIntersection)
            }
        } else if ua_t == 0.0 || ub_t == 0.0 {
            Intersection::new(IntersectionStatus::Coincident)
        } else {
            Intersection::new(IntersectionStatus::Parallel)
        }
    }

    /// 线段与多边形（顶点序列按边闭合）的相交检测
    pub fn intersect_line_polygon(a1: &Point, a2: &Point, points: &[Point]) -> Intersection {
        let mut result = Intersection::new(IntersectionStatus::NoIntersection);
        let length = points.len();
        for i in 0..length {
            let b1 = &points[i];
            let b2 = &points[(i + 1) % length];
            let inter = Self::intersect_line_line(a1, a2, b1, b2);
            result.points.extend(inter.points);
        }
        if !result.points.is_empty() {
            result.status = IntersectionStatus::Intersection;
        }
        result
    }

    /// 多边形与多边形的相交检测
    pub fn intersect_polygon_polygon(points1: &[Point], points2: &[Point]) -> Intersection {
        let mut result = Intersection::new(IntersectionStatus::NoIntersection);
        let length = points1.len();
        for i in 0..length {
            let a1 = &points1[i];
            let a2 = &points1[(i + 1) % length];
            let inter = Self::intersect_line_polygon(a1, a2, points2);
            result.points.extend(inter.points);
        }
        if !result.points.is_empty() {
            result.status = IntersectionStatus::Intersection;
        }
        result
    }

    /// 多边形与轴对齐矩形（r1 左上 / r2 右下）的相交检测
    pub fn intersect_polygon_rectangle(points: &[Point], r1: &Point, r2: &Point) -> Intersection {
        let min = r1.min(r2);
        let max = r1.max(r2);
        let top_right = Point::new(max.x, min.y);
        let bottom_left = Point::new(min.x, max.y);
        let rect = [min, top_right, max, bottom_left];
        Self::intersect_polygon_polygon(points, &rect)
    }
}

// ==================== 单元测试 ====================
