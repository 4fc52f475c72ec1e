//! 二维点
//!
//! 值语义的标量对。算术方法返回新值，`*_equals` 变体原地修改。

use serde::{Deserialize, Serialize};

/// 二维点（父坐标系）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// 创建新的点
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    pub fn add_equals(&mut self, other: &Point) -> &mut Self {
        self.x += other.x;
        self.y += other.y;
        self
    }

    pub fn subtract(&self, other: &Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }

    pub fn subtract_equals(&mut self, other: &Point) -> &mut Self {
        self.x -= other.x;
        self.y -= other.y;
        self
    }

    pub fn multiply(&self, scalar: f64) -> Point {
        Point::new(self.x * scalar, self.y * scalar)
    }

    pub fn multiply_equals(&mut self, scalar: f64) -> &mut Self {
        self.x *= scalar;
        self.y *= scalar;
        self
    }

    pub fn divide(&self, scalar: f64) -> Point {
        Point::new(self.x / scalar, self.y / scalar)
    }

    pub fn divide_equals(&mut self, scalar: f64) -> &mut Self {
        self.x /= scalar;
        self.y /= scalar;
        self
    }

    /// 朝 other 方向线性插值，t ∈ [0,1]
    pub fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    /// 与 other 的中点，等价于 lerp(other, 0.5)
    pub fn midpoint_from(&self, other: &Point) -> Point {
        self.lerp(other, 0.5)
    }

    pub fn distance_from(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 逐分量最小值
    pub fn min(&self, other: &Point) -> Point {
        Point::new(self.x.min(other.x), self.y.min(other.y))
    }

    /// 逐分量最大值
    pub fn max(&self, other: &Point) -> Point {
        Point::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn eq(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub fn set_xy(&mut self, x: f64, y: f64) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    /// 与 other 交换坐标
    pub fn swap(&mut self, other: &mut Point) {
        std::mem::swap(&mut self.x, &mut other.x);
        std::mem::swap(&mut self.y, &mut other.y);
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(3.0, 5.0);

        assert_eq!(a.add(&b), Point::new(4.0, 7.0));
        assert_eq!(b.subtract(&a), Point::new(2.0, 3.0));
        assert_eq!(a.multiply(2.0), Point::new(2.0, 4.0));
        assert_eq!(b.divide(2.0), Point::new(1.5, 2.5));
    }

    #[test]
    fn test_point_mutating_variants() {
        let mut a = Point::new(1.0, 1.0);
        a.add_equals(&Point::new(2.0, 3.0));
        assert_eq!(a, Point::new(3.0, 4.0));

        a.multiply_equals(2.0);
        assert_eq!(a, Point::new(6.0, 8.0));
    }

    #[test]
    fn test_point_lerp_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 20.0);

        assert_eq!(a.lerp(&b, 0.5), Point::new(5.0, 10.0));
        assert_eq!(a.midpoint_from(&b), a.lerp(&b, 0.5));
    }

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(a.distance_from(&b), 5.0);
    }

    #[test]
    fn test_point_min_max() {
        let a = Point::new(1.0, 7.0);
        let b = Point::new(4.0, 2.0);
        assert_eq!(a.min(&b), Point::new(1.0, 2.0));
        assert_eq!(a.max(&b), Point::new(4.0, 7.0));
    }
}
