//! 颜色类型
//!
//! 四分量 [r,g,b,a]：r/g/b 为 0..=255 整数，a 为 [0,1] 浮点。
//! 支持 #rgb / #rrggbb / rgb() / rgba() 字符串互转。

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorParseError;

/// RGBA 颜色，构造后恒为四分量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Color {
    /// 创建不透明颜色
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// 创建带透明度的颜色，alpha 超出 [0,1] 时收紧
    pub fn from_rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self {
            r,
            g,
            b,
            a: a.clamp(0.0, 1.0),
        }
    }

    /// 解析 #rgb / #rrggbb 十六进制形式
    pub fn from_hex(hex: &str) -> Result<Self, ColorParseError> {
        let value = hex.strip_prefix('#').unwrap_or(hex);
        let (r, g, b) = match value.len() {
            3 => {
                let mut it = value.chars();
                let r = it.next().unwrap();
                let g = it.next().unwrap();
                let b = it.next().unwrap();
                (
                    hex_pair(r, r, hex)?,
                    hex_pair(g, g, hex)?,
                    hex_pair(b, b, hex)?,
                )
            }
            6 => {
                let bytes: Vec<char> = value.chars().collect();
                (
                    hex_pair(bytes[0], bytes[1], hex)?,
                    hex_pair(bytes[2], bytes[3], hex)?,
                    hex_pair(bytes[4], bytes[5], hex)?,
                )
            }
            _ => return Err(ColorParseError::new(hex)),
        };
        Ok(Self::from_rgb(r, g, b))
    }

    /// 解析 rgb(r,g,b) / rgba(r,g,b,a) 形式
    pub fn from_rgb_string(source: &str) -> Result<Self, ColorParseError> {
        let trimmed = source.trim();
        let inner = trimmed
            .strip_prefix("rgba(")
            .or_else(|| trimmed.strip_prefix("rgb("))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ColorParseError::new(source))?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 && parts.len() != 4 {
            return Err(ColorParseError::new(source));
        }

        let channel = |s: &str| -> Result<u8, ColorParseError> {
            s.parse::<i64>()
                .ok()
                .filter(|v| (0..=255).contains(v))
                .map(|v| v as u8)
                .ok_or_else(|| ColorParseError::new(source))
        };

        let r = channel(parts[0])?;
        let g = channel(parts[1])?;
        let b = channel(parts[2])?;
        let a = if parts.len() == 4 {
            parts[3]
                .parse::<f64>()
                .map_err(|_| ColorParseError::new(source))?
        } else {
            1.0
        };
        Ok(Self::from_rgba(r, g, b, a))
    }

    /// rgba(...) 字符串形式
    pub fn to_rgba_string(&self) -> String {
        format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
    }

    /// rgb(...) 字符串形式（丢弃透明度）
    pub fn to_rgb_string(&self) -> String {
        format!("rgb({},{},{})", self.r, self.g, self.b)
    }

    /// #rrggbb 字符串形式（丢弃透明度）
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// 带整体不透明度系数的有效 alpha
    pub fn effective_alpha(&self, opacity: f64) -> f64 {
        (self.a * opacity).clamp(0.0, 1.0)
    }
}

fn hex_pair(hi: char, lo: char, source: &str) -> Result<u8, ColorParseError> {
    let hi = hi.to_digit(16).ok_or_else(|| ColorParseError::new(source))?;
    let lo = lo.to_digit(16).ok_or_else(|| ColorParseError::new(source))?;
    Ok((hi * 16 + lo) as u8)
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// 依次尝试十六进制与 rgb()/rgba() 形式
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('#') {
            Self::from_hex(trimmed)
        } else {
            Self::from_rgb_string(trimmed)
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rgba_string())
    }
}

// 线格式里颜色始终是字符串
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rgba_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        let c = Color::from_hex("#ff8000").unwrap();
        assert_eq!((c.r, c.g, c.b), (255, 128, 0));
        assert_eq!(c.a, 1.0);

        // 短形式
        let c = Color::from_hex("#f00").unwrap();
        assert_eq!((c.r, c.g, c.b), (255, 0, 0));
    }

    #[test]
    fn test_rgb_string_parsing() {
        let c = Color::from_rgb_string("rgb(10, 20, 30)").unwrap();
        assert_eq!((c.r, c.g, c.b), (10, 20, 30));

        let c = Color::from_rgb_string("rgba(10, 20, 30, 0.5)").unwrap();
        assert_eq!(c.a, 0.5);
    }

    #[test]
    fn test_invalid_strings_rejected() {
        assert!(Color::from_hex("#12345").is_err());
        assert!(Color::from_rgb_string("rgb(300,0,0)").is_err());
        assert!("not-a-color".parse::<Color>().is_err());
    }

    #[test]
    fn test_round_trip_through_rgba_string() {
        let c = Color::from_rgba(1, 2, 3, 0.25);
        let parsed: Color = c.to_rgba_string().parse().unwrap();
        assert_eq!(parsed, c);
    }

    #[test]
    fn test_alpha_clamped() {
        assert_eq!(Color::from_rgba(0, 0, 0, 2.0).a, 1.0);
        assert_eq!(Color::from_rgba(0, 0, 0, -1.0).a, 0.0);
    }
}
