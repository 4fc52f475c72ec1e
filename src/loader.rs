//! 异步图像源加载
//!
//! 图像/SVG 源在 tokio 运行时上解码，完成结果进入共享队列，
//! 由画布在 UI 节拍里 `poll_loaded()` 取走并应用（修改 + 请求重绘），
//! 场景数据永远不会被其他线程直接触碰。

use std::sync::Arc;

use parking_lot::Mutex;
use tiny_skia::Pixmap;

use crate::error::{CanvasError, SourceError};

/// 一次加载的结果
pub struct LoadResult {
    pub src: String,
    pub result: Result<Pixmap, SourceError>,
}

/// 图像加载器
pub struct ImageLoader {
    runtime: tokio::runtime::Runtime,
    results: Arc<Mutex<Vec<LoadResult>>>,
}

impl ImageLoader {
    pub fn new() -> Result<Self, CanvasError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .map_err(CanvasError::Io)?;
        Ok(Self {
            runtime,
            results: Arc::new(Mutex::new(Vec::new())),
        })
    }

    /// 发起一次加载；同一 src 的结果会应用到所有等待它的对象
    pub fn request(&self, src: &str) {
        let src = src.to_string();
        let results = Arc::clone(&self.results);
        if src.starts_with("http://") || src.starts_with("https://") {
            self.runtime.spawn(async move {
                let result = fetch_remote(&src)
                    .await
                    .and_then(|bytes| decode_bytes(&bytes, &src));
                results.lock().push(LoadResult { src, result });
            });
        } else {
            // 本地文件：读取和解码都是阻塞工作
            self.runtime.spawn_blocking(move || {
                let result = std::fs::read(&src)
                    .map_err(|e| SourceError::Fetch {
                        src: src.clone(),
                        reason: e.to_string(),
                    })
                    .and_then(|bytes| decode_bytes(&bytes, &src));
                results.lock().push(LoadResult { src, result });
            });
        }
    }

    /// 取走全部已完成的结果
    pub fn drain(&self) -> Vec<LoadResult> {
        std::mem::take(&mut *self.results.lock())
    }
}

async fn fetch_remote(src: &str) -> Result<Vec<u8>, SourceError> {
    let fetch_err = |reason: String| SourceError::Fetch {
        src: src.to_string(),
        reason,
    };
    let response = reqwest::get(src).await.map_err(|e| fetch_err(e.to_string()))?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| fetch_err(e.to_string()))?;
    Ok(bytes.to_vec())
}

/// 解码字节流：SVG 走 usvg/resvg 光栅化，其余交给 image
pub(crate) fn decode_bytes(bytes: &[u8], src: &str) -> Result<Pixmap, SourceError> {
    let decode_err = |reason: String| SourceError::Decode {
        src: src.to_string(),
        reason,
    };

    if looks_like_svg(bytes) {
        let text = std::str::from_utf8(bytes).map_err(|e| decode_err(e.to_string()))?;
        let opt = usvg::Options::default();
        let tree = usvg::Tree::from_str(text, &opt).map_err(|e| decode_err(e.to_string()))?;
        let size = tree.size();
        let width = size.width().ceil() as u32;
        let height = size.height().ceil() as u32;
        let mut pixmap = Pixmap::new(width.max(1), height.max(1))
            .ok_or_else(|| decode_err("zero-size svg".to_string()))?;
        resvg::render(&tree, tiny_skia::Transform::identity(), &mut pixmap.as_mut());
        return Ok(pixmap);
    }

    let image = image::load_from_memory(bytes).map_err(|e| decode_err(e.to_string()))?;
    let rgba = image.to_rgba8();
    let (width, height) = (rgba.width(), rgba.height());
    let data = rgba.into_raw();
    let mut pixmap =
        Pixmap::new(width, height).ok_or_else(|| decode_err("zero-size image".to_string()))?;
    for (dst, chunk) in pixmap.pixels_mut().iter_mut().zip(data.chunks_exact(4)) {
        *dst = tiny_skia::ColorU8::from_rgba(chunk[0], chunk[1], chunk[2], chunk[3]).premultiply();
    }
    Ok(pixmap)
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head: &[u8] = &bytes[..bytes.len().min(256)];
    let Ok(text) = std::str::from_utf8(head) else {
        return false;
    };
    let trimmed = text.trim_start();
    trimmed.starts_with("<svg") || trimmed.starts_with("<?xml")
}

// ==================== 单元测试 ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_svg_bytes() {
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="6"><rect width="8" height="6" fill="#ff0000"/></svg>"##;
        let pixmap = decode_bytes(svg, "inline.svg").unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (8, 6));
        let px = pixmap.pixel(4, 3).unwrap().demultiply();
        assert_eq!(px.red(), 255);
    }

    #[test]
    fn test_decode_png_bytes() {
        // 先用 image 生成一张 2x2 的 PNG
        let img = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 255, 0, 255]));
        let mut buf = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut buf),
            image::ImageFormat::Png,
        )
        .unwrap();

        let pixmap = decode_bytes(&buf, "inline.png").unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (2, 2));
        assert_eq!(pixmap.pixel(0, 0).unwrap().demultiply().green(), 255);
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(decode_bytes(b"not an image", "junk.bin").is_err());
    }

    #[test]
    fn test_local_file_load_reports_missing() {
        let loader = ImageLoader::new().unwrap();
        loader.request("/nonexistent/image.png");
        // 等待后台任务落盘结果
        for _ in 0..100 {
            std::thread::sleep(std::time::Duration::from_millis(10));
            let results = loader.drain();
            if !results.is_empty() {
                assert!(results[0].result.is_err());
                return;
            }
        }
        panic!("loader never reported a result");
    }
}
