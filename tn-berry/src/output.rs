//! 预测图的持久化存储.

use crate::Tensor3;
use image::{GrayImage, ImageError, RgbImage};
use std::path::{Path, PathBuf};

/// 默认输出目录.
pub const RESULT_DIR: &str = "./result";

/// 将 CHW `f32` 张量 (取值 `[0, 1]`) 保存为 `dir` 下的 PNG 文件.
///
/// 文件名由 `suffix` 将 `.jpg` 扩展名替换为 `.png` 得到;
/// 目录不存在时按需创建. 1 通道张量存为灰度图, 3 通道存为 RGB.
///
/// # 注意
///
/// 通道数不是 1 或 3 时 panic.
pub fn save_img_to<P: AsRef<Path>>(x: &Tensor3, suffix: &str, dir: P) -> Result<PathBuf, ImageError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let path = dir.join(suffix.replace(".jpg", ".png"));
    let (c, h, w) = x.dim();
    match c {
        1 => {
            let mut buf = GrayImage::new(w as u32, h as u32);
            for ((_, y, xx), &v) in x.indexed_iter() {
                buf.put_pixel(xx as u32, y as u32, image::Luma([to_u8(v)]));
            }
            buf.save(&path)?;
        }
        3 => {
            let mut buf = RgbImage::new(w as u32, h as u32);
            for y in 0..h {
                for xx in 0..w {
                    let px = image::Rgb([
                        to_u8(x[(0, y, xx)]),
                        to_u8(x[(1, y, xx)]),
                        to_u8(x[(2, y, xx)]),
                    ]);
                    buf.put_pixel(xx as u32, y as u32, px);
                }
            }
            buf.save(&path)?;
        }
        other => panic!("只支持 1/3 通道的预测张量, 但收到 {other} 通道"),
    }
    Ok(path)
}

/// 同 [`save_img_to`], 目录固定为 `./result`.
#[inline]
pub fn save_img(x: &Tensor3, suffix: &str) -> Result<PathBuf, ImageError> {
    save_img_to(x, suffix, RESULT_DIR)
}

#[inline]
fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_save_gray_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let pred = Array3::from_elem((1, 8, 8), 1.0f32);
        let path = save_img_to(&pred, "case_0007.jpg", dir.path()).unwrap();

        assert_eq!(path.file_name().unwrap(), "case_0007.png");
        let back = image::open(&path).unwrap().to_luma8();
        assert_eq!(back.dimensions(), (8, 8));
        assert!(back.pixels().all(|p| p.0[0] == 255));
    }

    #[test]
    fn test_save_rgb_prediction() {
        let dir = tempfile::tempdir().unwrap();
        let mut pred = Array3::zeros((3, 4, 6));
        pred[(0, 0, 0)] = 1.0;
        let path = save_img_to(&pred, "img.jpg", dir.path()).unwrap();
        let back = image::open(&path).unwrap().to_rgb8();
        assert_eq!(back.dimensions(), (6, 4));
        assert_eq!(back.get_pixel(0, 0).0, [255, 0, 0]);
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("result/nested");
        let pred = Array3::from_elem((1, 2, 2), 0.5f32);
        assert!(save_img_to(&pred, "a.png", &nested).is_ok());
        assert!(nested.join("a.png").exists());
    }
}
