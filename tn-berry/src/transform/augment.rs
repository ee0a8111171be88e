//! 内置的成对增广步骤.
//!
//! 所有几何步骤都遵循同一约定: 随机参数在 `apply` 内只采样一次,
//! 然后以同一参数作用于图像与掩膜. 图像重采样用双线性,
//! 掩膜重采样一律用最近邻以保持其二值性; 旋转对两者都用最近邻逆映射,
//! 越界像素填零.

use super::{PairTransform, RasterPair};
use image::imageops::{self, FilterType};
use image::Pixel;
use rand::{Rng, RngCore};

/// 缩放到固定尺寸.
#[derive(Copy, Clone, Debug)]
pub struct Resize {
    height: u32,
    width: u32,
}

impl Resize {
    /// 目标尺寸 (高, 宽).
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

impl PairTransform for Resize {
    fn apply(&self, pair: RasterPair, _rng: &mut dyn RngCore) -> RasterPair {
        resize_pair(pair, self.width, self.height)
    }
}

/// 以概率 `p` 做水平翻转.
#[derive(Copy, Clone, Debug)]
pub struct RandomHorizontalFlip {
    p: f64,
}

impl RandomHorizontalFlip {
    /// 翻转概率.
    pub fn new(p: f64) -> Self {
        Self { p }
    }
}

impl PairTransform for RandomHorizontalFlip {
    fn apply(&self, mut pair: RasterPair, rng: &mut dyn RngCore) -> RasterPair {
        if rng.gen::<f64>() >= self.p {
            return pair;
        }
        pair.image = imageops::flip_horizontal(&pair.image);
        pair.mask = pair.mask.map(|m| imageops::flip_horizontal(&m));
        pair
    }
}

/// 以概率 `p` 做垂直翻转.
#[derive(Copy, Clone, Debug)]
pub struct RandomVerticalFlip {
    p: f64,
}

impl RandomVerticalFlip {
    /// 翻转概率.
    pub fn new(p: f64) -> Self {
        Self { p }
    }
}

impl PairTransform for RandomVerticalFlip {
    fn apply(&self, mut pair: RasterPair, rng: &mut dyn RngCore) -> RasterPair {
        if rng.gen::<f64>() >= self.p {
            return pair;
        }
        pair.image = imageops::flip_vertical(&pair.image);
        pair.mask = pair.mask.map(|m| imageops::flip_vertical(&m));
        pair
    }
}

/// 在 `[-degrees, degrees]` 内均匀采样角度并绕中心旋转.
#[derive(Copy, Clone, Debug)]
pub struct RandomRotation {
    degrees: f32,
}

impl RandomRotation {
    /// 最大旋转角 (度数, 双向).
    pub fn new(degrees: f32) -> Self {
        Self { degrees }
    }
}

impl PairTransform for RandomRotation {
    fn apply(&self, mut pair: RasterPair, rng: &mut dyn RngCore) -> RasterPair {
        let angle = rng.gen_range(-self.degrees..=self.degrees).to_radians();
        pair.image = rotate_nearest(&pair.image, angle);
        pair.mask = pair.mask.map(|m| rotate_nearest(&m, angle));
        pair
    }
}

/// 在 `[lo, hi]` 内均匀采样倍率并整体缩放.
#[derive(Copy, Clone, Debug)]
pub struct RandomZoom {
    lo: f32,
    hi: f32,
}

impl RandomZoom {
    /// 倍率范围. 要求 `0 < lo <= hi`.
    pub fn new(lo: f32, hi: f32) -> Self {
        assert!(0.0 < lo && lo <= hi, "非法缩放范围 [{lo}, {hi}]");
        Self { lo, hi }
    }
}

impl PairTransform for RandomZoom {
    fn apply(&self, pair: RasterPair, rng: &mut dyn RngCore) -> RasterPair {
        let scale = rng.gen_range(self.lo..=self.hi);
        let (w, h) = pair.image.dimensions();
        let nw = ((w as f32 * scale).round() as u32).max(1);
        let nh = ((h as f32 * scale).round() as u32).max(1);
        resize_pair(pair, nw, nh)
    }
}

/// 随机裁剪到固定尺寸. 要求输入不小于裁剪尺寸.
#[derive(Copy, Clone, Debug)]
pub struct RandomCrop {
    height: u32,
    width: u32,
}

impl RandomCrop {
    /// 裁剪输出尺寸 (高, 宽).
    pub fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

impl PairTransform for RandomCrop {
    fn apply(&self, mut pair: RasterPair, rng: &mut dyn RngCore) -> RasterPair {
        let (w, h) = pair.image.dimensions();
        assert!(
            w >= self.width && h >= self.height,
            "裁剪尺寸 {}x{} 超过输入尺寸 {h}x{w}",
            self.height,
            self.width,
        );
        let x = rng.gen_range(0..=w - self.width);
        let y = rng.gen_range(0..=h - self.height);
        pair.image = imageops::crop_imm(&pair.image, x, y, self.width, self.height).to_image();
        pair.mask = pair
            .mask
            .map(|m| imageops::crop_imm(&m, x, y, self.width, self.height).to_image());
        pair
    }
}

/// 图像双线性、掩膜最近邻地缩放到 `nw x nh`.
fn resize_pair(mut pair: RasterPair, nw: u32, nh: u32) -> RasterPair {
    pair.image = imageops::resize(&pair.image, nw, nh, FilterType::Triangle);
    pair.mask = pair
        .mask
        .map(|m| imageops::resize(&m, nw, nh, FilterType::Nearest));
    pair
}

/// 绕中心旋转 `angle` 弧度, 最近邻逆映射, 越界填零.
fn rotate_nearest<P>(src: &image::ImageBuffer<P, Vec<P::Subpixel>>, angle: f32) -> image::ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let (w, h) = src.dimensions();
    let (cx, cy) = ((w as f32 - 1.0) / 2.0, (h as f32 - 1.0) / 2.0);
    let (sin, cos) = angle.sin_cos();
    let mut dst = image::ImageBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            // 逆旋转: 目标像素取自源图中旋转 -angle 的位置.
            let sx = (cos * dx + sin * dy + cx).round();
            let sy = (-sin * dx + cos * dy + cy).round();
            if sx >= 0.0 && sy >= 0.0 && (sx as u32) < w && (sy as u32) < h {
                dst.put_pixel(x, y, *src.get_pixel(sx as u32, sy as u32));
            }
        }
    }
    dst
}
