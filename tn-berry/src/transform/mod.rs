//! 成对变换流水线.
//!
//! 流水线作用于 "图像 + 可选掩膜" 的成对结构而非单张图像:
//! 每个随机步骤的参数在单个样本内只采样一次, 并对两幅栅格施加同一几何变换.
//! 这是本 crate 唯一真正非平凡的正确性性质, 由测试显式覆盖.

use crate::consts::{Mode, Sign, CROP_SHAPE, RESIZE_SHAPE, ROTATION_DEGREES, ZOOM_RANGE};
use crate::Tensor3;
use image::{GrayImage, RgbImage};
use ndarray::Array3;
use rand::RngCore;

mod augment;

pub use augment::{
    RandomCrop, RandomHorizontalFlip, RandomRotation, RandomVerticalFlip, RandomZoom, Resize,
};

/// 解码后的样本栅格对. 无标注样本的 `mask` 为 `None`.
#[derive(Clone, Debug)]
pub struct RasterPair {
    /// RGB 图像.
    pub image: RgbImage,

    /// 单通道真值掩膜.
    pub mask: Option<GrayImage>,
}

impl RasterPair {
    /// 仅图像, 无掩膜.
    #[inline]
    pub fn image_only(image: RgbImage) -> Self {
        Self { image, mask: None }
    }

    /// 图像 + 掩膜.
    #[inline]
    pub fn with_mask(image: RgbImage, mask: GrayImage) -> Self {
        Self {
            image,
            mask: Some(mask),
        }
    }
}

/// 流水线输出: CHW `f32` 张量对, 像素值归一化到 `[0, 1]`.
#[derive(Clone, Debug)]
pub struct TensorPair {
    /// `(3, H, W)` 图像张量.
    pub image: Tensor3,

    /// `(1, H, W)` 掩膜张量.
    pub mask: Option<Tensor3>,
}

/// 单个成对变换步骤.
///
/// 实现者必须保证: 一次 `apply` 调用内, 随机参数只从 `rng` 采样一次,
/// 图像与掩膜经历同一几何变换.
pub trait PairTransform: Send + Sync {
    /// 对样本栅格对施加变换.
    fn apply(&self, pair: RasterPair, rng: &mut dyn RngCore) -> RasterPair;
}

/// 确定有序的成对变换流水线. 末尾隐含 to-tensor 转换.
pub struct Pipeline {
    steps: Vec<Box<dyn PairTransform>>,
}

impl Pipeline {
    /// 由调用方给定的步骤序列构造流水线, 原样使用.
    pub fn new(steps: Vec<Box<dyn PairTransform>>) -> Self {
        Self { steps }
    }

    /// 按 (mode, sign) 查表构造默认流水线.
    ///
    /// | mode | sign | 步骤 |
    /// |---|---|---|
    /// | train | label | resize(320) → 水平翻转 → 垂直翻转 → 旋转(±90°) → 缩放(0.9–1.1) → 裁剪(256) → to-tensor |
    /// | train | unlabel | 同上但无缩放步骤 |
    /// | valid/test | — | resize(320) → to-tensor |
    ///
    /// # 注意
    ///
    /// 无标注训练流水线不含缩放步骤, 两张表之间的非对称性是刻意的.
    pub fn default_for(mode: Mode, sign: Sign) -> Self {
        let (rh, rw) = RESIZE_SHAPE;
        let (ch, cw) = CROP_SHAPE;
        match (mode, sign) {
            (Mode::Train, Sign::Label) => Self::new(vec![
                Box::new(Resize::new(rh, rw)),
                Box::new(RandomHorizontalFlip::new(0.5)),
                Box::new(RandomVerticalFlip::new(0.5)),
                Box::new(RandomRotation::new(ROTATION_DEGREES)),
                Box::new(RandomZoom::new(ZOOM_RANGE.0, ZOOM_RANGE.1)),
                Box::new(RandomCrop::new(ch, cw)),
            ]),
            (Mode::Train, Sign::Unlabel) => Self::new(vec![
                Box::new(Resize::new(rh, rw)),
                Box::new(RandomHorizontalFlip::new(0.5)),
                Box::new(RandomVerticalFlip::new(0.5)),
                Box::new(RandomRotation::new(ROTATION_DEGREES)),
                Box::new(RandomCrop::new(ch, cw)),
            ]),
            (Mode::Valid | Mode::Test, _) => Self::new(vec![Box::new(Resize::new(rh, rw))]),
        }
    }

    /// 步骤个数 (不含隐含的 to-tensor).
    #[inline]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// 是否没有任何显式步骤.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 以线程本地随机源运行流水线.
    pub fn apply(&self, pair: RasterPair) -> TensorPair {
        self.apply_with(pair, &mut rand::thread_rng())
    }

    /// 以外部给定的随机源运行流水线, 便于可复现测试.
    pub fn apply_with(&self, mut pair: RasterPair, rng: &mut dyn RngCore) -> TensorPair {
        for step in &self.steps {
            pair = step.apply(pair, rng);
        }
        TensorPair {
            image: rgb_to_tensor(&pair.image),
            mask: pair.mask.as_ref().map(gray_to_tensor),
        }
    }
}

/// RGB 栅格转 `(3, H, W)` 张量, 像素除以 255.
pub fn rgb_to_tensor(img: &RgbImage) -> Tensor3 {
    let (w, h) = img.dimensions();
    Array3::from_shape_fn((3, h as usize, w as usize), |(c, y, x)| {
        f32::from(img.get_pixel(x as u32, y as u32).0[c]) / 255.0
    })
}

/// 单通道栅格转 `(1, H, W)` 张量, 像素除以 255.
pub fn gray_to_tensor(img: &GrayImage) -> Tensor3 {
    let (w, h) = img.dimensions();
    Array3::from_shape_fn((1, h as usize, w as usize), |(_, y, x)| {
        f32::from(img.get_pixel(x as u32, y as u32).0[0]) / 255.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// 构造 R 通道与掩膜逐像素一致的样本对, 用于成对一致性检查.
    fn mirrored_pair(w: u32, h: u32) -> RasterPair {
        let mut image = RgbImage::new(w, h);
        let mut mask = GrayImage::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let v = ((x * 7 + y * 13) % 251) as u8;
                image.put_pixel(x, y, Rgb([v, 0, 0]));
                mask.put_pixel(x, y, Luma([v]));
            }
        }
        RasterPair::with_mask(image, mask)
    }

    /// 随机几何步骤对图像与掩膜必须使用同一组采样参数.
    /// 以 R 通道镜像掩膜的样本穿过翻转/旋转/裁剪后检查逐像素一致.
    #[test]
    fn test_paired_steps_share_random_parameters() {
        let pipeline = Pipeline::new(vec![
            Box::new(RandomHorizontalFlip::new(0.5)),
            Box::new(RandomVerticalFlip::new(0.5)),
            Box::new(RandomRotation::new(90.0)),
            Box::new(RandomCrop::new(24, 24)),
        ]);

        for seed in 0..16 {
            let mut rng = StdRng::seed_from_u64(seed);
            let out = pipeline.apply_with(mirrored_pair(32, 32), &mut rng);
            let mask = out.mask.unwrap();
            assert_eq!(mask.shape(), &[1, 24, 24]);
            for y in 0..24 {
                for x in 0..24 {
                    let r = out.image[(0, y, x)];
                    let m = mask[(0, y, x)];
                    assert!(
                        (r - m).abs() < 1e-6,
                        "seed {seed}: ({y}, {x}) 处图像与掩膜不一致: {r} vs {m}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_default_table_shapes() {
        let labeled = Pipeline::default_for(Mode::Train, Sign::Label);
        let unlabeled = Pipeline::default_for(Mode::Train, Sign::Unlabel);
        let eval = Pipeline::default_for(Mode::Valid, Sign::Label);

        // 无标注流水线比有标注少一个缩放步骤.
        assert_eq!(labeled.len(), 6);
        assert_eq!(unlabeled.len(), 5);
        assert_eq!(eval.len(), 1);

        let mut rng = StdRng::seed_from_u64(7);
        let out = labeled.apply_with(mirrored_pair(100, 80), &mut rng);
        assert_eq!(out.image.shape(), &[3, 256, 256]);
        assert_eq!(out.mask.unwrap().shape(), &[1, 256, 256]);

        let out = unlabeled.apply_with(
            RasterPair::image_only(RgbImage::new(100, 80)),
            &mut rng,
        );
        assert_eq!(out.image.shape(), &[3, 256, 256]);
        assert!(out.mask.is_none());

        let out = eval.apply_with(mirrored_pair(100, 80), &mut rng);
        assert_eq!(out.image.shape(), &[3, 320, 320]);
        assert_eq!(out.mask.unwrap().shape(), &[1, 320, 320]);
    }

    #[test]
    fn test_to_tensor_scaling() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([255, 0, 51]));
        image.put_pixel(1, 0, Rgb([0, 255, 102]));
        let t = rgb_to_tensor(&image);
        assert_eq!(t.shape(), &[3, 1, 2]);
        assert!((t[(0, 0, 0)] - 1.0).abs() < 1e-6);
        assert!((t[(1, 0, 1)] - 1.0).abs() < 1e-6);
        assert!((t[(2, 0, 0)] - 0.2).abs() < 1e-6);
    }
}
