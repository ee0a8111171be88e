//! 隐向量到图像的 MLP 生成器与判别器.
//!
//! 仅前向计算: 反向传播与多卡并行由外部训练框架承担, 不属于本 crate.

use ndarray::{Array1, Array2, Array4, Axis};
use rand::Rng;

/// 全连接层, 权重形如 `(out, in)`.
#[derive(Clone, Debug)]
struct Linear {
    w: Array2<f32>,
    b: Array1<f32>,
}

impl Linear {
    /// U(-k, k) 初始化, k = 1/sqrt(in_dim).
    fn new<R: Rng + ?Sized>(in_dim: usize, out_dim: usize, rng: &mut R) -> Self {
        let k = 1.0 / (in_dim as f32).sqrt();
        let w = Array2::from_shape_fn((out_dim, in_dim), |_| rng.gen_range(-k..=k));
        let b = Array1::from_shape_fn(out_dim, |_| rng.gen_range(-k..=k));
        Self { w, b }
    }

    fn forward(&self, x: &Array2<f32>) -> Array2<f32> {
        x.dot(&self.w.t()) + &self.b
    }
}

#[inline]
fn relu(x: Array2<f32>) -> Array2<f32> {
    x.mapv(|v| v.max(0.0))
}

/// MLP 生成器: 隐向量 `(n, nz)` → 图像 `(n, nc, img_size, img_size)`.
///
/// 结构为 3 个宽度 `ngf` 的 ReLU 隐层加一个输出层.
#[derive(Clone, Debug)]
pub struct MlpGenerator {
    img_size: usize,
    nz: usize,
    nc: usize,
    layers: [Linear; 4],
}

impl MlpGenerator {
    /// 构造生成器.
    ///
    /// `img_size` 为输出图像边长, `nz` 为隐向量维度, `nc` 为输出通道数,
    /// `ngf` 为隐层宽度.
    pub fn new<R: Rng + ?Sized>(
        img_size: usize,
        nz: usize,
        nc: usize,
        ngf: usize,
        rng: &mut R,
    ) -> Self {
        let out_dim = nc * img_size * img_size;
        Self {
            img_size,
            nz,
            nc,
            layers: [
                Linear::new(nz, ngf, rng),
                Linear::new(ngf, ngf, rng),
                Linear::new(ngf, ngf, rng),
                Linear::new(ngf, out_dim, rng),
            ],
        }
    }

    /// 隐向量维度.
    #[inline]
    pub fn nz(&self) -> usize {
        self.nz
    }

    /// 前向: `z` 形如 `(n, nz)`, 输出 `(n, nc, img_size, img_size)`.
    pub fn forward(&self, z: &Array2<f32>) -> Array4<f32> {
        assert_eq!(z.ncols(), self.nz, "隐向量维度必须为 nz");
        let n = z.nrows();

        let mut h = relu(self.layers[0].forward(z));
        h = relu(self.layers[1].forward(&h));
        h = relu(self.layers[2].forward(&h));
        let out = self.layers[3].forward(&h);

        out.into_shape((n, self.nc, self.img_size, self.img_size))
            .expect("输出层宽度与图像形状一致")
    }
}

/// MLP 判别器: 图像 `(n, nc, img_size, img_size)` → 批均值打分 `(1,)`.
///
/// 结构为 3 个宽度 `ndf` 的 ReLU 隐层加一个标量输出层.
#[derive(Clone, Debug)]
pub struct MlpDiscriminator {
    img_size: usize,
    nc: usize,
    layers: [Linear; 4],
}

impl MlpDiscriminator {
    /// 构造判别器. `ndf` 为隐层宽度.
    pub fn new<R: Rng + ?Sized>(img_size: usize, nc: usize, ndf: usize, rng: &mut R) -> Self {
        let in_dim = nc * img_size * img_size;
        Self {
            img_size,
            nc,
            layers: [
                Linear::new(in_dim, ndf, rng),
                Linear::new(ndf, ndf, rng),
                Linear::new(ndf, ndf, rng),
                Linear::new(ndf, 1, rng),
            ],
        }
    }

    /// 前向: 打分在 batch 维上取均值, 输出单元素数组.
    pub fn forward(&self, input: &Array4<f32>) -> Array1<f32> {
        let (n, nc, h, w) = input.dim();
        assert_eq!(
            (nc, h, w),
            (self.nc, self.img_size, self.img_size),
            "输入图像形状与判别器配置不符"
        );

        let flat = input
            .to_owned()
            .into_shape((n, nc * h * w))
            .expect("连续数组按 (n, -1) 重塑不应失败");

        let mut hid = relu(self.layers[0].forward(&flat));
        hid = relu(self.layers[1].forward(&hid));
        hid = relu(self.layers[2].forward(&hid));
        let score = self.layers[3].forward(&hid);

        score.mean_axis(Axis(0)).expect("batch 维不能为空")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generator_output_shape() {
        let mut rng = StdRng::seed_from_u64(0);
        let g = MlpGenerator::new(16, 8, 3, 32, &mut rng);
        let z = Array2::from_shape_fn((4, 8), |_| rng.gen_range(-1.0..=1.0));
        let img = g.forward(&z);
        assert_eq!(img.dim(), (4, 3, 16, 16));
        assert!(img.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_discriminator_scores_batch_mean() {
        let mut rng = StdRng::seed_from_u64(1);
        let d = MlpDiscriminator::new(16, 3, 32, &mut rng);
        let imgs = Array4::from_shape_fn((4, 3, 16, 16), |_| rng.gen_range(0.0..=1.0));
        let score = d.forward(&imgs);
        assert_eq!(score.len(), 1);
        assert!(score[0].is_finite());
    }

    #[test]
    fn test_generator_discriminator_roundtrip() {
        let mut rng = StdRng::seed_from_u64(2);
        let g = MlpGenerator::new(8, 4, 1, 16, &mut rng);
        let d = MlpDiscriminator::new(8, 1, 16, &mut rng);
        let z = Array2::from_shape_fn((2, 4), |_| rng.gen_range(-1.0..=1.0));
        let score = d.forward(&g.forward(&z));
        assert_eq!(score.len(), 1);
    }

    #[test]
    #[should_panic]
    fn test_generator_rejects_wrong_latent_dim() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = MlpGenerator::new(8, 4, 1, 16, &mut rng);
        let z = Array2::zeros((2, 5));
        g.forward(&z);
    }
}
