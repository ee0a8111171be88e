//! 分割/一致性损失函数.
//!
//! 所有损失都作用于 batch 维在前的稠密 `f32` 数组, 先展平为 `(n, -1)`
//! 再逐项计算. 这些对象只持有无状态参数, 构造后不可变.

use crate::consts::{COSINE_EPS, DICE_SMOOTH};
use itertools::izip;
use ndarray::{Array2, ArrayD, Axis};

/// 模型前向的主预测. 有的网络除主预测外还会返回辅助特征图,
/// 此时损失只消费第一个输出.
#[derive(Copy, Clone)]
pub enum Pred<'a> {
    /// 仅主预测.
    Main(&'a ArrayD<f32>),

    /// 主预测 + 辅助输出, 第一个元素参与损失.
    WithAux(&'a [ArrayD<f32>]),
}

impl Pred<'_> {
    /// 参与损失计算的主预测.
    #[inline]
    pub fn main(&self) -> &ArrayD<f32> {
        match self {
            Self::Main(t) => t,
            Self::WithAux(ts) => ts
                .first()
                .expect("复合预测至少要包含主输出"),
        }
    }
}

impl<'a> From<&'a ArrayD<f32>> for Pred<'a> {
    fn from(t: &'a ArrayD<f32>) -> Self {
        Self::Main(t)
    }
}

impl<'a> From<&'a [ArrayD<f32>]> for Pred<'a> {
    fn from(ts: &'a [ArrayD<f32>]) -> Self {
        Self::WithAux(ts)
    }
}

impl<'a> From<&'a Vec<ArrayD<f32>>> for Pred<'a> {
    fn from(ts: &'a Vec<ArrayD<f32>>) -> Self {
        Self::WithAux(ts.as_slice())
    }
}

/// 展平为 `(n, -1)`. batch 维为空时无意义, 直接 panic.
fn batch_flatten(x: &ArrayD<f32>) -> Array2<f32> {
    let n = *x.shape().first().expect("损失输入不能是 0 维数组");
    assert!(n > 0, "batch 维不能为空");
    let cols = x.len() / n;
    x.to_owned()
        .into_shape((n, cols))
        .expect("连续数组按 (n, -1) 重塑不应失败")
}

/// 二元交叉熵损失, 均值归约.
///
/// 对数项在 -100 处截断, 使预测值恰为 0/1 时仍得到有限损失.
#[derive(Copy, Clone, Debug, Default)]
pub struct BceLoss;

impl BceLoss {
    /// 构造.
    pub fn new() -> Self {
        Self
    }

    /// 计算损失. `pred` 取值应在 `[0, 1]` 内.
    pub fn eval<'a, P: Into<Pred<'a>>>(&self, pred: P, target: &ArrayD<f32>) -> f32 {
        let pred: Pred<'_> = pred.into();
        let pred = batch_flatten(pred.main());
        let target = batch_flatten(target);
        assert_eq!(
            pred.dim(),
            target.dim(),
            "预测与真值展平后形状必须一致"
        );

        let mut acc = 0.0f32;
        for (&p, &t) in pred.iter().zip(target.iter()) {
            let lp = p.ln().max(-100.0);
            let lq = (1.0 - p).ln().max(-100.0);
            acc -= t * lp + (1.0 - t) * lq;
        }
        acc / pred.len() as f32
    }
}

/// Dice 损失.
///
/// 逐样本分数 `(2·Σ(p·t) + smooth) / (Σp + Σt + smooth)`,
/// 损失为 `1 - mean(分数)`. 平滑项防止预测与真值同时为空时除零.
#[derive(Copy, Clone, Debug)]
pub struct DiceLoss {
    smooth: f32,
}

impl Default for DiceLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl DiceLoss {
    /// 以默认平滑项 (1.0) 构造.
    pub fn new() -> Self {
        Self {
            smooth: DICE_SMOOTH,
        }
    }

    /// 计算损失.
    pub fn eval<'a, P: Into<Pred<'a>>>(&self, pred: P, target: &ArrayD<f32>) -> f32 {
        let pred: Pred<'_> = pred.into();
        let pred = batch_flatten(pred.main());
        let target = batch_flatten(target);
        assert_eq!(
            pred.dim(),
            target.dim(),
            "预测与真值展平后形状必须一致"
        );

        let n = pred.nrows();
        let mut score_sum = 0.0f32;
        for (p_row, t_row) in pred.axis_iter(Axis(0)).zip(target.axis_iter(Axis(0))) {
            let intersection: f32 = p_row.iter().zip(t_row.iter()).map(|(p, t)| p * t).sum();
            let p_sum: f32 = p_row.sum();
            let t_sum: f32 = t_row.sum();
            score_sum += (2.0 * intersection + self.smooth) / (p_sum + t_sum + self.smooth);
        }
        1.0 - score_sum / n as f32
    }
}

/// BCE + Dice 的加权和. 两项权重都默认为 1.0.
#[derive(Copy, Clone, Debug)]
pub struct BceDiceLoss {
    bce: BceLoss,
    dice: DiceLoss,
    bce_weight: f32,
    dice_weight: f32,
}

impl Default for BceDiceLoss {
    fn default() -> Self {
        Self::new()
    }
}

impl BceDiceLoss {
    /// 等权构造.
    pub fn new() -> Self {
        Self::with_weights(1.0, 1.0)
    }

    /// 指定两项权重.
    pub fn with_weights(bce_weight: f32, dice_weight: f32) -> Self {
        Self {
            bce: BceLoss::new(),
            dice: DiceLoss::new(),
            bce_weight,
            dice_weight,
        }
    }

    /// 计算损失.
    pub fn eval<'a, P: Into<Pred<'a>> + Copy>(&self, pred: P, target: &ArrayD<f32>) -> f32 {
        self.dice_weight * self.dice.eval(pred, target) + self.bce_weight * self.bce.eval(pred, target)
    }
}

/// 多项加权余弦一致性损失.
///
/// 对等长的两列特征图, 逐位置计算 `mean(1 - cos(展平 a, 展平 b)) · w`
/// 并求和. 用于两次前向之间的特征级一致性约束 (教师/学生或重建目标).
#[derive(Clone, Debug)]
pub struct GlobalCosineLoss {
    weight: Vec<f32>,
    stop_grad: bool,
}

impl GlobalCosineLoss {
    /// `weight` 与特征列表一一对应. `stop_grad` 表示第一列操作数
    /// 作为常量目标参与 (本 crate 仅做前向求值, 该标志不改变数值,
    /// 仅声明语义, 供接入自动微分后端的上层遵循).
    pub fn new(weight: Vec<f32>, stop_grad: bool) -> Self {
        Self { weight, stop_grad }
    }

    /// 第一列操作数是否作为常量目标.
    #[inline]
    pub fn stop_grad(&self) -> bool {
        self.stop_grad
    }

    /// 计算损失. 三个序列长度必须一致.
    pub fn eval(&self, a: &[ArrayD<f32>], b: &[ArrayD<f32>]) -> f32 {
        assert_eq!(a.len(), b.len(), "两列特征图长度必须一致");
        assert_eq!(a.len(), self.weight.len(), "权重个数必须与特征列表一致");

        let mut loss = 0.0f32;
        for (fa, fb, &w) in izip!(a, b, &self.weight) {
            let fa = batch_flatten(fa);
            let fb = batch_flatten(fb);
            assert_eq!(fa.dim(), fb.dim(), "成对特征图展平后形状必须一致");

            let n = fa.nrows();
            let mut term = 0.0f32;
            for (ra, rb) in fa.axis_iter(Axis(0)).zip(fb.axis_iter(Axis(0))) {
                let dot: f32 = ra.iter().zip(rb.iter()).map(|(x, y)| x * y).sum();
                let na = ra.iter().map(|x| x * x).sum::<f32>().sqrt().max(COSINE_EPS);
                let nb = rb.iter().map(|x| x * x).sum::<f32>().sqrt().max(COSINE_EPS);
                term += 1.0 - dot / (na * nb);
            }
            loss += term / n as f32 * w;
        }
        loss
    }
}
