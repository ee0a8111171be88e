//! 运行配置.

use crate::dataset::split::ExpId;
use std::path::PathBuf;

/// 训练范式选择器.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Manner {
    /// 纯监督训练.
    Train,

    /// 半监督训练, 需要无标注加载器.
    Semi,

    /// 自监督训练, 需要无标注加载器.
    #[cfg_attr(feature = "serde", serde(rename = "self"))]
    SelfSup,

    /// 仅测试.
    Test,
}

impl Manner {
    /// 该范式是否消耗无标注数据.
    #[inline]
    pub fn wants_unlabeled(&self) -> bool {
        matches!(self, Self::Semi | Self::SelfSup)
    }
}

/// 一次训练/测试运行的完整配置. 构造后不可变.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunConfig {
    /// 训练范式.
    pub manner: Manner,

    /// 数据集名 (当前仅注册了 `tn3k`).
    pub dataset: String,

    /// 数据集根目录.
    pub root: PathBuf,

    /// 实验规模 ID.
    pub exp_id: ExpId,

    /// 有标注/无标注比例. 为与原始参数面保持一致而保留, 当前未使用.
    pub ratio: u32,
}
