//! TN3K 样本加载器.
//!
//! 定长可索引集合: 构造期解析清单与变换流水线, 此后不可变;
//! 每次索引访问都是一次纯的 "读取-变换-返回" 操作
//! (随机增广带来的随机性除外).

use crate::consts::{Mode, Sign, TEST_TOKEN, TRAINVAL_TOKEN};
use crate::dataset::split::{self, ExpId};
use crate::transform::{Pipeline, RasterPair};
use crate::{DatasetError, Tensor3};
use std::path::{Path, PathBuf};

/// 单个样本. 返回形状按 (mode, sign) 分类, 以带标签变体显式表达,
/// 调用方无需做类型探查.
#[derive(Clone, Debug)]
pub enum Sample {
    /// 有标注上下文 (有标注训练/验证/测试) 的样本.
    Labeled {
        /// `(3, H, W)` 图像张量.
        image: Tensor3,

        /// `(1, H, W)` 真值掩膜张量.
        label: Tensor3,

        /// 源图像的文件名 (去除目录前缀, 改写掩膜路径之前).
        name: String,
    },

    /// 无标注训练上下文的样本, 仅图像本身.
    Unlabeled {
        /// `(3, H, W)` 图像张量.
        image: Tensor3,
    },
}

impl Sample {
    /// 样本图像张量.
    #[inline]
    pub fn image(&self) -> &Tensor3 {
        match self {
            Self::Labeled { image, .. } | Self::Unlabeled { image } => image,
        }
    }

    /// 是否携带真值掩膜.
    #[inline]
    pub fn is_labeled(&self) -> bool {
        matches!(self, Self::Labeled { .. })
    }
}

/// TN3K 数据集加载器.
pub struct Tn3kDataset {
    mode: Mode,
    sign: Sign,
    imglist: Vec<PathBuf>,
    transform: Pipeline,
}

impl Tn3kDataset {
    /// 从数据集根目录构造加载器.
    ///
    /// # 注意
    ///
    /// 1. 清单在构造期一次性解析 (见 [`split::resolve`]), 清单文件缺失
    ///   立即返回 `Result::Err`.
    /// 2. `transform` 为 `None` 时按 (mode, sign) 查默认流水线表,
    ///   否则原样使用调用方提供的流水线.
    pub fn new(
        root: &Path,
        exp_id: ExpId,
        mode: Mode,
        sign: Sign,
        transform: Option<Pipeline>,
    ) -> Result<Self, DatasetError> {
        let imglist = split::resolve(root, exp_id, mode, sign)?;
        let transform = transform.unwrap_or_else(|| Pipeline::default_for(mode, sign));
        Ok(Self {
            mode,
            sign,
            imglist,
            transform,
        })
    }

    /// 数据集长度, 即解析后的清单长度.
    #[inline]
    pub fn len(&self) -> usize {
        self.imglist.len()
    }

    /// 数据集是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.imglist.is_empty()
    }

    /// 运行模式.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// 标注符号.
    #[inline]
    pub fn sign(&self) -> Sign {
        self.sign
    }

    /// 已解析的样本路径序列.
    #[inline]
    pub fn paths(&self) -> &[PathBuf] {
        &self.imglist
    }

    /// 按索引获取一个样本.
    ///
    /// 无标注训练上下文产出 [`Sample::Unlabeled`]; 其余上下文产出
    /// [`Sample::Labeled`], 其掩膜路径由图像路径做目录标记替换导出.
    /// 索引越界、图像/掩膜解码失败、路径缺少标记均返回 `Result::Err`.
    pub fn get(&self, index: usize) -> Result<Sample, DatasetError> {
        let img_path = self.imglist.get(index).ok_or(DatasetError::OutOfBounds {
            index,
            len: self.imglist.len(),
        })?;

        if self.mode.is_train() && self.sign.is_unlabel() {
            let img = open_rgb(img_path)?;
            let out = self.transform.apply(RasterPair::image_only(img));
            return Ok(Sample::Unlabeled { image: out.image });
        }

        let token = if self.mode.is_test() {
            TEST_TOKEN
        } else {
            TRAINVAL_TOKEN
        };
        let gt_path = derive_mask_path(img_path, token)?;

        let img = open_rgb(img_path)?;
        let gt = open_gray(&gt_path)?;
        let out = self.transform.apply(RasterPair::with_mask(img, gt));

        // name 取改写前图像路径的最后一段.
        let name = img_path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Sample::Labeled {
            image: out.image,
            label: out.mask.expect("成对流水线必须保留掩膜"),
            name,
        })
    }
}

/// 图像路径 → 掩膜路径的纯子串替换.
/// 路径中不存在 `token.0` 标记时为数据完整性错误.
pub fn derive_mask_path(
    img_path: &Path,
    token: (&'static str, &'static str),
) -> Result<PathBuf, DatasetError> {
    let raw = img_path.to_string_lossy();
    if !raw.contains(token.0) {
        return Err(DatasetError::MaskToken {
            path: img_path.to_owned(),
            token: token.0,
        });
    }
    Ok(PathBuf::from(raw.replace(token.0, token.1)))
}

fn open_rgb(path: &Path) -> Result<image::RgbImage, DatasetError> {
    Ok(image::open(path)
        .map_err(|source| DatasetError::Image {
            path: path.to_owned(),
            source,
        })?
        .to_rgb8())
}

fn open_gray(path: &Path) -> Result<image::GrayImage, DatasetError> {
    Ok(image::open(path)
        .map_err(|source| DatasetError::Image {
            path: path.to_owned(),
            source,
        })?
        .to_luma8())
}
