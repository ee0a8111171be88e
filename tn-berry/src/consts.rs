//! 通用常量.

/// 各实验规模桶对应的有标注样本数. 实验 ID `1..=3` 依次对应.
pub const SPLIT_BUCKETS: [u32; 3] = [322, 644, 1289];

/// 训练/验证图像目录相对片段.
pub const TRAINVAL_IMAGE_DIR: &str = "tn3k/trainval-image";

/// 训练/验证掩膜目录相对片段.
pub const TRAINVAL_MASK_DIR: &str = "tn3k/trainval-mask";

/// 测试图像目录相对片段.
pub const TEST_IMAGE_DIR: &str = "tn3k/test-image";

/// 测试掩膜目录相对片段.
pub const TEST_MASK_DIR: &str = "tn3k/test-mask";

/// 图像路径改写为掩膜路径时的替换标记 (训练/验证).
pub const TRAINVAL_TOKEN: (&str, &str) = ("trainval-image", "trainval-mask");

/// 图像路径改写为掩膜路径时的替换标记 (测试).
pub const TEST_TOKEN: (&str, &str) = ("test-image", "test-mask");

/// 验证集清单相对路径.
pub const VAL_MANIFEST: &str = "data/splits/tn3k/val.txt";

/// 增广前统一缩放尺寸 (高, 宽).
pub const RESIZE_SHAPE: (u32, u32) = (320, 320);

/// 随机裁剪输出尺寸 (高, 宽).
pub const CROP_SHAPE: (u32, u32) = (256, 256);

/// 随机旋转的最大角度 (度数, 双向).
pub const ROTATION_DEGREES: f32 = 90.0;

/// 随机缩放倍率范围.
pub const ZOOM_RANGE: (f32, f32) = (0.9, 1.1);

/// Dice 分数的平滑项, 防止空掩膜导致除零.
pub const DICE_SMOOTH: f32 = 1.0;

/// 余弦相似度的范数下限.
pub const COSINE_EPS: f32 = 1e-8;

/// 样本是否有配对的真值掩膜?
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Sign {
    /// 有标注: 样本携带真值掩膜.
    Label,

    /// 无标注: 样本仅有图像本身.
    Unlabel,
}

impl Sign {
    /// 是否有标注.
    #[inline]
    pub fn is_label(&self) -> bool {
        matches!(self, Self::Label)
    }

    /// 是否无标注.
    #[inline]
    pub fn is_unlabel(&self) -> bool {
        !self.is_label()
    }
}

/// 数据集运行模式.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Mode {
    /// 训练集.
    Train,

    /// 验证集.
    Valid,

    /// 测试集.
    Test,
}

impl Mode {
    /// 是否为训练模式.
    #[inline]
    pub fn is_train(&self) -> bool {
        matches!(self, Self::Train)
    }

    /// 是否为测试模式.
    #[inline]
    pub fn is_test(&self) -> bool {
        matches!(self, Self::Test)
    }
}
