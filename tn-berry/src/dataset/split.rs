//! 划分解析器.
//!
//! 按 (expID, mode, sign) 组合将数据集根目录解析为具体的样本路径序列:
//! 训练/验证模式读取预生成的清单文本, 测试模式递归枚举目录树.

use crate::consts::{Mode, Sign, SPLIT_BUCKETS, TEST_IMAGE_DIR, TRAINVAL_IMAGE_DIR, VAL_MANIFEST};
use crate::{ConfigError, DatasetError};
use std::fs;
use std::path::{Path, PathBuf};

/// 实验规模 ID. 合法取值为 `1..=3`, 依次对应 322/644/1289 有标注样本桶.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum ExpId {
    /// 322 有标注样本.
    Exp1,

    /// 644 有标注样本.
    Exp2,

    /// 1289 有标注样本.
    Exp3,
}

impl ExpId {
    /// 从原始数值构造. 非法取值在配置边界立即失败,
    /// 绝不把未解析的清单路径延迟到文件打开时才暴露.
    pub fn new(raw: u8) -> Result<Self, ConfigError> {
        match raw {
            1 => Ok(Self::Exp1),
            2 => Ok(Self::Exp2),
            3 => Ok(Self::Exp3),
            other => Err(ConfigError::InvalidExpId(other)),
        }
    }

    /// 该实验对应的有标注样本桶大小.
    #[inline]
    pub fn bucket(&self) -> u32 {
        SPLIT_BUCKETS[*self as usize]
    }

    /// `root` 下该实验的清单文件路径. `sign` 决定读取
    /// `labeled.txt` 还是 `unlabeled.txt`.
    pub fn manifest_path(&self, root: &Path, sign: Sign) -> PathBuf {
        let name = match sign {
            Sign::Label => "labeled.txt",
            Sign::Unlabel => "unlabeled.txt",
        };
        root.join(format!("data/splits/tn3k/{}/{name}", self.bucket()))
    }
}

impl TryFrom<u8> for ExpId {
    type Error = ConfigError;

    fn try_from(raw: u8) -> Result<Self, ConfigError> {
        Self::new(raw)
    }
}

impl From<ExpId> for u8 {
    fn from(id: ExpId) -> u8 {
        id as u8 + 1
    }
}

/// 读取清单文本, 返回逐行的相对片段, 保持文件内顺序.
/// 末尾空行被忽略 (与原始清单生成方的行为一致).
fn read_manifest(path: &Path) -> Result<Vec<String>, DatasetError> {
    let text = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: path.to_owned(),
        source,
    })?;
    Ok(text
        .lines()
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
        .collect())
}

/// 将 (root, expID, mode, sign) 解析为有序的样本文件路径序列.
///
/// # 注意
///
/// 1. 训练/验证模式: 清单各行映射到 `root/tn3k/trainval-image/<line>`,
///   顺序与清单一致.
/// 2. 验证模式忽略 `exp_id` 与 `sign`.
/// 3. 测试模式不读清单, 而是递归枚举 `root/tn3k/test-image`
///   下的所有文件并取绝对路径. 枚举顺序依赖文件系统
///   (见 [`walk_files`](super::walk_files)); 与其他模式不同, 路径是绝对的.
pub fn resolve(
    root: &Path,
    exp_id: ExpId,
    mode: Mode,
    sign: Sign,
) -> Result<Vec<PathBuf>, DatasetError> {
    match mode {
        Mode::Train => {
            let manifest = exp_id.manifest_path(root, sign);
            let image_dir = root.join(TRAINVAL_IMAGE_DIR);
            Ok(read_manifest(&manifest)?
                .into_iter()
                .map(|line| image_dir.join(line))
                .collect())
        }
        Mode::Valid => {
            let manifest = root.join(VAL_MANIFEST);
            let image_dir = root.join(TRAINVAL_IMAGE_DIR);
            Ok(read_manifest(&manifest)?
                .into_iter()
                .map(|line| image_dir.join(line))
                .collect())
        }
        Mode::Test => super::walk_files(&root.join(TEST_IMAGE_DIR)),
    }
}
