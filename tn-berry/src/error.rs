//! 运行时错误.

use std::fmt;
use std::path::PathBuf;

/// 构造期配置错误. 致命且不可重试.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// 实验 ID 不在 `1..=3` 范围内.
    InvalidExpId(u8),

    /// 数据集名未注册.
    UnknownDataset(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidExpId(id) => {
                write!(f, "实验 ID 必须在 1..=3 范围内, 但提供了 `{id}`")
            }
            Self::UnknownDataset(name) => {
                write!(f, "未注册的数据集名 `{name}`")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// 数据集访问期错误.
#[derive(Debug)]
pub enum DatasetError {
    /// 构造期配置错误.
    Config(ConfigError),

    /// 清单读取或目录枚举的底层 I/O 错误.
    Io {
        /// 出错的文件或目录.
        path: PathBuf,
        /// 底层错误.
        source: std::io::Error,
    },

    /// 图像解码错误.
    Image {
        /// 出错的图像文件.
        path: PathBuf,
        /// 底层错误.
        source: image::ImageError,
    },

    /// 图像路径中不存在期望的目录标记, 无法改写为掩膜路径.
    /// 这是数据完整性错误, 不做静默回退.
    MaskToken {
        /// 不合法的图像路径.
        path: PathBuf,
        /// 期望存在的标记.
        token: &'static str,
    },

    /// 索引越界.
    OutOfBounds {
        /// 访问的索引.
        index: usize,
        /// 集合长度.
        len: usize,
    },
}

impl fmt::Display for DatasetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "配置错误: {e}"),
            Self::Io { path, source } => {
                write!(f, "读取 `{}` 失败: {source}", path.display())
            }
            Self::Image { path, source } => {
                write!(f, "解码图像 `{}` 失败: {source}", path.display())
            }
            Self::MaskToken { path, token } => {
                write!(
                    f,
                    "图像路径 `{}` 中不存在标记 `{token}`, 无法导出掩膜路径",
                    path.display()
                )
            }
            Self::OutOfBounds { index, len } => {
                write!(f, "索引 {index} 超出数据集长度 {len}")
            }
        }
    }
}

impl std::error::Error for DatasetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            Self::Image { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for DatasetError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
