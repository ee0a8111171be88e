//! 数据集工厂.
//!
//! 按运行配置组装加载器组合. 新数据集通过扩展这里的分发表接入,
//! 而不是在代码各处按名称分支.

use crate::config::{Manner, RunConfig};
use crate::consts::{Mode, Sign};
use crate::dataset::tn3k::Tn3kDataset;
use crate::{ConfigError, DatasetError};

/// 一次运行可用的数据集组合.
pub enum DatasetBundle {
    /// 仅测试: 单个测试加载器.
    Test(Tn3kDataset),

    /// 训练: 有标注训练集 + 可选无标注训练集 + 验证集.
    /// `unlabeled` 的 `None` 表示该范式确实不消耗无标注数据,
    /// 与空加载器含义不同.
    Train {
        /// 有标注训练加载器.
        train: Tn3kDataset,

        /// 无标注训练加载器, 仅 semi/self 范式存在.
        unlabeled: Option<Tn3kDataset>,

        /// 验证加载器.
        valid: Tn3kDataset,
    },
}

impl std::fmt::Debug for DatasetBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Test(_) => f.write_str("Test(..)"),
            Self::Train { .. } => f.write_str("Train { .. }"),
        }
    }
}

/// 按配置构建数据集组合.
///
/// # 注意
///
/// 1. 未注册的 `dataset` 名在此处立即失败.
/// 2. `manner` 为 semi/self 时才构建无标注加载器.
pub fn build_dataset(cfg: &RunConfig) -> Result<DatasetBundle, DatasetError> {
    match cfg.dataset.as_str() {
        "tn3k" => build_tn3k(cfg),
        other => Err(ConfigError::UnknownDataset(other.to_owned()).into()),
    }
}

fn build_tn3k(cfg: &RunConfig) -> Result<DatasetBundle, DatasetError> {
    if cfg.manner == Manner::Test {
        let test = Tn3kDataset::new(&cfg.root, cfg.exp_id, Mode::Test, Sign::Label, None)?;
        return Ok(DatasetBundle::Test(test));
    }

    let train = Tn3kDataset::new(&cfg.root, cfg.exp_id, Mode::Train, Sign::Label, None)?;
    let valid = Tn3kDataset::new(&cfg.root, cfg.exp_id, Mode::Valid, Sign::Label, None)?;
    let unlabeled = if cfg.manner.wants_unlabeled() {
        Some(Tn3kDataset::new(
            &cfg.root,
            cfg.exp_id,
            Mode::Train,
            Sign::Unlabel,
            None,
        )?)
    } else {
        None
    };

    Ok(DatasetBundle::Train {
        train,
        unlabeled,
        valid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::split::ExpId;
    use image::{GrayImage, RgbImage};
    use std::fs;
    use std::path::Path;

    fn write_png(path: &Path, rgb: bool) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        if rgb {
            RgbImage::new(32, 32).save(path).unwrap();
        } else {
            GrayImage::new(32, 32).save(path).unwrap();
        }
    }

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("data/splits/tn3k/322")).unwrap();
        fs::write(root.join("data/splits/tn3k/322/labeled.txt"), "a.png\n").unwrap();
        fs::write(root.join("data/splits/tn3k/322/unlabeled.txt"), "b.png\n").unwrap();
        fs::write(root.join("data/splits/tn3k/val.txt"), "a.png\n").unwrap();
        for name in ["a.png", "b.png"] {
            write_png(&root.join("tn3k/trainval-image").join(name), true);
            write_png(&root.join("tn3k/trainval-mask").join(name), false);
        }
        write_png(&root.join("tn3k/test-image/t.png"), true);
        write_png(&root.join("tn3k/test-mask/t.png"), false);
        dir
    }

    fn cfg(dir: &tempfile::TempDir, manner: Manner) -> RunConfig {
        RunConfig {
            manner,
            dataset: "tn3k".to_owned(),
            root: dir.path().to_owned(),
            exp_id: ExpId::Exp1,
            ratio: 10,
        }
    }

    #[test]
    fn test_semi_bundle_has_unlabeled() {
        let dir = fixture();
        match build_dataset(&cfg(&dir, Manner::Semi)).unwrap() {
            DatasetBundle::Train {
                train,
                unlabeled,
                valid,
            } => {
                assert_eq!(train.len(), 1);
                assert_eq!(valid.len(), 1);
                assert!(unlabeled.is_some());
            }
            DatasetBundle::Test(_) => panic!("semi 范式不应返回测试组合"),
        }
    }

    #[test]
    fn test_supervised_bundle_lacks_unlabeled() {
        let dir = fixture();
        match build_dataset(&cfg(&dir, Manner::Train)).unwrap() {
            DatasetBundle::Train { unlabeled, .. } => assert!(unlabeled.is_none()),
            DatasetBundle::Test(_) => panic!("train 范式不应返回测试组合"),
        }
    }

    #[test]
    fn test_self_sup_bundle_has_unlabeled() {
        let dir = fixture();
        match build_dataset(&cfg(&dir, Manner::SelfSup)).unwrap() {
            DatasetBundle::Train { unlabeled, .. } => assert!(unlabeled.is_some()),
            DatasetBundle::Test(_) => panic!("self 范式不应返回测试组合"),
        }
    }

    #[test]
    fn test_test_bundle() {
        let dir = fixture();
        match build_dataset(&cfg(&dir, Manner::Test)).unwrap() {
            DatasetBundle::Test(ds) => assert_eq!(ds.len(), 1),
            DatasetBundle::Train { .. } => panic!("test 范式必须返回测试组合"),
        }
    }

    #[test]
    fn test_unknown_dataset_name() {
        let dir = fixture();
        let mut c = cfg(&dir, Manner::Train);
        c.dataset = "ddti".to_owned();
        let err = build_dataset(&c).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Config(ConfigError::UnknownDataset(_))
        ));
    }
}
