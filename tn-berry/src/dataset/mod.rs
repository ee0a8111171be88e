//! 数据集操作.

use crate::DatasetError;
use std::fs;
use std::path::{Path, PathBuf};

mod build;
pub mod split;
pub mod tn3k;

pub use build::{build_dataset, DatasetBundle};

/// 获取 `{用户主目录}/dataset` 目录.
pub fn home_dataset_dir() -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    Some(ans)
}

/// 获取 `{用户主目录}/dataset` 目录下给定继续项组成的全路径.
pub fn home_dataset_dir_with<P: AsRef<Path>, I: IntoIterator<Item = P>>(it: I) -> Option<PathBuf> {
    let mut ans = dirs::home_dir()?;
    ans.push("dataset");
    ans.extend(it);
    Some(ans)
}

/// 递归枚举 `dir` 下的所有普通文件, 返回绝对路径.
///
/// # 注意
///
/// 1. 枚举顺序即目录迭代顺序, 跨平台不保证稳定.
///   测试集清单依赖该顺序, 这是一处已知的潜在非确定性, 刻意不做排序.
/// 2. `dir` 不存在或不可读时返回 `Result::Err`.
pub fn walk_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut out = Vec::new();
    walk_into(dir, &mut out)?;
    Ok(out)
}

fn walk_into(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DatasetError> {
    let entries = fs::read_dir(dir).map_err(|source| DatasetError::Io {
        path: dir.to_owned(),
        source,
    })?;
    for entry in entries {
        let entry = entry.map_err(|source| DatasetError::Io {
            path: dir.to_owned(),
            source,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk_into(&path, out)?;
        } else {
            let abs = fs::canonicalize(&path).map_err(|source| DatasetError::Io {
                path: path.clone(),
                source,
            })?;
            out.push(abs);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::walk_files;
    use std::fs;

    #[test]
    fn test_walk_files_recurses() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.jpg"), b"x").unwrap();
        fs::write(dir.path().join("sub/b.jpg"), b"x").unwrap();

        let files = walk_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_walk_files_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("does-not-exist");
        assert!(walk_files(&gone).is_err());
    }
}
