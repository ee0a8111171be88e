//! 重新生成 TN3K 测试集清单.
//!
//! 递归枚举 `{root}/tn3k/test-image` 下的所有文件, 取每条路径末尾的
//! `tn3k/test-image/<文件>` 片段, 逐行写入 `{root}/tn3k/test.txt`.
//!
//! 根目录解析:
//!
//! 1. 若环境变量 `$TN3K_ROOT_DIR` 非空, 则使用其值;
//! 2. 否则使用 `$HOME/dataset`.

use std::env;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tn_berry::dataset;

/// 获取 TN3K 数据集根目录.
fn root_from_env_or_home() -> PathBuf {
    if let Ok(d) = env::var("TN3K_ROOT_DIR") {
        PathBuf::from(d)
    } else {
        dataset::home_dataset_dir().expect("无法定位用户主目录")
    }
}

/// 取路径末尾的 `tn3k/test-image/<文件>` 片段.
fn manifest_fragment(path: &Path) -> Option<String> {
    let tail: Vec<_> = path
        .components()
        .rev()
        .take(3)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if tail.len() < 3 {
        return None;
    }
    Some(format!("{}/{}/{}", tail[2], tail[1], tail[0]))
}

fn run(root: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    let image_dir = root.join("tn3k/test-image");
    let files = dataset::walk_files(&image_dir)?;
    log::info!("在 `{}` 下找到 {} 个文件", image_dir.display(), files.len());

    let out_path = root.join("tn3k/test.txt");
    let mut out = BufWriter::new(File::create(&out_path)?);
    let mut written = 0usize;
    for file in &files {
        match manifest_fragment(file) {
            Some(line) => {
                writeln!(out, "{line}")?;
                written += 1;
            }
            None => log::warn!("跳过过浅的路径 `{}`", file.display()),
        }
    }
    out.flush()?;
    log::info!("已写入 {written} 行到 `{}`", out_path.display());
    Ok(written)
}

fn main() -> ExitCode {
    simple_logger::init_with_level(log::Level::Info).expect("日志初始化失败");

    let root = root_from_env_or_home();
    match run(&root) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("清单生成失败: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::manifest_fragment;
    use std::path::Path;

    #[test]
    fn test_manifest_fragment() {
        let p = Path::new("/home/u/dataset/tn3k/test-image/0013.jpg");
        assert_eq!(
            manifest_fragment(p).unwrap(),
            "tn3k/test-image/0013.jpg"
        );
    }

    #[test]
    fn test_manifest_fragment_too_shallow() {
        assert!(manifest_fragment(Path::new("a.jpg")).is_none());
    }
}
