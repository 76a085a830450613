// crates/av_workflow/src/naming.rs

//! 输出文件命名与输出目录准备

use std::fs::DirBuilder;
use std::path::{Path, PathBuf};

use crate::error::{WorkflowError, WorkflowResult};

/// 输出图像扩展名
pub const IMAGE_EXTENSION: &str = "png";

/// 第 `index` 个快照的文件名
///
/// `{prefix}_{index:04}` 去掉首尾空白，再去掉一个前导 `_`（空前缀时），
/// 最后加上 `.png`。
pub fn output_file_name(prefix: &str, index: usize) -> String {
    let stem = format!("{prefix}_{index:04}");
    let stem = stem.trim();
    let stem = stem.strip_prefix('_').unwrap_or(stem);
    format!("{stem}.{IMAGE_EXTENSION}")
}

/// 第 `index` 个快照的输出路径
pub fn output_path(directory: &Path, prefix: &str, index: usize) -> PathBuf {
    directory.join(output_file_name(prefix, index))
}

/// 递归创建输出目录（unix 下权限 0o755），已存在时不做任何事
pub fn prepare_output_directory(directory: &Path) -> WorkflowResult<()> {
    let mut builder = DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder
        .create(directory)
        .map_err(|source| WorkflowError::OutputDirectory {
            path: directory.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prefix() {
        assert_eq!(output_file_name("default_run", 0), "default_run_0000.png");
        assert_eq!(output_file_name("default_run", 42), "default_run_0042.png");
    }

    #[test]
    fn test_empty_prefix() {
        assert_eq!(output_file_name("", 0), "0000.png");
        assert_eq!(output_file_name("", 7), "0007.png");
    }

    #[test]
    fn test_whitespace_trimmed() {
        assert_eq!(output_file_name("  sod ", 3), "sod _0003.png");
        assert_eq!(output_file_name("   ", 1), "0001.png");
    }

    #[test]
    fn test_only_one_underscore_stripped() {
        assert_eq!(output_file_name("_run", 1), "run_0001.png");
        assert_eq!(output_file_name("__run", 1), "_run_0001.png");
    }

    #[test]
    fn test_wide_index_not_truncated() {
        assert_eq!(output_file_name("r", 12345), "r_12345.png");
    }

    #[test]
    fn test_names_sort_in_submission_order() {
        let names: Vec<String> = (0..120).map(|i| output_file_name("run", i)).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_prepare_output_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        prepare_output_directory(&nested).unwrap();
        assert!(nested.is_dir());
        // 已存在
        prepare_output_directory(&nested).unwrap();

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&nested).unwrap().permissions().mode();
            assert_eq!(mode & 0o022, 0);
        }
    }

    #[test]
    fn test_prepare_output_directory_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("taken");
        std::fs::write(&file, b"x").unwrap();
        assert!(matches!(
            prepare_output_directory(&file),
            Err(WorkflowError::OutputDirectory { .. })
        ));
    }
}
