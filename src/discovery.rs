use crate::error::SweepError;
use anyhow::{Context, Result};
use glob::Pattern;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Which files under the root take part in a run.
#[derive(Debug, Clone)]
pub struct FileFilter {
    pub extensions: Vec<String>,
    pub exclude: Vec<Pattern>,
}

impl FileFilter {
    pub fn new(extensions: &[String], exclude: &[String]) -> Result<Self> {
        let exclude = exclude
            .iter()
            .map(|p| Pattern::new(p).with_context(|| format!("invalid exclude pattern: {}", p)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_string())
                .collect(),
            exclude,
        })
    }

    fn wants(&self, root: &Path, path: &Path) -> bool {
        let ext_ok = path
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext));
        if !ext_ok {
            return false;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        !self.exclude.iter().any(|p| p.matches_path(rel))
    }
}

/// Every regular file under `root` with a wanted extension, sorted by path.
pub fn find_files(root: &Path, filter: &FileFilter) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(SweepError::DirectoryNotFound {
            path: root.to_path_buf(),
        }
        .into());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        if entry.file_type().is_file() && filter.wants(root, entry.path()) {
            files.push(entry.into_path());
        }
    }

    // Keep it deterministic
    files.sort();
    tracing::debug!(root = %root.display(), count = files.len(), "discovered files");
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn php_filter(exclude: &[&str]) -> FileFilter {
        let exclude: Vec<String> = exclude.iter().map(|s| s.to_string()).collect();
        FileFilter::new(&["php".to_string()], &exclude).unwrap()
    }

    #[test]
    fn finds_nested_files_in_sorted_order() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("mod_menu/deep")).unwrap();
        fs::create_dir_all(root.join("com_content")).unwrap();
        fs::write(root.join("z.php"), "").unwrap();
        fs::write(root.join("mod_menu/default.php"), "").unwrap();
        fs::write(root.join("mod_menu/deep/item.php"), "").unwrap();
        fs::write(root.join("com_content/article.php"), "").unwrap();
        fs::write(root.join("com_content/readme.txt"), "").unwrap();
        fs::write(root.join("com_content/style.PHP.bak"), "").unwrap();

        let files = find_files(root, &php_filter(&[])).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            rel,
            vec![
                "com_content/article.php",
                "mod_menu/deep/item.php",
                "mod_menu/default.php",
                "z.php"
            ]
        );
    }

    #[test]
    fn directories_with_matching_names_are_skipped() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("odd.php")).unwrap();
        assert!(find_files(dir.path(), &php_filter(&[])).unwrap().is_empty());
    }

    #[test]
    fn exclude_patterns_match_relative_paths() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("vendor/lib")).unwrap();
        fs::write(root.join("vendor/lib/a.php"), "").unwrap();
        fs::write(root.join("b.php"), "").unwrap();

        let files = find_files(root, &php_filter(&["vendor/**"])).unwrap();
        assert_eq!(files, vec![root.join("b.php")]);
    }

    #[test]
    fn leading_dot_in_extension_is_ignored() {
        let filter = FileFilter::new(&[".php".to_string()], &[]).unwrap();
        assert_eq!(filter.extensions, vec!["php".to_string()]);
    }

    #[test]
    fn invalid_exclude_pattern_is_rejected() {
        assert!(FileFilter::new(&["php".to_string()], &["[".to_string()]).is_err());
    }

    #[test]
    fn missing_root_is_directory_not_found() {
        let dir = tempdir().unwrap();
        let err = find_files(&dir.path().join("nope"), &php_filter(&[])).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SweepError>(),
            Some(SweepError::DirectoryNotFound { .. })
        ));
    }
}
