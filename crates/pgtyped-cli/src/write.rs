use crate::codegen::GeneratedFile;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default)]
pub struct WriteOptions {
    pub dry_run: bool,
    pub check: bool,
}

#[derive(Debug, Default)]
pub struct WriteSummary {
    pub changed: Vec<PathBuf>,
    pub written: Vec<PathBuf>,
}

/// Write files whose content differs from what is on disk.
///
/// `dry_run` only reports; `check` fails if anything would change.
pub fn apply_generated_files(
    files: &[GeneratedFile],
    opts: WriteOptions,
) -> anyhow::Result<WriteSummary> {
    let mut files = files.to_vec();
    files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut summary = WriteSummary::default();
    for f in &files {
        let existing = std::fs::read_to_string(&f.path).ok();
        if existing.as_deref() != Some(f.content.as_str()) {
            summary.changed.push(f.path.clone());
        }
    }

    if opts.dry_run {
        for p in &summary.changed {
            tracing::info!("would write {}", p.display());
        }
        return Ok(summary);
    }

    if opts.check {
        if !summary.changed.is_empty() {
            let list = summary
                .changed
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join(", ");
            anyhow::bail!("generated files are out of date: {list}");
        }
        return Ok(summary);
    }

    for f in files.iter().filter(|f| summary.changed.contains(&f.path)) {
        write_atomic(&f.path, &f.content)?;
        summary.written.push(f.path.clone());
    }
    for p in &summary.written {
        tracing::info!("wrote {}", p.display());
    }

    Ok(summary)
}

/// Write through a sibling temp file and rename over the target.
pub fn write_atomic(path: &Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!("failed to create directory {}: {e}", parent.display())
            })?;
        }
    }

    let tmp = tmp_path(path);
    std::fs::write(&tmp, content)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", tmp.display()))?;
    std::fs::rename(&tmp, path).map_err(|e| {
        anyhow::anyhow!(
            "failed to rename {} -> {}: {e}",
            tmp.display(),
            path.display()
        )
    })?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => path.with_extension(format!("{ext}.tmp")),
        None => path.with_extension("tmp"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("pgtyped-write-{name}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    fn file(path: PathBuf, content: &str) -> GeneratedFile {
        GeneratedFile {
            path,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_write_then_check_is_clean() {
        let dir = scratch_dir("clean");
        let files = vec![file(dir.join("orm/users.rs"), "a"), file(dir.join("models.sql"), "b")];

        let summary = apply_generated_files(&files, WriteOptions::default()).unwrap();
        assert_eq!(summary.written.len(), 2);
        assert_eq!(std::fs::read_to_string(dir.join("orm/users.rs")).unwrap(), "a");
        assert!(!dir.join("orm/users.rs.tmp").exists());

        let check = WriteOptions {
            dry_run: false,
            check: true,
        };
        let summary = apply_generated_files(&files, check).unwrap();
        assert!(summary.changed.is_empty());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_check_fails_when_stale() {
        let dir = scratch_dir("stale");
        let path = dir.join("mod.rs");
        let opts = WriteOptions {
            dry_run: false,
            check: true,
        };
        let err = apply_generated_files(&[file(path.clone(), "x")], opts).unwrap_err();
        assert!(err.to_string().starts_with("generated files are out of date"));
        assert!(!path.exists());
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let dir = scratch_dir("dry");
        let path = dir.join("mod.rs");
        let opts = WriteOptions {
            dry_run: true,
            check: false,
        };
        let summary = apply_generated_files(&[file(path.clone(), "x")], opts).unwrap();
        assert_eq!(summary.changed, vec![path.clone()]);
        assert!(summary.written.is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn test_tmp_path() {
        assert_eq!(tmp_path(Path::new("a/b.rs")), PathBuf::from("a/b.rs.tmp"));
        assert_eq!(tmp_path(Path::new("a/b")), PathBuf::from("a/b.tmp"));
    }
}
