use anyhow::Result;
use ignore::{DirEntry, WalkBuilder, WalkState};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

const JAR_EXTENSION: &str = "jar";

/// Collects every jar file below `base_path`, sorted for stable output.
pub fn scan_jars(base_path: &Path) -> Result<Vec<PathBuf>> {
    if !base_path.is_dir() {
        anyhow::bail!("Not a directory: {}", base_path.display());
    }

    let (tx, rx) = mpsc::channel();

    WalkBuilder::new(base_path)
        .hidden(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .build_parallel()
        .run(|| {
            let tx = tx.clone();
            Box::new(move |entry| match entry {
                Ok(entry) if is_jar(&entry) => {
                    if tx.send(entry.into_path()).is_err() {
                        return WalkState::Quit;
                    }
                    WalkState::Continue
                }
                Ok(_) => WalkState::Continue,
                Err(err) => {
                    tracing::debug!(root = %base_path.display(), error = %err, "skipping unreadable path");
                    WalkState::Continue
                }
            })
        });

    drop(tx);
    let mut jars: Vec<PathBuf> = rx.into_iter().collect();
    jars.sort();
    tracing::debug!(root = %base_path.display(), jars = jars.len(), "scanned for jars");
    Ok(jars)
}

fn is_jar(entry: &DirEntry) -> bool {
    entry.file_type().is_some_and(|t| t.is_file())
        && entry
            .path()
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case(JAR_EXTENSION))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_dir(prefix: &str) -> PathBuf {
        let mut p = std::env::temp_dir();
        p.push(format!(
            "{prefix}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        p
    }

    #[test]
    fn scan_jars_finds_nested_archives_only() {
        let base = temp_dir("class-packages-scan");
        let nested = base.join("lib/nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(base.join("lib/a.jar"), b"").unwrap();
        fs::write(nested.join("b.jar"), b"").unwrap();
        fs::write(nested.join("notes.txt"), b"").unwrap();

        let jars = scan_jars(&base).unwrap();
        assert_eq!(jars, vec![base.join("lib/a.jar"), nested.join("b.jar")]);

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn scan_jars_skips_directories_named_like_jars() {
        let base = temp_dir("class-packages-scan-dirs");
        fs::create_dir_all(base.join("exploded.jar/org")).unwrap();
        fs::write(base.join("exploded.jar/org/inner.jar"), b"").unwrap();
        fs::write(base.join("UPPER.JAR"), b"").unwrap();

        let jars = scan_jars(&base).unwrap();
        assert_eq!(jars, vec![base.join("UPPER.JAR"), base.join("exploded.jar/org/inner.jar")]);

        let _ = fs::remove_dir_all(&base);
    }

    #[test]
    fn scan_jars_rejects_missing_directory() {
        assert!(scan_jars(&temp_dir("class-packages-missing")).is_err());
    }
}
