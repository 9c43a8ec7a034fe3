use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::BridgeResult;

/// Directory that receives exported workbooks.
///
/// Files are named `output.xlsx`, `output_1.xlsx`, `output_2.xlsx`, ... and are
/// never removed.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
    stem: String,
    extension: String,
}

impl OutputDir {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            stem: "output".to_string(),
            extension: "xlsx".to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path for the `n`th candidate: 0 → `output.xlsx`, n → `output_n.xlsx`
    pub fn candidate(&self, n: u32) -> PathBuf {
        let name = if n == 0 {
            format!("{}.{}", self.stem, self.extension)
        } else {
            format!("{}_{}.{}", self.stem, n, self.extension)
        };
        self.root.join(name)
    }

    /// Create the first unused candidate file.
    ///
    /// Uses exclusive create, so concurrent callers never get the same path.
    pub fn create_unique(&self) -> io::Result<(PathBuf, File)> {
        fs::create_dir_all(&self.root)?;

        let mut n = 0u32;
        loop {
            let path = self.candidate(n);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    n = n.checked_add(1).ok_or_else(|| {
                        io::Error::other(format!(
                            "no free output name left in {}",
                            self.root.display()
                        ))
                    })?;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Write `bytes` to a fresh output file and return its path
    pub fn save(&self, bytes: &[u8]) -> BridgeResult<PathBuf> {
        let (path, mut file) = self.create_unique()?;
        file.write_all(bytes)?;
        file.sync_all()?;
        info!(path = %path.display(), bytes = bytes.len(), "Saved workbook");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_candidate_names() {
        let dir = OutputDir::new("/srv/out");
        assert_eq!(dir.candidate(0), PathBuf::from("/srv/out/output.xlsx"));
        assert_eq!(dir.candidate(1), PathBuf::from("/srv/out/output_1.xlsx"));
        assert_eq!(dir.candidate(12), PathBuf::from("/srv/out/output_12.xlsx"));
    }

    #[test]
    fn test_sequential_saves() {
        let temp = TempDir::new().unwrap();
        let dir = OutputDir::new(temp.path());

        let first = dir.save(b"one").unwrap();
        let second = dir.save(b"two").unwrap();
        let third = dir.save(b"three").unwrap();

        assert_eq!(first.file_name().unwrap(), "output.xlsx");
        assert_eq!(second.file_name().unwrap(), "output_1.xlsx");
        assert_eq!(third.file_name().unwrap(), "output_2.xlsx");
        assert_eq!(fs::read(&first).unwrap(), b"one");
        assert_eq!(fs::read(&second).unwrap(), b"two");
    }

    #[test]
    fn test_fills_gap_after_existing_files() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("output.xlsx"), b"old").unwrap();
        fs::write(temp.path().join("output_1.xlsx"), b"old").unwrap();

        let path = OutputDir::new(temp.path()).save(b"new").unwrap();
        assert_eq!(path.file_name().unwrap(), "output_2.xlsx");
        assert_eq!(fs::read(temp.path().join("output.xlsx")).unwrap(), b"old");
    }

    #[test]
    fn test_creates_missing_directory() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("a").join("b");
        let path = OutputDir::new(&nested).save(b"x").unwrap();
        assert!(path.starts_with(&nested));
        assert!(path.exists());
    }

    #[test]
    fn test_concurrent_saves_never_collide() {
        let temp = TempDir::new().unwrap();
        let dir = OutputDir::new(temp.path());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let dir = dir.clone();
                std::thread::spawn(move || dir.save(b"x").unwrap())
            })
            .collect();
        let mut paths: Vec<PathBuf> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        paths.sort();
        paths.dedup();

        assert_eq!(paths.len(), 8);
    }
}
