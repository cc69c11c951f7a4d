use crate::core::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Truncates any report left by a previous run.
        fs::write(full_path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_directories_and_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let base = temp_dir.path().join("nested/reports");
        let storage = LocalStorage::new(base.to_str().unwrap().to_string());

        tokio_test::block_on(storage.write_file("jamie.report.txt", b"first run, longer text\n")).unwrap();
        tokio_test::block_on(storage.write_file("jamie.report.txt", b"second\n")).unwrap();

        let content = std::fs::read_to_string(base.join("jamie.report.txt")).unwrap();
        assert_eq!(content, "second\n");
    }
}
