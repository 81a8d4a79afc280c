use crate::core::Storage;
use crate::utils::error::{ExtractError, Result};
use std::path::Path;

/// Writes extracted files into one output directory.
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
    async fn create_root(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|source| ExtractError::OutputDirError {
                path: self.base_path.clone(),
                source,
            })
    }

    async fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(name);
        tokio::fs::write(&full_path, data)
            .await
            .map_err(|source| ExtractError::WriteError {
                path: full_path.display().to_string(),
                source,
            })
    }

    fn location(&self) -> &str {
        &self.base_path
    }
}
