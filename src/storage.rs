use serde::{Serialize, de::DeserializeOwned};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::Context;

/// Writes `bytes` to `path` through a sibling `.tmp` file and a rename, so a
/// crash mid-write leaves the previous file intact.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)
}

/// JSON files (config, exported results) kept in one directory.
pub struct Storage {
    pub base_dir: PathBuf,
}

impl Storage {
    pub fn new<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Storage directory next to the running executable.
    pub fn new_relative<P: AsRef<Path>>(relative_path: P) -> anyhow::Result<Self> {
        let exe_path = std::env::current_exe()?;
        let base_dir = exe_path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Could not find binary directory"))?
            .join(relative_path);

        Ok(Self { base_dir })
    }

    fn json_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(format!("{}.json", name))
    }

    /// Saves `data` as pretty JSON under `<name>.json`, creating the directory on first use.
    pub fn save<T: Serialize>(&self, name: &str, data: &T) -> anyhow::Result<PathBuf> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir)
                .with_context(|| format!("creating {}", self.base_dir.display()))?;
        }

        let path = self.json_path(name);
        let json_bytes = serde_json::to_vec_pretty(data)?;
        write_atomic(&path, &json_bytes).with_context(|| format!("writing {}", path.display()))?;

        tracing::debug!(path = %path.display(), "saved json");
        Ok(path)
    }

    pub fn load<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<T> {
        let path = self.json_path(name);
        let content = fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let data = serde_json::from_slice(&content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(data)
    }

    /// Like [`Storage::load`], but a missing file is `None` rather than an error.
    pub fn load_optional<T: DeserializeOwned>(&self, name: &str) -> anyhow::Result<Option<T>> {
        if !self.json_path(name).exists() {
            return Ok(None);
        }
        self.load(name).map(Some)
    }
}
