use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct ProjectConfig {
    pub config_dir: PathBuf,
    pub file: ConfigFile,
}

impl ProjectConfig {
    pub fn load(config_path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(config_path).map_err(|e| {
            anyhow::anyhow!(
                "failed to read config file {}: {e}",
                config_path.display()
            )
        })?;
        Self::parse(config_path, &raw)
    }

    pub fn parse(config_path: &Path, raw: &str) -> anyhow::Result<Self> {
        let config_dir = config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();

        let file: ConfigFile = toml::from_str(raw).map_err(|e| {
            anyhow::anyhow!(
                "failed to parse config file {}: {e}",
                config_path.display()
            )
        })?;
        file.validate()?;

        Ok(Self { config_dir, file })
    }

    pub fn resolve_path(&self, p: impl AsRef<Path>) -> PathBuf {
        let p = p.as_ref();
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.config_dir.join(p)
        }
    }

    /// Schema files matched by the `schemas` globs, sorted and deduplicated.
    pub fn schema_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for pattern in &self.file.schemas {
            let full = self.resolve_path(pattern);
            let full = full.to_string_lossy();
            let paths = glob::glob(&full)
                .map_err(|e| anyhow::anyhow!("invalid schema pattern {pattern}: {e}"))?;
            let mut matched = false;
            for entry in paths {
                let path = entry.map_err(|e| anyhow::anyhow!("failed to read {pattern}: {e}"))?;
                if path.is_file() {
                    out.push(path);
                    matched = true;
                }
            }
            if !matched {
                anyhow::bail!("schema pattern matched no files: {pattern}");
            }
        }
        out.sort();
        out.dedup();
        Ok(out)
    }

    pub fn sql_file(&self) -> PathBuf {
        self.resolve_path(&self.file.output.sql_file)
    }

    pub fn orm_dir(&self) -> PathBuf {
        self.resolve_path(&self.file.output.orm_dir)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,

    #[serde(default)]
    pub output: OutputConfig,

    pub schemas: Vec<String>,

    /// Rust type overrides keyed by SQL type name.
    #[serde(default)]
    pub types: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_sql_file")]
    pub sql_file: String,
    #[serde(default = "default_orm_dir")]
    pub orm_dir: String,
}

fn default_sql_file() -> String {
    "sql/models.sql".to_string()
}

fn default_orm_dir() -> String {
    "src/orm".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            sql_file: default_sql_file(),
            orm_dir: default_orm_dir(),
        }
    }
}

impl ConfigFile {
    fn validate(&self) -> anyhow::Result<()> {
        if self.version.trim() != "1" {
            anyhow::bail!("unsupported config version: {}", self.version);
        }
        if self.schemas.is_empty() {
            anyhow::bail!("schemas must list at least one file pattern");
        }
        if self.output.sql_file.trim().is_empty() {
            anyhow::bail!("output.sql_file must not be empty");
        }
        if self.output.orm_dir.trim().is_empty() {
            anyhow::bail!("output.orm_dir must not be empty");
        }
        Ok(())
    }
}
