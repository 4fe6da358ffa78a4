use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{MetaError, Result};
use crate::uri::Layout;

/// Top-level configuration of one metadata run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    /// Parent folder of all repositories (or the flat/release data folder)
    pub corpus_path: PathBuf,
    /// Folder names pruned during the walk
    #[serde(default = "default_exclude")]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub layout: Layout,
    /// Add a `char_length` column and keep character counts up to date
    #[serde(default)]
    pub incl_char_length: bool,
    /// Put Arabic-script and transliterated author/title in separate columns
    #[serde(default)]
    pub split_ar_lat: bool,
    /// Recount every text even when the sidecar already holds a length
    #[serde(default)]
    pub recount: bool,
    #[serde(default)]
    pub output: OutputConfig,
    /// Tab-separated `version_id\ttag;tag` list
    #[serde(default)]
    pub tags_path: Option<PathBuf>,
    /// One place authority code per line
    #[serde(default)]
    pub gazetteer_path: Option<PathBuf>,
    /// Folder with manuscript and location sidecars
    #[serde(default)]
    pub manuscripts_path: Option<PathBuf>,
    /// Pre-fetched tracker issues (JSON array)
    #[serde(default)]
    pub issues_path: Option<PathBuf>,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Where the artifacts go.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// Replaces `corpus_path` in the `url` column (e.g. a raw GitHub prefix)
    #[serde(default)]
    pub output_files_path: Option<String>,
    #[serde(default)]
    pub meta_tsv_path: Option<PathBuf>,
    #[serde(default)]
    pub meta_yml_path: Option<PathBuf>,
    #[serde(default)]
    pub meta_json_path: Option<PathBuf>,
    #[serde(default)]
    pub header_json_path: Option<PathBuf>,
}

/// Knobs of the primary-version resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// Tag in the version issues field that declares a primary version
    #[serde(default = "default_primary_tag")]
    pub primary_tag: String,
    /// Collections always ranked last, matched against the text path
    #[serde(default = "default_low_priority_tags")]
    pub low_priority_tags: Vec<String>,
}

fn default_exclude() -> Vec<String> {
    [
        ".git",
        "OpenITI.github.io",
        "Annotation",
        "maintenance",
        "i.logic",
        "i.cex",
        "i.cex_Temp",
        "i.mech",
        "i.mech_Temp",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("./output")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: default_output_path(),
            output_files_path: None,
            meta_tsv_path: None,
            meta_yml_path: None,
            meta_json_path: None,
            header_json_path: None,
        }
    }
}

fn default_primary_tag() -> String {
    "PRIMARY_VERSION".to_string()
}

fn default_low_priority_tags() -> Vec<String> {
    vec!["Sham30K".to_string()]
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            primary_tag: default_primary_tag(),
            low_priority_tags: default_low_priority_tags(),
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("./data"),
            exclude: default_exclude(),
            layout: Layout::default(),
            incl_char_length: false,
            split_ar_lat: false,
            recount: false,
            output: OutputConfig::default(),
            tags_path: None,
            gazetteer_path: None,
            manuscripts_path: None,
            issues_path: None,
            status: StatusConfig::default(),
        }
    }
}

impl MetadataConfig {
    pub fn from_yaml(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Load config from a specific path
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.corpus_path.as_os_str().is_empty() {
            return Err(MetaError::Config("corpus_path must not be empty".to_string()));
        }
        if self.status.primary_tag.trim().is_empty() {
            return Err(MetaError::Config("primary_tag must not be empty".to_string()));
        }
        Ok(())
    }

    /// Artifact name prefix derived from the corpus path:
    /// `../RELEASE/data` -> `RELEASE_data`.
    pub fn corpus_slug(&self) -> String {
        let raw = self.corpus_path.to_string_lossy().replace('\\', "/");
        let trimmed = raw.trim_start_matches(['.', '/']).trim_end_matches('/');
        let slug = trimmed.replace(['/', ':'], "_");
        if slug.is_empty() {
            "corpus".to_string()
        } else {
            slug
        }
    }

    /// Default location of an artifact: `{output_path}/{slug}_{name}`.
    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.output
            .output_path
            .join(format!("{}_{}", self.corpus_slug(), name))
    }

    pub fn meta_tsv_path(&self) -> PathBuf {
        self.output
            .meta_tsv_path
            .clone()
            .unwrap_or_else(|| self.artifact_path("metadata_light.csv"))
    }

    pub fn meta_yml_path(&self) -> PathBuf {
        self.output
            .meta_yml_path
            .clone()
            .unwrap_or_else(|| self.artifact_path("metadata_complete.yml"))
    }

    pub fn meta_json_path(&self) -> PathBuf {
        self.output
            .meta_json_path
            .clone()
            .unwrap_or_else(|| self.artifact_path("metadata_light.json"))
    }

    pub fn header_json_path(&self) -> PathBuf {
        self.output
            .header_json_path
            .clone()
            .unwrap_or_else(|| self.artifact_path("header_metadata.json"))
    }
}
