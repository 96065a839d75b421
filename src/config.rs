use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::analyzer::CHANGES_FILE;
use crate::domain::TagPattern;
use crate::error::{ReleasePostError, Result};
use crate::pipeline::PipelineSettings;
use crate::publish::DEFAULT_API_BASE;
use crate::render::RELEASE_TEMPLATE;

/// File name looked up in the current directory.
pub const LOCAL_CONFIG_FILE: &str = "releasepost.toml";

/// File name looked up in the user config directory.
pub const USER_CONFIG_FILE: &str = ".releasepost.toml";

/// Represents the complete configuration for release-post.
///
/// Every section is optional; missing values fall back to defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub product: ProductConfig,

    #[serde(default)]
    pub analyzer: AnalyzerConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub render: RenderConfig,

    #[serde(default)]
    pub publish: PublishConfig,
}

fn default_product_name() -> String {
    "WooCommerce".to_string()
}

fn default_source_repository() -> String {
    "https://github.com/woocommerce/woocommerce.git".to_string()
}

/// What is being released.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProductConfig {
    #[serde(default = "default_product_name")]
    pub name: String,

    #[serde(default = "default_source_repository")]
    pub source_repository: String,
}

impl Default for ProductConfig {
    fn default() -> Self {
        ProductConfig {
            name: default_product_name(),
            source_repository: default_source_repository(),
        }
    }
}

fn default_analyzer_command() -> String {
    "code-analyzer".to_string()
}

/// Returns the default analyzer arguments.
fn default_analyzer_args() -> Vec<String> {
    vec![
        "{compare}".to_string(),
        "{since}".to_string(),
        "-s".to_string(),
        "{source}".to_string(),
        "-b".to_string(),
        "{base}".to_string(),
    ]
}

fn default_output_file() -> String {
    CHANGES_FILE.to_string()
}

/// External change analyzer invocation.
///
/// `args` may use the `{compare}`, `{since}`, `{source}` and `{base}` placeholders.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AnalyzerConfig {
    #[serde(default = "default_analyzer_command")]
    pub command: String,

    #[serde(default = "default_analyzer_args")]
    pub args: Vec<String>,

    #[serde(default = "default_output_file")]
    pub output_file: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        AnalyzerConfig {
            command: default_analyzer_command(),
            args: default_analyzer_args(),
            output_file: default_output_file(),
        }
    }
}

fn default_repository() -> PathBuf {
    PathBuf::from(".")
}

fn default_tag_pattern() -> String {
    "{version}".to_string()
}

/// Where releases live in version control.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_repository")]
    pub repository: PathBuf,

    #[serde(default = "default_tag_pattern")]
    pub tag_pattern: String,
}

impl GitConfig {
    pub fn tag_pattern(&self) -> Result<TagPattern> {
        TagPattern::new(self.tag_pattern.clone())
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            repository: default_repository(),
            tag_pattern: default_tag_pattern(),
        }
    }
}

fn default_template_name() -> String {
    RELEASE_TEMPLATE.to_string()
}

/// Rendering of the release post.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RenderConfig {
    /// Directory holding custom templates; the built-in layout is used when unset
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    #[serde(default = "default_template_name")]
    pub template_name: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            templates_dir: None,
            template_name: default_template_name(),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_site_id() -> String {
    "96396764".to_string()
}

fn default_auth_token_env() -> String {
    "RELEASE_POST_AUTH_TOKEN".to_string()
}

/// Draft publishing target.
///
/// The token itself never lives in the file; it is read from the environment
/// variable named by `auth_token_env`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PublishConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_site_id")]
    pub site_id: String,

    #[serde(default = "default_auth_token_env")]
    pub auth_token_env: String,

    /// HTTP timeout in seconds; no timeout when unset
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl PublishConfig {
    pub fn auth_token(&self) -> Option<String> {
        std::env::var(&self.auth_token_env)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        PublishConfig {
            api_base: default_api_base(),
            site_id: default_site_id(),
            auth_token_env: default_auth_token_env(),
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Pipeline settings for this configuration, reading the auth token from
    /// the environment.
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            product_name: self.product.name.clone(),
            source_repository: self.product.source_repository.clone(),
            changes_file: self.analyzer.output_file.clone(),
            template_name: self.render.template_name.clone(),
            site_id: self.publish.site_id.clone(),
            auth_token: self.publish.auth_token(),
        }
    }
}

fn read_config_file(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|e| {
        ReleasePostError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    toml::from_str(&content)
        .map_err(|e| ReleasePostError::config(format!("Invalid {}: {}", path.display(), e)))
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `releasepost.toml` in current directory
/// 3. `.releasepost.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    if let Some(path) = config_path {
        return read_config_file(Path::new(path));
    }

    let local = Path::new(LOCAL_CONFIG_FILE);
    if local.exists() {
        return read_config_file(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
        let user_config = config_dir.join(USER_CONFIG_FILE);
        if user_config.exists() {
            return read_config_file(&user_config);
        }
    }

    Ok(Config::default())
}
