//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `ENTITY_RESOURCE_`, nesting separator: `__`)
//! 2. Current working directory: ./config.toml
//! 3. XDG config directory: ~/.config/entity-resource/{service_name}/config.toml
//! 4. System directory: /etc/entity-resource/{service_name}/config.toml
//! 5. Default values
//!
//! For example `ENTITY_RESOURCE_RESOURCE__PAGINATION__MAX_PER_PAGE=500` caps
//! every page at 500 rows.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

const ENV_PREFIX: &str = "ENTITY_RESOURCE_";
const APP_DIR: &str = "entity-resource";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Middleware configuration
    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Entity resource behaviour
    #[serde(default)]
    pub resource: ResourceConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Environment (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            port: default_port(),
            log_level: default_log_level(),
            timeout_secs: default_timeout(),
            environment: default_environment(),
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// HTTP middleware configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    /// Enable panic recovery middleware
    #[serde(default = "default_true")]
    pub catch_panic: bool,

    /// CORS mode: "permissive", "restrictive" or "disabled"
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,

    /// Redirect requests forwarded over plain HTTP to HTTPS
    #[serde(default)]
    pub https_redirect: bool,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            catch_panic: true,
            cors_mode: default_cors_mode(),
            https_redirect: false,
        }
    }
}

/// Behaviour of one entity resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceConfig {
    /// Reject every operation from callers that are not logged in
    #[serde(default)]
    pub requires_login: bool,

    #[serde(default)]
    pub sort: SortConfig,

    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub messages: ErrorMessages,
}

/// Sort query parameter syntax
///
/// A sort token looks like `A|owner.town`: a direction (`A` ascending,
/// anything else descending), the info separator, then an attribute path
/// split on the path separator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortConfig {
    /// Name of the repeated sort query parameter
    #[serde(default = "default_sort_parameter")]
    pub query_parameter: String,

    /// Separator between direction and path
    #[serde(default = "default_sort_info_separator")]
    pub info_separator: String,

    /// Separator between path segments
    #[serde(default = "default_sort_path_separator")]
    pub path_separator: String,

    /// Maximum number of sorts honoured per request
    #[serde(default = "default_max_sorts")]
    pub max_sorts: usize,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            query_parameter: default_sort_parameter(),
            info_separator: default_sort_info_separator(),
            path_separator: default_sort_path_separator(),
            max_sorts: default_max_sorts(),
        }
    }
}

/// Pagination parameter and header names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_start_parameter")]
    pub start_parameter: String,

    #[serde(default = "default_count_parameter")]
    pub count_parameter: String,

    #[serde(default = "default_start_header")]
    pub start_header: String,

    #[serde(default = "default_count_header")]
    pub count_header: String,

    #[serde(default = "default_total_count_header")]
    pub total_count_header: String,

    /// Page size cap; also the page size when no count is requested.
    /// Unset means unlimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_per_page: Option<u64>,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            start_parameter: default_start_parameter(),
            count_parameter: default_count_parameter(),
            start_header: default_start_header(),
            count_header: default_count_header(),
            total_count_header: default_total_count_header(),
            max_per_page: None,
        }
    }
}

/// Error message templates
///
/// Templates may reference `{entity}` (entity type name), `{id}` (entity id),
/// `{index}` (position in a batch) and `{ids}` (comma separated id list).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ErrorMessages {
    pub not_found: String,
    pub unauthorized_create: String,
    pub unauthorized_save: String,
    pub unauthorized_delete: String,
    pub version_conflict: String,
    pub duplicate_ids: String,
    pub empty_body: String,
    pub login_required: String,
    pub failed_save: String,
    pub failed_delete: String,
}

impl Default for ErrorMessages {
    fn default() -> Self {
        Self {
            not_found: "{entity} with ID {id} not found.".to_string(),
            unauthorized_create: "Not authorized to create {entity} #{index}.".to_string(),
            unauthorized_save: "Not authorized to save {entity} with ID {id}.".to_string(),
            unauthorized_delete: "Not authorized to delete {entity} with ID {id}.".to_string(),
            version_conflict: "{entity} with ID {id} has since been edited.".to_string(),
            duplicate_ids:
                "The following IDs were found more than once in the request body: {ids}"
                    .to_string(),
            empty_body: "Empty post body".to_string(),
            login_required: "You must be logged in to access {entity} resources.".to_string(),
            failed_save: "Failed to save {entity}".to_string(),
            failed_delete: "Failed to delete {entity}".to_string(),
        }
    }
}

/// Substitute `{key}` placeholders in a message template
///
/// ```rust
/// use entity_resource::config::render;
///
/// let message = render("{entity} with ID {id} not found.", &[("entity", "Person"), ("id", "7")]);
/// assert_eq!(message, "Person with ID 7 not found.");
/// ```
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    values
        .iter()
        .fold(template.to_string(), |message, (key, value)| {
            message.replace(&format!("{{{key}}}"), value)
        })
}

// Default value functions
fn default_service_name() -> String {
    APP_DIR.to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_true() -> bool {
    true
}

fn default_body_limit_mb() -> usize {
    10 // 10 MB
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_sort_parameter() -> String {
    "sort".to_string()
}

fn default_sort_info_separator() -> String {
    "|".to_string()
}

fn default_sort_path_separator() -> String {
    ".".to_string()
}

fn default_max_sorts() -> usize {
    3
}

fn default_start_parameter() -> String {
    "start".to_string()
}

fn default_count_parameter() -> String {
    "count".to_string()
}

fn default_start_header() -> String {
    "X-Start".to_string()
}

fn default_count_header() -> String {
    "X-Count".to_string()
}

fn default_total_count_header() -> String {
    "X-Total-Count".to_string()
}

impl Config {
    /// Load configuration from all sources
    ///
    /// The service name used for the config directories is taken from the
    /// running binary's file name.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|p| p.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(default_service_name);

        Self::load_for_service(&service_name)
    }

    /// Load configuration for a specific service name
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let config_paths = Self::find_config_paths(service_name);

        tracing::debug!(paths = ?config_paths, "Searching for config files");

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Lowest priority first, so later merges win
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!(path = %path.display(), "Loading configuration");
                figment = figment.merge(Toml::file(path));
            }
        }

        let config = figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file, then the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Candidate config file paths, highest priority first
    fn find_config_paths(service_name: &str) -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config.toml")];

        let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_DIR);
        if let Some(path) = xdg_dirs.find_config_file(Path::new(service_name).join("config.toml")) {
            paths.push(path);
        }

        paths.push(
            PathBuf::from("/etc")
                .join(APP_DIR)
                .join(service_name)
                .join("config.toml"),
        );

        paths
    }
}
