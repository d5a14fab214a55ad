use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_AUTH_BASE_URL: &str = "http://localhost:4000";
pub const DEFAULT_EMAIL_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8000";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_GROQ_MODEL: &str = "mixtral-8x7b-32768";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    pub auth_base_url: Option<String>,
    pub email_base_url: Option<String>,
    pub listen_addr: Option<String>,
    pub groq_base_url: Option<String>,
    pub groq_model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub services: ServicesConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ServicesConfig {
    pub tool1: Option<ServiceConfig>,
    pub tool2: Option<ServiceConfig>,
    pub tool3: Option<ServiceConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServiceConfig {
    pub url: String,
    pub description: Option<String>,
}

/// Endpoint and prompt description for one downstream service, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedService {
    pub url: Url,
    pub description: String,
}

impl Config {
    pub fn auth_base_url(&self) -> Result<Url> {
        parse_url("auth_base_url", self.auth_base_url.as_deref(), DEFAULT_AUTH_BASE_URL)
    }

    pub fn email_base_url(&self) -> Result<Url> {
        parse_url("email_base_url", self.email_base_url.as_deref(), DEFAULT_EMAIL_BASE_URL)
    }

    pub fn groq_base_url(&self) -> Result<Url> {
        parse_url("groq_base_url", self.groq_base_url.as_deref(), DEFAULT_GROQ_BASE_URL)
    }

    pub fn listen_addr(&self) -> String {
        self.listen_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string())
    }

    pub fn groq_model(&self) -> String {
        self.groq_model
            .clone()
            .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// The three downstream services in tool order (tool1, tool2, tool3).
    pub fn services(&self) -> Result<[ResolvedService; 3]> {
        Ok([
            resolve_service("tool1", self.services.tool1.as_ref(), 8001)?,
            resolve_service("tool2", self.services.tool2.as_ref(), 8002)?,
            resolve_service("tool3", self.services.tool3.as_ref(), 8003)?,
        ])
    }

    /// Fails fast on any malformed URL so problems surface at startup.
    pub fn validate(&self) -> Result<()> {
        self.auth_base_url()?;
        self.email_base_url()?;
        self.groq_base_url()?;
        self.services()?;
        Ok(())
    }

    fn sample() -> Self {
        let service = |port: u16, description: &str| ServiceConfig {
            url: format!("http://localhost:{port}/execute"),
            description: Some(description.to_string()),
        };
        Self {
            auth_base_url: Some(DEFAULT_AUTH_BASE_URL.to_string()),
            email_base_url: Some(DEFAULT_EMAIL_BASE_URL.to_string()),
            listen_addr: Some(DEFAULT_LISTEN_ADDR.to_string()),
            groq_base_url: Some(DEFAULT_GROQ_BASE_URL.to_string()),
            groq_model: Some(DEFAULT_GROQ_MODEL.to_string()),
            request_timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            services: ServicesConfig {
                tool1: Some(service(8001, default_description("tool1"))),
                tool2: Some(service(8002, default_description("tool2"))),
                tool3: Some(service(8003, default_description("tool3"))),
            },
        }
    }
}

fn default_description(label: &str) -> &'static str {
    match label {
        "tool1" => "Service 1: first downstream service",
        "tool2" => "Service 2: second downstream service",
        _ => "Service 3: third downstream service",
    }
}

fn parse_url(field: &str, value: Option<&str>, default: &str) -> Result<Url> {
    let raw = value.unwrap_or(default);
    Url::parse(raw).map_err(|e| anyhow!("Invalid {field} '{raw}': {e}"))
}

fn resolve_service(
    label: &str,
    cfg: Option<&ServiceConfig>,
    default_port: u16,
) -> Result<ResolvedService> {
    let default_url = format!("http://localhost:{default_port}/execute");
    let url = parse_url(
        &format!("services.{label}.url"),
        cfg.map(|c| c.url.as_str()),
        &default_url,
    )?;
    let description = cfg
        .and_then(|c| c.description.clone())
        .unwrap_or_else(|| default_description(label).to_string());
    Ok(ResolvedService { url, description })
}

pub fn config_dir() -> Result<PathBuf> {
    let dir = dirs::config_dir()
        .ok_or_else(|| anyhow!("no config dir available"))?
        .join("foundrmate");
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

pub fn viewer_log_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("viewer.log"))
}

/// Loads the config at `path`, or the default location when `None`.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config_from(p),
        None => load_config_from(&config_path()?),
    }
}

/// Reads a config file. A missing file gets a template with the defaults,
/// which are then used as-is.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tom = toml::to_string_pretty(&Config::sample())?;
        fs::write(path, tom)?;
        log::info!("Created template config at {}", path.display());
        return Ok(Config::default());
    }
    let s = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: Config =
        toml::from_str(&s).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
