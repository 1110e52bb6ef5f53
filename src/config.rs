use anyhow::Context;
use serde::Deserialize;
use std::path::PathBuf;

pub const CONFIG_VERSION: u32 = 1;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub version: u32,
    pub source: Source,
    #[serde(default)]
    pub discovery: Discovery,
    #[serde(default)]
    pub images: Images,
    #[serde(default)]
    pub settings: SettingsLocation,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Config> {
        let contents =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read config {path}"))?;
        let config: Config =
            toml::from_str(&contents).with_context(|| "Failed to parse config TOML")?;
        if config.version != CONFIG_VERSION {
            anyhow::bail!(
                "Unsupported config version {}, expected {CONFIG_VERSION}",
                config.version
            );
        }
        Ok(config)
    }
}

/// Where the published data files live
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Source {
    Http {
        base_url: String,
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
    Dir {
        path: PathBuf,
    },
}

/// Probe window for yearly files
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Discovery {
    pub years_back: u32,
    pub years_forward: u32,
    /// years probed past the lowest and highest hit
    pub expansion: u32,
}

impl Default for Discovery {
    fn default() -> Self {
        Self {
            years_back: 10,
            years_forward: 10,
            expansion: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Images {
    pub fallback_image: String,
    pub fallback_backdrop: String,
    /// When set, fallback images are `<placeholder_url>?name=<artist>`
    pub placeholder_url: Option<String>,
}

impl Default for Images {
    fn default() -> Self {
        Self {
            fallback_image: "/icons/trackly.png".to_string(),
            fallback_backdrop: crate::domain::artist::DEFAULT_BACKDROP.to_string(),
            placeholder_url: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SettingsLocation {
    pub dir: PathBuf,
}

impl Default for SettingsLocation {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
    /// Served under `/data/` when set
    pub data_dir: Option<PathBuf>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 11888,
            data_dir: None,
        }
    }
}
