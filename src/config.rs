use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 默认配置文件 (不存在时忽略)
pub const DEFAULT_CONFIG_FILE: &str = "dispatcher.toml";

/// 环境变量前缀, 例如 DISPATCHER_DRY_RUN / DISPATCHER_MAIL__SMTP_PORT
const ENV_PREFIX: &str = "DISPATCHER";

/// 应用配置 (启动时构建一次, 之后只读)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub mail: MailConfig,
    /// true 时不建立 SMTP 连接, 只记录 "Dry run – not sent"
    pub dry_run: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub invoice_dir: PathBuf,
    pub output_dir: PathBuf,
    pub contacts_file: PathBuf,
    pub log_file: PathBuf,
    pub env_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    /// 邮件正文落款
    pub signature: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            mail: MailConfig::default(),
            dry_run: false,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            invoice_dir: PathBuf::from("InvoicesToProcess"),
            output_dir: PathBuf::from("FinalInvoices"),
            contacts_file: PathBuf::from("client_contacts.csv"),
            log_file: PathBuf::from("invoice_log.csv"),
            env_file: PathBuf::from(".env"),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 465,
            signature: "Jess Hayden Consulting".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file {path} not found")]
    MissingFile { path: PathBuf },
    #[error("invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
    #[error("failed to read env file {path}: {source}")]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    #[error("{0} is not set (required when sending live)")]
    MissingCredential(&'static str),
}

impl AppConfig {
    /// 分层加载: 默认值 -> TOML 文件 -> DISPATCHER_* 环境变量
    ///
    /// `explicit` 为 None 时使用 [`DEFAULT_CONFIG_FILE`], 文件不存在则跳过;
    /// 显式指定的文件必须存在.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match explicit {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if required && !path.exists() {
            return Err(ConfigError::MissingFile { path });
        }

        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

/// 邮箱账号凭据, Debug 输出时隐藏密码
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub const USER_KEY: &'static str = "EMAIL_USER";
    pub const PASS_KEY: &'static str = "EMAIL_PASS";

    /// 从 .env 文件读取 EMAIL_USER / EMAIL_PASS, 缺失时回退到进程环境变量.
    /// 不修改进程环境.
    pub fn load(env_file: &Path) -> Result<Self, ConfigError> {
        let mut user = None;
        let mut password = None;

        match dotenvy::from_path_iter(env_file) {
            Ok(iter) => {
                for entry in iter {
                    let (key, value) = entry.map_err(|source| ConfigError::EnvFile {
                        path: env_file.to_path_buf(),
                        source,
                    })?;
                    match key.as_str() {
                        Self::USER_KEY => user = Some(value),
                        Self::PASS_KEY => password = Some(value),
                        _ => {}
                    }
                }
            }
            Err(dotenvy::Error::Io(_)) => {
                tracing::debug!("env file {} not readable, using process environment", env_file.display());
            }
            Err(source) => {
                return Err(ConfigError::EnvFile {
                    path: env_file.to_path_buf(),
                    source,
                })
            }
        }

        let user = user
            .or_else(|| std::env::var(Self::USER_KEY).ok())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingCredential(Self::USER_KEY))?;
        let password = password
            .or_else(|| std::env::var(Self::PASS_KEY).ok())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingCredential(Self::PASS_KEY))?;

        Ok(Self { user, password })
    }
}
