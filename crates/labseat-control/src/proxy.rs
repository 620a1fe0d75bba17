//! Reverse-proxy configuration files.
//!
//! Each seat is served by one nginx server block stored as
//! `{server_name}.conf` in the proxy's config directory. The file's presence
//! is the only record that a route exists. Every successful write or delete is
//! followed by a reload so the proxy picks up the change.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProxyError;

type Result<T> = std::result::Result<T, ProxyError>;

/// A route from a public hostname to an upstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Public hostname, e.g. `doe-sfb.lab.infinigate.io`.
    pub server_name: String,
    /// Upstream URL, e.g. `http://10.0.0.7:8080`.
    pub proxy_pass: String,
}

/// Locations used by the proxy config writer.
#[derive(Debug, Clone)]
pub struct ProxyConfigSettings {
    /// Directory holding one `.conf` file per seat.
    pub config_dir: PathBuf,
    /// TLS parameters snippet included by every server block.
    pub ssl_snippet: PathBuf,
    /// Certificate chain served for seat hostnames.
    pub ssl_certificate: PathBuf,
    /// Private key for `ssl_certificate`.
    pub ssl_certificate_key: PathBuf,
    /// Program and arguments run after each change.
    pub reload_command: Vec<String>,
}

impl Default for ProxyConfigSettings {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/etc/nginx/conf.d"),
            ssl_snippet: PathBuf::from("/etc/nginx/snippets/ssl.conf"),
            ssl_certificate: PathBuf::from("/etc/zerossl/ecc-certs/fullchain.pem"),
            ssl_certificate_key: PathBuf::from("/etc/zerossl/ecc-certs/privkey.pem"),
            reload_command: vec!["nginx".to_string(), "-s".to_string(), "reload".to_string()],
        }
    }
}

impl ProxyConfigSettings {
    /// Load settings from environment variables.
    ///
    /// Supported environment variables:
    /// - `NGINX_CONFIG_DIR`
    /// - `NGINX_SSL_SNIPPET`
    /// - `NGINX_SSL_CERTIFICATE`
    /// - `NGINX_SSL_CERTIFICATE_KEY`
    /// - `NGINX_RELOAD_COMMAND` (whitespace separated)
    #[must_use]
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(val) = std::env::var("NGINX_CONFIG_DIR") {
            settings.config_dir = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("NGINX_SSL_SNIPPET") {
            settings.ssl_snippet = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("NGINX_SSL_CERTIFICATE") {
            settings.ssl_certificate = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("NGINX_SSL_CERTIFICATE_KEY") {
            settings.ssl_certificate_key = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("NGINX_RELOAD_COMMAND") {
            let command: Vec<String> = val.split_whitespace().map(str::to_string).collect();
            if !command.is_empty() {
                settings.reload_command = command;
            }
        }

        settings
    }
}

/// Tells the running proxy to re-read its configuration.
#[async_trait]
pub trait Reloader: Send + Sync {
    /// Reload the proxy.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Reload` if the proxy rejects the new configuration.
    async fn reload(&self) -> Result<()>;
}

/// Reloads by running an external command, `nginx -s reload` by default.
#[derive(Debug, Clone)]
pub struct CommandReloader {
    program: String,
    args: Vec<String>,
}

impl CommandReloader {
    /// Create a reloader for `program` with `args`.
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Create a reloader from a full command line, program first.
    ///
    /// Returns `None` for an empty command.
    #[must_use]
    pub fn from_command(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }
}

impl Default for CommandReloader {
    fn default() -> Self {
        Self::new("nginx", vec!["-s".to_string(), "reload".to_string()])
    }
}

#[async_trait]
impl Reloader for CommandReloader {
    async fn reload(&self) -> Result<()> {
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| ProxyError::Reload(format!("failed to run {}: {e}", self.program)))?;

        if output.status.success() {
            tracing::debug!(program = %self.program, "Proxy reloaded");
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            format!("{} exited with {}", self.program, output.status)
        } else {
            stderr
        };
        tracing::error!(program = %self.program, error = %message, "Proxy reload failed");
        Err(ProxyError::Reload(message))
    }
}

/// Reads and writes per-seat server blocks.
pub struct ProxyConfigStore {
    settings: ProxyConfigSettings,
    reloader: Arc<dyn Reloader>,
}

impl ProxyConfigStore {
    /// Create a store writing to `settings.config_dir`.
    #[must_use]
    pub fn new(settings: ProxyConfigSettings, reloader: Arc<dyn Reloader>) -> Self {
        Self { settings, reloader }
    }

    /// Get the settings.
    #[must_use]
    pub const fn settings(&self) -> &ProxyConfigSettings {
        &self.settings
    }

    /// Path of the config file for `server_name`.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::InvalidServerName` if the name could escape the
    /// config directory or break the server block.
    pub fn config_path(&self, server_name: &str) -> Result<PathBuf> {
        validate_server_name(server_name)?;
        Ok(self.settings.config_dir.join(format!("{server_name}.conf")))
    }

    /// Render the server block for `config`.
    #[must_use]
    pub fn render(&self, config: &ProxyConfig) -> String {
        render_server_block(&self.settings, &config.server_name, &config.proxy_pass)
    }

    /// Write (or overwrite) the config for `config.server_name`, then reload.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, the write or the reload fails. A failed
    /// reload leaves the file in place.
    pub async fn write(&self, config: &ProxyConfig) -> Result<PathBuf> {
        let path = self.config_path(&config.server_name)?;
        validate_proxy_pass(&config.proxy_pass)?;

        tokio::fs::write(&path, self.render(config)).await?;
        tracing::info!(
            server_name = %config.server_name,
            proxy_pass = %config.proxy_pass,
            path = %path.display(),
            "Wrote proxy config"
        );

        self.reloader.reload().await?;
        Ok(path)
    }

    /// Delete the config for `server_name`, then reload.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::NotFound` (without reloading) if no config exists.
    pub async fn delete(&self, server_name: &str) -> Result<()> {
        let path = self.config_path(server_name)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProxyError::NotFound(server_name.to_string()));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(server_name = %server_name, path = %path.display(), "Deleted proxy config");

        self.reloader.reload().await
    }

    /// List the server names that have a config file, sorted.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Io` if the config directory cannot be read.
    pub async fn list(&self) -> Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.settings.config_dir).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = server_name_of(&entry.path()) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}

fn server_name_of(path: &Path) -> Option<String> {
    if path.extension()? != "conf" {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

/// Reject names that are empty, contain path components, or contain
/// characters with meaning inside an nginx directive.
fn validate_server_name(server_name: &str) -> Result<()> {
    let valid = !server_name.is_empty()
        && !server_name.starts_with('.')
        && !server_name.contains("..")
        && server_name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'));

    if valid {
        Ok(())
    } else {
        Err(ProxyError::InvalidServerName(server_name.to_string()))
    }
}

fn validate_proxy_pass(proxy_pass: &str) -> Result<()> {
    let valid = !proxy_pass.is_empty()
        && !proxy_pass
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, ';' | '{' | '}' | '"' | '\''));

    if valid {
        Ok(())
    } else {
        Err(ProxyError::InvalidProxyPass(proxy_pass.to_string()))
    }
}

fn render_server_block(settings: &ProxyConfigSettings, server_name: &str, proxy_pass: &str) -> String {
    format!(
        "server {{
    listen 80;
    server_name {server_name};
    return 301 https://$host$request_uri;
}}
server {{
    listen 443 ssl;
    http2 on;
    include {snippet};
    ssl_certificate {certificate};
    ssl_certificate_key {key};
    server_name {server_name};
    location / {{
        proxy_pass {proxy_pass};
        proxy_buffering off;
        proxy_set_header X-Forwarded-For $proxy_add_x_forwarded_for;
        proxy_set_header Upgrade $http_upgrade;
        proxy_set_header Connection $http_connection;
        proxy_cookie_path /guacamole/ /;
    }}
}}
",
        snippet = settings.ssl_snippet.display(),
        certificate = settings.ssl_certificate.display(),
        key = settings.ssl_certificate_key.display(),
    )
}
