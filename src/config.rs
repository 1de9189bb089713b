// src/config.rs

use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};

use crate::session::{sha256, StaticCredentials};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "admin";
const DEFAULT_LOGO_PATH: &str = "static/logo.png";
const DEFAULT_SESSION_IDLE_MINUTES: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub username: String,
    pub password_sha256: [u8; 32],
    pub logo_path: PathBuf,
    /// TrueType font embedded in PDF exports; built-in Helvetica when unset.
    pub pdf_font_path: Option<PathBuf>,
    /// Sessions untouched for this long are signed out.
    pub session_idle: Duration,
    /// True when neither password variable was set.
    pub default_password: bool,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = get("PORT").and_then(|s| s.parse().ok()).unwrap_or(DEFAULT_PORT);
        let username = get("REPORT_USERNAME").unwrap_or_else(|| DEFAULT_USERNAME.into());

        let (password_sha256, default_password) = match (get("REPORT_PASSWORD_SHA256"), get("REPORT_PASSWORD")) {
            (Some(hex), _) => (parse_hex_digest(&hex).context("REPORT_PASSWORD_SHA256")?, false),
            (None, Some(plain)) => (sha256(&plain), false),
            (None, None) => (sha256(DEFAULT_PASSWORD), true),
        };

        let logo_path = get("LOGO_PATH").map(PathBuf::from).unwrap_or_else(|| DEFAULT_LOGO_PATH.into());
        let pdf_font_path = get("PDF_FONT_PATH").filter(|s| !s.trim().is_empty()).map(PathBuf::from);
        let idle_minutes = get("SESSION_IDLE_MINUTES")
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|m| *m > 0)
            .unwrap_or(DEFAULT_SESSION_IDLE_MINUTES);

        Ok(Self {
            port,
            username,
            password_sha256,
            logo_path,
            pdf_font_path,
            session_idle: Duration::from_secs(idle_minutes * 60),
            default_password,
        })
    }

    /// Reads the PDF font once at startup. A configured but unreadable font is an error.
    pub fn load_pdf_font(&self) -> anyhow::Result<Option<Arc<[u8]>>> {
        self.pdf_font_path
            .as_ref()
            .map(|path| {
                fs::read(path)
                    .map(Arc::<[u8]>::from)
                    .with_context(|| format!("read PDF_FONT_PATH {}", path.display()))
            })
            .transpose()
    }

    pub fn credentials(&self) -> StaticCredentials {
        StaticCredentials::new(self.username.clone(), self.password_sha256)
    }
}

fn parse_hex_digest(hex: &str) -> anyhow::Result<[u8; 32]> {
    let hex = hex.trim();
    if hex.len() != 64 || !hex.is_ascii() {
        bail!("expected 64 hex characters, got {}", hex.len());
    }
    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16)
            .with_context(|| format!("invalid hex at offset {}", i * 2))?;
    }
    Ok(out)
}
