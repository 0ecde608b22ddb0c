use std::{path::PathBuf, time::Duration};

use crate::assets::{fonts::FontConfig, logo::DEFAULT_LOGO_MAX_BYTES};

/// Settings for the image endpoint server.
#[derive(Clone, Debug, PartialEq, Eq, clap::Args)]
pub struct ServerConfig {
    /// Address to bind.
    #[arg(long, env = "OGCARD_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to bind.
    #[arg(long, env = "OGCARD_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Extra directory scanned for font files.
    #[arg(long, env = "OGCARD_FONT_DIR")]
    pub font_dir: Option<PathBuf>,

    /// Skip the host's system fonts.
    #[arg(long, env = "OGCARD_NO_SYSTEM_FONTS")]
    pub no_system_fonts: bool,

    /// Give up on a remote logo after this many milliseconds.
    #[arg(long, env = "OGCARD_LOGO_TIMEOUT_MS", default_value_t = 3000)]
    pub logo_timeout_ms: u64,

    /// Reject logos larger than this many bytes.
    #[arg(long, env = "OGCARD_LOGO_MAX_BYTES", default_value_t = DEFAULT_LOGO_MAX_BYTES)]
    pub logo_max_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            font_dir: None,
            no_system_fonts: false,
            logo_timeout_ms: 3000,
            logo_max_bytes: DEFAULT_LOGO_MAX_BYTES,
        }
    }
}

impl ServerConfig {
    /// Font discovery settings.
    pub fn font_config(&self) -> FontConfig {
        FontConfig {
            font_dir: self.font_dir.clone(),
            system_fonts: !self.no_system_fonts,
        }
    }

    /// Remote logo timeout.
    pub fn logo_timeout(&self) -> Duration {
        Duration::from_millis(self.logo_timeout_ms)
    }
}
