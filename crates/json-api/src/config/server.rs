//! Server Config

use clap::Args;

/// Largest `POST /import/` body accepted by default (32 MiB).
pub(crate) const IMPORT_MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

/// Listener address and request body limits.
#[derive(Debug, Args)]
pub struct ServerRuntimeConfig {
    /// Address the listener binds to
    #[arg(short = 'H', long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port the listener binds to
    #[arg(short, long, env = "SERVER_PORT", default_value = "8698")]
    pub port: u16,

    /// Maximum size of an import batch body, in bytes
    #[arg(long, env = "IMPORT_MAX_BODY_BYTES", default_value_t = IMPORT_MAX_BODY_BYTES)]
    pub import_max_body_bytes: usize,
}

impl ServerRuntimeConfig {
    /// `host:port` string handed to the TCP listener.
    #[must_use]
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
