// [apps/manager/src/config.rs]
//! Environment-sourced configuration (spec §6's "structured config
//! document", parsing left to `clap`/`dotenvy` per the teacher's idiom —
//! see SPEC_FULL.md's Configuration section).

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(about = "crack-hash manager node")]
pub struct Config {
    #[arg(long, env = "AMQP_URL")]
    pub amqp_url: String,

    #[arg(long, env = "REGISTRY_URL")]
    pub registry_url: String,

    #[arg(long, env = "STORE_URL", default_value = ":memory:")]
    pub store_url: String,

    #[arg(long, env = "STORE_AUTH_TOKEN")]
    pub store_auth_token: Option<String>,

    #[arg(long, env = "WORKER_SERVICE_NAME", default_value = "crack-hash-worker")]
    pub worker_service_name: String,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    #[arg(long, env = "RECONNECT_TIMEOUT_MS", default_value_t = 2000)]
    pub reconnect_timeout_ms: u64,

    #[arg(long, env = "HEALTH_TIMEOUT_MS", default_value_t = 5000)]
    pub health_timeout_ms: u64,

    #[arg(long, env = "REQUEST_TIMEOUT_MS", default_value_t = 0)]
    pub request_timeout_ms: u64,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Ok(Config::parse())
    }

    pub fn reconnect_timeout(&self) -> Duration {
        Duration::from_millis(self.reconnect_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    /// `None` means no wall-clock cap (spec §5: optional design hook, the
    /// health prober is the canonical stall detector).
    pub fn request_timeout(&self) -> Option<Duration> {
        if self.request_timeout_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.request_timeout_ms))
        }
    }
}
