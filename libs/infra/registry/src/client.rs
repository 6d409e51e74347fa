// [libs/infra/registry/src/client.rs]
/*!
 * =================================================================
 * APARATO: SERVICE REGISTRY UPLINK (V1.0)
 * CLASIFICACION: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: REGISTRO Y DESCUBRIMIENTO DE PARES SANOS
 *
 * Habla el dialecto HTTP de un agente Consul: registro de servicio con
 * chequeo TTL, y consulta de instancias saludables por nombre de servicio.
 * =================================================================
 */

use std::time::Duration;

use anyhow::Context;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::errors::RegistryError;

/// One healthy (or not) peer returned by service discovery (spec §6).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServiceInstance {
    pub id: String,
    pub address: String,
    pub port: u16,
    pub url: String,
    pub is_healthy: bool,
}

/// Definition of a TTL-based health check registered alongside a service,
/// matching the original's registration call in
/// `worker/internal/hashcrack/service.go`.
#[derive(Debug, Clone)]
pub struct TtlCheck {
    pub http_url: String,
    pub interval: Duration,
    pub timeout: Duration,
}

pub struct RegistryClient {
    http: Client,
    base_url: String,
}

impl RegistryClient {
    /// Builds a client against a Consul-compatible agent at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::builder()
                .timeout(Duration::from_secs(10))
                .user_agent("crackhash-registry-client/1.0")
                .build()
                .expect("registry http client must build"),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Loads `base_url` from `REGISTRY_URL`, matching the teacher's
    /// `from_production_environment` env-loading idiom.
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("REGISTRY_URL")
            .context("REGISTRY_URL must be set to the registry agent's base URL")?;
        Ok(Self::new(base_url))
    }

    /// Registers `service_name` at `(address, port)` with no health check
    /// attached — used for one-shot registrations where the caller manages
    /// health via an external prober.
    #[instrument(skip(self))]
    pub async fn register_service(
        &self,
        service_name: &str,
        id: &str,
        address: &str,
        port: u16,
    ) -> Result<(), RegistryError> {
        let url = format!("{}/v1/agent/service/register", self.base_url);
        let body = serde_json::json!({
            "ID": id,
            "Name": service_name,
            "Address": address,
            "Port": port,
        });
        let response = self.http.put(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(RegistryError::RegistrationRejected(response.status().to_string()));
        }
        info!(target: "registry.client", service = service_name, %address, port, "registered with service registry");
        Ok(())
    }

    /// Registers with a TTL HTTP health check, per spec's supplemented
    /// worker self-registration (SPEC_FULL.md).
    #[instrument(skip(self, check))]
    pub async fn register_with_ttl_check(
        &self,
        service_name: &str,
        id: &str,
        address: &str,
        port: u16,
        check: TtlCheck,
    ) -> Result<(), RegistryError> {
        let url = format!("{}/v1/agent/service/register", self.base_url);
        let body = serde_json::json!({
            "ID": id,
            "Name": service_name,
            "Address": address,
            "Port": port,
            "Check": {
                "HTTP": check.http_url,
                "Interval": format!("{}s", check.interval.as_secs()),
                "Timeout": format!("{}s", check.timeout.as_secs()),
            },
        });
        let response = self.http.put(&url).json(&body).send().await?;
        if !response.status().is_success() {
            return Err(RegistryError::RegistrationRejected(response.status().to_string()));
        }
        info!(target: "registry.client", service = service_name, "registered with TTL health check");
        Ok(())
    }

    /// Enumerates healthy instances of `service_name`, per spec §4.3/§6
    /// (`HealthServices` in the original). `passing=true` restricts to
    /// instances currently reporting healthy.
    #[instrument(skip(self))]
    pub async fn healthy_instances(&self, service_name: &str) -> Result<Vec<ServiceInstance>, RegistryError> {
        let url = format!(
            "{}/v1/health/service/{}?passing=true",
            self.base_url, service_name
        );
        let response = self.http.get(&url).send().await?;
        if response.status() != StatusCode::OK {
            warn!(target: "registry.client", service = service_name, status = %response.status(), "discovery query failed");
            return Err(RegistryError::DiscoveryFailed(service_name.to_string()));
        }
        let instances = response
            .json::<Vec<ServiceInstance>>()
            .await
            .map_err(RegistryError::NetworkFault)?;
        Ok(instances)
    }

    /// Lists all registered service names. Not used by the dispatcher; kept
    /// as a library entry point for an operational health-check tool,
    /// matching the original's `CatalogServices` (SPEC_FULL.md supplement).
    #[instrument(skip(self))]
    pub async fn list_service_names(&self) -> Result<Vec<String>, RegistryError> {
        let url = format!("{}/v1/catalog/services", self.base_url);
        let response = self.http.get(&url).send().await?;
        let map: std::collections::HashMap<String, Vec<String>> = response
            .json()
            .await
            .map_err(RegistryError::NetworkFault)?;
        Ok(map.into_keys().collect())
    }
}
