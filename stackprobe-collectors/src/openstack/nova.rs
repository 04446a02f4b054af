//! Nova compute service and flavor listings.

use serde::Deserialize;

use stackprobe_types::ServiceRecord;

use super::{get_json, Session};
use crate::CollectError;

/// Server-side filter for the service listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFilter {
    pub host: Option<String>,
    pub binary: Option<String>,
}

/// Compute API client bound to an authenticated session.
#[derive(Debug, Clone)]
pub struct NovaClient<'a> {
    session: &'a Session,
    endpoint: String,
}

impl<'a> NovaClient<'a> {
    /// Use `endpoint` when given, otherwise the catalog's public compute URL.
    pub fn new(session: &'a Session, endpoint: Option<&str>) -> Result<Self, CollectError> {
        let endpoint = match endpoint {
            Some(url) => url,
            None => session.public_url("compute")?,
        };
        Ok(Self {
            session,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Endpoint with the tenant id removed, for display.
    pub fn management_host(&self) -> String {
        management_host(&self.endpoint, self.session.tenant_id())
    }

    pub async fn list_services(
        &self,
        filter: &ServiceFilter,
    ) -> Result<Vec<ServiceRecord>, CollectError> {
        let mut query = Vec::new();
        if let Some(host) = &filter.host {
            query.push(("host", host.as_str()));
        }
        if let Some(binary) = &filter.binary {
            query.push(("binary", binary.as_str()));
        }

        let url = format!("{}/os-services", self.endpoint);
        let list: ServiceList =
            get_json(self.session.client(), &url, self.session.token(), &query).await?;
        tracing::debug!(count = list.services.len(), "listed compute services");
        Ok(list.services)
    }

    /// Number of flavors visible to the tenant.
    pub async fn flavor_count(&self) -> Result<usize, CollectError> {
        let url = format!("{}/flavors", self.endpoint);
        let list: FlavorList =
            get_json(self.session.client(), &url, self.session.token(), &[]).await?;
        Ok(list.flavors.len())
    }
}

/// Strip a trailing tenant id segment from a compute endpoint.
pub fn management_host(endpoint: &str, tenant_id: Option<&str>) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    let Some(tenant_id) = tenant_id.filter(|t| !t.is_empty()) else {
        return trimmed.to_string();
    };
    match trimmed.strip_suffix(tenant_id) {
        Some(base) => base.trim_end_matches('/').to_string(),
        None => trimmed.to_string(),
    }
}

#[derive(Debug, Deserialize)]
struct ServiceList {
    #[serde(default)]
    services: Vec<ServiceRecord>,
}

#[derive(Debug, Deserialize)]
struct FlavorList {
    #[serde(default)]
    flavors: Vec<serde_json::Value>,
}
