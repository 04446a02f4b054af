//! Raw records handed over by collectors before they are folded into
//! [`Measurements`](crate::Measurements).

use std::collections::BTreeMap;

/// Connection counters read from a MySQL server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectionStats {
    /// `Threads_connected`
    pub current: u64,
    /// `Max_used_connections`
    pub max_used: u64,
    /// `max_connections`
    pub max_available: u64,
}

/// One compute service row as reported by the Nova `os-services` API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ServiceRecord {
    pub binary: String,
    pub host: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub zone: Option<String>,
    /// Administrative status: `enabled` or `disabled`.
    pub status: String,
    /// Liveness: `up` or `down`.
    pub state: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub updated_at: Option<String>,
}

impl ServiceRecord {
    pub fn new(
        binary: impl Into<String>,
        host: impl Into<String>,
        status: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self {
            binary: binary.into(),
            host: host.into(),
            zone: None,
            status: status.into(),
            state: state.into(),
            updated_at: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.status == "enabled"
    }

    pub fn is_up(&self) -> bool {
        self.state == "up"
    }
}

/// One image as listed by the Glance v2 API.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageRecord {
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub visibility: Option<String>,
}

impl ImageRecord {
    pub fn new(name: impl Into<String>, visibility: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            visibility: Some(visibility.into()),
        }
    }

    pub fn is_public(&self) -> bool {
        self.visibility.as_deref() == Some("public")
    }
}

/// One endpoint of a catalog service.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogEndpoint {
    #[cfg_attr(feature = "serde", serde(default))]
    pub region: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, rename = "publicURL"))]
    pub public_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, rename = "internalURL"))]
    pub internal_url: Option<String>,
    #[cfg_attr(feature = "serde", serde(default, rename = "adminURL"))]
    pub admin_url: Option<String>,
}

/// The Keystone service catalog, keyed by service type (`identity`,
/// `image`, `compute`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ServiceCatalog {
    services: BTreeMap<String, Vec<CatalogEndpoint>>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service type with its endpoints. Endpoints of a type that
    /// is already present are appended.
    pub fn insert(&mut self, service_type: impl Into<String>, endpoints: Vec<CatalogEndpoint>) {
        self.services
            .entry(service_type.into())
            .or_default()
            .extend(endpoints);
    }

    pub fn with(
        mut self,
        service_type: impl Into<String>,
        endpoints: Vec<CatalogEndpoint>,
    ) -> Self {
        self.insert(service_type, endpoints);
        self
    }

    pub fn endpoints(&self, service_type: &str) -> Option<&[CatalogEndpoint]> {
        self.services.get(service_type).map(Vec::as_slice)
    }

    pub fn service_types(&self) -> impl Iterator<Item = &str> {
        self.services.keys().map(String::as_str)
    }

    /// First public URL for a service type.
    pub fn public_url(&self, service_type: &str) -> Option<&str> {
        self.endpoints(service_type)?
            .iter()
            .find_map(|e| e.public_url.as_deref())
    }

    /// Keep only endpoints in `region`. Service types stay listed even when
    /// none of their endpoints match.
    pub fn restrict_to_region(&mut self, region: &str) {
        for endpoints in self.services.values_mut() {
            endpoints.retain(|e| e.region.as_deref() == Some(region));
        }
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}
