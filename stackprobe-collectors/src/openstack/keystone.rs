//! Keystone v2.0 authentication, service catalog and tenant listing.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::{Deserialize, Serialize};

use stackprobe_types::{CatalogEndpoint, ServiceCatalog};

use super::{check_status, get_json};
use crate::CollectError;

/// Keystone client holding credentials for one tenant.
#[derive(Debug, Clone)]
pub struct KeystoneClient {
    client: Client,
    auth_url: String,
    username: String,
    password: String,
    tenant: String,
    region: Option<String>,
}

impl KeystoneClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> KeystoneClientBuilder {
        KeystoneClientBuilder::default()
    }

    /// Request a token and time how long Keystone took to issue it.
    pub async fn authenticate(&self) -> Result<Session, CollectError> {
        let url = format!("{}/tokens", self.auth_url);
        let body = TokenRequest {
            auth: AuthBody {
                password_credentials: PasswordCredentials {
                    username: &self.username,
                    password: &self.password,
                },
                tenant_name: &self.tenant,
            },
        };

        tracing::debug!(%url, tenant = %self.tenant, "requesting token");
        let started = Instant::now();
        let response = self.client.post(&url).json(&body).send().await?;
        check_status(response.status(), &url)?;
        let access: TokenResponse = response
            .json()
            .await
            .map_err(|e| CollectError::Parse(e.to_string()))?;
        let elapsed = started.elapsed();
        tracing::debug!(?elapsed, "token issued");

        let mut catalog = ServiceCatalog::new();
        for entry in access.access.service_catalog {
            catalog.insert(entry.service_type, entry.endpoints);
        }
        if let Some(region) = &self.region {
            catalog.restrict_to_region(region);
        }

        Ok(Session {
            client: self.client.clone(),
            auth_url: self.auth_url.clone(),
            token: access.access.token.id,
            tenant_id: access.access.token.tenant.map(|t| t.id),
            catalog,
            elapsed,
        })
    }
}

/// An authenticated Keystone session.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    auth_url: String,
    token: String,
    tenant_id: Option<String>,
    catalog: ServiceCatalog,
    elapsed: Duration,
}

impl Session {
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    /// Time taken to issue the token.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub(crate) fn client(&self) -> &Client {
        &self.client
    }

    /// Public URL of a catalog service type.
    pub fn public_url(&self, service_type: &str) -> Result<&str, CollectError> {
        self.catalog.public_url(service_type).ok_or_else(|| {
            CollectError::Catalog(format!("no public {service_type} endpoint in service catalog"))
        })
    }

    /// Base URL for admin-only calls: the catalog's identity `adminURL`,
    /// falling back to the URL the token was requested from.
    pub fn admin_url(&self) -> &str {
        self.catalog
            .endpoints("identity")
            .and_then(|endpoints| endpoints.iter().find_map(|e| e.admin_url.as_deref()))
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(self.auth_url.as_str())
    }

    /// Number of tenants visible to this token. Needs admin rights.
    pub async fn tenant_count(&self) -> Result<usize, CollectError> {
        let url = format!("{}/tenants", self.admin_url());
        let tenants: TenantList = get_json(&self.client, &url, &self.token, &[]).await?;
        Ok(tenants.tenants.len())
    }
}

/// Builder for KeystoneClient.
#[derive(Debug, Default)]
pub struct KeystoneClientBuilder {
    auth_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    tenant: Option<String>,
    region: Option<String>,
    timeout: Option<Duration>,
}

impl KeystoneClientBuilder {
    /// Set the Keystone URL (e.g., "http://keystone:5000/v2.0").
    pub fn auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = Some(auth_url.into());
        self
    }

    /// Set the username and password for authentication.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set the tenant to scope the token to.
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Only consider catalog endpoints in this region.
    pub fn region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<KeystoneClient, CollectError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CollectError::Connection(e.to_string()))?;

        let auth_url = self
            .auth_url
            .ok_or_else(|| CollectError::Auth("no auth URL given".to_string()))?;

        Ok(KeystoneClient {
            client,
            auth_url: auth_url.trim_end_matches('/').to_string(),
            username: self.username.unwrap_or_default(),
            password: self.password.unwrap_or_default(),
            tenant: self.tenant.unwrap_or_default(),
            region: self.region,
        })
    }
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    auth: AuthBody<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthBody<'a> {
    password_credentials: PasswordCredentials<'a>,
    tenant_name: &'a str,
}

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Token response from `POST /tokens`.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access: Access,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Access {
    token: Token,
    #[serde(default)]
    service_catalog: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct Token {
    id: String,
    #[serde(default)]
    tenant: Option<TenantRef>,
}

#[derive(Debug, Deserialize)]
struct TenantRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default)]
    endpoints: Vec<CatalogEndpoint>,
}

#[derive(Debug, Deserialize)]
struct TenantList {
    #[serde(default)]
    tenants: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openstack::mock_session;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_JSON: &str = r#"{
        "access": {
            "token": {
                "id": "tok-123",
                "expires": "2030-01-01T00:00:00Z",
                "tenant": {"id": "a1b2c3", "name": "admin"}
            },
            "serviceCatalog": [
                {
                    "type": "compute",
                    "name": "nova",
                    "endpoints": [
                        {"region": "RegionOne", "publicURL": "http://nova:8774/v2/a1b2c3"},
                        {"region": "RegionTwo", "publicURL": "http://nova2:8774/v2/a1b2c3"}
                    ]
                },
                {"type": "image", "name": "glance", "endpoints": []}
            ]
        }
    }"#;

    #[test]
    fn test_builder_trims_auth_url() {
        let client = KeystoneClient::builder()
            .auth_url("http://keystone:5000/v2.0/")
            .credentials("admin", "secret")
            .tenant("admin")
            .build()
            .unwrap();
        assert_eq!(client.auth_url, "http://keystone:5000/v2.0");
        assert_eq!(client.tenant, "admin");
        assert!(client.region.is_none());
    }

    #[test]
    fn test_builder_requires_auth_url() {
        assert!(matches!(
            KeystoneClient::builder().build(),
            Err(CollectError::Auth(_))
        ));
    }

    #[test]
    fn test_token_request_body() {
        let body = TokenRequest {
            auth: AuthBody {
                password_credentials: PasswordCredentials {
                    username: "admin",
                    password: "secret",
                },
                tenant_name: "demo",
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["auth"]["passwordCredentials"]["username"], "admin");
        assert_eq!(json["auth"]["tenantName"], "demo");
    }

    #[test]
    fn test_token_response_parsing() {
        let parsed: TokenResponse = serde_json::from_str(TOKEN_JSON).unwrap();
        assert_eq!(parsed.access.token.id, "tok-123");
        assert_eq!(parsed.access.token.tenant.unwrap().id, "a1b2c3");
        assert_eq!(parsed.access.service_catalog.len(), 2);
        assert_eq!(parsed.access.service_catalog[0].endpoints.len(), 2);
        assert!(parsed.access.service_catalog[1].endpoints.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_keystone_fails() {
        let client = KeystoneClient::builder()
            .auth_url("http://127.0.0.1:1/v2.0")
            .credentials("admin", "secret")
            .tenant("admin")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        let err = client.authenticate().await.unwrap_err();
        assert!(matches!(
            err,
            CollectError::Connection(_) | CollectError::Timeout
        ));
    }

    #[tokio::test]
    async fn test_authenticate_builds_region_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/tokens"))
            .and(body_partial_json(json!({
                "auth": {
                    "passwordCredentials": {"username": "admin", "password": "secret"},
                    "tenantName": "demo"
                }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(TOKEN_JSON, "application/json"),
            )
            .expect(1)
            .mount(&server)
            .await;

        let session = KeystoneClient::builder()
            .auth_url(format!("{}/v2.0/", server.uri()))
            .credentials("admin", "secret")
            .tenant("demo")
            .region(Some("RegionTwo".into()))
            .build()
            .unwrap()
            .authenticate()
            .await
            .unwrap();

        assert_eq!(session.token(), "tok-123");
        assert_eq!(session.tenant_id(), Some("a1b2c3"));
        assert_eq!(session.catalog().len(), 2);
        assert_eq!(session.public_url("compute").unwrap(), "http://nova2:8774/v2/a1b2c3");
        assert!(matches!(
            session.public_url("image"),
            Err(CollectError::Catalog(_))
        ));
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/tokens"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = KeystoneClient::builder()
            .auth_url(format!("{}/v2.0", server.uri()))
            .credentials("admin", "wrong")
            .tenant("admin")
            .build()
            .unwrap()
            .authenticate()
            .await
            .unwrap_err();

        assert!(matches!(err, CollectError::Auth(msg) if msg.contains("401")));
    }

    #[tokio::test]
    async fn test_tenant_count_uses_auth_url_without_admin_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.0/tenants"))
            .and(header("X-Auth-Token", "tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tenants": [{"id": "ten1", "name": "admin"}, {"id": "ten2", "name": "demo"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = mock_session(&server, json!([])).await.unwrap();
        assert_eq!(session.admin_url(), format!("{}/v2.0", server.uri()));
        assert_eq!(session.tenant_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_tenant_count_prefers_identity_admin_url() {
        let server = MockServer::start().await;
        let admin = format!("{}/admin/v2.0/", server.uri());
        Mock::given(method("GET"))
            .and(path("/admin/v2.0/tenants"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tenants": []})))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = json!([{
            "type": "identity",
            "endpoints": [{
                "region": "RegionOne",
                "publicURL": format!("{}/v2.0", server.uri()),
                "adminURL": admin
            }]
        }]);
        let session = mock_session(&server, catalog).await.unwrap();

        assert_eq!(session.admin_url(), format!("{}/admin/v2.0", server.uri()));
        assert_eq!(session.tenant_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_tenant_listing_forbidden() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.0/tenants"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let session = mock_session(&server, json!([])).await.unwrap();
        assert!(matches!(
            session.tenant_count().await,
            Err(CollectError::Auth(_))
        ));
    }
}
