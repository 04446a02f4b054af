//! Glance v2 image listing.

use serde::Deserialize;

use stackprobe_types::ImageRecord;

use super::{get_json, Session};
use crate::CollectError;

/// Upper bound on followed pagination links.
const MAX_PAGES: usize = 1000;

/// Image API client bound to an authenticated session.
#[derive(Debug, Clone)]
pub struct GlanceClient<'a> {
    session: &'a Session,
    endpoint: String,
}

impl<'a> GlanceClient<'a> {
    /// Use `endpoint` when given, otherwise the catalog's public image URL.
    pub fn new(session: &'a Session, endpoint: Option<&str>) -> Result<Self, CollectError> {
        let endpoint = match endpoint {
            Some(url) => url,
            None => session.public_url("image")?,
        };
        Ok(Self {
            session,
            endpoint: normalize_endpoint(endpoint),
        })
    }

    /// Endpoint without trailing slash or API version.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// List every image, following `next` links.
    pub async fn list_images(&self) -> Result<Vec<ImageRecord>, CollectError> {
        let mut images = Vec::new();
        let mut next = Some("/v2/images".to_string());
        let mut pages = 0;

        while let Some(path) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                return Err(CollectError::Http(format!(
                    "image listing exceeded {MAX_PAGES} pages"
                )));
            }
            let url = format!("{}{}", self.endpoint, path);
            let page: ImagePage =
                get_json(self.session.client(), &url, self.session.token(), &[]).await?;
            images.extend(page.images);
            next = page.next;
        }

        tracing::debug!(count = images.len(), pages, "listed images");
        Ok(images)
    }
}

/// Strip a trailing `/`, `/v1` or `/v2` (with optional trailing slash,
/// either case) from a Glance endpoint.
pub fn normalize_endpoint(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    for suffix in ["/v1", "/v2", "/V1", "/V2"] {
        if let Some(base) = trimmed.strip_suffix(suffix) {
            return base.to_string();
        }
    }
    trimmed.to_string()
}

#[derive(Debug, Deserialize)]
struct ImagePage {
    #[serde(default)]
    images: Vec<ImageRecord>,
    #[serde(default)]
    next: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openstack::mock_session;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_normalize_endpoint() {
        assert_eq!(normalize_endpoint("http://glance:9292"), "http://glance:9292");
        assert_eq!(normalize_endpoint("http://glance:9292/"), "http://glance:9292");
        assert_eq!(normalize_endpoint("http://glance:9292/v1"), "http://glance:9292");
        assert_eq!(normalize_endpoint("http://glance:9292/v2/"), "http://glance:9292");
        assert_eq!(normalize_endpoint("http://glance:9292/V2"), "http://glance:9292");
        assert_eq!(
            normalize_endpoint("http://glance:9292/image/v3"),
            "http://glance:9292/image/v3"
        );
    }

    #[test]
    fn test_image_page_parsing() {
        let page: ImagePage = serde_json::from_str(
            r#"{
                "images": [
                    {"id": "1", "name": "cirros", "visibility": "public", "status": "active"},
                    {"id": "2", "name": null, "visibility": "private"}
                ],
                "next": "/v2/images?marker=2",
                "first": "/v2/images"
            }"#,
        )
        .unwrap();

        assert_eq!(page.images.len(), 2);
        assert!(page.images[0].is_public());
        assert!(page.images[1].name.is_none());
        assert_eq!(page.next.as_deref(), Some("/v2/images?marker=2"));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page: ImagePage = serde_json::from_str(r#"{"images": []}"#).unwrap();
        assert!(page.next.is_none());
    }

    fn image_catalog(server: &MockServer) -> serde_json::Value {
        json!([{
            "type": "image",
            "endpoints": [{"region": "RegionOne", "publicURL": format!("{}/v2/", server.uri())}]
        }])
    }

    #[tokio::test]
    async fn test_list_images_follows_next_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images"))
            .and(header("X-Auth-Token", "tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "images": [{"id": "1", "name": "cirros", "visibility": "public"}],
                "next": "/v2/images?marker=1"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/images"))
            .and(query_param("marker", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "images": [{"id": "2", "name": "ubuntu", "visibility": "private"}]
            })))
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;

        let session = mock_session(&server, image_catalog(&server)).await.unwrap();
        let client = GlanceClient::new(&session, None).unwrap();
        assert_eq!(client.endpoint(), server.uri());

        let images = client.list_images().await.unwrap();
        let names: Vec<_> = images.iter().filter_map(|i| i.name.as_deref()).collect();
        assert_eq!(names, ["cirros", "ubuntu"]);
        assert_eq!(images.iter().filter(|i| i.is_public()).count(), 1);
    }

    #[tokio::test]
    async fn test_explicit_endpoint_overrides_catalog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/glance/v2/images"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"images": []})))
            .expect(1)
            .mount(&server)
            .await;

        let session = mock_session(&server, json!([])).await.unwrap();
        assert!(matches!(
            GlanceClient::new(&session, None),
            Err(CollectError::Catalog(_))
        ));

        let url = format!("{}/glance/v1/", server.uri());
        let client = GlanceClient::new(&session, Some(&url)).unwrap();
        assert!(client.list_images().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_server_error_on_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/images"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let session = mock_session(&server, image_catalog(&server)).await.unwrap();
        let err = GlanceClient::new(&session, None)
            .unwrap()
            .list_images()
            .await
            .unwrap_err();
        assert!(matches!(err, CollectError::Http(msg) if msg.contains("500")));
    }
}
