//! Catalog readers: read-only access to barbers and services

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;

use crate::{
    config::{CatalogConfig, ContentfulConfig},
    error::{AppError, AppResult},
    models::{Barber, CatalogSnapshot, Service},
};

/// Minutes assumed for services published without a duration
pub const DEFAULT_SERVICE_MINUTES: u32 = 30;

/// External, read-only source of barbers and services
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn get_barbers(&self) -> AppResult<Vec<Barber>>;

    async fn get_services(&self) -> AppResult<Vec<Service>>;
}

/// Fetch barbers and services together
pub async fn snapshot(reader: &dyn CatalogReader) -> AppResult<CatalogSnapshot> {
    let (barbers, services) = tokio::try_join!(reader.get_barbers(), reader.get_services())?;
    Ok(CatalogSnapshot { barbers, services })
}

/// Catalog listed in the configuration file
#[derive(Clone)]
pub struct StaticCatalog {
    barbers: Vec<Barber>,
    services: Vec<Service>,
}

impl StaticCatalog {
    pub fn new(barbers: Vec<Barber>, services: Vec<Service>) -> Self {
        Self { barbers, services }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(
            config
                .barbers
                .iter()
                .map(|b| Barber {
                    id: b.id.clone(),
                    name: b.name.clone(),
                })
                .collect(),
            config
                .services
                .iter()
                .filter(|s| s.duration_minutes > 0)
                .map(|s| Service {
                    id: s.id.clone(),
                    name: s.name.clone(),
                    price_cents: s.price_cents,
                    duration_minutes: s.duration_minutes,
                })
                .collect(),
        )
    }
}

#[async_trait]
impl CatalogReader for StaticCatalog {
    async fn get_barbers(&self) -> AppResult<Vec<Barber>> {
        Ok(self.barbers.clone())
    }

    async fn get_services(&self) -> AppResult<Vec<Service>> {
        Ok(self.services.clone())
    }
}

// ---- Contentful ----

const BARBERS_QUERY: &str = "{ barbersCollection { items { sys { id } name } } }";
const SERVICES_QUERY: &str = "{ servicesCollection { items { sys { id } name price duration } } }";

#[derive(Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Deserialize)]
struct Collection<T> {
    items: Vec<T>,
}

#[derive(Deserialize)]
struct Sys {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BarbersData {
    barbers_collection: Collection<BarberEntry>,
}

#[derive(Deserialize)]
struct BarberEntry {
    sys: Sys,
    name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServicesData {
    services_collection: Collection<ServiceEntry>,
}

#[derive(Deserialize)]
struct ServiceEntry {
    sys: Sys,
    name: Option<String>,
    price: Option<f64>,
    duration: Option<u32>,
}

/// Catalog published in a Contentful space, read over the GraphQL Content API
#[derive(Clone)]
pub struct ContentfulCatalog {
    client: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl ContentfulCatalog {
    pub fn new(config: &ContentfulConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/content/v1/spaces/{}/environments/{}",
                config.base_url.trim_end_matches('/'),
                config.space_id,
                config.environment
            ),
            access_token: config.access_token.clone(),
        })
    }

    async fn query<T: DeserializeOwned>(&self, query: &str) -> AppResult<T> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| {
                AppError::CatalogUnavailable(format!("Contentful request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::CatalogUnavailable(format!("Contentful returned {}", status)));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| {
                AppError::CatalogUnavailable(format!("Invalid Contentful response: {}", e))
            })?;

        if let Some(error) = body.errors.first() {
            return Err(AppError::CatalogUnavailable(format!(
                "Contentful query failed: {}",
                error.message
            )));
        }

        body.data.ok_or_else(|| {
            AppError::CatalogUnavailable("Contentful response has no data".to_string())
        })
    }
}

#[async_trait]
impl CatalogReader for ContentfulCatalog {
    async fn get_barbers(&self) -> AppResult<Vec<Barber>> {
        let data: BarbersData = self.query(BARBERS_QUERY).await?;
        Ok(data
            .barbers_collection
            .items
            .into_iter()
            .filter_map(|entry| {
                // unpublished drafts come back with null fields
                let name = entry.name?;
                Some(Barber { id: entry.sys.id, name })
            })
            .collect())
    }

    async fn get_services(&self) -> AppResult<Vec<Service>> {
        let data: ServicesData = self.query(SERVICES_QUERY).await?;
        Ok(data
            .services_collection
            .items
            .into_iter()
            .filter_map(|entry| {
                let name = entry.name?;
                let price = entry.price?;
                Some(Service {
                    id: entry.sys.id,
                    name,
                    price_cents: (price * 100.0).round() as i64,
                    duration_minutes: entry
                        .duration
                        .filter(|&d| d > 0)
                        .unwrap_or(DEFAULT_SERVICE_MINUTES),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StaticBarber, StaticService};
    use httpmock::prelude::*;

    fn contentful_config(server: &MockServer) -> ContentfulConfig {
        ContentfulConfig {
            base_url: server.base_url(),
            space_id: "space".to_string(),
            environment: "master".to_string(),
            access_token: "token".to_string(),
            timeout_ms: 1_000,
        }
    }

    #[tokio::test]
    async fn test_static_catalog_skips_zero_duration() {
        let config = CatalogConfig {
            barbers: vec![StaticBarber { id: "john".into(), name: "John".into() }],
            services: vec![
                StaticService {
                    id: "cut".into(),
                    name: "Haircut".into(),
                    price_cents: 2500,
                    duration_minutes: 30,
                },
                StaticService {
                    id: "free".into(),
                    name: "Chat".into(),
                    price_cents: 0,
                    duration_minutes: 0,
                },
            ],
            ..CatalogConfig::default()
        };
        let catalog = snapshot(&StaticCatalog::from_config(&config)).await.unwrap();
        assert_eq!(catalog.barbers.len(), 1);
        assert_eq!(catalog.services.len(), 1);
        assert_eq!(catalog.services[0].id, "cut");
    }

    #[tokio::test]
    async fn test_contentful_services() {
        let server = MockServer::start_async().await;
        let mock = server.mock_async(|when, then| {
            when.method(POST)
                .path("/content/v1/spaces/space/environments/master")
                .header("authorization", "Bearer token")
                .body_contains("servicesCollection");
            then.status(200).json_body(serde_json::json!({
                "data": {
                    "servicesCollection": {
                        "items": [
                            {
                                "sys": { "id": "s1" },
                                "name": "Haircut",
                                "price": 25,
                                "duration": 45
                            },
                            {
                                "sys": { "id": "s2" },
                                "name": "Shave",
                                "price": 12.5,
                                "duration": null
                            },
                            {
                                "sys": { "id": "s3" },
                                "name": null,
                                "price": null,
                                "duration": null
                            }
                        ]
                    }
                }
            }));
        }).await;

        let catalog = ContentfulCatalog::new(&contentful_config(&server)).unwrap();
        let services = catalog.get_services().await.unwrap();

        mock.assert_async().await;
        assert_eq!(services.len(), 2);
        assert_eq!(services[0].price_cents, 2500);
        assert_eq!(services[0].duration_minutes, 45);
        assert_eq!(services[1].price_cents, 1250);
        assert_eq!(services[1].duration_minutes, DEFAULT_SERVICE_MINUTES);
    }

    #[tokio::test]
    async fn test_contentful_barbers() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST).body_contains("barbersCollection");
            then.status(200).json_body(serde_json::json!({
                "data": {
                    "barbersCollection": {
                        "items": [{ "sys": { "id": "b1" }, "name": "John" }]
                    }
                }
            }));
        }).await;

        let catalog = ContentfulCatalog::new(&contentful_config(&server)).unwrap();
        let barbers = catalog.get_barbers().await.unwrap();
        assert_eq!(barbers, vec![Barber { id: "b1".into(), name: "John".into() }]);
    }

    #[tokio::test]
    async fn test_contentful_failure_is_catalog_unavailable() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST);
            then.status(500);
        }).await;

        let catalog = ContentfulCatalog::new(&contentful_config(&server)).unwrap();
        let err = catalog.get_barbers().await.unwrap_err();
        assert!(matches!(err, AppError::CatalogUnavailable(_)));
    }

    #[tokio::test]
    async fn test_contentful_graphql_errors() {
        let server = MockServer::start_async().await;
        server.mock_async(|when, then| {
            when.method(POST);
            then.status(200).json_body(serde_json::json!({
                "data": null,
                "errors": [ { "message": "Unknown field" } ]
            }));
        }).await;

        let catalog = ContentfulCatalog::new(&contentful_config(&server)).unwrap();
        let err = catalog.get_services().await.unwrap_err();
        assert!(matches!(err, AppError::CatalogUnavailable(msg) if msg.contains("Unknown field")));
    }
}
