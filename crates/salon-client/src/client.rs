//! CatalogClient - typed REST client for the catalog/chat backend.
//!
//! This component holds no state beyond its configuration; every method is
//! a single request/response exchange. Mutation endpoints surface the
//! backend's `detail` error string; read endpoints fail with a generic
//! message the stores translate into their own degraded-mode policies.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use salon_core::catalog::{CatalogApi, ProductQuery};
use salon_core::error::{Result, SalonError};
use salon_core::project::ProjectsRemote;
use salon_types::{
    ChatMessage, ChatReply, CurrencyRate, Facet, MessageRole, Product, ProductPage, Project,
    UserProfile,
};

use crate::config::ClientConfig;

/// Quote used when the currency endpoint is unavailable.
const FALLBACK_RATE: f64 = 105.0;

/// Typed request/response boundary to the remote catalog service.
#[derive(Clone)]
pub struct CatalogClient {
    http: Client,
    base_url: String,
    bearer: Option<String>,
    config: ClientConfig,
}

impl CatalogClient {
    /// Creates a client against the given API base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: Client::new(),
            config: ClientConfig {
                base_url: base_url.clone(),
                ..ClientConfig::default()
            },
            base_url,
            bearer: None,
        }
    }

    /// Creates a client from loaded configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer: None,
            config,
        }
    }

    /// Sets a default bearer token used when a call passes none.
    pub fn with_bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the per-call token, falling back to the client default.
    /// No token at all degrades to an unauthenticated request.
    fn authorized(&self, request: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token.or(self.bearer.as_deref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    // ============================================================================
    // Catalog reads
    // ============================================================================

    /// Fetches one page of products.
    ///
    /// Empty and "all" filter values are omitted; `source`, `limit` and
    /// `skip` are always sent.
    pub async fn list_products(
        &self,
        query: &ProductQuery,
        token: Option<&str>,
    ) -> Result<ProductPage> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(text) = query.query_param() {
            params.push(("query", text.to_string()));
        }
        if let Some(color) = query.color_param() {
            params.push(("color", color.to_string()));
        }
        if let Some(category) = query.category_param() {
            params.push(("category", category.to_string()));
        }
        if let Some(brand) = query.brand_param() {
            params.push(("brand", brand));
        }
        if let Some(sort) = query.sort_param() {
            params.push(("sort", sort.to_string()));
        }
        params.push(("source", query.source_param()));
        params.push(("limit", query.limit.to_string()));
        params.push(("skip", query.offset.to_string()));

        let response = self
            .authorized(self.http.get(self.url("/products/")).query(&params), token)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to fetch products")?;
        decode(response).await
    }

    /// Fetches the category facet for a source selection.
    pub async fn list_categories(&self, source: &str, brand: Option<&str>) -> Result<Vec<Facet>> {
        let mut params = vec![("source", source.to_string())];
        if let Some(brand) = brand.filter(|b| !b.is_empty() && *b != "all") {
            params.push(("brand", brand.to_string()));
        }

        let response = self
            .http
            .get(self.url("/products/categories/"))
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to fetch categories")?;
        decode(response).await
    }

    /// Fetches the brand facet for a source selection.
    pub async fn list_brands(&self, source: &str) -> Result<Vec<Facet>> {
        let response = self
            .http
            .get(self.url("/products/brands/"))
            .query(&[("source", source)])
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to fetch brands")?;
        decode(response).await
    }

    /// Fetches a single product by slug.
    pub async fn get_product(&self, slug: &str) -> Result<Product> {
        let response = self
            .http
            .get(self.url(&format!("/products/{slug}/")))
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to fetch product")?;
        decode(response).await
    }

    /// Lists the available catalog sources.
    pub async fn list_sources(&self, token: Option<&str>) -> Result<Vec<Facet>> {
        let response = self
            .authorized(self.http.get(self.url("/products/sources/")), token)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to fetch sources")?;
        decode(response).await
    }

    // ============================================================================
    // Chat and image search
    // ============================================================================

    /// Sends a chat turn with the prior transcript.
    ///
    /// The transcript is filtered to content-bearing messages and mapped
    /// into the backend's `user`/`model` role vocabulary.
    pub async fn send_chat(
        &self,
        query: &str,
        history: &[ChatMessage],
        image: Option<&str>,
        token: Option<&str>,
    ) -> Result<ChatReply> {
        let body = ChatRequest {
            query,
            history: build_history(history),
            image,
        };

        let response = self
            .authorized(self.http.post(self.url("/chat/")).json(&body), token)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Chat failed")?;
        decode(response).await
    }

    /// Fetches the server-side chat transcript, if the backend keeps one.
    pub async fn chat_history(&self, token: Option<&str>) -> Result<Vec<ChatMessage>> {
        let response = self
            .authorized(self.http.get(self.url("/chat/history/")), token)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to fetch chat history")?;
        let entries: Vec<ServerHistoryEntry> = decode(response).await?;
        Ok(entries
            .into_iter()
            .map(|entry| ChatMessage::text(entry.role, entry.content))
            .collect())
    }

    /// Pure image-similarity search; no text query.
    pub async fn search_by_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<Vec<Product>> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        let response = self
            .http
            .post(self.url("/search/"))
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Image search failed")?;
        decode(response).await
    }

    /// Uploads an image and returns its absolute URL.
    pub async fn upload_image(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        token: Option<&str>,
    ) -> Result<String> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        let response = self
            .authorized(self.http.post(self.url("/upload/image")).multipart(form), token)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Upload failed")?;
        let uploaded: UploadedImage = decode(response).await?;
        // The server answers with a path relative to its root, not to /api.
        Ok(format!("{}{}", self.root_url(), uploaded.url))
    }

    /// Rewrites external image URLs through the backend proxy.
    ///
    /// Local and relative URLs pass through unchanged.
    pub fn proxy_image_url(&self, url: Option<&str>) -> String {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return String::new();
        };
        if url.starts_with("http") && !url.contains("localhost") && !url.contains("127.0.0.1") {
            format!(
                "{}/products/proxy-image?url={}",
                self.base_url,
                urlencoding::encode(url)
            )
        } else {
            url.to_string()
        }
    }

    // ============================================================================
    // Projects
    // ============================================================================

    /// Fetches the account's project collection.
    pub async fn get_projects(&self, token: Option<&str>) -> Result<Vec<Project>> {
        let response = self
            .authorized(self.http.get(self.url("/projects/")), token)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to fetch projects")?;
        decode(response).await
    }

    /// Replaces the account's project collection.
    pub async fn save_projects(
        &self,
        projects: &[Project],
        token: Option<&str>,
    ) -> Result<Vec<Project>> {
        let response = self
            .authorized(self.http.post(self.url("/projects/")).json(&projects), token)
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to save projects")?;
        decode(response).await
    }

    // ============================================================================
    // Catalog mutations - these surface the backend's error detail string
    // ============================================================================

    /// Imports a JSON catalog file as a new source.
    pub async fn import_catalog(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        name: &str,
        token: Option<&str>,
    ) -> Result<ImportStatus> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("name", name.to_string());

        let response = self
            .authorized(self.http.post(self.url("/products/import/")).multipart(form), token)
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Import failed").await);
        }
        decode(response).await
    }

    /// Renames a catalog source.
    pub async fn rename_source(
        &self,
        source_id: &str,
        name: &str,
        token: Option<&str>,
    ) -> Result<ImportStatus> {
        let response = self
            .authorized(
                self.http
                    .put(self.url(&format!("/products/sources/{source_id}/rename")))
                    .json(&RenamePayload { name }),
                token,
            )
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to rename source").await);
        }
        decode(response).await
    }

    /// Triggers a background sync of the third-party storefront catalog.
    pub async fn sync_storefront(&self, token: Option<&str>) -> Result<SyncStarted> {
        let response = self
            .authorized(self.http.post(self.url("/products/sync-storefront")), token)
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to start sync").await);
        }
        decode(response).await
    }

    /// Polls the progress of a running storefront sync.
    pub async fn sync_status(&self, token: Option<&str>) -> Result<SyncStatus> {
        let response = self
            .authorized(
                self.http.get(self.url("/products/sync-storefront/status")),
                token,
            )
            .send()
            .await
            .map_err(transport_error)?;
        expect_success(&response, "Failed to get sync status")?;
        decode(response).await
    }

    /// Deletes a catalog source and everything ingested from it.
    pub async fn delete_source(&self, source_id: &str, token: Option<&str>) -> Result<ImportStatus> {
        let response = self
            .authorized(
                self.http
                    .delete(self.url(&format!("/products/sources/{source_id}"))),
                token,
            )
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to delete source").await);
        }
        decode(response).await
    }

    /// Updates a product's price.
    pub async fn update_price(
        &self,
        slug: &str,
        price: f64,
        currency: &str,
        token: Option<&str>,
    ) -> Result<UpdatePriceResponse> {
        let response = self
            .authorized(
                self.http
                    .put(self.url(&format!("/products/{slug}/price")))
                    .json(&PricePayload { price, currency }),
                token,
            )
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to update price").await);
        }
        decode(response).await
    }

    /// Updates a product's display title.
    pub async fn update_title(
        &self,
        slug: &str,
        title: &str,
        token: Option<&str>,
    ) -> Result<UpdateTitleResponse> {
        let response = self
            .authorized(
                self.http
                    .put(self.url(&format!("/products/{slug}/title")))
                    .json(&TitlePayload { title }),
                token,
            )
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to update title").await);
        }
        decode(response).await
    }

    /// Sets a product's main image.
    pub async fn update_image(
        &self,
        slug: &str,
        image_url: &str,
        token: Option<&str>,
    ) -> Result<UpdateImageResponse> {
        let response = self
            .authorized(
                self.http
                    .put(self.url(&format!("/products/{slug}/image")))
                    .json(&ImagePayload { image_url }),
                token,
            )
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to update image").await);
        }
        decode(response).await
    }

    /// Removes one image from a product's gallery.
    pub async fn delete_image(
        &self,
        slug: &str,
        image_url: &str,
        token: Option<&str>,
    ) -> Result<DeleteImageResponse> {
        let response = self
            .authorized(
                self.http
                    .delete(self.url(&format!("/products/{slug}/image")))
                    .json(&ImagePayload { image_url }),
                token,
            )
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to delete image").await);
        }
        decode(response).await
    }

    /// Deletes a product.
    pub async fn delete_product(
        &self,
        slug: &str,
        token: Option<&str>,
    ) -> Result<DeleteProductResponse> {
        let response = self
            .authorized(self.http.delete(self.url(&format!("/products/{slug}"))), token)
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to delete product").await);
        }
        decode(response).await
    }

    // ============================================================================
    // Currency, profile, proposals
    // ============================================================================

    /// Fetches the display-currency exchange rate.
    ///
    /// A non-2xx response degrades to a built-in fallback quote so the UI
    /// can always convert; only transport failures propagate.
    pub async fn currency_rate(&self) -> Result<CurrencyRate> {
        let response = self
            .http
            .get(self.url("/currency/rate"))
            .send()
            .await
            .map_err(transport_error)?;
        if !response.status().is_success() {
            return Ok(CurrencyRate {
                currency: "RUB".to_string(),
                rate: FALLBACK_RATE,
                source: "fallback_client".to_string(),
            });
        }
        decode(response).await
    }

    /// Fetches the user profile; an anonymous backend answer degrades to
    /// an empty profile, a 401 is surfaced.
    pub async fn get_profile(&self, token: Option<&str>) -> Result<UserProfile> {
        let response = self
            .authorized(self.http.get(self.url("/profile/")), token)
            .send()
            .await
            .map_err(transport_error)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SalonError::api(Some(401), "Unauthorized"));
        }
        if !response.status().is_success() {
            return Ok(UserProfile::default());
        }
        decode(response).await
    }

    /// Saves the user profile.
    ///
    /// This is the one call with a client-side deadline: the request is
    /// aborted after the configured timeout and surfaced as a distinct
    /// timeout failure.
    pub async fn save_profile(
        &self,
        profile: &UserProfile,
        token: Option<&str>,
    ) -> Result<UserProfile> {
        let response = self
            .authorized(
                self.http
                    .put(self.url("/profile/"))
                    .timeout(self.config.profile_save_timeout)
                    .json(profile),
                token,
            )
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    SalonError::timeout(format!(
                        "profile save aborted after {:?}",
                        self.config.profile_save_timeout
                    ))
                } else {
                    transport_error(err)
                }
            })?;
        expect_success(&response, "Failed to save profile")?;
        decode(response).await
    }

    /// Fetches the server-rendered proposal HTML for a project.
    pub async fn print_project(&self, slug: &str, token: Option<&str>) -> Result<String> {
        let response = self
            .authorized(self.http.get(self.url(&format!("/print/{slug}"))), token)
            .send()
            .await
            .map_err(transport_error)?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(SalonError::api(Some(401), "Unauthorized"));
        }
        if !response.status().is_success() {
            return Err(detail_error(response, "Failed to generate proposal").await);
        }
        response
            .text()
            .await
            .map_err(|err| SalonError::api(None, format!("Failed to read proposal body: {err}")))
    }

    /// API base with the `/api` suffix removed; uploads resolve against it.
    fn root_url(&self) -> &str {
        self.base_url.strip_suffix("/api").unwrap_or(&self.base_url)
    }
}

// ============================================================================
// Seam trait implementations
// ============================================================================

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        self.list_products(query, None).await
    }

    async fn list_categories(&self, source: &str, brand: Option<&str>) -> Result<Vec<Facet>> {
        self.list_categories(source, brand).await
    }

    async fn list_brands(&self, source: &str) -> Result<Vec<Facet>> {
        self.list_brands(source).await
    }
}

#[async_trait]
impl ProjectsRemote for CatalogClient {
    async fn fetch_projects(&self, token: Option<&str>) -> Result<Vec<Project>> {
        self.get_projects(token).await
    }

    async fn push_projects(&self, projects: &[Project], token: &str) -> Result<Vec<Project>> {
        self.save_projects(projects, Some(token)).await
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Maps the live transcript to the backend's chat history vocabulary.
fn build_history(messages: &[ChatMessage]) -> Vec<HistoryEntry<'_>> {
    messages
        .iter()
        .filter(|message| message.has_content())
        .map(|message| HistoryEntry {
            role: match message.role {
                MessageRole::User => "user",
                MessageRole::Assistant => "model",
            },
            content: message.content.as_deref().unwrap_or_default(),
        })
        .collect()
}

fn transport_error(err: reqwest::Error) -> SalonError {
    if err.is_timeout() {
        return SalonError::timeout(err.to_string());
    }
    SalonError::api(err.status().map(|s| s.as_u16()), err.to_string())
}

/// Generic non-2xx check for read endpoints; the body is not consulted.
fn expect_success(response: &Response, message: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(SalonError::api(Some(status.as_u16()), message))
    }
}

/// Extracts the backend's `detail` string from a mutation error body.
async fn detail_error(response: Response, fallback: &str) -> SalonError {
    let status = response.status().as_u16();
    let detail = response
        .json::<ErrorDetail>()
        .await
        .ok()
        .and_then(|body| body.detail);
    SalonError::api(Some(status), detail.unwrap_or_else(|| fallback.to_string()))
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|err| SalonError::api(None, format!("Failed to parse response: {err}")))
}

// ============================================================================
// Wire types
// ============================================================================

/// Result of source-level mutations (import, rename, delete).
#[derive(Debug, Clone, Deserialize)]
pub struct ImportStatus {
    pub status: String,
    pub message: String,
    #[serde(default)]
    pub source_id: Option<String>,
}

/// Acknowledgement of a sync trigger.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncStarted {
    pub status: String,
    pub message: String,
}

/// Progress of a background storefront sync.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncStatus {
    pub is_running: bool,
    pub status: String,
    pub fetched: u64,
    pub total_est: u64,
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
    pub started_at: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePriceResponse {
    pub status: String,
    pub message: String,
    pub product: Product,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTitleResponse {
    pub status: String,
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateImageResponse {
    pub status: String,
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteImageResponse {
    pub status: String,
    pub deleted_image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteProductResponse {
    pub status: String,
    pub message: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
    history: Vec<HistoryEntry<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<&'a str>,
}

#[derive(Serialize)]
struct HistoryEntry<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ServerHistoryEntry {
    role: MessageRole,
    content: String,
}

#[derive(Deserialize)]
struct UploadedImage {
    url: String,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    detail: Option<String>,
}

#[derive(Serialize)]
struct RenamePayload<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct PricePayload<'a> {
    price: f64,
    currency: &'a str,
}

#[derive(Serialize)]
struct TitlePayload<'a> {
    title: &'a str,
}

#[derive(Serialize)]
struct ImagePayload<'a> {
    image_url: &'a str,
}
