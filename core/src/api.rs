//! The shared API client: request builder, response parser, hydrator.
//!
//! # Design
//! `TodoApi` holds only `base_url` and the kind registry, and is never
//! mutated after construction. It is created once (see `from_config`) and
//! shared as `Arc<TodoApi>`; every resource it hydrates keeps a clone of
//! that `Arc`, so `resource.api()` always leads back to the same client.
//!
//! Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! The caller executes the actual HTTP round-trip in between.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::kind::{KindRegistry, ResourceClass};
use crate::resource::{self, Resource};

/// URL path prefixes the to-do API is responsible for.
pub const WELL_KNOWN_URLS: &[&str] = &["/to-dos"];

const JSON: &str = "application/json";
const MERGE_PATCH: &str = "application/merge-patch+json";

/// Synchronous client for the to-do API.
#[derive(Debug)]
pub struct TodoApi {
    base_url: String,
    kinds: KindRegistry,
}

impl TodoApi {
    pub fn new(base_url: &str) -> Self {
        Self::with_kinds(base_url, KindRegistry::new())
    }

    /// Client using a caller-supplied kind table instead of the default one.
    pub fn with_kinds(base_url: &str, kinds: KindRegistry) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            kinds,
        }
    }

    /// Build the process-wide client from configuration.
    pub fn from_config(config: &ApiConfig) -> Arc<Self> {
        Arc::new(Self::new(&config.base_url))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn kinds(&self) -> &KindRegistry {
        &self.kinds
    }

    pub fn well_known_urls(&self) -> &'static [&'static str] {
        WELL_KNOWN_URLS
    }

    /// Class that payloads tagged `type_name` hydrate into.
    pub fn resource_class(&self, type_name: &str) -> ResourceClass {
        self.kinds.resolve(type_name)
    }

    /// Absolute form of `url`. Absolute URLs pass through; paths are joined
    /// onto `base_url`.
    pub fn url_for(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{url}", self.base_url)
        } else {
            format!("{}/{url}", self.base_url)
        }
    }

    pub fn build_retrieve(&self, url: &str) -> HttpRequest {
        self.request(HttpMethod::Get, url, Vec::new(), None)
    }

    pub fn build_retrieve_well_known(&self, path: &str) -> Result<HttpRequest, ApiError> {
        if !WELL_KNOWN_URLS.contains(&path) {
            return Err(ApiError::UnknownWellKnownUrl(path.to_string()));
        }
        Ok(self.build_retrieve(path))
    }

    pub fn build_create<T: Serialize + ?Sized>(
        &self,
        collection_url: &str,
        body: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.request(
            HttpMethod::Post,
            collection_url,
            vec![("content-type".to_string(), JSON.to_string())],
            Some(body),
        ))
    }

    /// PATCH `url` with a JSON merge patch, conditional on `etag`.
    pub fn build_update<T: Serialize + ?Sized>(
        &self,
        url: &str,
        etag: &str,
        patch: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(patch).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        Ok(self.request(
            HttpMethod::Patch,
            url,
            vec![
                ("content-type".to_string(), MERGE_PATCH.to_string()),
                ("if-match".to_string(), etag.to_string()),
            ],
            Some(body),
        ))
    }

    pub fn build_delete(&self, url: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, url, Vec::new(), None)
    }

    pub fn parse_retrieve(self: &Arc<Self>, response: HttpResponse) -> Result<Resource, ApiError> {
        self.parse_resource(response, 200)
    }

    pub fn parse_create(self: &Arc<Self>, response: HttpResponse) -> Result<Resource, ApiError> {
        self.parse_resource(response, 201)
    }

    pub fn parse_update(self: &Arc<Self>, response: HttpResponse) -> Result<Resource, ApiError> {
        self.parse_resource(response, 200)
    }

    /// Parse a delete response. The server echoes the deleted resource.
    pub fn parse_delete(self: &Arc<Self>, response: HttpResponse) -> Result<Resource, ApiError> {
        self.parse_resource(response, 200)
    }

    /// Turn a decoded payload into a typed resource bound to this client.
    pub fn hydrate(self: &Arc<Self>, value: Value, etag: Option<String>) -> Result<Resource, ApiError> {
        let Value::Object(properties) = value else {
            return Err(ApiError::DeserializationError(
                "expected a JSON object".to_string(),
            ));
        };
        resource::hydrate(Arc::clone(self), properties, etag)
    }

    fn parse_resource(self: &Arc<Self>, response: HttpResponse, expected: u16) -> Result<Resource, ApiError> {
        check_status(&response, expected)?;
        let value: Value =
            serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))?;
        let etag = response.etag().map(str::to_string);
        self.hydrate(value, etag)
    }

    fn request(
        &self,
        method: HttpMethod,
        url: &str,
        mut headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> HttpRequest {
        headers.insert(0, ("accept".to_string(), JSON.to_string()));
        let request = HttpRequest {
            method,
            url: self.url_for(url),
            headers,
            body,
        };
        debug!(method = request.method.as_str(), url = %request.url, "built request");
        request
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    warn!(status = response.status, expected, "unexpected response status");
    match response.status {
        404 => Err(ApiError::NotFound),
        412 => Err(ApiError::PreconditionFailed),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
