//! REST client for a Firestore-compatible document database.
//!
//! Covers the primitives the persistence layer needs: insert with a
//! backend-assigned id, point read, equality query, field-masked partial
//! write, full overwrite, collection listing and delete. The client never
//! retries; callers decide what a failure means.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::RequestBuilder;

use crate::config::FirestoreConfig;
use crate::error::{FirestoreError, Result};
use crate::types::*;
use crate::value::{quote_field_path, Fields, FirestoreValue};

const MAX_LOG_BODY_CHARS: usize = 512;
const LIST_PAGE_SIZE: u32 = 300;

/// Validated handle to one top-level collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRef {
    id: String,
}

impl CollectionRef {
    pub fn new(id: &str) -> Result<Self> {
        let id = id.trim();
        if id.is_empty() || id.contains('/') || id.starts_with("__") {
            return Err(FirestoreError::invalid_request(format!(
                "Invalid collection id '{}'",
                id
            )));
        }
        Ok(Self { id: id.to_string() })
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

fn validate_document_id(document_id: &str) -> Result<()> {
    if document_id.is_empty() || document_id.contains('/') || document_id == "." || document_id == ".." {
        return Err(FirestoreError::invalid_request(format!(
            "Invalid document id '{}'",
            document_id
        )));
    }
    Ok(())
}

fn query_string(params: &[(&str, String)]) -> String {
    params
        .iter()
        .map(|(name, value)| format!("{}={}", name, urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn with_query(url: String, params: &[(&str, String)]) -> String {
    if params.is_empty() {
        url
    } else {
        format!("{}?{}", url, query_string(params))
    }
}

/// Client for the documents REST API of one project database.
#[derive(Debug, Clone)]
pub struct FirestoreClient {
    client: reqwest::Client,
    base_url: String,
    documents_root: String,
    api_key: Option<String>,
    id_token: Option<String>,
}

impl FirestoreClient {
    fn log_response(status: reqwest::StatusCode, body: &str) {
        if status.is_success() {
            debug!("Firestore response status: {}", status);
            return;
        }

        let mut preview = body.chars().take(MAX_LOG_BODY_CHARS).collect::<String>();
        if body.chars().count() > MAX_LOG_BODY_CHARS {
            preview.push_str("...");
        }
        debug!("Firestore response error ({}): {}", status, preview);
    }

    /// Create a new client.
    ///
    /// Fails when the project id is empty or the HTTP client cannot be built;
    /// no request is sent.
    pub fn new(config: &FirestoreConfig) -> Result<Self> {
        if config.project_id.trim().is_empty() {
            return Err(FirestoreError::invalid_request("Missing project id"));
        }

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            documents_root: config.documents_root(),
            api_key: config.api_key.clone(),
            id_token: config.id_token.clone(),
        })
    }

    /// Create headers for an API request.
    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = &self.id_token {
            let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| FirestoreError::auth("Invalid ID token format"))?;
            headers.insert(AUTHORIZATION, auth_value);
        }

        Ok(headers)
    }

    fn url(&self, path: &str, mut params: Vec<(&'static str, String)>) -> String {
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        with_query(format!("{}/v1/{}{}", self.base_url, self.documents_root, path), &params)
    }

    fn collection_path(collection: &CollectionRef) -> String {
        format!("/{}", urlencoding::encode(collection.id()))
    }

    fn document_path(collection: &CollectionRef, document_id: &str) -> Result<String> {
        validate_document_id(document_id)?;
        Ok(format!(
            "/{}/{}",
            urlencoding::encode(collection.id()),
            urlencoding::encode(document_id)
        ))
    }

    async fn send(&self, request: RequestBuilder) -> Result<(reqwest::StatusCode, String)> {
        let response = request.headers(self.headers()?).send().await?;
        let status = response.status();
        let body = response.text().await?;
        Self::log_response(status, &body);
        Ok((status, body))
    }

    fn api_error(status: reqwest::StatusCode, body: &str) -> FirestoreError {
        if let Ok(error) = serde_json::from_str::<ApiErrorResponse>(body) {
            let code = error.error.status.unwrap_or_default();
            return FirestoreError::api(
                status.as_u16(),
                format!("{}: {}", code, error.error.message),
            );
        }
        // runQuery reports errors as a one-element array
        if let Ok(mut errors) = serde_json::from_str::<Vec<ApiErrorResponse>>(body) {
            if let Some(error) = errors.pop() {
                let code = error.error.status.unwrap_or_default();
                return FirestoreError::api(
                    status.as_u16(),
                    format!("{}: {}", code, error.error.message),
                );
            }
        }
        FirestoreError::api(status.as_u16(), format!("Request failed: {}", body))
    }

    /// Parse a JSON response body.
    fn parse_body<T: serde::de::DeserializeOwned>(
        status: reqwest::StatusCode,
        body: &str,
    ) -> Result<T> {
        if !status.is_success() {
            return Err(Self::api_error(status, body));
        }

        serde_json::from_str(body).map_err(|e| {
            log::error!("Failed to deserialize response. Body: {}, Error: {}", body, e);
            FirestoreError::from(e)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Documents
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a document; the backend assigns its id.
    ///
    /// POST /v1/{root}/{collection}
    pub async fn create_document(
        &self,
        collection: &CollectionRef,
        fields: Fields,
    ) -> Result<Document> {
        let url = self.url(&Self::collection_path(collection), Vec::new());
        debug!("Creating document in {}", collection.id());

        let (status, body) = self
            .send(self.client.post(&url).json(&Document::from_fields(fields)))
            .await?;
        Self::parse_body(status, &body)
    }

    /// Point read. A missing document is `Ok(None)`.
    ///
    /// GET /v1/{root}/{collection}/{documentId}
    pub async fn get_document(
        &self,
        collection: &CollectionRef,
        document_id: &str,
    ) -> Result<Option<Document>> {
        let url = self.url(&Self::document_path(collection, document_id)?, Vec::new());

        let (status, body) = self.send(self.client.get(&url)).await?;
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::parse_body(status, &body).map(Some)
    }

    /// Every document in the collection, following page tokens.
    ///
    /// GET /v1/{root}/{collection}?pageSize=n&pageToken=t
    pub async fn list_documents(&self, collection: &CollectionRef) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut params = vec![("pageSize", LIST_PAGE_SIZE.to_string())];
            if let Some(token) = page_token.take() {
                params.push(("pageToken", token));
            }
            let url = self.url(&Self::collection_path(collection), params);

            let (status, body) = self.send(self.client.get(&url)).await?;
            let page: ListDocumentsResponse = Self::parse_body(status, &body)?;
            documents.extend(page.documents);

            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(documents)
    }

    /// Documents whose `field_path` equals `value`.
    ///
    /// POST /v1/{root}:runQuery
    pub async fn query_equal(
        &self,
        collection: &CollectionRef,
        field_path: &str,
        value: FirestoreValue,
    ) -> Result<Vec<Document>> {
        let url = self.url(":runQuery", Vec::new());
        let request = RunQueryRequest::equal(collection.id(), field_path, value);
        debug!("Querying {} where {} == ...", collection.id(), field_path);

        let (status, body) = self.send(self.client.post(&url).json(&request)).await?;
        let items: Vec<RunQueryResponseItem> = Self::parse_body(status, &body)?;
        Ok(items.into_iter().filter_map(|item| item.document).collect())
    }

    /// Write only the given top-level fields of an existing document.
    ///
    /// Returns `false` when the document does not exist; nothing is written
    /// in that case. An empty field set sends no request.
    ///
    /// PATCH /v1/{root}/{collection}/{documentId}?updateMask.fieldPaths=..&currentDocument.exists=true
    pub async fn update_fields(
        &self,
        collection: &CollectionRef,
        document_id: &str,
        fields: Fields,
    ) -> Result<bool> {
        let path = Self::document_path(collection, document_id)?;
        if fields.is_empty() {
            return Ok(true);
        }

        let mut params: Vec<(&'static str, String)> = fields
            .keys()
            .map(|name| ("updateMask.fieldPaths", quote_field_path(name)))
            .collect();
        params.push(("currentDocument.exists", "true".to_string()));
        let url = self.url(&path, params);

        let (status, body) = self
            .send(self.client.patch(&url).json(&Document::from_fields(fields)))
            .await?;
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("Update skipped, {}/{} not found", collection.id(), document_id);
            return Ok(false);
        }
        Self::parse_body::<Document>(status, &body).map(|_| true)
    }

    /// Create or fully overwrite a document with a caller-chosen id.
    ///
    /// PATCH /v1/{root}/{collection}/{documentId}
    pub async fn set_document(
        &self,
        collection: &CollectionRef,
        document_id: &str,
        fields: Fields,
    ) -> Result<Document> {
        let url = self.url(&Self::document_path(collection, document_id)?, Vec::new());

        let (status, body) = self
            .send(self.client.patch(&url).json(&Document::from_fields(fields)))
            .await?;
        Self::parse_body(status, &body)
    }

    /// Delete a document. Deleting a missing document succeeds.
    ///
    /// DELETE /v1/{root}/{collection}/{documentId}
    pub async fn delete_document(&self, collection: &CollectionRef, document_id: &str) -> Result<()> {
        let url = self.url(&Self::document_path(collection, document_id)?, Vec::new());

        let (status, body) = self.send(self.client.delete(&url)).await?;
        if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
            return Ok(());
        }
        Err(Self::api_error(status, &body))
    }
}
