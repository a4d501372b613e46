use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BusinessProfile, CatalogData, Client, ClientInput, QuoteHeader, QuoteItem};

const DEFAULT_BASE_URL: &str = "https://api.cotizadormuebles.mx/v1";
const DEFAULT_UPLOAD_URL: &str = "https://assets.cotizadormuebles.mx/upload";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{message}")]
    Api { message: String },
    #[error("malformed response: {0}")]
    Decode(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

/// Uniform `{success, data?, error?}` shape every remote endpoint responds with.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl<T> Envelope<T> {
    fn into_result(self) -> ApiResult<T> {
        if self.success {
            self.data
                .ok_or_else(|| ApiError::Decode("success response without data".to_string()))
        } else {
            Err(ApiError::Api {
                message: self
                    .error
                    .unwrap_or_else(|| "request rejected by server".to_string()),
            })
        }
    }

    fn check(self) -> ApiResult<()> {
        match self.into_result() {
            Ok(_) => Ok(()),
            // Write endpoints may answer success with an empty body.
            Err(ApiError::Decode(_)) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    estatus: u8,
}

#[derive(Deserialize)]
struct FolioResponse {
    folio: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadRequest<'a> {
    file_name: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct UploadResponse {
    url: String,
}

pub trait CatalogApi: Send + Sync {
    fn fetch_catalog(&self) -> impl Future<Output = ApiResult<CatalogData>> + Send;
}

pub trait QuotesApi: Send + Sync {
    fn fetch_business_profile(&self) -> impl Future<Output = ApiResult<BusinessProfile>> + Send;
    fn update_business_profile(
        &self,
        profile: &BusinessProfile,
    ) -> impl Future<Output = ApiResult<BusinessProfile>> + Send;
    fn fetch_clients(&self) -> impl Future<Output = ApiResult<Vec<Client>>> + Send;
    fn create_client(&self, input: &ClientInput) -> impl Future<Output = ApiResult<Client>> + Send;
    fn update_client(
        &self,
        id: &str,
        input: &ClientInput,
    ) -> impl Future<Output = ApiResult<Client>> + Send;
    fn delete_client(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send;
    fn fetch_quotes(&self) -> impl Future<Output = ApiResult<Vec<QuoteHeader>>> + Send;
    fn fetch_quote_items(
        &self,
        quote_id: &str,
    ) -> impl Future<Output = ApiResult<Vec<QuoteItem>>> + Send;
    fn next_folio(&self) -> impl Future<Output = ApiResult<String>> + Send;
    fn create_quote(
        &self,
        header: &QuoteHeader,
    ) -> impl Future<Output = ApiResult<QuoteHeader>> + Send;
    fn update_quote(
        &self,
        header: &QuoteHeader,
    ) -> impl Future<Output = ApiResult<QuoteHeader>> + Send;
    fn delete_quote(&self, id: &str) -> impl Future<Output = ApiResult<()>> + Send;
    fn delete_quote_items(&self, quote_id: &str) -> impl Future<Output = ApiResult<()>> + Send;
    fn create_quote_item(
        &self,
        item: &QuoteItem,
    ) -> impl Future<Output = ApiResult<QuoteItem>> + Send;
    fn update_quote_status(
        &self,
        id: &str,
        status_code: u8,
    ) -> impl Future<Output = ApiResult<()>> + Send;
}

pub trait AssetApi: Send + Sync {
    /// Uploads a base64-encoded image and returns the hosted URL.
    fn upload_image(
        &self,
        file_name: &str,
        data: &str,
    ) -> impl Future<Output = ApiResult<String>> + Send;
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    upload_url: String,
}

impl ApiClient {
    pub fn new() -> Self {
        let base_url =
            std::env::var("COTIZADOR_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let upload_url =
            std::env::var("COTIZADOR_ASSET_URL").unwrap_or_else(|_| DEFAULT_UPLOAD_URL.to_string());
        ApiClient {
            http: reqwest::Client::new(),
            base_url,
            upload_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        let response = self.http.get(self.url(path)).send().await?;
        decode_envelope::<T>(response).await?.into_result()
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        decode_envelope::<T>(response).await?.into_result()
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ApiResult<T> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        decode_envelope::<T>(response).await?.into_result()
    }

    async fn put_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResult<()> {
        let response = self.http.put(self.url(path)).json(body).send().await?;
        decode_envelope::<serde_json::Value>(response).await?.check()
    }

    async fn delete(&self, path: &str) -> ApiResult<()> {
        let response = self.http.delete(self.url(path)).send().await?;
        decode_envelope::<serde_json::Value>(response).await?.check()
    }
}

async fn decode_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> ApiResult<Envelope<T>> {
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

impl CatalogApi for ApiClient {
    async fn fetch_catalog(&self) -> ApiResult<CatalogData> {
        self.get("/catalogos").await
    }
}

impl QuotesApi for ApiClient {
    async fn fetch_business_profile(&self) -> ApiResult<BusinessProfile> {
        self.get("/perfil").await
    }

    async fn update_business_profile(&self, profile: &BusinessProfile) -> ApiResult<BusinessProfile> {
        self.put("/perfil", profile).await
    }

    async fn fetch_clients(&self) -> ApiResult<Vec<Client>> {
        self.get("/clientes").await
    }

    async fn create_client(&self, input: &ClientInput) -> ApiResult<Client> {
        self.post("/clientes", input).await
    }

    async fn update_client(&self, id: &str, input: &ClientInput) -> ApiResult<Client> {
        self.put(&format!("/clientes/{}", id), input).await
    }

    async fn delete_client(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/clientes/{}", id)).await
    }

    async fn fetch_quotes(&self) -> ApiResult<Vec<QuoteHeader>> {
        self.get("/cotizaciones").await
    }

    async fn fetch_quote_items(&self, quote_id: &str) -> ApiResult<Vec<QuoteItem>> {
        self.get(&format!("/cotizaciones/{}/partidas", quote_id)).await
    }

    async fn next_folio(&self) -> ApiResult<String> {
        let response: FolioResponse = self.get("/cotizaciones/siguiente-folio").await?;
        Ok(response.folio)
    }

    async fn create_quote(&self, header: &QuoteHeader) -> ApiResult<QuoteHeader> {
        self.post("/cotizaciones", header).await
    }

    async fn update_quote(&self, header: &QuoteHeader) -> ApiResult<QuoteHeader> {
        self.put(&format!("/cotizaciones/{}", header.id), header).await
    }

    async fn delete_quote(&self, id: &str) -> ApiResult<()> {
        self.delete(&format!("/cotizaciones/{}", id)).await
    }

    async fn delete_quote_items(&self, quote_id: &str) -> ApiResult<()> {
        self.delete(&format!("/cotizaciones/{}/partidas", quote_id)).await
    }

    async fn create_quote_item(&self, item: &QuoteItem) -> ApiResult<QuoteItem> {
        self.post(&format!("/cotizaciones/{}/partidas", item.quote_id), item)
            .await
    }

    async fn update_quote_status(&self, id: &str, status_code: u8) -> ApiResult<()> {
        self.put_unit(
            &format!("/cotizaciones/{}/estatus", id),
            &StatusBody { estatus: status_code },
        )
        .await
    }
}

impl AssetApi for ApiClient {
    async fn upload_image(&self, file_name: &str, data: &str) -> ApiResult<String> {
        let response = self
            .http
            .post(self.upload_url.as_str())
            .json(&UploadRequest { file_name, data })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Api {
                message: format!("upload failed ({}): {}", status, body),
            });
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(body.url)
    }
}
