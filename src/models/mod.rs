use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuoteStatus {
    /// Numeric code the remote API expects on status updates.
    pub fn server_code(self) -> u8 {
        match self {
            QuoteStatus::Draft => 1,
            QuoteStatus::Sent => 2,
            QuoteStatus::Accepted => 3,
            QuoteStatus::Rejected => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuoteStatus::Draft => "borrador",
            QuoteStatus::Sent => "enviada",
            QuoteStatus::Accepted => "aceptada",
            QuoteStatus::Rejected => "rechazada",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UserRole {
    Admin,
    Seller,
    Installer,
    SuperAdmin,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessProfile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub secondary_color: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteHeader {
    pub id: String,
    pub folio: String,
    pub client_id: String,
    pub subtotal: f64,
    #[serde(default)]
    pub discount: Option<f64>,
    pub total: f64,
    #[serde(default)]
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub payment_method_id: Option<String>,
    #[serde(default)]
    pub conditions: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
    pub status: QuoteStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItem {
    pub id: String,
    pub quote_id: String,
    pub name: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub width_cm: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub depth_cm: Option<f64>,
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub color_id: Option<String>,
    #[serde(default)]
    pub finish_id: Option<String>,
    pub unit_price: f64,
    pub quantity: u32,
    pub subtotal: f64,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub header: QuoteHeader,
    pub client: Client,
    pub items: Vec<QuoteItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub whatsapp: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteItemInput {
    pub name: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub width_cm: Option<f64>,
    #[serde(default)]
    pub height_cm: Option<f64>,
    #[serde(default)]
    pub depth_cm: Option<f64>,
    #[serde(default)]
    pub material_id: Option<String>,
    #[serde(default)]
    pub color_id: Option<String>,
    #[serde(default)]
    pub finish_id: Option<String>,
    pub unit_price: f64,
    pub quantity: u32,
    /// Either an already-hosted URL or a base64 data URL still to upload.
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteInput {
    #[serde(default)]
    pub id: Option<String>,
    pub client_id: String,
    pub items: Vec<QuoteItemInput>,
    #[serde(default)]
    pub discount: Option<f64>,
    #[serde(default)]
    pub delivery_time: Option<String>,
    #[serde(default)]
    pub payment_method_id: Option<String>,
    #[serde(default)]
    pub conditions: Option<String>,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub status: Option<QuoteStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuoteOutcome {
    pub quote: Quote,
    /// Names of line items the remote API rejected; the rest are persisted.
    pub failed_items: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: Option<i64>,
}

impl CatalogEntry {
    pub fn is_active(&self) -> bool {
        self.active != Some(0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub active: Option<i64>,
    #[serde(default)]
    pub material_id: Option<String>,
}

impl ColorEntry {
    pub fn is_active(&self) -> bool {
        self.active != Some(0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogData {
    #[serde(default)]
    pub categories: Vec<CatalogEntry>,
    #[serde(default)]
    pub products: Vec<CatalogEntry>,
    #[serde(default)]
    pub materials: Vec<CatalogEntry>,
    #[serde(default)]
    pub colors: Vec<ColorEntry>,
    #[serde(default)]
    pub finishes: Vec<CatalogEntry>,
    #[serde(default)]
    pub units: Vec<CatalogEntry>,
    #[serde(default)]
    pub payment_methods: Vec<CatalogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedCatalog {
    pub data: CatalogData,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSnapshot {
    pub data: CatalogData,
    /// Set when the last refresh failed and stale data is being served.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSummary {
    pub id: String,
    pub folio: String,
    pub client_name: String,
    pub total: f64,
    pub status: QuoteStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_quotes: usize,
    pub drafts: usize,
    pub sent: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub accepted_month: f64,
    pub accepted_year: f64,
    pub recent_quotes: Vec<QuoteSummary>,
    pub chart_months: Vec<String>,
    pub chart_accepted: Vec<f64>,
}
