use serde::Serialize;

use crate::api::CatalogApi;
use crate::models::{BusinessProfile, Quote, QuoteItem};
use crate::services::catalog::CatalogCache;
use crate::utils::format_decimal;

const ITEMS_PER_PAGE: usize = 12;

const DEFAULT_CONDITIONS: &[&str] = &[
    "Precios en pesos mexicanos, IVA incluido.",
    "Anticipo del 50% para iniciar fabricación.",
    "Vigencia de la cotización: 15 días naturales.",
];

/// Printable rendition of a quotation. The frontend lays these blocks out;
/// pagination and naming are decided here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDocument {
    pub file_name: String,
    pub image_file_name: String,
    pub folio: String,
    pub date: String,
    pub status: String,
    pub business: BusinessBlock,
    pub client: ClientBlock,
    pub pages: Vec<DocumentPage>,
    pub totals: TotalsBlock,
    pub delivery_time: Option<String>,
    pub payment_method: Option<String>,
    pub conditions: Vec<String>,
    pub observations: Option<String>,
    pub footer: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessBlock {
    pub name: String,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientBlock {
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPage {
    pub number: usize,
    pub rows: Vec<ItemRow>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRow {
    pub name: String,
    pub detail: String,
    pub quantity: u32,
    pub unit_price: String,
    pub subtotal: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsBlock {
    pub subtotal: String,
    pub discount: Option<String>,
    pub total: String,
}

pub fn build_document<A: CatalogApi>(
    quote: &Quote,
    profile: Option<&BusinessProfile>,
    catalog: &CatalogCache<A>,
) -> QuoteDocument {
    let header = &quote.header;
    let business = match profile {
        Some(profile) => BusinessBlock {
            name: profile.name.clone(),
            phone: profile.phone.clone(),
            whatsapp: profile.whatsapp.clone(),
            email: profile.email.clone(),
            address: profile.address.clone(),
            logo_url: profile.logo_url.clone(),
        },
        None => BusinessBlock {
            name: "Cotización".to_string(),
            phone: None,
            whatsapp: None,
            email: None,
            address: None,
            logo_url: None,
        },
    };

    let rows: Vec<ItemRow> = quote
        .items
        .iter()
        .map(|item| ItemRow {
            name: item.name.clone(),
            detail: item_detail(item, catalog),
            quantity: item.quantity,
            unit_price: format_decimal(item.unit_price),
            subtotal: format_decimal(item.subtotal),
            image_url: item.image_url.clone(),
        })
        .collect();

    let conditions = match header.conditions.as_deref() {
        Some(text) if !text.trim().is_empty() => text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        _ => DEFAULT_CONDITIONS.iter().map(|c| c.to_string()).collect(),
    };

    QuoteDocument {
        file_name: format!("{}.pdf", header.folio),
        image_file_name: format!("{}.png", header.folio),
        folio: header.folio.clone(),
        date: header.created_at.clone(),
        status: header.status.label().to_string(),
        business,
        client: ClientBlock {
            name: quote.client.name.clone(),
            phone: quote.client.phone.clone().or_else(|| quote.client.whatsapp.clone()),
            address: quote.client.address.clone(),
        },
        pages: paginate(rows),
        totals: TotalsBlock {
            subtotal: format_decimal(header.subtotal),
            discount: header.discount.map(format_decimal),
            total: format_decimal(header.total),
        },
        delivery_time: header.delivery_time.clone(),
        payment_method: header
            .payment_method_id
            .as_deref()
            .map(|id| catalog.payment_method_name(id)),
        conditions,
        observations: header.observations.clone(),
        footer: format!("{} · Folio {}", business_footer_name(profile), header.folio),
    }
}

/// Share text for the WhatsApp flow; the frontend turns it into a wa.me link.
pub fn share_message(quote: &Quote, profile: Option<&BusinessProfile>) -> String {
    format!(
        "Hola {}, le compartimos la cotización {} por un total de ${}. Quedamos atentos a sus comentarios. {}",
        quote.client.name,
        quote.header.folio,
        format_decimal(quote.header.total),
        business_footer_name(profile),
    )
}

fn business_footer_name(profile: Option<&BusinessProfile>) -> String {
    profile
        .map(|p| p.name.clone())
        .unwrap_or_else(|| "Cotizador".to_string())
}

fn item_detail<A: CatalogApi>(item: &QuoteItem, catalog: &CatalogCache<A>) -> String {
    let mut parts = Vec::new();
    if let Some(id) = item.category_id.as_deref() {
        parts.push(catalog.category_name(id));
    }
    if let Some(id) = item.material_id.as_deref() {
        parts.push(catalog.material_name(id));
    }
    if let Some(id) = item.color_id.as_deref() {
        parts.push(catalog.color_name(id));
    }
    if let Some(id) = item.finish_id.as_deref() {
        parts.push(catalog.finish_name(id));
    }
    if let (Some(w), Some(h), Some(d)) = (item.width_cm, item.height_cm, item.depth_cm) {
        parts.push(format!("{}x{}x{} cm", w, h, d));
    }
    parts.join(" / ")
}

fn paginate(rows: Vec<ItemRow>) -> Vec<DocumentPage> {
    if rows.is_empty() {
        return vec![DocumentPage {
            number: 1,
            rows: Vec::new(),
        }];
    }

    rows.chunks(ITEMS_PER_PAGE)
        .enumerate()
        .map(|(index, chunk)| DocumentPage {
            number: index + 1,
            rows: chunk.to_vec(),
        })
        .collect()
}
