use std::time::{Duration, Instant};

use anyhow::{anyhow, Result};
use futures::future;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{ApiClient, AssetApi, QuotesApi};
use crate::models::{
    BusinessProfile, Client, ClientInput, Quote, QuoteHeader, QuoteInput, QuoteItem,
    QuoteItemInput, QuoteStatus, SaveQuoteOutcome,
};
use crate::services::assets;
use crate::utils::{fallback_folio, normalize_phone, now_rfc3339};

const QUOTES_MAX_AGE: Duration = Duration::from_secs(30);

/// In-memory mirror of the remote business entities. Clients and the profile
/// are always refetched on demand; the quotation list is trusted for 30
/// seconds after a successful full refresh.
pub struct QuoteStore<A = ApiClient> {
    api: A,
    clients: Vec<Client>,
    profile: Option<BusinessProfile>,
    quotes: Vec<Quote>,
    last_refresh: Option<Instant>,
}

impl<A: QuotesApi + AssetApi> QuoteStore<A> {
    pub fn new(api: A) -> Self {
        QuoteStore {
            api,
            clients: Vec::new(),
            profile: None,
            quotes: Vec::new(),
            last_refresh: None,
        }
    }

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn profile(&self) -> Option<&BusinessProfile> {
        self.profile.as_ref()
    }

    pub fn quotes(&self) -> &[Quote] {
        &self.quotes
    }

    pub fn find_quote(&self, quote_id: &str) -> Option<&Quote> {
        self.quotes.iter().find(|quote| quote.header.id == quote_id)
    }

    pub async fn load_clients(&mut self) -> Result<Vec<Client>> {
        let clients = self.api.fetch_clients().await?;
        self.clients = clients.clone();
        Ok(clients)
    }

    pub async fn save_client(&mut self, mut input: ClientInput) -> Result<Client> {
        if let Some(raw) = input.whatsapp.take() {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                let normalized = normalize_phone(trimmed)
                    .ok_or_else(|| anyhow!("WhatsApp number must have 10 digits"))?;
                input.whatsapp = Some(normalized);
            }
        }

        match input.id.clone() {
            Some(id) => {
                let client = self.api.update_client(&id, &input).await?;
                if let Some(existing) = self.clients.iter_mut().find(|c| c.id == id) {
                    *existing = client.clone();
                }
                Ok(client)
            }
            None => {
                let client = self.api.create_client(&input).await?;
                self.clients.push(client.clone());
                Ok(client)
            }
        }
    }

    pub async fn delete_client(&mut self, id: &str) -> Result<()> {
        self.api.delete_client(id).await?;
        self.clients.retain(|client| client.id != id);
        Ok(())
    }

    pub async fn load_profile(&mut self) -> Result<BusinessProfile> {
        let profile = self.api.fetch_business_profile().await?;
        self.profile = Some(profile.clone());
        Ok(profile)
    }

    pub async fn save_profile(&mut self, profile: BusinessProfile) -> Result<BusinessProfile> {
        let saved = self.api.update_business_profile(&profile).await?;
        self.profile = Some(saved.clone());
        Ok(saved)
    }

    /// Refreshes the quotation mirror. Headers are joined against the local
    /// client list (headers with an unknown client are dropped) and line
    /// items for all surviving headers are fetched concurrently.
    pub async fn refresh(&mut self, force: bool) -> Result<()> {
        if !force {
            if let Some(at) = self.last_refresh {
                if at.elapsed() < QUOTES_MAX_AGE {
                    debug!("quotation list still fresh, skipping refresh");
                    return Ok(());
                }
            }
        }

        let headers = self.api.fetch_quotes().await?;
        let total = headers.len();

        let matched: Vec<(QuoteHeader, Client)> = headers
            .into_iter()
            .filter_map(|header| {
                match self.clients.iter().find(|c| c.id == header.client_id) {
                    Some(client) => Some((header, client.clone())),
                    None => {
                        warn!(
                            quote = %header.id,
                            client = %header.client_id,
                            "dropping quotation with no matching client"
                        );
                        None
                    }
                }
            })
            .collect();

        let detail_calls = matched
            .iter()
            .map(|(header, _)| self.api.fetch_quote_items(&header.id));
        let details = future::join_all(detail_calls).await;

        let mut quotes = Vec::with_capacity(matched.len());
        for ((header, client), items) in matched.into_iter().zip(details) {
            quotes.push(Quote {
                header,
                client,
                items: items?,
            });
        }

        info!(
            count = quotes.len(),
            dropped = total - quotes.len(),
            "quotation list refreshed"
        );
        self.quotes = quotes;
        self.last_refresh = Some(Instant::now());
        Ok(())
    }

    /// Folio reservation, header create, image uploads and item writes, in
    /// that order. Item writes are not transactional: failures are collected
    /// into the outcome, everything already written stays persisted.
    pub async fn create(&mut self, input: QuoteInput) -> Result<SaveQuoteOutcome> {
        let client = self
            .clients
            .iter()
            .find(|c| c.id == input.client_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown client {}", input.client_id))?;

        let folio = match self.api.next_folio().await {
            Ok(folio) => folio,
            Err(err) => {
                let fallback =
                    fallback_folio(self.quotes.iter().map(|q| q.header.folio.as_str()));
                warn!(error = %err, folio = %fallback, "next-folio endpoint failed, using local fallback");
                fallback
            }
        };

        let quote_id = Uuid::new_v4().to_string();
        let (subtotal, total) = totals(&input);
        let header = QuoteHeader {
            id: quote_id.clone(),
            folio,
            client_id: input.client_id.clone(),
            subtotal,
            discount: input.discount,
            total,
            delivery_time: input.delivery_time.clone(),
            payment_method_id: input.payment_method_id.clone(),
            conditions: input.conditions.clone(),
            observations: input.observations.clone(),
            status: input.status.unwrap_or(QuoteStatus::Draft),
            created_at: now_rfc3339(),
        };

        let header = self.api.create_quote(&header).await?;
        let (items, failed_items) = self.write_items(&quote_id, &input.items).await;

        let quote = Quote {
            header,
            client,
            items,
        };
        self.quotes.insert(0, quote.clone());
        info!(folio = %quote.header.folio, "quotation created");
        Ok(SaveQuoteOutcome {
            quote,
            failed_items,
        })
    }

    /// Item updates are full-replace: one bulk delete for the quotation,
    /// then every item is re-created sequentially so the numeric id
    /// suffixes stay in order.
    pub async fn update(&mut self, input: QuoteInput) -> Result<SaveQuoteOutcome> {
        let quote_id = input
            .id
            .clone()
            .ok_or_else(|| anyhow!("quotation id required for update"))?;
        let existing = self
            .find_quote(&quote_id)
            .cloned()
            .ok_or_else(|| anyhow!("unknown quotation {}", quote_id))?;

        let client = if input.client_id == existing.client.id {
            existing.client.clone()
        } else {
            self.clients
                .iter()
                .find(|c| c.id == input.client_id)
                .cloned()
                .ok_or_else(|| anyhow!("unknown client {}", input.client_id))?
        };

        let (subtotal, total) = totals(&input);
        let mut header = existing.header.clone();
        header.client_id = input.client_id.clone();
        header.subtotal = subtotal;
        header.discount = input.discount;
        header.total = total;
        header.delivery_time = input.delivery_time.clone();
        header.payment_method_id = input.payment_method_id.clone();
        header.conditions = input.conditions.clone();
        header.observations = input.observations.clone();
        if let Some(status) = input.status {
            header.status = status;
        }

        let header = self.api.update_quote(&header).await?;
        self.api.delete_quote_items(&quote_id).await?;
        let (items, failed_items) = self.write_items(&quote_id, &input.items).await;

        let quote = Quote {
            header,
            client,
            items,
        };
        if let Some(slot) = self.quotes.iter_mut().find(|q| q.header.id == quote_id) {
            *slot = quote.clone();
        }
        Ok(SaveQuoteOutcome {
            quote,
            failed_items,
        })
    }

    pub async fn set_status(&mut self, quote_id: &str, status: QuoteStatus) -> Result<()> {
        self.api
            .update_quote_status(quote_id, status.server_code())
            .await?;
        if let Some(quote) = self.quotes.iter_mut().find(|q| q.header.id == quote_id) {
            quote.header.status = status;
        }
        Ok(())
    }

    pub async fn delete(&mut self, quote_id: &str) -> Result<()> {
        self.api.delete_quote_items(quote_id).await?;
        self.api.delete_quote(quote_id).await?;
        self.quotes.retain(|quote| quote.header.id != quote_id);
        Ok(())
    }

    async fn write_items(
        &self,
        quote_id: &str,
        inputs: &[QuoteItemInput],
    ) -> (Vec<QuoteItem>, Vec<String>) {
        let mut items = Vec::new();
        let mut failed = Vec::new();

        for (index, input) in inputs.iter().enumerate() {
            let image_url = self
                .resolve_image(quote_id, index, input.image.as_deref())
                .await;
            let item = QuoteItem {
                id: format!("{}-{}", quote_id, index + 1),
                quote_id: quote_id.to_string(),
                name: input.name.clone(),
                category_id: input.category_id.clone(),
                width_cm: input.width_cm,
                height_cm: input.height_cm,
                depth_cm: input.depth_cm,
                material_id: input.material_id.clone(),
                color_id: input.color_id.clone(),
                finish_id: input.finish_id.clone(),
                unit_price: input.unit_price,
                quantity: input.quantity,
                subtotal: input.unit_price * f64::from(input.quantity),
                image_url,
            };

            match self.api.create_quote_item(&item).await {
                Ok(saved) => items.push(saved),
                Err(err) => {
                    warn!(item = %item.name, error = %err, "line item rejected by server");
                    failed.push(item.name.clone());
                }
            }
        }

        (items, failed)
    }

    async fn resolve_image(
        &self,
        quote_id: &str,
        index: usize,
        image: Option<&str>,
    ) -> Option<String> {
        let raw = image?;
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return Some(raw.to_string());
        }

        let file_name = format!("{}-{}.png", quote_id, index + 1);
        match assets::upload_image(&self.api, &file_name, raw).await {
            Ok(url) => Some(url),
            Err(err) => {
                // Losing the picture must not block the save.
                warn!(error = %err, "image upload failed, saving item without image");
                None
            }
        }
    }
}

fn totals(input: &QuoteInput) -> (f64, f64) {
    let subtotal: f64 = input
        .items
        .iter()
        .map(|item| item.unit_price * f64::from(item.quantity))
        .sum();
    let total = subtotal - input.discount.unwrap_or(0.0);
    (subtotal, total)
}
