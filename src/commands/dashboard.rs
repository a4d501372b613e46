use chrono::{Datelike, Local, NaiveDate};
use tauri::State;

use crate::models::{DashboardStats, Quote, QuoteStatus, QuoteSummary};
use crate::services::state::AppState;

#[tauri::command]
pub async fn get_dashboard_stats(
    year_month: Option<String>,
    state: State<'_, AppState>,
) -> Result<DashboardStats, String> {
    let now = Local::now();
    let current_year_month =
        year_month.unwrap_or_else(|| format!("{}-{:02}", now.year(), now.month()));
    if current_year_month.len() != 7 {
        return Err("Invalid period, expected YYYY-MM".to_string());
    }
    let current_year = &current_year_month[0..4];

    let mut store = state.quotes.lock().await;
    if store.clients().is_empty() {
        store.load_clients().await.map_err(|e| e.to_string())?;
    }
    store.refresh(false).await.map_err(|e| e.to_string())?;
    let quotes = store.quotes();

    let (chart_months, chart_accepted) = build_chart_series(quotes, &current_year_month)?;

    Ok(DashboardStats {
        total_quotes: quotes.len(),
        drafts: count_status(quotes, QuoteStatus::Draft),
        sent: count_status(quotes, QuoteStatus::Sent),
        accepted: count_status(quotes, QuoteStatus::Accepted),
        rejected: count_status(quotes, QuoteStatus::Rejected),
        accepted_month: accepted_total_in(quotes, &current_year_month),
        accepted_year: accepted_total_in(quotes, current_year),
        recent_quotes: recent_summaries(quotes, 5),
        chart_months,
        chart_accepted,
    })
}

fn count_status(quotes: &[Quote], status: QuoteStatus) -> usize {
    quotes.iter().filter(|q| q.header.status == status).count()
}

fn accepted_total_in(quotes: &[Quote], period: &str) -> f64 {
    quotes
        .iter()
        .filter(|q| q.header.status == QuoteStatus::Accepted)
        .filter(|q| q.header.created_at.starts_with(period))
        .map(|q| q.header.total)
        .sum()
}

fn recent_summaries(quotes: &[Quote], limit: usize) -> Vec<QuoteSummary> {
    quotes
        .iter()
        .take(limit)
        .map(|q| QuoteSummary {
            id: q.header.id.clone(),
            folio: q.header.folio.clone(),
            client_name: q.client.name.clone(),
            total: q.header.total,
            status: q.header.status,
            created_at: q.header.created_at.clone(),
        })
        .collect()
}

fn build_chart_series(
    quotes: &[Quote],
    current_year_month: &str,
) -> Result<(Vec<String>, Vec<f64>), String> {
    let base_date = NaiveDate::parse_from_str(&format!("{}-01", current_year_month), "%Y-%m-%d")
        .map_err(|e| e.to_string())?;

    let mut months = Vec::new();
    let mut accepted = Vec::new();

    for offset in (0..12).rev() {
        let date = base_date
            .with_day(1)
            .and_then(|d| d.checked_sub_months(chrono::Months::new(offset as u32)))
            .ok_or_else(|| "Invalid date".to_string())?;
        let ym = format!("{}-{:02}", date.year(), date.month());
        accepted.push(accepted_total_in(quotes, &ym));
        months.push(ym);
    }

    Ok((months, accepted))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, QuoteHeader};

    fn quote(status: QuoteStatus, total: f64, created_at: &str) -> Quote {
        Quote {
            header: QuoteHeader {
                id: format!("q-{}", created_at),
                folio: "COT-2025-001".to_string(),
                client_id: "c-1".to_string(),
                subtotal: total,
                discount: None,
                total,
                delivery_time: None,
                payment_method_id: None,
                conditions: None,
                observations: None,
                status,
                created_at: created_at.to_string(),
            },
            client: Client {
                id: "c-1".to_string(),
                name: "Ana".to_string(),
                phone: None,
                whatsapp: None,
                email: None,
                address: None,
                notes: None,
                created_at: "2025-01-01T00:00:00+00:00".to_string(),
            },
            items: Vec::new(),
        }
    }

    #[test]
    fn accepted_totals_respect_status_and_period() {
        let quotes = vec![
            quote(QuoteStatus::Accepted, 1000.0, "2025-03-02T10:00:00+00:00"),
            quote(QuoteStatus::Accepted, 500.0, "2025-02-20T10:00:00+00:00"),
            quote(QuoteStatus::Sent, 9000.0, "2025-03-05T10:00:00+00:00"),
        ];
        assert_eq!(accepted_total_in(&quotes, "2025-03"), 1000.0);
        assert_eq!(accepted_total_in(&quotes, "2025"), 1500.0);
    }

    #[test]
    fn chart_series_covers_twelve_months_ending_at_the_period() {
        let quotes = vec![quote(
            QuoteStatus::Accepted,
            750.0,
            "2024-09-15T10:00:00+00:00",
        )];
        let (months, accepted) = build_chart_series(&quotes, "2025-03").unwrap();
        assert_eq!(months.len(), 12);
        assert_eq!(months.first().map(String::as_str), Some("2024-04"));
        assert_eq!(months.last().map(String::as_str), Some("2025-03"));
        let september = months.iter().position(|m| m == "2024-09").unwrap();
        assert_eq!(accepted[september], 750.0);
    }
}
