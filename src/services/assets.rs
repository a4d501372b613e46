use anyhow::{anyhow, Result};
use base64::{engine::general_purpose, Engine as _};

use crate::api::AssetApi;

/// Pushes a base64 image (bare or `data:` URL) to the asset host and
/// returns the hosted URL. The payload is decoded first so an unreadable
/// image fails here instead of round-tripping to the host.
pub async fn upload_image<A: AssetApi>(api: &A, file_name: &str, raw: &str) -> Result<String> {
    let payload = strip_data_url(raw);
    general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| anyhow!("invalid base64 image: {}", e))?;
    let url = api.upload_image(file_name, payload).await?;
    Ok(url)
}

fn strip_data_url(raw: &str) -> &str {
    match raw.split_once(',') {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => raw,
    }
}
