use hmac::{Hmac, Mac};
use mexcnode_core::ExchangeError;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the API key on signed requests.
pub const API_KEY_HEADER: &str = "x-mexc-apikey";

/// Sign a query string with the account secret.
///
/// MEXC expects HMAC-SHA256 over the exact query string that goes on the
/// wire (without the `signature` pair), lowercase hex encoded.
pub fn sign_query(secret: &str, query: &str) -> Result<String, ExchangeError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| ExchangeError::Authentication(format!("Invalid secret key: {}", e)))?;
    mac.update(query.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
