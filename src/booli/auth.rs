use chrono::Local;
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::query::Value;

/// Extra search parameters sent alongside the authentication fields
pub type SearchParams = BTreeMap<String, Value>;

/// Authentication fields the API expects on every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthParams {
    pub caller_id: String,
    pub time: String,
    pub unique: String,
    pub hash: String,
}

impl AuthParams {
    /// Sign a request made now with a fresh unique token
    pub fn generate(caller_id: &str, api_key: &str) -> Self {
        let time = Local::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        Self::new(caller_id, api_key, time, unique_token())
    }

    pub fn new(caller_id: &str, api_key: &str, time: String, unique: String) -> Self {
        let hash = sign(caller_id, &time, api_key, &unique);
        Self {
            caller_id: caller_id.to_string(),
            time,
            unique,
            hash,
        }
    }
}

/// Hex SHA-1 of caller id, time, key and unique token, concatenated
pub fn sign(caller_id: &str, time: &str, api_key: &str, unique: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(caller_id.as_bytes());
    hasher.update(time.as_bytes());
    hasher.update(api_key.as_bytes());
    hasher.update(unique.as_bytes());
    hex::encode(hasher.finalize())
}

const TOKEN_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
const TOKEN_LENGTH: usize = 16;

/// 16 random characters from `[A-Za-z0-9]`, drawn from v4 UUID bytes
fn unique_token() -> String {
    // bytes at or above this bound would favour the first few characters
    let bound = (256 / TOKEN_ALPHABET.len() * TOKEN_ALPHABET.len()) as u8;

    let mut token = String::with_capacity(TOKEN_LENGTH);
    while token.len() < TOKEN_LENGTH {
        let bytes = Uuid::new_v4().into_bytes();
        // bytes 6 and 8 carry the fixed version and variant bits
        let random = bytes
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 6 && *i != 8)
            .map(|(_, byte)| *byte);
        for byte in random {
            if byte < bound && token.len() < TOKEN_LENGTH {
                token.push(TOKEN_ALPHABET[byte as usize % TOKEN_ALPHABET.len()] as char);
            }
        }
    }
    token
}

/// Render a parameter value the way the API reads it: booleans as 0/1,
/// lists comma-joined, everything else in its display form
pub fn param_value(value: &Value) -> String {
    match value {
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => "0".to_string(),
        Value::List(items) => items.iter().map(param_value).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}

/// URL-encoded query string of search and authentication parameters, in key order
pub fn encode_query(params: &SearchParams, auth: &AuthParams) -> String {
    let mut all: BTreeMap<&str, String> = params
        .iter()
        .map(|(key, value)| (key.as_str(), param_value(value)))
        .collect();

    all.insert("callerId", auth.caller_id.clone());
    all.insert("time", auth.time.clone());
    all.insert("unique", auth.unique.clone());
    all.insert("hash", auth.hash.clone());
    all.insert("format", "json".to_string());

    all.iter()
        .map(|(key, value)| format!("{}={}", urlencoding::encode(key), urlencoding::encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}
