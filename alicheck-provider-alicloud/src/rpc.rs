//! RPC-style request signing (signature version 1.0, HMAC-SHA1)
//!
//! Every request parameter, including the common ones, is sorted by key,
//! percent-encoded with the RFC 3986 unreserved set and joined with `&`.
//! The string to sign is `GET&%2F&<encoded canonical query>` and the key is
//! the AccessKey secret followed by `&`.

use std::collections::BTreeMap;

use alicheck_core::provider::{ProviderError, ProviderResult};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;

use crate::config::AliCloudConfig;

type HmacSha1 = Hmac<Sha1>;

/// Characters left unescaped: `A-Z a-z 0-9 - _ . ~`
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// ECS API version used for every action
pub const ECS_API_VERSION: &str = "2014-05-26";

const HTTP_METHOD: &str = "GET";

pub fn percent_encode(value: &str) -> String {
    utf8_percent_encode(value, UNRESERVED).to_string()
}

/// A single API action with its action-specific parameters
#[derive(Debug, Clone)]
pub struct RpcRequest {
    action: String,
    params: BTreeMap<String, String>,
}

impl RpcRequest {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// All parameters sent on the wire, except the signature itself
    fn all_params(
        &self,
        config: &AliCloudConfig,
        nonce: &str,
        timestamp: &str,
    ) -> BTreeMap<String, String> {
        let mut params = self.params.clone();
        params.insert("Action".to_string(), self.action.clone());
        params.insert("Format".to_string(), "JSON".to_string());
        params.insert("Version".to_string(), ECS_API_VERSION.to_string());
        params.insert("AccessKeyId".to_string(), config.access_key_id.clone());
        params.insert("SignatureMethod".to_string(), "HMAC-SHA1".to_string());
        params.insert("SignatureVersion".to_string(), "1.0".to_string());
        params.insert("SignatureNonce".to_string(), nonce.to_string());
        params.insert("Timestamp".to_string(), timestamp.to_string());
        if let Some(token) = &config.security_token {
            params.insert("SecurityToken".to_string(), token.clone());
        }
        params
    }

    /// Build the signed query string (without a leading `?`)
    pub fn signed_query(
        &self,
        config: &AliCloudConfig,
        nonce: &str,
        timestamp: &str,
    ) -> ProviderResult<String> {
        let canonical = canonicalize(&self.all_params(config, nonce, timestamp));
        let signature = sign(&config.access_key_secret, &string_to_sign(&canonical))?;
        Ok(format!(
            "{}&Signature={}",
            canonical,
            percent_encode(&signature)
        ))
    }
}

pub fn canonicalize(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn string_to_sign(canonical_query: &str) -> String {
    format!(
        "{}&{}&{}",
        HTTP_METHOD,
        percent_encode("/"),
        percent_encode(canonical_query)
    )
}

/// Base64-encoded HMAC-SHA1 of `string_to_sign`, keyed with `secret&`
pub fn sign(secret: &str, string_to_sign: &str) -> ProviderResult<String> {
    let key = format!("{}&", secret);
    let mut mac = HmacSha1::new_from_slice(key.as_bytes())
        .map_err(|e| ProviderError::configuration(format!("Invalid signing key: {}", e)))?;
    mac.update(string_to_sign.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}
