//! RFC 5849 signature base string and RSA-SHA1 signing

use crate::errors::{Result, ScmError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use rsa::pkcs1v15::SigningKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha1::Sha1;
use url::Url;

pub const SIGNATURE_METHOD: &str = "RSA-SHA1";
pub const OAUTH_VERSION: &str = "1.0";

/// RFC 3986 percent-encoding: everything but `A-Z a-z 0-9 - . _ ~`
pub fn percent_encode(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Scheme and host lowercased, default ports dropped, no query or fragment
pub fn normalized_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_lowercase();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!(
        "{}://{}{}{}",
        url.scheme().to_lowercase(),
        host,
        port,
        url.path()
    )
}

/// `METHOD&enc(url)&enc(sorted params)`. Query parameters of `url` are folded in.
pub fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (percent_encode(k), percent_encode(v)))
        .chain(
            url.query_pairs()
                .map(|(k, v)| (percent_encode(&k), percent_encode(&v))),
        )
        .collect();
    encoded.sort();

    let joined = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_uppercase(),
        percent_encode(&normalized_url(url)),
        percent_encode(&joined)
    )
}

/// Base64 PKCS#1 v1.5 SHA-1 signature of `base_string`
pub fn sign_rsa_sha1(key: &SigningKey<Sha1>, base_string: &str) -> Result<String> {
    let signature = key
        .try_sign(base_string.as_bytes())
        .map_err(|e| ScmError::crypto(format!("Failed to sign OAuth request: {e}")))?;
    Ok(STANDARD.encode(signature.to_bytes()))
}
