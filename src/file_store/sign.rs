//! AWS Signature Version 4 request signing for the S3-compatible backend.
//!
//! Covers exactly what the object store needs: single-chunk PUT/GET/DELETE
//! with a signed payload hash and no query parameters. The region is fixed
//! to "auto", which R2 and other S3-compatible stores accept.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

const REGION: &str = "auto";
const SERVICE: &str = "s3";

/// The headers a signed request must carry.
pub struct SignedHeaders {
    pub authorization: String,
    pub amz_date: String,
    pub amz_content_sha256: String,
}

pub fn sign_request(
    method: &str,
    host: &str,
    path: &str,
    payload: &[u8],
    access_key: &str,
    secret_key: &str,
    now: DateTime<Utc>,
) -> SignedHeaders {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let payload_hash = hex(&Sha256::digest(payload));

    // Headers included in the signature, sorted by name
    let canonical_headers = format!(
        "host:{}\nx-amz-content-sha256:{}\nx-amz-date:{}\n",
        host, payload_hash, amz_date
    );
    let signed_headers = "host;x-amz-content-sha256;x-amz-date";

    let canonical_request = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        method,
        uri_encode_path(path),
        canonical_headers,
        signed_headers,
        payload_hash
    );

    let scope = format!("{}/{}/{}/aws4_request", date, REGION, SERVICE);
    let string_to_sign = format!(
        "AWS4-HMAC-SHA256\n{}\n{}\n{}",
        amz_date,
        scope,
        hex(&Sha256::digest(canonical_request.as_bytes()))
    );

    let signing_key = derive_signing_key(secret_key, &date);
    let signature = hex(&hmac_sha256(&signing_key, string_to_sign.as_bytes()));

    let authorization = format!(
        "AWS4-HMAC-SHA256 Credential={}/{}, SignedHeaders={}, Signature={}",
        access_key, scope, signed_headers, signature
    );

    SignedHeaders {
        authorization,
        amz_date,
        amz_content_sha256: payload_hash,
    }
}

fn derive_signing_key(secret_key: &str, date: &str) -> [u8; 32] {
    let k_date = hmac_sha256(format!("AWS4{}", secret_key).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, REGION.as_bytes());
    let k_service = hmac_sha256(&k_region, SERVICE.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

/// HMAC-SHA256 built from the sha2 primitive (RFC 2104, 64-byte block).
fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    const BLOCK_SIZE: usize = 64;

    let mut block_key = [0u8; BLOCK_SIZE];
    if key.len() > BLOCK_SIZE {
        block_key[..32].copy_from_slice(&Sha256::digest(key));
    } else {
        block_key[..key.len()].copy_from_slice(key);
    }

    let mut inner = Sha256::new();
    inner.update(block_key.map(|b| b ^ 0x36));
    inner.update(data);
    let inner_hash = inner.finalize();

    let mut outer = Sha256::new();
    outer.update(block_key.map(|b| b ^ 0x5c));
    outer.update(inner_hash);
    outer.finalize().into()
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Percent-encode a path per the SigV4 rules: unreserved characters and `/`
/// stay literal, everything else is encoded.
fn uri_encode_path(path: &str) -> String {
    let mut encoded = String::with_capacity(path.len());
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                encoded.push(byte as char)
            }
            other => encoded.push_str(&format!("%{:02X}", other)),
        }
    }
    encoded
}
