//! Request signature
//!
//! The service authenticates every call with
//! `hex(md5(method + url + body + secret))`, passed as the `sign` query
//! parameter. The parts are concatenated with no delimiter and the URL is the
//! endpoint exactly as configured (without the query string).

use md5::compute as md5_compute;

/// Compute the lowercase hex signature for one request
pub fn sign(method: &str, url: &str, body: &str, secret: &str) -> String {
    let mut input = String::with_capacity(method.len() + url.len() + body.len() + secret.len());
    input.push_str(method);
    input.push_str(url);
    input.push_str(body);
    input.push_str(secret);

    format!("{:x}", md5_compute(input.as_bytes()))
}

/// Append the signature to an endpoint URL
pub fn signed_url(url: &str, signature: &str) -> String {
    format!("{url}?sign={signature}")
}
