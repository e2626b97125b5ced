//! Inspecting HTTP requests that arrive through proxies.

use http::HeaderMap;

/// Strip the port from a socket address: `"[::1]:58292"` becomes `"[::1]"`.
pub fn ip_from_remote_addr(addr: &str) -> &str {
    match addr.rfind(':') {
        Some(idx) => &addr[..idx],
        None => addr,
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Address of the client, taking proxies into account.
///
/// `X-Forwarded-For` wins (its first element), then `X-Real-Ip`, then the
/// socket address with its port removed.
pub fn remote_address(headers: &HeaderMap, remote_addr: &str) -> String {
    if let Some(forwarded) = header(headers, "x-forwarded-for") {
        if let Some(first) = forwarded.split(',').map(str::trim).next() {
            return first.to_string();
        }
    }
    if let Some(real_ip) = header(headers, "x-real-ip") {
        return real_ip.to_string();
    }
    ip_from_remote_addr(remote_addr).to_string()
}

/// `"http"` or `"https"`, honoring `X-Forwarded-Proto` set by proxies.
pub fn request_protocol(headers: &HeaderMap, is_tls: bool) -> &'static str {
    let forwarded = header(headers, "x-forwarded-proto").map(|p| p.to_ascii_lowercase());
    match forwarded.as_deref() {
        Some("https") => "https",
        Some("http") => "http",
        _ if is_tls => "https",
        _ => "http",
    }
}

/// Protocol and host of the request, e.g. `"https://example.com"`.
pub fn full_host(headers: &HeaderMap, is_tls: bool) -> String {
    let host = header(headers, "host").unwrap_or_default();
    format!("{}://{host}", request_protocol(headers, is_tls))
}
