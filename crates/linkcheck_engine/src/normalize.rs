use url::Url;

use crate::{CellValue, NormalizedUrl};

/// Trim the cell text and prepend `https://` when no http(s) scheme is present.
///
/// Returns `None` for missing or blank cells.
pub fn normalize(raw: &CellValue) -> Option<NormalizedUrl> {
    let text = raw.as_text()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let raw = if has_http_prefix(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    // The host is taken from the authority text as written: the parser would
    // rewrite numeric hosts such as `42` into dotted IPv4 form.
    let (scheme, host) = match Url::parse(&raw) {
        Ok(parsed) => (parsed.scheme().to_string(), authority_host(&raw).to_string()),
        Err(_) => (String::new(), String::new()),
    };

    Some(NormalizedUrl { scheme, host, raw })
}

/// A URL is usable when it has a scheme and a dotted host.
pub fn is_valid_url(url: &NormalizedUrl) -> bool {
    !url.scheme.is_empty() && !url.host.is_empty() && url.host.contains('.')
}

fn authority_host(raw: &str) -> &str {
    let rest = raw.split_once("://").map_or("", |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    match host_port.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => host,
        _ => host_port,
    }
}

fn has_http_prefix(text: &str) -> bool {
    ["http://", "https://"].iter().any(|prefix| {
        text.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
