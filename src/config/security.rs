use axum::http::{HeaderName, HeaderValue};
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;

/// Header name/value pairs sent with every response.
const SECURITY_HEADERS: [(&str, &str); 6] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    (
        "content-security-policy",
        "default-src 'none'; frame-ancestors 'none'",
    ),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    (
        "permissions-policy",
        "geolocation=(), microphone=(), camera=()",
    ),
];

const STRICT_TRANSPORT_SECURITY: &str = "strict-transport-security";
const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

/// Headers for the current environment; HSTS is only sent in production
/// where the API is served over HTTPS.
pub fn security_headers(include_hsts: bool) -> Vec<(HeaderName, HeaderValue)> {
    let mut headers: Vec<(HeaderName, HeaderValue)> = SECURITY_HEADERS
        .into_iter()
        .map(|(name, value)| {
            (
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            )
        })
        .collect();

    if include_hsts {
        headers.push((
            HeaderName::from_static(STRICT_TRANSPORT_SECURITY),
            HeaderValue::from_static(HSTS_VALUE),
        ));
    }
    headers
}

pub fn create_security_headers_layers<S>(router: Router<S>, include_hsts: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    if include_hsts {
        tracing::info!("Security: HSTS header enabled (production mode)");
    } else {
        tracing::info!("Security: HSTS header disabled (development mode)");
    }

    security_headers(include_hsts)
        .into_iter()
        .fold(router, |router, (name, value)| {
            router.layer(SetResponseHeaderLayer::overriding(name, value))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hsts_only_in_production() {
        let dev = security_headers(false);
        assert_eq!(dev.len(), 6);
        assert!(dev.iter().all(|(n, _)| n != STRICT_TRANSPORT_SECURITY));

        let prod = security_headers(true);
        assert_eq!(prod.len(), 7);
        assert!(prod
            .iter()
            .any(|(n, v)| n == STRICT_TRANSPORT_SECURITY && v == HSTS_VALUE));
    }
}
