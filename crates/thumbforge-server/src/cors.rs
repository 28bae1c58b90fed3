use std::str::FromStr;

use http::Method;
use http::header::{HeaderName, HeaderValue};
use thumbforge_config::{AnyOrList, CorsConfig};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

/// Build the CORS layer for browser callers of the thumbnail route
///
/// Credentialed responses may not carry wildcards, so with `credentials`
/// enabled each `"*"` is answered by mirroring the preflight request.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let mirror = config.credentials;

    let layer = CorsLayer::new()
        .allow_origin(allow_origin(&config.origins, mirror))
        .allow_methods(allow_methods(&config.methods, mirror))
        .allow_headers(allow_headers(&config.headers, mirror))
        .allow_credentials(config.credentials);

    match config.max_age_duration() {
        Some(duration) => layer.max_age(duration),
        None => layer,
    }
}

fn allow_origin(origins: &AnyOrList, mirror: bool) -> AllowOrigin {
    match origins {
        AnyOrList::Any if mirror => AllowOrigin::mirror_request(),
        AnyOrList::Any => AllowOrigin::any(),
        AnyOrList::List(origins) => AllowOrigin::list(parse_entries::<HeaderValue>(origins, "origin")),
    }
}

fn allow_methods(methods: &AnyOrList, mirror: bool) -> AllowMethods {
    match methods {
        AnyOrList::Any if mirror => AllowMethods::mirror_request(),
        AnyOrList::Any => AllowMethods::any(),
        AnyOrList::List(methods) => AllowMethods::list(parse_entries::<Method>(methods, "method")),
    }
}

fn allow_headers(headers: &AnyOrList, mirror: bool) -> AllowHeaders {
    match headers {
        AnyOrList::Any if mirror => AllowHeaders::mirror_request(),
        AnyOrList::Any => AllowHeaders::any(),
        AnyOrList::List(headers) => AllowHeaders::list(parse_entries::<HeaderName>(headers, "header")),
    }
}

/// Parse configured entries, skipping the ones that are not valid HTTP tokens
fn parse_entries<T: FromStr>(values: &[String], kind: &'static str) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| {
            let parsed = value.parse().ok();
            if parsed.is_none() {
                tracing::warn!(kind, value = %value, "ignoring invalid CORS entry");
            }
            parsed
        })
        .collect()
}
