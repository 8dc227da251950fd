//! CORS layer configuration.
//!
//! An origin is accepted when it appears verbatim in `extra_origins`, or
//! when its host is one of `allowed_hosts` and its port is the server's
//! own port.

use std::time::Duration;

use axum::http::{HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

use docshift_core::config::app::ServerConfig;

/// Builds a CORS tower layer from the server section.
pub fn build_cors_layer(server: &ServerConfig) -> CorsLayer {
    let hosts = server.cors.allowed_hosts.clone();
    let extra = server.cors.extra_origins.clone();
    let port = server.port;

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
            origin
                .to_str()
                .map(|o| origin_allowed(o, &hosts, port, &extra))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(server.cors.max_age_seconds))
}

/// Whether `origin` (`scheme://host[:port]`) may call the gateway.
pub fn origin_allowed(origin: &str, hosts: &[String], port: u16, extra: &[String]) -> bool {
    if extra.iter().any(|e| e == origin) {
        return true;
    }

    let Some((scheme, authority)) = origin.split_once("://") else {
        return false;
    };
    let (host, origin_port) = match authority.rsplit_once(':') {
        Some((host, p)) => match p.parse::<u16>() {
            Ok(p) => (host, p),
            Err(_) => return false,
        },
        None => match scheme {
            "http" => (authority, 80),
            "https" => (authority, 443),
            _ => return false,
        },
    };

    origin_port == port && hosts.iter().any(|h| h.eq_ignore_ascii_case(host))
}
