//! Rate limiting middleware using governor and `tower_governor`.
//!
//! Only the authentication endpoints are limited (`auth_rate_limiter`), to
//! slow down password guessing. Limits come from [`RateLimitConfig`].

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::extract::ConnectInfo;
use axum::http::{HeaderMap, Request};
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use tower_governor::{GovernorError, GovernorLayer, governor::GovernorConfigBuilder};

use crate::config::RateLimitConfig;

/// Key extractor that keys on the client IP.
///
/// By default this is the `ConnectInfo` socket address recorded by the
/// server. With `trust_proxy_headers` set, `X-Forwarded-For` (first hop) and
/// then `X-Real-IP` are checked first.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClientIpKeyExtractor {
    trust_proxy_headers: bool,
}

impl ClientIpKeyExtractor {
    #[must_use]
    pub const fn new(trust_proxy_headers: bool) -> Self {
        Self {
            trust_proxy_headers,
        }
    }
}

fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    let first_hop = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok());

    first_hop.or_else(|| {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
    })
}

impl tower_governor::key_extractor::KeyExtractor for ClientIpKeyExtractor {
    type Key = IpAddr;

    fn extract<T>(&self, req: &Request<T>) -> Result<Self::Key, GovernorError> {
        if self.trust_proxy_headers
            && let Some(ip) = forwarded_ip(req.headers())
        {
            return Ok(ip);
        }

        req.extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip())
            .ok_or(GovernorError::UnableToExtractKey)
    }
}

/// Rate limiter layer type for Axum.
pub type RateLimiterLayer =
    GovernorLayer<ClientIpKeyExtractor, NoOpMiddleware<QuantaInstant>, axum::body::Body>;

/// Create the rate limiter for auth endpoints.
///
/// Defaults to a burst of 5 with one request regained every 6 seconds
/// (~10 requests per minute per client).
///
/// # Panics
///
/// Does not panic for a loaded [`RateLimitConfig`]: `ServerConfig::from_env`
/// rejects a zero burst or period, the only values `GovernorConfigBuilder`
/// refuses.
#[must_use]
pub fn auth_rate_limiter(config: &RateLimitConfig) -> RateLimiterLayer {
    let governor = GovernorConfigBuilder::default()
        .key_extractor(ClientIpKeyExtractor::new(config.trust_proxy_headers))
        .per_second(config.auth_period_secs)
        .burst_size(config.auth_burst)
        .finish()
        .expect("rate limiter config has a non-zero burst and period");
    GovernorLayer::new(Arc::new(governor))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_governor::key_extractor::KeyExtractor;

    use super::*;

    fn request_from_peer(peer: &str, forwarded_for: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().header("x-real-ip", "198.51.100.2");
        if let Some(value) = forwarded_for {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut req = builder.body(()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(peer.parse::<SocketAddr>().unwrap()));
        req
    }

    #[test]
    fn test_proxy_headers_ignored_by_default() {
        let extractor = ClientIpKeyExtractor::default();

        let plain = request_from_peer("192.0.2.44:51000", None);
        let spoofed = request_from_peer("192.0.2.44:51001", Some("203.0.113.9"));

        let expected = "192.0.2.44".parse::<IpAddr>().unwrap();
        assert_eq!(extractor.extract(&plain).unwrap(), expected);
        assert_eq!(extractor.extract(&spoofed).unwrap(), expected);
    }

    #[test]
    fn test_trusted_forwarded_for_first_hop_wins() {
        let req = request_from_peer("10.0.0.1:443", Some("203.0.113.9, 10.0.0.1"));

        let ip = ClientIpKeyExtractor::new(true).extract(&req).unwrap();
        assert_eq!(ip, "203.0.113.9".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_trusted_real_ip_when_no_forwarded_for() {
        let req = request_from_peer("10.0.0.1:443", None);

        let ip = ClientIpKeyExtractor::new(true).extract(&req).unwrap();
        assert_eq!(ip, "198.51.100.2".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_trusted_unparseable_headers_fall_back_to_peer() {
        let mut req = Request::builder()
            .header("x-forwarded-for", "unknown")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("192.0.2.7:9000".parse::<SocketAddr>().unwrap()));

        let ip = ClientIpKeyExtractor::new(true).extract(&req).unwrap();
        assert_eq!(ip, "192.0.2.7".parse::<IpAddr>().unwrap());
    }

    #[test]
    fn test_no_peer_address_is_an_error() {
        let req = Request::builder()
            .header("x-forwarded-for", "203.0.113.9")
            .body(())
            .unwrap();
        assert!(ClientIpKeyExtractor::default().extract(&req).is_err());
    }
}
