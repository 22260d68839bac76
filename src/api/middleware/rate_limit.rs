//! Per-client request throttling.
//!
//! Every client gets a bucket of [`BURST`] requests refilled at
//! [`REFILL_PER_SECOND`]. Excess requests are answered with
//! `429 Too Many Requests` before authentication runs, so a flood of badly
//! signed imports never reaches the nonce store.

use axum::body::Body;
use governor::clock::QuantaInstant;
use governor::middleware::NoOpMiddleware;
use std::sync::Arc;
use tower_governor::{
    GovernorLayer,
    governor::GovernorConfigBuilder,
    key_extractor::{KeyExtractor, PeerIpKeyExtractor, SmartIpKeyExtractor},
};

pub const REFILL_PER_SECOND: u64 = 5;
pub const BURST: u32 = 50;

type Limiter<K> = GovernorLayer<K, NoOpMiddleware<QuantaInstant>, Body>;

fn limiter<K: KeyExtractor>(key: K) -> Limiter<K> {
    let config = GovernorConfigBuilder::default()
        .per_second(REFILL_PER_SECOND)
        .burst_size(BURST)
        .key_extractor(key)
        .finish()
        .unwrap();

    GovernorLayer::new(Arc::new(config))
}

/// Keys on the socket peer address. The server must be started with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn layer() -> Limiter<PeerIpKeyExtractor> {
    limiter(PeerIpKeyExtractor)
}

/// Keys on the client IP from `X-Forwarded-For`, `X-Real-IP` or `Forwarded`,
/// falling back to the peer address. Only safe behind a trusted proxy.
pub fn proxied_layer() -> Limiter<SmartIpKeyExtractor> {
    limiter(SmartIpKeyExtractor)
}
