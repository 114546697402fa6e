use once_cell::sync::Lazy;
use reqwest::Client;
use std::time::Duration;

/// Global shared HTTP client singleton.
///
/// Reuses a single connection pool across all upstream requests.
/// `Client::clone()` is just an `Arc` increment — virtually free.
///
/// No total-request timeout is set: completion responses are streamed and may
/// legitimately stay open for a long time. No per-request timeout exists on
/// the completion call either (known gap — the upstream call's duration is
/// provider-bound).
static SHARED_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .pool_max_idle_per_host(5)
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .expect("Failed to create shared HTTP client")
});

/// Returns a reference to the global shared HTTP client.
pub fn shared_client() -> &'static Client {
    &SHARED_CLIENT
}
