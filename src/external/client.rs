use std::sync::LazyLock;
use std::time::Duration;

/// Global HTTP client instance
///
/// Initialized lazily on first access and reused across the application,
/// so outbound requests share connection pooling and DNS caching. Used by
/// the carrier push transport; per-request timeouts are layered on top by
/// the callers.
pub static HTTP_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        // Timeouts
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        // Connection pooling
        .pool_max_idle_per_host(10)
        .pool_idle_timeout(Duration::from_secs(90))
        // Enable compression
        .gzip(true)
        .deflate(true)
        // Security
        .use_rustls_tls()
        .build()
        .expect("Failed to build HTTP client")
});
