//! Health check endpoint
//!
//! `GET /health` on the socket transport reports liveness, independent of
//! the JSON-RPC envelope.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
    std::time::Instant,
    warp::{Filter, Rejection, Reply},
};

/// Health check response structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Always "healthy" if responding
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

/// Health check provider
#[derive(Debug, Clone)]
pub struct HealthChecker {
    start_time: Instant,
    version: String,
}

impl HealthChecker {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            start_time: Instant::now(),
            version: version.into(),
        }
    }

    /// Get current health status
    pub fn get_status(&self) -> HealthStatus {
        HealthStatus {
            status: "healthy".to_string(),
            version: self.version.clone(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            timestamp: Utc::now(),
        }
    }

    /// The `GET /health` route.
    pub fn route(self) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
        warp::path!("health")
            .and(warp::get())
            .map(move || warp::reply::json(&self.get_status()))
    }
}

impl Default for HealthChecker {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_VERSION"))
    }
}
