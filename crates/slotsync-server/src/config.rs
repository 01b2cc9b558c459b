//! Server configuration.

use std::net::SocketAddr;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener on.
    pub bind_addr: SocketAddr,

    /// Bounded parallelism for per-member calendar fetches.
    pub member_concurrency: usize,

    /// Upper bound on the number of free slots returned to the caller.
    pub max_free_slots: usize,

    /// Default query window for single-user availability, in days.
    pub user_window_days: i64,

    /// Default query window for group availability, in days.
    pub group_window_days: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".parse().expect("valid default bind addr"),
            member_concurrency: 4,
            max_free_slots: 10,
            user_window_days: 7,
            group_window_days: 3,
        }
    }
}

impl ServerConfig {
    /// Creates a configuration with the given bind address.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Builder: set the per-member fetch concurrency.
    pub fn with_member_concurrency(mut self, concurrency: usize) -> Self {
        self.member_concurrency = concurrency.max(1);
        self
    }

    /// Builder: set the free-slot cap.
    pub fn with_max_free_slots(mut self, max: usize) -> Self {
        self.max_free_slots = max;
        self
    }
}
