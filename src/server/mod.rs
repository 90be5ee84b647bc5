/// Server-side state management.
pub mod state;

/// gRPC service implementation.
pub mod service;

/// Server configuration and rate limiting.
pub mod config;

pub use config::{RateLimiter, ServerConfig};
pub use service::AuctionServiceImpl;
pub use state::{AuctionState, Bid, Product, UserRecord};
