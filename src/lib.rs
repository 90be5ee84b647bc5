//! In-memory live-auction backend.
//!
//! Clients register a nickname, list products for sale, and place bids that
//! must strictly exceed a product's current price. All marketplace state
//! lives in [`server::AuctionState`] behind a single lock and is exposed
//! through four gRPC operations; [`client::AuctionClient`] is a typed
//! wrapper over the generated stub for callers.

/// Typed client wrapper over the generated gRPC stub.
pub mod client;

/// Business-rejection error taxonomy.
pub mod error;

/// Server-side state, service implementation, and configuration.
pub mod server;

/// Generated protobuf/gRPC types for the auction wire contract.
pub mod proto {
    tonic::include_proto!("auction");
}

pub use client::AuctionClient;
pub use error::{Error, Result};
pub use server::{AuctionServiceImpl, AuctionState, Bid, Product, RateLimiter, ServerConfig};
