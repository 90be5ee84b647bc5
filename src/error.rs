//! Error types for the auction service

/// Business-rule rejections raised by the auction state.
///
/// These never cross the wire as gRPC errors: the service layer converts
/// them to `success = false` responses. Transport failures are reported
/// separately via [`tonic::Status`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The nickname is already registered.
    #[error("nickname '{0}' is already registered")]
    NicknameTaken(String),

    /// The bid referenced a product ID that does not exist.
    #[error("product '{0}' does not exist")]
    UnknownProduct(String),

    /// The bid amount does not strictly exceed the current price.
    #[error("bid of {amount} does not exceed current price {current_price}")]
    BidTooLow {
        /// The rejected bid amount.
        amount: f64,
        /// The product's current price at evaluation time.
        current_price: f64,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
