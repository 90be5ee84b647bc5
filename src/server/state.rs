use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::RwLock;

use crate::{Error, Result};

/// Registered user data.
#[derive(Clone, Debug)]
pub struct UserRecord {
    /// Unique nickname, also used as the display name.
    pub nickname: String,
    /// Unix timestamp of registration.
    pub registered_at: u64,
}

/// An auctionable item.
#[derive(Clone, Debug)]
pub struct Product {
    /// Opaque unique identifier assigned by the server at creation time.
    pub id: String,
    /// Free-form product name.
    pub name: String,
    /// Starting price, fixed at creation.
    pub initial_price: f64,
    /// Highest accepted bid so far; equals `initial_price` until the first
    /// accepted bid and never decreases afterwards.
    pub current_price: f64,
    /// Seller nickname. Not required to reference a registered user.
    pub seller: String,
}

/// An accepted price proposal, appended to the audit trail.
#[derive(Clone, Debug)]
pub struct Bid {
    /// Bidder nickname. Not required to reference a registered user.
    pub bidder: String,
    /// The product this bid was accepted for.
    pub product_id: String,
    /// The accepted amount, which became the product's current price.
    pub amount: f64,
}

/// Everything the marketplace owns, guarded together.
///
/// The users map, the products map, the bid history, and the ID sequence
/// form a single unit of mutual exclusion: `PlaceBid` must compare and
/// update the price and append to the history without any other operation
/// observing an intermediate state.
struct Store {
    users: HashMap<String, UserRecord>,
    products: HashMap<String, Product>,
    bids: Vec<Bid>,
    next_product_seq: u64,
}

/// In-memory auction state exposing the four marketplace operations.
///
/// Each operation acquires the lock once, performs its full
/// read-modify-write, and releases it; nothing is awaited while the lock
/// is held, so critical sections are short-lived and the externally
/// observable effect of concurrent calls is some serial order of them.
///
/// Cloning yields another handle to the same state.
pub struct AuctionState {
    store: Arc<RwLock<Store>>,
}

impl AuctionState {
    /// Creates empty auction state.
    pub fn new() -> Self {
        Self {
            store: Arc::new(RwLock::new(Store {
                users: HashMap::new(),
                products: HashMap::new(),
                bids: Vec::new(),
                next_product_seq: 0,
            })),
        }
    }

    /// Registers a nickname.
    ///
    /// Returns an error if the nickname is already taken; the user set is
    /// left unchanged in that case. Registered users are never removed.
    pub async fn register_user(&self, nickname: &str) -> Result<()> {
        let mut store = self.store.write().await;

        if store.users.contains_key(nickname) {
            return Err(Error::NicknameTaken(nickname.to_string()));
        }

        store.users.insert(
            nickname.to_string(),
            UserRecord {
                nickname: nickname.to_string(),
                registered_at: unix_now(),
            },
        );
        Ok(())
    }

    /// Stores a new product and returns it.
    ///
    /// Always succeeds. The product starts with `current_price` equal to
    /// `initial_price`; the seller string is taken as-is.
    pub async fn add_product(&self, name: &str, initial_price: f64, seller: &str) -> Product {
        let mut store = self.store.write().await;

        store.next_product_seq += 1;
        let id = format!("PROD-{:06}", store.next_product_seq);

        let product = Product {
            id: id.clone(),
            name: name.to_string(),
            initial_price,
            current_price: initial_price,
            seller: seller.to_string(),
        };

        store.products.insert(id, product.clone());
        product
    }

    /// Returns a complete snapshot of all products.
    ///
    /// Taken under the read lock, so no product is ever observed with a
    /// torn `current_price`. Iteration order carries no meaning.
    pub async fn products(&self) -> Vec<Product> {
        let store = self.store.read().await;
        store.products.values().cloned().collect()
    }

    /// Evaluates and, if accepted, applies a bid.
    ///
    /// The comparison against `current_price` and the update happen inside
    /// one critical section: two bids can never both be accepted against
    /// the same stale price. Returns the new current price on acceptance.
    /// An unknown product and a too-low amount are both rejections with no
    /// state change.
    pub async fn place_bid(&self, product_id: &str, bidder: &str, amount: f64) -> Result<f64> {
        let mut guard = self.store.write().await;
        let store = &mut *guard;

        let product = store
            .products
            .get_mut(product_id)
            .ok_or_else(|| Error::UnknownProduct(product_id.to_string()))?;

        if amount <= product.current_price {
            return Err(Error::BidTooLow {
                amount,
                current_price: product.current_price,
            });
        }

        product.current_price = amount;

        store.bids.push(Bid {
            bidder: bidder.to_string(),
            product_id: product_id.to_string(),
            amount,
        });

        Ok(amount)
    }

    /// Returns a snapshot of the accepted-bid audit trail, in acceptance
    /// order.
    pub async fn bids(&self) -> Vec<Bid> {
        let store = self.store.read().await;
        store.bids.clone()
    }

    /// Number of registered users.
    pub async fn user_count(&self) -> usize {
        self.store.read().await.users.len()
    }

    /// Number of listed products.
    pub async fn product_count(&self) -> usize {
        self.store.read().await.products.len()
    }

    /// Number of accepted bids.
    pub async fn bid_count(&self) -> usize {
        self.store.read().await.bids.len()
    }
}

impl Default for AuctionState {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for AuctionState {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| unreachable!("System time is after UNIX_EPOCH"))
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn duplicate_nickname_rejected() {
        let state = AuctionState::new();

        state.register_user("alice").await.unwrap();
        let err = state.register_user("alice").await.unwrap_err();

        assert!(matches!(err, Error::NicknameTaken(_)));
        assert_eq!(state.user_count().await, 1);
    }

    #[tokio::test]
    async fn new_product_starts_at_initial_price() {
        let state = AuctionState::new();

        let product = state.add_product("Vase", 10.0, "alice").await;

        assert_eq!(product.current_price, 10.0);
        assert_eq!(product.initial_price, 10.0);

        let listing = state.products().await;
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, product.id);
        assert_eq!(listing[0].current_price, 10.0);
    }

    #[tokio::test]
    async fn product_ids_are_unique() {
        let state = AuctionState::new();

        let mut ids = std::collections::HashSet::new();
        for i in 0..100 {
            let product = state.add_product(&format!("Item {i}"), 1.0, "seller").await;
            ids.insert(product.id);
        }

        assert_eq!(ids.len(), 100);
    }

    #[tokio::test]
    async fn accepted_bid_updates_price_and_history() {
        let state = AuctionState::new();
        let product = state.add_product("Vase", 10.0, "alice").await;

        let new_price = state.place_bid(&product.id, "bob", 15.0).await.unwrap();
        assert_eq!(new_price, 15.0);

        let listing = state.products().await;
        assert_eq!(listing[0].current_price, 15.0);

        let bids = state.bids().await;
        assert_eq!(bids.len(), 1);
        assert_eq!(bids[0].bidder, "bob");
        assert_eq!(bids[0].product_id, product.id);
        assert_eq!(bids[0].amount, 15.0);
    }

    #[tokio::test]
    async fn bid_below_initial_price_rejected() {
        let state = AuctionState::new();
        let product = state.add_product("Vase", 10.0, "alice").await;

        let err = state.place_bid(&product.id, "bob", 5.0).await.unwrap_err();

        assert!(matches!(err, Error::BidTooLow { .. }));
        assert_eq!(state.products().await[0].current_price, 10.0);
        assert_eq!(state.bid_count().await, 0);
    }

    #[tokio::test]
    async fn bid_equal_to_current_price_rejected() {
        let state = AuctionState::new();
        let product = state.add_product("Vase", 10.0, "alice").await;

        state.place_bid(&product.id, "bob", 15.0).await.unwrap();
        let err = state
            .place_bid(&product.id, "carol", 15.0)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::BidTooLow { .. }));
        assert_eq!(state.products().await[0].current_price, 15.0);
        assert_eq!(state.bid_count().await, 1);
    }

    #[tokio::test]
    async fn bid_on_unknown_product_rejected() {
        let state = AuctionState::new();
        state.add_product("Vase", 10.0, "alice").await;

        let err = state
            .place_bid("unknown-id", "bob", 100.0)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::UnknownProduct(_)));
        assert_eq!(state.bid_count().await, 0);
        assert_eq!(state.products().await[0].current_price, 10.0);
    }

    #[tokio::test]
    async fn price_is_monotonic_across_bid_sequence() {
        let state = AuctionState::new();
        let product = state.add_product("Vase", 10.0, "alice").await;

        let attempts = [12.0, 11.0, 20.0, 20.0, 25.0, 3.0];
        for amount in attempts {
            let _ = state.place_bid(&product.id, "bob", amount).await;
        }

        // Accepted: 12, 20, 25. Rejections leave the price untouched.
        assert_eq!(state.products().await[0].current_price, 25.0);

        let bids = state.bids().await;
        let amounts: Vec<f64> = bids.iter().map(|b| b.amount).collect();
        assert_eq!(amounts, vec![12.0, 20.0, 25.0]);
    }

    #[tokio::test]
    async fn empty_nickname_only_subject_to_uniqueness() {
        let state = AuctionState::new();

        assert!(state.register_user("").await.is_ok());
        assert!(state.register_user("").await.is_err());
    }
}
