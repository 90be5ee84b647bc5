//! Concurrency properties of the auction state: the externally observable
//! effect of N concurrent calls must equal some serial order of them.

use auction_house::server::AuctionState;
use auction_house::Error;

mod common;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_bids_serialize_to_the_maximum() {
    common::init_tracing();

    let state = AuctionState::new();
    let product = state.add_product("Vase", 10.0, "alice").await;

    let mut handles = Vec::new();
    for i in 0..50u32 {
        let state = state.clone();
        let product_id = product.id.clone();
        let amount = 11.0 + f64::from(i);
        handles.push(tokio::spawn(async move {
            state
                .place_bid(&product_id, &format!("bidder-{i}"), amount)
                .await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    // The highest amount always finds current_price below it, so it is
    // accepted in every serial order; everything after it is rejected.
    let products = state.products().await;
    assert_eq!(products[0].current_price, 60.0);
    assert!(accepted >= 1);

    // The audit trail must be strictly increasing: no bid was evaluated
    // against a stale price.
    let bids = state.bids().await;
    assert_eq!(bids.len(), accepted);
    for window in bids.windows(2) {
        assert!(
            window[1].amount > window[0].amount,
            "accepted bids out of order: {} then {}",
            window[0].amount,
            window[1].amount
        );
    }
    assert_eq!(bids.last().unwrap().amount, 60.0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_registrations_have_a_single_winner() {
    common::init_tracing();

    let state = AuctionState::new();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let state = state.clone();
        handles.push(tokio::spawn(
            async move { state.register_user("mallory").await },
        ));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => successes += 1,
            Err(Error::NicknameTaken(_)) => {}
            Err(e) => panic!("unexpected rejection: {e}"),
        }
    }

    assert_eq!(successes, 1, "Exactly one registration may win");
    assert_eq!(state.user_count().await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_adds_yield_unique_ids() {
    common::init_tracing();

    let state = AuctionState::new();

    let mut handles = Vec::new();
    for i in 0..50 {
        let state = state.clone();
        handles.push(tokio::spawn(async move {
            state.add_product(&format!("Item {i}"), 1.0, "seller").await
        }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        ids.insert(handle.await.unwrap().id);
    }

    assert_eq!(ids.len(), 50);
    assert_eq!(state.product_count().await, 50);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn snapshot_is_never_torn_under_concurrent_bidding() {
    common::init_tracing();

    let state = AuctionState::new();
    let product = state.add_product("Vase", 10.0, "alice").await;

    let bidder_state = state.clone();
    let product_id = product.id.clone();
    let bidder = tokio::spawn(async move {
        for i in 0..100u32 {
            let _ = bidder_state
                .place_bid(&product_id, "bob", 11.0 + f64::from(i))
                .await;
        }
    });

    // Every snapshot observed while bids land must satisfy the product
    // invariant current_price >= initial_price.
    for _ in 0..50 {
        let products = state.products().await;
        for p in &products {
            assert!(p.current_price >= p.initial_price);
        }
        tokio::task::yield_now().await;
    }

    bidder.await.unwrap();
    assert_eq!(state.products().await[0].current_price, 110.0);
}
