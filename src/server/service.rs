use std::time::Instant;

use metrics::{counter, histogram};
use tonic::{Request, Response, Status};
use tracing::{debug, info, warn};

use super::config::RateLimiter;
use super::state::AuctionState;
use crate::proto::auction_server::Auction;
use crate::proto::{
    AddProductRequest, AddProductResponse, GetProductsRequest, GetProductsResponse,
    PlaceBidRequest, PlaceBidResponse, ProductInfo, RegisterUserRequest, RegisterUserResponse,
};

/// gRPC service implementation for the auction marketplace.
///
/// Business rejections (duplicate nickname, too-low bid, unknown product)
/// are reported through the `success` fields of the responses and are
/// never gRPC errors; only infrastructure concerns (rate limiting) produce
/// a [`Status`]. Every mutation attempt is logged with its outcome.
pub struct AuctionServiceImpl {
    state: AuctionState,
    rate_limiter: RateLimiter,
}

impl AuctionServiceImpl {
    /// Creates a new auction service with the given state and rate limiter.
    pub fn new(state: AuctionState, rate_limiter: RateLimiter) -> Self {
        Self {
            state,
            rate_limiter,
        }
    }
}

#[tonic::async_trait]
impl Auction for AuctionServiceImpl {
    async fn register_user(
        &self,
        request: Request<RegisterUserRequest>,
    ) -> Result<Response<RegisterUserResponse>, Status> {
        let start = Instant::now();
        counter!("auction.register_user.requests").increment(1);

        self.rate_limiter.check_rate_limit().await?;

        let req = request.into_inner();

        // Uniqueness is the only server-side rule; nickname shape is a
        // caller concern.
        let success = match self.state.register_user(&req.nickname).await {
            Ok(()) => {
                info!(nickname = %req.nickname, "user registered");
                counter!("auction.register_user.accepted").increment(1);
                true
            }
            Err(e) => {
                warn!(nickname = %req.nickname, "registration rejected: {e}");
                counter!("auction.register_user.rejected").increment(1);
                false
            }
        };

        histogram!("auction.register_user.duration").record(start.elapsed().as_secs_f64());

        Ok(Response::new(RegisterUserResponse { success }))
    }

    async fn add_product(
        &self,
        request: Request<AddProductRequest>,
    ) -> Result<Response<AddProductResponse>, Status> {
        let start = Instant::now();
        counter!("auction.add_product.requests").increment(1);

        self.rate_limiter.check_rate_limit().await?;

        let req = request.into_inner();

        let product = self
            .state
            .add_product(&req.name, req.initial_price, &req.seller)
            .await;

        info!(
            seller = %product.seller,
            name = %product.name,
            id = %product.id,
            initial_price = product.initial_price,
            "product added",
        );
        counter!("auction.add_product.accepted").increment(1);
        histogram!("auction.add_product.duration").record(start.elapsed().as_secs_f64());

        // `success` is unconditionally true today; the field exists for API
        // symmetry and future rejection rules.
        Ok(Response::new(AddProductResponse {
            success: true,
            product_id: product.id,
        }))
    }

    async fn get_products(
        &self,
        _request: Request<GetProductsRequest>,
    ) -> Result<Response<GetProductsResponse>, Status> {
        let start = Instant::now();
        counter!("auction.get_products.requests").increment(1);

        self.rate_limiter.check_rate_limit().await?;

        let products: Vec<ProductInfo> = self
            .state
            .products()
            .await
            .into_iter()
            .map(|p| ProductInfo {
                id: p.id,
                name: p.name,
                initial_price: p.initial_price,
                current_price: p.current_price,
                seller: p.seller,
            })
            .collect();

        debug!(count = products.len(), "product listing requested");
        histogram!("auction.get_products.duration").record(start.elapsed().as_secs_f64());

        Ok(Response::new(GetProductsResponse { products }))
    }

    async fn place_bid(
        &self,
        request: Request<PlaceBidRequest>,
    ) -> Result<Response<PlaceBidResponse>, Status> {
        let start = Instant::now();
        counter!("auction.place_bid.requests").increment(1);

        self.rate_limiter.check_rate_limit().await?;

        let req = request.into_inner();

        // Unknown product and too-low amount are deliberately
        // indistinguishable on the wire: both are `success = false`.
        let success = match self
            .state
            .place_bid(&req.product_id, &req.bidder, req.amount)
            .await
        {
            Ok(new_price) => {
                info!(
                    bidder = %req.bidder,
                    product_id = %req.product_id,
                    new_price,
                    "bid accepted",
                );
                counter!("auction.place_bid.accepted").increment(1);
                true
            }
            Err(e) => {
                warn!(
                    bidder = %req.bidder,
                    product_id = %req.product_id,
                    amount = req.amount,
                    "bid rejected: {e}",
                );
                counter!("auction.place_bid.rejected").increment(1);
                false
            }
        };

        histogram!("auction.place_bid.duration").record(start.elapsed().as_secs_f64());

        Ok(Response::new(PlaceBidResponse { success }))
    }
}
