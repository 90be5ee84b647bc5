use tonic::transport::Channel;
use tonic::{Request, Status};

use crate::proto::auction_client;
use crate::proto::{
    AddProductRequest, GetProductsRequest, PlaceBidRequest, ProductInfo, RegisterUserRequest,
};

/// Typed client for the auction service.
///
/// Wraps the generated stub so callers see the error taxonomy directly:
/// transport failures surface as `Err(Status)` and mean "unknown outcome",
/// while business rejections surface as `Ok(false)` and are safe to retry
/// with corrected input.
pub struct AuctionClient {
    inner: auction_client::AuctionClient<Channel>,
}

impl AuctionClient {
    /// Connects to the auction service at the given endpoint
    /// (e.g. `http://127.0.0.1:50051`).
    pub async fn connect(endpoint: String) -> Result<Self, tonic::transport::Error> {
        let inner = auction_client::AuctionClient::connect(endpoint).await?;
        Ok(Self { inner })
    }

    /// Registers a nickname. Returns `Ok(false)` if it is already taken.
    pub async fn register_user(&mut self, nickname: &str) -> Result<bool, Status> {
        let request = Request::new(RegisterUserRequest {
            nickname: nickname.to_string(),
        });

        let response = self.inner.register_user(request).await?;
        Ok(response.into_inner().success)
    }

    /// Lists a product for sale and returns its server-assigned ID.
    ///
    /// The seller is not required to be a registered user.
    pub async fn add_product(
        &mut self,
        name: &str,
        initial_price: f64,
        seller: &str,
    ) -> Result<String, Status> {
        let request = Request::new(AddProductRequest {
            name: name.to_string(),
            initial_price,
            seller: seller.to_string(),
        });

        let response = self.inner.add_product(request).await?;
        Ok(response.into_inner().product_id)
    }

    /// Fetches a snapshot of all products with their current prices.
    pub async fn get_products(&mut self) -> Result<Vec<ProductInfo>, Status> {
        let request = Request::new(GetProductsRequest {});

        let response = self.inner.get_products(request).await?;
        Ok(response.into_inner().products)
    }

    /// Places a bid. Returns `Ok(false)` when the product does not exist or
    /// the amount does not strictly exceed the current price.
    pub async fn place_bid(
        &mut self,
        product_id: &str,
        bidder: &str,
        amount: f64,
    ) -> Result<bool, Status> {
        let request = Request::new(PlaceBidRequest {
            product_id: product_id.to_string(),
            bidder: bidder.to_string(),
            amount,
        });

        let response = self.inner.place_bid(request).await?;
        Ok(response.into_inner().success)
    }
}
