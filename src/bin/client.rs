use auction_house::AuctionClient;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "client")]
#[command(about = "Live-auction command-line client", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:50051")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a nickname
    Register {
        #[arg(short, long)]
        nickname: String,
    },

    /// List a product for sale
    AddProduct {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        price: f64,

        #[arg(short, long)]
        seller: String,
    },

    /// Show all products with their current prices
    List,

    /// Place a bid on a product
    Bid {
        #[arg(short, long)]
        product_id: String,

        #[arg(short, long)]
        bidder: String,

        #[arg(short, long)]
        amount: f64,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut client = AuctionClient::connect(cli.server.clone()).await?;

    match cli.command {
        Commands::Register { nickname } => {
            println!("Registering nickname '{nickname}'...");

            if client.register_user(&nickname).await? {
                println!("Registered '{nickname}'");
            } else {
                eprintln!("Nickname '{nickname}' is already taken");
                std::process::exit(1);
            }
        }

        Commands::AddProduct {
            name,
            price,
            seller,
        } => {
            println!("Listing '{name}' at {price} for seller '{seller}'...");

            let product_id = client.add_product(&name, price, &seller).await?;
            println!("Product listed with ID {product_id}");
        }

        Commands::List => {
            let products = client.get_products().await?;

            if products.is_empty() {
                println!("No products listed");
                return Ok(());
            }

            println!("{} product(s):", products.len());
            for product in products {
                println!(
                    "  {} - {} (seller: {}, current: {}, initial: {})",
                    product.id,
                    product.name,
                    product.seller,
                    product.current_price,
                    product.initial_price,
                );
            }
        }

        Commands::Bid {
            product_id,
            bidder,
            amount,
        } => {
            println!("Bidding {amount} on {product_id} as '{bidder}'...");

            if client.place_bid(&product_id, &bidder, amount).await? {
                println!("Bid accepted; current price is now {amount}");
            } else {
                eprintln!("Bid rejected: the product does not exist or the amount does not exceed the current price");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
