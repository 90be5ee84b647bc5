use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;

use auction_house::proto::auction_server::AuctionServer;
use auction_house::server::{AuctionServiceImpl, AuctionState, RateLimiter, ServerConfig};
use clap::Parser;
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::Mutex;
use tonic::transport::Server;
use tonic_health::server::{health_reporter, HealthReporter};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Live-auction state server", long_about = None)]
#[command(version)]
struct Args {
    /// Host to bind to
    #[arg(short = 'H', long, env = "SERVER_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Enable metrics endpoint
    #[arg(long, env = "METRICS_ENABLED")]
    metrics: bool,

    /// Metrics port
    #[arg(long, env = "METRICS_PORT")]
    metrics_port: Option<u16>,

    /// Rate limit requests per minute
    #[arg(long, env = "RATE_LIMIT_RPM")]
    rate_limit: Option<u64>,

    /// Rate limit burst
    #[arg(long, env = "RATE_LIMIT_BURST")]
    rate_burst: Option<u64>,
}

impl Args {
    /// CLI arguments override whatever the layered config resolved to.
    fn apply(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.metrics {
            config.metrics.enabled = true;
        }
        if let Some(port) = self.metrics_port {
            config.metrics.port = port;
        }
        if let Some(rate) = self.rate_limit {
            config.rate_limit.requests_per_minute = rate;
        }
        if let Some(burst) = self.rate_burst {
            config.rate_limit.burst = burst;
        }
    }
}

enum Command {
    Status,
    Users,
    Products,
    Bids,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(input: &str) -> Self {
        let input = input.trim();

        if input.is_empty() {
            return Command::Unknown(String::new());
        }

        if !input.starts_with('/') {
            return Command::Unknown(
                "Commands must start with '/'. Type /help for available commands.".to_string(),
            );
        }

        let cmd = input.split_whitespace().next().unwrap_or("").to_lowercase();

        match cmd.as_str() {
            "/status" | "/st" => Command::Status,
            "/users" | "/u" => Command::Users,
            "/products" | "/p" => Command::Products,
            "/bids" | "/b" => Command::Bids,
            "/help" | "/h" | "/?" => Command::Help,
            "/quit" | "/exit" | "/q" => Command::Quit,
            _ => Command::Unknown(format!(
                "Unknown command: {cmd}. Type /help for available commands."
            )),
        }
    }
}

fn print_colored(color: Color, text: &str) {
    let mut stdout = io::stdout();
    execute!(stdout, SetForegroundColor(color), Print(text), ResetColor).ok();
    stdout.flush().ok();
}

fn println_colored(color: Color, text: &str) {
    print_colored(color, text);
    println!();
}

fn display_banner() {
    println!();
    println_colored(
        Color::Cyan,
        "+---------------------------------------------------------+",
    );
    println_colored(
        Color::Cyan,
        "|                  Live Auction Server                    |",
    );
    println_colored(
        Color::Cyan,
        "+---------------------------------------------------------+",
    );
    println!();
}

fn display_help() {
    println!();
    println_colored(Color::Yellow, "Available Commands:");
    println!();
    println!("  /status              - Show server status and configuration");
    println!("  /users               - Show registered user count");
    println!("  /products            - List products with current prices");
    println!("  /bids                - Show accepted bid count");
    println!("  /help                - Show this help message");
    println!("  /quit or /exit       - Initiate graceful shutdown");
    println!();
}

fn display_prompt(addr: &str) {
    print_colored(Color::Green, &format!("auction-server@{addr}"));
    print_colored(Color::White, "> ");
    io::stdout().flush().ok();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    display_banner();

    let mut config = ServerConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        ServerConfig::default()
    });
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        println_colored(Color::Red, &format!("Configuration validation failed: {e}"));
        return Err(format!("Invalid configuration: {e}").into());
    }

    let state = AuctionState::new();
    let rate_limiter = RateLimiter::from_config(&config.rate_limit);
    let service = AuctionServiceImpl::new(state.clone(), rate_limiter);

    if config.metrics.enabled {
        let metrics_addr = config.metrics.addr();
        tokio::spawn(async move {
            if let Err(e) = metrics_exporter_prometheus::PrometheusBuilder::new()
                .with_http_listener(metrics_addr)
                .install()
            {
                error!("Failed to start metrics server: {e}");
            } else {
                info!("Metrics server started on {metrics_addr}");
            }
        });
    }

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<AuctionServer<AuctionServiceImpl>>()
        .await;

    let addr = config.addr();
    let addr_str = addr.to_string();

    println_colored(Color::Green, &format!("Server starting on {addr}"));
    println_colored(
        Color::White,
        &format!(
            "  Rate limit: {} req/min, burst: {}",
            config.rate_limit.requests_per_minute, config.rate_limit.burst
        ),
    );
    println_colored(
        Color::White,
        &format!(
            "  Metrics: {}",
            if config.metrics.enabled {
                "enabled"
            } else {
                "disabled"
            }
        ),
    );
    println_colored(Color::White, "  Health check: enabled");
    println!();
    println_colored(
        Color::Yellow,
        "Type /help for available commands or /quit to exit",
    );
    println!();

    let shutdown_reporter = health_reporter.clone();
    let shutdown_flag = Arc::new(Mutex::new(false));
    let shutdown_flag_clone = shutdown_flag.clone();

    let server_handle = tokio::spawn(async move {
        Server::builder()
            .add_service(health_service)
            .add_service(AuctionServer::new(service))
            .serve_with_shutdown(
                addr,
                shutdown_signal(shutdown_reporter, shutdown_flag_clone),
            )
            .await
    });

    let repl_state = state.clone();
    let repl_shutdown_flag = shutdown_flag.clone();

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);
    let mut line = String::new();

    loop {
        display_prompt(&addr_str);

        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                println_colored(Color::Red, &format!("Error reading input: {e}"));
                continue;
            }
        }

        let command = Command::parse(&line);

        match command {
            Command::Status => {
                let user_count = repl_state.user_count().await;
                let product_count = repl_state.product_count().await;
                let bid_count = repl_state.bid_count().await;

                println!();
                println_colored(Color::Cyan, "Server Status:");
                println_colored(Color::White, &format!("  Address: {addr}"));
                println_colored(
                    Color::White,
                    &format!(
                        "  Rate limit: {} req/min",
                        config.rate_limit.requests_per_minute
                    ),
                );
                println_colored(
                    Color::White,
                    &format!("  Burst: {}", config.rate_limit.burst),
                );
                println_colored(
                    Color::White,
                    &format!(
                        "  Metrics: {}",
                        if config.metrics.enabled {
                            "enabled"
                        } else {
                            "disabled"
                        }
                    ),
                );
                println!();
                println_colored(Color::Cyan, "State:");
                println_colored(Color::White, &format!("  Registered users: {user_count}"));
                println_colored(Color::White, &format!("  Listed products: {product_count}"));
                println_colored(Color::White, &format!("  Accepted bids: {bid_count}"));
                println!();
            }
            Command::Users => {
                let count = repl_state.user_count().await;
                println_colored(Color::Cyan, &format!("Registered users: {count}"));
            }
            Command::Products => {
                let products = repl_state.products().await;
                if products.is_empty() {
                    println_colored(Color::Cyan, "No products listed");
                } else {
                    println!();
                    for product in products {
                        println_colored(
                            Color::White,
                            &format!(
                                "  {} - {} (seller: {}, current: {}, initial: {})",
                                product.id,
                                product.name,
                                product.seller,
                                product.current_price,
                                product.initial_price,
                            ),
                        );
                    }
                    println!();
                }
            }
            Command::Bids => {
                let count = repl_state.bid_count().await;
                println_colored(Color::Cyan, &format!("Accepted bids: {count}"));
            }
            Command::Help => {
                display_help();
            }
            Command::Quit => {
                println!();
                println_colored(Color::Yellow, "Initiating graceful shutdown...");
                *repl_shutdown_flag.lock().await = true;
                break;
            }
            Command::Unknown(msg) => {
                if !msg.is_empty() {
                    println_colored(Color::Red, &msg);
                }
            }
        }
    }

    match server_handle.await {
        Ok(Ok(())) => {
            println_colored(Color::Green, "Server shutdown complete. Goodbye!");
        }
        Ok(Err(e)) => {
            println_colored(Color::Red, &format!("Server error: {e}"));
        }
        Err(e) => {
            println_colored(Color::Red, &format!("Server task panicked: {e}"));
        }
    }

    println!();
    Ok(())
}

async fn shutdown_signal(mut health_reporter: HealthReporter, shutdown_flag: Arc<Mutex<bool>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let repl_quit = async {
        loop {
            tokio::time::sleep(Duration::from_millis(100)).await;
            if *shutdown_flag.lock().await {
                break;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
        _ = repl_quit => {
            info!("Shutdown requested via REPL");
        },
    }

    health_reporter
        .set_not_serving::<AuctionServer<AuctionServiceImpl>>()
        .await;

    info!("Initiating graceful shutdown (allowing in-flight requests to complete)");

    tokio::time::sleep(Duration::from_secs(2)).await;
}
