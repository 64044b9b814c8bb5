//! Shopfront CLI - terminal client for the shop backend.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (token is stored in ~/.shopfront_token)
//! shop login -u alice -p 's3cret'
//!
//! # Browse
//! shop categories
//! shop products --category 2
//! shop product 7
//!
//! # Cart and checkout
//! shop cart add 7 -q 2
//! shop cart show
//! shop order place
//! shop orders
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPFRONT_API_URL` - Backend base URL (default `http://localhost:8000`)
//! - `SHOPFRONT_TOKEN_FILE` - Token file (default `$HOME/.shopfront_token`)
//! - `SHOPFRONT_PASSWORD` - Password for `login`/`register` when `-p` is omitted

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shopfront_core::{CartItemId, CategoryId, OrderId, ProductId, WishlistItemId};
use shopfront_storefront::api::{ApiClient, BackendConfig};
use url::Url;

mod commands;
mod error;
mod token;

use commands::Context;
use error::CliError;
use token::TokenStore;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Shopfront terminal client")]
struct Cli {
    /// Backend base URL
    #[arg(
        long,
        global = true,
        env = "SHOPFRONT_API_URL",
        default_value = "http://localhost:8000"
    )]
    api_url: String,

    /// Where the bearer token is stored
    #[arg(long, global = true, env = "SHOPFRONT_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the token
    Login(CredentialArgs),
    /// Forget the stored token
    Logout,
    /// Create an account
    Register(CredentialArgs),
    /// List categories
    Categories,
    /// List products
    Products {
        /// Only products of this category
        #[arg(short, long)]
        category: Option<CategoryId>,
    },
    /// Show a product and its reviews
    Product {
        /// Product ID
        id: ProductId,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place orders
    Order {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// List orders, or show one
    Orders {
        /// Order ID
        id: Option<OrderId>,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
}

#[derive(clap::Args)]
struct CredentialArgs {
    /// Username
    #[arg(short, long)]
    username: String,

    /// Password (read from stdin when omitted)
    #[arg(short, long, env = "SHOPFRONT_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents
    Show,
    /// Add a product
    Add {
        /// Product ID
        product: ProductId,
        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a cart line
    Remove {
        /// Cart item ID
        item: CartItemId,
    },
    /// Remove every line
    Clear,
}

#[derive(Subcommand)]
enum OrderAction {
    /// Order the current cart contents
    Place,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    Show,
    /// Save a product
    Add {
        /// Product ID
        product: ProductId,
    },
    /// Remove an entry
    Remove {
        /// Wishlist item ID
        item: WishlistItemId,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout is command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront_cli=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::debug!("Command failed: {e:?}");
        let _ = writeln!(std::io::stderr(), "error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let api = ApiClient::new(&BackendConfig::new(Url::parse(&cli.api_url)?))?;
    let tokens = TokenStore::locate(cli.token_file, std::env::var_os("HOME").map(PathBuf::from))?;
    let ctx = Context::new(api, tokens);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Login(args) => {
            let password = password(args.password)?;
            commands::auth::login(&ctx, &mut out, &args.username, password).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx, &mut out)?,
        Commands::Register(args) => {
            let password = password(args.password)?;
            commands::auth::register(&ctx, &mut out, &args.username, password).await?;
        }
        Commands::Categories => commands::catalog::categories(&ctx, &mut out).await?,
        Commands::Products { category } => {
            commands::catalog::products(&ctx, &mut out, category).await?;
        }
        Commands::Product { id } => commands::catalog::product(&ctx, &mut out, id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx, &mut out).await?,
            CartAction::Add { product, quantity } => {
                commands::cart::add(&ctx, &mut out, product, quantity).await?;
            }
            CartAction::Remove { item } => commands::cart::remove(&ctx, &mut out, item).await?,
            CartAction::Clear => commands::cart::clear(&ctx, &mut out).await?,
        },
        Commands::Order { action } => match action {
            OrderAction::Place => commands::orders::place(&ctx, &mut out).await?,
        },
        Commands::Orders { id } => commands::orders::list(&ctx, &mut out, id).await?,
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&ctx, &mut out).await?,
            WishlistAction::Add { product } => {
                commands::wishlist::add(&ctx, &mut out, product).await?;
            }
            WishlistAction::Remove { item } => {
                commands::wishlist::remove(&ctx, &mut out, item).await?;
            }
        },
    }
    Ok(())
}

/// Use the given password or read one line from stdin.
fn password(given: Option<String>) -> Result<String, CliError> {
    if let Some(password) = given {
        return Ok(password);
    }

    let mut stderr = std::io::stderr();
    write!(stderr, "Password: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        return Err(CliError::Nothing("password cannot be empty".to_string()));
    }
    Ok(password)
}
