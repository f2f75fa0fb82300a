//! Prime Fix CLI - terminal front end for the storefront engine.
//!
//! # Usage
//!
//! ```bash
//! # Add two units of product 12 to the cart
//! pf-cli cart add 12 --name "LaserJet Pro" --price 100 --quantity 2
//!
//! # Show the cart with shipping and total
//! pf-cli cart show
//!
//! # Save a product for later
//! pf-cli wishlist toggle 7 --name "Toner Black" --price 50
//!
//! # Place the order
//! pf-cli checkout --name "Ada Lovelace" --email ada@example.com --phone 555-0100 \
//!     --address "1 Main St" --city Springfield --zip 12345 --coupon SAVE30
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and edit the cart
//! - `wishlist` - Show and edit the wishlist
//! - `coupons` - List advertised coupons
//! - `checkout` - Submit the cart as an order
//!
//! Configuration comes from `PRIMEFIX_*` environment variables (or `.env`).

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::print_stdout)]

use clap::{Parser, Subcommand};
use primefix_core::{PaymentMethod, ProductId, UserId};
use primefix_storefront::{AppError, Storefront, StorefrontConfig};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(author, version, about = "Prime Fix storefront CLI")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Show and edit the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// List coupons the store advertises
    Coupons,
    /// Submit the cart as an order
    Checkout(CheckoutArgs),
}

#[derive(Subcommand)]
enum CartAction {
    /// Show lines, shipping and total
    Show,
    /// Add a product
    Add {
        #[command(flatten)]
        product: ProductArgs,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        id: ProductId,

        /// New quantity (at least 1)
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every product
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    List,
    /// Save a product, or unsave it if already saved
    Toggle {
        #[command(flatten)]
        product: ProductArgs,
    },
}

/// Product fields copied into the cart or wishlist.
#[derive(clap::Args)]
struct ProductArgs {
    /// Product ID
    id: ProductId,

    /// Product name
    #[arg(short, long)]
    name: String,

    /// Unit price
    #[arg(short, long)]
    price: Decimal,

    /// Image file name or URL
    #[arg(long)]
    image: Option<String>,
}

#[derive(clap::Args)]
struct CheckoutArgs {
    /// Full name
    #[arg(long)]
    name: String,

    /// Email address
    #[arg(long)]
    email: String,

    /// Phone number
    #[arg(long)]
    phone: String,

    /// Street address
    #[arg(long)]
    address: String,

    /// City
    #[arg(long)]
    city: String,

    /// ZIP / postal code
    #[arg(long)]
    zip: String,

    /// Payment method (`cod` or `paypal`); defaults to the store's first enabled method
    #[arg(long)]
    payment: Option<PaymentMethod>,

    /// Coupon code to apply before submitting
    #[arg(long)]
    coupon: Option<String>,

    /// Signed-in customer ID; omit for guest checkout
    #[arg(long)]
    user_id: Option<UserId>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "Command failed");
        println!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("primefix_storefront=info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let config = StorefrontConfig::from_env()?;
    let mut storefront = Storefront::new(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&storefront),
            CartAction::Add { product, quantity } => {
                commands::cart::add(&mut storefront, &product.into_product(), quantity);
            }
            CartAction::Remove { id } => commands::cart::remove(&mut storefront, id)?,
            CartAction::Update { id, quantity } => {
                commands::cart::update(&mut storefront, id, quantity)?;
            }
            CartAction::Clear => commands::cart::clear(&mut storefront),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::List => commands::wishlist::list(&storefront),
            WishlistAction::Toggle { product } => {
                commands::wishlist::toggle(&mut storefront, &product.into_product());
            }
        },
        Commands::Coupons => commands::checkout::coupons(&storefront).await?,
        Commands::Checkout(args) => {
            commands::checkout::submit(&mut storefront, args.into_request()).await?;
        }
    }
    Ok(())
}

impl ProductArgs {
    fn into_product(self) -> primefix_core::Product {
        let product = primefix_core::Product::new(self.id, self.name, self.price);
        match self.image {
            Some(image) => product.with_image(image),
            None => product,
        }
    }
}

impl CheckoutArgs {
    fn into_request(self) -> commands::checkout::CheckoutRequest {
        commands::checkout::CheckoutRequest {
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            city: self.city,
            zip: self.zip,
            payment: self.payment,
            coupon: self.coupon,
            user_id: self.user_id,
        }
    }
}
