//! Freshbasket CLI - drives the storefront client from a terminal.
//!
//! Stands in for the storefront's view layer: every subcommand calls the
//! client SDK's public operations and renders the result, nothing more.
//!
//! # Usage
//!
//! ```bash
//! # Request an OTP and log in
//! fb-cli auth otp -e shopper@example.com
//! fb-cli auth login -e shopper@example.com -o 123456
//!
//! # Browse and fill the cart
//! fb-cli catalog products
//! fb-cli cart add -p 9 -q 2
//! fb-cli cart show
//!
//! # Pay (gateway confirmation fields are prompted for)
//! fb-cli checkout pay -m razorpay
//!
//! # Order history
//! fb-cli orders
//! ```
//!
//! # Commands
//!
//! - `auth` - signup, OTP request, login, logout
//! - `catalog` - list categories and products
//! - `cart` - show and mutate the cart, save for later, move to cart
//! - `checkout` - run a checkout attempt, reconcile interrupted ones
//! - `orders` - list order history

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "fb-cli")]
#[command(author, version, about = "Freshbasket storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Account and session management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Browse the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Show and mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Place and pay for an order
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
    /// List order history
    Orders,
}

#[derive(Subcommand)]
enum AuthAction {
    /// Create an account
    Signup {
        /// Display name
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Password
        #[arg(short, long)]
        password: String,

        /// Account role (`customer`, `vendor`)
        #[arg(short, long, default_value = "customer")]
        role: String,
    },
    /// Request a one-time password
    Otp {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Verify an OTP and store the session
    Login {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// One-time password
        #[arg(short, long)]
        otp: String,
    },
    /// Clear the stored session
    Logout,
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List product categories
    Categories,
    /// List products
    Products,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart
    Show,
    /// Add a product
    Add {
        /// Product id
        #[arg(short, long)]
        product: i32,

        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity by a delta (clamped to a minimum of 1)
    Qty {
        /// Cart line id
        #[arg(short, long)]
        item: i32,

        /// Quantity delta (may be negative)
        #[arg(short, long, allow_hyphen_values = true)]
        delta: i32,
    },
    /// Remove a line
    Remove {
        /// Cart line id
        #[arg(short, long)]
        item: i32,
    },
    /// Move a line to the saved-for-later list
    Save {
        /// Cart line id
        #[arg(short, long)]
        item: i32,
    },
    /// Move a saved product back into the cart
    Restore {
        /// Product id
        #[arg(short, long)]
        product: i32,
    },
    /// List saved-for-later products
    Saved,
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Run a checkout attempt
    Pay {
        /// Payment method (`razorpay` or `cod`)
        #[arg(short, long, default_value = "razorpay")]
        method: String,
    },
    /// Resolve a checkout attempt interrupted before a terminal state
    Reconcile,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Signup {
                username,
                email,
                password,
                role,
            } => commands::auth::signup(&username, &email, &password, &role).await?,
            AuthAction::Otp { email } => commands::auth::request_otp(&email).await?,
            AuthAction::Login { email, otp } => commands::auth::login(&email, &otp).await?,
            AuthAction::Logout => commands::auth::logout()?,
        },
        Commands::Catalog { action } => match action {
            CatalogAction::Categories => commands::catalog::categories().await?,
            CatalogAction::Products => commands::catalog::products().await?,
        },
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show().await?,
            CartAction::Add { product, quantity } => {
                commands::cart::add(product, quantity).await?;
            }
            CartAction::Qty { item, delta } => commands::cart::change_quantity(item, delta).await?,
            CartAction::Remove { item } => commands::cart::remove(item).await?,
            CartAction::Save { item } => commands::cart::save_for_later(item).await?,
            CartAction::Restore { product } => commands::cart::move_to_cart(product).await?,
            CartAction::Saved => commands::cart::saved()?,
        },
        Commands::Checkout { action } => match action {
            CheckoutAction::Pay { method } => commands::checkout::pay(&method).await?,
            CheckoutAction::Reconcile => commands::checkout::reconcile().await?,
        },
        Commands::Orders => commands::orders::list().await?,
    }
    Ok(())
}
