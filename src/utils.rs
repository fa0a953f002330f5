//! Utils

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
pub struct DemoCheckoutArgs {
    /// Fixture scenario to load
    #[arg(short, long, env = "TILL_FIXTURE", default_value = "shop")]
    pub fixture: String,

    /// Directory holding fixture scenarios
    #[arg(long, env = "TILL_FIXTURES_PATH", default_value = "./fixtures")]
    pub fixtures_path: PathBuf,

    /// Ship the order instead of handing it over in store
    #[arg(short, long)]
    pub shipping: bool,

    /// Voucher code to apply
    #[arg(short, long)]
    pub voucher: Option<String>,

    /// Account placing the order
    #[arg(short, long)]
    pub account: Option<u64>,

    /// Saved address of the account to ship to
    #[arg(long, requires = "account")]
    pub customer_info: Option<u64>,

    /// Contact email for deliveries without an account
    #[arg(short, long)]
    pub email: Option<String>,

    /// Product to add to the cart before checkout, as `PRODUCT_ID:QUANTITY`
    #[arg(long, value_parser = parse_cart_addition)]
    pub add: Vec<(u64, u32)>,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, env = "TILL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

fn parse_cart_addition(s: &str) -> Result<(u64, u32), String> {
    let (product, quantity) = s
        .split_once(':')
        .ok_or_else(|| format!("expected PRODUCT_ID:QUANTITY, got {s}"))?;

    let product = product
        .parse()
        .map_err(|err| format!("invalid product id {product}: {err}"))?;
    let quantity = quantity
        .parse()
        .map_err(|err| format!("invalid quantity {quantity}: {err}"))?;

    Ok((product, quantity))
}

/// Install a formatting subscriber, filtered by `RUST_LOG` or else `log_level`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(log_level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .try_init()
}
