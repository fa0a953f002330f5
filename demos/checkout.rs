//! Checkout Example
//!
//! Runs a checkout session against a fixture scenario and prints the receipt.
//!
//! Use `-f` to load a fixture scenario by name
//! Use `-s` to ship the order, `-a`/`--customer-info` to pick the recipient
//! Use `-v` to apply a voucher code and `--add ID:QTY` to add products first

use std::io;

use anyhow::{Result, anyhow};
use clap::Parser;
use jiff::Timestamp;
use till::{
    fixtures::{Fixture, backend::FixtureBackend},
    ids::{AccountId, CustomerInfoId, ProductId},
    receipt::{Receipt, write_voucher_table},
    recipients::{AddressInput, RecipientSelection},
    services::{CartStore, TracingNotifier, VoucherCatalog},
    session::CheckoutSession,
    utils::{DemoCheckoutArgs, init_tracing},
    vouchers::catalog::find_by_code,
};

/// Checkout Example
#[expect(clippy::print_stdout, reason = "Example code")]
#[tokio::main]
pub async fn main() -> Result<()> {
    let args = DemoCheckoutArgs::parse();

    init_tracing(&args.log_level).map_err(|err| anyhow!(err))?;

    let fixture = Fixture::load(&args.fixtures_path, &args.fixture)?;
    let product_names = fixture.product_names();
    let backend = FixtureBackend::new(fixture.clone(), Timestamp::now());

    let cart = backend.fetch_cart(fixture.cart().id()).await?;
    let mut session = CheckoutSession::new(cart);

    for &(product, quantity) in &args.add {
        session
            .add_item(&backend, &backend, ProductId(product), quantity)
            .await?;
    }

    if let Some(account_id) = args.account {
        let account = fixture
            .account(AccountId(account_id))
            .cloned()
            .ok_or_else(|| anyhow!("unknown account {account_id}"))?;

        let recipient = match args.customer_info {
            Some(id) => RecipientSelection::saved_address(account, CustomerInfoId(id))?,
            None => RecipientSelection::Account(account),
        };

        session.select_recipient(recipient);
    }

    session.set_shipping(args.shipping);

    if args.shipping && session.recipient().requires_manual_address() {
        let mut address = fixture.address().cloned().unwrap_or_default();

        if args.email.is_some() {
            address.email.clone_from(&args.email);
        }

        session.update_address(address);
    } else if args.email.is_some() {
        session.update_address(AddressInput {
            email: args.email.clone(),
            ..session.address().clone()
        });
    }

    if args.shipping {
        session.refresh_delivery_quote(&backend).await?;
    }

    let offers = backend.list_vouchers().await?;
    let merchandise = session.merchandise_total()?;

    let stdout = io::stdout();
    let mut handle = stdout.lock();

    write_voucher_table(&mut handle, &offers, &merchandise, Timestamp::now())?;

    if let Some(code) = args.voucher.as_deref() {
        let offer = find_by_code(&offers, code).ok_or_else(|| anyhow!("unknown voucher {code}"))?;

        let eligibility = offer.eligibility(&merchandise, Timestamp::now());

        if eligibility.is_eligible() {
            session.select_voucher(offer)?;
        } else {
            println!("Voucher {code} not applied: {eligibility}");
        }
    }

    let breakdown = session.breakdown()?;

    Receipt::new(session.cart(), breakdown, session.voucher(), session.delivery())?
        .write_to(&mut handle, &product_names)?;

    match session.submit(&backend, &TracingNotifier).await {
        Ok(order) => println!("Order {order} submitted"),
        Err(error) => println!("Checkout failed: {}", error.user_message()),
    }

    Ok(())
}
