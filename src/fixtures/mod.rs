//! Fixtures
//!
//! YAML checkout scenarios: a product catalog, a cart, the voucher catalog, customer accounts
//! and the delivery quote the carrier would return.

use std::{
    fs,
    path::{Path, PathBuf},
};

use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    carts::{CartError, CartLine, CartSnapshot},
    delivery::{DeliveryError, DeliveryQuote},
    ids::{AccountId, CartId, ProductId, VoucherId},
    recipients::{Account, AddressInput},
    vouchers::{VoucherOffer, VoucherStatus},
};

pub mod backend;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products defined
    #[error("No products defined; currency unknown")]
    NoCurrency,

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// Invalid cart contents
    #[error("Invalid cart: {0}")]
    Cart(#[from] CartError),

    /// Invalid delivery quote
    #[error("Invalid delivery quote: {0}")]
    Delivery(#[from] DeliveryError),
}

#[derive(Debug, Deserialize)]
struct ScenarioFixture {
    products: FxHashMap<ProductId, ProductFixture>,
    cart: CartFixture,
    #[serde(default)]
    delivery: Option<DeliveryFixture>,
    #[serde(default)]
    accounts: Vec<Account>,
    #[serde(default)]
    vouchers: Vec<VoucherFixture>,
    #[serde(default)]
    address: Option<AddressInput>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    price: String,
}

#[derive(Debug, Deserialize)]
struct CartFixture {
    id: CartId,
    #[serde(default)]
    lines: Vec<LineFixture>,
}

#[derive(Debug, Deserialize)]
struct LineFixture {
    product: ProductId,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryFixture {
    fee: String,
    #[serde(default)]
    lead_time: Option<i64>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum VoucherTypeFixture {
    Percent,
    Discount,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoucherFixture {
    id: VoucherId,
    code: String,
    #[serde(rename = "type")]
    kind: VoucherTypeFixture,
    value: String,
    #[serde(default)]
    max_value: Option<String>,
    #[serde(default)]
    required_value: Option<String>,
    #[serde(default = "active")]
    voucher_status: VoucherStatus,
    #[serde(default)]
    quantity: Option<u32>,
    #[serde(default)]
    start_date: Option<Timestamp>,
    #[serde(default)]
    expiration_date: Option<Timestamp>,
}

fn active() -> VoucherStatus {
    VoucherStatus::Active
}

/// A loaded checkout scenario.
#[derive(Debug, Clone)]
pub struct Fixture {
    products: FxHashMap<ProductId, (String, Money<'static, Currency>)>,
    cart: CartSnapshot<'static>,
    delivery: Option<DeliveryQuote<'static>>,
    accounts: FxHashMap<AccountId, Account>,
    vouchers: Vec<VoucherOffer<'static>>,
    address: Option<AddressInput>,
    currency: &'static Currency,
}

impl Fixture {
    /// Load a scenario from `./fixtures/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::load(Path::new("./fixtures"), name)
    }

    /// Load a scenario from `<base_path>/<name>.yml`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(base_path: &Path, name: &str) -> Result<Self, FixtureError> {
        let file_path: PathBuf = base_path.join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;

        Self::parse(&contents)
    }

    /// Parse a scenario from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, prices use differing or unknown currencies,
    /// or the cart references an unknown product.
    pub fn parse(contents: &str) -> Result<Self, FixtureError> {
        let scenario: ScenarioFixture = serde_norway::from_str(contents)?;

        let mut currency = None;
        let mut products = FxHashMap::default();

        for (id, product) in scenario.products {
            let price = parse_price(&product.price, &mut currency)?;

            products.insert(id, (product.name, price));
        }

        let currency = currency.ok_or(FixtureError::NoCurrency)?;

        let lines = scenario
            .cart
            .lines
            .iter()
            .map(|line| -> Result<CartLine<'static>, FixtureError> {
                let (_, price) = products
                    .get(&line.product)
                    .ok_or(FixtureError::ProductNotFound(line.product))?;

                Ok(CartLine::new(line.product, *price, line.quantity)?)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cart = CartSnapshot::with_lines(scenario.cart.id, lines, currency)?;

        let delivery = scenario
            .delivery
            .map(|delivery| -> Result<_, FixtureError> {
                let fee = parse_price(&delivery.fee, &mut Some(currency))?;

                Ok(DeliveryQuote::from_epoch_seconds(fee, delivery.lead_time)?)
            })
            .transpose()?;

        let vouchers = scenario
            .vouchers
            .into_iter()
            .map(|voucher| voucher_offer(voucher, currency))
            .collect::<Result<Vec<_>, _>>()?;

        let accounts = scenario
            .accounts
            .into_iter()
            .map(|account| (account.id, account))
            .collect();

        Ok(Self {
            products,
            cart,
            delivery,
            accounts,
            vouchers,
            address: scenario.address,
            currency,
        })
    }

    /// Cart as fetched at the start of the scenario
    pub fn cart(&self) -> &CartSnapshot<'static> {
        &self.cart
    }

    /// Quote the carrier returns for any destination, if it serves one
    pub fn delivery(&self) -> Option<DeliveryQuote<'static>> {
        self.delivery
    }

    /// Voucher catalog
    pub fn vouchers(&self) -> &[VoucherOffer<'static>] {
        &self.vouchers
    }

    /// Hand-entered delivery address, if the scenario fills in the form
    pub fn address(&self) -> Option<&AddressInput> {
        self.address.as_ref()
    }

    /// Look up an account.
    pub fn account(&self, id: AccountId) -> Option<&Account> {
        self.accounts.get(&id)
    }

    /// Price of a catalog product.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not in the catalog.
    pub fn price(&self, id: ProductId) -> Result<Money<'static, Currency>, FixtureError> {
        self.products
            .get(&id)
            .map(|(_, price)| *price)
            .ok_or(FixtureError::ProductNotFound(id))
    }

    /// Product display names by id
    pub fn product_names(&self) -> FxHashMap<ProductId, String> {
        self.products
            .iter()
            .map(|(id, (name, _))| (*id, name.clone()))
            .collect()
    }

    /// Currency every price in the scenario uses
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

fn voucher_offer(
    fixture: VoucherFixture,
    currency: &'static Currency,
) -> Result<VoucherOffer<'static>, FixtureError> {
    let mut expected = Some(currency);

    let required_value = match &fixture.required_value {
        Some(value) => parse_price(value, &mut expected)?,
        None => Money::from_minor(0, currency),
    };

    let offer = match fixture.kind {
        VoucherTypeFixture::Percent => {
            let points = parse_percent_points(&fixture.value)?;
            let max_value = fixture
                .max_value
                .as_deref()
                .map(|value| parse_price(value, &mut expected))
                .transpose()?;

            VoucherOffer::percent(fixture.id, fixture.code, points, max_value, required_value)
        }
        VoucherTypeFixture::Discount => {
            let amount = parse_price(&fixture.value, &mut expected)?;

            VoucherOffer::fixed_amount(fixture.id, fixture.code, amount, required_value)
        }
    };

    let offer = offer
        .with_status(fixture.voucher_status)
        .with_validity(fixture.start_date, fixture.expiration_date);

    Ok(match fixture.quantity {
        Some(quantity) => offer.with_quantity(quantity),
        None => offer,
    })
}

/// Parse a price string (e.g. "250000 VND") into money, checking it against the currency seen
/// so far and recording it if none was.
///
/// # Errors
///
/// Returns an error if the format, amount or currency is invalid.
pub fn parse_price(
    s: &str,
    expected: &mut Option<&'static Currency>,
) -> Result<Money<'static, Currency>, FixtureError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency =
        iso::find(code).ok_or_else(|| FixtureError::UnknownCurrency(code.to_string()))?;

    match expected {
        Some(existing) if *existing != currency => {
            return Err(FixtureError::CurrencyMismatch(
                existing.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            ));
        }
        Some(_) => {}
        None => *expected = Some(currency),
    }

    let minor_units = 10_i64
        .checked_pow(currency.exponent)
        .and_then(|scale| amount.checked_mul(Decimal::from(scale)))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Parse percent points, accepting an optional trailing `%` (e.g. "10" or "12.5%").
///
/// # Errors
///
/// Returns an error if the value is not a number.
pub fn parse_percent_points(s: &str) -> Result<Decimal, FixtureError> {
    s.trim()
        .trim_end_matches('%')
        .trim_end()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use rusty_money::iso::{USD, VND};
    use tempfile::TempDir;
    use testresult::TestResult;

    use crate::vouchers::VoucherKind;

    use super::*;

    const SCENARIO: &str = r"
products:
  101: { name: Ao thun, price: 250000 VND }
  102: { name: Quan jean, price: 500000 VND }
cart:
  id: 1
  lines:
    - { product: 101, quantity: 2 }
    - { product: 102, quantity: 1 }
delivery:
  fee: 30000 VND
  leadTime: 1767225600
accounts:
  - id: 7
    fullname: Le Van C
    email: c@example.com
    customerInfos:
      - id: 11
        fullname: Le Van C
        phone: '0911111111'
        address: 1 Le Loi
        provinceId: 202
        provinceName: Ho Chi Minh
        districtId: 1442
        districtName: Quan 1
        wardCode: '20109'
        wardName: Ben Nghe
vouchers:
  - id: 1
    code: TEN
    type: PERCENT
    value: '10'
    maxValue: 50000 VND
  - id: 2
    code: 50K
    type: DISCOUNT
    value: 50000 VND
    requiredValue: 200000 VND
    quantity: 3
    expirationDate: 2026-12-31T23:59:59Z
address:
  province: { id: 201, name: Ha Noi }
  district: { id: 1488, name: Hoan Kiem }
  ward: { code: 1A0807, name: Hang Bai }
  fullname: Nguyen Van A
  phone: '0987654321'
  address: 5 Trang Tien
";

    #[test]
    fn parse_builds_cart_and_catalog() -> TestResult {
        let fixture = Fixture::parse(SCENARIO)?;

        assert_eq!(fixture.currency(), VND);
        assert_eq!(fixture.cart().len(), 2);
        assert_eq!(fixture.cart().subtotal()?, Money::from_minor(1_000_000, VND));
        assert_eq!(
            fixture.delivery().map(|quote| quote.fee()),
            Some(Money::from_minor(30_000, VND))
        );
        assert_eq!(
            fixture
                .product_names()
                .get(&ProductId(102))
                .map(String::as_str),
            Some("Quan jean")
        );

        let address = fixture.address().ok_or("Expected address")?;
        assert!(address.missing_fields().is_empty(), "address incomplete");
        assert_eq!(address.email(), None);

        let account = fixture.account(AccountId(7)).ok_or("Expected account 7")?;
        assert_eq!(account.customer_infos.len(), 1);

        Ok(())
    }

    #[test]
    fn parse_reads_both_voucher_types() -> TestResult {
        let fixture = Fixture::parse(SCENARIO)?;

        let [percent, fixed] = fixture.vouchers() else {
            return Err("Expected two vouchers".into());
        };

        assert_eq!(
            percent.kind,
            VoucherKind::Percent {
                points: Decimal::from(10),
                max_value: Some(Money::from_minor(50_000, VND)),
            }
        );
        assert_eq!(fixed.kind, VoucherKind::FixedAmount(Money::from_minor(50_000, VND)));
        assert_eq!(fixed.required_value, Money::from_minor(200_000, VND));
        assert_eq!(fixed.quantity, Some(3));
        assert!(fixed.valid_until.is_some(), "expiration date dropped");

        Ok(())
    }

    #[test]
    fn load_reads_named_file() -> TestResult {
        let dir = TempDir::new()?;
        let mut file = fs::File::create(dir.path().join("shop.yml"))?;
        file.write_all(SCENARIO.as_bytes())?;

        let fixture = Fixture::load(dir.path(), "shop")?;

        assert_eq!(fixture.cart().id(), CartId(1));

        Ok(())
    }

    #[test]
    fn unknown_cart_product_is_rejected() {
        let result = Fixture::parse(
            r"
products:
  101: { name: Ao thun, price: 250000 VND }
cart:
  id: 1
  lines:
    - { product: 999, quantity: 1 }
",
        );

        assert!(matches!(result, Err(FixtureError::ProductNotFound(ProductId(999)))));
    }

    #[test]
    fn parse_price_scales_by_currency_exponent() -> TestResult {
        assert_eq!(parse_price("2.99 USD", &mut None)?, Money::from_minor(299, USD));
        assert_eq!(parse_price("250000 VND", &mut None)?, Money::from_minor(250_000, VND));

        Ok(())
    }

    #[test]
    fn parse_price_rejects_mixed_currencies() {
        let result = parse_price("2.99 USD", &mut Some(VND));

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(expected, found))
            if expected == "VND" && found == "USD"));
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        assert!(matches!(
            parse_price("2.99USD", &mut None),
            Err(FixtureError::InvalidPrice(_))
        ));
        assert!(matches!(
            parse_price("2.99 ABC", &mut None),
            Err(FixtureError::UnknownCurrency(code)) if code == "ABC"
        ));
    }

    #[test]
    fn parse_percent_points_accepts_suffix() -> TestResult {
        assert_eq!(parse_percent_points("12.5%")?, Decimal::new(125, 1));
        assert!(matches!(
            parse_percent_points("ten"),
            Err(FixtureError::InvalidPercentage(_))
        ));

        Ok(())
    }
}
