//! Properties of the pure pricing pipeline: cart total, voucher discount, grand total and
//! payload assembly.

use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{Currency, VND},
};
use testresult::TestResult;
use till::{
    carts::{CartLine, CartSnapshot},
    checkout::{AccountRef, CheckoutError, SaleMethod, build_checkout_payload},
    delivery::DeliveryQuote,
    ids::{AccountId, CartId, ProductId, VoucherId},
    pricing::total_price,
    recipients::{Account, AddressInput, District, Province, RecipientSelection},
    totals::{PriceBreakdown, TotalsError, grand_total},
    vouchers::{VoucherApplication, VoucherOffer, apply_voucher},
};

fn vnd(minor: i64) -> Money<'static, Currency> {
    Money::from_minor(minor, VND)
}

#[test]
fn cart_total_is_sum_of_price_times_quantity() -> TestResult {
    let pairs = [(0, 5), (1, 1), (19_990, 3), (250_000, 2), (1_000_000, 7)];

    let lines = (1_u64..)
        .zip(pairs)
        .map(|(id, (price, quantity))| CartLine::new(ProductId(id), vnd(price), quantity))
        .collect::<Result<Vec<_>, _>>()?;

    let expected: i64 = pairs
        .iter()
        .map(|&(price, quantity)| price * i64::from(quantity))
        .sum();

    assert_eq!(total_price(&lines, VND)?, vnd(expected));
    assert_eq!(total_price(&[], VND)?, vnd(0));

    Ok(())
}

#[test]
fn percent_discount_stays_within_cart_total_and_cap() -> TestResult {
    let totals = [0, 1, 9, 99_999, 100_000, 1_000_000, 7_654_321];
    let points = [1, 10, 33, 50, 99, 100];
    let caps = [None, Some(0), Some(1), Some(50_000), Some(10_000_000)];

    for total in totals {
        for point in points {
            for cap in caps {
                let offer = VoucherOffer::percent(
                    VoucherId(1),
                    "P",
                    Decimal::from(point),
                    cap.map(vnd),
                    vnd(0),
                );

                let discount = apply_voucher(vnd(total), &offer)?.discount().to_minor_units();

                assert!(
                    (0..=total).contains(&discount),
                    "{point}% of {total} gave {discount}"
                );

                if let Some(cap) = cap.filter(|cap| *cap > 0) {
                    assert!(discount <= cap, "{point}% of {total} exceeded cap {cap}");
                }
            }
        }
    }

    Ok(())
}

#[test]
fn fixed_discount_is_amount_or_cart_total() -> TestResult {
    for total in [0, 30_000, 50_000, 80_000] {
        for amount in [0, 1, 50_000, 100_000] {
            let offer = VoucherOffer::fixed_amount(VoucherId(2), "F", vnd(amount), vnd(0));

            let application = apply_voucher(vnd(total), &offer)?;

            assert_eq!(application.discount(), vnd(amount.min(total)));
        }
    }

    Ok(())
}

#[test]
fn capped_percent_voucher_on_large_cart() -> TestResult {
    let offer = VoucherOffer::percent(
        VoucherId(1),
        "TEN",
        Decimal::from(10),
        Some(vnd(50_000)),
        vnd(0),
    );

    let application = apply_voucher(vnd(1_000_000), &offer)?;

    assert_eq!(application.discount(), vnd(50_000));
    assert_eq!(
        grand_total(vnd(1_000_000), false, vnd(0), application.discount())?,
        vnd(950_000)
    );

    Ok(())
}

#[test]
fn fixed_voucher_larger_than_cart_is_clamped() -> TestResult {
    let offer = VoucherOffer::fixed_amount(VoucherId(2), "50K", vnd(50_000), vnd(0));

    let application = apply_voucher(vnd(30_000), &offer)?;

    assert_eq!(application.discount(), vnd(30_000));
    assert_eq!(
        grand_total(vnd(30_000), false, vnd(0), application.discount())?,
        vnd(0)
    );

    Ok(())
}

#[test]
fn anonymous_delivery_without_ward_is_incomplete() {
    let input = AddressInput {
        province: Some(Province {
            id: 201,
            name: "Ha Noi".to_string(),
        }),
        district: Some(District {
            id: 1488,
            name: "Hoan Kiem".to_string(),
        }),
        ward: None,
        address: "5 Trang Tien".to_string(),
        email: Some("a@example.com".to_string()),
        ..AddressInput::default()
    };

    let result = build_checkout_payload(
        &RecipientSelection::Anonymous,
        true,
        Some(&input),
        &VoucherApplication::none(VND),
    );

    assert!(
        matches!(result, Err(CheckoutError::IncompleteAddress { .. })),
        "expected incomplete address, got {result:?}"
    );
}

#[test]
fn retail_sale_for_account_sends_account_and_name() -> TestResult {
    let account = Account {
        id: AccountId(7),
        fullname: "Le Van C".to_string(),
        email: Some("c@example.com".to_string()),
        customer_infos: Vec::new(),
    };

    let payload = build_checkout_payload(
        &RecipientSelection::Account(account),
        false,
        None,
        &VoucherApplication::none(VND),
    )?;

    assert_eq!(payload.sale_method, SaleMethod::Retail);
    assert_eq!(
        payload.customer_info.account,
        Some(AccountRef { id: AccountId(7) })
    );
    assert_eq!(payload.customer_info.fullname.as_deref(), Some("Le Van C"));
    assert_eq!(payload.email.as_deref(), Some("c@example.com"));

    Ok(())
}

#[test]
fn discount_from_previous_cart_total_is_rejected() -> TestResult {
    let before = CartSnapshot::with_lines(
        CartId(1),
        [CartLine::new(ProductId(1), vnd(1_000_000), 1)?],
        VND,
    )?;
    let offer = VoucherOffer::percent(
        VoucherId(1),
        "TEN",
        Decimal::from(10),
        Some(vnd(50_000)),
        vnd(0),
    );
    let stale = apply_voucher(before.subtotal()?, &offer)?;

    let after = CartSnapshot::with_lines(
        CartId(1),
        [CartLine::new(ProductId(1), vnd(1_000_000), 2)?],
        VND,
    )?;
    let quote = DeliveryQuote::pending(VND);

    assert_eq!(
        PriceBreakdown::compute(&after, false, &quote, &stale),
        Err(TotalsError::StaleDiscount)
    );

    let fresh = apply_voucher(after.subtotal()?, &offer)?;

    assert_eq!(
        PriceBreakdown::compute(&after, false, &quote, &fresh)?.total,
        vnd(1_950_000)
    );

    Ok(())
}
