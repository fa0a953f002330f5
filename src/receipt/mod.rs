//! Receipt

use std::{fmt::Write, io, ops::Range};

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::{Decimal, prelude::FromPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    carts::CartSnapshot,
    delivery::DeliveryQuote,
    ids::ProductId,
    pricing::{TotalPriceError, line_subtotal},
    totals::PriceBreakdown,
    vouchers::{VoucherApplication, VoucherOffer},
};

/// Errors that can occur when building or printing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Error calculating a line total.
    #[error(transparent)]
    TotalPrice(#[from] TotalPriceError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One cart line as printed.
#[derive(Debug, Clone, Copy)]
struct ReceiptLine<'a> {
    product: ProductId,
    quantity: u32,
    unit_price: Money<'a, Currency>,
    line_total: Money<'a, Currency>,
}

/// Order summary shown before the cashier confirms checkout.
#[derive(Debug, Clone)]
pub struct Receipt<'a> {
    lines: SmallVec<[ReceiptLine<'a>; 10]>,

    breakdown: PriceBreakdown<'a>,

    /// Voucher code and its face value, if one is selected
    voucher: Option<(String, String)>,

    /// Estimated delivery time
    lead_time: Option<Timestamp>,
}

impl<'a> Receipt<'a> {
    /// Build a receipt for a cart and its computed breakdown.
    ///
    /// # Errors
    ///
    /// Returns a [`ReceiptError`] if a line total cannot be calculated.
    pub fn new(
        cart: &CartSnapshot<'a>,
        breakdown: PriceBreakdown<'a>,
        voucher: &VoucherApplication<'a>,
        quote: &DeliveryQuote<'a>,
    ) -> Result<Self, ReceiptError> {
        let lines = cart
            .iter()
            .map(|line| -> Result<ReceiptLine<'a>, ReceiptError> {
                Ok(ReceiptLine {
                    product: line.product(),
                    quantity: line.quantity(),
                    unit_price: *line.price(),
                    line_total: line_subtotal(line)?,
                })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self {
            lines,
            breakdown,
            voucher: voucher
                .offer()
                .map(|offer| (offer.code.clone(), offer.describe_value())),
            lead_time: breakdown.shipping.and(quote.lead_time()),
        })
    }

    /// Totals this receipt was built from
    pub fn breakdown(&self) -> &PriceBreakdown<'a> {
        &self.breakdown
    }

    /// The discount as a share of the merchandise total.
    pub fn savings_percent(&self) -> Percentage {
        let merchandise = self.breakdown.merchandise.to_minor_units();

        if merchandise == 0 {
            return Percentage::from(0.0);
        }

        let discount = Decimal::from_i64(self.breakdown.discount.to_minor_units())
            .unwrap_or(Decimal::ZERO);
        let merchandise = Decimal::from_i64(merchandise).unwrap_or(Decimal::ONE);

        Percentage::from(discount / merchandise)
    }

    /// Prints the receipt. Products missing from `product_names` are shown by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the receipt cannot be written.
    pub fn write_to(
        &self,
        mut out: impl io::Write,
        product_names: &FxHashMap<ProductId, String>,
    ) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["", "Product", "Qty", "Unit price", "Line total"]);

        for (idx, line) in self.lines.iter().enumerate() {
            let name = product_names
                .get(&line.product)
                .cloned()
                .unwrap_or_else(|| format!("Product {}", line.product));

            builder.push_record([
                format!("#{}", idx + 1),
                name,
                line.quantity.to_string(),
                line.unit_price.to_string(),
                line.line_total.to_string(),
            ]);
        }

        write_table(&mut out, builder, Columns::new(2..5))?;

        self.write_summary(&mut out)
    }

    fn write_summary(&self, out: &mut impl io::Write) -> Result<(), ReceiptError> {
        let mut rows: SmallVec<[(String, String); 5]> = SmallVec::new();

        rows.push((" Subtotal:".to_string(), format!("{}  ", self.breakdown.merchandise)));

        if let Some(shipping) = self.breakdown.shipping {
            rows.push((" Shipping:".to_string(), format!("{shipping}  ")));
        }

        if let Some((code, value)) = &self.voucher {
            let points = percent_points_from_fractional_percentage(self.savings_percent());

            rows.push((
                format!(" Voucher {code} ({value}):"),
                format!("({points:.2}%) -{}  ", self.breakdown.discount),
            ));
        }

        rows.push((
            " \x1b[1mTotal:\x1b[0m".to_string(),
            format!("\x1b[1m{}  \x1b[0m", self.breakdown.total),
        ));

        if let Some(lead_time) = self.lead_time {
            rows.push((
                " Estimated delivery:".to_string(),
                format!("{}  ", lead_time.strftime("%Y-%m-%d")),
            ));
        }

        let label_width = rows
            .iter()
            .map(|(label, _)| visible_width(label))
            .max()
            .unwrap_or_default();

        let value_width = rows
            .iter()
            .map(|(_, value)| visible_width(value))
            .max()
            .unwrap_or_default();

        for (label, value) in &rows {
            write_summary_line(out, label, value, label_width, value_width)?;
        }

        writeln!(out).map_err(|_err| ReceiptError::IO)
    }
}

/// Prints the voucher catalog with each offer's eligibility for a cart total.
///
/// # Errors
///
/// Returns an error if the table cannot be written.
pub fn write_voucher_table(
    mut out: impl io::Write,
    offers: &[VoucherOffer<'_>],
    cart_total: &Money<'_, Currency>,
    now: Timestamp,
) -> Result<(), ReceiptError> {
    let mut builder = Builder::default();

    builder.push_record(["Code", "Value", "Cap", "Minimum order", "Status"]);

    for offer in offers {
        let eligibility = offer.eligibility(cart_total, now);

        builder.push_record([
            offer.code.clone(),
            offer.describe_value(),
            offer.cap().map(|cap| cap.to_string()).unwrap_or_default(),
            offer.required_value.to_string(),
            eligibility.to_string(),
        ]);
    }

    write_table(&mut out, builder, Columns::new(1..4))
}

fn write_table(
    out: &mut impl io::Write,
    builder: Builder,
    money_columns: Columns<Range<usize>>,
) -> Result<(), ReceiptError> {
    let mut table = builder.build();
    let mut theme = Theme::from(Style::modern_rounded());
    let separator = HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤'));

    theme.remove_horizontal_lines();
    theme.insert_horizontal_line(1, separator);

    table.with(theme);
    table.modify(Rows::first(), Color::BOLD);
    table.modify(money_columns, Alignment::right());

    let table_str = colorize_borders(&table.to_string());

    writeln!(out, "\n{table_str}").map_err(|_err| ReceiptError::IO)
}

/// Converts a fractional percentage to percent points for display.
fn percent_points_from_fractional_percentage(percentage: Percentage) -> Decimal {
    ((percentage * Decimal::ONE) * Decimal::ONE_HUNDRED).round_dp(2)
}

/// Wraps runs of box-drawing characters (U+2500..U+257F) in ANSI dark grey.
fn colorize_borders(table: &str) -> String {
    let mut out = String::with_capacity(table.len() + 256);
    let mut in_run = false;

    for ch in table.chars() {
        let box_char = ('\u{2500}'..='\u{257F}').contains(&ch);

        if box_char && !in_run {
            _ = out.write_str("\x1b[90m");
            in_run = true;
        } else if !box_char && in_run {
            _ = out.write_str("\x1b[0m");
            in_run = false;
        }

        out.push(ch);
    }

    if in_run {
        _ = out.write_str("\x1b[0m");
    }

    out
}

/// Returns the visible (non-ANSI) width of a string.
fn visible_width(s: &str) -> usize {
    let mut width = 0usize;
    let mut in_escape = false;

    for ch in s.chars() {
        if in_escape {
            if ch.is_ascii_alphabetic() {
                in_escape = false;
            }
        } else if ch == '\x1b' {
            in_escape = true;
        } else {
            width += 1;
        }
    }

    width
}

/// Writes a summary line with a right-aligned label and a fixed-width value column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), ReceiptError> {
    let label_pad = label_col_width.saturating_sub(visible_width(label));
    let value_pad = value_col_width.saturating_sub(visible_width(value));

    writeln!(
        out,
        "{:>label_pad$}{label}  {value_pad}{value}",
        "",
        value_pad = " ".repeat(value_pad)
    )
    .map_err(|_err| ReceiptError::IO)
}
