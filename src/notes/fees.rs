//! Fee Allocator
//!
//! Spreads the fees of a note over its deals in proportion to their value:
//! buys get their share added, sells get it subtracted. Note totals are
//! adjusted by the buy and sell fee shares.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{DealType, NegotiationNote};

static FORMATTED_CNPJ: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").unwrap());

/// Round to cents
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Price rounding of allocated deals: the value is scaled by ten and passed
/// through single precision before being rounded to cents. Reference figures
/// depend on this exact sequence.
pub fn round_allocated_price(value: f64) -> f64 {
    round2(((10.0 * value) as f32) as f64 / 10.0)
}

/// Distribute the note fees over its deals and compute average prices.
pub fn allocate(mut note: NegotiationNote) -> NegotiationNote {
    let buy_total = note.buy_total;
    let sell_total = note.sell_total;
    let traded = buy_total + sell_total;

    if note.fees != 0.0 && traded != 0.0 {
        let buy_fees = note.fees * buy_total / traded;
        let sell_fees = note.fees * sell_total / traded;

        for deal in &mut note.deals {
            match deal.deal_type {
                DealType::Buy if buy_total != 0.0 => {
                    deal.price = round_allocated_price(deal.price + buy_fees * deal.price / buy_total);
                }
                DealType::Sell if sell_total != 0.0 => {
                    deal.price = round_allocated_price(deal.price - sell_fees * deal.price / sell_total);
                }
                _ => {}
            }
        }

        note.buy_fees = round2(buy_fees);
        note.sell_fees = round2(sell_fees);
        note.buy_total = round2(buy_total + buy_fees);
        note.sell_total = round2(sell_total - sell_fees);
    }

    for deal in &mut note.deals {
        deal.price = round2(deal.price);
        deal.average = if deal.quantity != 0 {
            round2(deal.price.abs() / deal.quantity.unsigned_abs() as f64)
        } else {
            0.0
        };
        deal.cnpj = format_cnpj(&deal.cnpj);
    }

    note
}

/// Format a registration number as `NN.NNN.NNN/NNNN-NN`, restoring leading
/// zeros dropped by upstream sources. Already formatted values are kept.
pub fn format_cnpj(cnpj: &str) -> String {
    let cnpj = cnpj.trim();
    if FORMATTED_CNPJ.is_match(cnpj) {
        return cnpj.to_string();
    }

    let digits = cnpj_digits(cnpj);
    if digits.len() > 14 {
        return digits;
    }
    let digits = format!("{:0>14}", digits);
    format!(
        "{}.{}.{}/{}-{}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..8],
        &digits[8..12],
        &digits[12..14]
    )
}

/// Digits of a registration number, formatted or not
pub fn cnpj_digits(cnpj: &str) -> String {
    cnpj.chars().filter(char::is_ascii_digit).collect()
}
