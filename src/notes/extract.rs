//! Deal Extractor
//!
//! Reads one detected note section and folds it into the notes parsed so
//! far: sections with an already seen note number extend that note.

use chrono::NaiveDate;

use super::dialect::Dialect;
use super::{DealType, NegotiationNote};
use crate::config::DateFormat;
use crate::error::NoteError;
use crate::resolver::{AssetResolver, ResolvedAsset};

/// Prefix of the code given to assets that could not be resolved in lenient mode
pub const UNDEFINED_PREFIX: &str = "UNDEF: ";

pub struct NoteExtractor<'a> {
    resolver: &'a AssetResolver,
    note_name: &'a str,
    date_format: DateFormat,
    lenient: bool,
}

impl<'a> NoteExtractor<'a> {
    pub fn new(resolver: &'a AssetResolver, note_name: &'a str, date_format: DateFormat, lenient: bool) -> Self {
        Self {
            resolver,
            note_name,
            date_format,
            lenient,
        }
    }

    /// Extract the note section in `text` into `notes`.
    pub fn extract(&self, text: &str, dialect: Dialect, notes: &mut Vec<NegotiationNote>) -> Result<(), NoteError> {
        let note_name = || self.note_name.to_string();

        let number = dialect
            .note_number(text)
            .ok_or_else(|| NoteError::MissingNoteNumber { note: note_name() })?;
        let holder = dialect
            .holder(text)
            .ok_or_else(|| NoteError::MissingHolder { note: note_name() })?;
        let date = dialect
            .date(text)
            .map(|d| format_date(&d, self.date_format))
            .ok_or_else(|| NoteError::MissingDate { note: note_name() })?;
        let totals = dialect
            .totals(text)
            .ok_or_else(|| NoteError::MissingBuyOrSellSums { note: note_name() })?;
        let fees = dialect.fees(text);

        let index = match notes.iter().position(|n| n.number == number) {
            Some(index) => index,
            None => {
                notes.push(NegotiationNote {
                    number: number.clone(),
                    ..Default::default()
                });
                notes.len() - 1
            }
        };
        let note = &mut notes[index];
        note.holder = holder;
        note.date = date;

        if fees != 0.0 {
            note.fees = super::fees::round2(note.fees + fees);
        }
        if totals.buy != 0.0 {
            note.buy_total = totals.buy;
        }
        if totals.sell != 0.0 {
            note.sell_total = totals.sell;
        }

        for line in dialect.deal_lines(text) {
            let asset = self.resolve(&line.title, line.hint.as_deref())?;
            note.add_deal(line.deal_type, asset, line.quantity, line.value);
        }

        log::debug!(
            "Extracted {} note {} from {} ({} deals so far)",
            dialect,
            number,
            self.note_name,
            note.deals.len()
        );
        Ok(())
    }

    fn resolve(&self, title: &str, hint: Option<&str>) -> Result<ResolvedAsset, NoteError> {
        match self.resolver.resolve(title, hint) {
            Ok(asset) => Ok(asset),
            Err(e) if self.lenient => {
                log::warn!("Unknown asset '{}' in note {}, keeping it undefined", e.title, self.note_name);
                Ok(ResolvedAsset {
                    code: format!("{}{}", UNDEFINED_PREFIX, e.title),
                    cnpj: None,
                    is_fund: false,
                })
            }
            Err(e) => Err(NoteError::UnknownAsset {
                note: self.note_name.to_string(),
                title: e.title,
            }),
        }
    }
}

impl NegotiationNote {
    /// Add a trade line, merging it into the deal with the same code and direction.
    /// Merged sell lines reduce the quantity of the sell deal.
    pub fn add_deal(&mut self, deal_type: DealType, asset: ResolvedAsset, quantity: i64, value: f64) {
        match self
            .deals
            .iter_mut()
            .find(|d| d.code == asset.code && d.deal_type == deal_type)
        {
            Some(deal) => {
                deal.price += value;
                match deal_type {
                    DealType::Buy => deal.quantity += quantity,
                    DealType::Sell => deal.quantity -= quantity,
                }
            }
            None => self.deals.push(super::Deal {
                deal_type,
                code: asset.code,
                quantity,
                average: 0.0,
                price: super::fees::round2(value),
                date: self.date.clone(),
                cnpj: asset.cnpj.unwrap_or_default(),
                is_fund: asset.is_fund,
            }),
        }
    }
}

/// Convert a `dd/MM/yyyy` or `yyyy-MM-dd` date into `format`.
/// Unrecognized dates are returned unchanged.
pub fn format_date(date: &str, format: DateFormat) -> String {
    let date = date.trim();
    let parsed = NaiveDate::parse_from_str(date, "%d/%m/%Y").or_else(|_| NaiveDate::parse_from_str(date, "%Y-%m-%d"));
    match parsed {
        Ok(parsed) => match format {
            DateFormat::DayMonthYear => parsed.format("%d/%m/%Y").to_string(),
            DateFormat::YearMonthDay => parsed.format("%Y-%m-%d").to_string(),
        },
        Err(_) => date.to_string(),
    }
}
