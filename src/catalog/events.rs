//! Corporate events attached to a listed security.
//!
//! The exchange publishes three kinds of events per security: stock dividends
//! (splits, reverse splits and bonus shares), cash dividends and subscription
//! rights. All of them share a `last_date_prior` (record date) that orders them.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// The exchange sends `null` for blank text fields.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Kind of corporate event, used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    StockDividend,
    CashDividend,
    Subscription,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StockDividend => "stock dividends",
            Self::CashDividend => "cash dividends",
            Self::Subscription => "subscriptions",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common behaviour of the three event records.
pub trait CorporateEvent: Clone + PartialEq {
    const KIND: EventKind;

    /// Record date as printed by the exchange (`dd/MM/yyyy`).
    fn last_date_prior(&self) -> &str;

    /// Record date parsed, if it is a valid date.
    fn record_date(&self) -> Option<NaiveDate> {
        parse_exchange_date(self.last_date_prior())
    }
}

/// Parse a `dd/MM/yyyy` exchange date.
pub fn parse_exchange_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%d/%m/%Y").ok()
}

/// Split, reverse split or bonus shares.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockDividend {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub asset_issued: String,
    /// Multiplier, e.g. "100,00000000000"
    #[serde(default, deserialize_with = "null_as_empty")]
    pub factor: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub approved_on: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub isin_code: String,
    /// DESDOBRAMENTO, GRUPAMENTO or BONIFICACAO
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_date_prior: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub remarks: String,
}

impl CorporateEvent for StockDividend {
    const KIND: EventKind = EventKind::StockDividend;

    fn last_date_prior(&self) -> &str {
        &self.last_date_prior
    }
}

/// Dividends and interest on equity paid in cash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashDividend {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub asset_issued: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub payment_date: String,
    /// Value per share, e.g. "0,05323529400"
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rate: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub related_to: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub approved_on: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub isin_code: String,
    /// DIVIDENDO, JRS CAP PROPRIO, RENDIMENTO...
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_date_prior: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub remarks: String,
}

impl CorporateEvent for CashDividend {
    const KIND: EventKind = EventKind::CashDividend;

    fn last_date_prior(&self) -> &str {
        &self.last_date_prior
    }
}

/// Subscription right.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub asset_issued: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub percentage: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub price_unit: String,
    /// e.g. "10/05/2023 a 18/05/2023"
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trading_period: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub subscription_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub approved_on: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub isin_code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub last_date_prior: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub remarks: String,
}

impl CorporateEvent for Subscription {
    const KIND: EventKind = EventKind::Subscription;

    fn last_date_prior(&self) -> &str {
        &self.last_date_prior
    }
}

/// All events known for one security, each list newest record date first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateEvents {
    #[serde(default)]
    pub stock_dividends: Vec<StockDividend>,
    #[serde(default)]
    pub cash_dividends: Vec<CashDividend>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

impl CorporateEvents {
    pub fn is_empty(&self) -> bool {
        self.stock_dividends.is_empty() && self.cash_dividends.is_empty() && self.subscriptions.is_empty()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        match kind {
            EventKind::StockDividend => self.stock_dividends.len(),
            EventKind::CashDividend => self.cash_dividends.len(),
            EventKind::Subscription => self.subscriptions.len(),
        }
    }
}
