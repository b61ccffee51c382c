//! Compact persisted form of the catalog.
//!
//! Records use single-letter keys to keep the bootstrap file small. Equities
//! and funds share one record type, discriminated by `g`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::events::{CashDividend, CorporateEvents, StockDividend, Subscription};
use super::{split_codes, Catalog, Security, SecurityKind};
use crate::error::CatalogError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredStockDividend {
    /// assetIssued
    #[serde(default)]
    pub a: String,
    /// factor
    #[serde(default)]
    pub b: String,
    /// approvedOn
    #[serde(default)]
    pub c: String,
    /// isinCode
    #[serde(default)]
    pub d: String,
    /// label
    #[serde(default)]
    pub e: String,
    /// lastDatePrior
    #[serde(default)]
    pub f: String,
    /// remarks
    #[serde(default)]
    pub g: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredCashDividend {
    /// assetIssued
    #[serde(default)]
    pub a: String,
    /// paymentDate
    #[serde(default)]
    pub b: String,
    /// rate
    #[serde(default)]
    pub c: String,
    /// relatedTo
    #[serde(default)]
    pub d: String,
    /// approvedOn
    #[serde(default)]
    pub e: String,
    /// isinCode
    #[serde(default)]
    pub f: String,
    /// label
    #[serde(default)]
    pub g: String,
    /// lastDatePrior
    #[serde(default)]
    pub h: String,
    /// remarks
    #[serde(default)]
    pub i: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSubscription {
    /// assetIssued
    #[serde(default)]
    pub a: String,
    /// percentage
    #[serde(default)]
    pub b: String,
    /// priceUnit
    #[serde(default)]
    pub c: String,
    /// tradingPeriod
    #[serde(default)]
    pub d: String,
    /// approvedOn
    #[serde(default)]
    pub e: String,
    /// isinCode
    #[serde(default)]
    pub f: String,
    /// label
    #[serde(default)]
    pub g: String,
    /// lastDatePrior
    #[serde(default)]
    pub h: String,
    /// remarks
    #[serde(default)]
    pub i: String,
    /// subscriptionDate
    #[serde(default)]
    pub j: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredSecurity {
    /// codeCVM
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub a: String,
    /// issuingCompany
    pub b: String,
    /// companyName
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub c: String,
    /// tradingName
    pub d: String,
    /// cnpj
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub e: String,
    /// tradingCodes (funds only, space separated)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub f: String,
    /// isFund
    #[serde(default)]
    pub g: bool,
    /// segment
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub j: String,
    /// market
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub m: String,
    /// stockDividends
    #[serde(default)]
    pub n: Vec<StoredStockDividend>,
    /// cashDividends
    #[serde(default)]
    pub o: Vec<StoredCashDividend>,
    /// subscriptions
    #[serde(default)]
    pub p: Vec<StoredSubscription>,
}

impl From<&StockDividend> for StoredStockDividend {
    fn from(d: &StockDividend) -> Self {
        Self {
            a: d.asset_issued.clone(),
            b: d.factor.clone(),
            c: d.approved_on.clone(),
            d: d.isin_code.clone(),
            e: d.label.clone(),
            f: d.last_date_prior.clone(),
            g: d.remarks.clone(),
        }
    }
}

impl From<StoredStockDividend> for StockDividend {
    fn from(s: StoredStockDividend) -> Self {
        Self {
            asset_issued: s.a,
            factor: s.b,
            approved_on: s.c,
            isin_code: s.d,
            label: s.e,
            last_date_prior: s.f,
            remarks: s.g,
        }
    }
}

impl From<&CashDividend> for StoredCashDividend {
    fn from(d: &CashDividend) -> Self {
        Self {
            a: d.asset_issued.clone(),
            b: d.payment_date.clone(),
            c: d.rate.clone(),
            d: d.related_to.clone(),
            e: d.approved_on.clone(),
            f: d.isin_code.clone(),
            g: d.label.clone(),
            h: d.last_date_prior.clone(),
            i: d.remarks.clone(),
        }
    }
}

impl From<StoredCashDividend> for CashDividend {
    fn from(s: StoredCashDividend) -> Self {
        Self {
            asset_issued: s.a,
            payment_date: s.b,
            rate: s.c,
            related_to: s.d,
            approved_on: s.e,
            isin_code: s.f,
            label: s.g,
            last_date_prior: s.h,
            remarks: s.i,
        }
    }
}

impl From<&Subscription> for StoredSubscription {
    fn from(d: &Subscription) -> Self {
        Self {
            a: d.asset_issued.clone(),
            b: d.percentage.clone(),
            c: d.price_unit.clone(),
            d: d.trading_period.clone(),
            e: d.approved_on.clone(),
            f: d.isin_code.clone(),
            g: d.label.clone(),
            h: d.last_date_prior.clone(),
            i: d.remarks.clone(),
            j: d.subscription_date.clone(),
        }
    }
}

impl From<StoredSubscription> for Subscription {
    fn from(s: StoredSubscription) -> Self {
        Self {
            asset_issued: s.a,
            percentage: s.b,
            price_unit: s.c,
            trading_period: s.d,
            approved_on: s.e,
            isin_code: s.f,
            label: s.g,
            last_date_prior: s.h,
            remarks: s.i,
            subscription_date: s.j,
        }
    }
}

impl From<&Security> for StoredSecurity {
    fn from(s: &Security) -> Self {
        Self {
            a: s.code_cvm.clone(),
            b: s.issuing_company.clone(),
            c: s.company_name.clone(),
            d: s.trading_name.clone(),
            e: s.cnpj.clone().unwrap_or_default(),
            f: s.trading_codes.join(" "),
            g: s.is_fund(),
            j: s.segment.clone(),
            m: s.market.clone(),
            n: s.events.stock_dividends.iter().map(Into::into).collect(),
            o: s.events.cash_dividends.iter().map(Into::into).collect(),
            p: s.events.subscriptions.iter().map(Into::into).collect(),
        }
    }
}

impl From<StoredSecurity> for Security {
    fn from(s: StoredSecurity) -> Self {
        Self {
            issuing_company: s.b,
            trading_name: s.d,
            company_name: s.c,
            trading_codes: split_codes(&s.f),
            cnpj: Some(s.e).filter(|c| !c.is_empty()),
            kind: if s.g { SecurityKind::Fund } else { SecurityKind::Equity },
            code_cvm: s.a,
            segment: s.j,
            market: s.m,
            events: CorporateEvents {
                stock_dividends: s.n.into_iter().map(Into::into).collect(),
                cash_dividends: s.o.into_iter().map(Into::into).collect(),
                subscriptions: s.p.into_iter().map(Into::into).collect(),
            },
        }
    }
}

impl Catalog {
    /// Parse a compact JSON snapshot.
    pub fn from_snapshot_json(json: &str) -> Result<Self, CatalogError> {
        let stored: Vec<StoredSecurity> = serde_json::from_str(json)?;
        Ok(Self::from_securities(
            stored.into_iter().map(Security::from).collect(),
        ))
    }

    pub fn to_snapshot_json(&self) -> Result<String, CatalogError> {
        let stored: Vec<StoredSecurity> = self.securities().iter().map(Into::into).collect();
        Ok(serde_json::to_string(&stored)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = fs::read_to_string(path)?;
        let catalog = Self::from_snapshot_json(&json)?;
        log::info!("Loaded {} securities from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    pub fn save(&self, path: &Path) -> Result<(), CatalogError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_snapshot_json()?)?;
        log::info!("Saved {} securities to {}", self.len(), path.display());
        Ok(())
    }
}

/// Default snapshot location in the user's cache directory
pub fn default_snapshot_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("negotiation-notes").join("catalog.json"))
}
