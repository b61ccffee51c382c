//! Asset Directory
//!
//! Reference catalog of listed equities and real estate funds, with their
//! corporate event history:
//! - `events`: stock dividend, cash dividend and subscription records
//! - `merge`: de-duplicating, chronological merge of event lists
//! - `snapshot`: compact persisted form used to bootstrap the catalog
//! - `b3`: exchange endpoints and raw response models
//! - `fetcher`: paginated refresh with retries and rate-limit backoff
//! - `scheduler`: periodic refresh with an injectable clock

pub mod b3;
pub mod events;
pub mod fetcher;
pub mod merge;
pub mod scheduler;
pub mod snapshot;

use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use events::CorporateEvents;
use merge::merge_events;

/// Whether a security is a company share or a listed fund
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SecurityKind {
    Equity,
    Fund,
}

/// Canonical catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    /// Letters-only ticker root, e.g. "ITSA" or "HGRU"
    pub issuing_company: String,
    /// Name as printed on negotiation notes, e.g. "ITAUSA" or "FII CSHG URB"
    pub trading_name: String,
    pub company_name: String,
    /// Full trading codes. Funds may list more than one (IPO windows); empty for equities.
    pub trading_codes: Vec<String>,
    /// Registration number, digits only
    pub cnpj: Option<String>,
    pub kind: SecurityKind,
    pub code_cvm: String,
    pub segment: String,
    pub market: String,
    pub events: CorporateEvents,
}

impl Security {
    pub fn equity(issuing_company: &str, trading_name: &str, cnpj: Option<&str>) -> Self {
        Self {
            issuing_company: issuing_company.trim().to_string(),
            trading_name: trading_name.trim().to_string(),
            company_name: String::new(),
            trading_codes: Vec::new(),
            cnpj: cnpj.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            kind: SecurityKind::Equity,
            code_cvm: String::new(),
            segment: String::new(),
            market: String::new(),
            events: CorporateEvents::default(),
        }
    }

    /// `trading_codes` is the whitespace separated code field of the exchange.
    pub fn fund(issuing_company: &str, trading_name: &str, trading_codes: &str, cnpj: Option<&str>) -> Self {
        Self {
            trading_codes: split_codes(trading_codes),
            kind: SecurityKind::Fund,
            ..Self::equity(issuing_company, trading_name, cnpj)
        }
    }

    pub fn is_fund(&self) -> bool {
        self.kind == SecurityKind::Fund
    }

    /// First listed trading code
    pub fn primary_code(&self) -> Option<&str> {
        self.trading_codes.first().map(String::as_str)
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.trading_codes.iter().any(|c| c.eq_ignore_ascii_case(code))
    }

    fn same_company(&self, other: &Security) -> bool {
        self.kind == other.kind && self.issuing_company == other.issuing_company
    }

    /// `incoming` with the history of `self` folded in
    fn superseded_by(&self, incoming: Security) -> Security {
        let cnpj = incoming.cnpj.clone().or_else(|| self.cnpj.clone());
        let events = CorporateEvents {
            stock_dividends: merge_events(&self.events.stock_dividends, &incoming.events.stock_dividends),
            cash_dividends: merge_events(&self.events.cash_dividends, &incoming.events.cash_dividends),
            subscriptions: merge_events(&self.events.subscriptions, &incoming.events.subscriptions),
        };
        Security {
            cnpj,
            events,
            ..incoming
        }
    }
}

/// Split a trading code field such as "XPML11 XPML12" into codes.
pub fn split_codes(field: &str) -> Vec<String> {
    field
        .split_whitespace()
        .map(|c| c.to_uppercase())
        .collect()
}

/// Letters-only root of a trading code ("BTCI11" -> "BTCI").
pub fn code_root(code: &str) -> &str {
    code.trim().trim_end_matches(|c: char| c.is_ascii_digit())
}

/// Ordered collection of securities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    securities: Vec<Security>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_securities(securities: Vec<Security>) -> Self {
        let mut catalog = Self::new();
        for security in securities {
            catalog.upsert(security);
        }
        catalog
    }

    pub fn securities(&self) -> &[Security] {
        &self.securities
    }

    pub fn len(&self) -> usize {
        self.securities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.securities.is_empty()
    }

    pub fn funds(&self) -> impl Iterator<Item = &Security> {
        self.securities.iter().filter(|s| s.is_fund())
    }

    pub fn equities(&self) -> impl Iterator<Item = &Security> {
        self.securities.iter().filter(|s| !s.is_fund())
    }

    fn position_by_name(&self, security: &Security) -> Option<usize> {
        self.securities
            .iter()
            .position(|s| s.trading_name == security.trading_name)
    }

    fn position_by_company(&self, security: &Security) -> Option<usize> {
        self.securities.iter().position(|s| s.same_company(security))
    }

    /// Entry that `security` would supersede, if any.
    /// A trading name match wins over a kind plus issuing company match.
    pub fn find_entry(&self, security: &Security) -> Option<&Security> {
        self.position_by_name(security)
            .or_else(|| self.position_by_company(security))
            .map(|index| &self.securities[index])
    }

    /// Insert a security, or supersede the matching entry in place.
    ///
    /// An entry matches on trading name, or on kind plus issuing company.
    /// When the two point at different entries, both are folded into one so
    /// trading names stay unique. Corporate events are merged and a known
    /// registration number is never replaced by a missing one.
    pub fn upsert(&mut self, security: Security) {
        match (self.position_by_name(&security), self.position_by_company(&security)) {
            (Some(by_name), Some(by_company)) if by_name != by_company => {
                log::debug!(
                    "{} takes over trading name '{}' from {}",
                    security.issuing_company,
                    security.trading_name,
                    self.securities[by_name].issuing_company
                );
                let security = self.securities[by_company].superseded_by(security);
                self.securities[by_company] = self.securities[by_name].superseded_by(security);
                self.securities.remove(by_name);
            }
            (Some(index), _) | (None, Some(index)) => {
                self.securities[index] = self.securities[index].superseded_by(security);
            }
            (None, None) => {
                let events = CorporateEvents {
                    stock_dividends: merge_events(&[], &security.events.stock_dividends),
                    cash_dividends: merge_events(&[], &security.events.cash_dividends),
                    subscriptions: merge_events(&[], &security.events.subscriptions),
                };
                self.securities.push(Security { events, ..security });
            }
        }
    }

    /// Corporate events for a security, by letters-only root ("ALZR") or full code ("ALZR11").
    pub fn corporate_events(&self, code: &str) -> Option<&CorporateEvents> {
        let code = code.trim().to_uppercase();
        let root = code_root(&code);

        self.funds()
            .find(|s| s.has_code(&code))
            .or_else(|| self.funds().find(|s| s.issuing_company == root))
            .or_else(|| self.equities().find(|s| s.issuing_company == root))
            .map(|s| &s.events)
    }
}

/// Shared catalog with a single writer.
///
/// Readers take an immutable snapshot; a refresh builds a new catalog and
/// swaps it in, so lookups never observe a half-merged state.
#[derive(Debug, Default)]
pub struct CatalogStore {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogStore {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<Catalog> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    pub fn replace(&self, catalog: Catalog) -> Arc<Catalog> {
        let catalog = Arc::new(catalog);
        match self.current.write() {
            Ok(mut guard) => *guard = Arc::clone(&catalog),
            Err(poisoned) => *poisoned.into_inner() = Arc::clone(&catalog),
        }
        catalog
    }
}
