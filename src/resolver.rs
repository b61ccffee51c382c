//! Asset Resolver
//!
//! Turns the security titles printed on negotiation notes ("ITAUSA PN N1",
//! "FII CSHG URB HGRU11 CI ER", "KDIF11") into trading codes. Lookup order:
//! 1. User overrides (brokerage specific aliases)
//! 2. Fund titles, which carry the fund's trading name and code
//! 3. Equity name or ticker root plus a share class suffix, then funds by
//!    issuing company or trading name

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::catalog::{Catalog, CatalogStore, Security};

/// `<marker> <trading name> <code> CI ...`
static FUND_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^((?:FII|FIAGRO|FI)\s.*?)\s(\S+?)\sCI\b").unwrap());

/// Share class token and its code suffixes. The first suffix is the one used.
const CLASS_SUFFIXES: &[(&str, &[&str])] = &[
    ("ON", &["3"]),
    ("PN", &["4"]),
    ("PNA", &["4"]),
    ("PNB", &["5"]),
    ("UNT", &["11"]),
    ("DR1", &["31"]),
    ("DR2", &["32"]),
    ("DR3", &["33"]),
    ("BDR", &["34", "35", "36", "37", "38", "39"]),
    ("REIT", &["35", "36"]),
];

const DEFAULT_SUFFIX: &str = "3";

/// Candidate code suffixes for a share class token, e.g. "PN" -> ["4"]
pub fn class_suffixes(token: &str) -> Option<&'static [&'static str]> {
    let token = token.trim().to_uppercase();
    CLASS_SUFFIXES
        .iter()
        .find(|(class, _)| *class == token)
        .map(|(_, suffixes)| *suffixes)
}

/// Code suffix for a share class token, e.g. "UNT" -> "11"
pub fn class_suffix(token: &str) -> Option<&'static str> {
    class_suffixes(token).and_then(|suffixes| suffixes.first().copied())
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("No asset found for '{title}'")]
pub struct UnknownAsset {
    pub title: String,
}

/// Caller supplied alias, checked before the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetOverride {
    /// Code returned on match. A `_` suffix ("KDIF11_2") lets several
    /// names map to the same code and is stripped from results.
    pub code: String,
    /// Text searched in note titles
    pub name: String,
    pub cnpj: Option<String>,
    pub is_fund: bool,
}

impl AssetOverride {
    fn trading_code(&self) -> &str {
        self.code.split('_').next().unwrap_or(&self.code)
    }

    fn matches(&self, title: &str) -> bool {
        (!self.name.is_empty() && title.contains(self.name.as_str()))
            || title.eq_ignore_ascii_case(self.trading_code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub code: String,
    pub cnpj: Option<String>,
    pub is_fund: bool,
}

impl ResolvedAsset {
    fn from_security(code: String, security: &Security) -> Self {
        Self {
            code,
            cnpj: security.cnpj.clone(),
            is_fund: security.is_fund(),
        }
    }
}

pub struct AssetResolver {
    store: Arc<CatalogStore>,
    overrides: Vec<AssetOverride>,
}

impl AssetResolver {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self {
            store,
            overrides: Vec::new(),
        }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn overrides(&self) -> &[AssetOverride] {
        &self.overrides
    }

    /// Register an alias. Returns false if an override with the same code exists.
    pub fn register_override(&mut self, code: &str, name: &str, cnpj: Option<&str>, is_fund: bool) -> bool {
        let code = code.trim();
        if self.overrides.iter().any(|o| o.code == code) {
            return false;
        }
        self.overrides.push(AssetOverride {
            code: code.to_string(),
            name: name.trim().to_string(),
            cnpj: cnpj.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
            is_fund,
        });
        true
    }

    /// Resolve a note title. `hint` is a share class token ("PN", "UNT") or
    /// a numeric code suffix ("4") printed apart from the title.
    pub fn resolve(&self, title: &str, hint: Option<&str>) -> Result<ResolvedAsset, UnknownAsset> {
        let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
        let unknown = || UnknownAsset { title: title.clone() };
        if title.is_empty() {
            return Err(unknown());
        }

        if let Some(alias) = self.overrides.iter().find(|o| o.matches(&title)) {
            return Ok(ResolvedAsset {
                code: alias.trading_code().to_string(),
                cnpj: alias.cnpj.clone(),
                is_fund: alias.is_fund,
            });
        }

        let catalog = self.store.snapshot();
        resolve_fund_title(&catalog, &title)
            .or_else(|| resolve_by_name(&catalog, &title, hint))
            .ok_or_else(unknown)
    }
}

fn resolve_fund_title(catalog: &Catalog, title: &str) -> Option<ResolvedAsset> {
    let caps = FUND_TITLE.captures(title)?;
    let name = caps.get(1)?.as_str().trim();
    let code = caps.get(2)?.as_str().trim();

    if let Some(fund) = catalog.funds().find(|f| f.trading_name.eq_ignore_ascii_case(name)) {
        return Some(ResolvedAsset::from_security(primary_fund_code(fund), fund));
    }

    // Trading names change over time; the code printed next to them is stable
    catalog
        .funds()
        .find(|f| f.has_code(code))
        .map(|fund| ResolvedAsset::from_security(code.to_uppercase(), fund))
}

fn resolve_by_name(catalog: &Catalog, title: &str, hint: Option<&str>) -> Option<ResolvedAsset> {
    let tokens: Vec<&str> = title.split_whitespace().collect();
    let class_index = tokens
        .iter()
        .skip(1)
        .position(|t| class_suffix(t).is_some())
        .map(|i| i + 1);

    let (name_tokens, class_token) = match class_index {
        Some(i) => (&tokens[..i], Some(tokens[i])),
        None => (&tokens[..], None),
    };
    let name = name_tokens.join(" ");
    let base = name.trim_end_matches(|c: char| c.is_ascii_digit()).trim_end();
    let digits = &name[base.len()..];
    if base.is_empty() {
        return None;
    }

    let suffix = hint
        .and_then(hint_suffix)
        .or_else(|| class_token.and_then(class_suffix))
        .or_else(|| Some(digits.trim()).filter(|d| !d.is_empty()))
        .unwrap_or(DEFAULT_SUFFIX);

    if let Some(equity) = catalog.equities().find(|s| matches_name(s, base)) {
        let code = format!("{}{}", equity.issuing_company, suffix);
        return Some(ResolvedAsset::from_security(code, equity));
    }

    catalog.funds().find(|s| matches_name(s, base)).map(|fund| {
        let candidate = format!("{}{}", fund.issuing_company, suffix);
        let code = if fund.has_code(&candidate) {
            candidate
        } else {
            primary_fund_code(fund)
        };
        ResolvedAsset::from_security(code, fund)
    })
}

/// Numeric hints are already a code suffix
fn hint_suffix(hint: &str) -> Option<&str> {
    let hint = hint.trim();
    if !hint.is_empty() && hint.chars().all(|c| c.is_ascii_digit()) {
        return Some(hint);
    }
    class_suffix(hint)
}

fn matches_name(security: &Security, name: &str) -> bool {
    security.issuing_company.eq_ignore_ascii_case(name) || security.trading_name.eq_ignore_ascii_case(name)
}

fn primary_fund_code(fund: &Security) -> String {
    fund.primary_code()
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}11", fund.issuing_company))
}
