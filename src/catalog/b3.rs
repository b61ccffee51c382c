//! B3 listing endpoints
//!
//! The exchange expects the request parameters as base64-encoded JSON appended
//! to the endpoint path. Responses of the listing endpoints are paginated:
//! `{ "page": {...}, "results": [...] }`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::events::{null_as_empty, CashDividend, CorporateEvents, StockDividend, Subscription};
use super::Security;

const LISTED_COMPANIES_URL: &str =
    "https://sistemaswebb3-listados.b3.com.br/listedCompaniesProxy/CompanyCall/GetInitialCompanies";
const COMPANY_SUPPLEMENT_URL: &str =
    "https://sistemaswebb3-listados.b3.com.br/listedCompaniesProxy/CompanyCall/GetListedSupplementCompany";
const LISTED_FUNDS_URL: &str =
    "https://sistemaswebb3-listados.b3.com.br/fundsProxy/fundsCall/GetListedFundsSIG";
const FUND_DETAIL_URL: &str =
    "https://sistemaswebb3-listados.b3.com.br/fundsProxy/fundsCall/GetDetailFundSIG";
const FUND_SUPPLEMENT_URL: &str =
    "https://sistemaswebb3-listados.b3.com.br/fundsProxy/fundsCall/GetListedSupplementFunds";

/// Fund type of real estate investment funds (FII)
const REAL_ESTATE_FUND_TYPE: u32 = 7;

fn encoded_url<T: Serialize>(base: &str, payload: &T) -> String {
    // Serializing a plain struct can't fail
    let json = serde_json::to_string(payload).unwrap_or_default();
    format!("{}/{}", base, STANDARD.encode(json))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompaniesPageRequest<'a> {
    language: &'a str,
    page_number: u32,
    page_size: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FundsPageRequest {
    type_fund: u32,
    page_number: u32,
    page_size: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FundDetailRequest<'a> {
    type_fund: u32,
    identifier_fund: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompanySupplementRequest<'a> {
    issuing_company: &'a str,
    language: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FundSupplementRequest<'a> {
    cnpj: &'a str,
    identifier_fund: &'a str,
    type_fund: u32,
}

pub fn listed_companies_url(page_number: u32, page_size: u32, language: &str) -> String {
    encoded_url(
        LISTED_COMPANIES_URL,
        &CompaniesPageRequest {
            language,
            page_number,
            page_size,
        },
    )
}

pub fn listed_funds_url(page_number: u32, page_size: u32) -> String {
    encoded_url(
        LISTED_FUNDS_URL,
        &FundsPageRequest {
            type_fund: REAL_ESTATE_FUND_TYPE,
            page_number,
            page_size,
        },
    )
}

pub fn fund_detail_url(acronym: &str) -> String {
    encoded_url(
        FUND_DETAIL_URL,
        &FundDetailRequest {
            type_fund: REAL_ESTATE_FUND_TYPE,
            identifier_fund: acronym,
        },
    )
}

pub fn company_supplement_url(issuing_company: &str, language: &str) -> String {
    encoded_url(
        COMPANY_SUPPLEMENT_URL,
        &CompanySupplementRequest {
            issuing_company,
            language,
        },
    )
}

pub fn fund_supplement_url(cnpj: &str, acronym: &str) -> String {
    encoded_url(
        FUND_SUPPLEMENT_URL,
        &FundSupplementRequest {
            cnpj,
            identifier_fund: acronym,
            type_fund: REAL_ESTATE_FUND_TYPE,
        },
    )
}

/// Pagination info of a listing response
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page_number: u32,
    pub page_size: u32,
    pub total_records: u32,
    pub total_pages: u32,
}

impl PageInfo {
    /// Whether `requested` is the last page. The echoed `page_number` is
    /// not trusted to advance the walk.
    pub fn is_last(&self, requested: u32) -> bool {
        self.total_pages <= requested
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub page: PageInfo,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

/// Entry of the listed companies endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedCompany {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code_cvm: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub issuing_company: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trading_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cnpj: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub segment: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub market: String,
}

impl ListedCompany {
    pub fn to_security(&self) -> Security {
        Security {
            company_name: self.company_name.trim().to_string(),
            code_cvm: self.code_cvm.trim().to_string(),
            segment: self.segment.trim().to_string(),
            market: self.market.trim().to_string(),
            ..Security::equity(&self.issuing_company, &self.trading_name, Some(&self.cnpj))
        }
    }
}

/// Entry of the listed funds endpoint. The registration number is not part of it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedFund {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub segment: String,
    /// Fund code without numbers
    #[serde(default, deserialize_with = "null_as_empty")]
    pub acronym: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub fund_name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundDetailResponse {
    pub detail_fund: FundDetail,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundDetail {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub acronym: String,
    /// Name printed on negotiation notes
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trading_name: String,
    /// One or more codes, space separated
    #[serde(default, deserialize_with = "null_as_empty")]
    pub trading_code: String,
    /// Digits only
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cnpj: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub company_name: String,
}

impl FundDetail {
    /// Build the catalog entry. Some funds don't publish a trading code; they
    /// trade as `<acronym>11`.
    pub fn to_security(&self, listing: &ListedFund) -> Security {
        let acronym = if self.acronym.trim().is_empty() {
            listing.acronym.trim()
        } else {
            self.acronym.trim()
        };
        let trading_code = match self.trading_code.trim() {
            "" => format!("{}11", acronym),
            code => code.to_string(),
        };
        Security {
            company_name: self.company_name.trim().to_string(),
            segment: listing.segment.trim().to_string(),
            ..Security::fund(acronym, &self.trading_name, &trading_code, Some(&self.cnpj))
        }
    }
}

/// Corporate events section of the supplement endpoints
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplementResponse {
    #[serde(default)]
    pub stock_dividends: Option<Vec<StockDividend>>,
    #[serde(default)]
    pub cash_dividends: Option<Vec<CashDividend>>,
    #[serde(default)]
    pub subscriptions: Option<Vec<Subscription>>,
}

impl SupplementResponse {
    /// The company endpoint answers with a one-element array, the fund endpoint with an object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        match value {
            serde_json::Value::Array(items) => match items.into_iter().next() {
                Some(first) => serde_json::from_value(first),
                None => Ok(Self::default()),
            },
            serde_json::Value::Null => Ok(Self::default()),
            other => serde_json::from_value(other),
        }
    }

    pub fn into_events(self) -> CorporateEvents {
        CorporateEvents {
            stock_dividends: self.stock_dividends.unwrap_or_default(),
            cash_dividends: self.cash_dividends.unwrap_or_default(),
            subscriptions: self.subscriptions.unwrap_or_default(),
        }
    }
}
