//! Broker layouts ("dialects") of negotiation notes.
//!
//! Each dialect knows how to find the note number, holder, trading date,
//! buy/sell summary, fee lines and trade lines in the text of a note. A note
//! section belongs to a dialect when both its summary and note number
//! patterns are present.

use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::{parse_brazilian_decimal, DealType};
use crate::resolver::class_suffix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Clear and Rico (XP group) notes
    ClearRico,
    Inter,
    Nubank,
}

/// One trade line, before asset resolution
#[derive(Debug, Clone, PartialEq)]
pub struct DealLine {
    pub deal_type: DealType,
    /// Text handed to the resolver
    pub title: String,
    /// Share class printed apart from the title
    pub hint: Option<String>,
    pub quantity: i64,
    /// Gross value of the line
    pub value: f64,
}

/// Buy and sell sums of the note summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub buy: f64,
    pub sell: f64,
}

struct Patterns {
    note_number: Regex,
    holder: Regex,
    /// Fixed holder name; otherwise the first capture of `holder`, lowercased
    holder_name: Option<&'static str>,
    date: Regex,
    /// Named groups `buy` and `sell`
    summary: Regex,
    /// First capture is the fee value
    fees: Vec<Regex>,
    deal_line: Regex,
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| Regex::new(p).unwrap()).collect()
}

static CLEAR_RICO: Lazy<Patterns> = Lazy::new(|| Patterns {
    note_number: Regex::new(r"(?i)Nr\. nota\s+(\d+)").unwrap(),
    holder: Regex::new(r"(?i)data.*\s+\d{2}/\d{2}/\d{4}\s+(\w+)").unwrap(),
    holder_name: None,
    date: Regex::new(r"(?i)data.*\s+(\d{2}/\d{2}/\d{4})").unwrap(),
    summary: Regex::new(
        r"\d[\d,.]*\s+(?P<sell>\d[\d,.]*)\s+(?P<buy>\d[\d,.]*)\s+\d[\d,.]*\s+\d[\d,.]*\s+\d[\d,.]*\s+\d[\d,.]*\s+\d[\d,.]*\s*Resumo dos Negócios",
    )
    .unwrap(),
    fees: compile(&[
        r"(\d[\d,.]*)\nTaxa de liquidação",
        r"(\d[\d,.]*)\nTaxa de Registro",
        r"(\d[\d,.]*)\nTaxa de termo/opções",
        r"(\d[\d,.]*)\nTaxa A.N.A.",
        r"(\d[\d,.]*)\nEmolumentos",
        r"(\d[\d,.]*)\nTaxa Operacional",
        r"(\d[\d,.]*)\nExecução",
        r"(\d[\d,.]*)\nTaxa de Custódia",
        r"(\d[\d,.]*)\nImpostos",
        r"(\d[\d,.]*)\nI\.R\.R\.F\. s/ operações, base",
        r"(\d[\d,.]*)\nOutros",
    ]),
    deal_line: Regex::new(
        r"1-BOVESPA\s+(?P<op>\w)\s+(?P<market>\w+)\s+(?P<title>[\t \s+\w/.]+)\s+(?:#\w*\s+)?(?P<qty>\d+)\s+(?P<unit>[\w,]+)\s+(?P<total>[\w,.]+)\s+",
    )
    .unwrap(),
});

static INTER: Lazy<Patterns> = Lazy::new(|| Patterns {
    note_number: Regex::new(r"(?i)N[º°o]\.?\s*Nota:?\s+(\d+)").unwrap(),
    holder: Regex::new(r"(?i)INTER\s+(?:DISTRIBUIDORA|DTVM)").unwrap(),
    holder_name: Some("inter"),
    date: Regex::new(r"(?i)Data\s+Preg[ãa]o:?\s+(\d{2}/\d{2}/\d{4})").unwrap(),
    summary: Regex::new(
        r"(?i)Vendas\s+[àa]\s+Vista\s+(?P<sell>\d[\d.]*,\d{2})\s+Compras\s+[àa]\s+Vista\s+(?P<buy>\d[\d.]*,\d{2})",
    )
    .unwrap(),
    fees: compile(&[
        r"(?i)Taxa\s+de\s+Liquida[çc][ãa]o\s+(\d[\d.]*,\d+)",
        r"(?i)Taxa\s+de\s+Registro\s+(\d[\d.]*,\d+)",
        r"(?i)Taxa\s+de\s+Termo/Op[çc][õo]es\s+(\d[\d.]*,\d+)",
        r"(?i)Taxa\s+A\.N\.A\.\s+(\d[\d.]*,\d+)",
        r"(?i)Emolumentos\s+(\d[\d.]*,\d+)",
        r"(?i)Taxa\s+Operacional\s+(\d[\d.]*,\d+)",
        r"(?i)Execu[çc][ãa]o\s+(\d[\d.]*,\d+)",
        r"(?i)Taxa\s+de\s+Cust[óo]dia\s+(\d[\d.]*,\d+)",
        r"(?i)Impostos\s+(\d[\d.]*,\d+)",
        r"(?i)Outros\s+(\d[\d.]*,\d+)",
    ]),
    deal_line: Regex::new(
        r"(?i)B3\s+RV\s+LISTADO\s+(?P<op>[CV])\s+(?P<market>VISTA|FRACIONARIO)\s+(?P<title>[A-Z0-9]+)\s+(?P<class>[A-Z0-9]+)\s+(?P<qty>\d[\d.]*)\s+(?P<unit>\d[\d.]*,\d+)\s+(?P<total>\d[\d.]*,\d+)\s+[DC]\b",
    )
    .unwrap(),
});

static NUBANK: Lazy<Patterns> = Lazy::new(|| Patterns {
    note_number: Regex::new(r"(?i)N[úu]mero\s+da\s+nota\s+(\d+)").unwrap(),
    holder: Regex::new(r"(?i)NU\s+INVEST").unwrap(),
    holder_name: Some("nubank"),
    date: Regex::new(r"(?i)Data\s+do\s+preg[ãa]o\s+(\d{2}/\d{2}/\d{4})").unwrap(),
    summary: Regex::new(r"(?i)Compras\s+(?P<buy>\d[\d.]*,\d{2})\s+Vendas\s+(?P<sell>\d[\d.]*,\d{2})").unwrap(),
    fees: compile(&[
        r"(?i)Taxa\s+de\s+liquida[çc][ãa]o\s+(\d[\d.]*,\d+)",
        r"(?i)Taxa\s+de\s+registro\s+(\d[\d.]*,\d+)",
        r"(?i)Emolumentos\s+(\d[\d.]*,\d+)",
        r"(?i)Corretagem\s+(\d[\d.]*,\d+)",
        r"(?i)ISS\s+(\d[\d.]*,\d+)",
        r"(?i)Outras\s+(\d[\d.]*,\d+)",
    ]),
    deal_line: Regex::new(
        r"(?im)^(?P<op>[CV])\s+BOVESPA\s+(?P<market>VISTA|FRACIONARIO)\s+(?P<title>[A-Z0-9]+)\s+(?P<name>.+?)\s+(?P<qty>\d[\d.]*)\s+(?P<unit>\d[\d.]*,\d+)\s+(?P<total>\d[\d.]*,\d+)\s+[DC]$",
    )
    .unwrap(),
});

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::ClearRico, Dialect::Inter, Dialect::Nubank];

    /// Dialect whose summary and note number are both present in `text`
    pub fn detect(text: &str) -> Option<Dialect> {
        Self::ALL.into_iter().find(|dialect| {
            let patterns = dialect.patterns();
            patterns.summary.is_match(text) && patterns.note_number.is_match(text)
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ClearRico => "Clear/Rico",
            Self::Inter => "Inter",
            Self::Nubank => "Nubank",
        }
    }

    fn patterns(&self) -> &'static Patterns {
        match self {
            Self::ClearRico => &CLEAR_RICO,
            Self::Inter => &INTER,
            Self::Nubank => &NUBANK,
        }
    }

    pub fn note_number(&self, text: &str) -> Option<String> {
        first_capture(&self.patterns().note_number, text)
    }

    /// Holder name, lowercased
    pub fn holder(&self, text: &str) -> Option<String> {
        let patterns = self.patterns();
        match patterns.holder_name {
            Some(name) => patterns.holder.is_match(text).then(|| name.to_string()),
            None => first_capture(&patterns.holder, text).map(|h| h.to_lowercase()),
        }
    }

    /// Trading date as printed (`dd/MM/yyyy`)
    pub fn date(&self, text: &str) -> Option<String> {
        first_capture(&self.patterns().date, text)
    }

    pub fn totals(&self, text: &str) -> Option<Totals> {
        let caps = self.patterns().summary.captures(text)?;
        Some(Totals {
            buy: parse_brazilian_decimal(caps.name("buy")?.as_str())?,
            sell: parse_brazilian_decimal(caps.name("sell")?.as_str())?,
        })
    }

    /// Sum of every fee line found
    pub fn fees(&self, text: &str) -> f64 {
        self.patterns()
            .fees
            .iter()
            .filter_map(|pattern| first_capture(pattern, text))
            .filter_map(|value| parse_brazilian_decimal(&value))
            .sum()
    }

    pub fn deal_lines(&self, text: &str) -> Vec<DealLine> {
        self.patterns()
            .deal_line
            .captures_iter(text)
            .filter_map(|caps| self.deal_line(&caps))
            .collect()
    }

    fn deal_line(&self, caps: &Captures<'_>) -> Option<DealLine> {
        let deal_type = match caps.name("op")?.as_str() {
            "C" | "c" => DealType::Buy,
            _ => DealType::Sell,
        };
        let quantity = caps.name("qty")?.as_str().replace('.', "").parse().ok()?;
        let value = parse_brazilian_decimal(caps.name("total")?.as_str())?;
        let raw_title = caps.name("title")?.as_str();

        let (title, hint) = match self {
            Self::ClearRico => (normalize_title(raw_title), None),
            Self::Inter => (
                strip_fractional(raw_title).to_uppercase(),
                caps.name("class").map(|c| c.as_str().to_uppercase()),
            ),
            Self::Nubank => (
                strip_fractional(raw_title).to_uppercase(),
                caps.name("name").and_then(|name| class_token(name.as_str())),
            ),
        };

        Some(DealLine {
            deal_type,
            title,
            hint,
            quantity,
            value,
        })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Fractional lot tickers carry a trailing "F" ("ITSA4F" -> "ITSA4")
pub fn strip_fractional(ticker: &str) -> &str {
    let ticker = ticker.trim();
    match ticker.strip_suffix(['F', 'f']) {
        Some(base) if base.ends_with(|c: char| c.is_ascii_digit()) => base,
        _ => ticker,
    }
}

/// First share class token of a security name ("ITAUSA PN N1" -> "PN")
fn class_token(name: &str) -> Option<String> {
    name.split_whitespace()
        .find(|token| class_suffix(token).is_some())
        .map(str::to_uppercase)
}
