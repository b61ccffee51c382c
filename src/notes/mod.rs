//! Negotiation Note Parser
//!
//! Opens a brokerage note (trying the candidate passwords), reads its pages,
//! detects each note section's broker layout, extracts the deals and spreads
//! the fees over them.
//!
//! Supported layouts: Clear/Rico, Inter, Nubank.

pub mod dialect;
pub mod document;
pub mod extract;
pub mod fees;

use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::catalog::events::CorporateEvents;
use crate::catalog::CatalogStore;
use crate::config::{DateFormat, ParserConfig};
use crate::error::NoteError;
use crate::resolver::{AssetResolver, ResolvedAsset, UnknownAsset};
use dialect::Dialect;
use document::{open_document, DocumentLoader};
use extract::NoteExtractor;

/// Aliases used by brokers for securities whose printed names differ from the exchange listing
const DEFAULT_OVERRIDES: &[(&str, &str, &str)] = &[
    ("TIET11", "AES TIETE E UNT", "37.663.076/0001-07"),
    ("AESB3", "AES TIETE E ON", "37.663.076/0001-07"),
    ("AESB4", "AES TIETE E PN", "37.663.076/0001-07"),
    ("CSAN11", "COSAN LOG UNT", "50.746.577/0001-15"),
    ("CSAN3", "COSAN LOG ON", "50.746.577/0001-15"),
    ("CSAN4", "COSAN LOG PN", "50.746.577/0001-15"),
    ("MDIA11", "M.DIASBRANCO UNT", "07.206.816/0001-15"),
    ("MDIA3", "M.DIASBRANCO ON", "07.206.816/0001-15"),
    ("MDIA4", "M.DIASBRANCO PN", "07.206.816/0001-15"),
];

/// Parse a number in Brazilian notation ("1.234,56")
pub fn parse_brazilian_decimal(s: &str) -> Option<f64> {
    let cleaned = s.trim().replace('.', "").replace(',', ".");
    cleaned.parse::<f64>().ok()
}

fn two_decimals<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{:.2}", value))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DealType {
    Buy,
    Sell,
}

/// Aggregated buy or sell of one security within a note
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    #[serde(rename = "type")]
    pub deal_type: DealType,
    pub code: String,
    pub quantity: i64,
    /// Average unit price with fees applied
    #[serde(serialize_with = "two_decimals")]
    pub average: f64,
    /// Total value with fees applied
    #[serde(serialize_with = "two_decimals")]
    pub price: f64,
    pub date: String,
    pub cnpj: String,
    pub is_fund: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NegotiationNote {
    pub number: String,
    /// Total bought with fees applied
    #[serde(serialize_with = "two_decimals")]
    pub buy_total: f64,
    /// Total sold with fees applied
    #[serde(serialize_with = "two_decimals")]
    pub sell_total: f64,
    #[serde(serialize_with = "two_decimals")]
    pub buy_fees: f64,
    #[serde(serialize_with = "two_decimals")]
    pub sell_fees: f64,
    #[serde(serialize_with = "two_decimals")]
    pub fees: f64,
    pub date: String,
    pub holder: String,
    pub deals: Vec<Deal>,
}

pub struct NoteParser {
    resolver: AssetResolver,
    loader: Arc<dyn DocumentLoader>,
    date_format: DateFormat,
}

impl NoteParser {
    pub fn new(store: Arc<CatalogStore>, loader: Arc<dyn DocumentLoader>) -> Self {
        let mut resolver = AssetResolver::new(store);
        for (code, name, cnpj) in DEFAULT_OVERRIDES {
            resolver.register_override(code, name, Some(*cnpj), false);
        }
        Self {
            resolver,
            loader,
            date_format: DateFormat::default(),
        }
    }

    pub fn with_config(store: Arc<CatalogStore>, loader: Arc<dyn DocumentLoader>, config: &ParserConfig) -> Self {
        let mut parser = Self::new(store, loader);
        parser.set_date_format(config.date_format);
        parser
    }

    pub fn set_date_format(&mut self, format: DateFormat) {
        self.date_format = format;
    }

    pub fn date_format(&self) -> DateFormat {
        self.date_format
    }

    /// Register an asset alias. Returns false if the code is already defined.
    pub fn define_asset(&mut self, code: &str, name: &str, cnpj: Option<&str>, is_fund: bool) -> bool {
        self.resolver.register_override(code, name, cnpj, is_fund)
    }

    pub fn resolve_asset(&self, title: &str, hint: Option<&str>) -> Result<ResolvedAsset, UnknownAsset> {
        self.resolver.resolve(title, hint)
    }

    /// Corporate events by ticker root ("ALZR") or full code ("ALZR11")
    pub fn corporate_events(&self, code: &str) -> Option<CorporateEvents> {
        self.resolver.store().snapshot().corporate_events(code).cloned()
    }

    /// Parse every note in a document.
    ///
    /// In lenient mode unknown assets get an `UNDEF: <title>` code and a
    /// document without any recognizable note yields no notes.
    pub async fn parse_note(
        &self,
        note_name: &str,
        content: &[u8],
        passwords: &[String],
        lenient: bool,
    ) -> Result<Vec<NegotiationNote>, NoteError> {
        let document = open_document(self.loader.as_ref(), note_name, content, passwords).await?;
        let page_count = document.page_count();
        if page_count == 0 {
            return Err(NoteError::EmptyDocument {
                note: note_name.to_string(),
            });
        }

        let extractor = NoteExtractor::new(&self.resolver, note_name, self.date_format, lenient);
        let mut notes: Vec<NegotiationNote> = Vec::new();
        let mut matched = false;
        let mut text = String::new();

        for index in 0..page_count {
            let items = document.page_text(index).await.map_err(|e| NoteError::Document {
                note: note_name.to_string(),
                message: e.to_string(),
            })?;
            for item in items {
                text.push_str(&item);
                text.push('\n');
            }

            if let Some(dialect) = Dialect::detect(&text) {
                log::debug!("Page {} of {} completes a {} note", index + 1, note_name, dialect);
                extractor.extract(&text, dialect, &mut notes)?;
                matched = true;
                text.clear();
            }
        }

        if !matched {
            if lenient {
                log::warn!("No known note layout found in {}", note_name);
                return Ok(Vec::new());
            }
            return Err(NoteError::UnknownDocumentFormat {
                note: note_name.to_string(),
            });
        }

        Ok(notes.into_iter().map(fees::allocate).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::document::tests::LockedLoader;
    use super::document::PlainTextLoader;
    use super::*;
    use crate::catalog::test_support::sample_catalog;

    const CLEAR_SINGLE_PAGE: &str = "Nr. nota\n44444\nFolha\n1\nData pregão\n29/09/2020\nCLEAR CORRETORA - GRUPO XP\n\
        1-BOVESPA\nC\nVISTA\nBANCO INTER ON\n141\n16,56\n2.334,96\nD\n\
        1-BOVESPA\nV\nVISTA\nBANCO INTER UNT\n45\n51,94\n2.337,30\nC\n\
        1-BOVESPA\nV\nVISTA\nITAUSA ON N1\n79\n10,12\n799,48\nC\n\
        1-BOVESPA\nC\nFRACIONARIO\nITAUSA PN N1\n92\n8,83\n812,36\nD\n\
        0,00\n3.136,78\n3.147,32\n0,00\n0,00\n0,00\n0,00\n6.284,10\nResumo dos Negócios\n\
        1,73\nTaxa de liquidação\n0,00\nTaxa de Registro\n0,33\nEmolumentos\n";

    fn store() -> Arc<CatalogStore> {
        Arc::new(CatalogStore::new(sample_catalog()))
    }

    fn text_parser() -> NoteParser {
        NoteParser::new(store(), Arc::new(PlainTextLoader))
    }

    fn passwords() -> Vec<String> {
        vec!["123".to_string(), "456".to_string()]
    }

    fn expected_clear_note() -> NegotiationNote {
        let deal = |deal_type, code: &str, quantity, average, price, cnpj: &str| Deal {
            deal_type,
            code: code.to_string(),
            quantity,
            average,
            price,
            date: "29/09/2020".to_string(),
            cnpj: cnpj.to_string(),
            is_fund: false,
        };
        NegotiationNote {
            number: "44444".to_string(),
            buy_total: 3148.35,
            sell_total: 3135.75,
            buy_fees: 1.03,
            sell_fees: 1.03,
            fees: 2.06,
            date: "29/09/2020".to_string(),
            holder: "clear".to_string(),
            deals: vec![
                deal(DealType::Buy, "BIDI3", 141, 16.57, 2335.73, "00.416.968/0001-01"),
                deal(DealType::Sell, "UNDEF: BANCO INTER UNT", 45, 51.92, 2336.53, "00.000.000/0000-00"),
                deal(DealType::Sell, "ITSA3", 79, 10.12, 799.22, "61.532.644/0001-15"),
                deal(DealType::Buy, "ITSA4", 92, 8.83, 812.63, "61.532.644/0001-15"),
            ],
        }
    }

    #[tokio::test]
    async fn test_single_page_with_password() {
        let loader = LockedLoader {
            password: "456".to_string(),
            pages: vec![CLEAR_SINGLE_PAGE.to_string()],
        };
        let mut parser = NoteParser::new(store(), Arc::new(loader));
        parser.define_asset("BIDI3", "BANCO INTER ON", Some("00.416.968/0001-01"), false);

        let notes = parser.parse_note("clear_single_page_sell_pwd.pdf", b"", &passwords(), true).await.unwrap();
        assert_eq!(notes, vec![expected_clear_note()]);
    }

    #[tokio::test]
    async fn test_single_page_without_password() {
        let mut parser = text_parser();
        parser.define_asset("BIDI3", "BANCO INTER ON", Some("00.416.968/0001-01"), false);

        let notes = parser
            .parse_note("clear_single_page_sell.txt", CLEAR_SINGLE_PAGE.as_bytes(), &[], true)
            .await
            .unwrap();
        assert_eq!(notes, vec![expected_clear_note()]);

        let json = serde_json::to_value(&notes[0]).unwrap();
        assert_eq!(json["buyTotal"], "3148.35");
        assert_eq!(json["deals"][0]["type"], "buy");
        assert_eq!(json["deals"][0]["isFund"], false);
    }

    #[tokio::test]
    async fn test_unknown_asset_is_fatal_when_strict() {
        let mut parser = text_parser();
        parser.define_asset("BIDI3", "BANCO INTER ON", Some("00.416.968/0001-01"), false);

        let err = parser
            .parse_note("clear_single_page_sell.txt", CLEAR_SINGLE_PAGE.as_bytes(), &passwords(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, NoteError::UnknownAsset { ref title, .. } if title == "BANCO INTER UNT"));
    }

    #[tokio::test]
    async fn test_multi_page_note() {
        let header = "Nr. nota\n33333\nFolha\n1\nData pregão\n18/05/2021\nCLEAR CORRETORA - GRUPO XP\n";
        // The first page has no summary, the note completes on the second one
        let page1 = format!(
            "{header}1-BOVESPA\nC\nVISTA\nAES TIETE E ON NM\n35\n14,44\n505,40\nD\n\
             1-BOVESPA\nC\nVISTA\nFII CSHG URB HGRU11 CI ER\n5\n118,20\n591,00\nD\n"
        );
        let page2 = "1-BOVESPA\nC\nVISTA\nCOSAN LOG ON NM\n22\n22,56\n496,32\nD\n\
             0,00\n0,00\n1.592,72\n0,00\n0,00\n0,00\n0,00\n1.592,72\nResumo dos Negócios\n\
             0,39\nTaxa de liquidação\n0,08\nEmolumentos\n";
        // Same note number again on a later page
        let page3 = format!(
            "{header}1-BOVESPA\nC\nVISTA\nM.DIASBRANCO ON NM\n19\n26,64\n506,16\nD\n\
             0,00\n0,00\n2.098,88\n0,00\n0,00\n0,00\n0,00\n2.098,88\nResumo dos Negócios\n\
             0,12\nTaxa de liquidação\n0,03\nEmolumentos\n"
        );
        let content = [page1.as_str(), page2, page3.as_str()].join("\u{c}");

        let notes = text_parser()
            .parse_note("clear_multi_page.txt", content.as_bytes(), &[], false)
            .await
            .unwrap();

        assert_eq!(notes.len(), 1);
        let note = &notes[0];
        assert_eq!(note.number, "33333");
        assert_eq!(note.fees, 0.62);
        let codes: Vec<&str> = note.deals.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["AESB3", "HGRU11", "CSAN3", "MDIA3"]);
        assert_eq!(note.deals[0].cnpj, "37.663.076/0001-07");
        assert_eq!(note.deals[1].cnpj, "29.641.226/0001-53");
        assert!(note.deals[1].is_fund);

        let bought: f64 = note.deals.iter().map(|d| d.price).sum();
        assert!((bought - note.buy_total).abs() <= 0.04);
    }

    #[tokio::test]
    async fn test_inter_note() {
        let page = "Nº Nota: 18772836\nData Pregão: 29/11/2022\n\
            INTER DISTRIBUIDORA DE TITULOS E VALORES MOBILIARIOS LTDA\n\
            B3 RV LISTADO\nC\nVISTA\nKDIF11\nCI\n10\n128,50\n1.285,00\nD\n\
            B3 RV LISTADO\nC\nFRACIONARIO\nKDIF11F\nCI\n6\n128,50\n771,00\nD\n\
            Vendas à Vista\n0,00\nCompras à Vista\n2.056,00\n\
            Taxa de Liquidação\n0,51\nEmolumentos\n0,10\n";

        let notes = text_parser()
            .parse_note("inter_single_page.txt", page.as_bytes(), &passwords(), false)
            .await
            .unwrap();

        assert_eq!(notes.len(), 1);
        let note = &notes[0];
        assert_eq!(note.holder, "inter");
        assert_eq!(note.buy_total, 2056.61);
        assert_eq!(note.sell_total, 0.0);
        assert_eq!(note.buy_fees, 0.61);
        assert_eq!(note.deals.len(), 1);
        assert_eq!(note.deals[0].code, "KDIF11");
        assert_eq!(note.deals[0].quantity, 16);
        assert_eq!(note.deals[0].price, 2056.61);
        assert_eq!(note.deals[0].average, 128.54);
        assert_eq!(note.deals[0].cnpj, "26.324.298/0001-89");
        assert!(!note.deals[0].is_fund);
    }

    #[tokio::test]
    async fn test_nubank_note() {
        let page = "NU INVEST CORRETORA DE VALORES S.A.\nNúmero da nota\n8242\nData do pregão\n24/01/2025\n\
            C BOVESPA VISTA ALZR11 FII ALIANZA CI 24 98,33 2.359,92 D\n\
            Compras\n2.359,92\nVendas\n0,00\n\
            Taxa de liquidação\n0,60\nEmolumentos\n0,12\n";

        let mut parser = text_parser();
        parser.set_date_format(DateFormat::YearMonthDay);
        let notes = parser.parse_note("nubank.txt", page.as_bytes(), &[], false).await.unwrap();

        let note = &notes[0];
        assert_eq!(note.holder, "nubank");
        assert_eq!(note.date, "2025-01-24");
        assert_eq!(note.fees, 0.72);
        assert_eq!(note.deals[0].code, "ALZR11");
        assert_eq!(note.deals[0].price, 2360.64);
        assert_eq!(note.deals[0].average, 98.36);
        assert_eq!(note.deals[0].cnpj, "28.737.771/0001-85");
        assert!(note.deals[0].is_fund);
    }

    #[tokio::test]
    async fn test_wrong_password() {
        let loader = LockedLoader {
            password: "secret".to_string(),
            pages: vec![CLEAR_SINGLE_PAGE.to_string()],
        };
        let parser = NoteParser::new(store(), Arc::new(loader));
        let err = parser.parse_note("locked.pdf", b"", &passwords(), false).await.unwrap_err();
        assert!(matches!(err, NoteError::WrongPassword { ref passwords, .. } if passwords.len() == 2));
    }

    #[tokio::test]
    async fn test_empty_document() {
        let err = text_parser().parse_note("empty.txt", b"   ", &[], false).await.unwrap_err();
        assert!(matches!(err, NoteError::EmptyDocument { .. }));
    }

    #[tokio::test]
    async fn test_unknown_document_format() {
        let content = b"Extrato de conta\nSaldo\n1.000,00\n";
        let err = text_parser().parse_note("extrato.txt", content, &[], false).await.unwrap_err();
        assert!(matches!(err, NoteError::UnknownDocumentFormat { .. }));

        let notes = text_parser().parse_note("extrato.txt", content, &[], true).await.unwrap();
        assert!(notes.is_empty());
    }

    #[test]
    fn test_default_overrides() {
        let mut parser = text_parser();
        assert_eq!(parser.resolve_asset("AES TIETE E UNT N2", None).unwrap().code, "TIET11");
        assert_eq!(parser.resolve_asset("M.DIASBRANCO PN", None).unwrap().code, "MDIA4");
        assert!(!parser.define_asset("CSAN3", "COSAN ON", None, false));
    }

    #[test]
    fn test_corporate_events_lookup() {
        let parser = text_parser();
        let events = parser.corporate_events("ALZR11").unwrap();
        assert_eq!(events.cash_dividends.len(), 1);
        assert!(parser.corporate_events("WEGE").unwrap().stock_dividends.len() == 1);
        assert!(parser.corporate_events("NOPE11").is_none());
    }

    #[test]
    fn test_parse_brazilian_decimal() {
        assert_eq!(parse_brazilian_decimal("1.234,56"), Some(1234.56));
        assert_eq!(parse_brazilian_decimal("1.234.567,8"), Some(1234567.8));
        assert_eq!(parse_brazilian_decimal("0,33"), Some(0.33));
        assert_eq!(parse_brazilian_decimal("abc"), None);
    }
}
