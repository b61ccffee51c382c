//! Catalog Fetcher
//!
//! Walks the paginated equities listing, then the paginated funds listing
//! (with a detail call per fund), fetches the corporate events of every
//! security and merges everything into a copy of the current catalog. The copy
//! replaces the shared catalog only when the whole refresh succeeded.
//!
//! Every record is retried up to `max_retries` times. Rate-limited requests
//! wait a fixed delay plus random jitter before the same record is attempted
//! again. Running out of attempts aborts the refresh.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use super::b3::{
    company_supplement_url, fund_detail_url, fund_supplement_url, listed_companies_url,
    listed_funds_url, FundDetailResponse, ListedCompany, ListedFund, Page, SupplementResponse,
};
use super::events::{CorporateEvents, EventKind};
use super::merge::merge_events;
use super::{Catalog, CatalogStore, Security};
use crate::config::CrawlerConfig;
use crate::error::CatalogError;

/// Raw answer of a GET request
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Minimal HTTP capability needed by the fetcher
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<HttpResponse, CatalogError>;
}

/// `reqwest` backed transport
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, CatalogError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport {
                url: String::new(),
                message: format!("Failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, CatalogError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::Transport {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| CatalogError::Transport {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok(HttpResponse { status, body })
    }
}

/// Pending unit of work with its attempt counter, kept apart from the record itself
#[derive(Debug)]
struct WorkItem<T> {
    record: T,
    attempts: u32,
}

impl<T> WorkItem<T> {
    fn new(record: T) -> Self {
        Self { record, attempts: 0 }
    }
}

pub type ListenerId = u64;
type Listener = Box<dyn Fn(&Catalog) + Send + Sync>;

pub struct CatalogFetcher {
    store: Arc<CatalogStore>,
    transport: Arc<dyn HttpTransport>,
    config: CrawlerConfig,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
    next_listener_id: AtomicU64,
}

impl CatalogFetcher {
    pub fn new(
        store: Arc<CatalogStore>,
        transport: Arc<dyn HttpTransport>,
        config: CrawlerConfig,
    ) -> Self {
        Self {
            store,
            transport,
            config,
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &Arc<CatalogStore> {
        &self.store
    }

    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Register a callback invoked with the new catalog after each successful refresh.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&Catalog) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the listener was not registered.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Fetch equities and funds, merge them and publish the updated catalog.
    pub async fn refresh(&self) -> Result<Arc<Catalog>, CatalogError> {
        let mut catalog = Catalog::clone(&self.store.snapshot());

        self.refresh_equities(&mut catalog).await?;
        self.refresh_funds(&mut catalog).await?;

        log::info!("Catalog refreshed: {} securities", catalog.len());
        let updated = self.store.replace(catalog);
        self.notify(&updated);
        Ok(updated)
    }

    fn notify(&self, catalog: &Catalog) {
        let listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        for (_, listener) in listeners.iter() {
            listener(catalog);
        }
    }

    async fn refresh_equities(&self, catalog: &mut Catalog) -> Result<(), CatalogError> {
        let mut page_number = 1;
        loop {
            let url = listed_companies_url(page_number, self.config.stock_page_size, &self.config.language);
            let page: Page<ListedCompany> = self.fetch_page(&url, page_number).await?;
            log::debug!(
                "Companies page {}/{} ({} records)",
                page.page.page_number,
                page.page.total_pages,
                page.results.len()
            );

            let mut queue: VecDeque<WorkItem<ListedCompany>> = page
                .results
                .into_iter()
                .filter(|c| !c.issuing_company.trim().is_empty())
                .map(WorkItem::new)
                .collect();

            while let Some(mut item) = queue.pop_front() {
                match self.fetch_company(&item.record, catalog).await {
                    Ok(security) => catalog.upsert(security),
                    Err(err) => {
                        self.register_failure(&mut item.attempts, item.record.issuing_company.trim(), err)
                            .await?;
                        queue.push_front(item);
                    }
                }
            }

            if page.page.is_last(page_number) {
                break;
            }
            page_number += 1;
        }
        Ok(())
    }

    async fn refresh_funds(&self, catalog: &mut Catalog) -> Result<(), CatalogError> {
        let mut page_number = 1;
        loop {
            let url = listed_funds_url(page_number, self.config.fund_page_size);
            let page: Page<ListedFund> = self.fetch_page(&url, page_number).await?;
            log::debug!(
                "Funds page {}/{} ({} records)",
                page.page.page_number,
                page.page.total_pages,
                page.results.len()
            );

            let mut queue: VecDeque<WorkItem<ListedFund>> = page
                .results
                .into_iter()
                .filter(|f| !f.acronym.trim().is_empty())
                .map(WorkItem::new)
                .collect();

            while let Some(mut item) = queue.pop_front() {
                match self.fetch_fund(&item.record, catalog).await {
                    Ok(security) => catalog.upsert(security),
                    Err(err) => {
                        self.register_failure(&mut item.attempts, item.record.acronym.trim(), err)
                            .await?;
                        queue.push_front(item);
                    }
                }
            }

            if page.page.is_last(page_number) {
                break;
            }
            page_number += 1;
        }
        Ok(())
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        url: &str,
        page_number: u32,
    ) -> Result<Page<T>, CatalogError> {
        let mut item = WorkItem::new(page_number);
        loop {
            match self.get_json(url).await {
                Ok(page) => return Ok(page),
                Err(err) => {
                    let label = format!("page {}", item.record);
                    self.register_failure(&mut item.attempts, &label, err).await?;
                }
            }
        }
    }

    async fn fetch_company(
        &self,
        company: &ListedCompany,
        catalog: &Catalog,
    ) -> Result<Security, CatalogError> {
        let mut security = company.to_security();
        let url = company_supplement_url(&security.issuing_company, &self.config.language);
        let events = self.fetch_events(&url).await?;

        check_event_counts(catalog.find_entry(&security), &security.issuing_company, &events)?;
        security.events = events;
        Ok(security)
    }

    async fn fetch_fund(&self, listing: &ListedFund, catalog: &Catalog) -> Result<Security, CatalogError> {
        let detail: FundDetailResponse = self.get_json(&fund_detail_url(listing.acronym.trim())).await?;
        let mut security = detail.detail_fund.to_security(listing);

        let cnpj = security.cnpj.clone().unwrap_or_default();
        let url = fund_supplement_url(&cnpj, &security.issuing_company);
        let events = self.fetch_events(&url).await?;

        check_event_counts(catalog.find_entry(&security), &security.issuing_company, &events)?;
        security.events = events;
        Ok(security)
    }

    async fn fetch_events(&self, url: &str) -> Result<CorporateEvents, CatalogError> {
        let value: serde_json::Value = self.get_json(url).await?;
        let supplement = SupplementResponse::from_value(value).map_err(|e| CatalogError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(supplement.into_events())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let response = self.transport.get(url).await?;

        if response.status == 429 {
            return Err(CatalogError::RateLimited { url: url.to_string() });
        }
        if !(200..300).contains(&response.status) {
            return Err(CatalogError::Http {
                url: url.to_string(),
                status: response.status,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| CatalogError::InvalidResponse {
            url: url.to_string(),
            message: e.to_string(),
        })
    }

    /// Count a failed attempt. Returns an error when the record must not be retried.
    async fn register_failure(&self, attempts: &mut u32, item: &str, err: CatalogError) -> Result<(), CatalogError> {
        if !err.is_retryable() {
            return Err(err);
        }

        *attempts += 1;
        if *attempts > self.config.max_retries {
            log::error!("Max retries reached for {}: {}", item, err);
            return Err(CatalogError::MaxRetriesReached {
                item: item.to_string(),
                attempts: *attempts,
                source: Box::new(err),
            });
        }

        log::warn!("Retrying {} (attempt {}/{}): {}", item, attempts, self.config.max_retries, err);

        if err.is_rate_limited() {
            let delay = self.rate_limit_delay();
            log::info!("Rate limited, waiting {:?} before retrying {}", delay, item);
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    fn rate_limit_delay(&self) -> Duration {
        let jitter_ms = rand::thread_rng().gen_range(0..=self.config.rate_limit_jitter_secs * 1000);
        Duration::from_secs(self.config.rate_limit_delay_secs) + Duration::from_millis(jitter_ms)
    }
}

/// Merge the fresh events into the known ones and compare per kind. A merged
/// list shorter than the known history means the fresh answer can't be
/// reconciled with it; the record is fetched again.
fn check_event_counts(
    known: Option<&Security>,
    code: &str,
    fetched: &CorporateEvents,
) -> Result<(), CatalogError> {
    let Some(known) = known else {
        return Ok(());
    };

    let merged = [
        (
            EventKind::StockDividend,
            merge_events(&known.events.stock_dividends, &fetched.stock_dividends).len(),
        ),
        (
            EventKind::CashDividend,
            merge_events(&known.events.cash_dividends, &fetched.cash_dividends).len(),
        ),
        (
            EventKind::Subscription,
            merge_events(&known.events.subscriptions, &fetched.subscriptions).len(),
        ),
    ];

    for (kind, merged_count) in merged {
        let known_count = known.events.count(kind);
        if merged_count < known_count {
            return Err(CatalogError::FewerCorporateEvents {
                code: code.to_string(),
                kind,
                known: known_count,
                fetched: merged_count,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::catalog::events::CashDividend;

    /// Scripted transport: each URL answers with its queued responses in
    /// order, repeating the last one.
    #[derive(Default)]
    pub(crate) struct MockTransport {
        responses: Mutex<HashMap<String, VecDeque<HttpResponse>>>,
        pub(crate) calls: Mutex<Vec<String>>,
    }

    impl MockTransport {
        pub(crate) fn respond(&self, url: String, status: u16, body: serde_json::Value) {
            let mut responses = self.responses.lock().unwrap();
            responses.entry(url).or_default().push_back(HttpResponse {
                status,
                body: body.to_string(),
            });
        }

        fn calls_to(&self, url: &str) -> usize {
            self.calls.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
        }
    }

    #[async_trait]
    impl HttpTransport for MockTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, CatalogError> {
            self.calls.lock().unwrap().push(url.to_string());
            let mut responses = self.responses.lock().unwrap();
            match responses.get_mut(url) {
                Some(queue) if queue.len() > 1 => Ok(queue.pop_front().unwrap()),
                Some(queue) => Ok(queue.front().cloned().unwrap()),
                None => Ok(HttpResponse {
                    status: 404,
                    body: String::new(),
                }),
            }
        }
    }

    fn test_config(max_retries: u32) -> CrawlerConfig {
        CrawlerConfig {
            max_retries,
            rate_limit_delay_secs: 0,
            rate_limit_jitter_secs: 0,
            ..CrawlerConfig::default()
        }
    }

    fn page(number: u32, total: u32, results: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "page": {"pageNumber": number, "pageSize": 120, "totalRecords": 3, "totalPages": total},
            "results": results
        })
    }

    fn cash_json(date: &str, rate: &str) -> serde_json::Value {
        serde_json::json!({"label": "RENDIMENTO", "lastDatePrior": date, "rate": rate})
    }

    /// Two pages of companies and one page with one fund
    pub(crate) fn scripted_exchange() -> MockTransport {
        let config = CrawlerConfig::default();
        let transport = MockTransport::default();

        transport.respond(
            listed_companies_url(1, config.stock_page_size, &config.language),
            200,
            page(1, 2, serde_json::json!([
                {"issuingCompany": "ITSA", "tradingName": "ITAUSA", "cnpj": "61532644000115", "codeCVM": "7617"},
                {"issuingCompany": "WEGE", "tradingName": "WEG", "cnpj": "84429695000111"}
            ])),
        );
        transport.respond(
            listed_companies_url(2, config.stock_page_size, &config.language),
            200,
            page(2, 2, serde_json::json!([
                {"issuingCompany": "B3SA", "tradingName": "B3", "cnpj": "09346601000125"}
            ])),
        );
        for code in ["ITSA", "WEGE", "B3SA"] {
            transport.respond(
                company_supplement_url(code, &config.language),
                200,
                serde_json::json!([{"cashDividends": [cash_json("01/03/2024", "0,02")], "stockDividends": null}]),
            );
        }

        transport.respond(
            listed_funds_url(1, config.fund_page_size),
            200,
            page(1, 1, serde_json::json!([
                {"acronym": "ALZR", "fundName": "ALIANZA TRUST", "segment": "Logistica"}
            ])),
        );
        transport.respond(
            fund_detail_url("ALZR"),
            200,
            serde_json::json!({"detailFund": {"acronym": "ALZR", "tradingName": "FII ALIANZA",
                "tradingCode": "ALZR11", "cnpj": "28737771000185"}}),
        );
        transport.respond(
            fund_supplement_url("28737771000185", "ALZR"),
            200,
            serde_json::json!({"cashDividends": [cash_json("30/11/2023", "0,78"), cash_json("29/12/2023", "0,79")]}),
        );
        transport
    }

    #[tokio::test]
    async fn test_refresh_walks_all_pages() {
        let store = Arc::new(CatalogStore::default());
        let transport = Arc::new(scripted_exchange());
        let fetcher = CatalogFetcher::new(store.clone(), transport.clone(), test_config(3));

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        fetcher.subscribe(move |catalog| {
            counter.fetch_add(catalog.len(), Ordering::SeqCst);
        });

        let catalog = fetcher.refresh().await.unwrap();
        assert_eq!(catalog.len(), 4);
        assert_eq!(store.snapshot().len(), 4);
        assert_eq!(notified.load(Ordering::SeqCst), 4);

        let alzr = catalog.funds().next().unwrap();
        assert_eq!(alzr.primary_code(), Some("ALZR11"));
        assert_eq!(alzr.events.cash_dividends.len(), 2);
        assert_eq!(alzr.events.cash_dividends[0].last_date_prior, "29/12/2023");
    }

    #[tokio::test]
    async fn test_rate_limited_record_is_retried() {
        let config = CrawlerConfig::default();
        let transport = MockTransport::default();
        let url = company_supplement_url("ITSA", &config.language);
        transport.respond(
            listed_companies_url(1, config.stock_page_size, &config.language),
            200,
            page(1, 1, serde_json::json!([{"issuingCompany": "ITSA", "tradingName": "ITAUSA"}])),
        );
        transport.respond(url.clone(), 429, serde_json::json!({}));
        transport.respond(url.clone(), 429, serde_json::json!({}));
        transport.respond(url.clone(), 200, serde_json::json!([{}]));
        transport.respond(
            listed_funds_url(1, config.fund_page_size),
            200,
            page(1, 1, serde_json::json!([])),
        );

        let transport = Arc::new(transport);
        let fetcher = CatalogFetcher::new(Arc::new(CatalogStore::default()), transport.clone(), test_config(5));

        let catalog = fetcher.refresh().await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(transport.calls_to(&url), 3);
    }

    #[tokio::test]
    async fn test_max_retries_aborts_refresh() {
        let config = CrawlerConfig::default();
        let transport = MockTransport::default();
        let url = company_supplement_url("ITSA", &config.language);
        transport.respond(
            listed_companies_url(1, config.stock_page_size, &config.language),
            200,
            page(1, 1, serde_json::json!([{"issuingCompany": "ITSA", "tradingName": "ITAUSA"}])),
        );
        transport.respond(url.clone(), 500, serde_json::json!({}));

        let store = Arc::new(CatalogStore::new(crate::catalog::test_support::sample_catalog()));
        let transport = Arc::new(transport);
        let fetcher = CatalogFetcher::new(store.clone(), transport.clone(), test_config(2));

        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        fetcher.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let err = fetcher.refresh().await.unwrap_err();
        assert!(matches!(err, CatalogError::MaxRetriesReached { attempts: 3, .. }));
        assert_eq!(transport.calls_to(&url), 3);
        assert_eq!(notified.load(Ordering::SeqCst), 0);
        // The shared catalog is untouched
        assert_eq!(*store.snapshot(), crate::catalog::test_support::sample_catalog());
    }

    fn cash(date: &str, rate: &str) -> CashDividend {
        CashDividend {
            label: "RENDIMENTO".to_string(),
            last_date_prior: date.to_string(),
            rate: rate.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_repeated_refresh_keeps_history() {
        let transport = Arc::new(scripted_exchange());
        let url = fund_supplement_url("28737771000185", "ALZR");

        // Known history holds an event the exchange no longer returns
        let mut known = Security::fund("ALZR", "FII ALIANZA", "ALZR11", Some("28737771000185"));
        known.events.cash_dividends = vec![cash("31/10/2023", "0,77")];
        let store = Arc::new(CatalogStore::new(Catalog::from_securities(vec![known])));
        let fetcher = CatalogFetcher::new(store.clone(), transport.clone(), test_config(3));

        let first = fetcher.refresh().await.unwrap();
        assert_eq!(first.corporate_events("ALZR11").unwrap().cash_dividends.len(), 3);

        let second = fetcher.refresh().await.unwrap();
        let dates: Vec<&str> = second
            .corporate_events("ALZR11")
            .unwrap()
            .cash_dividends
            .iter()
            .map(|c| c.last_date_prior.as_str())
            .collect();
        assert_eq!(dates, vec!["29/12/2023", "30/11/2023", "31/10/2023"]);
        assert_eq!(transport.calls_to(&url), 2);
        assert_eq!(*store.snapshot(), *second);
    }

    #[tokio::test]
    async fn test_pages_advance_without_trusting_echo() {
        let config = CrawlerConfig::default();
        let transport = MockTransport::default();
        // The exchange echoes a stale page number on every page
        transport.respond(
            listed_companies_url(1, config.stock_page_size, &config.language),
            200,
            page(0, 2, serde_json::json!([{"issuingCompany": "ITSA", "tradingName": "ITAUSA"}])),
        );
        transport.respond(
            listed_companies_url(2, config.stock_page_size, &config.language),
            200,
            page(0, 2, serde_json::json!([{"issuingCompany": "WEGE", "tradingName": "WEG"}])),
        );
        for code in ["ITSA", "WEGE"] {
            transport.respond(company_supplement_url(code, &config.language), 200, serde_json::json!([{}]));
        }
        transport.respond(
            listed_funds_url(1, config.fund_page_size),
            200,
            page(0, 1, serde_json::json!([])),
        );

        let transport = Arc::new(transport);
        let fetcher = CatalogFetcher::new(Arc::new(CatalogStore::default()), transport.clone(), test_config(1));

        let catalog = fetcher.refresh().await.unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            transport.calls_to(&listed_companies_url(1, config.stock_page_size, &config.language)),
            1
        );
        assert_eq!(
            transport.calls_to(&listed_companies_url(2, config.stock_page_size, &config.language)),
            1
        );
    }

    #[test]
    fn test_rate_limit_delay_bounds() {
        let config = CrawlerConfig {
            rate_limit_delay_secs: 2,
            rate_limit_jitter_secs: 3,
            ..CrawlerConfig::default()
        };
        let fetcher = CatalogFetcher::new(
            Arc::new(CatalogStore::default()),
            Arc::new(MockTransport::default()),
            config,
        );

        for _ in 0..50 {
            let delay = fetcher.rate_limit_delay();
            assert!(delay >= Duration::from_secs(2), "{:?}", delay);
            assert!(delay <= Duration::from_secs(5), "{:?}", delay);
        }

        let fixed = CatalogFetcher::new(
            Arc::new(CatalogStore::default()),
            Arc::new(MockTransport::default()),
            CrawlerConfig {
                rate_limit_delay_secs: 2,
                rate_limit_jitter_secs: 0,
                ..CrawlerConfig::default()
            },
        );
        assert_eq!(fixed.rate_limit_delay(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_unsubscribe() {
        let fetcher = CatalogFetcher::new(
            Arc::new(CatalogStore::default()),
            Arc::new(scripted_exchange()),
            test_config(1),
        );
        let notified = Arc::new(AtomicUsize::new(0));
        let counter = notified.clone();
        let id = fetcher.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(fetcher.unsubscribe(id));
        assert!(!fetcher.unsubscribe(id));
        fetcher.refresh().await.unwrap();
        assert_eq!(notified.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_check_event_counts() {
        let mut known = Security::equity("ITSA", "ITAUSA", None);
        known.events.cash_dividends = vec![cash("01/03/2024", "0,02"), cash("01/12/2023", "0,02")];

        // Fewer fresh events still merge into the known history
        let mut fetched = CorporateEvents::default();
        fetched.cash_dividends.push(cash("01/03/2024", "0,02"));
        assert!(check_event_counts(Some(&known), "ITSA", &fetched).is_ok());
        assert!(check_event_counts(None, "ITSA", &fetched).is_ok());

        // A history that merges into fewer entries can't be reconciled
        known.events.cash_dividends = vec![cash("01/03/2024", "0,02"), cash("01/03/2024", "0,02")];
        let err = check_event_counts(Some(&known), "ITSA", &CorporateEvents::default()).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::FewerCorporateEvents { kind: EventKind::CashDividend, known: 2, fetched: 1, .. }
        ));
    }
}
