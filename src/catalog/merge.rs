//! Merging of freshly fetched corporate events into known history.

use super::events::CorporateEvent;

/// Remove field-wise duplicates, keeping the first occurrence.
pub fn dedupe_events<T: CorporateEvent>(events: &[T]) -> Vec<T> {
    let mut result: Vec<T> = Vec::with_capacity(events.len());
    for event in events {
        if !result.contains(event) {
            result.push(event.clone());
        }
    }
    result
}

/// Union of `existing` and `incoming` without duplicates, newest record date first.
///
/// Events whose record date can't be parsed keep their relative order and are
/// placed after every dated event.
pub fn merge_events<T: CorporateEvent>(existing: &[T], incoming: &[T]) -> Vec<T> {
    let mut union: Vec<T> = dedupe_events(existing);
    for event in incoming {
        if !union.contains(event) {
            union.push(event.clone());
        }
    }

    let (mut dated, undated): (Vec<T>, Vec<T>) =
        union.into_iter().partition(|e| e.record_date().is_some());

    // Stable, so equal dates keep their encounter order
    dated.sort_by(|a, b| b.record_date().cmp(&a.record_date()));
    dated.extend(undated);
    dated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::events::{CashDividend, StockDividend};

    fn cash(date: &str, rate: &str) -> CashDividend {
        CashDividend {
            last_date_prior: date.to_string(),
            rate: rate.to_string(),
            label: "RENDIMENTO".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_orders_newest_first() {
        let existing = vec![cash("15/01/2023", "0,80"), cash("15/03/2023", "0,82")];
        let incoming = vec![cash("14/02/2023", "0,81"), cash("15/03/2023", "0,82")];

        let merged = merge_events(&existing, &incoming);
        let dates: Vec<&str> = merged.iter().map(|c| c.last_date_prior.as_str()).collect();
        assert_eq!(dates, vec!["15/03/2023", "14/02/2023", "15/01/2023"]);
    }

    #[test]
    fn test_merge_keeps_distinct_events_on_same_date() {
        let existing = vec![cash("30/12/2022", "0,10")];
        let incoming = vec![cash("30/12/2022", "0,25")];

        let merged = merge_events(&existing, &incoming);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].rate, "0,10");
        assert_eq!(merged[1].rate, "0,25");
    }

    #[test]
    fn test_merge_appends_undated_events() {
        let undated = cash("", "1,00");
        let merged = merge_events(
            &[undated.clone(), cash("01/06/2021", "0,50")],
            &[cash("01/07/2021", "0,55")],
        );
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[2], undated);
        assert_eq!(merged[0].last_date_prior, "01/07/2021");
    }

    #[test]
    fn test_merge_is_idempotent() {
        let a = vec![cash("10/10/2020", "0,30"), cash("", "0,99"), cash("10/01/2021", "0,31")];
        let b = vec![cash("10/04/2021", "0,32"), cash("10/10/2020", "0,30"), cash("", "0,98")];

        let once = merge_events(&a, &b);
        let twice = merge_events(&once, &b);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_removes_duplicates_from_existing() {
        let split = StockDividend {
            factor: "100,00000000000".to_string(),
            label: "DESDOBRAMENTO".to_string(),
            last_date_prior: "27/04/2021".to_string(),
            ..Default::default()
        };
        let merged = merge_events(&[split.clone(), split.clone()], &[split.clone()]);
        assert_eq!(merged, vec![split]);
    }
}
