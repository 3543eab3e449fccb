use std::cmp::Ordering;

use super::types::{Listing, ScreenQuery, SortDirection};

/// Filters listings by search term and metric minimums, then stable-sorts by
/// one metric. An empty search and a zero (or NaN) minimum filter nothing. A
/// listing without a filtered metric is dropped; a listing without the sort
/// metric sorts as 0.
pub fn screen(listings: &[Listing], query: &ScreenQuery) -> Vec<Listing> {
    let needle = query
        .search
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut result: Vec<Listing> = listings
        .iter()
        .filter(|listing| match &needle {
            Some(needle) => {
                listing.name.to_lowercase().contains(needle)
                    || listing.ticker.to_lowercase().contains(needle)
            }
            None => true,
        })
        .filter(|listing| {
            query
                .minimums
                .iter()
                .filter(|&(_, &min)| is_active_minimum(min))
                .all(|(key, min)| {
                    listing
                        .metrics
                        .get(key)
                        .is_some_and(|value| value >= min)
                })
        })
        .cloned()
        .collect();

    if let Some(sort) = &query.sort {
        let metric = |listing: &Listing| listing.metrics.get(&sort.key).copied().unwrap_or(0.0);
        result.sort_by(|a, b| {
            let ord = metric(a).partial_cmp(&metric(b)).unwrap_or(Ordering::Equal);
            match sort.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        });
    }

    result
}

fn is_active_minimum(min: f64) -> bool {
    min != 0.0 && !min.is_nan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::SortSpec;
    use std::collections::BTreeMap;

    fn listing(ticker: &str, name: &str, metrics: &[(&str, f64)]) -> Listing {
        Listing {
            ticker: ticker.to_string(),
            name: name.to_string(),
            metrics: metrics
                .iter()
                .map(|&(k, v)| (k.to_string(), v))
                .collect(),
        }
    }

    fn sample() -> Vec<Listing> {
        vec![
            listing("AAPL", "Apple Inc.", &[("growth", 8.0), ("value", 6.0)]),
            listing("MSFT", "Microsoft", &[("growth", 9.0), ("value", 7.0)]),
            listing("GOOGL", "Alphabet", &[("growth", 9.0)]),
            listing("KO", "Coca-Cola", &[("growth", 4.0), ("value", 9.5)]),
        ]
    }

    fn tickers(listings: &[Listing]) -> Vec<&str> {
        listings.iter().map(|l| l.ticker.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let result = screen(&sample(), &ScreenQuery::default());
        assert_eq!(tickers(&result), ["AAPL", "MSFT", "GOOGL", "KO"]);
    }

    #[test]
    fn search_matches_name_or_ticker_case_insensitively() {
        let query = ScreenQuery {
            search: Some("co".to_string()),
            ..ScreenQuery::default()
        };
        assert_eq!(tickers(&screen(&sample(), &query)), ["KO"]);

        let query = ScreenQuery {
            search: Some("googl".to_string()),
            ..ScreenQuery::default()
        };
        assert_eq!(tickers(&screen(&sample(), &query)), ["GOOGL"]);
    }

    #[test]
    fn minimums_drop_listings_missing_the_metric() {
        let query = ScreenQuery {
            minimums: BTreeMap::from([("value".to_string(), 7.0)]),
            ..ScreenQuery::default()
        };
        assert_eq!(tickers(&screen(&sample(), &query)), ["MSFT", "KO"]);
    }

    #[test]
    fn zero_minimums_filter_nothing() {
        let query = ScreenQuery {
            minimums: BTreeMap::from([("value".to_string(), 0.0), ("growth".to_string(), 0.0)]),
            ..ScreenQuery::default()
        };
        assert_eq!(
            tickers(&screen(&sample(), &query)),
            ["AAPL", "MSFT", "GOOGL", "KO"]
        );

        let query = ScreenQuery {
            minimums: BTreeMap::from([("value".to_string(), 0.0), ("growth".to_string(), 9.0)]),
            ..ScreenQuery::default()
        };
        assert_eq!(tickers(&screen(&sample(), &query)), ["MSFT", "GOOGL"]);
    }

    #[test]
    fn search_is_matched_verbatim() {
        let query = ScreenQuery {
            search: Some(" ko".to_string()),
            ..ScreenQuery::default()
        };
        assert!(screen(&sample(), &query).is_empty());

        let query = ScreenQuery {
            search: Some(String::new()),
            ..ScreenQuery::default()
        };
        assert_eq!(screen(&sample(), &query).len(), 4);
    }

    #[test]
    fn sort_is_stable_and_treats_missing_as_zero() {
        let query = ScreenQuery {
            sort: Some(SortSpec {
                key: "growth".to_string(),
                direction: SortDirection::Desc,
            }),
            ..ScreenQuery::default()
        };
        assert_eq!(
            tickers(&screen(&sample(), &query)),
            ["MSFT", "GOOGL", "AAPL", "KO"]
        );

        let query = ScreenQuery {
            sort: Some(SortSpec {
                key: "value".to_string(),
                direction: SortDirection::Asc,
            }),
            ..ScreenQuery::default()
        };
        assert_eq!(
            tickers(&screen(&sample(), &query)),
            ["GOOGL", "AAPL", "MSFT", "KO"]
        );
    }
}
