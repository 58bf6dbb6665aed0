//! Behaviour of latest and history reads against a DuckDB-backed store.

use rupee_core::{ObservationStore, DEFAULT_STORE_TIMEOUT};
use rupee_tests::*;
use tempfile::tempdir;

async fn seed(store: &WarehouseStore, rows: &[RateObservation]) {
    for row in rows {
        store.insert(row, DEFAULT_STORE_TIMEOUT).await.expect("insert");
    }
}

// =============================================================================
// Queries: latest
// =============================================================================

#[tokio::test]
async fn when_user_asks_for_latest_the_newest_observation_wins() {
    // Given: Observations for two banks, inserted out of time order
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    seed(
        &store,
        &[
            observation(BankCode::Sampath, 298.0, "2025-03-02T06:00:00Z"),
            observation(BankCode::Sampath, 299.5, "2025-03-03T06:00:00Z"),
            observation(BankCode::Hnb, 300.2, "2025-03-04T06:00:00Z"),
            observation(BankCode::Sampath, 297.0, "2025-03-01T06:00:00Z"),
        ],
    )
    .await;
    let queries = RateQueryService::new(store);

    // When: Latest is read per bank and across banks
    let sampath = queries.latest(Some("SAMPATH")).await.expect("read");
    let any = queries.latest(None).await.expect("read");

    // Then: Each is the newest observation in scope
    assert_eq!(
        sampath,
        Some(observation(BankCode::Sampath, 299.5, "2025-03-03T06:00:00Z"))
    );
    assert_eq!(any.map(|o| o.bank), Some(BankCode::Hnb));
}

#[tokio::test]
async fn when_a_bank_has_no_observations_latest_is_empty() {
    // Given: Only Sampath observations
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    seed(
        &store,
        &[observation(BankCode::Sampath, 298.0, "2025-03-02T06:00:00Z")],
    )
    .await;
    let queries = RateQueryService::new(store);

    // When: Latest is read for Commercial Bank
    let latest = queries.latest(Some("COMMERCIAL")).await.expect("read");

    // Then: Nothing matches
    assert_eq!(latest, None);
}

#[tokio::test]
async fn timestamps_survive_the_store_at_microsecond_precision() {
    // Given: An observation with sub-second precision
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let stored = observation(BankCode::Hnb, 301.125, "2025-03-02T06:00:00.123456Z");
    seed(&store, &[stored]).await;

    // When: It is read back
    let latest = RateQueryService::new(store)
        .latest(Some("HNB"))
        .await
        .expect("read");

    // Then: Rate and instant are unchanged
    assert_eq!(latest, Some(stored));
}

// =============================================================================
// Queries: history windows
// =============================================================================

#[tokio::test]
async fn when_user_asks_for_week_history_older_rows_are_excluded() {
    // Given: Daily Sampath observations over two weeks
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let rows: Vec<RateObservation> = (1..=14)
        .map(|day| {
            observation(
                BankCode::Sampath,
                290.0 + f64::from(day),
                &format!("2025-03-{day:02}T06:00:00Z"),
            )
        })
        .collect();
    seed(&store, &rows).await;
    let queries = RateQueryService::new(store);
    let now = UtcDateTime::parse("2025-03-14T12:00:00Z").expect("now");

    // When: A week of history is read
    let history = queries
        .history_at(Some("SAMPATH"), Some("week"), now)
        .await
        .expect("read");

    // Then: Seven rows from the last seven days, newest first
    let days: Vec<String> = history
        .iter()
        .map(|o| o.fetched_at.format_rfc3339()[..10].to_owned())
        .collect();
    assert_eq!(
        days,
        vec![
            "2025-03-14", "2025-03-13", "2025-03-12", "2025-03-11", "2025-03-10", "2025-03-09",
            "2025-03-08",
        ]
    );
}

#[tokio::test]
async fn year_history_is_capped_at_fifty_two_rows() {
    // Given: Sixty HNB observations within the last year
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    let rows: Vec<RateObservation> = (0..60)
        .map(|n| {
            observation(
                BankCode::Hnb,
                300.0,
                &format!("2025-02-{:02}T{:02}:00:00Z", 1 + n / 24, n % 24),
            )
        })
        .collect();
    seed(&store, &rows).await;
    let queries = RateQueryService::new(store);
    let now = UtcDateTime::parse("2025-03-01T00:00:00Z").expect("now");

    // When: A year of history is read
    let history = queries
        .history_at(Some("HNB"), Some("year"), now)
        .await
        .expect("read");

    // Then: Only the newest 52 are returned
    assert_eq!(history.len(), 52);
    assert_eq!(
        history[0].fetched_at,
        UtcDateTime::parse("2025-02-03T11:00:00Z").expect("ts")
    );
}

#[tokio::test]
async fn history_without_a_bank_spans_every_bank() {
    // Given: Observations from three banks this week
    let temp = tempdir().expect("tempdir");
    let store = open_store(temp.path());
    seed(
        &store,
        &[
            observation(BankCode::Sampath, 298.0, "2025-03-10T06:00:00Z"),
            observation(BankCode::Commercial, 297.5, "2025-03-11T06:00:00Z"),
            observation(BankCode::Hnb, 299.0, "2025-03-12T06:00:00Z"),
        ],
    )
    .await;
    let queries = RateQueryService::new(store);
    let now = UtcDateTime::parse("2025-03-13T00:00:00Z").expect("now");

    // When: History is read with no bank and an unrecognised period
    let history = queries
        .history_at(None, Some("fortnight"), now)
        .await
        .expect("read");

    // Then: All banks appear, newest first, as for a week
    let banks: Vec<BankCode> = history.iter().map(|o| o.bank).collect();
    assert_eq!(
        banks,
        vec![BankCode::Hnb, BankCode::Commercial, BankCode::Sampath]
    );
}

#[tokio::test]
async fn history_on_an_empty_store_is_an_empty_list() {
    // Given: A fresh store
    let temp = tempdir().expect("tempdir");
    let queries = RateQueryService::new(open_store(temp.path()));

    // When: Month history is read
    let history = queries.history(Some("SAMPATH"), Some("month")).await.expect("read");

    // Then: No rows, no error
    assert!(history.is_empty());
}
