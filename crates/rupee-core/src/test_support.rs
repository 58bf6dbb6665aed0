//! Test doubles shared by the unit tests in this crate.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};
use std::time::Duration;

use crate::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::ingest::millis;
use crate::{
    BankCode, ExtractionError, ObservationStore, QueryWindow, Rate, RateExtractor,
    RateObservation, StoreError, StoreFuture,
};

/// Replays one canned response and records every request.
pub struct RecordingHttpClient {
    response: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl Default for RecordingHttpClient {
    fn default() -> Self {
        Self::responding(HttpResponse::ok("{}"))
    }
}

impl RecordingHttpClient {
    pub fn responding(response: HttpResponse) -> Self {
        Self {
            response: Ok(response),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(error: HttpError) -> Self {
        Self {
            response: Err(error),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .clone()
    }
}

impl HttpClient for RecordingHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests
            .lock()
            .expect("request store should not be poisoned")
            .push(request);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

/// Extractor with a scripted outcome and a call counter.
pub struct FixedExtractor {
    bank: BankCode,
    outcome: Result<Rate, ExtractionError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FixedExtractor {
    pub fn rate(bank: BankCode, rate: f64) -> Self {
        Self {
            bank,
            outcome: Ok(Rate::new(rate).expect("test rate must be positive")),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(bank: BankCode, error: ExtractionError) -> Self {
        Self {
            bank,
            outcome: Err(error),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RateExtractor for FixedExtractor {
    fn bank(&self) -> BankCode {
        self.bank
    }

    fn extract_usd_rate<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Rate, ExtractionError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.outcome.clone()
        })
    }
}

/// In-memory [`ObservationStore`] with optional failure and latency injection.
#[derive(Default)]
pub struct MemoryStore {
    observations: Mutex<Vec<RateObservation>>,
    insert_error: Option<String>,
    insert_delay: Option<Duration>,
    read_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn with_observations(observations: &[RateObservation]) -> Self {
        Self {
            observations: Mutex::new(observations.to_vec()),
            ..Self::default()
        }
    }

    pub fn rejecting_inserts(message: &str) -> Self {
        Self {
            insert_error: Some(message.to_owned()),
            ..Self::default()
        }
    }

    pub fn with_insert_delay(mut self, delay: Duration) -> Self {
        self.insert_delay = Some(delay);
        self
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn snapshot(&self) -> Vec<RateObservation> {
        self.observations.lock().expect("store lock").clone()
    }

    fn matching(&self, bank: Option<BankCode>) -> Vec<RateObservation> {
        let mut rows: Vec<RateObservation> = self
            .snapshot()
            .into_iter()
            .filter(|row| bank.map_or(true, |code| row.bank == code))
            .collect();
        rows.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        rows
    }
}

impl ObservationStore for MemoryStore {
    fn insert<'a>(
        &'a self,
        observation: &'a RateObservation,
        timeout: Duration,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            if let Some(delay) = self.insert_delay {
                if delay > timeout {
                    tokio::time::sleep(timeout).await;
                    return Err(StoreError::timed_out(millis(timeout)));
                }
                tokio::time::sleep(delay).await;
            }
            if let Some(message) = &self.insert_error {
                return Err(StoreError::unavailable(message.clone()));
            }
            self.observations
                .lock()
                .expect("store lock")
                .push(*observation);
            Ok(())
        })
    }

    fn latest<'a>(&'a self, bank: Option<BankCode>) -> StoreFuture<'a, Option<RateObservation>> {
        Box::pin(async move {
            if let Some(delay) = self.read_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self.matching(bank).into_iter().next())
        })
    }

    fn history<'a>(
        &'a self,
        bank: Option<BankCode>,
        window: QueryWindow,
    ) -> StoreFuture<'a, Vec<RateObservation>> {
        Box::pin(async move {
            if let Some(delay) = self.read_delay {
                tokio::time::sleep(delay).await;
            }
            Ok(self
                .matching(bank)
                .into_iter()
                .filter(|row| row.fetched_at >= window.start)
                .take(window.max_results)
                .collect())
        })
    }
}

pub fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
    unsafe { Waker::from_raw(noop_raw_waker()) }
}

fn noop_raw_waker() -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
}

unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
    noop_raw_waker()
}

unsafe fn noop_raw_waker_wake(_: *const ()) {}

unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

unsafe fn noop_raw_waker_drop(_: *const ()) {}

static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
    noop_raw_waker_clone,
    noop_raw_waker_wake,
    noop_raw_waker_wake_by_ref,
    noop_raw_waker_drop,
);
