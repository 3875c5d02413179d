use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    time::Duration
};

use futures::future::{AbortHandle, Abortable};
use serde_json::Value;
use tokio::{
    sync::{mpsc, oneshot},
    time::{sleep_until, Instant}
};
use tracing::{debug, info};

use crate::error::FetchError;

pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(2000);

/// One caller waiting on a URL. The abort handle is shared with the caller's
/// [`FetchHandle`], so an aborted caller counts as gone even while it still
/// holds the handle.
struct Waiter {
    tx: oneshot::Sender<Result<Value, FetchError>>,
    abort: AbortHandle
}

impl Waiter {
    fn is_live(&self) -> bool {
        !self.tx.is_closed() && !self.abort.is_aborted()
    }
}

/// Performs one underlying GET and decodes its body as JSON.
pub trait Transport: Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = Result<Value, FetchError>> + Send;
}

/// Production transport.
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> ReqwestTransport {
        ReqwestTransport { client }
    }
}

impl Transport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<Value, FetchError> {
        // The provider reports failures as JSON bodies with non-2xx codes, so
        // the status code is not checked here.
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// A queued request. Awaiting [`FetchHandle::ready`] yields its body; the
/// request can be cancelled from elsewhere through [`FetchHandle::abort_handle`].
pub struct FetchHandle {
    ready: Abortable<oneshot::Receiver<Result<Value, FetchError>>>,
    abort: AbortHandle
}

impl FetchHandle {
    /// Cancels this waiter only. Other waiters sharing the same URL are unaffected.
    pub fn abort(&self) {
        self.abort.abort();
    }

    pub fn abort_handle(&self) -> AbortHandle {
        self.abort.clone()
    }

    pub async fn ready(self) -> Result<Value, FetchError> {
        match self.ready.await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(FetchError::Closed),
            Err(_) => Err(FetchError::Cancelled)
        }
    }
}

/// Serializes every request through one FIFO queue.
///
/// - one request in flight at a time
/// - dispatches start at least `min_interval` apart
/// - concurrent requests for the same URL share a single underlying request
/// - queued URLs whose waiters were all cancelled are skipped
#[derive(Clone)]
pub struct RateLimitedFetcher {
    tx: mpsc::UnboundedSender<(String, Waiter)>
}

impl RateLimitedFetcher {
    /// Spawns the dispatch task on the current tokio runtime.
    pub fn spawn<T: Transport>(transport: T, min_interval: Duration) -> RateLimitedFetcher {
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(dispatch(transport, min_interval, rx));

        RateLimitedFetcher { tx }
    }

    pub fn enqueue(&self, url: &str) -> FetchHandle {
        let (tx, receiver) = oneshot::channel();
        let (abort, registration) = AbortHandle::new_pair();
        let waiter = Waiter {
            tx,
            abort: abort.clone()
        };

        // A send failure drops the waiter, which `ready` reports as `Closed`
        let _ = self.tx.send((url.to_owned(), waiter));

        FetchHandle {
            ready: Abortable::new(receiver, registration),
            abort
        }
    }

    pub async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        self.enqueue(url).ready().await
    }
}

#[derive(Default)]
struct DispatchQueue {
    queue: VecDeque<String>,
    // Present from enqueue until the URL's request completes
    waiters: HashMap<String, Vec<Waiter>>
}

impl DispatchQueue {
    fn accept(&mut self, url: String, waiter: Waiter) {
        match self.waiters.get_mut(&url) {
            Some(pending) => {
                debug!("Joining pending request for {}", url);
                pending.push(waiter);
            }
            None => {
                self.waiters.insert(url.clone(), vec![waiter]);
                self.queue.push_back(url);
            }
        }
    }

    /// Next URL with at least one live waiter.
    fn next(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            let live = self
                .waiters
                .get(&url)
                .is_some_and(|pending| pending.iter().any(Waiter::is_live));

            if live {
                return Some(url);
            }

            debug!("Skipping cancelled request for {}", url);
            self.waiters.remove(&url);
        }

        None
    }

    fn complete(&mut self, url: &str, result: Result<Value, FetchError>) {
        for waiter in self.waiters.remove(url).unwrap_or_default() {
            if waiter.is_live() {
                let _ = waiter.tx.send(result.clone());
            }
        }
    }
}

async fn dispatch<T: Transport>(
    transport: T,
    min_interval: Duration,
    mut rx: mpsc::UnboundedReceiver<(String, Waiter)>
) {
    let mut state = DispatchQueue::default();

    loop {
        let url = match state.next() {
            Some(url) => url,
            None => match rx.recv().await {
                Some((url, waiter)) => {
                    state.accept(url, waiter);
                    continue;
                }
                None => break
            }
        };

        let started = Instant::now();
        info!("Requesting {}", url);

        let request = transport.get(&url);
        tokio::pin!(request);
        let result = loop {
            tokio::select! {
                result = &mut request => break result,
                Some((url, waiter)) = rx.recv() => state.accept(url, waiter),
            }
        };

        if let Err(e) = &result {
            debug!("Request for {} failed: {}", url, e);
        }
        state.complete(&url, result);

        let deadline = started + min_interval;
        loop {
            tokio::select! {
                _ = sleep_until(deadline) => break,
                Some((url, waiter)) = rx.recv() => state.accept(url, waiter),
            }
        }
    }

    debug!("Fetcher shut down");
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration
    };

    use serde_json::{json, Value};
    use tokio::time::Instant;

    use crate::{
        api::fetcher::{RateLimitedFetcher, Transport, DEFAULT_MIN_INTERVAL},
        error::FetchError
    };

    #[derive(Clone, Default)]
    struct RecordingTransport {
        calls: Arc<Mutex<Vec<(String, Instant)>>>,
        latency: Duration
    }

    impl RecordingTransport {
        fn with_latency(latency: Duration) -> RecordingTransport {
            RecordingTransport {
                calls: Arc::default(),
                latency
            }
        }

        fn calls(&self) -> Vec<(String, Instant)> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        async fn get(&self, url: &str) -> Result<Value, FetchError> {
            self.calls.lock().unwrap().push((url.to_owned(), Instant::now()));
            tokio::time::sleep(self.latency).await;

            if url.contains("fail") {
                return Err(FetchError::Transport("boom".to_string()));
            }

            Ok(json!({ "status": "OK", "url": url }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_returns_body() {
        let transport = RecordingTransport::default();
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);

        let body = fetcher.fetch("https://example.test/a").await.unwrap();

        assert_eq!(body["url"], "https://example.test/a");
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_are_spaced() {
        let transport = RecordingTransport::with_latency(Duration::from_millis(100));
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);

        let a = fetcher.enqueue("https://example.test/a");
        let b = fetcher.enqueue("https://example.test/b");
        let c = fetcher.enqueue("https://example.test/c");
        let (ra, rb, rc) = tokio::join!(a.ready(), b.ready(), c.ready());
        assert!(ra.is_ok() && rb.is_ok() && rc.is_ok());

        let calls = transport.calls();
        let urls: Vec<&str> = calls.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(
            urls,
            vec!["https://example.test/a", "https://example.test/b", "https://example.test/c"]
        );
        for pair in calls.windows(2) {
            assert!(pair[1].1 - pair[0].1 >= DEFAULT_MIN_INTERVAL);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_identical_requests_share_one_fetch() {
        let transport = RecordingTransport::with_latency(Duration::from_millis(100));
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);

        let first = fetcher.enqueue("https://example.test/same");
        let second = fetcher.enqueue("https://example.test/same");
        let (r1, r2) = tokio::join!(first.ready(), second.ready());

        assert_eq!(r1.unwrap(), r2.unwrap());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_joins_in_flight_fetch() {
        let transport = RecordingTransport::with_latency(Duration::from_millis(500));
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);

        let first = fetcher.enqueue("https://example.test/slow");
        let first = tokio::spawn(first.ready());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(transport.calls().len(), 1);

        let second = fetcher.fetch("https://example.test/slow").await;

        assert!(second.is_ok());
        assert!(first.await.unwrap().is_ok());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_rejects_only_its_waiter() {
        let transport = RecordingTransport::with_latency(Duration::from_millis(100));
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);

        let kept = fetcher.enqueue("https://example.test/shared");
        let cancelled = fetcher.enqueue("https://example.test/shared");
        cancelled.abort();

        let (kept, cancelled) = tokio::join!(kept.ready(), cancelled.ready());

        assert_eq!(cancelled, Err(FetchError::Cancelled));
        assert!(kept.is_ok());
        assert_eq!(transport.calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_queue_entry_is_skipped() {
        let transport = RecordingTransport::with_latency(Duration::from_millis(100));
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);

        let a = fetcher.enqueue("https://example.test/a");
        let b = fetcher.enqueue("https://example.test/b");
        let c = fetcher.enqueue("https://example.test/c");
        b.abort();
        drop(b);

        let (ra, rc) = tokio::join!(a.ready(), c.ready());
        assert!(ra.is_ok() && rc.is_ok());

        let urls: Vec<String> = transport.calls().into_iter().map(|(u, _)| u).collect();
        assert_eq!(urls, vec!["https://example.test/a", "https://example.test/c"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_aborted_entry_is_skipped_while_handle_is_held() {
        let transport = RecordingTransport::with_latency(Duration::from_millis(100));
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);
        let start = Instant::now();

        let a = fetcher.enqueue("https://example.test/a");
        let b = fetcher.enqueue("https://example.test/b");
        let c = fetcher.enqueue("https://example.test/c");
        b.abort();

        let (ra, rc) = tokio::join!(a.ready(), c.ready());
        assert!(ra.is_ok() && rc.is_ok());

        let calls = transport.calls();
        let urls: Vec<&str> = calls.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(urls, vec!["https://example.test/a", "https://example.test/c"]);
        // c takes the slot b would have used
        assert!(calls[1].1 - start < DEFAULT_MIN_INTERVAL * 2);

        assert_eq!(b.ready().await, Err(FetchError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_fans_out() {
        let transport = RecordingTransport::default();
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);

        let first = fetcher.enqueue("https://example.test/fail");
        let second = fetcher.enqueue("https://example.test/fail");
        let (r1, r2) = tokio::join!(first.ready(), second.ready());

        assert_eq!(r1, Err(FetchError::Transport("boom".to_string())));
        assert_eq!(r2, Err(FetchError::Transport("boom".to_string())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let transport = RecordingTransport::default();
        let fetcher = RateLimitedFetcher::spawn(transport.clone(), DEFAULT_MIN_INTERVAL);
        let start = Instant::now();

        fetcher.fetch("https://example.test/a").await.unwrap();

        assert!(Instant::now() - start < DEFAULT_MIN_INTERVAL);
    }
}
