use std::sync::Arc;

use anyhow::anyhow;
use tokio::{
    sync::{mpsc, Semaphore},
    task::JoinHandle,
};

use crate::{
    configuration::{FailurePolicy, DEFAULT_CONCURRENCY},
    domain::game_review::{CrawlOutcome, GameReview},
};

use super::{PageFetcher, Progress, StoreScraper};

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            concurrency: DEFAULT_CONCURRENCY,
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Crawls every query with at most `options.concurrency` fetches in flight.
///
/// Returns one outcome per query, in input order. Progress is reported as
/// queries finish. Under [`FailurePolicy::FailFast`] the first failed query
/// (in input order) turns the whole batch into an error.
pub async fn crawl_game_reviews<F>(
    scraper: Arc<StoreScraper<F>>,
    queries: Vec<String>,
    options: BatchOptions,
    progress: &mut dyn Progress,
) -> anyhow::Result<Vec<CrawlOutcome>>
where
    F: PageFetcher + 'static,
{
    let total = queries.len();
    let concurrency = options.concurrency.max(1);
    log::info!(
        "Started crawl of {} queries with concurrency {}",
        total,
        concurrency
    );

    let semaphore = Arc::new(Semaphore::new(concurrency));
    let (done_sender, mut done_receiver) = mpsc::unbounded_channel::<String>();

    progress.begin(total);

    let handles: Vec<(String, JoinHandle<anyhow::Result<GameReview>>)> = queries
        .into_iter()
        .map(|query| {
            let handle = tokio::spawn(crawl_one(
                scraper.clone(),
                semaphore.clone(),
                done_sender.clone(),
                query.clone(),
            ));
            (query, handle)
        })
        .collect();

    // Only the tasks hold senders now, so the loop ends once every task is done.
    drop(done_sender);

    let mut done = 0;
    while let Some(query) = done_receiver.recv().await {
        done += 1;
        progress.item_done(done, total, &query);
    }
    progress.finish();

    let mut outcomes = Vec::with_capacity(total);
    for (query, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(anyhow!("Crawl task for query {} did not finish: {}", query, e)),
        };

        match (result, options.failure_policy) {
            (Ok(review), _) => outcomes.push(CrawlOutcome::success(review)),
            (Err(e), FailurePolicy::Isolate) => {
                outcomes.push(CrawlOutcome::failed(query, format!("{:#}", e)))
            }
            (Err(e), FailurePolicy::FailFast) => return Err(e),
        }
    }

    log::info!(
        "Finished crawl: {} queries, {} failed",
        outcomes.len(),
        outcomes.iter().filter(|o| o.failure.is_some()).count()
    );

    Ok(outcomes)
}

/// Reports a query as done when dropped, so a panicking crawl still counts.
struct CompletionNotice {
    done_sender: mpsc::UnboundedSender<String>,
    query: String,
}

impl Drop for CompletionNotice {
    fn drop(&mut self) {
        // Receiver lives until every sender is dropped.
        _ = self.done_sender.send(std::mem::take(&mut self.query));
    }
}

async fn crawl_one<F: PageFetcher>(
    scraper: Arc<StoreScraper<F>>,
    semaphore: Arc<Semaphore>,
    done_sender: mpsc::UnboundedSender<String>,
    query: String,
) -> anyhow::Result<GameReview> {
    let _notice = CompletionNotice {
        done_sender,
        query: query.clone(),
    };

    let result = match semaphore.acquire_owned().await {
        Ok(_permit) => scraper.extract_game_review(&query).await,
        Err(e) => Err(e.into()),
    };

    if let Err(ref e) = result {
        log::error!("Crawl failed on query {}: {:#}", query, e);
    }

    result
}
