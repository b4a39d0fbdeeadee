//! One pipeline run, end to end: schedule, acquire concurrently under a
//! wall-clock deadline, then merge and persist whatever completed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Utc};
use lunchradar_common::types::{AcquisitionOutcome, DishRecord, Source};
use lunchradar_common::Config;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;
use tracing::{info, warn};
use uuid::Uuid;

use crate::budget::CostLedger;
use crate::capture::BrowserlessCapture;
use crate::extractor::OpenAiMenuExtractor;
use crate::fetcher::ScraperApiFetcher;
use crate::report::RunReport;
use crate::router::AcquisitionRouter;
use crate::scheduler::UpdateScheduler;
use crate::sources::{self, SourceProfile};
use crate::store::Store;

/// Sources processed in parallel. Each worker holds open connections to
/// the proxy and the AI backend; three keeps both within rate limits.
pub const MAX_CONCURRENT_SOURCES: usize = 3;

/// Stagger between worker spawns so the proxy does not see a burst.
pub const SOURCE_SPAWN_DELAY: Duration = Duration::from_secs(2);

pub struct Pipeline {
    scheduler: UpdateScheduler,
    router: Arc<AcquisitionRouter>,
    ledger: Arc<CostLedger>,
    store: Store,
    profile: SourceProfile,
}

impl Pipeline {
    /// Wire up production backends from configuration.
    pub fn new(config: &Config, profile: SourceProfile) -> Self {
        let ledger = Arc::new(CostLedger::new());
        let router = Arc::new(AcquisitionRouter::new(
            Arc::new(ScraperApiFetcher::new(
                &config.scraperapi_key,
                &config.country_code,
            )),
            Arc::new(OpenAiMenuExtractor::new(&config.openai_api_key)),
            Arc::new(BrowserlessCapture::new(
                &config.browserless_url,
                config.browserless_token.as_deref(),
            )),
            profile.overrides.clone(),
            ledger.clone(),
        ));
        Self {
            scheduler: UpdateScheduler::new(profile.overrides.clone()),
            router,
            ledger,
            store: Store::from_env(),
            profile,
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn with_backends(
        router: Arc<AcquisitionRouter>,
        ledger: Arc<CostLedger>,
        store: Store,
        profile: SourceProfile,
    ) -> Self {
        Self {
            scheduler: UpdateScheduler::new(profile.overrides.clone()),
            router,
            ledger,
            store,
            profile,
        }
    }

    /// Run once. Completed sources are merged and persisted even when the
    /// deadline cuts the run short; the report says which happened.
    pub async fn run(&self, force_all: bool, deadline: Duration) -> anyhow::Result<RunReport> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        info!(run_id = %run_id, force_all, "Run starting");

        let sources = self
            .profile
            .apply(sources::load_sources(&self.store.sources_path())?);
        let today = Utc::now().weekday();
        let due: Vec<Source> = self
            .scheduler
            .due(&sources, today, force_all)
            .into_iter()
            .cloned()
            .collect();

        let outcomes = Arc::new(Mutex::new(Vec::<AcquisitionOutcome>::new()));
        let timed_out = tokio::time::timeout(deadline, self.acquire_all(due, outcomes.clone()))
            .await
            .is_err();
        if timed_out {
            warn!(run_id = %run_id, deadline_secs = deadline.as_secs(), "Run hit deadline");
        }

        let outcomes = outcomes.lock().await.clone();

        // Merge and persist unconditionally so a timeout never discards
        // the sources that did finish.
        let mut dataset = self.store.load_dataset().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load previous dataset, starting fresh");
            Default::default()
        });
        let fragment: Vec<DishRecord> = outcomes
            .iter()
            .flat_map(|o| o.items.iter().map(|item| DishRecord::from_item(item, o)))
            .collect();
        dataset.merge_fragment(fragment);
        self.store.save_dataset(&dataset, &sources)?;
        self.store.save_outcomes(&run_id, &outcomes)?;

        let report = RunReport::from_outcomes(&run_id, started_at, &outcomes, timed_out);
        info!(
            run_id = %run_id,
            ledger_cents = self.ledger.total_cents(),
            "Run finished: {report}"
        );
        Ok(report)
    }

    /// Spawn one worker per due source, bounded by the semaphore. Dropping
    /// the future (deadline) drops the JoinSet, aborting unfinished
    /// workers; finished ones have already pushed their outcome.
    async fn acquire_all(&self, due: Vec<Source>, outcomes: Arc<Mutex<Vec<AcquisitionOutcome>>>) {
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_SOURCES));
        let mut workers = JoinSet::new();

        for (i, source) in due.into_iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(SOURCE_SPAWN_DELAY).await;
            }
            let semaphore = semaphore.clone();
            let router = self.router.clone();
            let outcomes = outcomes.clone();
            workers.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };
                let outcome = router.acquire(&source).await;
                info!(
                    source = %outcome.source_id,
                    succeeded = outcome.succeeded(),
                    items = outcome.items.len(),
                    cost_cents = outcome.cost_cents,
                    "Source finished"
                );
                outcomes.lock().await.push(outcome);
            });
        }

        while workers.join_next().await.is_some() {}
    }
}
