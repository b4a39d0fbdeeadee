//! Per-source acquisition state machine.
//!
//! Traditional tier first: walk URL candidates, fetch rendered HTML,
//! try pattern extraction, escalate to the text model when the pattern
//! result is thin. If no candidate clears the quality gate, fall through
//! to the vision tier (screenshot + vision model), which is terminal —
//! whatever it yields, combined with the best traditional attempt, is the
//! outcome.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use lunchradar_common::quality;
use lunchradar_common::types::{
    AcquisitionOutcome, ExtractionMethod, ExtractionResult, Source, Strategy,
};
use tracing::{debug, info, warn};

use crate::budget::{CostLedger, OperationCost};
use crate::capture::ScreenshotCapture;
use crate::extractor::MenuExtractor;
use crate::fetcher::{ContentFetcher, RenderMode};
use crate::normalize::normalize;
use crate::pattern::extract_by_pattern;
use crate::sources::SourceOverrides;

/// Conventional Swedish menu paths probed after the site root.
pub const MENU_PATH_SUFFIXES: &[&str] = &["meny", "lunch", "dagens-lunch", "menu", "mat"];

pub const MAX_URL_CANDIDATES: usize = 6;

pub struct AcquisitionRouter {
    fetcher: Arc<dyn ContentFetcher>,
    extractor: Arc<dyn MenuExtractor>,
    capture: Arc<dyn ScreenshotCapture>,
    overrides: SourceOverrides,
    ledger: Arc<CostLedger>,
}

impl AcquisitionRouter {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        extractor: Arc<dyn MenuExtractor>,
        capture: Arc<dyn ScreenshotCapture>,
        overrides: SourceOverrides,
        ledger: Arc<CostLedger>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            capture,
            overrides,
            ledger,
        }
    }

    /// Acquire one source. Always returns an outcome; every failure mode
    /// along the way is absorbed into it.
    pub async fn acquire(&self, source: &Source) -> AcquisitionOutcome {
        let Some(base_url) = self.primary_url(source) else {
            debug!(source = %source.id, "No website, skipping");
            return self.outcome(source, None, None, Vec::new(), 0, Some("no website".into()));
        };

        let mut cost = 0u64;
        let mut best: Option<ExtractionResult> = None;

        let force = source.force_screenshot || self.overrides.wants_screenshot(&source.id);
        if !force {
            for url in self.candidate_urls(source, &base_url) {
                let attempt = self.fetcher.fetch(&url, RenderMode::Rendered).await;
                cost += self.charge(OperationCost::RENDERED_FETCH);

                let Some(body) = attempt.content() else {
                    debug!(source = %source.id, url = %url, outcome = ?attempt.outcome, "Candidate failed");
                    continue;
                };
                let text = normalize(body);
                if text.is_empty() {
                    continue;
                }

                let mut result = extract_by_pattern(&text);
                if !quality::is_acceptable(&result) {
                    keep_best(&mut best, result);
                    cost += self.charge(OperationCost::TEXT_EXTRACTION);
                    result = self.extractor.extract_from_text(&text, &source.name).await;
                }

                if quality::is_acceptable(&result) {
                    info!(
                        source = %source.id,
                        url = %url,
                        method = result.method.as_str(),
                        items = result.items.len(),
                        "Accepted traditional extraction"
                    );
                    let method = result.method;
                    return self.outcome(
                        source,
                        Some(Strategy::Traditional),
                        Some(method),
                        result.items,
                        cost,
                        None,
                    );
                }
                keep_best(&mut best, result);
            }
            debug!(source = %source.id, "Traditional tier exhausted, escalating");
        }

        // Vision tier. Terminal: no further strategy exists, so the best
        // result seen anywhere becomes the outcome.
        cost += self.charge(OperationCost::SCREENSHOT_CAPTURE);
        match self.capture.capture(&base_url).await {
            Ok(png) => {
                cost += self.charge(OperationCost::VISION_EXTRACTION);
                let result = self.extractor.extract_from_screenshot(&png, &source.name).await;
                info!(
                    source = %source.id,
                    items = result.items.len(),
                    "Vision extraction complete"
                );
                keep_best(&mut best, result);
            }
            Err(e) => {
                warn!(source = %source.id, url = %base_url, error = %e, "Screenshot capture failed");
            }
        }

        let best = best.unwrap_or_else(|| ExtractionResult::empty(ExtractionMethod::VisionAi));
        let failure = best.items.is_empty().then(|| "no menu found".to_string());
        self.outcome(
            source,
            Some(Strategy::Screenshot),
            Some(best.method),
            best.items,
            cost,
            failure,
        )
    }

    fn charge(&self, cents: u64) -> u64 {
        self.ledger.add(cents);
        cents
    }

    fn primary_url(&self, source: &Source) -> Option<String> {
        if let Some(url) = self.overrides.menu_url(&source.id) {
            return Some(url.to_string());
        }
        if let Some(url) = &source.menu_url_override {
            return Some(url.clone());
        }
        source.website.clone()
    }

    /// The primary URL plus conventional menu paths, deduped, capped. An
    /// explicit menu URL override skips the probing entirely.
    fn candidate_urls(&self, source: &Source, base_url: &str) -> Vec<String> {
        if self.overrides.menu_url(&source.id).is_some() || source.menu_url_override.is_some() {
            return vec![base_url.to_string()];
        }

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        let trimmed = base_url.trim_end_matches('/');
        for candidate in std::iter::once(base_url.to_string())
            .chain(MENU_PATH_SUFFIXES.iter().map(|s| format!("{trimmed}/{s}")))
        {
            if seen.insert(candidate.clone()) {
                urls.push(candidate);
            }
        }
        urls.truncate(MAX_URL_CANDIDATES);
        urls
    }

    fn outcome(
        &self,
        source: &Source,
        strategy: Option<Strategy>,
        method: Option<ExtractionMethod>,
        items: Vec<lunchradar_common::types::MenuItem>,
        cost_cents: u64,
        failure: Option<String>,
    ) -> AcquisitionOutcome {
        AcquisitionOutcome {
            source_id: source.id.clone(),
            source_name: source.name.clone(),
            strategy,
            method,
            items,
            cost_cents,
            acquired_at: Utc::now(),
            failure,
        }
    }
}

/// Keep the larger result. Ties keep the earlier one, so a vision result
/// only displaces a traditional result by strictly improving on it.
fn keep_best(best: &mut Option<ExtractionResult>, candidate: ExtractionResult) {
    let incumbent = best.as_ref().map_or(0, |r| r.quality());
    if candidate.quality() > incumbent {
        *best = Some(candidate);
    }
}
