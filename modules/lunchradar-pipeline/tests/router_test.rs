use std::sync::Arc;

use lunchradar_common::types::{ExtractionMethod, Strategy};
use lunchradar_pipeline::budget::CostLedger;
use lunchradar_pipeline::fetcher::FetchOutcome;
use lunchradar_pipeline::router::AcquisitionRouter;
use lunchradar_pipeline::sources::SourceOverrides;
use lunchradar_pipeline::testing::{item, make_source, MockCapture, MockFetcher, MockMenuExtractor};

struct Harness {
    fetcher: Arc<MockFetcher>,
    extractor: Arc<MockMenuExtractor>,
    capture: Arc<MockCapture>,
    ledger: Arc<CostLedger>,
    router: AcquisitionRouter,
}

fn harness(
    fetcher: MockFetcher,
    extractor: MockMenuExtractor,
    capture: MockCapture,
    overrides: SourceOverrides,
) -> Harness {
    let fetcher = Arc::new(fetcher);
    let extractor = Arc::new(extractor);
    let capture = Arc::new(capture);
    let ledger = Arc::new(CostLedger::new());
    let router = AcquisitionRouter::new(
        fetcher.clone(),
        extractor.clone(),
        capture.clone(),
        overrides,
        ledger.clone(),
    );
    Harness {
        fetcher,
        extractor,
        capture,
        ledger,
        router,
    }
}

fn lunch_items() -> Vec<lunchradar_common::types::MenuItem> {
    vec![
        item("Köttbullar med potatismos", 109),
        item("Pasta Carbonara", 115),
        item("Fisksoppa med aioli", 99),
    ]
}

#[tokio::test]
async fn traditional_acceptance_never_reaches_vision() {
    let source = make_source("Krog A", "https://kroga.se");
    let h = harness(
        MockFetcher::new().ok("https://kroga.se", "Dagens lunch hos Krog A"),
        MockMenuExtractor::new().on_text("Krog A", lunch_items()),
        MockCapture::with_png(),
        SourceOverrides::default(),
    );

    let outcome = h.router.acquire(&source).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.strategy, Some(Strategy::Traditional));
    assert_eq!(outcome.method, Some(ExtractionMethod::TextAi));
    assert_eq!(outcome.items.len(), 3);
    assert_eq!(outcome.failure, None);
    assert_eq!(h.fetcher.fetched_urls(), vec!["https://kroga.se"]);
    assert_eq!(h.extractor.vision_call_count(), 0);
    assert_eq!(h.capture.capture_count(), 0);
    // One rendered fetch, one text extraction.
    assert_eq!(outcome.cost_cents, 2);
    assert_eq!(h.ledger.total_cents(), 2);
}

#[tokio::test]
async fn pattern_extraction_alone_clears_the_gate_without_any_ai() {
    let source = make_source("Krog P", "https://krogp.se");
    let body = "Dagens lunch\n\
        Köttbullar med potatismos 109 kr\n\
        Pasta Carbonara ..... 115:-\n\
        Fisksoppa med aioli 99 SEK\n";
    let h = harness(
        MockFetcher::new().ok("https://krogp.se", body),
        MockMenuExtractor::new(),
        MockCapture::with_png(),
        SourceOverrides::default(),
    );

    let outcome = h.router.acquire(&source).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.strategy, Some(Strategy::Traditional));
    assert_eq!(outcome.method, Some(ExtractionMethod::Pattern));
    assert_eq!(outcome.items.len(), 3);
    assert_eq!(h.extractor.text_call_count(), 0);
    assert_eq!(h.extractor.vision_call_count(), 0);
    assert_eq!(h.capture.capture_count(), 0);
    // One rendered fetch; the pattern tier is free.
    assert_eq!(outcome.cost_cents, 1);
    assert_eq!(h.ledger.total_cents(), 1);
}

#[tokio::test]
async fn walks_url_candidates_until_one_succeeds() {
    let source = make_source("Krog B", "https://krogb.se/");
    let h = harness(
        MockFetcher::new()
            .on("https://krogb.se/", FetchOutcome::HttpError(404))
            .on("https://krogb.se/meny", FetchOutcome::Timeout)
            .ok("https://krogb.se/lunch", "Veckans lunch"),
        MockMenuExtractor::new().on_text("Krog B", lunch_items()),
        MockCapture::with_png(),
        SourceOverrides::default(),
    );

    let outcome = h.router.acquire(&source).await;

    assert_eq!(outcome.strategy, Some(Strategy::Traditional));
    assert_eq!(
        h.fetcher.fetched_urls(),
        vec![
            "https://krogb.se/",
            "https://krogb.se/meny",
            "https://krogb.se/lunch"
        ]
    );
}

#[tokio::test]
async fn thin_traditional_results_escalate_to_screenshot() {
    let base = "https://krogc.se";
    let mut fetcher = MockFetcher::new();
    for url in [
        "https://krogc.se",
        "https://krogc.se/meny",
        "https://krogc.se/lunch",
        "https://krogc.se/dagens-lunch",
        "https://krogc.se/menu",
        "https://krogc.se/mat",
    ] {
        fetcher = fetcher.ok(url, "Välkommen till Krog C");
    }
    let source = make_source("Krog C", base);
    let h = harness(
        fetcher,
        MockMenuExtractor::new()
            .on_text("Krog C", vec![item("Dagens rätt hos C", 110)])
            .on_vision("Krog C", vec![item("Lax i ugn", 125), item("Ärtsoppa", 99)]),
        MockCapture::with_png(),
        SourceOverrides::default(),
    );

    let outcome = h.router.acquire(&source).await;

    assert_eq!(outcome.strategy, Some(Strategy::Screenshot));
    assert_eq!(outcome.method, Some(ExtractionMethod::VisionAi));
    assert_eq!(outcome.items.len(), 2);
    assert_eq!(h.fetcher.fetched_urls().len(), 6);
    assert_eq!(h.extractor.vision_call_count(), 1);
    assert_eq!(h.capture.capture_count(), 1);
    // 6 fetches + 6 text extractions + screenshot + vision.
    assert_eq!(outcome.cost_cents, 24);
    assert_eq!(h.ledger.total_cents(), 24);
}

#[tokio::test]
async fn best_available_result_survives_a_weaker_vision_pass() {
    let source = make_source("Krog D", "https://krogd.se");
    let h = harness(
        MockFetcher::new().ok("https://krogd.se", "Lunchsida"),
        MockMenuExtractor::new()
            .on_text("Krog D", vec![item("Lax i ugn", 125), item("Ärtsoppa", 99)])
            .on_vision("Krog D", vec![item("Lax i ugn", 125)]),
        MockCapture::with_png(),
        SourceOverrides::default(),
    );

    let outcome = h.router.acquire(&source).await;

    // Vision tier was entered, so the outcome is a screenshot outcome,
    // but the larger traditional result is what gets kept.
    assert_eq!(outcome.strategy, Some(Strategy::Screenshot));
    assert_eq!(outcome.method, Some(ExtractionMethod::TextAi));
    assert_eq!(outcome.items.len(), 2);
    assert_eq!(outcome.failure, None);
}

#[tokio::test]
async fn force_screenshot_skips_the_traditional_tier() {
    let mut source = make_source("ChopChop Asian Express", "https://chopchop.se");
    source.force_screenshot = true;
    let h = harness(
        MockFetcher::new(),
        MockMenuExtractor::new().on_vision(
            "ChopChop Asian Express",
            vec![
                item("Pad Thai", 115),
                item("Röd curry", 119),
                item("Vårrullar", 89),
            ],
        ),
        MockCapture::with_png(),
        SourceOverrides::default(),
    );

    let outcome = h.router.acquire(&source).await;

    assert!(outcome.succeeded());
    assert_eq!(outcome.strategy, Some(Strategy::Screenshot));
    assert!(h.fetcher.fetched_urls().is_empty());
    assert_eq!(h.extractor.text_call_count(), 0);
    assert_eq!(h.extractor.vision_call_count(), 1);
    // Screenshot + vision only.
    assert_eq!(outcome.cost_cents, 12);
}

#[tokio::test]
async fn screenshot_override_list_works_like_the_source_flag() {
    let source = make_source("Ristorante Rustico", "https://rustico.se");
    let h = harness(
        MockFetcher::new(),
        MockMenuExtractor::new().on_vision("Ristorante Rustico", lunch_items()),
        MockCapture::with_png(),
        SourceOverrides::default().force_screenshot("ristorante-rustico"),
    );

    let outcome = h.router.acquire(&source).await;

    assert!(h.fetcher.fetched_urls().is_empty());
    assert_eq!(outcome.strategy, Some(Strategy::Screenshot));
}

#[tokio::test]
async fn menu_url_override_replaces_candidate_probing() {
    let source = make_source("Krog E", "https://kroge.se");
    let h = harness(
        MockFetcher::new().ok("https://kroge.se/var-speciella-lunchsida", "Lunch"),
        MockMenuExtractor::new().on_text("Krog E", lunch_items()),
        MockCapture::with_png(),
        SourceOverrides::default().url_override("krog-e", "https://kroge.se/var-speciella-lunchsida"),
    );

    let outcome = h.router.acquire(&source).await;

    assert_eq!(outcome.strategy, Some(Strategy::Traditional));
    assert_eq!(
        h.fetcher.fetched_urls(),
        vec!["https://kroge.se/var-speciella-lunchsida"]
    );
}

#[tokio::test]
async fn source_without_website_is_skipped() {
    let mut source = make_source("Hemlig Krog", "https://unused.se");
    source.website = None;
    let h = harness(
        MockFetcher::new(),
        MockMenuExtractor::new(),
        MockCapture::with_png(),
        SourceOverrides::default(),
    );

    let outcome = h.router.acquire(&source).await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.strategy, None);
    assert_eq!(outcome.method, None);
    assert_eq!(outcome.failure.as_deref(), Some("no website"));
    assert_eq!(outcome.cost_cents, 0);
}

#[tokio::test]
async fn everything_failing_still_produces_an_outcome() {
    let source = make_source("Krog F", "https://krogf.se");
    let h = harness(
        MockFetcher::new(),
        MockMenuExtractor::new(),
        MockCapture::failing(),
        SourceOverrides::default(),
    );

    let outcome = h.router.acquire(&source).await;

    assert!(!outcome.succeeded());
    assert_eq!(outcome.strategy, Some(Strategy::Screenshot));
    assert_eq!(outcome.failure.as_deref(), Some("no menu found"));
    // 6 failed fetches + the screenshot attempt; no extraction charges.
    assert_eq!(outcome.cost_cents, 8);
}
