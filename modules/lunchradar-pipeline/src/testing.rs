//! Mock backends for router and pipeline tests.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use lunchradar_common::types::{ExtractionMethod, ExtractionResult, MenuItem, Source};

use crate::extractor::MenuExtractor;
use crate::fetcher::{ContentFetcher, FetchAttempt, FetchOutcome, RenderMode};
use crate::capture::ScreenshotCapture;

pub fn make_source(name: &str, website: &str) -> Source {
    Source::builder()
        .id(lunchradar_common::types::source_id(name))
        .name(name.to_string())
        .website(Some(website.to_string()))
        .build()
}

pub fn item(name: &str, price: u32) -> MenuItem {
    MenuItem::new_validated(name, price, None, None, None).expect("valid test item")
}

/// Canned fetch responses keyed by URL; unknown URLs are network errors.
/// Records every requested URL in order.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, FetchOutcome>,
    pub fetched: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, url: &str, outcome: FetchOutcome) -> Self {
        self.responses.insert(url.to_string(), outcome);
        self
    }

    pub fn ok(self, url: &str, body: &str) -> Self {
        self.on(url, FetchOutcome::Ok(body.to_string()))
    }

    pub fn fetched_urls(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentFetcher for MockFetcher {
    async fn fetch(&self, url: &str, mode: RenderMode) -> FetchAttempt {
        self.fetched.lock().unwrap().push(url.to_string());
        let outcome = self
            .responses
            .get(url)
            .cloned()
            .unwrap_or(FetchOutcome::NetworkError);
        let bytes = match &outcome {
            FetchOutcome::Ok(body) => body.len(),
            _ => 0,
        };
        FetchAttempt {
            url: url.to_string(),
            mode,
            outcome,
            bytes,
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Canned extraction results keyed by source name.
#[derive(Default)]
pub struct MockMenuExtractor {
    text: HashMap<String, Vec<MenuItem>>,
    vision: HashMap<String, Vec<MenuItem>>,
    pub text_calls: Mutex<Vec<String>>,
    pub vision_calls: Mutex<Vec<String>>,
}

impl MockMenuExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_text(mut self, source_name: &str, items: Vec<MenuItem>) -> Self {
        self.text.insert(source_name.to_string(), items);
        self
    }

    pub fn on_vision(mut self, source_name: &str, items: Vec<MenuItem>) -> Self {
        self.vision.insert(source_name.to_string(), items);
        self
    }

    pub fn text_call_count(&self) -> usize {
        self.text_calls.lock().unwrap().len()
    }

    pub fn vision_call_count(&self) -> usize {
        self.vision_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MenuExtractor for MockMenuExtractor {
    async fn extract_from_text(&self, _text: &str, source_name: &str) -> ExtractionResult {
        self.text_calls.lock().unwrap().push(source_name.to_string());
        ExtractionResult {
            items: self.text.get(source_name).cloned().unwrap_or_default(),
            method: ExtractionMethod::TextAi,
        }
    }

    async fn extract_from_screenshot(&self, _png: &[u8], source_name: &str) -> ExtractionResult {
        self.vision_calls.lock().unwrap().push(source_name.to_string());
        ExtractionResult {
            items: self.vision.get(source_name).cloned().unwrap_or_default(),
            method: ExtractionMethod::VisionAi,
        }
    }
}

/// Screenshot backend returning a fixed PNG, or failing when built with
/// [`MockCapture::failing`]. Records captured URLs.
pub struct MockCapture {
    png: Option<Vec<u8>>,
    pub captured: Mutex<Vec<String>>,
}

impl MockCapture {
    pub fn with_png() -> Self {
        Self {
            png: Some(vec![0x89, b'P', b'N', b'G']),
            captured: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            png: None,
            captured: Mutex::new(Vec::new()),
        }
    }

    pub fn capture_count(&self) -> usize {
        self.captured.lock().unwrap().len()
    }
}

#[async_trait]
impl ScreenshotCapture for MockCapture {
    async fn capture(&self, url: &str) -> Result<Vec<u8>> {
        self.captured.lock().unwrap().push(url.to_string());
        self.png
            .clone()
            .ok_or_else(|| anyhow!("capture disabled in this test"))
    }
}
