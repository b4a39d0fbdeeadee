//! Zero-cost pattern extraction over normalized text.
//!
//! Three line-oriented heuristics, tuned for the way Swedish lunch pages
//! are actually written. Runs before any AI call; if it finds enough, the
//! whole AI tier is skipped.

use std::collections::HashSet;

use lunchradar_common::quality::{
    PATTERN_DEFAULT_PRICE, PATTERN_MAX_ITEMS, PATTERN_PRICE_MAX, PATTERN_PRICE_MIN,
};
use lunchradar_common::types::{ExtractionMethod, ExtractionResult, MenuItem};
use regex::Regex;

const WEEKDAYS: &[&str] = &["måndag", "tisdag", "onsdag", "torsdag", "fredag"];

/// Trailing punctuation between a dish name and its price (dot leaders,
/// dashes, colons).
const NAME_TRAILER: &[char] = &[' ', '\t', '.', '·', '…', ':', '-', '–', ','];

pub fn extract_by_pattern(text: &str) -> ExtractionResult {
    let mut items = Vec::new();

    // "Köttbullar med potatismos ..... 109 kr"
    let trailing_price =
        Regex::new(r"(?m)^([A-ZÅÄÖ][^\n]{3,79}?)[\s.·…:,\-–]*(\d{2,3})\s*(?:kr\b|:-|SEK\b)")
            .expect("valid regex");
    for cap in trailing_price.captures_iter(text) {
        let name = cap[1].trim_matches(NAME_TRAILER);
        if starts_with_weekday(name) {
            continue;
        }
        let Ok(price) = cap[2].parse::<u32>() else {
            continue;
        };
        if !(PATTERN_PRICE_MIN..=PATTERN_PRICE_MAX).contains(&price) {
            continue;
        }
        if name.chars().count() < 5 {
            continue;
        }
        if let Some(item) = MenuItem::new_validated(name, price, None, None, None) {
            items.push(item);
        }
    }

    // "Måndag: Pasta Carbonara" — weekday boards, often without prices.
    let weekday_line = Regex::new(r"(?mi)^(måndag|tisdag|onsdag|torsdag|fredag)\s*[:\-–]?\s+(\S.{4,119})$")
        .expect("valid regex");
    let explicit_price =
        Regex::new(r"^(.+?)[\s.·…:,\-–]*(\d{2,3})\s*(?:kr\b|:-|SEK\b)\s*$").expect("valid regex");
    for cap in weekday_line.captures_iter(text) {
        let day = cap[1].to_lowercase();
        let dish = cap[2].trim();
        let (name, price) = match explicit_price.captures(dish) {
            Some(p) => {
                let price = p[2].parse::<u32>().unwrap_or(PATTERN_DEFAULT_PRICE);
                (p.get(1).map_or(dish, |m| m.as_str()), price)
            }
            None => (dish, PATTERN_DEFAULT_PRICE),
        };
        let name = name.trim_matches(NAME_TRAILER);
        if !(PATTERN_PRICE_MIN..=PATTERN_PRICE_MAX).contains(&price) {
            continue;
        }
        if name.chars().count() < 5 {
            continue;
        }
        if let Some(item) = MenuItem::new_validated(name, price, None, None, Some(day)) {
            items.push(item);
        }
    }

    // "1. Pad Thai 115" — numbered menus, currency marker optional.
    let numbered = Regex::new(r"(?m)^\s*\d{1,2}[.)]\s+(\S[^\n]{3,79}?)[\s.·…:,\-–]*(\d{2,3})\s*(?:kr\b|:-|SEK\b)?\s*$")
        .expect("valid regex");
    for cap in numbered.captures_iter(text) {
        let name = cap[1].trim_matches(NAME_TRAILER);
        let Ok(price) = cap[2].parse::<u32>() else {
            continue;
        };
        if !(PATTERN_PRICE_MIN..=PATTERN_PRICE_MAX).contains(&price) {
            continue;
        }
        if name.chars().count() < 5 {
            continue;
        }
        if let Some(item) = MenuItem::new_validated(name, price, None, None, None) {
            items.push(item);
        }
    }

    ExtractionResult {
        items: dedupe(items),
        method: ExtractionMethod::Pattern,
    }
}

fn starts_with_weekday(name: &str) -> bool {
    let lower = name.to_lowercase();
    WEEKDAYS.iter().any(|d| lower.starts_with(d))
}

/// Heuristics overlap; keep the first item per 20-char name prefix. The
/// prefix key also folds "Pasta Carbonara 115" vs "Pasta Carbonara" style
/// near-duplicates from sloppy markup.
fn dedupe(items: Vec<MenuItem>) -> Vec<MenuItem> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let key: String = item.name.to_lowercase().chars().take(20).collect();
        if seen.insert(key) {
            out.push(item);
        }
    }
    out.truncate(PATTERN_MAX_ITEMS);
    out
}
