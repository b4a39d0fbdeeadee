//! AI-backed extraction tiers: text model over normalized content, vision
//! model over full-page screenshots.

use ai_client::{util, OpenAi};
use async_trait::async_trait;
use lunchradar_common::quality::{
    AI_MAX_ITEMS, TEXT_AI_PRICE_MAX, TEXT_AI_PRICE_MIN, VISION_DEFAULT_PRICE, VISION_PRICE_MAX,
    VISION_PRICE_MIN,
};
use lunchradar_common::types::{ExtractionMethod, ExtractionResult, MenuItem};
use serde::Deserialize;
use tracing::{debug, warn};

pub const TEXT_MODEL: &str = "gpt-4o-mini";
pub const VISION_MODEL: &str = "gpt-4o";

const CATEGORIES: &str =
    "Kött, Kyckling, Fisk, Vegetarisk, Vegansk, Pizza, Pasta, Asiatiskt, Sushi, Sallad, Soppa, Buffé";

/// Cuisine markers in a restaurant name that predict untranslated dish
/// names; the prompts then demand Swedish descriptions alongside.
const FOREIGN_CUISINE_MARKERS: &[&str] = &[
    "thai", "sushi", "persisk", "persian", "indisk", "indian", "asiatisk", "asian", "kina",
    "china", "wok", "kebab", "meze", "bonab",
];

const TEXT_SYSTEM_PROMPT: &str = r#"You extract lunch menu items from Swedish restaurant web pages.

Rules:
- Only include actual lunch dishes served at this restaurant. Ignore opening hours, addresses, dinner/à la carte menus, drinks and desserts.
- Lunch prices in Sweden are 40-300 kr. Skip anything priced outside that range.
- If a dish is tied to a weekday, set "day" to the Swedish weekday name in lowercase ("måndag".."fredag"). Otherwise omit it.
- Return at most 20 items.

Respond with ONLY a JSON array, no prose. Each element:
{"name": "...", "price": 115, "category": "...", "description": "...", "day": "..."}

"price" is whole SEK. "category" is one of: CATEGORIES. "description" and "day" may be omitted.
If the page has no lunch menu, return []."#;

const VISION_SYSTEM_PROMPT: &str = r#"You read a full-page screenshot of a Swedish restaurant website and extract the lunch menu.

Rules:
- Read every visible dish, including ones in images, boards and stylized sections.
- Lunch prices in Sweden are 40-300 kr. If a dish has no visible price, omit "price".
- If a dish is tied to a weekday, set "day" to the Swedish weekday name in lowercase.
- Return at most 20 items.

Respond with ONLY a JSON array, no prose. Each element:
{"name": "...", "price": 115, "category": "...", "description": "...", "day": "..."}

"category" is one of: CATEGORIES.
If no lunch menu is visible, return []."#;

const SWEDISH_DESCRIPTION_HINT: &str = "The dish names may be in a foreign language. For every such dish, include a short Swedish description of what it contains.";

/// Loosely-typed item as the model returns it. Everything optional;
/// prices arrive as numbers, floats, or strings like "115:-".
#[derive(Debug, Deserialize)]
struct RawItem {
    name: Option<String>,
    #[serde(default)]
    price: Option<serde_json::Value>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    day: Option<String>,
}

#[async_trait]
pub trait MenuExtractor: Send + Sync {
    /// Extract menu items from normalized page text. Absorbs backend and
    /// parse failures into an empty result.
    async fn extract_from_text(&self, text: &str, source_name: &str) -> ExtractionResult;

    /// Extract menu items from a full-page PNG screenshot.
    async fn extract_from_screenshot(&self, png: &[u8], source_name: &str) -> ExtractionResult;
}

pub struct OpenAiMenuExtractor {
    text: OpenAi,
    vision: OpenAi,
}

impl OpenAiMenuExtractor {
    pub fn new(api_key: &str) -> Self {
        Self {
            text: OpenAi::new(api_key, TEXT_MODEL),
            vision: OpenAi::new(api_key, VISION_MODEL),
        }
    }
}

#[async_trait]
impl MenuExtractor for OpenAiMenuExtractor {
    async fn extract_from_text(&self, text: &str, source_name: &str) -> ExtractionResult {
        let system = TEXT_SYSTEM_PROMPT.replace("CATEGORIES", CATEGORIES);
        let mut user = format!("Restaurant: {source_name}\n");
        if is_foreign_cuisine(source_name) {
            user.push_str(SWEDISH_DESCRIPTION_HINT);
            user.push('\n');
        }
        user.push_str("\nPage text:\n");
        user.push_str(text);

        match self.text.chat_completion(system, user).await {
            Ok(response) => parse_items(&response, ExtractionMethod::TextAi, source_name),
            Err(e) => {
                warn!(source = source_name, error = %e, "Text extraction call failed");
                ExtractionResult::empty(ExtractionMethod::TextAi)
            }
        }
    }

    async fn extract_from_screenshot(&self, png: &[u8], source_name: &str) -> ExtractionResult {
        let mut prompt = VISION_SYSTEM_PROMPT.replace("CATEGORIES", CATEGORIES);
        prompt.push_str(&format!("\n\nRestaurant: {source_name}"));
        if is_foreign_cuisine(source_name) {
            prompt.push('\n');
            prompt.push_str(SWEDISH_DESCRIPTION_HINT);
        }

        match self.vision.chat_with_image(prompt, png).await {
            Ok(response) => parse_items(&response, ExtractionMethod::VisionAi, source_name),
            Err(e) => {
                warn!(source = source_name, error = %e, "Vision extraction call failed");
                ExtractionResult::empty(ExtractionMethod::VisionAi)
            }
        }
    }
}

fn is_foreign_cuisine(source_name: &str) -> bool {
    let lower = source_name.to_lowercase();
    FOREIGN_CUISINE_MARKERS.iter().any(|m| lower.contains(m))
}

/// Defensive parse of a model response. Anything malformed degrades to
/// fewer (or zero) items, never an error.
fn parse_items(response: &str, method: ExtractionMethod, source_name: &str) -> ExtractionResult {
    let Some(json) = util::extract_json_array(response) else {
        warn!(source = source_name, "No JSON array in model response");
        return ExtractionResult::empty(method);
    };

    let raw: Vec<RawItem> = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(source = source_name, error = %e, "Model returned unparseable JSON");
            return ExtractionResult::empty(method);
        }
    };

    let mut items = Vec::new();
    for entry in raw.into_iter().take(AI_MAX_ITEMS) {
        let Some(name) = entry.name else {
            continue;
        };
        let Some(price) = apply_price_policy(parse_price(entry.price.as_ref()), method) else {
            debug!(source = source_name, name = %name, "Dropped item on price policy");
            continue;
        };
        if let Some(item) =
            MenuItem::new_validated(&name, price, entry.category, entry.description, entry.day)
        {
            items.push(item);
        }
    }

    ExtractionResult { items, method }
}

/// Text items outside the plausible range are discarded; vision items are
/// clamped or defaulted instead, since the dish is visibly real even when
/// the printed price is not machine-readable.
fn apply_price_policy(price: Option<u32>, method: ExtractionMethod) -> Option<u32> {
    match method {
        ExtractionMethod::TextAi => {
            price.filter(|p| (TEXT_AI_PRICE_MIN..=TEXT_AI_PRICE_MAX).contains(p))
        }
        ExtractionMethod::VisionAi => Some(
            price
                .unwrap_or(VISION_DEFAULT_PRICE)
                .clamp(VISION_PRICE_MIN, VISION_PRICE_MAX),
        ),
        ExtractionMethod::Pattern => price,
    }
}

fn parse_price(value: Option<&serde_json::Value>) -> Option<u32> {
    match value? {
        serde_json::Value::Number(n) => {
            let f = n.as_f64()?;
            if f.is_finite() && f >= 0.0 {
                Some(f.round() as u32)
            } else {
                None
            }
        }
        serde_json::Value::String(s) => {
            let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse().ok()
        }
        _ => None,
    }
}
