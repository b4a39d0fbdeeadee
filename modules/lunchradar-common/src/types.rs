use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// How often a source's menu changes, and therefore how often it is
/// re-acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateCadence {
    /// Menu changes every day (dagens lunch boards).
    Daily,
    /// Fixed weekly menu, refreshed on `update_day`.
    #[default]
    Weekly,
    /// Rarely changes; still re-checked once a week on `update_day`.
    Static,
}

/// A candidate restaurant website to acquire menu data from.
///
/// Produced by the discovery collaborator (or manual configuration),
/// immutable during a run.
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
pub struct Source {
    /// Stable identifier derived from the name via [`source_id`].
    pub id: String,
    pub name: String,
    #[builder(default)]
    #[serde(default)]
    pub website: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub cadence: UpdateCadence,
    /// Day weekly/static sources are refreshed on.
    #[builder(default = Weekday::Mon)]
    #[serde(default = "default_update_day", with = "weekday_str")]
    pub update_day: Weekday,
    /// 1 = always process first; larger is later.
    #[builder(default = 3)]
    #[serde(default = "default_priority")]
    pub priority: u8,
    /// Skip the traditional fetch loop and go straight to the vision tier.
    #[builder(default)]
    #[serde(default)]
    pub force_screenshot: bool,
    /// Fixed menu page to use instead of probing conventional paths.
    #[builder(default)]
    #[serde(default)]
    pub menu_url_override: Option<String>,
    /// Lunch-hours signal from discovery; `None` means unknown.
    #[builder(default)]
    #[serde(default)]
    pub serves_lunch: Option<bool>,
}

fn default_update_day() -> Weekday {
    Weekday::Mon
}

fn default_priority() -> u8 {
    3
}

/// Derive a stable source identifier from a display name.
/// Lowercases, folds Swedish diacritics, and dashes everything else, so
/// "KRUBB Burgers Sundbyberg" → "krubb-burgers-sundbyberg".
pub fn source_id(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.to_lowercase().chars() {
        match c {
            'å' | 'ä' => out.push('a'),
            'ö' => out.push('o'),
            'é' | 'è' => out.push('e'),
            c if c.is_alphanumeric() => out.push(c),
            _ => {
                if !out.ends_with('-') && !out.is_empty() {
                    out.push('-');
                }
            }
        }
    }
    out.trim_matches('-').to_string()
}

/// Serialize weekdays as full lowercase names ("monday"), matching the
/// persisted source documents.
pub mod weekday_str {
    use chrono::Weekday;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn to_str(day: Weekday) -> &'static str {
        match day {
            Weekday::Mon => "monday",
            Weekday::Tue => "tuesday",
            Weekday::Wed => "wednesday",
            Weekday::Thu => "thursday",
            Weekday::Fri => "friday",
            Weekday::Sat => "saturday",
            Weekday::Sun => "sunday",
        }
    }

    pub fn from_str(s: &str) -> Option<Weekday> {
        match s {
            "monday" => Some(Weekday::Mon),
            "tuesday" => Some(Weekday::Tue),
            "wednesday" => Some(Weekday::Wed),
            "thursday" => Some(Weekday::Thu),
            "friday" => Some(Weekday::Fri),
            "saturday" => Some(Weekday::Sat),
            "sunday" => Some(Weekday::Sun),
            _ => None,
        }
    }

    pub fn serialize<S: Serializer>(day: &Weekday, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_str(to_str(*day))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Weekday, D::Error> {
        let s = String::deserialize(de)?;
        from_str(&s).ok_or_else(|| de::Error::custom(format!("unknown weekday: {s}")))
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Which extraction tier produced a set of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Pattern,
    TextAi,
    VisionAi,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Pattern => "pattern",
            ExtractionMethod::TextAi => "text_ai",
            ExtractionMethod::VisionAi => "vision_ai",
        }
    }
}

/// Acquisition strategy recorded on the final outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Rendered HTML fetch + text extraction.
    Traditional,
    /// Full-page visual capture + vision extraction.
    Screenshot,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Traditional => "traditional",
            Strategy::Screenshot => "screenshot",
        }
    }
}

pub const DEFAULT_CATEGORY: &str = "Dagens rätt";

/// Characters a real dish name never starts with — leftovers from markup
/// or markdown conversion.
const MARKUP_ARTIFACTS: &[char] = &['<', '>', '#', '*', '{', '}', '[', ']', '|', '=', '/', '\\'];

/// A candidate dish extracted from a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    pub name: String,
    /// Price in whole SEK.
    pub price: u32,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Weekday tag for day-specific dishes ("måndag"..."fredag").
    #[serde(default)]
    pub day: Option<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl MenuItem {
    /// Build an item if the name survives validation: non-empty after
    /// trimming, at most 100 chars, and not a heading/markup artifact.
    pub fn new_validated(
        name: &str,
        price: u32,
        category: Option<String>,
        description: Option<String>,
        day: Option<String>,
    ) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return None;
        }
        if name.starts_with(MARKUP_ARTIFACTS) {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            price,
            category: category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(default_category),
            description: description.filter(|d| !d.trim().is_empty()),
            day,
        })
    }
}

/// Output of one extraction attempt for one source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub items: Vec<MenuItem>,
    pub method: ExtractionMethod,
}

impl ExtractionResult {
    pub fn empty(method: ExtractionMethod) -> Self {
        Self {
            items: Vec::new(),
            method,
        }
    }

    /// Quality score: item count. The quality gate compares this against
    /// [`crate::quality::MIN_ACCEPTABLE_ITEMS`].
    pub fn quality(&self) -> usize {
        self.items.len()
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Final per-source result for a run. Written once per source by the
/// acquisition router.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionOutcome {
    pub source_id: String,
    pub source_name: String,
    /// `None` only when the source was skipped before any strategy ran
    /// (e.g. no website).
    pub strategy: Option<Strategy>,
    pub method: Option<ExtractionMethod>,
    pub items: Vec<MenuItem>,
    pub cost_cents: u64,
    pub acquired_at: DateTime<Utc>,
    /// Set when `items` is empty — "no menu found" is a result, not an error.
    #[serde(default)]
    pub failure: Option<String>,
}

impl AcquisitionOutcome {
    pub fn succeeded(&self) -> bool {
        !self.items.is_empty()
    }
}

/// One dish in the canonical merged dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DishRecord {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: u32,
    pub category: String,
    #[serde(default)]
    pub day: Option<String>,
    pub source_id: String,
    pub source_name: String,
    pub method: ExtractionMethod,
    pub produced_at: DateTime<Utc>,
}

impl DishRecord {
    /// Lift a validated item into the canonical dataset shape.
    pub fn from_item(item: &MenuItem, outcome: &AcquisitionOutcome) -> Self {
        Self {
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            category: item.category.clone(),
            day: item.day.clone(),
            source_id: outcome.source_id.clone(),
            source_name: outcome.source_name.clone(),
            method: outcome.method.unwrap_or(ExtractionMethod::Pattern),
            produced_at: outcome.acquired_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_id_folds_swedish_diacritics() {
        assert_eq!(source_id("Köttbullar & Kött AB"), "kottbullar-kott-ab");
        assert_eq!(source_id("Restaurang S"), "restaurang-s");
        assert_eq!(source_id("KRUBB Burgers Sundbyberg"), "krubb-burgers-sundbyberg");
    }

    #[test]
    fn item_validation_rejects_empty_and_artifacts() {
        assert!(MenuItem::new_validated("  ", 100, None, None, None).is_none());
        assert!(MenuItem::new_validated("# Dagens lunch", 100, None, None, None).is_none());
        assert!(MenuItem::new_validated("<div>Pasta", 100, None, None, None).is_none());
        let long = "x".repeat(101);
        assert!(MenuItem::new_validated(&long, 100, None, None, None).is_none());
    }

    #[test]
    fn item_validation_trims_and_defaults_category() {
        let item = MenuItem::new_validated(" Lax ", 115, None, Some("".into()), None).unwrap();
        assert_eq!(item.name, "Lax");
        assert_eq!(item.category, DEFAULT_CATEGORY);
        assert_eq!(item.description, None);
    }

    #[test]
    fn weekday_roundtrip() {
        for day in ["monday", "tuesday", "wednesday", "thursday", "friday"] {
            let parsed = weekday_str::from_str(day).unwrap();
            assert_eq!(weekday_str::to_str(parsed), day);
        }
        assert!(weekday_str::from_str("månday").is_none());
    }

    #[test]
    fn source_deserializes_with_defaults() {
        let src: Source =
            serde_json::from_str(r#"{"id": "bra-mat", "name": "Bra Mat"}"#).unwrap();
        assert_eq!(src.cadence, UpdateCadence::Weekly);
        assert_eq!(src.update_day, Weekday::Mon);
        assert_eq!(src.priority, 3);
        assert!(!src.force_screenshot);
    }
}
