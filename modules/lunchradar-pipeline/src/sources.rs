//! Source catalogue: discovery output from disk plus the curated profile
//! of per-source knowledge (cadences, blocklists, screenshot flags) that
//! accumulates from operating the pipeline.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use chrono::Weekday;
use lunchradar_common::error::{LunchradarError, Result};
use lunchradar_common::types::{source_id, Source, UpdateCadence};
use serde::Deserialize;
use tracing::{info, warn};

/// Operator knowledge about specific sources, keyed by source id.
#[derive(Debug, Clone, Default)]
pub struct SourceOverrides {
    /// Never due on a scheduled run (--force still includes them). Sites
    /// that are dead, hostile to automation, or repeatedly produced garbage.
    blacklist: HashSet<String>,
    /// Acquired even when discovery says the source serves no lunch.
    whitelist: HashSet<String>,
    /// Traditional tier is known to fail here; go straight to screenshots.
    force_screenshot: HashSet<String>,
    /// Known-good menu URLs that replace candidate probing.
    url_overrides: HashMap<String, String>,
}

impl SourceOverrides {
    pub fn blacklist(mut self, id: &str) -> Self {
        self.blacklist.insert(id.to_string());
        self
    }

    pub fn whitelist(mut self, id: &str) -> Self {
        self.whitelist.insert(id.to_string());
        self
    }

    pub fn force_screenshot(mut self, id: &str) -> Self {
        self.force_screenshot.insert(id.to_string());
        self
    }

    pub fn url_override(mut self, id: &str, url: &str) -> Self {
        self.url_overrides.insert(id.to_string(), url.to_string());
        self
    }

    pub fn is_blacklisted(&self, id: &str) -> bool {
        self.blacklist.contains(id)
    }

    pub fn is_whitelisted(&self, id: &str) -> bool {
        self.whitelist.contains(id)
    }

    pub fn wants_screenshot(&self, id: &str) -> bool {
        self.force_screenshot.contains(id)
    }

    pub fn menu_url(&self, id: &str) -> Option<&str> {
        self.url_overrides.get(id).map(String::as_str)
    }
}

/// Cadence and priority assignments applied over discovery output.
#[derive(Debug, Clone, Copy)]
struct CadenceEntry {
    cadence: UpdateCadence,
    update_day: Weekday,
    priority: u8,
}

#[derive(Debug, Clone, Default)]
pub struct SourceProfile {
    pub overrides: SourceOverrides,
    cadences: HashMap<String, CadenceEntry>,
}

impl SourceProfile {
    fn cadence(mut self, id: &str, cadence: UpdateCadence, update_day: Weekday, priority: u8) -> Self {
        self.cadences.insert(
            id.to_string(),
            CadenceEntry {
                cadence,
                update_day,
                priority,
            },
        );
        self
    }

    /// Stamp profile knowledge onto discovered sources.
    pub fn apply(&self, mut sources: Vec<Source>) -> Vec<Source> {
        for source in &mut sources {
            if let Some(entry) = self.cadences.get(&source.id) {
                source.cadence = entry.cadence;
                source.update_day = entry.update_day;
                source.priority = entry.priority;
            }
            if self.overrides.wants_screenshot(&source.id) {
                source.force_screenshot = true;
            }
            if let Some(url) = self.overrides.menu_url(&source.id) {
                source.menu_url_override = Some(url.to_string());
            }
        }
        sources
    }
}

/// The curated profile for the Sundbyberg source set.
pub fn default_profile() -> SourceProfile {
    let overrides = SourceOverrides::default()
        .blacklist("delibruket-flatbread")
        .blacklist("piatti")
        .blacklist("parma")
        .whitelist("restaurang-s")
        .whitelist("tre-broder")
        .whitelist("bra-mat")
        .force_screenshot("chopchop-asian-express")
        .force_screenshot("bonab-persisk-restaurang")
        .force_screenshot("ristorante-rustico");

    let mut profile = SourceProfile {
        overrides,
        cadences: HashMap::new(),
    };
    // Dagens-lunch boards, new menu every day.
    profile = profile
        .cadence("restaurang-s", UpdateCadence::Daily, Weekday::Mon, 1)
        .cadence("the-public", UpdateCadence::Daily, Weekday::Mon, 1);
    // Weekly boards refreshed on Mondays.
    profile = profile
        .cadence("tre-broder", UpdateCadence::Weekly, Weekday::Mon, 2)
        .cadence("krubb-burgers-sundbyberg", UpdateCadence::Weekly, Weekday::Mon, 2)
        .cadence("ristorante-rustico", UpdateCadence::Weekly, Weekday::Mon, 2);
    // Fixed menus, re-checked once a week for drift.
    profile.cadence("burgers-beer", UpdateCadence::Static, Weekday::Mon, 3)
}

/// A source as the discovery collaborator writes it: name and website,
/// plus an optional lunch-hours signal. Ids are derived, not trusted.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscoveredSource {
    name: String,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    serves_lunch: Option<bool>,
}

/// Load the source catalogue from a discovery document.
pub fn load_sources(path: &Path) -> Result<Vec<Source>> {
    let raw = fs::read_to_string(path).map_err(|e| {
        LunchradarError::Config(format!("cannot read sources file {}: {e}", path.display()))
    })?;
    let discovered: Vec<DiscoveredSource> = serde_json::from_str(&raw).map_err(|e| {
        LunchradarError::Validation(format!("malformed sources file {}: {e}", path.display()))
    })?;

    let mut seen = HashSet::new();
    let mut sources = Vec::with_capacity(discovered.len());
    for entry in discovered {
        let id = source_id(&entry.name);
        if id.is_empty() {
            warn!(name = %entry.name, "Skipping source with unusable name");
            continue;
        }
        if !seen.insert(id.clone()) {
            warn!(id = %id, "Skipping duplicate source");
            continue;
        }
        sources.push(
            Source::builder()
                .id(id)
                .name(entry.name)
                .website(entry.website)
                .serves_lunch(entry.serves_lunch)
                .build(),
        );
    }

    info!(count = sources.len(), path = %path.display(), "Loaded sources");
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_stamps_cadence_and_flags() {
        let profile = default_profile();
        let sources = vec![
            Source::builder()
                .id("restaurang-s".to_string())
                .name("Restaurang S".to_string())
                .website(Some("https://restaurangs.nu".to_string()))
                .build(),
            Source::builder()
                .id("chopchop-asian-express".to_string())
                .name("ChopChop Asian Express".to_string())
                .build(),
            Source::builder()
                .id("okand-krog".to_string())
                .name("Okänd Krog".to_string())
                .build(),
        ];

        let stamped = profile.apply(sources);
        assert_eq!(stamped[0].cadence, UpdateCadence::Daily);
        assert_eq!(stamped[0].priority, 1);
        assert!(stamped[1].force_screenshot);
        assert_eq!(stamped[2].cadence, UpdateCadence::Weekly);
        assert_eq!(stamped[2].priority, 3);
    }

    #[test]
    fn load_sources_derives_ids_and_drops_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sources.json");
        fs::write(
            &path,
            r#"[
                {"name": "Tre Bröder", "website": "https://trebroder.se", "servesLunch": true},
                {"name": "Tre Bröder", "website": "https://trebroder.se"},
                {"name": "KRUBB Burgers Sundbyberg"},
                {"name": "---"}
            ]"#,
        )
        .unwrap();

        let sources = load_sources(&path).unwrap();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].id, "tre-broder");
        assert_eq!(sources[0].serves_lunch, Some(true));
        assert_eq!(sources[1].id, "krubb-burgers-sundbyberg");
    }

    #[test]
    fn missing_sources_file_is_a_config_error() {
        let err = load_sources(Path::new("/nonexistent/sources.json")).unwrap_err();
        assert!(matches!(err, LunchradarError::Config(_)));
    }
}
