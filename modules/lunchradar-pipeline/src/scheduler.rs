use chrono::Weekday;
use lunchradar_common::types::{Source, UpdateCadence};
use tracing::info;

use crate::sources::SourceOverrides;

/// Decides which sources are processed today. Pure over its inputs; the
/// caller supplies the weekday so runs are replayable.
pub struct UpdateScheduler {
    overrides: SourceOverrides,
}

impl UpdateScheduler {
    pub fn new(overrides: SourceOverrides) -> Self {
        Self { overrides }
    }

    /// Select due sources, ordered by priority then id. `force_all`
    /// returns everything unfiltered.
    pub fn due<'a>(&self, sources: &'a [Source], today: Weekday, force_all: bool) -> Vec<&'a Source> {
        let mut due = Vec::new();
        let mut skipped = 0usize;

        for source in sources {
            if force_all {
                due.push(source);
                continue;
            }
            if self.overrides.is_blacklisted(&source.id) {
                skipped += 1;
                continue;
            }
            if source.serves_lunch == Some(false) && !self.overrides.is_whitelisted(&source.id) {
                skipped += 1;
                continue;
            }
            if is_due(source, today) {
                due.push(source);
            } else {
                skipped += 1;
            }
        }

        due.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        info!(
            due = due.len(),
            skipped,
            force_all,
            today = %today,
            "Schedule computed"
        );
        due
    }
}

fn is_due(source: &Source, today: Weekday) -> bool {
    match source.cadence {
        UpdateCadence::Daily => true,
        UpdateCadence::Weekly | UpdateCadence::Static => today == source.update_day,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(id: &str, cadence: UpdateCadence) -> Source {
        Source::builder()
            .id(id.to_string())
            .name(id.to_string())
            .cadence(cadence)
            .build()
    }

    #[test]
    fn daily_always_due_weekly_only_on_update_day() {
        let sources = vec![
            source("daily", UpdateCadence::Daily),
            source("weekly", UpdateCadence::Weekly),
            source("static", UpdateCadence::Static),
        ];
        let scheduler = UpdateScheduler::new(SourceOverrides::default());

        let tuesday: Vec<&str> = scheduler
            .due(&sources, Weekday::Tue, false)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(tuesday, vec!["daily"]);

        let monday: Vec<&str> = scheduler
            .due(&sources, Weekday::Mon, false)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(monday, vec!["daily", "static", "weekly"]);
    }

    #[test]
    fn force_returns_everything_unfiltered() {
        let sources = vec![
            source("blocked", UpdateCadence::Weekly),
            source("weekly", UpdateCadence::Weekly),
        ];
        let scheduler = UpdateScheduler::new(SourceOverrides::default().blacklist("blocked"));

        let due: Vec<&str> = scheduler
            .due(&sources, Weekday::Tue, true)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(due, vec!["blocked", "weekly"]);

        let normal = scheduler.due(&sources, Weekday::Mon, false);
        assert_eq!(normal.len(), 1);
        assert_eq!(normal[0].id, "weekly");
    }

    #[test]
    fn no_lunch_sources_skipped_unless_whitelisted() {
        let mut no_lunch = source("stangd-krog", UpdateCadence::Daily);
        no_lunch.serves_lunch = Some(false);
        let mut listed = source("bra-mat", UpdateCadence::Daily);
        listed.serves_lunch = Some(false);
        let mut unknown = source("okand", UpdateCadence::Daily);
        unknown.serves_lunch = None;

        let sources = vec![no_lunch, listed, unknown];
        let scheduler = UpdateScheduler::new(SourceOverrides::default().whitelist("bra-mat"));

        let due: Vec<&str> = scheduler
            .due(&sources, Weekday::Wed, false)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(due, vec!["bra-mat", "okand"]);
    }

    #[test]
    fn ordered_by_priority_then_id() {
        let mut first = source("zzz", UpdateCadence::Daily);
        first.priority = 1;
        let second = source("aaa", UpdateCadence::Daily);

        let sources = vec![first, second];
        let scheduler = UpdateScheduler::new(SourceOverrides::default());
        let due: Vec<&str> = scheduler
            .due(&sources, Weekday::Fri, false)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(due, vec!["zzz", "aaa"]);
    }
}
