//! Canonical dataset assembly: dedup and merge of dish records across
//! runs. Merging is idempotent and commutative so partial runs, retries
//! and out-of-order fragments all converge on the same dataset.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::collections::HashSet;

use lunchradar_common::types::DishRecord;

/// Identity of a dish: lowercased trimmed name within its source. The same
/// dish name at two restaurants is two records.
pub type DishKey = (String, String);

pub fn dish_key(record: &DishRecord) -> DishKey {
    (
        record.name.trim().to_lowercase(),
        record.source_id.clone(),
    )
}

#[derive(Debug, Clone, Default)]
pub struct CanonicalDataset {
    dishes: BTreeMap<DishKey, DishRecord>,
}

impl CanonicalDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = DishRecord>) -> Self {
        let mut dataset = Self::new();
        dataset.merge_fragment(records);
        dataset
    }

    pub fn len(&self) -> usize {
        self.dishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dishes.is_empty()
    }

    pub fn source_count(&self) -> usize {
        self.dishes
            .values()
            .map(|d| d.source_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }

    /// Fold new records in. Safe to call with fragments from a partial or
    /// timed-out run; completed work is never lost to a later merge.
    pub fn merge_fragment(&mut self, records: impl IntoIterator<Item = DishRecord>) {
        for record in records {
            self.insert(record);
        }
    }

    fn insert(&mut self, record: DishRecord) {
        match self.dishes.entry(dish_key(&record)) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                if replaces(slot.get(), &record) {
                    slot.insert(record);
                }
            }
        }
    }

    /// Dishes ordered for presentation: source, then category, then price,
    /// then name.
    pub fn sorted_dishes(&self) -> Vec<DishRecord> {
        let mut dishes: Vec<DishRecord> = self.dishes.values().cloned().collect();
        dishes.sort_by(|a, b| {
            a.source_name
                .cmp(&b.source_name)
                .then_with(|| a.category.cmp(&b.category))
                .then_with(|| a.price.cmp(&b.price))
                .then_with(|| a.name.cmp(&b.name))
        });
        dishes
    }
}

/// Conflict rule for two records of the same dish: a description beats no
/// description; at description parity, the more recently produced record
/// wins. Full parity keeps the incumbent, which makes re-merging the same
/// fragment a no-op.
fn replaces(incumbent: &DishRecord, candidate: &DishRecord) -> bool {
    let has_desc =
        |r: &DishRecord| r.description.as_deref().is_some_and(|d| !d.trim().is_empty());
    match (has_desc(incumbent), has_desc(candidate)) {
        (false, true) => true,
        (true, false) => false,
        _ => candidate.produced_at > incumbent.produced_at,
    }
}
