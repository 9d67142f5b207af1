//! Soil Formula
//!
//! A named mixture recipe. Candidate items are merged by `(order, soil type)`
//! and the merged percentages may not add up to more than 100.
//!
//! # Example
//! ```
//! use florarium_api::domain::{SoilFormula, SoilFormulaItem};
//!
//! let formula = SoilFormula::build(
//!     "Desert Mix",
//!     &[SoilFormulaItem::new(1, 50, 0), SoilFormulaItem::new(2, 50, 1)],
//! )
//! .unwrap();
//! assert_eq!(formula.total_percentage(), 100);
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::soil_type::normalize_name;
use super::DomainError;

/// Upper bound for the sum of all line percentages
pub const MAX_TOTAL_PERCENTAGE: i64 = 100;

/// Current time at the microsecond precision PostgreSQL keeps
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Candidate item as submitted by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilFormulaItem {
    pub soil_type_id: i32,
    pub percentage: i32,
    pub order: i32,
}

impl SoilFormulaItem {
    pub fn new(soil_type_id: i32, percentage: i32, order: i32) -> Self {
        Self {
            soil_type_id,
            percentage,
            order,
        }
    }
}

/// Resolved line item owned by a formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilFormulaLine {
    soil_type_id: i32,
    percentage: i32,
    order: i32,
}

impl SoilFormulaLine {
    pub fn new(soil_type_id: i32, percentage: i32, order: i32) -> Self {
        Self {
            soil_type_id,
            percentage,
            order,
        }
    }

    pub fn soil_type_id(&self) -> i32 {
        self.soil_type_id
    }

    pub fn percentage(&self) -> i32 {
        self.percentage
    }

    pub fn order(&self) -> i32 {
        self.order
    }
}

/// Soil formula aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoilFormula {
    id: Uuid,
    name: String,
    items: Vec<SoilFormulaLine>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SoilFormula {
    /// Build a new formula from a name and candidate items.
    ///
    /// Items are expected to have passed per-item checks (positive soil type
    /// id, percentage in 1..=100, order >= 0). Out-of-range input never
    /// panics: a merged line that does not fit an `i32` is reported as
    /// `PercentageInvalid`.
    ///
    /// # Errors
    /// - `DomainError::NameEmpty` if the name is blank
    /// - `DomainError::FormulaEmpty` if no items are given
    /// - `DomainError::PercentageInvalid` if merged percentages exceed 100
    pub fn build(name: &str, items: &[SoilFormulaItem]) -> Result<Self, DomainError> {
        let name = normalize_name(name)?;
        let items = aggregate_items(items)?;
        let now = now();

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            items,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace name and every line item. Nothing changes unless the new
    /// input passes the same checks as [`SoilFormula::build`].
    pub fn rebuild(&mut self, name: &str, items: &[SoilFormulaItem]) -> Result<(), DomainError> {
        let name = normalize_name(name)?;
        let items = aggregate_items(items)?;

        self.name = name;
        self.items = items;
        self.updated_at = now();
        Ok(())
    }

    /// Reassemble a formula loaded from storage
    pub(crate) fn restore(
        id: Uuid,
        name: String,
        items: Vec<SoilFormulaLine>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            items,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn items(&self) -> &[SoilFormulaLine] {
        &self.items
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Sum of all line percentages
    pub fn total_percentage(&self) -> i64 {
        self.items.iter().map(|item| i64::from(item.percentage)).sum()
    }

    /// Distinct soil type ids referenced by this formula, ascending
    pub fn soil_type_ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.items.iter().map(|item| item.soil_type_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

/// Merge candidates sharing `(order, soil_type_id)` and enforce the total.
fn aggregate_items(items: &[SoilFormulaItem]) -> Result<Vec<SoilFormulaLine>, DomainError> {
    if items.is_empty() {
        return Err(DomainError::FormulaEmpty);
    }

    let mut groups: BTreeMap<(i32, i32), i64> = BTreeMap::new();
    for item in items {
        *groups.entry((item.order, item.soil_type_id)).or_insert(0) += i64::from(item.percentage);
    }

    let total: i64 = groups.values().sum();
    if total > MAX_TOTAL_PERCENTAGE {
        return Err(DomainError::PercentageInvalid { total });
    }

    groups
        .into_iter()
        .map(|((order, soil_type_id), percentage)| {
            i32::try_from(percentage)
                .map(|percentage| SoilFormulaLine::new(soil_type_id, percentage, order))
                .map_err(|_| DomainError::PercentageInvalid { total })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::test_runner::Config;

    fn item(soil_type_id: i32, percentage: i32, order: i32) -> SoilFormulaItem {
        SoilFormulaItem::new(soil_type_id, percentage, order)
    }

    #[test]
    fn test_build_desert_mix() {
        let formula = SoilFormula::build("Desert Mix", &[item(1, 50, 0), item(2, 50, 1)]).unwrap();

        assert_eq!(formula.name(), "Desert Mix");
        assert_eq!(formula.items().len(), 2);
        assert_eq!(formula.total_percentage(), 100);
        assert_eq!(formula.created_at(), formula.updated_at());
    }

    #[test]
    fn test_build_trims_name() {
        let formula = SoilFormula::build("  Tropical  ", &[item(1, 40, 0)]).unwrap();
        assert_eq!(formula.name(), "Tropical");
    }

    #[test]
    fn test_build_blank_name() {
        assert_eq!(
            SoilFormula::build("  ", &[item(1, 50, 0)]),
            Err(DomainError::NameEmpty)
        );
        // name is checked before anything else
        assert_eq!(SoilFormula::build("", &[]), Err(DomainError::NameEmpty));
        assert_eq!(
            SoilFormula::build("\n", &[item(1, 90, 0), item(2, 90, 0)]),
            Err(DomainError::NameEmpty)
        );
    }

    #[test]
    fn test_build_empty_items() {
        assert_eq!(SoilFormula::build("Mix", &[]), Err(DomainError::FormulaEmpty));
    }

    #[test]
    fn test_build_total_over_100() {
        assert_eq!(
            SoilFormula::build("Mix", &[item(1, 60, 0), item(2, 50, 1)]),
            Err(DomainError::PercentageInvalid { total: 110 })
        );
    }

    #[test]
    fn test_build_merged_total_over_100() {
        // each item alone is fine, the merged group is not
        let result = SoilFormula::build("Mix", &[item(1, 70, 0), item(1, 40, 0)]);
        assert_eq!(result, Err(DomainError::PercentageInvalid { total: 110 }));
    }

    #[test]
    fn test_build_merges_same_order_and_soil_type() {
        let formula = SoilFormula::build("Mix", &[item(1, 30, 0), item(1, 20, 0)]).unwrap();

        assert_eq!(formula.items(), &[SoilFormulaLine::new(1, 50, 0)]);
        assert_eq!(formula.total_percentage(), 50);
    }

    #[test]
    fn test_build_keeps_same_soil_type_at_different_orders() {
        let formula = SoilFormula::build("Layered", &[item(1, 30, 0), item(1, 20, 1)]).unwrap();

        assert_eq!(
            formula.items(),
            &[SoilFormulaLine::new(1, 30, 0), SoilFormulaLine::new(1, 20, 1)]
        );
    }

    #[test]
    fn test_build_accepts_partial_formula() {
        let formula = SoilFormula::build("Half", &[item(4, 25, 0), item(5, 25, 2)]).unwrap();
        assert_eq!(formula.total_percentage(), 50);
    }

    #[test]
    fn test_build_sorts_by_order_then_soil_type() {
        let formula = SoilFormula::build(
            "Mix",
            &[item(9, 10, 2), item(3, 10, 0), item(1, 10, 2), item(7, 10, 1), item(3, 5, 0)],
        )
        .unwrap();

        let keys: Vec<(i32, i32)> = formula
            .items()
            .iter()
            .map(|line| (line.order(), line.soil_type_id()))
            .collect();
        assert_eq!(keys, vec![(0, 3), (1, 7), (2, 1), (2, 9)]);
        assert_eq!(formula.items()[0].percentage(), 15);
        assert_eq!(formula.soil_type_ids(), vec![1, 3, 7, 9]);
    }

    #[test]
    fn test_build_assigns_fresh_ids() {
        let a = SoilFormula::build("A", &[item(1, 10, 0)]).unwrap();
        let b = SoilFormula::build("A", &[item(1, 10, 0)]).unwrap();
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_rebuild_replaces_items() {
        let mut formula = SoilFormula::build("Old", &[item(1, 50, 0), item(2, 50, 1)]).unwrap();
        let id = formula.id();

        formula.rebuild("NewName", &[item(3, 100, 0)]).unwrap();

        assert_eq!(formula.id(), id);
        assert_eq!(formula.name(), "NewName");
        assert_eq!(formula.items(), &[SoilFormulaLine::new(3, 100, 0)]);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_state() {
        let mut formula = SoilFormula::build("Old", &[item(1, 50, 0)]).unwrap();
        formula.rebuild("NewName", &[item(3, 100, 0)]).unwrap();
        let snapshot = formula.clone();

        assert_eq!(
            formula.rebuild("Other", &[item(3, 100, 0), item(4, 1, 1)]),
            Err(DomainError::PercentageInvalid { total: 101 })
        );
        assert_eq!(formula, snapshot);

        assert_eq!(formula.rebuild("Other", &[]), Err(DomainError::FormulaEmpty));
        assert_eq!(formula.rebuild(" ", &[item(1, 1, 0)]), Err(DomainError::NameEmpty));
        assert_eq!(formula, snapshot);
    }

    #[test]
    fn test_timestamps_have_microsecond_precision() {
        let mut formula = SoilFormula::build("Mix", &[item(1, 10, 0)]).unwrap();
        assert_eq!(formula.created_at().timestamp_subsec_nanos() % 1_000, 0);

        formula.rebuild("Mix", &[item(2, 10, 0)]).unwrap();
        assert_eq!(formula.updated_at().timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_oversized_line_does_not_wrap() {
        // the groups cancel out to a small total, but one of them overflows i32
        let items = [
            item(1, i32::MAX, 0),
            item(1, i32::MAX, 0),
            item(2, i32::MIN, 1),
            item(2, i32::MIN, 1),
        ];

        assert_eq!(
            SoilFormula::build("Mix", &items),
            Err(DomainError::PercentageInvalid { total: -2 })
        );
    }

    fn items_strategy() -> impl Strategy<Value = Vec<SoilFormulaItem>> {
        prop::collection::vec(
            (1..20_i32, 1..=100_i32, 0..5_i32)
                .prop_map(|(soil_type_id, percentage, order)| item(soil_type_id, percentage, order)),
            1..8,
        )
    }

    fn sum(items: &[SoilFormulaItem]) -> i64 {
        items.iter().map(|i| i64::from(i.percentage)).sum()
    }

    proptest! {
        #![proptest_config(Config::with_cases(256))]

        #[test]
        fn build_accepts_exactly_totals_up_to_100(items in items_strategy()) {
            let expected = sum(&items);
            let result = SoilFormula::build("Mix", &items);

            if expected <= MAX_TOTAL_PERCENTAGE {
                let formula = result.unwrap();
                prop_assert_eq!(formula.total_percentage(), expected);
            } else {
                prop_assert_eq!(result, Err(DomainError::PercentageInvalid { total: expected }));
            }
        }

        #[test]
        fn build_lines_are_unique_and_sorted(items in items_strategy()) {
            if let Ok(formula) = SoilFormula::build("Mix", &items) {
                let keys: Vec<(i32, i32)> = formula
                    .items()
                    .iter()
                    .map(|line| (line.order(), line.soil_type_id()))
                    .collect();
                prop_assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
            }
        }

        #[test]
        fn build_rejects_blank_names(name in "[ \t\n]{0,6}", items in items_strategy()) {
            prop_assert_eq!(SoilFormula::build(&name, &items), Err(DomainError::NameEmpty));
        }

        #[test]
        fn failed_rebuild_changes_nothing(
            name in "( |[A-Za-z ]{1,12})",
            items in items_strategy(),
        ) {
            let mut formula = SoilFormula::build("Original", &[item(1, 50, 0)]).unwrap();
            let snapshot = formula.clone();

            match formula.rebuild(&name, &items) {
                Ok(()) => {
                    prop_assert_eq!(formula.name(), name.trim());
                    prop_assert_eq!(formula.total_percentage(), sum(&items));
                    prop_assert_eq!(formula.id(), snapshot.id());
                }
                Err(_) => prop_assert_eq!(&formula, &snapshot),
            }
        }
    }
}
