//! Additive damage vectors keyed by damage type.

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub};

use crate::fixed::FixedPoint2;
use crate::prototype::{DamageGroupId, DamageGroupPrototype, DamageTypeId};

/// A mapping from damage type to a signed amount.
///
/// Positive amounts are harm, negative amounts are healing. Merging is a
/// per-key sum with absent keys treated as zero, so it is commutative and
/// associative and the empty specifier is its identity. Zero entries survive a
/// merge; consumers that want them gone call [`DamageSpecifier::trim_zeros`].
///
/// Each stored amount saturates at [`FixedPoint2::MAX`] and [`FixedPoint2::MIN`].
/// Associativity holds while no partial sum leaves that range; once one does,
/// the grouping of merges decides where the saturation happens.
/// [`DamageSpecifier::total`] is computed in a wider type and is exact up to
/// the final saturation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct DamageSpecifier {
    damage_dict: BTreeMap<DamageTypeId, FixedPoint2>,
}

impl DamageSpecifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-type specifier.
    pub fn from_type(damage_type: impl Into<DamageTypeId>, amount: FixedPoint2) -> Self {
        let mut spec = Self::new();
        spec.damage_dict.insert(damage_type.into(), amount);
        spec
    }

    /// Spreads `amount` evenly over every member of `group`.
    ///
    /// The last member receives the rounding remainder, so the total of the
    /// result is exactly `amount`. Repeated members accumulate their shares.
    pub fn from_group(group: &DamageGroupPrototype, amount: FixedPoint2) -> Self {
        group
            .damage_types
            .iter()
            .cloned()
            .zip(amount.split(group.damage_types.len()))
            .collect()
    }

    /// Amount for a type, zero when absent.
    pub fn get(&self, damage_type: &str) -> FixedPoint2 {
        self.damage_dict
            .get(damage_type)
            .copied()
            .unwrap_or(FixedPoint2::ZERO)
    }

    pub fn contains(&self, damage_type: &str) -> bool {
        self.damage_dict.contains_key(damage_type)
    }

    /// Sets the amount of a type, returning the previous amount if any.
    pub fn insert(
        &mut self,
        damage_type: impl Into<DamageTypeId>,
        amount: FixedPoint2,
    ) -> Option<FixedPoint2> {
        self.damage_dict.insert(damage_type.into(), amount)
    }

    pub fn remove(&mut self, damage_type: &str) -> Option<FixedPoint2> {
        self.damage_dict.remove(damage_type)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, DamageTypeId, FixedPoint2> {
        self.damage_dict.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, DamageTypeId, FixedPoint2> {
        self.damage_dict.iter_mut()
    }

    pub fn types(&self) -> impl Iterator<Item = &DamageTypeId> {
        self.damage_dict.keys()
    }

    pub fn len(&self) -> usize {
        self.damage_dict.len()
    }

    /// True when there are no entries at all.
    pub fn is_empty(&self) -> bool {
        self.damage_dict.is_empty()
    }

    /// True when every entry is zero (including the empty case).
    pub fn is_zero(&self) -> bool {
        self.damage_dict.values().all(|amount| amount.is_zero())
    }

    /// True when at least one entry is strictly positive.
    pub fn any_positive(&self) -> bool {
        self.damage_dict.values().any(|amount| amount.is_positive())
    }

    /// Sum of every entry.
    pub fn total(&self) -> FixedPoint2 {
        self.damage_dict.values().sum()
    }

    /// Returns the per-key sum of `self` and `other`.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        merged.merge_in(other);
        merged
    }

    /// Adds every entry of `other` into `self`.
    pub fn merge_in(&mut self, other: &Self) {
        for (damage_type, &amount) in &other.damage_dict {
            *self
                .damage_dict
                .entry(damage_type.clone())
                .or_insert(FixedPoint2::ZERO) += amount;
        }
    }

    /// Removes every zero entry.
    pub fn trim_zeros(&mut self) {
        self.damage_dict.retain(|_, amount| !amount.is_zero());
    }

    #[must_use]
    pub fn trimmed(mut self) -> Self {
        self.trim_zeros();
        self
    }

    /// Multiplies every entry by `factor`.
    #[must_use]
    pub fn scaled(&self, factor: f32) -> Self {
        self.map_amounts(|_, amount| amount * factor)
    }

    /// Returns a copy with every amount replaced by `f(type, amount)`.
    #[must_use]
    pub fn map_amounts<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&DamageTypeId, FixedPoint2) -> FixedPoint2,
    {
        let damage_dict = self
            .damage_dict
            .iter()
            .map(|(damage_type, &amount)| (damage_type.clone(), f(damage_type, amount)))
            .collect();
        Self { damage_dict }
    }

    /// Returns a copy holding only the types accepted by `keep`.
    #[must_use]
    pub fn filtered<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&DamageTypeId) -> bool,
    {
        let damage_dict = self
            .damage_dict
            .iter()
            .filter(|(damage_type, _)| keep(damage_type))
            .map(|(damage_type, &amount)| (damage_type.clone(), amount))
            .collect();
        Self { damage_dict }
    }

    /// Sum of this specifier over the member types of `group`.
    ///
    /// Returns `None` when none of the group's members are present, so callers
    /// can tell "not tracked" apart from "tracked at zero".
    pub fn damage_in_group(&self, group: &DamageGroupPrototype) -> Option<FixedPoint2> {
        let mut found = false;
        let mut total = FixedPoint2::ZERO;
        for damage_type in &group.damage_types {
            if let Some(&amount) = self.damage_dict.get(damage_type) {
                found = true;
                total += amount;
            }
        }
        found.then_some(total)
    }

    /// Aggregates this specifier per group.
    ///
    /// A type may belong to zero or several groups; it contributes to each.
    /// Groups with no member present are omitted.
    pub fn damage_per_group<'a>(
        &self,
        groups: impl IntoIterator<Item = &'a DamageGroupPrototype>,
    ) -> BTreeMap<DamageGroupId, FixedPoint2> {
        let mut per_group = BTreeMap::new();
        self.damage_per_group_into(groups, &mut per_group);
        per_group
    }

    /// Same as [`DamageSpecifier::damage_per_group`], reusing `out`.
    ///
    /// `out` is cleared first; the result never depends on its prior contents.
    pub fn damage_per_group_into<'a>(
        &self,
        groups: impl IntoIterator<Item = &'a DamageGroupPrototype>,
        out: &mut BTreeMap<DamageGroupId, FixedPoint2>,
    ) {
        out.clear();
        for group in groups {
            if let Some(total) = self.damage_in_group(group) {
                out.insert(group.id.clone(), total);
            }
        }
    }
}

impl FromIterator<(DamageTypeId, FixedPoint2)> for DamageSpecifier {
    /// Collects entries, summing repeated types.
    fn from_iter<I: IntoIterator<Item = (DamageTypeId, FixedPoint2)>>(iter: I) -> Self {
        let mut spec = Self::new();
        for (damage_type, amount) in iter {
            *spec
                .damage_dict
                .entry(damage_type)
                .or_insert(FixedPoint2::ZERO) += amount;
        }
        spec
    }
}

impl<'a> IntoIterator for &'a DamageSpecifier {
    type Item = (&'a DamageTypeId, &'a FixedPoint2);
    type IntoIter = btree_map::Iter<'a, DamageTypeId, FixedPoint2>;

    fn into_iter(self) -> Self::IntoIter {
        self.damage_dict.iter()
    }
}

impl Add for DamageSpecifier {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self::Output {
        self.merge_in(&rhs);
        self
    }
}

impl Add<&DamageSpecifier> for &DamageSpecifier {
    type Output = DamageSpecifier;
    fn add(self, rhs: &DamageSpecifier) -> Self::Output {
        self.merge(rhs)
    }
}

impl AddAssign<&DamageSpecifier> for DamageSpecifier {
    fn add_assign(&mut self, rhs: &DamageSpecifier) {
        self.merge_in(rhs);
    }
}

impl Sub<&DamageSpecifier> for &DamageSpecifier {
    type Output = DamageSpecifier;
    fn sub(self, rhs: &DamageSpecifier) -> Self::Output {
        self.merge(&-rhs)
    }
}

impl Neg for &DamageSpecifier {
    type Output = DamageSpecifier;
    fn neg(self) -> Self::Output {
        self.map_amounts(|_, amount| -amount)
    }
}

impl fmt::Display for DamageSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (index, (damage_type, amount)) in self.damage_dict.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{damage_type}: {amount}")?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(entries: &[(&str, f64)]) -> DamageSpecifier {
        entries
            .iter()
            .map(|(ty, amount)| (DamageTypeId::from(*ty), FixedPoint2::from_f64(*amount)))
            .collect()
    }

    fn samples() -> Vec<DamageSpecifier> {
        vec![
            DamageSpecifier::new(),
            spec(&[("Blunt", 10.0)]),
            spec(&[("Blunt", -4.0), ("Heat", 2.5)]),
            spec(&[("Acid", 0.01), ("Poison", 7.25), ("Heat", 0.0)]),
            spec(&[("Blunt", -10.0), ("Poison", -0.33)]),
        ]
    }

    #[test]
    fn merge_is_commutative_and_associative() {
        let samples = samples();
        for a in &samples {
            for b in &samples {
                assert_eq!(a.merge(b), b.merge(a));
                for c in &samples {
                    assert_eq!(a.merge(&b.merge(c)), a.merge(b).merge(c));
                }
            }
        }
    }

    #[test]
    fn merge_saturates_at_the_representable_range() {
        let near_max = DamageSpecifier::from_type("Blunt", FixedPoint2::MAX - FixedPoint2::ONE);
        let hit = DamageSpecifier::from_type("Blunt", FixedPoint2::new(2));
        let heal = DamageSpecifier::from_type("Blunt", FixedPoint2::new(-1));

        assert_eq!(near_max.merge(&hit).get("Blunt"), FixedPoint2::MAX);
        // the grouping decides which partial sum saturates
        assert_eq!(
            near_max.merge(&hit.merge(&heal)).get("Blunt"),
            FixedPoint2::MAX
        );
        assert_eq!(
            near_max.merge(&hit).merge(&heal).get("Blunt"),
            FixedPoint2::MAX - FixedPoint2::ONE
        );
    }

    #[test]
    fn total_does_not_depend_on_entry_order() {
        let spec: DamageSpecifier = [
            ("Blunt", FixedPoint2::MAX),
            ("Heat", FixedPoint2::new(5)),
            ("Slash", FixedPoint2::new(-5)),
        ]
        .into_iter()
        .map(|(damage_type, amount)| (damage_type.into(), amount))
        .collect();
        assert_eq!(spec.total(), FixedPoint2::MAX);

        let overflowing = spec.merge(&DamageSpecifier::from_type("Cold", FixedPoint2::new(10)));
        assert_eq!(overflowing.total(), FixedPoint2::MAX);
    }

    #[test]
    fn empty_is_identity_for_merge() {
        let empty = DamageSpecifier::new();
        for a in samples() {
            assert_eq!(a.merge(&empty), a);
            assert_eq!(empty.merge(&a), a);
        }
    }

    #[test]
    fn total_is_additive_over_merge() {
        let samples = samples();
        for a in &samples {
            for b in &samples {
                assert_eq!(a.merge(b).total(), a.total() + b.total());
            }
        }
    }

    #[test]
    fn merge_keeps_zero_entries_until_trimmed() {
        let merged = spec(&[("Blunt", 10.0)]).merge(&spec(&[("Blunt", -10.0)]));
        assert!(merged.contains("Blunt"));
        assert!(merged.is_zero());
        assert!(merged.trimmed().is_empty());
    }

    #[test]
    fn empty_specifier_yields_zero_results() {
        let empty = DamageSpecifier::new();
        let group = DamageGroupPrototype::new("Brute", ["Blunt", "Slash"]);
        assert_eq!(empty.total(), FixedPoint2::ZERO);
        assert!(empty.damage_per_group([&group]).is_empty());
        assert!(!empty.any_positive());
    }

    #[test]
    fn per_group_counts_types_in_every_group() {
        let brute = DamageGroupPrototype::new("Brute", ["Blunt", "Slash"]);
        let caustic = DamageGroupPrototype::new("Caustic", ["Acid", "Poison"]);
        let toxic = DamageGroupPrototype::new("Toxic", ["Poison", "Radiation"]);
        let burn = DamageGroupPrototype::new("Burn", ["Heat"]);

        let damage = spec(&[("Blunt", 5.0), ("Poison", 3.0), ("Acid", 1.5), ("Cold", 9.0)]);
        let per_group = damage.damage_per_group([&brute, &caustic, &toxic, &burn]);

        assert_eq!(per_group.len(), 3);
        assert_eq!(per_group["Brute"], FixedPoint2::new(5));
        assert_eq!(per_group["Caustic"], FixedPoint2::from_f64(4.5));
        assert_eq!(per_group["Toxic"], FixedPoint2::new(3));
        assert!(!per_group.contains_key("Burn"));
    }

    #[test]
    fn per_group_into_discards_previous_contents() {
        let brute = DamageGroupPrototype::new("Brute", ["Blunt"]);
        let mut out = BTreeMap::new();
        out.insert(DamageGroupId::from("Stale"), FixedPoint2::new(99));

        spec(&[("Blunt", 2.0)]).damage_per_group_into([&brute], &mut out);

        assert_eq!(out.len(), 1);
        assert_eq!(out["Brute"], FixedPoint2::new(2));
    }

    #[test]
    fn from_group_splits_evenly_with_exact_total() {
        let group = DamageGroupPrototype::new("Brute", ["Blunt", "Piercing", "Slash"]);
        let damage = DamageSpecifier::from_group(&group, FixedPoint2::new(10));

        assert_eq!(damage.len(), 3);
        assert_eq!(damage.get("Blunt"), FixedPoint2::from_raw(333));
        assert_eq!(damage.total(), FixedPoint2::new(10));
    }

    #[test]
    fn collecting_sums_repeated_types() {
        let damage: DamageSpecifier = [
            (DamageTypeId::from("Heat"), FixedPoint2::new(2)),
            (DamageTypeId::from("Heat"), FixedPoint2::new(3)),
        ]
        .into_iter()
        .collect();
        assert_eq!(damage.get("Heat"), FixedPoint2::new(5));
    }

    #[test]
    fn classifies_harm_and_healing() {
        assert!(spec(&[("Blunt", -1.0), ("Heat", 0.01)]).any_positive());
        assert!(!spec(&[("Blunt", -1.0), ("Heat", 0.0)]).any_positive());
    }

    #[test]
    fn displays_entries_in_type_order() {
        let damage = spec(&[("Heat", 2.5), ("Blunt", 10.0)]);
        assert_eq!(damage.to_string(), "{Blunt: 10, Heat: 2.5}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_form_is_a_flat_number_map() {
        let damage = spec(&[("Blunt", 10.0), ("Heat", -2.25)]);
        let json = serde_json::to_string(&damage).unwrap();
        assert_eq!(json, r#"{"Blunt":10.0,"Heat":-2.25}"#);

        let back: DamageSpecifier = serde_json::from_str(&json).unwrap();
        assert_eq!(back, damage);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn binary_round_trip_preserves_entries() {
        let damage = spec(&[("Acid", 0.01), ("Poison", 7.25), ("Heat", 0.0)]);
        let bytes = bincode::serialize(&damage).unwrap();
        let back: DamageSpecifier = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, damage);
        assert!(back.contains("Heat"));
    }
}
