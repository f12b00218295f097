//! Resistance sets applied to incoming damage.

use std::collections::BTreeMap;

use crate::fixed::FixedPoint2;
use crate::prototype::DamageTypeId;
use crate::specifier::DamageSpecifier;

/// Per-type coefficients and flat reductions.
///
/// Used both for an entity's own resistances and for armour delivered through
/// the inventory relay. Only harmful (positive) amounts are affected; healing
/// passes through untouched.
///
/// # Formula
///
/// ```text
/// reduced = max(amount - flat_reduction[type], 0)
/// final   = reduced * coefficient[type]
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageModifierSet {
    #[cfg_attr(feature = "serde", serde(default))]
    pub coefficients: BTreeMap<DamageTypeId, f32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flat_reduction: BTreeMap<DamageTypeId, FixedPoint2>,
}

impl DamageModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_coefficient(mut self, damage_type: impl Into<DamageTypeId>, value: f32) -> Self {
        self.coefficients.insert(damage_type.into(), value);
        self
    }

    #[must_use]
    pub fn with_flat_reduction(
        mut self,
        damage_type: impl Into<DamageTypeId>,
        value: FixedPoint2,
    ) -> Self {
        self.flat_reduction.insert(damage_type.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.coefficients.is_empty() && self.flat_reduction.is_empty()
    }

    /// Every damage type this set mentions.
    pub fn damage_types(&self) -> impl Iterator<Item = &DamageTypeId> {
        self.coefficients.keys().chain(self.flat_reduction.keys())
    }

    /// Returns the specifier after applying this set.
    pub fn apply(&self, damage: &DamageSpecifier) -> DamageSpecifier {
        damage
            .iter()
            .map(|(damage_type, &amount)| (damage_type.clone(), self.apply_one(damage_type, amount)))
            .collect()
    }

    fn apply_one(&self, damage_type: &DamageTypeId, amount: FixedPoint2) -> FixedPoint2 {
        if !amount.is_positive() {
            return amount;
        }

        let mut reduced = amount;
        if let Some(&flat) = self.flat_reduction.get(damage_type) {
            reduced = (reduced - flat).max(FixedPoint2::ZERO);
        }
        if let Some(&coefficient) = self.coefficients.get(damage_type) {
            reduced = reduced * coefficient;
        }
        reduced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(entries: &[(&str, i32)]) -> DamageSpecifier {
        entries
            .iter()
            .map(|(ty, amount)| (DamageTypeId::from(*ty), FixedPoint2::new(*amount)))
            .collect()
    }

    #[test]
    fn flat_reduction_then_coefficient() {
        let set = DamageModifierSet::new()
            .with_flat_reduction("Blunt", FixedPoint2::new(2))
            .with_coefficient("Blunt", 0.5);

        let result = set.apply(&spec(&[("Blunt", 10)]));
        assert_eq!(result.get("Blunt"), FixedPoint2::new(4));
    }

    #[test]
    fn flat_reduction_never_goes_negative() {
        let set = DamageModifierSet::new().with_flat_reduction("Heat", FixedPoint2::new(5));
        let result = set.apply(&spec(&[("Heat", 3)]));
        assert_eq!(result.get("Heat"), FixedPoint2::ZERO);
    }

    #[test]
    fn healing_and_unlisted_types_pass_through() {
        let set = DamageModifierSet::new().with_coefficient("Blunt", 0.0);
        let result = set.apply(&spec(&[("Blunt", -6), ("Slash", 8)]));
        assert_eq!(result.get("Blunt"), FixedPoint2::new(-6));
        assert_eq!(result.get("Slash"), FixedPoint2::new(8));
    }
}
