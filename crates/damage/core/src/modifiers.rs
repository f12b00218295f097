//! Global tunable damage multipliers.
//!
//! Multipliers are applied by the system that originates the damage (melee
//! resolution, explosions, metabolism, ...) while it builds the specifier.
//! The damage pipeline itself never applies them.

use strum::{EnumCount, IntoEnumIterator};

use crate::specifier::DamageSpecifier;

/// Damage-origin categories that carry a global multiplier.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ModifierCategory {
    Melee,
    Projectile,
    Hitscan,
    Explosion,
    Thrown,
    ReagentDamage,
    ReagentHeal,
    Mob,
    TopicalsHeal,
    AllDamage,
    AllHeal,
}

impl ModifierCategory {
    /// Name of the tunable setting backing this category.
    pub const fn setting_name(self) -> &'static str {
        match self {
            Self::Melee => "playtest.melee_damage_modifier",
            Self::Projectile => "playtest.projectile_damage_modifier",
            Self::Hitscan => "playtest.hitscan_damage_modifier",
            Self::Explosion => "playtest.explosion_damage_modifier",
            Self::Thrown => "playtest.thrown_damage_modifier",
            Self::ReagentDamage => "playtest.reagent_damage_modifier",
            Self::ReagentHeal => "playtest.reagent_heal_modifier",
            Self::Mob => "playtest.mob_damage_modifier",
            Self::TopicalsHeal => "playtest.topicals_heal_modifier",
            Self::AllDamage => "playtest.all_damage_modifier",
            Self::AllHeal => "playtest.all_heal_modifier",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Where a piece of damage came from, as far as multipliers are concerned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DamageSource {
    Melee,
    Projectile,
    Hitscan,
    Explosion,
    Thrown,
    Reagent,
    Mob,
    Topical,
    Radiation,
    Other,
}

impl DamageSource {
    /// Category scaling harmful amounts from this source, before `AllDamage`.
    pub const fn damage_category(self) -> Option<ModifierCategory> {
        match self {
            Self::Melee => Some(ModifierCategory::Melee),
            Self::Projectile => Some(ModifierCategory::Projectile),
            Self::Hitscan => Some(ModifierCategory::Hitscan),
            Self::Explosion => Some(ModifierCategory::Explosion),
            Self::Thrown => Some(ModifierCategory::Thrown),
            Self::Reagent => Some(ModifierCategory::ReagentDamage),
            Self::Mob => Some(ModifierCategory::Mob),
            Self::Topical | Self::Radiation | Self::Other => None,
        }
    }

    /// Category scaling healing amounts from this source, before `AllHeal`.
    pub const fn heal_category(self) -> Option<ModifierCategory> {
        match self {
            Self::Reagent => Some(ModifierCategory::ReagentHeal),
            Self::Topical => Some(ModifierCategory::TopicalsHeal),
            _ => None,
        }
    }
}

/// Current value of every [`ModifierCategory`], each defaulting to `1.0`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalModifierSet {
    values: [f32; ModifierCategory::COUNT],
}

impl GlobalModifierSet {
    pub const DEFAULT_VALUE: f32 = 1.0;

    pub fn new() -> Self {
        Self {
            values: [Self::DEFAULT_VALUE; ModifierCategory::COUNT],
        }
    }

    pub fn get(&self, category: ModifierCategory) -> f32 {
        self.values[category.index()]
    }

    /// Stores `value`, returning the previous one.
    pub fn set(&mut self, category: ModifierCategory, value: f32) -> f32 {
        std::mem::replace(&mut self.values[category.index()], value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ModifierCategory, f32)> + '_ {
        ModifierCategory::iter().map(|category| (category, self.get(category)))
    }

    /// Scales a specifier the way an originating system would before raising it.
    ///
    /// Harmful amounts are multiplied by the source's damage category and then
    /// by `AllDamage`; healing amounts by the source's heal category and then by
    /// `AllHeal`.
    pub fn scale(&self, source: DamageSource, damage: &DamageSpecifier) -> DamageSpecifier {
        let harm = self.factor(source.damage_category(), ModifierCategory::AllDamage);
        let heal = self.factor(source.heal_category(), ModifierCategory::AllHeal);

        damage.map_amounts(|_, amount| {
            if amount.is_positive() {
                amount * harm
            } else if amount.is_negative() {
                amount * heal
            } else {
                amount
            }
        })
    }

    fn factor(&self, category: Option<ModifierCategory>, universal: ModifierCategory) -> f32 {
        category.map_or(1.0, |category| self.get(category)) * self.get(universal)
    }
}

impl Default for GlobalModifierSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FixedPoint2;
    use crate::prototype::DamageTypeId;

    fn spec(entries: &[(&str, i32)]) -> DamageSpecifier {
        entries
            .iter()
            .map(|(ty, amount)| (DamageTypeId::from(*ty), FixedPoint2::new(*amount)))
            .collect()
    }

    #[test]
    fn every_category_defaults_to_one() {
        let set = GlobalModifierSet::new();
        assert!(set.iter().all(|(_, value)| value == 1.0));
        assert_eq!(set.iter().count(), ModifierCategory::COUNT);
    }

    #[test]
    fn categories_update_independently() {
        let mut set = GlobalModifierSet::new();
        assert_eq!(set.set(ModifierCategory::Melee, 2.0), 1.0);
        assert_eq!(set.get(ModifierCategory::Melee), 2.0);
        assert_eq!(set.get(ModifierCategory::Projectile), 1.0);
    }

    #[test]
    fn scales_harm_by_category_and_universal() {
        let mut set = GlobalModifierSet::new();
        set.set(ModifierCategory::Melee, 2.0);
        set.set(ModifierCategory::AllDamage, 0.5);
        set.set(ModifierCategory::AllHeal, 3.0);

        let scaled = set.scale(DamageSource::Melee, &spec(&[("Blunt", 10), ("Heat", -2)]));

        assert_eq!(scaled.get("Blunt"), FixedPoint2::new(10));
        assert_eq!(scaled.get("Heat"), FixedPoint2::new(-6));
    }

    #[test]
    fn reagents_use_separate_damage_and_heal_categories() {
        let mut set = GlobalModifierSet::new();
        set.set(ModifierCategory::ReagentDamage, 0.5);
        set.set(ModifierCategory::ReagentHeal, 2.0);

        let scaled = set.scale(DamageSource::Reagent, &spec(&[("Poison", 4), ("Blunt", -3)]));

        assert_eq!(scaled.get("Poison"), FixedPoint2::new(2));
        assert_eq!(scaled.get("Blunt"), FixedPoint2::new(-6));
    }

    #[test]
    fn setting_names_parse_back() {
        let category: ModifierCategory = "reagent_heal".parse().unwrap();
        assert_eq!(category, ModifierCategory::ReagentHeal);
        assert_eq!(
            ModifierCategory::AllDamage.setting_name(),
            "playtest.all_damage_modifier"
        );
    }
}
