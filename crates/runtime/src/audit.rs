//! Audit logging of applied damage changes.

use damage_core::{DamageChangedEvent, DamageSpecifier, EntityId};
use tracing::info;

/// Renders a delta as a JSON object `{"<type>": <amount>}`, or `null` for an
/// absolute set.
pub fn render_delta(delta: Option<&DamageSpecifier>) -> String {
    serde_json::to_string(&delta).unwrap_or_else(|err| format!("\"<unrenderable: {err}>\""))
}

/// A change listener that logs every change at `info`.
pub fn audit_listener() -> impl FnMut(EntityId, &DamageChangedEvent<'_>) + Send + 'static {
    |entity, event| {
        info!(
            target: "damage::audit",
            entity = %entity,
            origin = ?event.origin(),
            delta = %render_delta(event.damage_delta()),
            total = %event.damageable().total_damage(),
            increased = event.damage_increased(),
            interrupts = event.interrupts_do_afters(),
            "damage changed"
        );
    }
}
