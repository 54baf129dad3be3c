use std::collections::HashMap;

use crate::formula::Formula;

/// Structurally unifies `pattern` (whose `Prop` nodes are meta-variables)
/// against a concrete `instance`, extending `bindings` in place.
///
/// `Prop(p)` matches any formula, binding `p` on first occurrence; a
/// later occurrence of the same `p` must structurally equal the already
/// bound formula. `Top`/`Bottom` match only themselves. Every other
/// constructor must match the same constructor, unifying children
/// left-to-right. Replaces the source implementation's regex-based
/// extraction, which depended on surface syntax rather than AST shape.
pub fn unify(pattern: &Formula, instance: &Formula, bindings: &mut HashMap<String, Formula>) -> bool {
    match pattern {
        Formula::Prop(name) => match bindings.get(name) {
            Some(bound) => bound == instance,
            None => {
                bindings.insert(name.clone(), instance.clone());
                true
            }
        },
        Formula::Top => matches!(instance, Formula::Top),
        Formula::Bottom => matches!(instance, Formula::Bottom),
        Formula::Neg(a) => match instance {
            Formula::Neg(a2) => unify(a, a2, bindings),
            _ => false,
        },
        Formula::And(a, b) => match instance {
            Formula::And(a2, b2) => unify(a, a2, bindings) && unify(b, b2, bindings),
            _ => false,
        },
        Formula::Or(a, b) => match instance {
            Formula::Or(a2, b2) => unify(a, a2, bindings) && unify(b, b2, bindings),
            _ => false,
        },
        Formula::Imp(a, b) => match instance {
            Formula::Imp(a2, b2) => unify(a, a2, bindings) && unify(b, b2, bindings),
            _ => false,
        },
        Formula::Iff(a, b) => match instance {
            Formula::Iff(a2, b2) => unify(a, a2, bindings) && unify(b, b2, bindings),
            _ => false,
        },
    }
}

/// Tries to find a single binding map under which every `Qi` unifies
/// against the matching `Li` and `R` unifies against `conclusion`. Each
/// premise and the conclusion are unified against the *same* growing
/// binding map, so repeated meta-variables are checked for consistency
/// across the whole inference, not per-premise.
pub fn unify_inference(
    premise_patterns: &[Formula],
    premise_instances: &[Formula],
    conclusion_pattern: &Formula,
    conclusion_instance: &Formula,
) -> Option<HashMap<String, Formula>> {
    if premise_patterns.len() != premise_instances.len() {
        return None;
    }
    let mut bindings = HashMap::new();
    for (pattern, instance) in premise_patterns.iter().zip(premise_instances.iter()) {
        if !unify(pattern, instance, &mut bindings) {
            return None;
        }
    }
    if !unify(conclusion_pattern, conclusion_instance, &mut bindings) {
        return None;
    }
    Some(bindings)
}
