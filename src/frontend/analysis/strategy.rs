//! Lookup strategy selection for finder methods.
//!
//! The fallback rules are business rules of the session APIs and are kept exactly:
//! - a stateless session has no natural-key lookup API, and neither a stateless nor a reactive session can enable
//!   fetch profiles on a by-id fetch;
//! - a reactive session can emulate a natural-key lookup, but not with fetch profiles.

use std::collections::BTreeSet;
use std::fmt;

use metagen_core::lang::sessions::SessionFlavor;

/// The role of the attribute a finder parameter matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeRole {
    Identifier,
    NaturalKey,
    Basic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LookupStrategy {
    Identifier,
    NaturalKey,
    Criteria,
}

impl fmt::Display for LookupStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupStrategy::Identifier => write!(f, "identifier lookup"),
            LookupStrategy::NaturalKey => write!(f, "natural-key lookup"),
            LookupStrategy::Criteria => write!(f, "criteria lookup"),
        }
    }
}

/// Pick the strategy for a finder with exactly one attribute-matching parameter.
pub fn pick_single(role: AttributeRole, flavor: SessionFlavor, fetch_profiles: bool) -> LookupStrategy {
    match role {
        AttributeRole::Identifier => {
            if (flavor.is_stateless() || flavor.is_reactive()) && fetch_profiles {
                LookupStrategy::Criteria
            } else {
                LookupStrategy::Identifier
            }
        }
        AttributeRole::NaturalKey => {
            if flavor.is_stateless() || (flavor.is_reactive() && fetch_profiles) {
                LookupStrategy::Criteria
            } else {
                LookupStrategy::NaturalKey
            }
        }
        AttributeRole::Basic => LookupStrategy::Criteria,
    }
}

/// Pick the strategy for a finder with several attribute-matching parameters.
///
/// ## Parameters
/// - `matches`: the resolved `(attribute path, role)` of each attribute-matching parameter; `None` for a parameter
///   that did not resolve.
/// - `natural_key_count`: the number of natural-key members the entity declares.
pub fn pick_multiple(
    matches: &[Option<(&str, AttributeRole)>],
    natural_key_count: usize,
    flavor: SessionFlavor,
) -> LookupStrategy {
    if flavor.is_stateless() {
        return LookupStrategy::Criteria;
    }
    let mut seen = BTreeSet::new();
    let all_natural = matches.iter().all(|m| match m {
        Some((path, AttributeRole::NaturalKey)) => seen.insert(*path),
        _ => false,
    });
    if all_natural && matches.len() == natural_key_count {
        LookupStrategy::NaturalKey
    } else {
        LookupStrategy::Criteria
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metagen_core::lang::sessions::ALL_FLAVORS;

    #[test]
    fn test_identifier_fallback_table() {
        use SessionFlavor::*;
        let cases = [
            (EntityManager, false, LookupStrategy::Identifier),
            (EntityManager, true, LookupStrategy::Identifier),
            (Stateful, false, LookupStrategy::Identifier),
            (Stateful, true, LookupStrategy::Identifier),
            (Stateless, false, LookupStrategy::Identifier),
            (Stateless, true, LookupStrategy::Criteria),
            (Reactive, false, LookupStrategy::Identifier),
            (Reactive, true, LookupStrategy::Criteria),
        ];
        for (flavor, profiles, expected) in cases {
            assert_eq!(
                pick_single(AttributeRole::Identifier, flavor, profiles),
                expected,
                "{flavor:?} profiles={profiles}"
            );
        }
    }

    #[test]
    fn test_natural_key_fallback_table() {
        use SessionFlavor::*;
        let cases = [
            (EntityManager, false, LookupStrategy::NaturalKey),
            (EntityManager, true, LookupStrategy::NaturalKey),
            (Stateful, false, LookupStrategy::NaturalKey),
            (Stateful, true, LookupStrategy::NaturalKey),
            (Stateless, false, LookupStrategy::Criteria),
            (Stateless, true, LookupStrategy::Criteria),
            (Reactive, false, LookupStrategy::NaturalKey),
            (Reactive, true, LookupStrategy::Criteria),
        ];
        for (flavor, profiles, expected) in cases {
            assert_eq!(
                pick_single(AttributeRole::NaturalKey, flavor, profiles),
                expected,
                "{flavor:?} profiles={profiles}"
            );
        }
    }

    #[test]
    fn test_basic_attribute_is_always_criteria() {
        for flavor in ALL_FLAVORS {
            assert_eq!(pick_single(AttributeRole::Basic, *flavor, false), LookupStrategy::Criteria);
        }
    }

    #[test]
    fn test_multiple_requires_the_full_natural_key() {
        let nk = AttributeRole::NaturalKey;
        let full = [Some(("isbn10", nk)), Some(("edition", nk))];
        assert_eq!(pick_multiple(&full, 2, SessionFlavor::Stateful), LookupStrategy::NaturalKey);
        assert_eq!(pick_multiple(&full, 3, SessionFlavor::Stateful), LookupStrategy::Criteria);
        assert_eq!(pick_multiple(&full[..1], 2, SessionFlavor::Stateful), LookupStrategy::Criteria);
        assert_eq!(pick_multiple(&full, 2, SessionFlavor::Stateless), LookupStrategy::Criteria);
    }

    #[test]
    fn test_multiple_rejects_repeated_or_mixed_members() {
        let nk = AttributeRole::NaturalKey;
        let repeated = [Some(("isbn10", nk)), Some(("isbn10", nk))];
        assert_eq!(pick_multiple(&repeated, 2, SessionFlavor::Stateful), LookupStrategy::Criteria);
        let mixed = [Some(("isbn10", nk)), Some(("title", AttributeRole::Basic))];
        assert_eq!(pick_multiple(&mixed, 2, SessionFlavor::Stateful), LookupStrategy::Criteria);
        let unresolved = [Some(("isbn10", nk)), None];
        assert_eq!(pick_multiple(&unresolved, 2, SessionFlavor::Stateful), LookupStrategy::Criteria);
    }
}
