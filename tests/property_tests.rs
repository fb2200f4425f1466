//! Property-based tests for metagen
//!
//! These tests use proptest to verify invariants across many randomly
//! generated inputs, catching edge cases that hand-written tests might miss.

use metagen::analysis::paths::{MemberTypeCache, MemberTypeEntry, resolve_path};
use metagen::analysis::strategy::{AttributeRole, LookupStrategy, pick_multiple, pick_single};
use metagen::model::{
    AccessType, Annotation, DomainModel, EntityDescriptor, EntityKind, EntityProvider, MemberElement, TypeRef,
};
use metagen::query::ParameterLabel;
use metagen::query::{lexer, native};
use metagen_core::lang::annotations::AnnotationId;
use metagen_core::lang::sessions::{ALL_FLAVORS, SessionFlavor};
use proptest::prelude::*;

fn identifier() -> impl Strategy<Value = String> {
    "[a-z][a-zA-Z0-9]{0,8}"
}

fn flavor() -> impl Strategy<Value = SessionFlavor> {
    proptest::sample::select(ALL_FLAVORS.to_vec())
}

// =============================================================================
// Name Properties
// =============================================================================

mod name_tests {
    use super::*;

    proptest! {
        /// Property: normalized path names use only `.` as separator
        #[test]
        fn normalize_path_name_removes_separators(name in "[a-z$_.]{0,20}") {
            let normalized = metagen_core::normalize_path_name(&name);
            prop_assert!(!normalized.contains('$'));
            prop_assert!(!normalized.contains('_'));
            prop_assert_eq!(normalized.len(), name.len());
        }

        /// Property: decapitalizing twice changes nothing more
        #[test]
        fn decapitalize_is_idempotent(name in "[A-Za-z][A-Za-z0-9]{0,10}") {
            let once = metagen_core::decapitalize(&name);
            prop_assert_eq!(metagen_core::decapitalize(&once), once.clone());
            prop_assert_eq!(once.len(), name.len());
        }

        /// Property: a getter's property name is its decapitalized suffix
        #[test]
        fn getter_property_name_strips_prefix(suffix in "[A-Z][a-z0-9]{0,10}") {
            let getter = format!("get{suffix}");
            prop_assert_eq!(
                metagen_core::getter_property_name(&getter),
                Some(metagen_core::decapitalize(&suffix))
            );
        }

        /// Property: every type may be bound where the same type is expected
        #[test]
        fn legal_assignment_is_reflexive(name in "[a-z]{1,5}(\\.[A-Z][a-z]{0,5}){1,3}") {
            prop_assert!(metagen_core::is_legal_assignment(&name, &name));
        }
    }
}

// =============================================================================
// Strategy Properties
// =============================================================================

mod strategy_tests {
    use super::*;

    proptest! {
        /// Property: a stateless session never gets a natural-key lookup
        #[test]
        fn stateless_never_uses_natural_keys(count in 1usize..5, profiles in any::<bool>()) {
            let paths: Vec<String> = (0..count).map(|i| format!("key{i}")).collect();
            let matches: Vec<_> = paths.iter().map(|p| Some((p.as_str(), AttributeRole::NaturalKey))).collect();
            prop_assert_eq!(pick_multiple(&matches, count, SessionFlavor::Stateless), LookupStrategy::Criteria);
            prop_assert_eq!(
                pick_single(AttributeRole::NaturalKey, SessionFlavor::Stateless, profiles),
                LookupStrategy::Criteria
            );
        }

        /// Property: several parameters use the natural key only when they cover all of it exactly once
        #[test]
        fn natural_key_requires_complete_cover(
            declared in 1usize..6,
            supplied in 1usize..6,
            flavor in flavor(),
        ) {
            prop_assume!(!flavor.is_stateless());
            let paths: Vec<String> = (0..supplied).map(|i| format!("key{i}")).collect();
            let matches: Vec<_> = paths.iter().map(|p| Some((p.as_str(), AttributeRole::NaturalKey))).collect();
            let expected = if supplied == declared { LookupStrategy::NaturalKey } else { LookupStrategy::Criteria };
            prop_assert_eq!(pick_multiple(&matches, declared, flavor), expected);
        }

        /// Property: one basic attribute among the parameters forces a criteria query
        #[test]
        fn basic_attribute_forces_criteria(count in 1usize..5, basic_at in 0usize..5, flavor in flavor()) {
            let basic_at = basic_at % count;
            let paths: Vec<String> = (0..count).map(|i| format!("key{i}")).collect();
            let matches: Vec<_> = paths
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let role = if i == basic_at { AttributeRole::Basic } else { AttributeRole::NaturalKey };
                    Some((p.as_str(), role))
                })
                .collect();
            prop_assert_eq!(pick_multiple(&matches, count, flavor), LookupStrategy::Criteria);
        }
    }
}

// =============================================================================
// Path Resolution Properties
// =============================================================================

mod path_tests {
    use super::*;

    fn entity(access: AccessType, names: &[String]) -> EntityDescriptor {
        let mut entity = EntityDescriptor::new("org.example.Thing", EntityKind::Entity, access);
        for (i, name) in names.iter().enumerate() {
            let ty = TypeRef::parse("java.lang.String").unwrap();
            let member = match access {
                AccessType::Field => MemberElement::field(name.clone(), ty),
                AccessType::Property => {
                    let mut getter = name.clone();
                    getter[..1].make_ascii_uppercase();
                    MemberElement::getter(format!("get{getter}"), ty)
                }
            };
            entity = entity.with_member(if i == 0 { member.annotated(Annotation::marker(AnnotationId::Id)) } else { member });
        }
        entity
    }

    /// Lowercase names, so that a getter's JavaBeans property name is the name itself.
    fn member_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9]{0,8}"
    }

    proptest! {
        /// Property: resolving the same path twice yields the same cache updates
        #[test]
        fn resolution_is_deterministic(
            names in proptest::collection::btree_set(member_name(), 1..6),
            lookup in member_name(),
            property in any::<bool>(),
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let access = if property { AccessType::Property } else { AccessType::Field };
            let model = DomainModel::new().with_entity(entity(access, &names));
            let thing = model.resolve("org.example.Thing").unwrap();

            let first = resolve_path(thing, &lookup, &model);
            let second = resolve_path(thing, &lookup, &model);
            prop_assert_eq!(&first.cache_updates, &second.cache_updates);
            prop_assert_eq!(first.segments.len(), first.cache_updates.len());
            prop_assert_eq!(first.is_resolved(), names.contains(&lookup));
        }

        /// Property: an entity only matches members of its own access convention
        #[test]
        fn access_conventions_are_never_mixed(names in proptest::collection::btree_set(member_name(), 1..6)) {
            let names: Vec<String> = names.into_iter().collect();
            let model = DomainModel::new().with_entity(entity(AccessType::Property, &names));
            let thing = model.resolve("org.example.Thing").unwrap();
            for name in &names {
                let mut getter = name.clone();
                getter[..1].make_ascii_uppercase();
                let accessor = format!("get{getter}");
                prop_assert!(resolve_path(thing, name, &model).is_resolved());
                prop_assert!(!resolve_path(thing, &accessor, &model).is_resolved());
            }
        }

        /// Property: the member type cache keeps the first type recorded for a member
        #[test]
        fn cache_is_first_writer_wins(
            entries in proptest::collection::vec((identifier(), identifier(), identifier()), 0..12),
        ) {
            let entries: Vec<MemberTypeEntry> = entries
                .into_iter()
                .map(|(enclosing, member, member_type)| MemberTypeEntry { enclosing, member, member_type })
                .collect();
            let mut cache = MemberTypeCache::new();
            cache.merge(entries.iter().cloned());
            let snapshot = cache.clone();
            cache.merge(entries.iter().cloned());
            prop_assert_eq!(&cache, &snapshot);

            for entry in &entries {
                let first = entries
                    .iter()
                    .find(|e| e.enclosing == entry.enclosing && e.member == entry.member)
                    .unwrap();
                prop_assert_eq!(cache.member_type(&entry.enclosing, &entry.member), Some(first.member_type.as_str()));
            }
        }
    }
}

// =============================================================================
// Query Text Properties
// =============================================================================

mod query_tests {
    use super::*;

    proptest! {
        /// Property: the lexer never panics, whatever the input
        #[test]
        fn tokenize_never_panics(text in "\\PC{0,60}") {
            let _ = lexer::tokenize(&text);
        }

        /// Property: a named parameter is found in native SQL, but not inside a string literal
        #[test]
        fn native_named_parameters(name in identifier()) {
            let sql = format!("select * from books where title = :{name}");
            let found = native::scan_parameters(&sql);
            prop_assert_eq!(found.len(), 1);
            prop_assert_eq!(&found[0].label, &ParameterLabel::Named(name.clone()));
            let placeholder = format!(":{name}");
            prop_assert_eq!(&sql[found[0].span.start..found[0].span.end], placeholder.as_str());

            let quoted = format!("select * from books where title = ':{name}'");
            prop_assert!(native::scan_parameters(&quoted).is_empty());
        }
    }
}
