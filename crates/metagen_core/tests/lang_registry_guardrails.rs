use std::collections::HashMap;

use metagen_core::lang::annotations;
use metagen_core::lang::keywords;
use metagen_core::lang::primitives;
use metagen_core::lang::registry::LangItemInfo;
use metagen_core::lang::sessions;
use metagen_core::lang::types;

fn assert_unique_and_resolvable<Id: Copy + PartialEq + std::fmt::Debug>(
    registry: &str,
    items: &[LangItemInfo<Id>],
    resolve: impl Fn(&str) -> Option<Id>,
) {
    let mut seen: HashMap<&'static str, Id> = HashMap::new();

    for info in items {
        assert_eq!(
            resolve(info.canonical),
            Some(info.id),
            "{registry} canonical spelling not resolvable: {}",
            info.canonical
        );
        if let Some(prev) = seen.insert(info.canonical, info.id) {
            panic!(
                "duplicate {registry} spelling {:?}: {:?} and {:?}",
                info.canonical, prev, info.id
            );
        }

        for &alias in info.aliases {
            assert_eq!(
                resolve(alias),
                Some(info.id),
                "{registry} alias not resolvable: {}",
                alias
            );
            if let Some(prev) = seen.insert(alias, info.id) {
                panic!("duplicate {registry} alias spelling {:?}: {:?} and {:?}", alias, prev, info.id);
            }
        }
    }
}

#[test]
fn annotation_spellings_unique_and_resolvable() {
    assert_unique_and_resolvable("annotation", annotations::ANNOTATIONS, annotations::from_str);
    for info in annotations::ANNOTATIONS {
        assert_eq!(annotations::as_str(info.id), info.canonical);
    }
}

#[test]
fn known_type_spellings_unique_and_resolvable() {
    assert_unique_and_resolvable("known type", types::KNOWN_TYPES, types::from_str);
    for info in types::KNOWN_TYPES {
        assert_eq!(types::as_str(info.id), info.canonical);
    }
}

#[test]
fn primitive_spellings_unique_and_resolvable() {
    let items: Vec<_> = primitives::PRIMITIVES.iter().map(|p| p.item).collect();
    assert_unique_and_resolvable("primitive", &items, primitives::from_str);

    let mut boxed_seen = HashMap::new();
    for info in primitives::PRIMITIVES {
        assert_eq!(primitives::from_boxed(info.boxed), Some(info.item.id));
        if let Some(prev) = boxed_seen.insert(info.boxed, info.item.id) {
            panic!("boxed name {:?} shared by {:?} and {:?}", info.boxed, prev, info.item.id);
        }
    }
}

#[test]
fn spellings_are_fully_qualified_except_primitives() {
    for info in annotations::ANNOTATIONS {
        assert!(info.canonical.contains('.'), "annotation {:?} is unqualified", info.id);
    }
    for info in types::KNOWN_TYPES {
        assert!(info.canonical.contains('.'), "known type {:?} is unqualified", info.id);
    }
    for info in primitives::PRIMITIVES {
        assert!(!info.item.canonical.contains('.'));
    }
}

#[test]
fn result_container_sets_are_registered() {
    for id in types::LEGAL_RAW_RESULT_TYPES
        .iter()
        .chain(types::LEGAL_GENERIC_RESULT_TYPES)
        .chain(types::UNTYPED_PROJECTIONS)
    {
        assert!(types::KNOWN_TYPES.iter().any(|t| t.id == *id), "{id:?} not in registry");
    }
}

#[test]
fn every_session_type_has_a_flavor() {
    for info in types::KNOWN_TYPES {
        assert_eq!(
            types::is_session(info.id),
            sessions::flavor_of(info.id).is_some(),
            "session classification disagrees for {:?}",
            info.id
        );
    }
}

#[test]
fn keyword_spellings_unique_and_lowercase() {
    assert_unique_and_resolvable("keyword", keywords::KEYWORDS, keywords::from_str);
    for info in keywords::KEYWORDS {
        assert_eq!(info.canonical, info.canonical.to_ascii_lowercase());
        assert_eq!(keywords::from_str(&info.canonical.to_ascii_uppercase()), Some(info.id));
    }
}
