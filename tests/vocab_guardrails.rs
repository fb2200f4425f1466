use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use metagen_core::lang::{annotations, keywords, primitives, types};

/// Guardrail against reintroducing stringly-typed vocabulary checks.
///
/// This is intentionally a **coarse** safety net. It looks for suspicious patterns like
/// `== "jakarta.persistence.Id"` or `match name { "java.util.List" => ... }` in Rust source files where callers
/// should go through the `metagen_core::lang` registries instead.
///
/// Notes:
/// - Occurrences in `crates/metagen_core/src/lang/**` (the registries themselves) and in tests are allowed.
/// - This is not meant to be perfect; it's meant to catch "oops I added a string match".
#[test]
fn no_new_stringly_vocab_checks_in_rust_sources() {
    let root = repo_root();
    let spellings = registry_spellings();
    let mut offenders: Vec<(PathBuf, usize, String)> = Vec::new();

    let targets = [root.join("src"), root.join("crates")];
    for dir in targets {
        if dir.exists() {
            scan_dir(&root, &dir, &spellings, &mut offenders);
        }
    }

    if !offenders.is_empty() {
        let mut msg = String::new();
        msg.push_str("Found potential stringly-typed vocabulary checks. Prefer metagen_core registries.\n\n");
        for (path, line_no, line) in offenders.into_iter().take(80) {
            msg.push_str(&format!(
                "- {}:{}: {}\n",
                path.strip_prefix(&root).unwrap_or(&path).display(),
                line_no,
                line.trim()
            ));
        }
        panic!("{msg}");
    }
}

/// Every spelling resolves back to the entry that declares it, and no spelling is claimed twice.
#[test]
fn registry_spellings_are_unique_and_resolvable() {
    let mut seen = BTreeSet::new();
    for info in annotations::ANNOTATIONS {
        assert_eq!(annotations::from_str(info.canonical), Some(info.id), "{}", info.canonical);
        assert_eq!(annotations::as_str(info.id), info.canonical);
        for &alias in info.aliases {
            assert_eq!(annotations::from_str(alias), Some(info.id), "{alias}");
        }
        for spelling in std::iter::once(&info.canonical).chain(info.aliases) {
            assert!(seen.insert(*spelling), "'{spelling}' is registered twice");
        }
    }

    for info in types::KNOWN_TYPES {
        assert_eq!(types::from_str(info.canonical), Some(info.id), "{}", info.canonical);
        for spelling in std::iter::once(&info.canonical).chain(info.aliases) {
            assert!(seen.insert(*spelling), "'{spelling}' is registered twice");
        }
    }

    let mut words = BTreeSet::new();
    for info in keywords::KEYWORDS {
        assert_eq!(keywords::from_str(info.canonical), Some(info.id), "{}", info.canonical);
        assert!(words.insert(info.canonical), "keyword '{}' is registered twice", info.canonical);
    }
}

#[test]
fn primitives_round_trip_through_their_boxes() {
    for info in primitives::PRIMITIVES {
        let kind = info.item.id;
        let boxed = primitives::boxed_name(kind);
        assert_eq!(primitives::from_boxed(boxed), Some(kind), "{boxed}");
        assert_eq!(primitives::from_str(info.item.canonical), Some(kind));
    }
}

fn repo_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn registry_spellings() -> Vec<&'static str> {
    // Qualified names only: annotation and type spellings are the drift-prone ones. Query keywords are left out
    // since `"select"` and friends are ordinary words in messages and generated code.
    let mut set: BTreeSet<&'static str> = BTreeSet::new();

    for info in annotations::ANNOTATIONS {
        set.insert(info.canonical);
        for &alias in info.aliases {
            set.insert(alias);
        }
    }

    for info in types::KNOWN_TYPES {
        set.insert(info.canonical);
        for &alias in info.aliases {
            set.insert(alias);
        }
    }

    set.into_iter().collect()
}

fn is_allowed_file(root: &Path, path: &Path) -> bool {
    let rel = path.strip_prefix(root).unwrap_or(path).to_string_lossy();
    if !rel.ends_with(".rs") {
        return true;
    }
    // Registries define the spellings; allow them.
    if rel.starts_with("crates/metagen_core/src/lang/") {
        return true;
    }
    // Tests can mention spellings directly.
    if rel.starts_with("tests/") || rel.ends_with("/tests.rs") {
        return true;
    }
    false
}

fn scan_dir(root: &Path, dir: &Path, spellings: &[&'static str], offenders: &mut Vec<(PathBuf, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            scan_dir(root, &path, spellings, offenders);
            continue;
        }
        if is_allowed_file(root, &path) {
            continue;
        }
        let Ok(contents) = fs::read_to_string(&path) else {
            continue;
        };
        for (idx, line) in contents.lines().enumerate() {
            if is_suspicious_line(line, spellings) {
                offenders.push((path.clone(), idx + 1, line.to_string()));
            }
        }
    }
}

fn is_suspicious_line(line: &str, spellings: &[&'static str]) -> bool {
    // Avoid false positives in comments/docstrings.
    let trimmed = line.trim_start();
    if trimmed.starts_with("//") {
        return false;
    }

    // Only flag explicit equality checks or match arms for known vocabulary spellings.
    for s in spellings {
        let eq = format!("== \"{s}\"");
        let arm = format!("\"{s}\" =>");
        if line.contains(&eq) || line.contains(&arm) {
            return true;
        }
    }

    false
}
