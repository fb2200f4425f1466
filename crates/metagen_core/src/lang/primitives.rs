//! Primitive type vocabulary.
//!
//! Covers the eight host primitive types and their boxed declared counterparts.
//!
//! ## Examples
//! ```rust
//! use metagen_core::lang::primitives::{self, PrimitiveKind};
//!
//! assert_eq!(primitives::from_str("int"), Some(PrimitiveKind::Int));
//! assert_eq!(primitives::boxed_name(PrimitiveKind::Int), "java.lang.Integer");
//! assert_eq!(primitives::from_boxed("java.lang.Character"), Some(PrimitiveKind::Char));
//! ```

use crate::lang::registry::{LangItemInfo, Origin, Stability};

/// Stable identifier for primitive types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

/// Extension metadata: a primitive plus its boxed class.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveInfo {
    pub item: LangItemInfo<PrimitiveKind>,
    pub boxed: &'static str,
}

/// Registry of primitive types.
pub const PRIMITIVES: &[PrimitiveInfo] = &[
    info(PrimitiveKind::Boolean, "boolean", "java.lang.Boolean"),
    info(PrimitiveKind::Byte, "byte", "java.lang.Byte"),
    info(PrimitiveKind::Short, "short", "java.lang.Short"),
    info(PrimitiveKind::Int, "int", "java.lang.Integer"),
    info(PrimitiveKind::Long, "long", "java.lang.Long"),
    info(PrimitiveKind::Char, "char", "java.lang.Character"),
    info(PrimitiveKind::Float, "float", "java.lang.Float"),
    info(PrimitiveKind::Double, "double", "java.lang.Double"),
];

/// Resolve a primitive keyword to its kind.
pub fn from_str(name: &str) -> Option<PrimitiveKind> {
    PRIMITIVES.iter().find(|p| p.item.canonical == name).map(|p| p.item.id)
}

/// Resolve a boxed class name (`java.lang.Integer`) to the primitive it boxes.
pub fn from_boxed(name: &str) -> Option<PrimitiveKind> {
    PRIMITIVES.iter().find(|p| p.boxed == name).map(|p| p.item.id)
}

/// Return the keyword spelling of a primitive.
pub fn as_str(kind: PrimitiveKind) -> &'static str {
    info_for(kind).item.canonical
}

/// Return the boxed class name of a primitive.
pub fn boxed_name(kind: PrimitiveKind) -> &'static str {
    info_for(kind).boxed
}

pub fn info_for(kind: PrimitiveKind) -> &'static PrimitiveInfo {
    PRIMITIVES
        .iter()
        .find(|p| p.item.id == kind)
        .expect("primitive info missing")
}

const fn info(id: PrimitiveKind, canonical: &'static str, boxed: &'static str) -> PrimitiveInfo {
    PrimitiveInfo {
        item: LangItemInfo {
            id,
            canonical,
            aliases: &[],
            description: "Primitive type.",
            origin: Origin::Jdk,
            stability: Stability::Stable,
        },
        boxed,
    }
}
