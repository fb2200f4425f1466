//! Query-language keyword vocabulary.
//!
//! Keywords of the managed query language subset understood by the reference validator. Matching is
//! case-insensitive: [`from_str`] lowercases before lookup.
//!
//! ## Examples
//! ```rust
//! use metagen_core::lang::keywords::{self, KeywordId};
//!
//! assert_eq!(keywords::from_str("SELECT"), Some(KeywordId::Select));
//! assert!(keywords::is_aggregate(KeywordId::Count));
//! assert_eq!(keywords::from_str("title"), None);
//! ```

use crate::lang::registry::{self, LangItemInfo, Origin, Stability};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeywordId {
    Select,
    Distinct,
    From,
    As,
    Join,
    Left,
    Right,
    Inner,
    Outer,
    Fetch,
    On,
    With,
    Where,
    And,
    Or,
    Not,
    Is,
    Null,
    Like,
    In,
    Between,
    Order,
    Group,
    Having,
    By,
    Asc,
    Desc,
    Nulls,
    First,
    Last,
    Update,
    Set,
    Delete,
    Insert,
    Into,
    Values,
    True,
    False,
    Count,
    Avg,
    Sum,
    Min,
    Max,
    Upper,
    Lower,
    Concat,
    Length,
}

pub type KeywordInfo = LangItemInfo<KeywordId>;

pub const KEYWORDS: &[KeywordInfo] = &[
    kw(KeywordId::Select, "select", "Starts a selection list."),
    kw(KeywordId::Distinct, "distinct", "Removes duplicate rows."),
    kw(KeywordId::From, "from", "Starts the from clause."),
    kw(KeywordId::As, "as", "Introduces an alias."),
    kw(KeywordId::Join, "join", "Joins an association or entity."),
    kw(KeywordId::Left, "left", "Left outer join."),
    kw(KeywordId::Right, "right", "Right outer join."),
    kw(KeywordId::Inner, "inner", "Inner join."),
    kw(KeywordId::Outer, "outer", "Outer join."),
    kw(KeywordId::Fetch, "fetch", "Fetch join."),
    kw(KeywordId::On, "on", "Join restriction."),
    kw(KeywordId::With, "with", "Legacy join restriction."),
    kw(KeywordId::Where, "where", "Starts the restriction."),
    kw(KeywordId::And, "and", "Conjunction."),
    kw(KeywordId::Or, "or", "Disjunction."),
    kw(KeywordId::Not, "not", "Negation."),
    kw(KeywordId::Is, "is", "Null test."),
    kw(KeywordId::Null, "null", "Null literal."),
    kw(KeywordId::Like, "like", "Pattern match."),
    kw(KeywordId::In, "in", "Membership test."),
    kw(KeywordId::Between, "between", "Range test."),
    kw(KeywordId::Order, "order", "Starts `order by`."),
    kw(KeywordId::Group, "group", "Starts `group by`."),
    kw(KeywordId::Having, "having", "Group restriction."),
    kw(KeywordId::By, "by", "Second word of `order by`/`group by`."),
    kw(KeywordId::Asc, "asc", "Ascending order."),
    kw(KeywordId::Desc, "desc", "Descending order."),
    kw(KeywordId::Nulls, "nulls", "Null precedence."),
    kw(KeywordId::First, "first", "Nulls first."),
    kw(KeywordId::Last, "last", "Nulls last."),
    kw(KeywordId::Update, "update", "Update statement."),
    kw(KeywordId::Set, "set", "Update assignments."),
    kw(KeywordId::Delete, "delete", "Delete statement."),
    kw(KeywordId::Insert, "insert", "Insert statement."),
    kw(KeywordId::Into, "into", "Insert target."),
    kw(KeywordId::Values, "values", "Insert values."),
    kw(KeywordId::True, "true", "Boolean literal."),
    kw(KeywordId::False, "false", "Boolean literal."),
    kw(KeywordId::Count, "count", "Row count aggregate."),
    kw(KeywordId::Avg, "avg", "Average aggregate."),
    kw(KeywordId::Sum, "sum", "Sum aggregate."),
    kw(KeywordId::Min, "min", "Minimum aggregate."),
    kw(KeywordId::Max, "max", "Maximum aggregate."),
    kw(KeywordId::Upper, "upper", "Uppercase string function."),
    kw(KeywordId::Lower, "lower", "Lowercase string function."),
    kw(KeywordId::Concat, "concat", "String concatenation function."),
    kw(KeywordId::Length, "length", "String length function."),
];

/// Resolve a word to a keyword, case-insensitively.
pub fn from_str(word: &str) -> Option<KeywordId> {
    registry::lookup(KEYWORDS, &word.to_ascii_lowercase())
}

pub fn as_str(id: KeywordId) -> &'static str {
    info_for(id).canonical
}

/// ## Panics
/// - If the registry is missing an entry for `id` (this indicates a programming error).
pub fn info_for(id: KeywordId) -> &'static KeywordInfo {
    KEYWORDS.iter().find(|k| k.id == id).expect("keyword info missing")
}

pub fn is_aggregate(id: KeywordId) -> bool {
    matches!(
        id,
        KeywordId::Count | KeywordId::Avg | KeywordId::Sum | KeywordId::Min | KeywordId::Max
    )
}

/// Keywords that are also callable as functions (`count(...)`, `upper(...)`).
pub fn is_function(id: KeywordId) -> bool {
    is_aggregate(id) || matches!(id, KeywordId::Upper | KeywordId::Lower | KeywordId::Concat | KeywordId::Length)
}

const fn kw(id: KeywordId, canonical: &'static str, description: &'static str) -> KeywordInfo {
    LangItemInfo {
        id,
        canonical,
        aliases: &[],
        description,
        origin: Origin::Hibernate,
        stability: Stability::Stable,
    }
}
