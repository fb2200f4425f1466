//! Shared emission helpers: the [`Emitter`], method headers, javadoc, and metamodel attribute references.

use metagen_core::lang::types::{self as known, KnownTypeId};

use crate::backend::imports::ImportContext;
use crate::backend::plan::{SessionBinding, Signature};
use crate::backend::writer::JavaWriter;
use crate::config::GeneratorConfig;
use crate::frontend::analysis::params::ClassifiedParam;
use crate::frontend::analysis::paths::MemberTypeCache;
use crate::model::TypeRef;

/// Runtime types referenced by generated code that are not part of the analyzed vocabulary.
pub(crate) mod runtime {
    pub const NONNULL: &str = "jakarta.annotation.Nonnull";
    pub const GENERATED: &str = "jakarta.annotation.Generated";
    pub const POST_CONSTRUCT: &str = "jakarta.annotation.PostConstruct";
    pub const PRE_DESTROY: &str = "jakarta.annotation.PreDestroy";
    pub const INJECT: &str = "jakarta.inject.Inject";
    pub const DEPENDENT: &str = "jakarta.enterprise.context.Dependent";
    pub const PERSISTENCE_UNIT: &str = "jakarta.persistence.PersistenceUnit";
    pub const ENTITY_MANAGER_FACTORY: &str = "jakarta.persistence.EntityManagerFactory";
    pub const SESSION_FACTORY: &str = "org.hibernate.SessionFactory";

    pub const NO_RESULT: &str = "jakarta.persistence.NoResultException";
    pub const NON_UNIQUE_RESULT: &str = "jakarta.persistence.NonUniqueResultException";
    pub const PERSISTENCE_EXCEPTION: &str = "jakarta.persistence.PersistenceException";
    pub const ENTITY_EXISTS: &str = "jakarta.persistence.EntityExistsException";
    pub const STALE_STATE: &str = "org.hibernate.StaleStateException";
    pub const DATA_EMPTY_RESULT: &str = "jakarta.data.exceptions.EmptyResultException";
    pub const DATA_NON_UNIQUE_RESULT: &str = "jakarta.data.exceptions.NonUniqueResultException";
    pub const DATA_EXCEPTION: &str = "jakarta.data.exceptions.DataException";
    pub const DATA_ENTITY_EXISTS: &str = "jakarta.data.exceptions.EntityExistsException";
    pub const DATA_OPTIMISTIC_LOCK: &str = "jakarta.data.exceptions.OptimisticLockingFailureException";

    pub const PAGE_RECORD: &str = "jakarta.data.page.impl.PageRecord";
    pub const CURSORED_PAGE_RECORD: &str = "jakarta.data.page.impl.CursoredPageRecord";
    pub const SORT_DIRECTION: &str = "org.hibernate.query.SortDirection";
    pub const ARRAY_LIST: &str = "java.util.ArrayList";
    pub const IDENTIFIER: &str = "org.hibernate.reactive.common.Identifier";
}

/// Java source emission for one member.
pub(crate) struct Emitter<'e> {
    pub out: JavaWriter,
    pub config: &'e GeneratorConfig,
    imports: &'e mut ImportContext,
    member_types: &'e MemberTypeCache,
}

impl<'e> Emitter<'e> {
    pub fn new(imports: &'e mut ImportContext, member_types: &'e MemberTypeCache, config: &'e GeneratorConfig) -> Self {
        Self {
            out: JavaWriter::new(config),
            config,
            imports,
            member_types,
        }
    }

    pub fn finish(self) -> String {
        self.out.finish()
    }

    /// Spell a type, importing what it needs.
    pub fn ty(&mut self, spelling: &str) -> String {
        self.imports.import_type(spelling)
    }

    pub fn type_ref(&mut self, ty: &TypeRef) -> String {
        self.ty(&ty.to_string())
    }

    pub fn known(&mut self, id: KnownTypeId) -> String {
        self.ty(known::as_str(id))
    }

    /// `Book.class`; primitives use their boxed class.
    pub fn class_literal(&mut self, ty: &TypeRef) -> String {
        format!("{}.class", self.type_ref(&ty.boxed().erasure()))
    }

    pub fn entity_class(&mut self, entity: &str) -> String {
        format!("{}.class", self.ty(entity))
    }

    /// A static metamodel attribute, `Book_.isbn`.
    pub fn attribute(&mut self, entity: &str, member: &str) -> String {
        format!("{}.{member}", self.ty(&format!("{entity}_")))
    }

    /// A criteria path from `root` along the dotted `path`, typed through the member type cache.
    pub fn criteria_path(&mut self, root: &str, entity: &str, path: &str) -> String {
        let mut expression = root.to_string();
        let mut owner = Some(entity.to_string());
        for member in path.split('.') {
            let Some(current) = owner.take() else {
                break;
            };
            let attribute = self.attribute(&current, member);
            expression.push_str(&format!(".get({attribute})"));
            owner = self.member_types.member_type(&current, member).map(str::to_string);
        }
        expression
    }

    pub fn javadoc(&mut self, text: &str) {
        self.out.writeln("/**");
        for line in text.lines() {
            if line.is_empty() {
                self.out.writeln(" *");
            } else {
                self.out.writeln(&format!(" * {line}"));
            }
        }
        self.out.writeln(" */");
    }

    fn parameter(&mut self, ty: &TypeRef, name: &str, nonnull: bool) -> String {
        let spelled = self.type_ref(ty);
        if nonnull && self.config.add_nonnull_annotation && !ty.is_primitive() {
            let annotation = self.ty(runtime::NONNULL);
            format!("@{annotation} {spelled} {name}")
        } else {
            format!("{spelled} {name}")
        }
    }

    /// Write `@Override public R name(params) {` (or the static form) and indent for the body.
    pub fn open_method(&mut self, signature: &Signature, session: &SessionBinding) {
        let mut params = Vec::with_capacity(signature.params.len() + 1);
        if session.leading_parameter {
            params.push(self.parameter(&TypeRef::known(session.flavor.type_id()), &session.expression, true));
        }
        for param in &signature.params {
            params.push(self.parameter(&param.type_, &param.variable(), !param.nullable));
        }
        let return_type = self.type_ref(&signature.generated_return_type(session));
        if session.leading_parameter {
            self.out.writeln(&format!(
                "public static {return_type} {}({}) {{",
                signature.name,
                params.join(", ")
            ));
        } else {
            self.out.writeln("@Override");
            self.out
                .writeln(&format!("public {return_type} {}({}) {{", signature.name, params.join(", ")));
        }
        self.out.indent();
    }

    pub fn close_block(&mut self) {
        self.out.dedent();
        self.out.writeln("}");
    }

    /// Reject `null` for attribute parameters that may not be null.
    pub fn null_checks(&mut self, params: &[ClassifiedParam]) {
        for param in params.iter().filter(|p| p.is_attribute() && !p.nullable && !p.type_.is_primitive()) {
            self.out.writeln(&format!(
                "if ({} == null) throw new IllegalArgumentException(\"Null {}\");",
                param.variable(),
                param.binding
            ));
        }
    }

    /// The session expression for Hibernate-only operations.
    pub fn hibernate_session(&mut self, session: &SessionBinding) -> String {
        if session.flavor.uses_entity_manager() {
            let native = self.known(KnownTypeId::Session);
            format!("{}.unwrap({native}.class)", session.expression)
        } else {
            session.expression.clone()
        }
    }
}

/// `{@link Book#isbn isbn}` references joined for a javadoc sentence.
pub(crate) fn attribute_links(entity_simple: &str, params: &[&ClassifiedParam]) -> String {
    let links: Vec<String> = params
        .iter()
        .map(|p| format!("{{@link {entity_simple}#{} {}}}", p.binding, p.binding))
        .collect();
    match links.as_slice() {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., last] => format!("{} and {last}", init.join(", ")),
    }
}

/// `findBooksByTitle` becomes `FIND_BOOKS_BY_TITLE`.
pub(crate) fn constant_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_uppercase() && previous_lower {
            out.push('_');
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_uppercase());
    }
    out
}

/// The simple spelling of a type in a generated identifier.
pub(crate) fn type_token(ty: &TypeRef) -> String {
    match ty {
        TypeRef::Primitive(_) => ty.to_string(),
        TypeRef::Declared { name, .. } => metagen_core::simple_name(name).to_string(),
        TypeRef::Array(component) => format!("{}Array", type_token(component)),
        TypeRef::TypeVar(name) => name.clone(),
        TypeRef::Wildcard { .. } | TypeRef::Void => "Object".to_string(),
    }
}

/// Quote `text` as a Java string literal.
pub(crate) fn string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_case() {
        assert_eq!(constant_case("findBooksByTitle"), "FIND_BOOKS_BY_TITLE");
        assert_eq!(constant_case("books"), "BOOKS");
        assert_eq!(constant_case("byISBN"), "BY_ISBN");
        assert_eq!(constant_case("top10Books"), "TOP10_BOOKS");
    }

    #[test]
    fn test_type_tokens() {
        assert_eq!(type_token(&TypeRef::parse("java.lang.String").unwrap()), "String");
        assert_eq!(type_token(&TypeRef::parse("int").unwrap()), "int");
        assert_eq!(type_token(&TypeRef::parse("java.util.List<java.lang.String>").unwrap()), "List");
        assert_eq!(type_token(&TypeRef::parse("org.example.Book[]").unwrap()), "BookArray");
    }

    #[test]
    fn test_string_literal_escapes() {
        assert_eq!(string_literal("where title = 'x'"), "\"where title = 'x'\"");
        assert_eq!(string_literal("a \"b\"\nc"), "\"a \\\"b\\\"\\nc\"");
    }

    #[test]
    fn test_criteria_path_follows_member_types() {
        use crate::frontend::analysis::paths::MemberTypeEntry;
        let mut cache = MemberTypeCache::new();
        cache.insert(MemberTypeEntry {
            enclosing: "org.example.Book".to_string(),
            member: "address".to_string(),
            member_type: "org.example.Address".to_string(),
        });
        let mut imports = ImportContext::new("org.example");
        let config = GeneratorConfig::default();
        let mut emitter = Emitter::new(&mut imports, &cache, &config);
        assert_eq!(
            emitter.criteria_path("_entity", "org.example.Book", "address.city"),
            "_entity.get(Book_.address).get(Address_.city)"
        );
    }
}
