//! Snapshot tests for generated members
//!
//! Each test analyzes a small repository and compares the Java source of one generated member against an inline
//! snapshot. This ensures changes to emitted code are reviewed and intentional.
//!
//! Run with: `cargo test --test codegen_snapshot_tests`
//! Review changes: `cargo insta review`

use metagen::Metamodel;
use metagen::analysis::Analyzer;
use metagen::config::GeneratorConfig;
use metagen::diagnostics::CollectingSink;
use metagen::model::{
    AccessType, Annotation, DomainModel, EntityDescriptor, EntityKind, MemberElement, MethodDecl, ParamDecl,
    RepositoryDecl, TypeRef,
};
use metagen::query::HqlValidator;
use metagen_core::lang::annotations::{AnnotationId, VALUE_MEMBER};

fn ty(text: &str) -> TypeRef {
    TypeRef::parse(text).unwrap()
}

fn book() -> EntityDescriptor {
    EntityDescriptor::new("org.example.Book", EntityKind::Entity, AccessType::Field)
        .with_member(MemberElement::field("isbn", ty("java.lang.String")).annotated(Annotation::marker(AnnotationId::Id)))
        .with_member(
            MemberElement::field("isbn10", ty("java.lang.String")).annotated(Annotation::marker(AnnotationId::NaturalId)),
        )
        .with_member(MemberElement::field("title", ty("java.lang.String")))
        .with_member(MemberElement::field("pages", ty("int")))
}

/// `Library` reaching a stateful session through its `session()` getter.
fn library(method: MethodDecl) -> RepositoryDecl {
    RepositoryDecl::new("org.example.Library")
        .with_method(MethodDecl::new("session", ty("org.hibernate.Session")))
        .with_method(method)
}

/// `Library` on a reactive Mutiny session.
fn reactive_library(method: MethodDecl) -> RepositoryDecl {
    RepositoryDecl::new("org.example.Library")
        .with_method(MethodDecl::new("session", ty("org.hibernate.reactive.mutiny.Mutiny.Session")))
        .with_method(method)
}

/// A Jakarta Data repository in another package than the entity.
fn bookshelf(method: MethodDecl) -> RepositoryDecl {
    RepositoryDecl::new("org.example.store.Bookshelf")
        .annotated(Annotation::marker(AnnotationId::Repository))
        .with_method(method)
}

fn finder(name: &str, returns: &str, param: &str, param_type: &str) -> MethodDecl {
    MethodDecl::new(name, ty(returns))
        .annotated(Annotation::marker(AnnotationId::Find))
        .with_param(ParamDecl::new(param, ty(param_type)))
}

fn generate(repository: &RepositoryDecl, config: &GeneratorConfig) -> Metamodel {
    let model = DomainModel::new().with_entity(book());
    let analyzer = Analyzer::new(&model, &HqlValidator, config);
    let mut metamodel = analyzer.prepare(repository).unwrap();
    let mut sink = CollectingSink::new();
    analyzer.analyze_repository(repository, &mut metamodel, &mut sink).unwrap();
    assert!(sink.diagnostics().is_empty(), "{:?}", sink.messages());
    metamodel
}

fn member(metamodel: &Metamodel, property: &str) -> String {
    metamodel
        .members()
        .find(|m| m.property_name == property)
        .map(|m| m.declaration.clone())
        .unwrap_or_else(|| panic!("no member '{property}'"))
}

#[test]
fn test_identifier_finder() {
    let repo = library(finder("findByIsbn", "org.example.Book", "isbn", "java.lang.String"));
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "findByIsbn"), @r#"
    /**
     * Find {@link Book} by {@link Book#isbn isbn}.
     */
    @Override
    public Book findByIsbn(@Nonnull String isbn) {
        if (isbn == null) throw new IllegalArgumentException("Null isbn");
        return session.find(Book.class, isbn);
    }
    "#);
}

#[test]
fn test_identifier_finder_without_nonnull() {
    let repo = library(finder("findByIsbn", "org.example.Book", "isbn", "java.lang.String"));
    let metamodel = generate(&repo, &GeneratorConfig::new().with_nonnull_annotation(false));
    insta::assert_snapshot!(member(&metamodel, "findByIsbn"), @r#"
    /**
     * Find {@link Book} by {@link Book#isbn isbn}.
     */
    @Override
    public Book findByIsbn(String isbn) {
        if (isbn == null) throw new IllegalArgumentException("Null isbn");
        return session.find(Book.class, isbn);
    }
    "#);
}

#[test]
fn test_natural_key_finder() {
    let repo = library(finder("findByIsbn10", "org.example.Book", "isbn10", "java.lang.String"));
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "findByIsbn10"), @r"
    /**
     * Find {@link Book} by {@link Book#isbn10 isbn10}.
     */
    @Override
    public Book findByIsbn10(String isbn10) {
        return session.bySimpleNaturalId(Book.class)
                .load(isbn10);
    }
    ");
}

#[test]
fn test_criteria_finder() {
    let repo = library(finder("findByTitle", "java.util.List<org.example.Book>", "title", "java.lang.String"));
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "findByTitle"), @r"
    /**
     * Find {@link Book} by {@link Book#title title}.
     */
    @Override
    public List<Book> findByTitle(String title) {
        var _builder = session.getFactory().getCriteriaBuilder();
        var _query = _builder.createQuery(Book.class);
        var _entity = _query.from(Book.class);
        _query.where(
                title==null
                    ? _entity.get(Book_.title).isNull()
                    : _builder.equal(_entity.get(Book_.title), title)
        );
        return session.createQuery(_query)
                .getResultList();
    }
    ");
}

#[test]
fn test_static_finder_takes_the_entity_manager() {
    let repo = RepositoryDecl::new("org.example.Queries").with_method(finder(
        "findByIsbn",
        "org.example.Book",
        "isbn",
        "java.lang.String",
    ));
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "findByIsbn"), @r#"
    /**
     * Find {@link Book} by {@link Book#isbn isbn}.
     */
    public static Book findByIsbn(@Nonnull EntityManager entityManager, @Nonnull String isbn) {
        if (isbn == null) throw new IllegalArgumentException("Null isbn");
        return entityManager.find(Book.class, isbn);
    }
    "#);
}

#[test]
fn test_data_repository_finder_throws_when_missing() {
    let repo = bookshelf(
        MethodDecl::new("book", ty("org.example.Book"))
            .annotated(Annotation::marker(AnnotationId::DataFind))
            .with_param(ParamDecl::new("isbn", ty("java.lang.String"))),
    );
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "book"), @r#"
    /**
     * Find {@link Book} by {@link Book#isbn isbn}.
     */
    @Override
    public Book book(@Nonnull String isbn) {
        if (isbn == null) throw new IllegalArgumentException("Null isbn");
        var _result = session.get(Book.class, isbn);
        if (_result == null) throw new EmptyResultException("No 'Book' for given id [" + isbn + "]");
        return _result;
    }
    "#);
}

#[test]
fn test_query_method() {
    let repo = library(
        MethodDecl::new("titles", ty("java.util.List<java.lang.String>"))
            .annotated(
                Annotation::marker(AnnotationId::Hql)
                    .with_str(VALUE_MEMBER, "select title from Book where pages = :pages"),
            )
            .with_param(ParamDecl::new("pages", ty("int"))),
    );
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "TITLES_int"), @r#"
    static final String TITLES_int = "select title from Book where pages = :pages";

    /**
     * Execute the query {@value #TITLES_int}.
     */
    @Override
    public List<String> titles(int pages) {
        return session.createSelectionQuery(TITLES_int, String.class)
                .setParameter("pages", pages)
                .getResultList();
    }
    "#);
}

#[test]
fn test_lifecycle_method_translates_exceptions() {
    let repo = bookshelf(
        MethodDecl::new("add", TypeRef::Void)
            .annotated(Annotation::marker(AnnotationId::Insert))
            .with_param(ParamDecl::new("book", ty("org.example.Book"))),
    );
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "add"), @r"
    /**
     * Insert the given {@link Book}.
     */
    @Override
    public void add(Book book) {
        try {
            session.insert(book);
        }
        catch (EntityExistsException exception) {
            throw new jakarta.data.exceptions.EntityExistsException(exception.getMessage(), exception);
        }
        catch (PersistenceException exception) {
            throw new DataException(exception.getMessage(), exception);
        }
    }
    ");
}

#[test]
fn test_repository_constructor_and_getter() {
    let repo = library(finder("findByIsbn", "org.example.Book", "isbn", "java.lang.String"));
    let metamodel = generate(&repo, &GeneratorConfig::new().with_inject_annotation(true));
    insta::assert_snapshot!(member(&metamodel, "Library_"), @r"
    protected @Nonnull Session session;

    @Inject
    public Library_(@Nonnull Session session) {
        this.session = session;
    }
    ");
    insta::assert_snapshot!(member(&metamodel, "session"), @r"
    @Override
    public Session session() {
        return session;
    }
    ");
}

#[test]
fn test_container_managed_constructor() {
    let repo = bookshelf(
        MethodDecl::new("add", TypeRef::Void)
            .annotated(Annotation::marker(AnnotationId::Insert))
            .with_param(ParamDecl::new("book", ty("org.example.Book"))),
    );
    let metamodel = generate(&repo, &GeneratorConfig::new());
    let constructor = metamodel
        .members()
        .find(|m| m.key.name == "Bookshelf_()")
        .map(|m| m.declaration.clone())
        .unwrap();
    insta::assert_snapshot!(constructor, @r"
    @PersistenceUnit
    private EntityManagerFactory sessionFactory;

    @PostConstruct
    private void openSession() {
        session = sessionFactory.unwrap(SessionFactory.class).openStatelessSession();
    }

    @PreDestroy
    private void closeSession() {
        session.close();
    }

    Bookshelf_() {
    }
    ");
}

#[test]
fn test_reactive_identifier_finder_returns_uni() {
    let repo = reactive_library(finder("findByIsbn", "org.example.Book", "isbn", "java.lang.String"));
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "findByIsbn"), @r#"
    /**
     * Find {@link Book} by {@link Book#isbn isbn}.
     */
    @Override
    public Uni<Book> findByIsbn(@Nonnull String isbn) {
        if (isbn == null) throw new IllegalArgumentException("Null isbn");
        return session.find(Book.class, isbn);
    }
    "#);
}

#[test]
fn test_reactive_natural_key_finder_returns_uni() {
    let repo = reactive_library(finder("findByIsbn10", "org.example.Book", "isbn10", "java.lang.String"));
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "findByIsbn10"), @r"
    /**
     * Find {@link Book} by {@link Book#isbn10 isbn10}.
     */
    @Override
    public Uni<Book> findByIsbn10(String isbn10) {
        return session.find(Book.class, Identifier.id(Book_.isbn10, isbn10));
    }
    ");
}

#[test]
fn test_reactive_array_finder_returns_uni_of_array() {
    let repo = reactive_library(finder("findByTitle", "org.example.Book[]", "title", "java.lang.String"));
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "findByTitle"), @r"
    /**
     * Find {@link Book} by {@link Book#title title}.
     */
    @Override
    public Uni<Book[]> findByTitle(String title) {
        var _builder = session.getFactory().getCriteriaBuilder();
        var _query = _builder.createQuery(Book.class);
        var _entity = _query.from(Book.class);
        _query.where(
                title==null
                    ? _entity.get(Book_.title).isNull()
                    : _builder.equal(_entity.get(Book_.title), title)
        );
        return session.createQuery(_query)
                .getResultList()
                .map(_list -> _list.toArray(new Book[0]));
    }
    ");
}

#[test]
fn test_reactive_optional_finder_returns_uni_of_optional() {
    let repo = reactive_library(finder(
        "findByTitle",
        "java.util.Optional<org.example.Book>",
        "title",
        "java.lang.String",
    ));
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "findByTitle"), @r"
    /**
     * Find {@link Book} by {@link Book#title title}.
     */
    @Override
    public Uni<Optional<Book>> findByTitle(String title) {
        var _builder = session.getFactory().getCriteriaBuilder();
        var _query = _builder.createQuery(Book.class);
        var _entity = _query.from(Book.class);
        _query.where(
                title==null
                    ? _entity.get(Book_.title).isNull()
                    : _builder.equal(_entity.get(Book_.title), title)
        );
        return session.createQuery(_query)
                .getSingleResultOrNull()
                .map(Optional::ofNullable);
    }
    ");
}

#[test]
fn test_reactive_scalar_query_boxes_into_uni() {
    let repo = reactive_library(
        MethodDecl::new("countAll", ty("long"))
            .annotated(Annotation::marker(AnnotationId::Hql).with_str(VALUE_MEMBER, "select count(b) from Book b")),
    );
    let metamodel = generate(&repo, &GeneratorConfig::new());
    insta::assert_snapshot!(member(&metamodel, "COUNT_ALL"), @r#"
    static final String COUNT_ALL = "select count(b) from Book b";

    /**
     * Execute the query {@value #COUNT_ALL}.
     */
    @Override
    public Uni<Long> countAll() {
        return session.createSelectionQuery(COUNT_ALL, Long.class)
                .getSingleResult();
    }
    "#);
}
