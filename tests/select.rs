use trellis::prelude::*;

mod common;

#[test]
fn star_over_multiple_sources_qualifies_and_aliases_every_column() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let sql = qb
        .from("User")
        .unwrap()
        .join("Post", "authorId", "User.id")
        .unwrap()
        .select("*")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT User.id AS \"User.id\", User.email AS \"User.email\", User.name AS \"User.name\", \
         Post.id AS \"Post.id\", Post.authorId AS \"Post.authorId\", Post.title AS \"Post.title\", \
         CASE WHEN Post.published = 1 THEN TRUE ELSE FALSE END AS \"Post.published\" \
         FROM User JOIN Post ON Post.authorId = User.id;"
    );
}

#[test]
fn table_star_expands_one_source() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    // Bare when it is the only source...
    let sql = qb.from("User").unwrap().select("User.*").unwrap().to_sql();
    assert_eq!(sql, "SELECT id, email, name FROM User;");

    // ...qualified and aliased when more sources are bound.
    let sql = qb
        .from("User")
        .unwrap()
        .join("Post", "authorId", "User.id")
        .unwrap()
        .select("User.*")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT User.id AS \"User.id\", User.email AS \"User.email\", User.name AS \"User.name\" \
         FROM User JOIN Post ON Post.authorId = User.id;"
    );
}

#[test]
fn bare_shared_column_is_rejected_qualified_accepted() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let joined = qb
        .from("User")
        .unwrap()
        .join("Post", "authorId", "User.id")
        .unwrap();

    let err = joined.clone().select("id").unwrap_err();
    assert!(err.to_string().contains("ambiguous"));
    assert!(err.to_string().contains("id"));

    let sql = joined.select("User.id").unwrap().to_sql();
    assert_eq!(
        sql,
        "SELECT User.id AS \"User.id\" FROM User JOIN Post ON Post.authorId = User.id;"
    );
}

#[test]
fn every_single_table_column_is_a_valid_bare_selector() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    for column in ["id", "email", "name"] {
        assert!(qb.from("User").unwrap().select(column).is_ok(), "{column}");
    }
}

#[test]
fn explicit_alias_renders_as_clause() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let sql = qb
        .from("User")
        .unwrap()
        .select_as("User.name", "author")
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT name AS \"author\" FROM User;");
}

#[test]
fn duplicate_result_keys_are_rejected() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let err = qb
        .from("User")
        .unwrap()
        .select("name")
        .unwrap()
        .select_as("email", "name")
        .unwrap_err();
    assert!(err.to_string().contains("duplicate"));

    let err = qb
        .from("User")
        .unwrap()
        .join("Post", "authorId", "User.id")
        .unwrap()
        .select("User.id")
        .unwrap()
        .select("User.id")
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateSelectKey(key) if key == "User.id"));
}

#[test]
fn select_all_omit_drops_named_columns() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let sql = qb
        .from("User")
        .unwrap()
        .select_all_omit(&["email"])
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT id, name FROM User;");
}

#[test]
fn select_all_omit_rejects_star_entries() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    for bad in ["*", "User.*"] {
        let err = qb
            .from("User")
            .unwrap()
            .select_all_omit(&[bad])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSelector(_)), "{bad}");
    }
}

#[test]
fn star_cannot_take_an_alias() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let err = qb.from("User").unwrap().select_as("*", "row").unwrap_err();
    assert!(matches!(err, Error::InvalidSelector(_)));
}

#[test]
fn function_context_selections() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let sql = qb
        .from("User")
        .unwrap()
        .select_with_as(|ctx| ctx.upper("User.name"), "upper_name")
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT UPPER(User.name) AS \"upper_name\" FROM User;");

    // Nested calls re-use the inner fragment verbatim.
    let sql = qb
        .from("User")
        .unwrap()
        .select_with_as(|ctx| ctx.upper(ctx.trim("name")?), "tidy")
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT UPPER(TRIM(name)) AS \"tidy\" FROM User;");
}

#[test]
fn function_context_validates_column_arguments() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let err = qb
        .from("User")
        .unwrap()
        .select_with(|ctx| ctx.upper("nickname"))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { .. }));

    let err = qb
        .from("User")
        .unwrap()
        .select_with(|ctx| ctx.call("MEDIAN", ["id"]))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownFunction(name) if name == "MEDIAN"));
}

#[test]
fn grouped_queries_enumerate_columns() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let sql = qb
        .from("Post")
        .unwrap()
        .group_by(&["authorId"])
        .unwrap()
        .select("authorId")
        .unwrap()
        .select_with_as(|ctx| ctx.count("*"), "posts")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT authorId, COUNT(*) AS \"posts\" FROM Post GROUP BY authorId;"
    );
}

#[test]
fn order_by_accepts_bound_columns_and_select_aliases() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let sql = qb
        .from("User")
        .unwrap()
        .select_as("name", "n")
        .unwrap()
        .order_by(&["n DESC", "email"])
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT name AS \"n\" FROM User ORDER BY n DESC, email;"
    );

    let err = qb
        .from("User")
        .unwrap()
        .select("name")
        .unwrap()
        .order_by(&["nickname"])
        .unwrap_err();
    assert!(matches!(err, Error::UnknownColumn { .. }));
}

#[test]
fn literals_compose_with_function_context() {
    let schema = common::schema();
    let dialect = SQLiteDialect::new();
    let qb = QueryBuilder::new(&schema, &dialect);

    let sql = qb
        .from("User")
        .unwrap()
        .select_with_as(
            |ctx| ctx.concat([FnArg::from(ctx.col("name")?), FnArg::from(lit(" <"))]),
            "label",
        )
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT name || ' <' AS \"label\" FROM User;");
}
