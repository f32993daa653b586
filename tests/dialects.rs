use trellis::prelude::*;

mod common;

#[test]
fn base_scenario_across_dialects() {
    let schema = common::schema();

    let sqlite = SQLiteDialect::new();
    let sql = QueryBuilder::new(&schema, &sqlite)
        .from("User")
        .unwrap()
        .select("*")
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT id, email, name FROM User;");

    let mysql = MySQLDialect::new();
    let sql = QueryBuilder::new(&schema, &mysql)
        .from("User")
        .unwrap()
        .select("*")
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT `id`, `email`, `name` FROM `User`;");

    let postgres = PostgresDialect::new();
    let sql = QueryBuilder::new(&schema, &postgres)
        .from("User")
        .unwrap()
        .select("*")
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT \"id\", \"email\", \"name\" FROM \"User\";");
}

#[test]
fn join_scenario_across_dialects() {
    let schema = common::schema();

    let postgres = PostgresDialect::new();
    let sql = QueryBuilder::new(&schema, &postgres)
        .from("User")
        .unwrap()
        .join("Post", "authorId", "User.id")
        .unwrap()
        .select("User.name")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT \"name\" FROM \"User\" JOIN \"Post\" ON \"Post\".\"authorId\" = \"User\".\"id\";"
    );

    let mysql = MySQLDialect::new();
    let sql = QueryBuilder::new(&schema, &mysql)
        .from("User")
        .unwrap()
        .join("Post", "authorId", "User.id")
        .unwrap()
        .select("User.name")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT `name` FROM `User` JOIN `Post` ON `Post`.`authorId` = `User`.`id`;"
    );
}

#[test]
fn criteria_fields_are_dialect_quoted() {
    let schema = common::schema();
    let postgres = PostgresDialect::new();

    let sql = QueryBuilder::new(&schema, &postgres)
        .from("User")
        .unwrap()
        .r#where(Criteria::new().field("User.id", Condition::eq(1)))
        .unwrap()
        .to_sql();
    assert_eq!(sql, "FROM \"User\" WHERE (\"User\".\"id\" = 1);");
}

#[test]
fn quoting_round_trips() {
    fn strip(s: &str, quote: char) -> String {
        s.chars().filter(|c| *c != quote).collect()
    }

    let sqlite = SQLiteDialect::new();
    assert_eq!(sqlite.quote_qualified("T.c"), "T.c");

    let mysql = MySQLDialect::new();
    assert_eq!(strip(&mysql.quote_qualified("T.c"), '`'), "T.c");

    let postgres = PostgresDialect::new();
    assert_eq!(strip(&postgres.quote_qualified("T.c"), '"'), "T.c");
}

#[test]
fn boolean_coercion_flags() {
    assert!(SQLiteDialect::new().needs_boolean_coercion());
    assert!(MySQLDialect::new().needs_boolean_coercion());
    assert!(!PostgresDialect::new().needs_boolean_coercion());
}

#[test]
fn boolean_columns_are_coerced_per_dialect() {
    let schema = common::schema();

    let sqlite = SQLiteDialect::new();
    let sql = QueryBuilder::new(&schema, &sqlite)
        .from("Post")
        .unwrap()
        .select("published")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT CASE WHEN published = 1 THEN TRUE ELSE FALSE END AS \"published\" FROM Post;"
    );

    let mysql = MySQLDialect::new();
    let sql = QueryBuilder::new(&schema, &mysql)
        .from("Post")
        .unwrap()
        .select("published")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT CASE WHEN `published` = 1 THEN TRUE ELSE FALSE END AS `published` FROM `Post`;"
    );

    let postgres = PostgresDialect::new();
    let sql = QueryBuilder::new(&schema, &postgres)
        .from("Post")
        .unwrap()
        .select("published")
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT \"published\" FROM \"Post\";");
}

#[test]
fn list_aggregation_diverges_per_dialect() {
    let schema = common::schema();

    let sqlite = SQLiteDialect::new();
    let sql = QueryBuilder::new(&schema, &sqlite)
        .from("Post")
        .unwrap()
        .group_by(&["authorId"])
        .unwrap()
        .select("authorId")
        .unwrap()
        .select_with_as(|ctx| ctx.group_concat("title"), "titles")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT authorId, GROUP_CONCAT(title) AS \"titles\" FROM Post GROUP BY authorId;"
    );

    let postgres = PostgresDialect::new();
    let sql = QueryBuilder::new(&schema, &postgres)
        .from("Post")
        .unwrap()
        .group_by(&["authorId"])
        .unwrap()
        .select("authorId")
        .unwrap()
        .select_with_as(|ctx| ctx.group_concat("title"), "titles")
        .unwrap()
        .to_sql();
    assert_eq!(
        sql,
        "SELECT \"authorId\", STRING_AGG(\"title\", ',') AS \"titles\" FROM \"Post\" GROUP BY \"authorId\";"
    );
}

#[test]
fn dialect_unique_functions_are_scoped_to_their_dialect() {
    let schema = common::schema();

    let sqlite = SQLiteDialect::new();
    let sql = QueryBuilder::new(&schema, &sqlite)
        .from("Post")
        .unwrap()
        .select_with_as(|ctx| ctx.call("TOTAL", ["Post.id"]), "total")
        .unwrap()
        .to_sql();
    assert_eq!(sql, "SELECT TOTAL(Post.id) AS \"total\" FROM Post;");

    let postgres = PostgresDialect::new();
    let err = QueryBuilder::new(&schema, &postgres)
        .from("Post")
        .unwrap()
        .select_with_as(|ctx| ctx.call("TOTAL", ["Post.id"]), "total")
        .unwrap_err();
    assert!(matches!(err, Error::UnknownFunction(_)));
}

#[test]
fn literal_booleans_render_identically_everywhere() {
    // Column storage coercion is dialect-specific; literal rendering is not.
    assert_eq!(lit(true).sql(), "1");
    assert_eq!(lit(false).sql(), "0");
}
