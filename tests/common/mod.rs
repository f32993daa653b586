#![allow(dead_code)]

use trellis::prelude::*;

/// Blog-shaped fixture: `User`/`Post` share an `id` column name, `Post`
/// carries a boolean, `Employee` is self-related for self-join coverage.
pub fn schema() -> Schema {
    Schema::new()
        .table(
            Table::new("User")
                .column("id", TypeTag::integer())
                .column("email", TypeTag::text())
                .column("name", TypeTag::text())
                .relation("Post", "id", &["authorId"])
                .relation("Profile", "id", &["userId"]),
        )
        .table(
            Table::new("Post")
                .column("id", TypeTag::integer())
                .column("authorId", TypeTag::integer())
                .column("title", TypeTag::text())
                .column("published", TypeTag::boolean())
                .relation("User", "authorId", &["id"]),
        )
        .table(
            Table::new("Profile")
                .column("id", TypeTag::integer())
                .column("userId", TypeTag::integer())
                .column("bio", TypeTag::text().nullable())
                .relation("User", "userId", &["id"]),
        )
        .table(
            Table::new("Employee")
                .column("id", TypeTag::integer())
                .column("name", TypeTag::text())
                .column("managerId", TypeTag::integer().nullable())
                .relation("Employee", "managerId", &["id"]),
        )
}

/// Single table with the column names the condition examples use.
pub fn people() -> Schema {
    Schema::new().table(
        Table::new("Person")
            .column("id", TypeTag::integer())
            .column("name", TypeTag::text())
            .column("age", TypeTag::integer())
            .column("email", TypeTag::text().nullable()),
    )
}
