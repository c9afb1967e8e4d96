//! Test fixtures: a small blog schema and its entity bindings.
//!
//! `Post` declares both relation kinds, so the fixture set exercises
//! every eager-loading path. The schema matches what an embedding
//! application would own in production.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

use repokit_core::{Entity, Relation};

/// Create the fixture schema on `pool`.
pub async fn create_fixture_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            body TEXT NOT NULL DEFAULT '',
            author_id INTEGER REFERENCES authors(id),
            published INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            post_id INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            body TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_post ON comments(post_id)")
        .execute(pool)
        .await?;

    Ok(())
}

/// A blog post. Declares one `has_many` and one `belongs_to` relation.
#[derive(Debug, Clone, PartialEq, Default, FromRow, Serialize, Deserialize)]
#[sqlx(default)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub body: String,
    pub author_id: Option<i64>,
    pub published: bool,
    pub created_at: Option<NaiveDateTime>,
}

impl Entity for Post {
    type Id = i64;

    fn table() -> &'static str {
        "posts"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "title", "body", "author_id", "published", "created_at"]
    }

    fn relations() -> &'static [Relation] {
        const RELATIONS: &[Relation] = &[
            Relation::has_many("comments", "comments", "post_id"),
            Relation::belongs_to("author", "authors", "author_id"),
        ];
        RELATIONS
    }

    fn id(&self) -> &i64 {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Default, FromRow, Serialize, Deserialize)]
#[sqlx(default)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub body: String,
}

impl Entity for Comment {
    type Id = i64;

    fn table() -> &'static str {
        "comments"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "post_id", "body"]
    }

    fn id(&self) -> &i64 {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Default, FromRow, Serialize, Deserialize)]
#[sqlx(default)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

impl Entity for Author {
    type Id = i64;

    fn table() -> &'static str {
        "authors"
    }

    fn columns() -> &'static [&'static str] {
        &["id", "name"]
    }

    fn id(&self) -> &i64 {
        &self.id
    }
}
