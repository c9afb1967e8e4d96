//! Composition utilities for building accessors with `SQLite` backends.
//!
//! This module is focused purely on construction and contains no query
//! logic. It is also the replacement for registering accessors in a
//! process-wide container: build them here, then pass them through the
//! call graph explicitly.

use std::sync::Arc;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use repokit_core::{AccessorError, Entity, EntityStore};

use crate::accessor::SqliteEntityAccessor;

/// Factory for creating accessor instances with `SQLite` backends.
pub struct AccessorFactory {
    pool: SqlitePool,
}

impl AccessorFactory {
    /// Create a `SQLite` connection pool.
    ///
    /// # Arguments
    ///
    /// * `db_url` - `SQLite` connection URL (e.g., "sqlite:app.db")
    pub async fn create_pool(db_url: &str) -> anyhow::Result<SqlitePool> {
        let pool = SqlitePool::connect(db_url).await?;
        Ok(pool)
    }

    /// Create an in-memory `SQLite` pool for testing.
    pub async fn create_test_pool() -> anyhow::Result<SqlitePool> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        Ok(pool)
    }

    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Build an accessor for `E`, validating its binding against the
    /// connected schema.
    pub async fn accessor<E>(&self) -> Result<SqliteEntityAccessor<E>, AccessorError>
    where
        E: Entity + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        SqliteEntityAccessor::connect(self.pool.clone()).await
    }

    /// Build an accessor for `E` as a shareable trait object.
    ///
    /// This is the recommended way for consumers that depend on the
    /// `EntityStore` port rather than the concrete implementation.
    pub async fn shared<E>(&self) -> Result<Arc<dyn EntityStore<E>>, AccessorError>
    where
        E: Entity + Unpin + for<'r> FromRow<'r, SqliteRow>,
    {
        let accessor = self.accessor::<E>().await?;
        Ok(Arc::new(accessor))
    }
}

/// Test database helper for integration tests.
///
/// Provides an in-memory `SQLite` database with the fixture schema
/// already applied.
#[cfg(any(test, feature = "test-utils"))]
pub struct TestDb {
    pool: SqlitePool,
}

#[cfg(any(test, feature = "test-utils"))]
impl TestDb {
    /// Create a new in-memory test database with the fixture schema.
    pub async fn new() -> anyhow::Result<Self> {
        let pool = SqlitePool::connect("sqlite::memory:").await?;
        crate::fixtures::create_fixture_schema(&pool).await?;
        Ok(Self { pool })
    }

    /// Get the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create a factory bound to this test database.
    pub fn factory(&self) -> AccessorFactory {
        AccessorFactory::new(self.pool.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::Post;
    use repokit_core::Value;

    #[tokio::test]
    async fn test_factory_builds_accessor() {
        let db = TestDb::new().await.unwrap();
        let accessor = db.factory().accessor::<Post>().await.unwrap();
        assert_eq!(accessor.relations(), Post::relations());
    }

    #[tokio::test]
    async fn test_shared_accessor_is_usable_as_trait_object() {
        let db = TestDb::new().await.unwrap();
        let store: Arc<dyn EntityStore<Post>> = db.factory().shared::<Post>().await.unwrap();

        store
            .create(&[("title", Value::from("hello"))])
            .await
            .unwrap();
        let posts = store.list_all(None).await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "hello");
    }
}
