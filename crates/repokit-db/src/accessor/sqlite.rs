//! `SQLite` implementation of the `EntityStore` trait.

use std::collections::HashMap;
use std::marker::PhantomData;

use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, warn};

use repokit_core::{
    AccessorError, DeleteOutcome, Entity, EntityRef, EntityStore, Loaded, Page, Relation,
    RelationKind, SortOrder, Value,
};

use super::sql::{
    bind_values, placeholders, row_to_json, row_value, storage_err, table_columns, value_key,
};

/// Column [`EntityStore::order_by`] sorts on when no field is given.
pub const DEFAULT_ORDER_COLUMN: &str = "created_at";

/// `SQLite` implementation of the `EntityStore` trait.
///
/// Generic over the entity binding: one accessor serves one entity
/// type. Construction validates the binding against the live schema;
/// afterwards the accessor holds no mutable state beyond the pool.
pub struct SqliteEntityAccessor<E> {
    pool: SqlitePool,
    _entity: PhantomData<E>,
}

impl<E> Clone for SqliteEntityAccessor<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for SqliteEntityAccessor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteEntityAccessor").finish_non_exhaustive()
    }
}

impl<E> SqliteEntityAccessor<E>
where
    E: Entity + Unpin + for<'r> FromRow<'r, SqliteRow>,
{
    /// Resolve the entity binding against the connected database.
    ///
    /// Fails with [`AccessorError::InvalidModelType`] when the entity's
    /// table is missing, when the id column or a declared column is
    /// absent from it, or when a declared relation's table or key
    /// column does not exist.
    pub async fn connect(pool: SqlitePool) -> Result<Self, AccessorError> {
        let live = table_columns(&pool, E::table()).await?;
        if live.is_empty() {
            return Err(AccessorError::InvalidModelType(format!(
                "table '{}' does not exist in the connected database",
                E::table()
            )));
        }
        let live_has = |name: &str| live.iter().any(|c| c == name);
        if !live_has(E::id_column()) {
            return Err(AccessorError::InvalidModelType(format!(
                "table '{}' has no id column '{}'",
                E::table(),
                E::id_column()
            )));
        }
        for column in E::columns() {
            if !live_has(column) {
                return Err(AccessorError::InvalidModelType(format!(
                    "declared column '{}' is missing from table '{}'",
                    column,
                    E::table()
                )));
            }
        }
        for relation in E::relations() {
            let related = table_columns(&pool, relation.table).await?;
            if related.is_empty() {
                return Err(AccessorError::InvalidModelType(format!(
                    "relation '{}' targets missing table '{}'",
                    relation.name, relation.table
                )));
            }
            match relation.kind {
                RelationKind::HasMany { foreign_key } => {
                    if !related.iter().any(|c| c == foreign_key) {
                        return Err(AccessorError::InvalidModelType(format!(
                            "relation '{}' expects column '{}' on table '{}'",
                            relation.name, foreign_key, relation.table
                        )));
                    }
                }
                RelationKind::BelongsTo { foreign_key } => {
                    if !live_has(foreign_key) {
                        return Err(AccessorError::InvalidModelType(format!(
                            "relation '{}' expects column '{}' on table '{}'",
                            relation.name,
                            foreign_key,
                            E::table()
                        )));
                    }
                }
            }
        }
        debug!(
            table = E::table(),
            relations = E::relations().len(),
            "entity binding resolved"
        );
        Ok(Self {
            pool,
            _entity: PhantomData,
        })
    }

    /// Declared relation list of the bound entity.
    pub fn relations(&self) -> &'static [Relation] {
        E::relations()
    }

    /// Get a reference to the underlying pool (for testing only).
    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn check_column(name: &str) -> Result<(), AccessorError> {
        if E::columns().contains(&name) {
            Ok(())
        } else {
            Err(AccessorError::UnknownColumn(format!(
                "'{}' is not a declared column of '{}'",
                name,
                E::table()
            )))
        }
    }

    fn select_list(columns: Option<&[&str]>) -> Result<String, AccessorError> {
        match columns {
            None | Some([]) => Ok("*".to_string()),
            Some(cols) => {
                for column in cols {
                    Self::check_column(column)?;
                }
                Ok(cols.join(", "))
            }
        }
    }

    /// Select list for relation-loading queries: the caller's
    /// projection widened with the key columns grouping needs.
    fn relation_select_list(columns: Option<&[&str]>) -> Result<String, AccessorError> {
        let Some(cols) = columns else {
            return Ok("*".to_string());
        };
        if cols.is_empty() {
            return Ok("*".to_string());
        }
        for column in cols {
            Self::check_column(column)?;
        }
        let mut effective: Vec<&str> = cols.to_vec();
        if !effective.contains(&E::id_column()) {
            effective.push(E::id_column());
        }
        for relation in E::relations() {
            if let RelationKind::BelongsTo { foreign_key } = relation.kind {
                if !effective.contains(&foreign_key) {
                    effective.push(foreign_key);
                }
            }
        }
        Ok(effective.join(", "))
    }

    /// `field = ?` (one bind) or `field IS NULL` (no bind).
    fn eq_fragment(field: &str, value: &Value) -> Result<(String, bool), AccessorError> {
        Self::check_column(field)?;
        if value.is_null() {
            Ok((format!("{field} IS NULL"), false))
        } else {
            Ok((format!("{field} = ?"), true))
        }
    }

    async fn fetch_entities(&self, sql: &str, binds: &[Value]) -> Result<Vec<E>, AccessorError> {
        bind_values!(sqlx::query_as::<_, E>(sql), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)
    }

    async fn fetch_optional_entity(
        &self,
        sql: &str,
        binds: &[Value],
    ) -> Result<Option<E>, AccessorError> {
        bind_values!(sqlx::query_as::<_, E>(sql), binds)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)
    }

    async fn fetch_rows(
        &self,
        sql: &str,
        binds: &[Value],
    ) -> Result<Vec<SqliteRow>, AccessorError> {
        bind_values!(sqlx::query(sql), binds)
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)
    }

    /// Run a row query and eager-load every declared relation with one
    /// batched lookup per relation.
    async fn fetch_loaded(&self, sql: &str, binds: &[Value]) -> Result<Vec<Loaded<E>>, AccessorError> {
        let rows = self.fetch_rows(sql, binds).await?;
        self.attach_relations(&rows).await
    }

    async fn attach_relations(&self, rows: &[SqliteRow]) -> Result<Vec<Loaded<E>>, AccessorError> {
        let mut loaded = Vec::with_capacity(rows.len());
        for row in rows {
            let entity = E::from_row(row).map_err(storage_err)?;
            let related: HashMap<String, Vec<serde_json::Value>> = E::relations()
                .iter()
                .map(|relation| (relation.name.to_string(), Vec::new()))
                .collect();
            loaded.push(Loaded { entity, related });
        }
        if rows.is_empty() {
            return Ok(loaded);
        }

        for relation in E::relations() {
            let (parent_key_column, related_key_column) = match relation.kind {
                RelationKind::HasMany { foreign_key } => (E::id_column(), foreign_key),
                RelationKind::BelongsTo { foreign_key } => (foreign_key, "id"),
            };
            let parent_keys: Vec<Value> = rows
                .iter()
                .map(|row| row_value(row, parent_key_column))
                .collect::<Result<_, _>>()?;

            let mut distinct: Vec<Value> = Vec::new();
            for key in &parent_keys {
                if !key.is_null() && !distinct.contains(key) {
                    distinct.push(key.clone());
                }
            }
            if distinct.is_empty() {
                continue;
            }

            let sql = format!(
                "SELECT * FROM {} WHERE {} IN ({})",
                relation.table,
                related_key_column,
                placeholders(distinct.len())
            );
            let related_rows = self.fetch_rows(&sql, &distinct).await?;

            let mut groups: HashMap<String, Vec<serde_json::Value>> = HashMap::new();
            for row in &related_rows {
                let key = value_key(&row_value(row, related_key_column)?);
                groups.entry(key).or_default().push(row_to_json(row)?);
            }

            for (entry, key) in loaded.iter_mut().zip(&parent_keys) {
                if key.is_null() {
                    continue;
                }
                if let Some(docs) = groups.get(&value_key(key)) {
                    entry.related.insert(relation.name.to_string(), docs.clone());
                }
            }
        }
        Ok(loaded)
    }

    async fn delete_by_id(&self, id: &E::Id) -> Result<bool, AccessorError> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", E::table(), E::id_column());
        let id_value: Value = id.clone().into();
        let result = bind_values!(sqlx::query(&sql), std::slice::from_ref(&id_value))
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn try_delete(&self, target: EntityRef<E>) -> Result<bool, AccessorError> {
        match target {
            EntityRef::ById(id) => self.delete_by_id(&id).await,
            EntityRef::ByEntity(entity) => {
                // resolve first; the loaded copy may be stale
                let existing = self.find_or_fail(entity.id(), None).await?;
                self.delete_by_id(existing.id()).await
            }
        }
    }
}

#[async_trait]
impl<E> EntityStore<E> for SqliteEntityAccessor<E>
where
    E: Entity + Unpin + for<'r> FromRow<'r, SqliteRow>,
{
    async fn list_all(&self, columns: Option<&[&str]>) -> Result<Vec<E>, AccessorError> {
        let sql = format!("SELECT {} FROM {}", Self::select_list(columns)?, E::table());
        self.fetch_entities(&sql, &[]).await
    }

    async fn take(&self, limit: u32) -> Result<Vec<E>, AccessorError> {
        let sql = format!("SELECT * FROM {} LIMIT ?", E::table());
        self.fetch_entities(&sql, &[Value::from(limit)]).await
    }

    async fn take_by(
        &self,
        limit: u32,
        field: &str,
        value: &Value,
    ) -> Result<Vec<E>, AccessorError> {
        let (fragment, needs_bind) = Self::eq_fragment(field, value)?;
        let sql = format!("SELECT * FROM {} WHERE {} LIMIT ?", E::table(), fragment);
        let mut binds = Vec::new();
        if needs_bind {
            binds.push(value.clone());
        }
        binds.push(Value::from(limit));
        self.fetch_entities(&sql, &binds).await
    }

    async fn take_by_with_relations(
        &self,
        limit: u32,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Loaded<E>>, AccessorError> {
        let (fragment, needs_bind) = Self::eq_fragment(field, value)?;
        let sql = format!("SELECT * FROM {} WHERE {} LIMIT ?", E::table(), fragment);
        let mut binds = Vec::new();
        if needs_bind {
            binds.push(value.clone());
        }
        binds.push(Value::from(limit));
        self.fetch_loaded(&sql, &binds).await
    }

    async fn take_random_by_with_relations(
        &self,
        limit: u32,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Loaded<E>>, AccessorError> {
        let (fragment, needs_bind) = Self::eq_fragment(field, value)?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} ORDER BY RANDOM() LIMIT ?",
            E::table(),
            fragment
        );
        let mut binds = Vec::new();
        if needs_bind {
            binds.push(value.clone());
        }
        binds.push(Value::from(limit));
        self.fetch_loaded(&sql, &binds).await
    }

    async fn list_all_with_relations(
        &self,
        columns: Option<&[&str]>,
    ) -> Result<Vec<Loaded<E>>, AccessorError> {
        let sql = format!(
            "SELECT {} FROM {}",
            Self::relation_select_list(columns)?,
            E::table()
        );
        self.fetch_loaded(&sql, &[]).await
    }

    async fn paginate(
        &self,
        page: u32,
        per_page: u32,
        columns: Option<&[&str]>,
    ) -> Result<Page<E>, AccessorError> {
        let page = page.max(1);
        let per_page = per_page.max(1);

        let count_sql = format!("SELECT COUNT(*) FROM {}", E::table());
        let total: i64 = sqlx::query_scalar(&count_sql)
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)?;

        let sql = format!(
            "SELECT {} FROM {} LIMIT ? OFFSET ?",
            Self::select_list(columns)?,
            E::table()
        );
        let offset = i64::from(page - 1) * i64::from(per_page);
        let items = self
            .fetch_entities(&sql, &[Value::from(i64::from(per_page)), Value::from(offset)])
            .await?;

        Ok(Page::new(items, u64::try_from(total).unwrap_or(0), page, per_page))
    }

    async fn create(&self, data: &[(&str, Value)]) -> Result<E, AccessorError> {
        let sql = if data.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES RETURNING *", E::table())
        } else {
            for (column, _) in data {
                Self::check_column(column)?;
            }
            let columns = data.iter().map(|(c, _)| *c).collect::<Vec<_>>().join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
                E::table(),
                columns,
                placeholders(data.len())
            )
        };
        bind_values!(sqlx::query_as::<_, E>(&sql), data.iter().map(|(_, value)| value))
            .fetch_one(&self.pool)
            .await
            .map_err(storage_err)
    }

    async fn update(
        &self,
        data: &[(&str, Value)],
        target: EntityRef<E>,
    ) -> Result<E, AccessorError> {
        let id = target.id();
        if data.is_empty() {
            // merging nothing is a read, but a missing target still fails loudly
            return self.find_or_fail(&id, None).await;
        }
        for (column, _) in data {
            Self::check_column(column)?;
        }
        let assignments = data
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ? RETURNING *",
            E::table(),
            assignments,
            E::id_column()
        );
        let id_value: Value = id.clone().into();
        let query = bind_values!(
            sqlx::query_as::<_, E>(&sql),
            data.iter().map(|(_, value)| value)
        );
        bind_values!(query, std::slice::from_ref(&id_value))
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?
            .ok_or_else(|| {
                AccessorError::NotFound(format!("{} with {} {}", E::table(), E::id_column(), id))
            })
    }

    async fn delete(&self, target: EntityRef<E>) -> DeleteOutcome {
        match self.try_delete(target).await {
            Ok(true) => DeleteOutcome::succeeded(),
            Ok(false) => DeleteOutcome::failed("no rows matched"),
            Err(error) => {
                warn!(table = E::table(), %error, "delete failed");
                DeleteOutcome::failed(error.to_string())
            }
        }
    }

    async fn where_eq(
        &self,
        field: &str,
        value: &Value,
        columns: Option<&[&str]>,
    ) -> Result<Vec<E>, AccessorError> {
        let (fragment, needs_bind) = Self::eq_fragment(field, value)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            Self::select_list(columns)?,
            E::table(),
            fragment
        );
        let binds = if needs_bind { vec![value.clone()] } else { Vec::new() };
        self.fetch_entities(&sql, &binds).await
    }

    async fn where_eq_with_relations(
        &self,
        field: &str,
        value: &Value,
        columns: Option<&[&str]>,
    ) -> Result<Vec<Loaded<E>>, AccessorError> {
        let (fragment, needs_bind) = Self::eq_fragment(field, value)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {}",
            Self::relation_select_list(columns)?,
            E::table(),
            fragment
        );
        let binds = if needs_bind { vec![value.clone()] } else { Vec::new() };
        self.fetch_loaded(&sql, &binds).await
    }

    async fn find(&self, id: &E::Id, columns: Option<&[&str]>) -> Result<Option<E>, AccessorError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            Self::select_list(columns)?,
            E::table(),
            E::id_column()
        );
        let id_value: Value = id.clone().into();
        self.fetch_optional_entity(&sql, &[id_value]).await
    }

    async fn find_with_relations(
        &self,
        id: &E::Id,
        columns: Option<&[&str]>,
    ) -> Result<Option<Loaded<E>>, AccessorError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            Self::relation_select_list(columns)?,
            E::table(),
            E::id_column()
        );
        let id_value: Value = id.clone().into();
        Ok(self.fetch_loaded(&sql, &[id_value]).await?.into_iter().next())
    }

    async fn find_or_fail(
        &self,
        id: &E::Id,
        columns: Option<&[&str]>,
    ) -> Result<E, AccessorError> {
        self.find(id, columns).await?.ok_or_else(|| {
            AccessorError::NotFound(format!("{} with {} {}", E::table(), E::id_column(), id))
        })
    }

    async fn find_by(
        &self,
        field: &str,
        value: &Value,
        columns: Option<&[&str]>,
    ) -> Result<Option<E>, AccessorError> {
        let (fragment, needs_bind) = Self::eq_fragment(field, value)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} LIMIT 1",
            Self::select_list(columns)?,
            E::table(),
            fragment
        );
        let binds = if needs_bind { vec![value.clone()] } else { Vec::new() };
        self.fetch_optional_entity(&sql, &binds).await
    }

    async fn find_by_with_relations(
        &self,
        field: &str,
        value: &Value,
        columns: Option<&[&str]>,
    ) -> Result<Option<Loaded<E>>, AccessorError> {
        let (fragment, needs_bind) = Self::eq_fragment(field, value)?;
        let sql = format!(
            "SELECT {} FROM {} WHERE {} LIMIT 1",
            Self::relation_select_list(columns)?,
            E::table(),
            fragment
        );
        let binds = if needs_bind { vec![value.clone()] } else { Vec::new() };
        Ok(self.fetch_loaded(&sql, &binds).await?.into_iter().next())
    }

    async fn list_id_and(&self, display: &str) -> Result<Vec<(Value, Value)>, AccessorError> {
        Self::check_column(display)?;
        let sql = format!(
            "SELECT {}, {} FROM {}",
            E::id_column(),
            display,
            E::table()
        );
        let rows = self.fetch_rows(&sql, &[]).await?;
        rows.iter()
            .map(|row| Ok((row_value(row, E::id_column())?, row_value(row, display)?)))
            .collect()
    }

    async fn list_field(&self, field: &str) -> Result<Vec<Value>, AccessorError> {
        Self::check_column(field)?;
        let sql = format!("SELECT {} FROM {}", field, E::table());
        let rows = self.fetch_rows(&sql, &[]).await?;
        rows.iter().map(|row| row_value(row, field)).collect()
    }

    async fn list_fields(
        &self,
        key: &str,
        field: &str,
    ) -> Result<Vec<(Value, Value)>, AccessorError> {
        Self::check_column(key)?;
        Self::check_column(field)?;
        let sql = format!("SELECT {}, {} FROM {}", key, field, E::table());
        let rows = self.fetch_rows(&sql, &[]).await?;
        rows.iter()
            .map(|row| Ok((row_value(row, key)?, row_value(row, field)?)))
            .collect()
    }

    async fn where_in(&self, field: &str, values: &[Value]) -> Result<Vec<E>, AccessorError> {
        Self::check_column(field)?;
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT * FROM {} WHERE {} IN ({})",
            E::table(),
            field,
            placeholders(values.len())
        );
        self.fetch_entities(&sql, values).await
    }

    async fn where_in_with_relations(
        &self,
        field: &str,
        values: &[Value],
    ) -> Result<Vec<Loaded<E>>, AccessorError> {
        Self::check_column(field)?;
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT * FROM {} WHERE {} IN ({})",
            E::table(),
            field,
            placeholders(values.len())
        );
        self.fetch_loaded(&sql, values).await
    }

    async fn random(&self, columns: Option<&[&str]>) -> Result<Option<E>, AccessorError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY RANDOM() LIMIT 1",
            Self::select_list(columns)?,
            E::table()
        );
        self.fetch_optional_entity(&sql, &[]).await
    }

    async fn order_by(
        &self,
        field: Option<&str>,
        order: SortOrder,
    ) -> Result<Vec<Loaded<E>>, AccessorError> {
        let field = field.unwrap_or(DEFAULT_ORDER_COLUMN);
        Self::check_column(field)?;
        let sql = format!(
            "SELECT * FROM {} ORDER BY {} {}",
            E::table(),
            field,
            order.as_sql()
        );
        self.fetch_loaded(&sql, &[]).await
    }
}
