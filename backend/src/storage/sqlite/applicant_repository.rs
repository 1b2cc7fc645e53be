use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite};

use crate::domain::models::{Applicant, ApplicantPredicate};
use crate::storage::error::{StorageError, StorageResult};
use crate::storage::predicate::{Field, Predicate, Value};
use crate::storage::sqlite::unit_of_work::SharedContext;
use crate::storage::traits::Repository;

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, family_name, address, country_of_origin, email_address, age, hired
    FROM applicants
"#;

/// Repository for applicant operations, bound to one unit of work
pub struct SqliteApplicantRepository {
    pool: SqlitePool,
    context: SharedContext,
}

impl SqliteApplicantRepository {
    pub(crate) fn new(pool: SqlitePool, context: SharedContext) -> Self {
        Self { pool, context }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run a query through the open transaction when there is one, else the pool.
    async fn fetch_rows(&self, mut builder: QueryBuilder<'_, Sqlite>) -> StorageResult<Vec<Applicant>> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        let query = builder.build();
        let rows = match ctx.reader() {
            Some(conn) => query.fetch_all(conn).await?,
            None => query.fetch_all(&self.pool).await?,
        };

        rows.iter()
            .map(applicant_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StorageError::from)
    }
}

fn applicant_from_row(row: &SqliteRow) -> Result<Applicant, sqlx::Error> {
    Ok(Applicant {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        family_name: row.try_get("family_name")?,
        address: row.try_get("address")?,
        country_of_origin: row.try_get("country_of_origin")?,
        email_address: row.try_get("email_address")?,
        age: row.try_get("age")?,
        hired: row.try_get("hired")?,
    })
}

/// Append the predicate as SQL; every value is bound, never interpolated.
fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>, predicate: &ApplicantPredicate) {
    match predicate {
        Predicate::Always => {
            builder.push("1");
        }
        Predicate::Compare { field, op, value } => {
            builder.push(field.column()).push(" ").push(op.sql()).push(" ");
            push_value(builder, value);
        }
        Predicate::Contains { field, needle } => {
            builder.push("instr(").push(field.column()).push(", ");
            builder.push_bind(needle.clone());
            builder.push(") > 0");
        }
        Predicate::IsNull(field) => {
            builder.push(field.column()).push(" IS NULL");
        }
        Predicate::And(left, right) => {
            builder.push("(");
            push_predicate(builder, left);
            builder.push(" AND ");
            push_predicate(builder, right);
            builder.push(")");
        }
        Predicate::Or(left, right) => {
            builder.push("(");
            push_predicate(builder, left);
            builder.push(" OR ");
            push_predicate(builder, right);
            builder.push(")");
        }
        Predicate::Not(inner) => {
            builder.push("NOT (");
            push_predicate(builder, inner);
            builder.push(")");
        }
    }
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Null => {
            builder.push("NULL");
        }
        Value::Integer(n) => {
            builder.push_bind(*n);
        }
        Value::Text(text) => {
            builder.push_bind(text.clone());
        }
        Value::Bool(flag) => {
            builder.push_bind(*flag);
        }
    }
}

#[async_trait]
impl Repository<Applicant, ApplicantPredicate> for SqliteApplicantRepository {
    async fn get_all(&self) -> StorageResult<Vec<Applicant>> {
        let mut builder = QueryBuilder::new(SELECT_COLUMNS);
        builder.push(" ORDER BY id ASC");
        self.fetch_rows(builder).await
    }

    async fn get_by_id(&self, id: i64) -> StorageResult<Option<Applicant>> {
        let mut builder = QueryBuilder::new(SELECT_COLUMNS);
        builder.push(" WHERE id = ").push_bind(id);
        Ok(self.fetch_rows(builder).await?.into_iter().next())
    }

    async fn exists(&self, id: i64) -> StorageResult<bool> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        let query = sqlx::query("SELECT 1 FROM applicants WHERE id = ? LIMIT 1").bind(id);
        let row = match ctx.reader() {
            Some(conn) => query.fetch_optional(conn).await?,
            None => query.fetch_optional(&self.pool).await?,
        };
        Ok(row.is_some())
    }

    async fn add(&self, entity: &Applicant) -> StorageResult<Applicant> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        if let Err(err) = entity.validate() {
            let err = StorageError::from(err);
            ctx.record_failure(&err);
            return Err(err);
        }

        let conn = ctx.writer(&self.pool).await?;
        let result = sqlx::query(
            r#"
            INSERT INTO applicants (name, family_name, address, country_of_origin, email_address, age, hired)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entity.name)
        .bind(&entity.family_name)
        .bind(&entity.address)
        .bind(&entity.country_of_origin)
        .bind(&entity.email_address)
        .bind(entity.age)
        .bind(entity.hired)
        .execute(conn)
        .await;

        match result {
            Ok(done) => {
                ctx.record_write(done.rows_affected());
                Ok(Applicant {
                    id: done.last_insert_rowid(),
                    ..entity.clone()
                })
            }
            Err(err) => {
                let err = StorageError::from(err);
                ctx.record_failure(&err);
                Err(err)
            }
        }
    }

    async fn update(&self, entity: &Applicant) -> StorageResult<Applicant> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        if let Err(err) = entity.validate() {
            let err = StorageError::from(err);
            ctx.record_failure(&err);
            return Err(err);
        }

        let conn = ctx.writer(&self.pool).await?;
        let result = sqlx::query(
            r#"
            UPDATE applicants
            SET name = ?, family_name = ?, address = ?, country_of_origin = ?,
                email_address = ?, age = ?, hired = ?
            WHERE id = ?
            "#,
        )
        .bind(&entity.name)
        .bind(&entity.family_name)
        .bind(&entity.address)
        .bind(&entity.country_of_origin)
        .bind(&entity.email_address)
        .bind(entity.age)
        .bind(entity.hired)
        .bind(entity.id)
        .execute(conn)
        .await;

        let err = match result {
            Ok(done) if done.rows_affected() > 0 => {
                ctx.record_write(done.rows_affected());
                return Ok(entity.clone());
            }
            Ok(_) => StorageError::MissingRow(entity.id),
            Err(err) => StorageError::from(err),
        };
        ctx.record_failure(&err);
        Err(err)
    }

    async fn delete(&self, id: i64) -> StorageResult<bool> {
        let mut ctx = self.context.lock().await;
        ctx.ensure_open()?;

        let conn = ctx.writer(&self.pool).await?;
        let result = sqlx::query("DELETE FROM applicants WHERE id = ?")
            .bind(id)
            .execute(conn)
            .await;

        match result {
            Ok(done) => {
                ctx.record_write(done.rows_affected());
                Ok(done.rows_affected() > 0)
            }
            Err(err) => {
                let err = StorageError::from(err);
                ctx.record_failure(&err);
                Err(err)
            }
        }
    }

    async fn find(&self, predicate: ApplicantPredicate) -> StorageResult<Vec<Applicant>> {
        let mut builder = QueryBuilder::new(SELECT_COLUMNS);
        builder.push(" WHERE ");
        push_predicate(&mut builder, &predicate);
        builder.push(" ORDER BY id ASC");
        self.fetch_rows(builder).await
    }
}
