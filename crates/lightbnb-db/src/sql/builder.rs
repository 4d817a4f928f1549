use crate::client::GenericClient;
use crate::error::{DbError, DbResult};
use crate::row::FromRow;
use std::fmt;
use std::fmt::Write as _;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe dynamic SQL builder.
///
/// `Sql` stores SQL pieces and parameters separately. Placeholders are only
/// numbered when the statement is rendered, so `$n` always matches the n-th
/// bound value no matter how the fragments were composed.
#[must_use]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<Box<dyn ToSql + Sync + Send>>,
    tag: Option<String>,
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        Self {
            parts: vec![SqlPart::Raw(initial_sql.into())],
            params: Vec::new(),
            tag: None,
        }
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag used in log events for this statement.
    pub fn tag(&mut self, tag: impl Into<String>) -> &mut Self {
        self.tag = Some(tag.into());
        self
    }

    /// Consuming counterpart of [`Sql::tag`].
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// The tag set with [`Sql::tag`], if any.
    pub fn tag_name(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind<T>(&mut self, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.parts.push(SqlPart::Param);
        self.params.push(Box::new(value));
        self
    }

    /// Consuming counterpart of [`Sql::push_bind`].
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.push_bind(value);
        self
    }

    /// Append another `Sql` fragment, consuming it.
    pub fn push_sql(&mut self, mut other: Sql) -> &mut Self {
        for part in other.parts.drain(..) {
            match part {
                SqlPart::Raw(s) => {
                    self.push(&s);
                }
                SqlPart::Param => self.parts.push(SqlPart::Param),
            }
        }
        self.params.append(&mut other.params);
        if self.tag.is_none() {
            self.tag = other.tag;
        }
        self
    }

    /// Append `LIMIT $n` with a bound parameter.
    pub fn limit(&mut self, n: i64) -> &mut Self {
        self.push(" LIMIT ").push_bind(n)
    }

    /// Number of bound parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx = 0usize;
        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    let _ = write!(out, "${idx}");
                }
            }
        }
        out
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn validate(&self) -> DbResult<()> {
        let placeholder_count = self
            .parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count();

        if placeholder_count != self.params.len() {
            let params_len = self.params.len();
            return Err(DbError::validation(format!(
                "Sql: placeholders({placeholder_count}) != params({params_len})"
            )));
        }
        Ok(())
    }

    fn tag_or_default(&self) -> &str {
        self.tag.as_deref().unwrap_or("sql")
    }

    /// Execute the built SQL and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> DbResult<Vec<Row>> {
        self.validate()?;
        let sql = self.to_sql();
        conn.query_tagged(self.tag_or_default(), &sql, &self.params_ref())
            .await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return the **first** row mapped to `T`.
    ///
    /// Returns [`DbError::NotFound`] when the statement yields no rows.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<T> {
        self.validate()?;
        let sql = self.to_sql();
        let row = conn
            .query_one_tagged(self.tag_or_default(), &sql, &self.params_ref())
            .await?;
        T::from_row(&row)
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> DbResult<Option<T>> {
        self.validate()?;
        let sql = self.to_sql();
        let row = conn
            .query_opt_tagged(self.tag_or_default(), &sql, &self.params_ref())
            .await?;
        row.as_ref().map(T::from_row).transpose()
    }
}

impl fmt::Debug for Sql {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sql")
            .field("sql", &self.to_sql())
            .field("params", &self.params)
            .field("tag", &self.tag)
            .finish()
    }
}
