//! SQL fragments with bound parameters.
//!
//! Placeholders are numbered (`?1`, `?2`, ...) in the order parameters are
//! added, so a statement must be assembled from a single [`SqlFragment`] for
//! the numbering to line up.

use rusqlite::ToSql;
use rusqlite::types::ToSqlOutput;

/// A fragment of SQL with bound parameters.
#[derive(Debug, Clone, Default)]
pub struct SqlFragment {
    /// The SQL clause.
    pub sql: String,
    /// Bound parameter values.
    pub params: Vec<SqlParam>,
}

/// A bound SQL parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    /// String parameter.
    String(String),
    /// Integer parameter.
    Integer(i64),
    /// Float parameter.
    Float(f64),
    /// Null parameter.
    Null,
}

impl SqlParam {
    /// Creates a string parameter.
    pub fn string(s: impl Into<String>) -> Self {
        SqlParam::String(s.into())
    }

    /// Creates an integer parameter.
    pub fn integer(i: i64) -> Self {
        SqlParam::Integer(i)
    }

    /// Creates a boolean parameter, stored as 0/1.
    pub fn boolean(b: bool) -> Self {
        SqlParam::Integer(i64::from(b))
    }

    /// Creates a parameter from an optional string.
    pub fn optional(s: Option<impl Into<String>>) -> Self {
        s.map_or(SqlParam::Null, SqlParam::string)
    }
}

impl ToSql for SqlParam {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlParam::String(s) => ToSqlOutput::from(s.as_str()),
            SqlParam::Integer(i) => ToSqlOutput::from(*i),
            SqlParam::Float(f) => ToSqlOutput::from(*f),
            SqlParam::Null => ToSqlOutput::from(rusqlite::types::Null),
        })
    }
}

impl SqlFragment {
    /// Creates a new SQL fragment.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Adds a parameter placeholder and returns the placeholder string.
    pub fn add_param(&mut self, param: SqlParam) -> String {
        self.params.push(param);
        format!("?{}", self.params.len())
    }

    /// Adds one placeholder per value and returns them as an `IN` list body.
    pub fn add_param_list<I>(&mut self, values: I) -> String
    where
        I: IntoIterator<Item = SqlParam>,
    {
        values
            .into_iter()
            .map(|v| self.add_param(v))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Appends raw SQL.
    pub fn push_sql(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Returns true if this fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Returns the bound parameters in placeholder order.
    pub fn bind(&self) -> rusqlite::ParamsFromIter<std::slice::Iter<'_, SqlParam>> {
        rusqlite::params_from_iter(self.params.iter())
    }
}
