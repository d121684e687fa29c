//! The shared row-indexed table behind all dashboard views.
//!
//! A store is created once per data source and replaced wholesale when the
//! source changes (e.g. the user picks another city). Filtering hides rows,
//! it never removes or renumbers them; the only mutation after load is
//! adding derived columns, which must finish before any view attaches.

use crate::error::{EngineError, Result};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Stable row identifier, unique within one store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scalar cell value. Missing is explicit so predicates stay total over
/// every row.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Num(f64),
    Missing,
}

static MISSING: Value = Value::Missing;

impl Value {
    pub fn text(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Num(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// One record: a stable id plus named scalar cells.
#[derive(Debug, Clone)]
pub struct Row {
    id: RowId,
    cells: HashMap<String, Value>,
}

impl Row {
    pub fn new(id: RowId) -> Self {
        Self {
            id,
            cells: HashMap::new(),
        }
    }

    /// Builder-style cell insertion, used by loaders and tests.
    pub fn with_cell(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.cells.insert(column.to_string(), value.into());
        self
    }

    pub fn id(&self) -> RowId {
        self.id
    }

    /// Cell lookup; absent columns read as missing.
    pub fn get(&self, column: &str) -> &Value {
        self.cells.get(column).unwrap_or(&MISSING)
    }

    pub fn num(&self, column: &str) -> Option<f64> {
        self.get(column).num()
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).text()
    }

    pub(crate) fn set(&mut self, column: &str, value: Value) {
        self.cells.insert(column.to_string(), value);
    }
}

/// Owns the full row collection for one dataset instance.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    rows: Vec<Row>,
    columns: BTreeSet<String>,
    index: HashMap<RowId, usize>,
}

impl RowStore {
    /// Builds a store from loaded rows. The registered column set is the
    /// union of all cell names; cells a row lacks are normalized to
    /// explicit missing values so every row covers every column.
    pub fn load(rows: Vec<Row>) -> Result<Self> {
        let mut columns = BTreeSet::new();
        let mut index = HashMap::with_capacity(rows.len());

        for (pos, row) in rows.iter().enumerate() {
            if index.insert(row.id, pos).is_some() {
                return Err(EngineError::DuplicateRowId(row.id.0));
            }
            columns.extend(row.cells.keys().cloned());
        }

        let mut rows = rows;
        for row in &mut rows {
            for column in &columns {
                row.cells
                    .entry(column.clone())
                    .or_insert(Value::Missing);
            }
        }

        Ok(Self {
            rows,
            columns,
            index,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.index.get(&id).map(|&pos| &self.rows[pos])
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// One column's values, aligned to row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        if !self.columns.contains(name) {
            return Err(EngineError::UnknownColumn(name.to_string()));
        }
        Ok(self.rows.iter().map(|row| row.get(name)).collect())
    }

    /// Computes `f` for every row and stores the results under `name`.
    /// A failure on any row aborts the whole add: no values are committed,
    /// since a partially derived column is worse than none.
    pub fn add_derived_column<F>(&mut self, name: &str, f: F) -> Result<()>
    where
        F: Fn(&Row) -> Result<Value>,
    {
        if self.columns.contains(name) {
            return Err(EngineError::DuplicateColumn(name.to_string()));
        }

        let mut computed = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let value = f(row).map_err(|e| EngineError::ColumnComputation {
                column: name.to_string(),
                row: row.id.0,
                source: Box::new(e),
            })?;
            computed.push(value);
        }

        for (row, value) in self.rows.iter_mut().zip(computed) {
            row.set(name, value);
        }
        self.columns.insert(name.to_string());
        Ok(())
    }

    /// Boolean vector aligned to row order.
    pub fn mask<F>(&self, predicate: F) -> Vec<bool>
    where
        F: Fn(&Row) -> bool,
    {
        self.rows.iter().map(predicate).collect()
    }
}
