//! Lazily-evaluated query sets.
//!
//! A `QuerySet` is a transient, re-evaluatable cursor descriptor: a model,
//! an optional filter, and a cached result. It executes at most once per
//! distinct filter state; iteration, length, and indexing all serve from
//! the cache once it exists. Results are always buffered fully before any
//! instance is handed out — the shared connection cannot interleave nested
//! reads, so there is deliberately no streaming path.

use crate::criteria::Criteria;
use queryhouse_core::{DbHandle, Error, Instance, ModelDescriptor, Result};
use std::sync::Arc;

/// A cacheable handle to the set of rows matching some criteria.
#[derive(Debug)]
pub struct QuerySet {
    handle: DbHandle,
    database: String,
    model: Arc<ModelDescriptor>,
    criteria: Option<Criteria>,
    result: Option<Vec<Instance>>,
}

impl QuerySet {
    /// Create an unevaluated query set over a model's whole table.
    pub fn new(handle: DbHandle, database: impl Into<String>, model: Arc<ModelDescriptor>) -> Self {
        Self {
            handle,
            database: database.into(),
            model,
            criteria: None,
            result: None,
        }
    }

    /// The model this query set ranges over.
    #[must_use]
    pub fn model(&self) -> &Arc<ModelDescriptor> {
        &self.model
    }

    /// Apply criteria and execute immediately, replacing any cached result.
    pub fn filter(mut self, criteria: Criteria) -> Result<Self> {
        if criteria.is_empty() {
            return Err(Error::InvalidCriteria {
                table: self.model.table_name().to_string(),
                detail: "no conditions specified".to_string(),
            });
        }
        let rows = self.run(Some(&criteria))?;
        self.result = Some(rows);
        self.criteria = Some(criteria);
        Ok(self)
    }

    /// Fetch the single instance matching `criteria`.
    ///
    /// Exactly one row must match: zero rows fail with [`Error::NotFound`],
    /// two or more with [`Error::MultipleResultsFound`]. Both are
    /// programming or data errors; callers are expected to catch them, not
    /// retry.
    pub fn get(&mut self, criteria: Criteria) -> Result<Instance> {
        if criteria.is_empty() {
            return Err(Error::InvalidCriteria {
                table: self.model.table_name().to_string(),
                detail: "no conditions specified for get".to_string(),
            });
        }

        let rendered = criteria.render(&self.model)?;
        let buffer = self.run(Some(&criteria))?;

        let instance = match buffer.len() {
            0 => {
                return Err(Error::NotFound {
                    table: self.model.table_name().to_string(),
                    criteria: rendered,
                });
            }
            1 => buffer[0].clone(),
            count => {
                return Err(Error::MultipleResultsFound {
                    table: self.model.table_name().to_string(),
                    criteria: rendered,
                    count,
                });
            }
        };

        self.result = Some(buffer);
        self.criteria = Some(criteria);
        Ok(instance)
    }

    /// Execute the unconditional full-table query, replacing the cache and
    /// discarding any applied filter.
    pub fn evaluate(&mut self) -> Result<&mut Self> {
        let rows = self.run(None)?;
        self.result = Some(rows);
        self.criteria = None;
        Ok(self)
    }

    /// The buffered results, evaluating first if nothing is cached yet.
    pub fn results(&mut self) -> Result<&[Instance]> {
        if self.result.is_none() {
            self.evaluate()?;
        }
        Ok(self.result.as_deref().unwrap_or_default())
    }

    /// Iterate the buffered results, evaluating at most once.
    pub fn iter(&mut self) -> Result<std::slice::Iter<'_, Instance>> {
        Ok(self.results()?.iter())
    }

    /// Number of matching rows, evaluating at most once.
    pub fn len(&mut self) -> Result<usize> {
        Ok(self.results()?.len())
    }

    /// Whether no rows match, evaluating at most once.
    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.results()?.is_empty())
    }

    /// The instance at `index`, evaluating at most once.
    pub fn at(&mut self, index: usize) -> Result<Option<&Instance>> {
        Ok(self.results()?.get(index))
    }

    fn run(&self, criteria: Option<&Criteria>) -> Result<Vec<Instance>> {
        let mut sql = format!(
            "SELECT * FROM {}.{}",
            self.database,
            self.model.table_name()
        );
        if let Some(criteria) = criteria {
            sql.push_str(" WHERE ");
            sql.push_str(&criteria.render(&self.model)?);
        }

        tracing::debug!(table = self.model.table_name(), sql = %sql, "evaluating query set");
        let rows = self.handle.query(&sql)?;

        let mut instances = Vec::with_capacity(rows.len());
        for row in &rows {
            instances.push(Instance::from_row(&self.model, row)?);
        }
        Ok(instances)
    }
}
