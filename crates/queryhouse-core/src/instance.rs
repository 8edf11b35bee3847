//! Live model instances.
//!
//! An `Instance` pairs a compiled descriptor with a per-field value store,
//! the snapshot of values captured at construction (used for dirty-diffing
//! on save), and one [`FkState`] cell per foreign-key field. The cell is an
//! explicit three-state union — `Unset`, `Raw` key, or a `Resolved` related
//! instance — and moves from `Raw` to `Resolved` only when a read asks for
//! the related row.
//!
//! Instances are plain data: they hold no connection. Persistence and
//! foreign-key resolution go through the session layer, which supplies the
//! database context explicitly.

use crate::error::{Error, Result};
use crate::field::{FieldDef, FieldKind};
use crate::model::ModelDescriptor;
use crate::row::Row;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// The cached state of one foreign-key field.
#[derive(Debug, Clone, PartialEq)]
pub enum FkState {
    /// No reference assigned.
    Unset,
    /// The stored key, not yet dereferenced.
    Raw(i64),
    /// The dereferenced (or directly assigned) related instance.
    Resolved(Box<Instance>),
}

impl FkState {
    /// The value this state contributes to the field's database column.
    ///
    /// A resolved-but-unsaved related instance contributes `NULL` here;
    /// save resolves that by persisting the related instance first.
    #[must_use]
    pub fn column_value(&self) -> Value {
        match self {
            FkState::Unset => Value::Null,
            FkState::Raw(key) => Value::Int(*key),
            FkState::Resolved(instance) => instance.pk().map_or(Value::Null, Value::Int),
        }
    }

    /// The resolved related instance, if this state holds one.
    #[must_use]
    pub fn as_resolved(&self) -> Option<&Instance> {
        match self {
            FkState::Resolved(instance) => Some(instance),
            _ => None,
        }
    }

    /// Whether this state still holds an undereferenced key.
    #[must_use]
    pub fn is_raw(&self) -> bool {
        matches!(self, FkState::Raw(_))
    }
}

/// A live object mapped to one table row (or to a row-to-be).
#[derive(Debug, Clone)]
pub struct Instance {
    descriptor: Arc<ModelDescriptor>,
    pk: Option<i64>,
    values: HashMap<String, Value>,
    fk: HashMap<String, FkState>,
    initial: HashMap<String, Value>,
}

impl Instance {
    /// Construct a logically new instance from keyword-style field values.
    ///
    /// The primary key stays unset until the instance is saved. Unknown
    /// field names fail with [`Error::InvalidField`]; abstract base
    /// descriptors fail with [`Error::AbstractInstantiation`].
    pub fn new(descriptor: &Arc<ModelDescriptor>, pairs: &[(&str, Value)]) -> Result<Self> {
        let mut instance = Self::empty(descriptor)?;
        for (name, value) in pairs {
            if instance.descriptor.field(name).is_none() {
                return Err(Error::InvalidField {
                    model: instance.descriptor.table_name().to_string(),
                    field: (*name).to_string(),
                });
            }
            instance.set(name, value.clone())?;
        }
        instance.mark_clean();
        Ok(instance)
    }

    /// Construct an instance from a database row.
    ///
    /// Position 0 supplies the primary key; the remaining positions are
    /// zipped against the declared fields in order. Foreign-key columns
    /// land as [`FkState::Raw`], pending lazy resolution.
    pub fn from_row(descriptor: &Arc<ModelDescriptor>, row: &Row) -> Result<Self> {
        let mut instance = Self::empty(descriptor)?;
        let table = descriptor.table_name();

        let expected = descriptor.fields().len() + 1;
        if row.len() != expected {
            return Err(Error::RowShape {
                table: table.to_string(),
                detail: format!("expected {expected} columns, got {}", row.len()),
            });
        }

        let pk = row[0].as_int().ok_or_else(|| Error::RowShape {
            table: table.to_string(),
            detail: format!("primary key column holds {}", row[0]),
        })?;

        for (field, value) in descriptor.fields().iter().zip(row.iter().skip(1)) {
            instance
                .set(&field.name, value.clone())
                .map_err(|_| Error::RowShape {
                    table: table.to_string(),
                    detail: format!("column '{}' holds mismatched value {value}", field.name),
                })?;
        }

        instance.pk = Some(pk);
        instance.mark_clean();
        Ok(instance)
    }

    fn empty(descriptor: &Arc<ModelDescriptor>) -> Result<Self> {
        if descriptor.is_abstract() {
            return Err(Error::AbstractInstantiation {
                model: descriptor.table_name().to_string(),
            });
        }

        let mut values = HashMap::new();
        let mut fk = HashMap::new();
        for field in descriptor.fields() {
            match &field.kind {
                FieldKind::ForeignKey { .. } => {
                    fk.insert(field.name.clone(), FkState::Unset);
                }
                FieldKind::Str { .. } | FieldKind::Int => {
                    values.insert(field.name.clone(), Value::Null);
                }
            }
        }

        let mut instance = Self {
            descriptor: Arc::clone(descriptor),
            pk: None,
            values,
            fk,
            initial: HashMap::new(),
        };
        instance.mark_clean();
        Ok(instance)
    }

    /// The compiled descriptor this instance was built from.
    #[must_use]
    pub fn descriptor(&self) -> &Arc<ModelDescriptor> {
        &self.descriptor
    }

    /// The table this instance maps to.
    #[must_use]
    pub fn table_name(&self) -> &str {
        self.descriptor.table_name()
    }

    /// The primary key value, once persisted.
    #[must_use]
    pub fn pk(&self) -> Option<i64> {
        self.pk
    }

    /// Overwrite the primary key. Engine use; hosts never call this.
    pub fn set_pk(&mut self, pk: Option<i64>) {
        self.pk = pk;
    }

    /// Read a field's current column value.
    ///
    /// For foreign-key fields this is the stored key (or `NULL`), never the
    /// related instance; use the session's resolver to dereference.
    pub fn get(&self, field: &str) -> Result<Value> {
        let def = self.field_def(field)?;
        Ok(self.column_value(def))
    }

    /// Assign a field from a scalar value.
    ///
    /// Values are checked against the field's kind; a mismatch fails with
    /// [`Error::InvalidAssignment`]. Assigning an integer (or `NULL`) to a
    /// foreign-key field resets its cache to the raw (or unset) state.
    pub fn set(&mut self, field: &str, value: Value) -> Result<()> {
        let def = self.field_def(field)?.clone();
        match (&def.kind, value) {
            (FieldKind::Str { .. }, v @ (Value::Str(_) | Value::Null)) => {
                self.values.insert(def.name, v);
                Ok(())
            }
            (FieldKind::Int, v @ (Value::Int(_) | Value::Null)) => {
                self.values.insert(def.name, v);
                Ok(())
            }
            (FieldKind::ForeignKey { .. }, Value::Int(key)) => {
                self.fk.insert(def.name, FkState::Raw(key));
                Ok(())
            }
            (FieldKind::ForeignKey { .. }, Value::Null) => {
                self.fk.insert(def.name, FkState::Unset);
                Ok(())
            }
            (_, v) => Err(Error::InvalidAssignment {
                model: self.descriptor.table_name().to_string(),
                field: field.to_string(),
                detail: format!("value {v} does not match the field's declared kind"),
            }),
        }
    }

    /// Assign a foreign-key field from a related instance.
    ///
    /// The instance may be unsaved; save persists it first to obtain its
    /// key. Assigning to a non-foreign-key field, or an instance of the
    /// wrong model, fails with [`Error::InvalidAssignment`].
    pub fn set_related(&mut self, field: &str, related: Instance) -> Result<()> {
        let def = self.field_def(field)?.clone();
        let FieldKind::ForeignKey { target, .. } = &def.kind else {
            return Err(Error::InvalidAssignment {
                model: self.descriptor.table_name().to_string(),
                field: field.to_string(),
                detail: "not a foreign-key field".to_string(),
            });
        };
        if related.table_name() != target.as_str() {
            return Err(Error::InvalidAssignment {
                model: self.descriptor.table_name().to_string(),
                field: field.to_string(),
                detail: format!(
                    "expected a '{target}' instance, got '{}'",
                    related.table_name()
                ),
            });
        }
        self.fk.insert(def.name, FkState::Resolved(Box::new(related)));
        Ok(())
    }

    /// The cache state of a foreign-key field.
    pub fn fk_state(&self, field: &str) -> Result<&FkState> {
        self.field_def(field)?;
        self.fk.get(field).ok_or_else(|| Error::InvalidAssignment {
            model: self.descriptor.table_name().to_string(),
            field: field.to_string(),
            detail: "not a foreign-key field".to_string(),
        })
    }

    /// Mutable access to a foreign-key cache cell. Engine use.
    pub fn fk_state_mut(&mut self, field: &str) -> Result<&mut FkState> {
        self.field_def(field)?;
        let table = self.descriptor.table_name().to_string();
        self.fk.get_mut(field).ok_or_else(|| Error::InvalidAssignment {
            model: table,
            field: field.to_string(),
            detail: "not a foreign-key field".to_string(),
        })
    }

    /// The fields whose current column value differs from the snapshot
    /// captured at construction or last save, as `(column, value)` pairs in
    /// declaration order.
    #[must_use]
    pub fn dirty(&self) -> Vec<(String, Value)> {
        self.descriptor
            .fields()
            .iter()
            .filter_map(|field| {
                let current = self.column_value(field);
                if self.initial.get(&field.name) == Some(&current) {
                    None
                } else {
                    let column = self
                        .descriptor
                        .column_for(&field.name)
                        .unwrap_or(&field.name);
                    Some((column.to_string(), current))
                }
            })
            .collect()
    }

    /// Every field's `(column, value)` pair in declaration order, as
    /// rendered into an insert.
    #[must_use]
    pub fn all_columns(&self) -> Vec<(String, Value)> {
        self.descriptor
            .fields()
            .iter()
            .map(|field| {
                let column = self
                    .descriptor
                    .column_for(&field.name)
                    .unwrap_or(&field.name);
                (column.to_string(), self.column_value(field))
            })
            .collect()
    }

    /// Re-capture the dirty-diff snapshot from the current values.
    pub fn mark_clean(&mut self) {
        self.initial = self
            .descriptor
            .fields()
            .iter()
            .map(|field| (field.name.clone(), self.column_value(field)))
            .collect();
    }

    fn column_value(&self, field: &FieldDef) -> Value {
        match &field.kind {
            FieldKind::ForeignKey { .. } => self
                .fk
                .get(&field.name)
                .map_or(Value::Null, FkState::column_value),
            FieldKind::Str { .. } | FieldKind::Int => {
                self.values.get(&field.name).cloned().unwrap_or(Value::Null)
            }
        }
    }

    fn field_def(&self, field: &str) -> Result<&FieldDef> {
        self.descriptor.field(field).ok_or_else(|| Error::InvalidField {
            model: self.descriptor.table_name().to_string(),
            field: field.to_string(),
        })
    }
}

impl PartialEq for Instance {
    /// Two instances are equal when they map to the same table, carry the
    /// same primary key, and their column values agree.
    fn eq(&self, other: &Self) -> bool {
        self.table_name() == other.table_name()
            && self.pk == other.pk
            && self.all_columns() == other.all_columns()
    }
}
