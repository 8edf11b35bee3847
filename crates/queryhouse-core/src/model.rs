//! Model declaration and compilation.
//!
//! Building a model is an explicit two-phase affair. A [`ModelDecl`]
//! collects plain field definitions; [`ModelDecl::compile`] validates them
//! and produces an immutable [`ModelDescriptor`], deriving the primary-key
//! column name and one [`FkAccessor`] per foreign-key field. All of this
//! happens before any database interaction: migration and resolution both
//! depend on the field classification being settled at declaration time.

use crate::error::{Error, Result};
use crate::field::{FieldDef, FieldKind};
use std::sync::Arc;

/// A model declaration under construction.
///
/// # Example
///
/// ```
/// use queryhouse_core::ModelDecl;
///
/// let group = ModelDecl::new("Group").string_field("name", 64).compile().unwrap();
/// let user = ModelDecl::new("User")
///     .string_field("name", 64)
///     .int_field("age")
///     .foreign_key("group", "Group")
///     .compile()
///     .unwrap();
///
/// assert_eq!(user.pk_column(), "UserID");
/// assert_eq!(user.fk_accessors()[0].column, "GroupID");
/// # let _ = group;
/// ```
#[derive(Debug, Clone)]
pub struct ModelDecl {
    name: String,
    fields: Vec<FieldDef>,
    abstract_base: bool,
}

impl ModelDecl {
    /// Start declaring a model mapped to the table `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            abstract_base: false,
        }
    }

    /// Start declaring an abstract base template.
    ///
    /// Abstract declarations compile, so they can serve as field templates,
    /// but instantiating or registering them fails with
    /// [`Error::AbstractInstantiation`].
    pub fn abstract_base(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            abstract_base: true,
        }
    }

    /// Declare a bounded-string field.
    #[must_use]
    pub fn string_field(mut self, name: impl Into<String>, length: u32) -> Self {
        self.fields
            .push(FieldDef::new(name, FieldKind::Str { length }));
        self
    }

    /// Declare an integer field.
    #[must_use]
    pub fn int_field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldDef::new(name, FieldKind::Int));
        self
    }

    /// Declare a foreign-key field referencing `target`'s table.
    ///
    /// The wiring to the target model is recorded here, at declaration
    /// time; migration renders it as a `FOREIGN KEY` constraint and the
    /// resolver uses it to dereference stored ids.
    #[must_use]
    pub fn foreign_key(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        self.fields.push(FieldDef::new(
            name,
            FieldKind::ForeignKey {
                target: target.into(),
                nullable: false,
            },
        ));
        self
    }

    /// Declare a nullable foreign-key field referencing `target`'s table.
    #[must_use]
    pub fn nullable_foreign_key(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.fields.push(FieldDef::new(
            name,
            FieldKind::ForeignKey {
                target: target.into(),
                nullable: true,
            },
        ));
        self
    }

    /// Append an already-built field definition.
    #[must_use]
    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate the declaration and produce the compiled descriptor.
    pub fn compile(self) -> Result<Arc<ModelDescriptor>> {
        if self.name.is_empty() {
            return Err(Error::InvalidField {
                model: String::new(),
                field: String::new(),
            });
        }

        let pk_column = format!("{}ID", self.name);

        for (i, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() || field.name.starts_with('_') {
                return Err(Error::InvalidField {
                    model: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            if field.name == pk_column || field.name == "pk" {
                // The identity column is auto-generated, never user-declared.
                return Err(Error::InvalidField {
                    model: self.name.clone(),
                    field: field.name.clone(),
                });
            }
            if self.fields[..i].iter().any(|f| f.name == field.name) {
                return Err(Error::InvalidField {
                    model: self.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        let mut fk_accessors = Vec::new();
        for field in &self.fields {
            if let FieldKind::ForeignKey { target, nullable } = &field.kind {
                let column = format!("{target}ID");
                // The reference column is named after the target's primary
                // key, so a model can hold at most one reference per target.
                if fk_accessors.iter().any(|a: &FkAccessor| a.column == column) {
                    return Err(Error::InvalidAssignment {
                        model: self.name.clone(),
                        field: field.name.clone(),
                        detail: format!("a second reference to '{target}' would reuse column '{column}'"),
                    });
                }
                fk_accessors.push(FkAccessor {
                    field: field.name.clone(),
                    column,
                    target: target.clone(),
                    nullable: *nullable,
                });
            }
        }

        Ok(Arc::new(ModelDescriptor {
            table_name: self.name,
            pk_column,
            abstract_base: self.abstract_base,
            fields: self.fields,
            fk_accessors,
        }))
    }
}

/// A compiled accessor for one foreign-key field.
///
/// Generated by [`ModelDecl::compile`]; the resolver and the migration
/// engine both read these instead of re-deriving the wiring at call time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FkAccessor {
    /// The declared field name.
    pub field: String,
    /// The column the reference occupies in the owning table, named after
    /// the target's primary-key column.
    pub column: String,
    /// The referenced table.
    pub target: String,
    /// Whether the reference may be absent.
    pub nullable: bool,
}

/// The compiled, immutable description of one model.
#[derive(Debug, PartialEq, Eq)]
pub struct ModelDescriptor {
    table_name: String,
    pk_column: String,
    abstract_base: bool,
    fields: Vec<FieldDef>,
    fk_accessors: Vec<FkAccessor>,
}

impl ModelDescriptor {
    /// The table this model maps to.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// The auto-generated identity column, `<Table>ID`.
    #[must_use]
    pub fn pk_column(&self) -> &str {
        &self.pk_column
    }

    /// Whether this descriptor is an abstract base template.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.abstract_base
    }

    /// The user-declared fields, in declaration order.
    ///
    /// The identity column is not part of this list; it is owned by the
    /// engine, not declared by the user.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Look up a declared field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The compiled foreign-key accessors, in declaration order.
    #[must_use]
    pub fn fk_accessors(&self) -> &[FkAccessor] {
        &self.fk_accessors
    }

    /// Look up the accessor for a foreign-key field.
    #[must_use]
    pub fn fk_accessor(&self, field: &str) -> Option<&FkAccessor> {
        self.fk_accessors.iter().find(|a| a.field == field)
    }

    /// The database column a declared field occupies.
    ///
    /// Scalar fields map to a column of the same name; foreign-key fields
    /// map to their reference column.
    #[must_use]
    pub fn column_for(&self, field: &str) -> Option<&str> {
        let def = self.field(field)?;
        match &def.kind {
            FieldKind::ForeignKey { .. } => self.fk_accessor(field).map(|a| a.column.as_str()),
            FieldKind::Str { .. } | FieldKind::Int => Some(def.name.as_str()),
        }
    }

    /// Map a filter-criteria key to its column.
    ///
    /// Accepts declared field names plus `pk` (or the literal identity
    /// column name) for primary-key lookups.
    #[must_use]
    pub fn column_for_criteria(&self, key: &str) -> Option<&str> {
        if key == "pk" || key == self.pk_column {
            Some(&self.pk_column)
        } else {
            self.column_for(key)
        }
    }
}
