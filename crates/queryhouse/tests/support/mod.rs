//! An in-memory stand-in for the MySQL server the engine talks to.
//!
//! `FakeServer` implements the `Connection` capability by parsing exactly
//! the statement shapes QueryHouse emits — DDL with foreign-key checks
//! (including MySQL error 1824 when a referenced table is missing, which
//! drives the migration retry loop), the three introspection queries, and
//! row-level DML with auto-assigned primary keys. A `ServerSpy` shares the
//! server's state so tests can count queries and inspect issued SQL after
//! the server has been moved into a `DbHandle`.

// Each test binary uses a subset of these helpers.
#![allow(dead_code)]

use queryhouse::{Connection, DbHandle, Error, MigrationReport, ModelDecl, Orm, Registry, Result, Row, Value};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

/// The registry most tests run against: a `Group` and a `User` referencing
/// it.
pub fn standard_registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(
            &ModelDecl::new("Group")
                .string_field("name", 64)
                .compile()
                .expect("compile Group"),
        )
        .expect("register Group");
    registry
        .register(
            &ModelDecl::new("User")
                .string_field("name", 64)
                .int_field("age")
                .foreign_key("group", "Group")
                .compile()
                .expect("compile User"),
        )
        .expect("register User");
    registry
}

/// A fully initialized context over a fresh fake server.
pub fn initialized_orm() -> (Orm, MigrationReport, ServerSpy) {
    let server = FakeServer::new();
    let spy = server.spy();
    let (orm, report) = Orm::initialize(DbHandle::new(server), "testdb", standard_registry())
        .expect("initialize orm");
    (orm, report, spy)
}

#[derive(Debug, Clone)]
struct Column {
    name: String,
    type_str: String,
    auto_increment: bool,
}

#[derive(Debug, Clone)]
struct ForeignKey {
    column: String,
    ref_table: String,
    ref_column: String,
}

#[derive(Debug, Clone)]
struct Table {
    name: String,
    columns: Vec<Column>,
    pk: String,
    foreign_keys: Vec<ForeignKey>,
    rows: Vec<Vec<Value>>,
    next_id: i64,
}

#[derive(Debug, Default)]
struct State {
    database: Option<String>,
    created_databases: HashSet<String>,
    tables: Vec<Table>,
    statements: Vec<String>,
    commits: usize,
    flushes: usize,
}

impl State {
    fn table(&self, name: &str) -> Result<&Table> {
        let bare = name.rsplit('.').next().unwrap_or(name);
        self.tables
            .iter()
            .find(|t| t.name == bare)
            .ok_or_else(|| Error::database(1146, format!("Table '{name}' doesn't exist")))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut Table> {
        let bare = name.rsplit('.').next().unwrap_or(name).to_string();
        self.tables
            .iter_mut()
            .find(|t| t.name == bare)
            .ok_or_else(|| Error::database(1146, format!("Table '{bare}' doesn't exist")))
    }
}

/// The fake database server.
pub struct FakeServer {
    state: Arc<Mutex<State>>,
}

/// A shared view of the server's state for assertions.
#[derive(Clone)]
pub struct ServerSpy {
    state: Arc<Mutex<State>>,
}

impl Default for FakeServer {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeServer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn spy(&self) -> ServerSpy {
        ServerSpy {
            state: self.state.clone(),
        }
    }
}

impl ServerSpy {
    /// Every statement the engine issued, in order.
    pub fn statements(&self) -> Vec<String> {
        self.state.lock().unwrap().statements.clone()
    }

    /// Statements starting with `SELECT`.
    pub fn selects(&self) -> Vec<String> {
        self.statements()
            .into_iter()
            .filter(|s| s.starts_with("SELECT"))
            .collect()
    }

    pub fn commits(&self) -> usize {
        self.state.lock().unwrap().commits
    }

    pub fn flushes(&self) -> usize {
        self.state.lock().unwrap().flushes
    }

    /// Forget recorded statements (row data is kept).
    pub fn clear_log(&self) {
        self.state.lock().unwrap().statements.clear();
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .table(table)
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }
}

impl Connection for FakeServer {
    fn execute(&mut self, sql: &str) -> Result<u64> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());

        if let Some(db) = sql.strip_prefix("CREATE DATABASE IF NOT EXISTS ") {
            state.created_databases.insert(db.trim().to_string());
            return Ok(1);
        }
        if let Some(db) = sql.strip_prefix("USE ") {
            let db = db.trim().to_string();
            if !state.created_databases.contains(&db) {
                return Err(Error::database(1049, format!("Unknown database '{db}'")));
            }
            state.database = Some(db);
            return Ok(0);
        }
        if let Some(rest) = sql.strip_prefix("CREATE TABLE ") {
            return create_table(&mut state, rest);
        }
        if let Some(rest) = sql.strip_prefix("INSERT INTO ") {
            return insert(&mut state, rest);
        }
        if let Some(rest) = sql.strip_prefix("UPDATE ") {
            return update(&mut state, rest);
        }
        if let Some(rest) = sql.strip_prefix("DELETE FROM ") {
            return delete(&mut state, rest);
        }
        Err(Error::database(1064, format!("unparsed statement: {sql}")))
    }

    fn query(&mut self, sql: &str) -> Result<Vec<Row>> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(sql.to_string());

        if sql == "SHOW FULL TABLES WHERE Table_type = 'BASE TABLE'" {
            return Ok(state
                .tables
                .iter()
                .map(|t| Row::new(vec![Value::Str(t.name.clone()), Value::from("BASE TABLE")]))
                .collect());
        }
        if let Some(rest) = sql.strip_prefix("SHOW COLUMNS FROM ") {
            return show_columns(&state, rest.trim());
        }
        if sql.contains("INFORMATION_SCHEMA.KEY_COLUMN_USAGE") {
            return key_column_usage(&state, sql);
        }
        if let Some(rest) = sql.strip_prefix("SELECT MAX(") {
            return select_max(&state, rest);
        }
        if let Some(rest) = sql.strip_prefix("SELECT * FROM ") {
            return select_all(&state, rest);
        }
        Err(Error::database(1064, format!("unparsed query: {sql}")))
    }

    fn commit(&mut self) -> Result<()> {
        self.state.lock().unwrap().commits += 1;
        Ok(())
    }

    fn consume_results(&mut self) -> Result<()> {
        self.state.lock().unwrap().flushes += 1;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Statement handlers
// ---------------------------------------------------------------------------

fn create_table(state: &mut State, rest: &str) -> Result<u64> {
    let (name, body) = rest
        .split_once(" (")
        .ok_or_else(|| Error::database(1064, format!("bad CREATE TABLE: {rest}")))?;
    let name = name.trim().to_string();
    let body = body
        .strip_suffix(')')
        .ok_or_else(|| Error::database(1064, format!("bad CREATE TABLE body: {body}")))?;

    if state.tables.iter().any(|t| t.name == name) {
        return Err(Error::database(1050, format!("Table '{name}' already exists")));
    }

    let mut columns = Vec::new();
    let mut pk = String::new();
    let mut foreign_keys = Vec::new();

    for part in body.split(", ") {
        if let Some(inner) = part.strip_prefix("PRIMARY KEY (") {
            pk = inner.trim_end_matches(')').to_string();
        } else if let Some(inner) = part.strip_prefix("FOREIGN KEY (") {
            let (column, target) = inner
                .split_once(") REFERENCES ")
                .ok_or_else(|| Error::database(1064, format!("bad FOREIGN KEY clause: {part}")))?;
            let (ref_table, ref_column) = target
                .trim_end_matches(')')
                .split_once('(')
                .ok_or_else(|| Error::database(1064, format!("bad REFERENCES clause: {part}")))?;
            // The reason migration retries: referencing a not-yet-created
            // table is exactly how MySQL reports it.
            if !state.tables.iter().any(|t| t.name == ref_table) && ref_table != name {
                return Err(Error::database(
                    1824,
                    format!("Failed to open the referenced table '{ref_table}'"),
                ));
            }
            foreign_keys.push(ForeignKey {
                column: column.to_string(),
                ref_table: ref_table.to_string(),
                ref_column: ref_column.to_string(),
            });
        } else {
            let mut tokens = part.split_whitespace();
            let column = tokens
                .next()
                .ok_or_else(|| Error::database(1064, format!("bad column clause: {part}")))?;
            let type_str = tokens.next().unwrap_or("int");
            columns.push(Column {
                name: column.to_string(),
                type_str: type_str.to_string(),
                auto_increment: part.contains("AUTO_INCREMENT"),
            });
        }
    }

    state.tables.push(Table {
        name,
        columns,
        pk,
        foreign_keys,
        rows: Vec::new(),
        next_id: 1,
    });
    Ok(0)
}

fn insert(state: &mut State, rest: &str) -> Result<u64> {
    let (table_name, rest) = rest
        .split_once(" (")
        .ok_or_else(|| Error::database(1064, format!("bad INSERT: {rest}")))?;
    let (columns, values) = rest
        .split_once(") VALUES (")
        .ok_or_else(|| Error::database(1064, format!("bad INSERT body: {rest}")))?;
    let values = values
        .strip_suffix(')')
        .ok_or_else(|| Error::database(1064, format!("bad INSERT values: {values}")))?;

    let column_names: Vec<&str> = columns.split(", ").collect();
    let parsed: Vec<Value> = split_top_level(values, ", ")
        .iter()
        .map(|v| parse_literal(v))
        .collect::<Result<_>>()?;
    if column_names.len() != parsed.len() {
        return Err(Error::database(1136, "Column count doesn't match value count"));
    }

    let table = state.table_mut(table_name.trim())?;
    let mut row = vec![Value::Null; table.columns.len()];
    row[0] = Value::Int(table.next_id);
    table.next_id += 1;

    for (name, value) in column_names.iter().zip(parsed) {
        let index = table
            .columns
            .iter()
            .position(|c| c.name == *name)
            .ok_or_else(|| Error::database(1054, format!("Unknown column '{name}'")))?;
        row[index] = value;
    }
    table.rows.push(row);
    Ok(1)
}

fn update(state: &mut State, rest: &str) -> Result<u64> {
    let (table_name, rest) = rest
        .split_once(" SET ")
        .ok_or_else(|| Error::database(1064, format!("bad UPDATE: {rest}")))?;
    let (assignments, clause) = rest
        .split_once(" WHERE ")
        .ok_or_else(|| Error::database(1064, format!("bad UPDATE body: {rest}")))?;

    let parsed: Vec<(String, Value)> = split_top_level(assignments, ", ")
        .iter()
        .map(|a| parse_equality(a))
        .collect::<Result<_>>()?;
    let conditions = parse_clause(clause)?;

    let table = state.table_mut(table_name.trim())?;
    let indices: Vec<(usize, Value)> = parsed
        .into_iter()
        .map(|(name, value)| {
            table
                .columns
                .iter()
                .position(|c| c.name == name)
                .map(|i| (i, value))
                .ok_or_else(|| Error::database(1054, format!("Unknown column '{name}'")))
        })
        .collect::<Result<_>>()?;

    let mut affected = 0;
    for row_index in 0..table.rows.len() {
        if clause_matches(table, &table.rows[row_index], &conditions)? {
            for (column, value) in &indices {
                table.rows[row_index][*column] = value.clone();
            }
            affected += 1;
        }
    }
    Ok(affected)
}

fn delete(state: &mut State, rest: &str) -> Result<u64> {
    let (table_name, clause) = rest
        .split_once(" WHERE ")
        .ok_or_else(|| Error::database(1064, format!("bad DELETE: {rest}")))?;
    let conditions = parse_clause(clause)?;

    let table = state.table_mut(table_name.trim())?;
    let before = table.rows.len();
    let snapshot = table.clone();
    table.rows = snapshot
        .rows
        .iter()
        .filter(|row| !clause_matches(&snapshot, row.as_slice(), &conditions).unwrap_or(false))
        .cloned()
        .collect();
    Ok((before - table.rows.len()) as u64)
}

fn select_all(state: &State, rest: &str) -> Result<Vec<Row>> {
    let (table_name, clause) = match rest.split_once(" WHERE ") {
        Some((t, c)) => (t, Some(c)),
        None => (rest, None),
    };
    let table = state.table(table_name.trim())?;

    let conditions = match clause {
        Some(clause) => parse_clause(clause)?,
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for row in &table.rows {
        if clause_matches(table, row, &conditions)? {
            rows.push(Row::new(row.clone()));
        }
    }
    Ok(rows)
}

fn select_max(state: &State, rest: &str) -> Result<Vec<Row>> {
    let (column, table_name) = rest
        .split_once(") FROM ")
        .ok_or_else(|| Error::database(1064, format!("bad SELECT MAX: {rest}")))?;
    let table = state.table(table_name.trim())?;
    let index = table
        .columns
        .iter()
        .position(|c| c.name == column)
        .ok_or_else(|| Error::database(1054, format!("Unknown column '{column}'")))?;

    let max = table
        .rows
        .iter()
        .filter_map(|row| row[index].as_int())
        .max();
    Ok(vec![Row::new(vec![max.map_or(Value::Null, Value::Int)])])
}

fn show_columns(state: &State, name: &str) -> Result<Vec<Row>> {
    let table = state.table(name)?;
    Ok(table
        .columns
        .iter()
        .map(|column| {
            let key = if column.name == table.pk {
                "PRI"
            } else if table.foreign_keys.iter().any(|fk| fk.column == column.name) {
                "MUL"
            } else {
                ""
            };
            Row::new(vec![
                Value::Str(column.name.clone()),
                Value::Str(column.type_str.clone()),
                Value::from(if column.name == table.pk { "NO" } else { "YES" }),
                Value::from(key),
                Value::Null,
                Value::from(if column.auto_increment { "auto_increment" } else { "" }),
            ])
        })
        .collect())
}

fn key_column_usage(state: &State, sql: &str) -> Result<Vec<Row>> {
    // Constraints are scoped to the schema named in the filter.
    let scoped = sql
        .split("REFERENCED_TABLE_SCHEMA = '")
        .nth(1)
        .and_then(|s| s.split('\'').next());
    if scoped != state.database.as_deref() {
        return Ok(Vec::new());
    }

    let mut rows = Vec::new();
    for table in &state.tables {
        for (i, fk) in table.foreign_keys.iter().enumerate() {
            rows.push(Row::new(vec![
                Value::Str(table.name.clone()),
                Value::Str(fk.column.clone()),
                Value::Str(format!("{}_ibfk_{}", table.name, i + 1)),
                Value::Str(fk.ref_table.clone()),
                Value::Str(fk.ref_column.clone()),
            ]));
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Literal and clause parsing
// ---------------------------------------------------------------------------

/// Split on `separator`, ignoring separators inside quoted strings.
fn split_top_level(input: &str, separator: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_string = false;
    let chars: Vec<char> = input.chars().collect();
    let sep: Vec<char> = separator.chars().collect();

    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '\'' {
            in_string = !in_string;
            current.push('\'');
            i += 1;
        } else if !in_string && chars[i..].starts_with(&sep[..]) {
            parts.push(std::mem::take(&mut current));
            i += sep.len();
        } else {
            current.push(chars[i]);
            i += 1;
        }
    }
    parts.push(current);
    parts
}

fn parse_literal(raw: &str) -> Result<Value> {
    let raw = raw.trim();
    if raw == "NULL" {
        return Ok(Value::Null);
    }
    if let Some(inner) = raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        return Ok(Value::Str(inner.replace("''", "'")));
    }
    raw.parse::<i64>()
        .map(Value::Int)
        .map_err(|_| Error::database(1064, format!("unparsed literal: {raw}")))
}

fn parse_equality(term: &str) -> Result<(String, Value)> {
    let (column, literal) = term
        .split_once(" = ")
        .ok_or_else(|| Error::database(1064, format!("unparsed term: {term}")))?;
    Ok((column.trim().to_string(), parse_literal(literal)?))
}

fn parse_clause(clause: &str) -> Result<Vec<(String, Value)>> {
    split_top_level(clause, " AND ")
        .iter()
        .map(|term| parse_equality(term))
        .collect()
}

fn clause_matches(table: &Table, row: &[Value], conditions: &[(String, Value)]) -> Result<bool> {
    for (column, value) in conditions {
        let index = table
            .columns
            .iter()
            .position(|c| &c.name == column)
            .ok_or_else(|| Error::database(1054, format!("Unknown column '{column}'")))?;
        // SQL equality: comparisons against NULL never match.
        if value.is_null() || row[index].is_null() || &row[index] != value {
            return Ok(false);
        }
    }
    Ok(true)
}
