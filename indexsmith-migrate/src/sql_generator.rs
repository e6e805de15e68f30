//! PostgreSQL DDL generation from projected model schemas.
//!
//! `CREATE TABLE` statements are built with SeaQuery from the field types and
//! `orm` settings. Indexes are reconstructed from the `index:` / `uniqueIndex:`
//! pieces in each field's `orm` tag, grouped by index name and ordered by
//! priority.

use sea_query::{Alias, ColumnDef, PostgresQueryBuilder, Table};

use indexsmith::naming::{column_name, default_table_name};
use indexsmith::{EngineError, FieldSchema, MigrationEngine, ModelSchema, RecordingSink, StatementSink};

/// Priority of an index column that doesn't declare one
const DEFAULT_PRIORITY: usize = 10;

/// [`MigrationEngine`] that renders PostgreSQL statements into a sink
#[derive(Debug, Default)]
pub struct PostgresEngine<S = RecordingSink> {
    sink: S,
}

impl<S: StatementSink> PostgresEngine<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

impl<S: StatementSink> MigrationEngine for PostgresEngine<S> {
    fn create_extension(&mut self, name: &str) -> Result<(), EngineError> {
        let name = name.trim();
        if name.is_empty() || name.contains('"') {
            return Err(EngineError::Other(format!("invalid extension name {name:?}")));
        }
        self.sink
            .record(format!("CREATE EXTENSION IF NOT EXISTS \"{name}\""));
        Ok(())
    }

    fn migrate(&mut self, table: Option<&str>, schema: &ModelSchema) -> Result<(), EngineError> {
        let table = table
            .map(str::to_string)
            .unwrap_or_else(|| default_table_name(&schema.name));
        log::debug!("generating DDL for {} as {}", schema.name, table);

        let create = generate_create_table_sql(&table, schema)?;
        let indexes = generate_index_sql(&table, schema)?;
        self.sink.record(create);
        for index in indexes {
            self.sink.record(index);
        }
        Ok(())
    }
}

fn is_stored(field: &FieldSchema) -> bool {
    !field.embedded && !field.computed && !field.tags.orm_flag("-")
}

/// Fields that map to a stored column
fn stored_fields(schema: &ModelSchema) -> impl Iterator<Item = &FieldSchema> {
    schema.visible_fields().filter(|f| is_stored(f))
}

/// Generate the `CREATE TABLE` statement for a projected schema
pub fn generate_create_table_sql(table: &str, schema: &ModelSchema) -> Result<String, EngineError> {
    let mut stmt = Table::create();
    stmt.table(Alias::new(table));

    let mut columns = 0;
    for field in stored_fields(schema) {
        stmt.col(&mut column_def(field));
        columns += 1;
    }
    if columns == 0 {
        return Err(EngineError::Rejected {
            model: schema.name.clone(),
            reason: "model has no stored columns".to_string(),
        });
    }
    Ok(stmt.to_string(PostgresQueryBuilder))
}

fn column_def(field: &FieldSchema) -> ColumnDef {
    let mut def = ColumnDef::new(Alias::new(column_name(field)));
    let (rust_type, optional) = unwrap_option(&field.ty);
    let explicit_type = field.tags.orm_setting("type").filter(|t| !t.is_empty());

    match explicit_type {
        Some(sql_type) => {
            def.custom(Alias::new(sql_type));
        }
        None => apply_rust_type(rust_type, &mut def),
    }

    let primary = field.tags.orm_flag("primaryKey") || field.tags.orm_flag("primary_key");
    if primary || field.tags.orm_flag("not null") {
        def.not_null();
    } else if optional {
        def.null();
    }
    if primary {
        def.primary_key();
        if explicit_type.is_none() && is_integer(rust_type) {
            def.auto_increment();
        }
    }
    if field.tags.orm_flag("unique") {
        def.unique_key();
    }
    def
}

/// Strip one `Option<..>` layer from a declared type
fn unwrap_option(ty: &str) -> (&str, bool) {
    let ty = ty.trim();
    let inner = ty
        .strip_prefix("Option<")
        .or_else(|| ty.strip_prefix("std::option::Option<"))
        .and_then(|rest| rest.strip_suffix('>'));
    match inner {
        Some(inner) => (inner.trim(), true),
        None => (ty, false),
    }
}

/// Last path segment of a type, without generics (`chrono::DateTime<Utc>` -> `DateTime`)
fn base_type_name(ty: &str) -> &str {
    let without_generics = ty.split('<').next().unwrap_or(ty);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim_start_matches('&')
        .trim_start_matches("'static")
        .trim()
}

fn is_integer(ty: &str) -> bool {
    matches!(
        base_type_name(ty),
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "isize" | "usize"
    )
}

/// Map a Rust type to a column type
fn apply_rust_type(ty: &str, def: &mut ColumnDef) {
    if ty.replace(' ', "") == "Vec<u8>" {
        def.binary();
        return;
    }
    match base_type_name(ty) {
        "i8" | "u8" | "i16" => {
            def.small_integer();
        }
        "i32" | "u16" => {
            def.integer();
        }
        "i64" | "u32" | "u64" | "isize" | "usize" => {
            def.big_integer();
        }
        "f32" => {
            def.float();
        }
        "f64" => {
            def.double();
        }
        "bool" => {
            def.boolean();
        }
        "char" => {
            def.char();
        }
        "DateTime" | "NaiveDateTime" | "SystemTime" | "OffsetDateTime" => {
            def.timestamp();
        }
        "NaiveDate" | "Date" => {
            def.date();
        }
        "NaiveTime" | "Time" => {
            def.time();
        }
        "Uuid" => {
            def.uuid();
        }
        "Value" | "Json" => {
            def.json();
        }
        "Decimal" => {
            def.custom(Alias::new("numeric"));
        }
        _ => {
            // String and anything unknown
            def.text();
        }
    }
}

/// One column of an index reconstructed from an `orm` piece
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexColumn {
    priority: usize,
    /// Quoted column name or expression
    target: String,
    sort: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexSpec {
    name: String,
    unique: bool,
    where_clause: Option<String>,
    method: Option<String>,
    columns: Vec<IndexColumn>,
}

impl IndexSpec {
    fn render(&self, table: &str) -> String {
        let mut columns = self.columns.clone();
        columns.sort_by_key(|c| c.priority);
        let columns: Vec<String> = columns
            .iter()
            .map(|c| match &c.sort {
                Some(sort) => format!("{} {}", c.target, sort.to_uppercase()),
                None => c.target.clone(),
            })
            .collect();

        let mut sql = String::new();
        if self.unique {
            sql.push_str("CREATE UNIQUE INDEX ");
        } else {
            sql.push_str("CREATE INDEX ");
        }
        sql.push_str(&format!("\"{}\" ON \"{}\"", self.name, table));
        if let Some(method) = &self.method {
            sql.push_str(&format!(" USING {method}"));
        }
        sql.push_str(&format!(" ({})", columns.join(", ")));
        if let Some(predicate) = &self.where_clause {
            sql.push_str(&format!(" WHERE {predicate}"));
        }
        sql
    }
}

/// Settings of one `index:` piece
struct ParsedPiece {
    name: Option<String>,
    unique: bool,
    priority: Option<usize>,
    sort: Option<String>,
    where_clause: Option<String>,
    method: Option<String>,
    expression: Option<String>,
}

const INDEX_KEYS: [&str; 5] = ["priority", "sort", "where", "type", "expression"];

/// Parse `index:<name>,priority:1,...` (or `uniqueIndex:...`); `None` for other pieces
fn parse_index_piece(piece: &str) -> Option<ParsedPiece> {
    let mut parts = piece.split(',');
    let head = parts.next()?.trim();
    let (kind, name) = match head.split_once(':') {
        Some((kind, name)) => (kind.trim(), Some(name.trim().to_string()).filter(|n| !n.is_empty())),
        None => (head, None),
    };
    let unique = if kind.eq_ignore_ascii_case("uniqueIndex") {
        true
    } else if kind.eq_ignore_ascii_case("index") {
        false
    } else {
        return None;
    };

    // Values may contain commas (`where:a IN (1, 2)`): a part that doesn't
    // start with a known key continues the previous value.
    let mut settings: Vec<(String, String)> = Vec::new();
    let mut flags_unique = unique;
    for part in parts {
        let known = part.split_once(':').and_then(|(k, v)| {
            let k = k.trim().to_ascii_lowercase();
            INDEX_KEYS.contains(&k.as_str()).then(|| (k, v.to_string()))
        });
        match known {
            Some(setting) => settings.push(setting),
            None if part.trim().eq_ignore_ascii_case("unique") => flags_unique = true,
            None => match settings.last_mut() {
                Some((_, value)) => {
                    value.push(',');
                    value.push_str(part);
                }
                None => log::warn!("ignoring index setting {:?} in {:?}", part, piece),
            },
        }
    }

    let mut parsed = ParsedPiece {
        name,
        unique: flags_unique,
        priority: None,
        sort: None,
        where_clause: None,
        method: None,
        expression: None,
    };
    for (key, value) in settings {
        let value = value.trim().to_string();
        match key.as_str() {
            "priority" => parsed.priority = value.parse().ok(),
            "sort" => parsed.sort = Some(value),
            "where" => parsed.where_clause = Some(value),
            "type" => parsed.method = Some(value),
            "expression" => parsed.expression = Some(value),
            _ => {}
        }
    }
    Some(parsed)
}

/// Generate one `CREATE INDEX` statement per index named in the schema's tags
///
/// An index piece on a field without a stored column is rejected; dropping
/// that column would change what the index constrains.
pub fn generate_index_sql(table: &str, schema: &ModelSchema) -> Result<Vec<String>, EngineError> {
    let unstored = schema.visible_fields().filter(|f| !is_stored(f));
    for field in unstored {
        if let Some(piece) = field
            .tags
            .orm_pieces()
            .find(|piece| parse_index_piece(piece).is_some())
        {
            return Err(EngineError::Rejected {
                model: schema.name.clone(),
                reason: format!(
                    "field {} has no stored column for index piece {piece:?}",
                    field.name
                ),
            });
        }
    }

    let mut specs: Vec<IndexSpec> = Vec::new();
    for field in stored_fields(schema) {
        let column = column_name(field);
        for piece in field.tags.orm_pieces() {
            let Some(parsed) = parse_index_piece(piece) else {
                continue;
            };
            let name = parsed
                .name
                .unwrap_or_else(|| format!("idx_{table}_{column}"));
            let position = match specs.iter().position(|s| s.name == name) {
                Some(position) => position,
                None => {
                    specs.push(IndexSpec {
                        name,
                        unique: false,
                        where_clause: None,
                        method: None,
                        columns: Vec::new(),
                    });
                    specs.len() - 1
                }
            };
            let spec = &mut specs[position];
            spec.unique |= parsed.unique;
            spec.where_clause = spec.where_clause.take().or(parsed.where_clause);
            spec.method = spec.method.take().or(parsed.method);
            spec.columns.push(IndexColumn {
                priority: parsed.priority.unwrap_or(DEFAULT_PRIORITY),
                target: parsed
                    .expression
                    .unwrap_or_else(|| format!("\"{column}\"")),
                sort: parsed.sort,
            });
        }
    }
    Ok(specs.iter().map(|spec| spec.render(table)).collect())
}
