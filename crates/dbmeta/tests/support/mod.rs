//! In-memory engine double that understands the DDL the exporter writes.
//!
//! It is strict the way a real engine is: a table may only use known types or
//! existing domains, a procedure may only select from existing tables, and
//! one call accepts one statement.

#![allow(dead_code)]

use dbmeta::core::{ColumnRecord, DomainRecord, ParameterDirection, ParameterRecord};
use dbmeta::typemap::{codes, TypeDescriptor};
use dbmeta::{CatalogReader, Connection, MetaError, Result};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

type Signature = Vec<(String, TypeDescriptor)>;

#[derive(Debug, Clone, Default)]
struct Procedure {
    inputs: Signature,
    outputs: Signature,
    source: Option<String>,
}

#[derive(Debug, Default)]
struct Catalog {
    domains: BTreeMap<String, DomainRecord>,
    tables: BTreeMap<String, Vec<ColumnRecord>>,
    procedures: BTreeMap<String, Procedure>,
    executed: Vec<String>,
}

/// Shared handle: clones see the same catalog, so a test keeps one while the
/// workflow owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    catalog: Rc<RefCell<Catalog>>,
}

fn rejected(message: impl Into<String>) -> MetaError {
    MetaError::Engine(message.into())
}

impl MemoryEngine {
    pub fn add_domain(&self, domain: DomainRecord) {
        self.catalog
            .borrow_mut()
            .domains
            .insert(domain.name.clone(), domain);
    }

    pub fn add_table(&self, name: &str, columns: Vec<ColumnRecord>) {
        self.catalog
            .borrow_mut()
            .tables
            .insert(name.to_string(), columns);
    }

    pub fn add_procedure(
        &self,
        name: &str,
        inputs: &[(&str, TypeDescriptor)],
        outputs: &[(&str, TypeDescriptor)],
        source: Option<&str>,
    ) {
        self.catalog.borrow_mut().procedures.insert(
            name.to_string(),
            Procedure {
                inputs: owned(inputs),
                outputs: owned(outputs),
                source: source.map(str::to_string),
            },
        );
    }

    pub fn domain(&self, name: &str) -> Option<DomainRecord> {
        self.catalog.borrow().domains.get(name).cloned()
    }

    pub fn domain_names(&self) -> Vec<String> {
        self.catalog.borrow().domains.keys().cloned().collect()
    }

    pub fn table(&self, name: &str) -> Option<Vec<ColumnRecord>> {
        self.catalog.borrow().tables.get(name).cloned()
    }

    pub fn table_count(&self) -> usize {
        self.catalog.borrow().tables.len()
    }

    /// Number of input and output parameters of a procedure.
    pub fn procedure_arity(&self, name: &str) -> Option<(usize, usize)> {
        self.catalog
            .borrow()
            .procedures
            .get(name)
            .map(|p| (p.inputs.len(), p.outputs.len()))
    }

    /// Statements accepted so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.catalog.borrow().executed.clone()
    }
}

impl Connection for MemoryEngine {
    fn execute(&mut self, sql: &str) -> Result<()> {
        let sql = sql.trim().trim_end_matches(';').trim_end();
        let mut catalog = self.catalog.borrow_mut();

        if let Some(rest) = strip_keyword(sql, "CREATE DOMAIN") {
            catalog.create_domain(rest)?;
        } else if let Some(rest) = strip_keyword(sql, "ALTER DOMAIN") {
            catalog.alter_domain(rest)?;
        } else if let Some(rest) = strip_keyword(sql, "CREATE TABLE") {
            catalog.create_table(rest)?;
        } else if let Some(rest) = strip_keyword(sql, "CREATE PROCEDURE") {
            catalog.create_procedure(rest)?;
        } else {
            return Err(rejected("Token unknown"));
        }

        catalog.executed.push(sql.to_string());
        Ok(())
    }
}

impl CatalogReader for MemoryEngine {
    fn domain_names(&mut self) -> Result<Vec<String>> {
        Ok(MemoryEngine::domain_names(self))
    }

    fn domain(&mut self, name: &str) -> Result<Option<DomainRecord>> {
        Ok(MemoryEngine::domain(self, name))
    }

    fn table_names(&mut self) -> Result<Vec<String>> {
        Ok(self.catalog.borrow().tables.keys().cloned().collect())
    }

    fn table_columns(&mut self, table: &str) -> Result<Vec<ColumnRecord>> {
        self.table(table)
            .ok_or_else(|| rejected(format!("Table unknown: {}", table)))
    }

    fn procedure_names(&mut self) -> Result<Vec<String>> {
        Ok(self.catalog.borrow().procedures.keys().cloned().collect())
    }

    fn procedure_parameters(
        &mut self,
        procedure: &str,
        direction: ParameterDirection,
    ) -> Result<Vec<ParameterRecord>> {
        let catalog = self.catalog.borrow();
        let def = catalog
            .procedures
            .get(procedure)
            .ok_or_else(|| rejected(format!("Procedure unknown: {}", procedure)))?;
        let params = match direction {
            ParameterDirection::In => &def.inputs,
            ParameterDirection::Out => &def.outputs,
        };
        Ok(params
            .iter()
            .map(|(name, _)| ParameterRecord::new(name.clone(), field_source(procedure, name)))
            .collect())
    }

    fn field_type(&mut self, field: &str) -> Result<Option<TypeDescriptor>> {
        let catalog = self.catalog.borrow();
        if let Some(domain) = catalog.domains.get(field) {
            return Ok(Some(domain.field_type));
        }
        Ok(catalog.procedures.iter().find_map(|(proc_name, def)| {
            def.inputs
                .iter()
                .chain(&def.outputs)
                .find(|(param, _)| field_source(proc_name, param) == field)
                .map(|(_, desc)| *desc)
        }))
    }

    fn procedure_source(&mut self, procedure: &str) -> Result<Option<String>> {
        Ok(self
            .catalog
            .borrow()
            .procedures
            .get(procedure)
            .and_then(|p| p.source.clone()))
    }
}

fn owned(params: &[(&str, TypeDescriptor)]) -> Signature {
    params.iter().map(|(n, t)| (n.to_string(), *t)).collect()
}

/// Generated backing-field name of a procedure parameter.
fn field_source(procedure: &str, param: &str) -> String {
    format!("RDB${}${}", procedure, param)
}

impl Catalog {
    fn create_domain(&mut self, rest: &str) -> Result<()> {
        let (name, tail) = split_word(rest)?;
        let type_text = strip_keyword(tail, "AS").ok_or_else(|| rejected("expected AS"))?;
        if self.domains.contains_key(name) {
            return Err(rejected(format!("Domain {} already exists", name)));
        }
        let field_type = parse_type(type_text)
            .ok_or_else(|| rejected(format!("unknown type {}", type_text)))?;

        self.domains.insert(
            name.to_string(),
            DomainRecord {
                name: name.to_string(),
                field_type,
                default_source: None,
                check_source: None,
            },
        );
        Ok(())
    }

    fn alter_domain(&mut self, rest: &str) -> Result<()> {
        let (name, tail) = split_word(rest)?;
        let domain = self
            .domains
            .get_mut(name)
            .ok_or_else(|| rejected(format!("Domain unknown: {}", name)))?;

        if let Some(clause) = strip_keyword(tail, "SET") {
            domain.default_source = Some(clause.to_string());
        } else if let Some(clause) = strip_keyword(tail, "ADD") {
            domain.check_source = Some(clause.to_string());
        } else {
            return Err(rejected("expected SET or ADD"));
        }
        Ok(())
    }

    fn create_table(&mut self, rest: &str) -> Result<()> {
        let open = rest.find('(').ok_or_else(|| rejected("expected column list"))?;
        let name = rest[..open].trim();
        let (body, after) = take_group(&rest[open..])?;
        if !after.trim().is_empty() {
            return Err(rejected(format!("unexpected text after column list: {}", after.trim())));
        }
        if name.is_empty() || self.tables.contains_key(name) {
            return Err(rejected(format!("invalid or duplicate table name '{}'", name)));
        }

        let mut columns = Vec::new();
        for def in split_top_level(body) {
            let (def, not_null) = match strip_suffix_ignore_case(def, "NOT NULL") {
                Some(head) => (head.trim_end(), true),
                None => (def, false),
            };
            let (col_name, type_text) = split_word(def)?;
            columns.push(ColumnRecord::new(col_name, self.resolve_type(type_text)?, not_null));
        }
        if columns.is_empty() {
            return Err(rejected("table needs at least one column"));
        }

        self.tables.insert(name.to_string(), columns);
        Ok(())
    }

    fn create_procedure(&mut self, rest: &str) -> Result<()> {
        let as_pos = find_word(rest, "AS").ok_or_else(|| rejected("expected AS"))?;
        let header = rest[..as_pos].trim();
        let body = rest[as_pos + 2..].trim();

        let name_end = header
            .find(|c: char| c.is_whitespace() || c == '(')
            .unwrap_or(header.len());
        let name = &header[..name_end];
        let mut tail = header[name_end..].trim_start();

        let mut inputs = Vec::new();
        if tail.starts_with('(') {
            let (inner, after) = take_group(tail)?;
            inputs = self.parse_params(inner)?;
            tail = after.trim_start();
        }
        let mut outputs = Vec::new();
        if let Some(returns) = strip_keyword(tail, "RETURNS") {
            let (inner, after) = take_group(returns)?;
            outputs = self.parse_params(inner)?;
            tail = after.trim_start();
        }
        if !tail.is_empty() {
            return Err(rejected(format!("unexpected text in header: {}", tail)));
        }

        let inner = strip_keyword(body, "BEGIN")
            .and_then(|b| strip_suffix_ignore_case(b, "END"))
            .ok_or_else(|| rejected("expected BEGIN ... END"))?
            .trim();
        self.check_references(inner)?;

        if self.procedures.contains_key(name) {
            return Err(rejected(format!("Procedure {} already exists", name)));
        }
        self.procedures.insert(
            name.to_string(),
            Procedure {
                inputs,
                outputs,
                source: Some(inner.to_string()).filter(|s| !s.is_empty()),
            },
        );
        Ok(())
    }

    fn parse_params(&self, list: &str) -> Result<Signature> {
        split_top_level(list)
            .into_iter()
            .map(|def| {
                let (name, type_text) = split_word(def)?;
                Ok((name.to_string(), self.resolve_type(type_text)?))
            })
            .collect()
    }

    /// Every `FROM <table>` in a body must name an existing table.
    fn check_references(&self, body: &str) -> Result<()> {
        let mut words = body.split_whitespace();
        while let Some(word) = words.next() {
            if word.eq_ignore_ascii_case("FROM") {
                let table = words
                    .next()
                    .map(|t| t.trim_end_matches([';', ',']))
                    .unwrap_or_default();
                if !self.tables.contains_key(table) {
                    return Err(rejected(format!("Table unknown: {}", table)));
                }
            }
        }
        Ok(())
    }

    fn resolve_type(&self, text: &str) -> Result<TypeDescriptor> {
        let text = text.trim();
        parse_type(text)
            .or_else(|| self.domains.get(text).map(|d| d.field_type))
            .ok_or_else(|| rejected(format!("unknown type {}", text)))
    }
}

/// Parse built-in SQL type text back into a descriptor.
fn parse_type(text: &str) -> Option<TypeDescriptor> {
    let upper = text.trim().to_ascii_uppercase();
    let simple = match upper.as_str() {
        "SMALLINT" => Some(codes::SMALLINT),
        "INTEGER" => Some(codes::INTEGER),
        "BIGINT" => Some(codes::INT64),
        "FLOAT" => Some(codes::FLOAT),
        "DOUBLE PRECISION" => Some(codes::DOUBLE),
        "DATE" => Some(codes::DATE),
        "TIME" => Some(codes::TIME),
        "TIMESTAMP" => Some(codes::TIMESTAMP),
        "BLOB" => Some(codes::BLOB),
        _ => None,
    };
    if let Some(code) = simple {
        return Some(TypeDescriptor::new(code));
    }

    let (base, args) = upper.split_once('(')?;
    let args: Vec<i32> = args
        .strip_suffix(')')?
        .split(',')
        .map(|a| a.trim().parse().ok())
        .collect::<Option<_>>()?;
    match (base.trim(), args.as_slice()) {
        ("CHAR", [n]) => Some(TypeDescriptor::new(codes::CHAR).with_char_length(*n)),
        ("VARCHAR", [n]) => Some(TypeDescriptor::new(codes::VARCHAR).with_char_length(*n)),
        ("DECIMAL" | "NUMERIC", [p, s]) => {
            Some(TypeDescriptor::new(codes::INT64).with_numeric(*p, -*s))
        }
        _ => None,
    }
}

/// Strip a leading keyword (case-insensitive) that ends at a word boundary.
fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let head = text.get(..keyword.len())?;
    if !head.eq_ignore_ascii_case(keyword) {
        return None;
    }
    let rest = &text[keyword.len()..];
    match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' || c == '$' => None,
        _ => Some(rest.trim_start()),
    }
}

fn strip_suffix_ignore_case<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let split = text.len().checked_sub(suffix.len())?;
    let tail = text.get(split..)?;
    tail.eq_ignore_ascii_case(suffix).then(|| &text[..split])
}

/// First whitespace-separated word and the trimmed remainder.
fn split_word(text: &str) -> Result<(&str, &str)> {
    text.trim()
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .ok_or_else(|| rejected(format!("incomplete definition: {}", text.trim())))
}

/// Byte offset of a standalone word (case-insensitive).
fn find_word(text: &str, word: &str) -> Option<usize> {
    let is_boundary = |c: Option<char>| c.map_or(true, |c| c.is_whitespace() || c == ')');
    text.char_indices().map(|(i, _)| i).find(|&i| {
        text.get(i..i + word.len())
            .is_some_and(|w| w.eq_ignore_ascii_case(word))
            && is_boundary(text[..i].chars().next_back())
            && is_boundary(text[i + word.len()..].chars().next())
    })
}

/// Content of the parenthesised group `text` starts with, and what follows it.
fn take_group(text: &str) -> Result<(&str, &str)> {
    let text = text.trim_start();
    if !text.starts_with('(') {
        return Err(rejected("expected '('"));
    }
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&text[1..i], &text[i + 1..]));
                }
            }
            _ => {}
        }
    }
    Err(rejected("unbalanced parentheses"))
}

/// Split on commas outside parentheses.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|p| !p.is_empty());
    parts
}
