//! Text assembly for exported definition scripts.
//!
//! Every block ends with a blank line so blocks concatenate into one file.

use crate::core::{ColumnRecord, DomainRecord};

const INDENT: &str = "    ";

/// `<name> <type>` entry of a procedure signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureEntry {
    pub name: String,
    pub sql_type: String,
}

impl SignatureEntry {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }

    fn render(&self) -> String {
        format!("{} {}", self.name, self.sql_type)
    }
}

/// Trim a clause and end it with exactly one `;`.
pub fn terminate(clause: &str) -> String {
    format!("{};", clause.trim().trim_end_matches(';').trim_end())
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Render a domain as a `CREATE DOMAIN` statement followed by its optional
/// default and check clauses, one executable statement per line.
pub fn render_domain(domain: &DomainRecord) -> String {
    let mut out = format!(
        "CREATE DOMAIN {} AS {};\n",
        domain.name,
        domain.field_type.sql_type()
    );

    if let Some(default) = non_blank(domain.default_source.as_deref()) {
        out.push_str(&terminate(&format!("ALTER DOMAIN {} SET {}", domain.name, default)));
        out.push('\n');
    }
    if let Some(check) = non_blank(domain.check_source.as_deref()) {
        out.push_str(&terminate(&format!("ALTER DOMAIN {} ADD {}", domain.name, check)));
        out.push('\n');
    }

    out.push('\n');
    out
}

/// Render a table with its columns in declared order.
pub fn render_table(name: &str, columns: &[ColumnRecord]) -> String {
    let cols: Vec<String> = columns
        .iter()
        .map(|c| {
            let not_null = if c.not_null { " NOT NULL" } else { "" };
            format!("{}{} {}{}", INDENT, c.name, c.field_type.sql_type(), not_null)
        })
        .collect();

    format!("CREATE TABLE {} (\n{}\n);\n\n", name, cols.join(",\n"))
}

/// Render a procedure header, output signature and re-indented body.
///
/// Without source text the body between `BEGIN` and `END` is empty.
pub fn render_procedure(
    name: &str,
    inputs: &[SignatureEntry],
    outputs: &[SignatureEntry],
    source: Option<&str>,
) -> String {
    let mut out = format!("CREATE PROCEDURE {}", name);
    if !inputs.is_empty() {
        let params: Vec<String> = inputs.iter().map(SignatureEntry::render).collect();
        out.push_str(&format!(" ({})", params.join(", ")));
    }
    out.push('\n');

    if !outputs.is_empty() {
        let params: Vec<String> = outputs.iter().map(SignatureEntry::render).collect();
        out.push_str("RETURNS (\n");
        out.push_str(INDENT);
        out.push_str(&params.join(&format!(",\n{}", INDENT)));
        out.push_str("\n)\n");
    }

    out.push_str("AS\nBEGIN\n");
    if let Some(source) = non_blank(source) {
        for line in source.lines().map(str::trim).filter(|l| !l.is_empty()) {
            out.push_str(INDENT);
            out.push_str(line);
            out.push('\n');
        }
    }
    out.push_str("END;\n\n");
    out
}
