//! Table and JSON output formatting for CLI commands.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};

use docstore_entity::document::{Document, DocumentSummary};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One line of the document table.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct DocumentRow {
    /// Document identifier.
    #[tabled(rename = "ID")]
    pub id: i64,
    /// Display name.
    #[tabled(rename = "Filename")]
    pub original_filename: String,
    /// Size in bytes.
    #[tabled(rename = "Size (bytes)")]
    pub size_bytes: i64,
    /// Upload time, UTC.
    #[tabled(rename = "Uploaded")]
    pub created_at: String,
}

fn format_time(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

impl From<DocumentSummary> for DocumentRow {
    fn from(s: DocumentSummary) -> Self {
        Self {
            id: s.id.get(),
            original_filename: s.original_filename,
            size_bytes: s.size_bytes,
            created_at: format_time(&s.created_at),
        }
    }
}

impl From<Document> for DocumentRow {
    fn from(d: Document) -> Self {
        d.summary().into()
    }
}

/// Print a list of items in the selected format
pub fn print_list<T: Serialize + Tabled>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No documents found.");
            } else {
                println!("{}", Table::new(items));
            }
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Failed to serialize output: {e}")),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{key}:"), value);
}
