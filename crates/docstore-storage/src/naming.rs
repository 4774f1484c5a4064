//! Stored-name generation and validation.
//!
//! A stored name looks like `1700000000000_3f2a9c81be07_report.pdf`:
//! upload time in unix milliseconds, 12 random hex digits, then the
//! sanitized original filename. The original name only ever contributes a
//! suffix, so two uploads of `report.pdf` never collide.

use chrono::Utc;
use uuid::Uuid;

use docstore_core::error::AppError;
use docstore_core::result::AppResult;

/// Suffix of a blob that is still being written.
pub const PARTIAL_SUFFIX: &str = ".partial";

/// Longest sanitized suffix kept from the original filename.
const MAX_SUFFIX_LEN: usize = 100;

/// Longest stored name accepted back from callers.
const MAX_NAME_LEN: usize = 200;

/// Suffix used when nothing usable survives sanitization.
const FALLBACK_SUFFIX: &str = "document";

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// Reduce an untrusted filename to `[A-Za-z0-9._-]`.
///
/// Directory components are dropped, every other character becomes `_`,
/// and runs of dots collapse to one so no `..` can survive.
pub fn sanitize_filename(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    let mut out = String::with_capacity(base.len());
    for c in base.chars() {
        let c = if is_allowed(c) { c } else { '_' };
        if c == '.' && out.ends_with('.') {
            continue;
        }
        out.push(c);
    }

    let trimmed = out.trim_matches('.');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
        return FALLBACK_SUFFIX.to_string();
    }

    truncate_keeping_extension(trimmed)
}

fn truncate_keeping_extension(name: &str) -> String {
    if name.len() <= MAX_SUFFIX_LEN {
        return name.to_string();
    }
    // Sanitized names are pure ASCII, so byte slicing is safe.
    match name.rfind('.') {
        Some(dot) if name.len() - dot <= 16 => {
            let ext = &name[dot..];
            let stem = &name[..MAX_SUFFIX_LEN - ext.len()];
            format!("{}{}", stem.trim_end_matches('.'), ext)
        }
        _ => name[..MAX_SUFFIX_LEN].to_string(),
    }
}

/// Generate a fresh stored name for an upload.
pub fn generate_stored_name(original_filename: &str) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!(
        "{}_{}_{}",
        Utc::now().timestamp_millis(),
        &random[..12],
        sanitize_filename(original_filename)
    )
}

/// Check a stored name handed back by a caller before it touches the
/// filesystem. Rejects separators, traversal, absolute paths, hidden files,
/// and unfinished writes.
pub fn validate_stored_name(name: &str) -> AppResult<()> {
    if name.ends_with(PARTIAL_SUFFIX) {
        return Err(AppError::validation(format!(
            "Invalid stored name '{name}': unfinished blob"
        )));
    }
    validate_blob_file_name(name)
}

/// Like [`validate_stored_name`] but also accepts unfinished-write names.
pub fn validate_blob_file_name(name: &str) -> AppResult<()> {
    let invalid = |reason: &str| AppError::validation(format!("Invalid stored name '{name}': {reason}"));

    if name.is_empty() {
        return Err(invalid("empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(invalid("too long"));
    }
    if name.starts_with('.') {
        return Err(invalid("hidden or relative"));
    }
    if name.contains("..") {
        return Err(invalid("path traversal"));
    }
    if !name.chars().all(is_allowed) {
        return Err(invalid("illegal character"));
    }
    Ok(())
}

/// Whether a file name in the store root marks an unfinished write.
pub fn is_partial(name: &str) -> bool {
    name.ends_with(PARTIAL_SUFFIX)
}

/// Name of the unfinished-write file for a stored name.
pub fn partial_name(stored_name: &str) -> String {
    format!("{stored_name}{PARTIAL_SUFFIX}")
}
