//! Best-effort reconstruction of the literal query that was sent.
//!
//! The result is meant for logs. Text values are quoted without escaping, so
//! a rendering is never safe to execute.

use crate::compiler::PLACEHOLDER;
use crate::value::SqlValue;

/// Inlines `args` into `sql` at the placeholder offsets in `slots`.
///
/// Offsets refer to the unmodified `sql`; each substitution shifts the ones
/// after it, so a running delta is applied in ascending order. A slot with no
/// matching argument is replaced by an empty string and a slot that does not
/// point at a placeholder is skipped. Never fails.
#[must_use]
pub fn render(sql: &str, slots: &[usize], args: &[SqlValue]) -> String {
    let mut out = sql.to_string();
    let mut inserted = 0;
    let mut removed = 0;

    for (i, &slot) in slots.iter().enumerate() {
        let Some(at) = (slot + inserted).checked_sub(removed) else {
            continue;
        };
        if out.get(at..at + PLACEHOLDER.len()) != Some(PLACEHOLDER) {
            continue;
        }

        let literal = args.get(i).map(SqlValue::to_literal).unwrap_or_default();
        out.replace_range(at..at + PLACEHOLDER.len(), &literal);
        inserted += literal.len();
        removed += PLACEHOLDER.len();
    }

    out
}

/// Finds the offsets of positional placeholders in text that was written
/// with native placeholders rather than compiled from named ones.
#[must_use]
pub fn scan_slots(sql: &str) -> Vec<usize> {
    sql.match_indices(PLACEHOLDER).map(|(i, _)| i).collect()
}
