//! USING-clause argument handling.
//!
//! The host splits `using sqlexec(...)` on commas and hands the pieces over
//! as `[module, database, table, config...]`. Exactly one config argument is
//! accepted: the query text, optionally wrapped in one parenthesis pair so
//! that commas inside the query survive the splitter.

use sqlexec_error::{Result, SqlexecError};

/// Fixed, host-supplied entries at the front of the creation argument list:
/// module name, database name, table name.
const FIXED_ARGS: usize = 3;

/// Extract the single query argument from the creation argument list.
pub(crate) fn single_query_argument<'a>(args: &[&'a str]) -> Result<&'a str> {
    if args.len() != FIXED_ARGS + 1 {
        return Err(SqlexecError::ArgumentCount {
            expected: 1,
            actual: args.len().saturating_sub(FIXED_ARGS),
        });
    }
    Ok(args[FIXED_ARGS])
}

/// Strip one optional outer parenthesis pair from the query argument.
///
/// Stripping happens only when the first non-whitespace character is `(`
/// and the last is `)`; anything else flanking the pair passes the argument
/// through verbatim. The interior is never trimmed and the strip never
/// recurses.
pub(crate) fn normalize_query(raw: &str) -> &str {
    raw.trim()
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(raw)
}
