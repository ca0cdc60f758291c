//! Pre-built [`tracing::Span`] constructors for chain operations.
//!
//! Consistent span names and field sets make it easy to filter and correlate
//! calls in any tracing backend.

use tally_types::Address;
use tracing::{debug_span, info_span, Span};

/// Span covering one mutating call, from lock acquisition to commit or rejection.
pub fn call_span(call: &str, caller: &Address) -> Span {
    info_span!("call", call = %call, caller = %caller)
}

/// Span covering a read-only query.
pub fn query_span(query: &str) -> Span {
    debug_span!("query", query = %query)
}
