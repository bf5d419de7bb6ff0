//! Span helpers for executor calls (feature `tracing`).

use tracing::Span;

/// Span covering one executor call made by a model
pub fn query_span(operation: &'static str, table: &str) -> Span {
    tracing::debug_span!("rowguard.query", operation, table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_can_be_entered_without_subscriber() {
        let span = query_span("insert", "post");
        let _guard = span.enter();
    }
}
