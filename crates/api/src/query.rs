//! CQL composition for the Confluence content search endpoint.

/// Substrings that mark a query as already being CQL rather than free text.
const CQL_OPERATORS: [&str; 5] = ["=", "~", "AND", "OR", "IN"];

/// Build the CQL sent to the content search endpoint.
///
/// The search is always restricted to pages. A space filter adds a
/// `space = "KEY"` condition. The user query is taken as-is (parenthesized)
/// when it contains a CQL operator, and as a full-text match otherwise.
pub fn page_search_cql(query: &str, space_key: Option<&str>) -> String {
    let mut parts = vec![r#"type = "page""#.to_string()];

    if let Some(space) = space_key {
        parts.push(format!(r#"space = "{space}""#));
    }

    if CQL_OPERATORS.iter().any(|op| query.contains(op)) {
        parts.push(format!("({query})"));
    } else {
        parts.push(format!(r#"text ~ "{query}""#));
    }

    parts.join(" AND ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_query() {
        assert_eq!(
            page_search_cql("foo bar", None),
            r#"type = "page" AND text ~ "foo bar""#
        );
    }

    #[test]
    fn test_query_with_operator_is_parenthesized() {
        assert_eq!(
            page_search_cql("space = X", None),
            r#"type = "page" AND (space = X)"#
        );
    }

    #[test]
    fn test_space_filter() {
        assert_eq!(
            page_search_cql("architecture", Some("ENG")),
            r#"type = "page" AND space = "ENG" AND text ~ "architecture""#
        );
    }

    #[test]
    fn test_space_filter_with_cql_query() {
        assert_eq!(
            page_search_cql("label = api OR label = backend", Some("ENG")),
            r#"type = "page" AND space = "ENG" AND (label = api OR label = backend)"#
        );
    }

    #[test]
    fn test_tilde_counts_as_operator() {
        assert_eq!(
            page_search_cql(r#"title ~ "Runbook""#, None),
            r#"type = "page" AND (title ~ "Runbook")"#
        );
    }
}
