//! Scopus search expression builder.

use crate::error::{ReportError, Result};

/// Build a Scopus query from the optional filters.
///
/// Fragments are joined with `AND` in the order raw query, affiliation,
/// year. Blank fragments are dropped.
///
/// # Errors
///
/// Returns [`ReportError::EmptyQuery`] when no fragment remains.
pub fn build_query(raw_query: &str, af_id: Option<u64>, year: Option<i32>) -> Result<String> {
    let fragments: Vec<String> = [
        Some(raw_query.trim().to_string()),
        af_id.map(|id| format!("AF-ID({})", id)),
        year.map(|y| format!("PUBYEAR = {}", y)),
    ]
    .into_iter()
    .flatten()
    .filter(|f| !f.is_empty())
    .collect();

    if fragments.is_empty() {
        return Err(ReportError::EmptyQuery);
    }

    Ok(fragments.join(" AND "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fragments_in_order() {
        let query = build_query("TITLE(graphene)", Some(60000001), Some(2021))
            .expect("Query should build");
        assert_eq!(
            query,
            "TITLE(graphene) AND AF-ID(60000001) AND PUBYEAR = 2021"
        );
    }

    #[test]
    fn test_single_fragments() {
        assert_eq!(
            build_query("", Some(42), None).expect("af-id only"),
            "AF-ID(42)"
        );
        assert_eq!(
            build_query("", None, Some(2020)).expect("year only"),
            "PUBYEAR = 2020"
        );
        assert_eq!(
            build_query("KEY(rust)", None, None).expect("raw only"),
            "KEY(rust)"
        );
    }

    #[test]
    fn test_each_fragment_once() {
        let query = build_query("KEY(x)", Some(7), Some(1999)).expect("Query should build");
        assert_eq!(query.matches("KEY(x)").count(), 1);
        assert_eq!(query.matches("AF-ID(7)").count(), 1);
        assert_eq!(query.matches("PUBYEAR = 1999").count(), 1);
        assert_eq!(query.matches(" AND ").count(), 2);
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(
            build_query("", None, None),
            Err(ReportError::EmptyQuery)
        ));
        assert!(matches!(
            build_query("   ", None, None),
            Err(ReportError::EmptyQuery)
        ));
    }
}
