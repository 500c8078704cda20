use crate::error::{KpiError, Result};
use crate::model::ColumnIndex;

/// Locate the configured columns in a header row.
///
/// Matching is exact and case-sensitive. When a name appears more than once the
/// leftmost column wins. A `kpi_column` of `None` or `""` skips KPI lookup.
pub fn resolve<S: AsRef<str>>(
    header: &[S],
    date_column: &str,
    kpi_column: Option<&str>,
) -> Result<ColumnIndex> {
    let date = position(header, date_column)
        .ok_or_else(|| KpiError::ColumnNotFound(date_column.to_string()))?;

    let kpi = match kpi_column.filter(|name| !name.is_empty()) {
        Some(name) => Some(
            position(header, name).ok_or_else(|| KpiError::ColumnNotFound(name.to_string()))?,
        ),
        None => None,
    };

    Ok(ColumnIndex { date, kpi })
}

fn position<S: AsRef<str>>(header: &[S], name: &str) -> Option<usize> {
    header.iter().position(|column| column.as_ref() == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolves_both_columns() {
        let header = ["region", "date", "kpi"];
        let columns = resolve(&header, "date", Some("kpi")).unwrap();
        assert_eq!(columns, ColumnIndex { date: 1, kpi: Some(2) });
    }

    #[test]
    fn first_duplicate_wins() {
        let header = ["date", "kpi", "date", "kpi"];
        let columns = resolve(&header, "date", Some("kpi")).unwrap();
        assert_eq!(columns, ColumnIndex { date: 0, kpi: Some(1) });
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let header = ["Date", "kpi"];
        let err = resolve(&header, "date", Some("kpi")).unwrap_err();
        assert!(matches!(err, KpiError::ColumnNotFound(name) if name == "date"));
    }

    #[test]
    fn missing_kpi_column_is_reported_by_name() {
        let header = ["date", "value"];
        let err = resolve(&header, "date", Some("kpi")).unwrap_err();
        assert!(matches!(err, KpiError::ColumnNotFound(name) if name == "kpi"));
    }

    #[test]
    fn empty_kpi_name_skips_lookup() {
        let header = ["date"];
        assert_eq!(resolve(&header, "date", Some("")).unwrap().kpi, None);
        assert_eq!(resolve(&header, "date", None).unwrap().kpi, None);
    }

    #[test]
    fn works_on_owned_headers() {
        let header = vec!["kpi".to_string(), "date".to_string()];
        let columns = resolve(&header, "date", Some("kpi")).unwrap();
        assert_eq!(columns, ColumnIndex { date: 1, kpi: Some(0) });
    }
}
