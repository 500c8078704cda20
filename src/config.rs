use crate::error::{KpiError, Result};

/// Column configuration handed to the report pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConfig {
    pub date_column: String,
    pub kpi_column: Option<String>,
}

impl ReportConfig {
    /// An empty KPI column name means "count rows only".
    pub fn new(date_column: impl Into<String>, kpi_column: Option<String>) -> Result<Self> {
        let date_column = date_column.into();
        if date_column.trim().is_empty() {
            return Err(KpiError::Config("no date column name provided".to_string()));
        }

        Ok(Self {
            date_column,
            kpi_column: kpi_column.filter(|name| !name.is_empty()),
        })
    }

    pub fn kpi_column(&self) -> Option<&str> {
        self.kpi_column.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_date_column_is_rejected() {
        let err = ReportConfig::new("  ", None).unwrap_err();
        assert!(matches!(err, KpiError::Config(_)));
    }

    #[test]
    fn empty_kpi_column_is_dropped() {
        let config = ReportConfig::new("date", Some(String::new())).unwrap();
        assert_eq!(config.kpi_column(), None);

        let config = ReportConfig::new("date", Some("kpi".to_string())).unwrap();
        assert_eq!(config.kpi_column(), Some("kpi"));
    }
}
