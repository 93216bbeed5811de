use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MasterError {
    /// Required column(s) absent from a source or reference table.
    #[error("{table}: missing column(s): {}", .columns.join(", "))]
    MissingColumn { table: String, columns: Vec<String> },

    /// A DigiMV part without the base sheet.
    #[error("{part}: missing sheet '{sheet}'")]
    MissingSheet { part: String, sheet: String },

    /// Layout / threshold validation error.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// BUILD_MASTER called with zero source workbooks.
    #[error("no source workbooks supplied")]
    NoSources,
}

impl MasterError {
    pub fn missing_columns<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingColumn {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_lists_every_column() {
        let err = MasterError::missing_columns("Nederland.csv", ["lat", "lon"]);
        assert_eq!(err.to_string(), "Nederland.csv: missing column(s): lat, lon");
    }
}
