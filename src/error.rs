use std::path::PathBuf;

/// Fatal pipeline errors. Any of these aborts the run without a report.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Data format error: {0}")]
    DataFormat(String),

    #[error("Chart render error: {0}")]
    Render(String),

    #[error("Report assembly error: {0}")]
    Assembly(String),

    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReportError::DataFormat("missing required column(s): date".to_string());
        assert_eq!(
            err.to_string(),
            "Data format error: missing required column(s): date"
        );

        let err = ReportError::io(
            "output/chart.png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.to_string(), "IO error at output/chart.png: denied");
    }
}
