use thiserror::Error;

#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("Input CSV is missing required columns: {}", .missing.join(", "))]
    FormatError { missing: Vec<String> },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

pub type Result<T> = std::result::Result<T, EnrichError>;

/// 單筆查詢失敗。不會中止整個批次，只會讓該列的屬性欄位留白。
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("no matching property record found")]
    NoMatch,

    #[error("municipality '{0}' is not offered by the search form")]
    UnknownMunicipality(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Output,
    Network,
    Configuration,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl EnrichError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EnrichError::FormatError { .. } | EnrichError::CsvError(_) => ErrorCategory::Input,
            EnrichError::IoError(_) => ErrorCategory::Output,
            EnrichError::HttpError(_) => ErrorCategory::Network,
            EnrichError::ConfigValidationError { .. }
            | EnrichError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            EnrichError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EnrichError::HttpError(_) => ErrorSeverity::Medium,
            EnrichError::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EnrichError::FormatError { missing } => format!(
                "輸入檔缺少必要欄位 / input file is missing columns: {}",
                missing.join(", ")
            ),
            EnrichError::CsvError(e) => format!("無法解析 CSV / could not parse CSV: {}", e),
            EnrichError::IoError(e) => format!("檔案存取失敗 / file access failed: {}", e),
            EnrichError::HttpError(e) => format!("HTTP 用戶端錯誤 / HTTP client error: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Input => {
                "Check that the input CSV has a header row with address, city, state, zip_code"
            }
            ErrorCategory::Output => "Check that the input exists and the output path is writable",
            ErrorCategory::Network => "Check network connectivity and the --base-url setting",
            ErrorCategory::Configuration => "Review the command-line flags and the TOML config file",
            ErrorCategory::Processing => "Inspect the data that triggered the error and retry",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_error_lists_missing_columns() {
        let err = EnrichError::FormatError {
            missing: vec!["state".to_string(), "zip_code".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Input CSV is missing required columns: state, zip_code"
        );
        assert_eq!(err.category(), ErrorCategory::Input);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = EnrichError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Output);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("denied"));
    }
}
