use thiserror::Error;

/// Top-level error type for the Lectern assistant core.
///
/// Each variant wraps a collaborator-specific failure. Downstream crates map
/// their own failures into these variants so that the `?` operator works
/// seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LecternError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for LecternError {
    fn from(err: toml::de::Error) -> Self {
        LecternError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for LecternError {
    fn from(err: toml::ser::Error) -> Self {
        LecternError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for LecternError {
    fn from(err: serde_json::Error) -> Self {
        LecternError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Lectern operations.
pub type Result<T> = std::result::Result<T, LecternError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LecternError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing field");
    }

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(LecternError, &str)> = vec![
            (
                LecternError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                LecternError::Backend("502 from upstream".to_string()),
                "Backend error: 502 from upstream",
            ),
            (
                LecternError::Identity("provider unavailable".to_string()),
                "Identity error: provider unavailable",
            ),
            (
                LecternError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: LecternError = io_err.into();
        assert!(matches!(err, LecternError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_from_toml_de() {
        let bad_toml = "invalid = [[[";
        let parsed: std::result::Result<toml::Value, _> = toml::from_str(bad_toml);
        assert!(parsed.is_err());
        let err: LecternError = parsed.unwrap_err().into();
        assert!(matches!(err, LecternError::Config(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let bad_json = "{ invalid json }";
        let parsed: std::result::Result<serde_json::Value, _> = serde_json::from_str(bad_json);
        assert!(parsed.is_err());
        let err: LecternError = parsed.unwrap_err().into();
        assert!(matches!(err, LecternError::Serialization(_)));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        fn returns_err() -> Result<i32> {
            Err(LecternError::Backend("down".to_string()))
        }

        assert_eq!(returns_ok().unwrap(), 42);
        assert!(returns_err().is_err());
    }

    #[test]
    fn test_result_type_with_question_mark() {
        fn inner() -> Result<String> {
            let io_result: std::result::Result<i32, std::io::Error> = Ok(42);
            let _value = io_result?;
            Ok("success".to_string())
        }

        assert_eq!(inner().unwrap(), "success");
    }

    #[test]
    fn test_error_debug_impl() {
        let err = LecternError::Identity("test debug".to_string());
        let debug_str = format!("{:?}", err);
        assert!(debug_str.contains("Identity"));
        assert!(debug_str.contains("test debug"));
    }
}
