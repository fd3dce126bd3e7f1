use crate::utils::error::{ApplyError, Result};
use std::path::Path;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(ApplyError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(ApplyError::InvalidConfigValue {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(ApplyError::InvalidConfigValue {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ApplyError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_file_exists(field_name: &str, path: &str) -> Result<()> {
    validate_non_empty_string(field_name, path)?;
    if !Path::new(path).is_file() {
        return Err(ApplyError::InvalidConfigValue {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "File does not exist".to_string(),
        });
    }
    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: u32, min_value: u32) -> Result<()> {
    if value < min_value {
        return Err(ApplyError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ApplyError::InvalidConfigValue {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("apply_url", "https://example.com").is_ok());
        assert!(validate_url("apply_url", "http://example.com").is_ok());
        assert!(validate_url("apply_url", "").is_err());
        assert!(validate_url("apply_url", "invalid-url").is_err());
        assert!(validate_url("apply_url", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("smtp.host", "smtp.gmail.com").is_ok());
        assert!(validate_non_empty_string("smtp.host", "   ").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("retry.max_attempts", 3, 1).is_ok());
        assert!(validate_positive_number("retry.max_attempts", 0, 1).is_err());
    }

    #[test]
    fn test_validate_file_exists() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        assert!(validate_file_exists("files.cv_path", tmp.path().to_str().unwrap()).is_ok());
        assert!(validate_file_exists("files.cv_path", "/nonexistent/cv.pdf").is_err());
        assert!(validate_file_exists("files.cv_path", "").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("smtp.port", 465u16, 1, 65535).is_ok());
        assert!(validate_range("smtp.port", 0u16, 1, 65535).is_err());
    }
}
