use crate::utils::error::{ExtractError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_paths(field_name: &str, paths: &[String]) -> Result<()> {
    if paths.is_empty() {
        return Err(ExtractError::MissingConfigError {
            field: field_name.to_string(),
        });
    }
    paths.iter().try_for_each(|p| validate_path(field_name, p))
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// File extension without the dot, ASCII letters and digits only.
pub fn validate_extension(field_name: &str, extension: &str) -> Result<()> {
    if extension.is_empty() || !extension.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ExtractError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: extension.to_string(),
            reason: "Extension must be non-empty and alphanumeric".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("output_dir", "./out").is_ok());
        assert!(validate_path("output_dir", "").is_err());
        assert!(validate_path("output_dir", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_paths_requires_one() {
        assert!(matches!(
            validate_paths("input_files", &[]),
            Err(ExtractError::MissingConfigError { .. })
        ));
        assert!(validate_paths("input_files", &["a.x9".to_string()]).is_ok());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("reader.max_record_size", 80usize, 80, 1024).is_ok());
        assert!(validate_range("reader.max_record_size", 79usize, 80, 1024).is_err());
        assert!(validate_range("output.json_indent", 9usize, 0, 8).is_err());
    }

    #[test]
    fn test_validate_extension() {
        assert!(validate_extension("output.image_extension", "tiff").is_ok());
        assert!(validate_extension("output.image_extension", ".tiff").is_err());
        assert!(validate_extension("output.image_extension", "").is_err());
    }
}
