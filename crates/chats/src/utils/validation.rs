//! Validation utilities.

use duolog_database::{ChatError, ChatResult};

/// Validation utilities
pub struct Validator;

impl Validator {
    /// Validate message content
    pub fn message_content(content: &str) -> ChatResult<()> {
        if content.trim().is_empty() {
            return Err(ChatError::validation("message content cannot be empty"));
        }

        if content.len() > 100_000 {
            return Err(ChatError::validation(
                "message content too long (max 100,000 characters)",
            ));
        }

        Ok(())
    }

    /// Validate file name
    pub fn file_name(file_name: &str) -> ChatResult<()> {
        if file_name.trim().is_empty() {
            return Err(ChatError::validation("file name cannot be empty"));
        }

        if file_name.len() > 255 {
            return Err(ChatError::validation(
                "file name too long (max 255 characters)",
            ));
        }

        let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
        for ch in invalid_chars {
            if file_name.contains(ch) {
                return Err(ChatError::validation(format!(
                    "file name contains invalid character: {ch}"
                )));
            }
        }

        Ok(())
    }

    /// Validate file size against the configured maximum
    pub fn file_size(size_bytes: i64, max_size_bytes: i64) -> ChatResult<()> {
        if size_bytes <= 0 {
            return Err(ChatError::validation("file size must be positive"));
        }

        if size_bytes > max_size_bytes {
            return Err(ChatError::validation(
                "file size exceeds maximum allowed size",
            ));
        }

        Ok(())
    }

    /// Validate a file extension against the allow-list
    pub fn file_extension(file_name: &str, allowed_extensions: &[String]) -> ChatResult<()> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_default();

        if extension.is_empty()
            || !allowed_extensions
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(&extension))
        {
            return Err(ChatError::validation("file type not allowed"));
        }

        Ok(())
    }

    /// Validate pagination parameters, applying the default page size
    pub fn pagination(limit: Option<i64>, offset: Option<i64>) -> ChatResult<(i64, i64)> {
        let limit = limit.unwrap_or(50);
        let offset = offset.unwrap_or(0);

        if limit <= 0 {
            return Err(ChatError::validation("page limit must be greater than 0"));
        }

        if offset < 0 {
            return Err(ChatError::validation("page offset cannot be negative"));
        }

        Ok((limit, offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["txt".to_string(), "png".to_string()]
    }

    #[test]
    fn blank_content_is_rejected() {
        assert!(Validator::message_content("   ").is_err());
        assert!(Validator::message_content("hi").is_ok());
    }

    #[test]
    fn file_names_with_path_separators_are_rejected() {
        assert!(Validator::file_name("../etc/passwd").is_err());
        assert!(Validator::file_name("notes.txt").is_ok());
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(Validator::file_extension("photo.PNG", &allowed()).is_ok());
        assert!(Validator::file_extension("archive.zip", &allowed()).is_err());
        assert!(Validator::file_extension("no-extension", &allowed()).is_err());
    }

    #[test]
    fn oversize_files_are_rejected() {
        assert!(Validator::file_size(11, 10).is_err());
        assert!(Validator::file_size(10, 10).is_ok());
        assert!(Validator::file_size(0, 10).is_err());
    }

    #[test]
    fn pagination_defaults_apply() {
        assert_eq!(Validator::pagination(None, None).unwrap(), (50, 0));
        assert!(Validator::pagination(Some(0), None).is_err());
        assert!(Validator::pagination(None, Some(-1)).is_err());
    }
}
