/// Longest original filename accepted for an upload, in bytes.
pub const MAX_FILENAME_LEN: usize = 255;

/// Why an uploaded filename was rejected.
#[derive(Debug)]
pub enum FilenameError {
    Empty,
    TooLong,
    /// Contains `/` or `\`.
    ContainsPathSeparator,
    /// Is exactly `..`.
    PathTraversal,
    NullByte,
    /// Contains CR, LF or another control character.
    ControlCharacter,
}

impl FilenameError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::TooLong => "Filename is too long",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validate the filename a client sent with an uploaded part.
///
/// Returns the trimmed name. The result becomes part of the stored display
/// name and of `Content-Disposition` on download, so it must be a single
/// path component without control characters.
pub fn validate_upload_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.len() > MAX_FILENAME_LEN {
        return Err(FilenameError::TooLong);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(char::is_control) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." || trimmed == "." {
        return Err(FilenameError::PathTraversal);
    }

    Ok(trimmed)
}
