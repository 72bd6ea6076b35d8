use std::path::Path;

/// Result of validating an uploaded image filename.
#[derive(Debug, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename contains path traversal patterns (`..`).
    PathTraversal,
    /// Filename contains null bytes.
    NullByte,
    /// Filename starts with a dot (hidden file).
    Hidden,
    /// Filename contains control characters (CR, LF, etc.).
    ControlCharacter,
    /// Extension is missing or does not map to an image type.
    NotAnImage,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: '..' is not allowed",
            Self::NullByte => "Invalid filename: null bytes are not allowed",
            Self::Hidden => "Invalid filename: hidden files (starting with '.') are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
            Self::NotAnImage => "Only image files can be uploaded",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    let trimmed = filename.trim();

    if trimmed.is_empty() {
        return Err(FilenameError::Empty);
    }

    if trimmed.contains('\0') {
        return Err(FilenameError::NullByte);
    }

    if trimmed.chars().any(|c| c.is_ascii_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if trimmed.contains('/') || trimmed.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if trimmed == ".." {
        return Err(FilenameError::PathTraversal);
    }

    if trimmed.starts_with('.') {
        return Err(FilenameError::Hidden);
    }

    Ok(trimmed)
}

/// An accepted image upload: lowercased extension and MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageKind {
    pub extension: String,
    pub content_type: String,
}

/// Validate an uploaded image's filename and derive its stored extension and
/// content type from it.
pub fn image_kind(filename: &str) -> Result<ImageKind, FilenameError> {
    let name = validate_flat_filename(filename)?;
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .ok_or(FilenameError::NotAnImage)?
        .to_ascii_lowercase();

    let mime = mime_guess::from_ext(&extension)
        .first()
        .filter(|m| m.type_() == mime_guess::mime::IMAGE)
        .ok_or(FilenameError::NotAnImage)?;

    Ok(ImageKind {
        extension,
        content_type: mime.essence_str().to_string(),
    })
}
