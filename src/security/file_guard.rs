//! Declarative checks on uploaded-file metadata. The guard only sees the
//! declared name, MIME type and size; bytes are never inspected here, so a
//! spoofed declaration can pass. This is a first advisory layer, not the
//! sole control on uploads.

use serde::Deserialize;
use thiserror::Error;

/// Extensions that are never accepted regardless of policy.
const DENIED_EXTENSIONS: &[&str] = &[
    "exe", "bat", "cmd", "com", "scr", "pif", "msi", "dll", "sh", "bash", "php", "phtml", "pl",
    "py", "rb", "jar", "vbs", "js", "ps1",
];

/// Metadata describing an uploaded file, independent of its content.
#[derive(Debug, Clone, Deserialize)]
pub struct FileDescriptor {
    pub name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Upload policy for one endpoint kind. Empty allow-lists mean
/// "no restriction on that axis".
#[derive(Debug, Clone)]
pub struct FilePolicy {
    pub allowed_mime_types: Vec<String>,
    pub max_size_bytes: u64,
    pub allowed_extensions: Vec<String>,
}

impl FilePolicy {
    /// Photos attached to customer testimonials.
    pub fn testimonial_photo() -> Self {
        Self {
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
            ],
            max_size_bytes: 5 * 1024 * 1024,
            allowed_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
            ],
        }
    }

    /// Documents attached to invoices.
    pub fn invoice_attachment() -> Self {
        Self {
            allowed_mime_types: vec!["application/pdf".to_string()],
            max_size_bytes: 10 * 1024 * 1024,
            allowed_extensions: vec!["pdf".to_string()],
        }
    }

    /// Fallback policy for other admin uploads.
    pub fn general_upload() -> Self {
        Self {
            allowed_mime_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "application/pdf".to_string(),
            ],
            max_size_bytes: 10 * 1024 * 1024,
            allowed_extensions: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "webp".to_string(),
                "pdf".to_string(),
            ],
        }
    }
}

/// Why a file descriptor was rejected. The `Display` text is the
/// human-readable reason surfaced to the client.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FileRejection {
    #[error("File name is required")]
    MissingName,

    #[error("File name is not allowed")]
    ForbiddenName,

    #[error("File type '{0}' is not allowed")]
    TypeNotAllowed(String),

    #[error("File exceeds the maximum size of {limit_mb} MB")]
    TooLarge { limit_mb: u64 },

    #[error("File extension '{0}' is not allowed")]
    ExtensionNotAllowed(String),
}

/// Validate upload metadata against a policy. Checks run in a fixed order
/// and short-circuit on the first failure: name, MIME type, size, extension.
pub fn check(descriptor: &FileDescriptor, policy: &FilePolicy) -> Result<(), FileRejection> {
    let name = descriptor.name.trim();
    if name.is_empty() {
        return Err(FileRejection::MissingName);
    }
    if name.contains('\0') || name.contains("..") {
        return Err(FileRejection::ForbiddenName);
    }
    let lower_name = name.to_lowercase();
    if DENIED_EXTENSIONS
        .iter()
        .any(|ext| lower_name.ends_with(&format!(".{ext}")))
    {
        return Err(FileRejection::ForbiddenName);
    }

    if !policy.allowed_mime_types.is_empty()
        && !policy
            .allowed_mime_types
            .iter()
            .any(|m| m == &descriptor.mime_type)
    {
        return Err(FileRejection::TypeNotAllowed(descriptor.mime_type.clone()));
    }

    if descriptor.size_bytes > policy.max_size_bytes {
        return Err(FileRejection::TooLarge {
            limit_mb: policy.max_size_bytes / (1024 * 1024),
        });
    }

    if !policy.allowed_extensions.is_empty() {
        let extension = lower_name.rsplit('.').next().unwrap_or_default();
        if lower_name == extension || !policy.allowed_extensions.iter().any(|e| e == extension) {
            return Err(FileRejection::ExtensionNotAllowed(extension.to_string()));
        }
    }

    Ok(())
}
