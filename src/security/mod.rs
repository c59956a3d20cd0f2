/*!
 * # Security Primitives
 *
 * Pure building blocks shared by the middleware and validation layers:
 * input sanitization, password strength checking, and upload metadata
 * policy enforcement. Nothing in this module performs I/O.
 */

pub mod file_guard;
pub mod password;
pub mod sanitize;

pub use file_guard::{FileDescriptor, FilePolicy, FileRejection};
pub use password::{check_strength, PasswordStrength};
