//! Result type alias for document-store operations

use super::errors::StoreError;

/// Result type alias using [`StoreError`] as the error type
///
/// # Examples
///
/// ```
/// use docstore::domain::{Result, StoreError};
///
/// fn lookup(id: &str) -> Result<String> {
///     if id.is_empty() {
///         return Err(StoreError::InvalidDocument("empty id".to_string()));
///     }
///     Ok(id.to_string())
/// }
/// ```
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::StoreError;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(inner()?, 42);
        Ok(())
    }

    #[test]
    fn test_result_err() {
        let result: Result<()> = Err(StoreError::Cancelled);
        assert!(result.is_err());
    }
}
