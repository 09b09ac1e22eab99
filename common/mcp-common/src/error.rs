//! Protocol-level error helpers
//!
//! These errors abort a tool call. Failures the caller should be able to
//! inspect and react to belong in the result instead (see
//! [`crate::result::text_error`]).

use rmcp::ErrorData as McpError;

/// Create an invalid params error with a message
///
/// Use this when the tool receives arguments it cannot act on.
///
/// # Example
///
/// ```rust,ignore
/// use mcp_common::invalid_params;
///
/// if sql.trim().is_empty() {
///     return Err(invalid_params("sql must not be empty"));
/// }
/// ```
pub fn invalid_params(message: impl Into<String>) -> McpError {
    McpError::invalid_params(message.into(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::ErrorCode;

    #[test]
    fn test_invalid_params() {
        let err = invalid_params("bad param");
        assert_eq!(err.code, ErrorCode::INVALID_PARAMS);
        assert!(err.message.contains("bad param"));
    }
}
