use serde::{Deserialize, Serialize};

/// Результат выполнения UseCase
pub type UseCaseResult<T> = Result<T, UseCaseError>;

/// Ошибка выполнения UseCase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UseCaseError {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    /// Можно повторить запрос без изменения входных данных
    #[serde(default)]
    pub retryable: bool,
}

impl UseCaseError {
    pub const VALIDATION: &'static str = "VALIDATION_ERROR";
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const INTERNAL: &'static str = "INTERNAL_ERROR";
    pub const EXTERNAL: &'static str = "EXTERNAL_ERROR";
    pub const CONFLICT: &'static str = "CONFLICT";

    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            retryable: false,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(Self::VALIDATION, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(Self::NOT_FOUND, message)
    }

    /// Данные изменены другим запросом (устаревшая версия)
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(Self::CONFLICT, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(Self::INTERNAL, message)
    }

    /// Ошибка внешней системы (каталог недоступен и т.п.): запрос можно повторить
    pub fn external(message: impl Into<String>) -> Self {
        Self {
            retryable: true,
            ..Self::new(Self::EXTERNAL, message)
        }
    }

    pub fn is_validation(&self) -> bool {
        self.code == Self::VALIDATION
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for UseCaseError {}

impl From<anyhow::Error> for UseCaseError {
    fn from(err: anyhow::Error) -> Self {
        UseCaseError::internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_external_errors_are_retryable() {
        assert!(UseCaseError::external("catalog down").retryable);
        assert!(!UseCaseError::validation("no supplier").retryable);
    }

    #[test]
    fn test_display_includes_details() {
        let e = UseCaseError::not_found("Producto").with_details("p1");
        assert_eq!(e.to_string(), "[NOT_FOUND] Producto: p1");
    }
}
