use super::{ConfigError, ExportError, MetricsError, RunnerError, ValidationError};

impl From<&'static str> for ValidationError {
    fn from(message: &'static str) -> Self {
        ValidationError::TestExpectation { message }
    }
}

impl From<String> for ValidationError {
    fn from(value: String) -> Self {
        ValidationError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for RunnerError {
    fn from(message: &'static str) -> Self {
        RunnerError::TestExpectation { message }
    }
}

impl From<String> for RunnerError {
    fn from(value: String) -> Self {
        RunnerError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for MetricsError {
    fn from(message: &'static str) -> Self {
        MetricsError::TestExpectation { message }
    }
}

impl From<String> for MetricsError {
    fn from(value: String) -> Self {
        MetricsError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ExportError {
    fn from(message: &'static str) -> Self {
        ExportError::TestExpectation { message }
    }
}

impl From<String> for ExportError {
    fn from(value: String) -> Self {
        ExportError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
