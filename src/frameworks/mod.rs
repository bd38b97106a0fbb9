//! Load test runners: the built-in engine and wrappers around external tools.
mod builtin;
mod detect;
mod external;
mod traits;

#[cfg(test)]
mod tests;

use crate::args::{Framework, TestType};
use crate::error::ValidationError;
use crate::templates::TemplateManager;

pub use builtin::BuiltinRunner;
pub use detect::{detect_availability, find_binary, is_available};
pub use external::{
    Artillery, ExternalRunner, ExternalTool, JMeter, K6, Locust, OutputFiles,
};
pub use traits::{ExternalCommand, LoadRunner, PreparedTest, RunContext};

/// Runner implementing `framework`. External runners render their scripts
/// through `templates`.
#[must_use]
pub fn runner_for(framework: Framework, templates: &TemplateManager) -> Box<dyn LoadRunner> {
    let templates = templates.clone();
    match framework {
        Framework::Simple => Box::new(BuiltinRunner::simple()),
        Framework::Advanced => Box::new(BuiltinRunner::advanced()),
        Framework::Locust => Box::new(ExternalRunner::new(Locust, templates)),
        Framework::K6 => Box::new(ExternalRunner::new(K6, templates)),
        Framework::Artillery => Box::new(ExternalRunner::new(Artillery, templates)),
        Framework::JMeter => Box::new(ExternalRunner::new(JMeter, templates)),
    }
}

/// Why `framework` refuses to run `test_type`, or `None` when it can.
#[must_use]
pub const fn unsupported_test_type(
    framework: Framework,
    test_type: TestType,
) -> Option<ValidationError> {
    if framework.supports(test_type) {
        return None;
    }
    Some(match framework {
        Framework::Simple => ValidationError::SimpleRunnerUnsupportedType,
        Framework::Advanced
        | Framework::Locust
        | Framework::K6
        | Framework::Artillery
        | Framework::JMeter => ValidationError::ExternalRunnerUnsupportedType {
            framework: framework.display_name(),
        },
    })
}
