//! Script templates for the external frameworks.
mod render;
mod vars;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use crate::args::Framework;
use crate::config::TestPlan;
use crate::error::{AppError, AppResult, ConfigError};

pub use render::render;
pub use vars::context_vars;
pub(crate) use vars::{DEFAULT_GRAPHQL_QUERY, DEFAULT_REQUEST_BODY, DEFAULT_TEST_MESSAGE};

struct Bundled {
    framework: Framework,
    name: &'static str,
    text: &'static str,
}

const BUNDLED: [Bundled; 11] = [
    Bundled {
        framework: Framework::Locust,
        name: "web_site.py",
        text: include_str!("../../templates/locust/web_site.py"),
    },
    Bundled {
        framework: Framework::Locust,
        name: "api_endpoint.py",
        text: include_str!("../../templates/locust/api_endpoint.py"),
    },
    Bundled {
        framework: Framework::Locust,
        name: "telegram_webhook.py",
        text: include_str!("../../templates/locust/telegram_webhook.py"),
    },
    Bundled {
        framework: Framework::Locust,
        name: "graphql_endpoint.py",
        text: include_str!("../../templates/locust/graphql_endpoint.py"),
    },
    Bundled {
        framework: Framework::K6,
        name: "web_site.js",
        text: include_str!("../../templates/k6/web_site.js"),
    },
    Bundled {
        framework: Framework::K6,
        name: "api_endpoint.js",
        text: include_str!("../../templates/k6/api_endpoint.js"),
    },
    Bundled {
        framework: Framework::K6,
        name: "telegram_webhook.js",
        text: include_str!("../../templates/k6/telegram_webhook.js"),
    },
    Bundled {
        framework: Framework::K6,
        name: "graphql_endpoint.js",
        text: include_str!("../../templates/k6/graphql_endpoint.js"),
    },
    Bundled {
        framework: Framework::K6,
        name: "default.js",
        text: include_str!("../../templates/k6/default.js"),
    },
    Bundled {
        framework: Framework::Artillery,
        name: "default.yml",
        text: include_str!("../../templates/artillery/default.yml"),
    },
    Bundled {
        framework: Framework::JMeter,
        name: "default.jmx",
        text: include_str!("../../templates/jmeter/default.jmx"),
    },
];

/// Script file extension used by each external framework.
#[must_use]
pub const fn script_extension(framework: Framework) -> &'static str {
    match framework {
        Framework::Locust => "py",
        Framework::K6 | Framework::Simple | Framework::Advanced => "js",
        Framework::Artillery => "yml",
        Framework::JMeter => "jmx",
    }
}

const fn fallback_name(framework: Framework) -> &'static str {
    match framework {
        Framework::Locust => "web_site.py",
        Framework::K6 | Framework::Simple | Framework::Advanced => "default.js",
        Framework::Artillery => "default.yml",
        Framework::JMeter => "default.jmx",
    }
}

/// Looks templates up in an optional override directory first, then in the
/// set compiled into the binary.
#[derive(Debug, Clone, Default)]
pub struct TemplateManager {
    override_dir: Option<PathBuf>,
}

impl TemplateManager {
    #[must_use]
    pub const fn new(override_dir: Option<PathBuf>) -> Self {
        Self { override_dir }
    }

    /// Overrides live in `templates/` next to the preset directory.
    #[must_use]
    pub fn for_config_dir(config_dir: &Path) -> Self {
        Self::new(config_dir.parent().map(|parent| parent.join("templates")))
    }

    fn override_path(&self, framework: Framework, name: &str) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|dir| dir.join(framework.as_str()).join(name))
            .filter(|path| path.is_file())
    }

    /// Sorted names of every template available for `framework`.
    #[must_use]
    pub fn list(&self, framework: Framework) -> Vec<String> {
        let mut names: Vec<String> = BUNDLED
            .iter()
            .filter(|item| item.framework == framework)
            .map(|item| item.name.to_owned())
            .collect();
        if let Some(dir) = self.override_dir.as_ref()
            && let Ok(entries) = std::fs::read_dir(dir.join(framework.as_str()))
        {
            names.extend(
                entries
                    .filter_map(Result::ok)
                    .filter(|entry| entry.path().is_file())
                    .filter_map(|entry| entry.file_name().to_str().map(str::to_owned)),
            );
        }
        names.sort();
        names.dedup();
        names
    }

    /// # Errors
    ///
    /// Returns an error when the template is unknown or the override file
    /// cannot be read.
    pub fn load(&self, framework: Framework, name: &str) -> AppResult<String> {
        if let Some(path) = self.override_path(framework, name) {
            tracing::debug!("Using template override {}", path.display());
            return std::fs::read_to_string(&path).map_err(|err| {
                AppError::config(ConfigError::ReadTemplate { path, source: err })
            });
        }
        BUNDLED
            .iter()
            .find(|item| item.framework == framework && item.name == name)
            .map(|item| item.text.to_owned())
            .ok_or_else(|| {
                AppError::config(ConfigError::TemplateNotFound {
                    framework: framework.as_str(),
                    name: name.to_owned(),
                })
            })
    }

    /// Picks the template for the plan's test type, falling back to the
    /// framework default, and renders it.
    ///
    /// # Errors
    ///
    /// Returns an error when no template exists or rendering fails.
    pub fn render_for(&self, plan: &TestPlan) -> AppResult<String> {
        let framework = plan.framework;
        let specific = format!(
            "{}.{}",
            plan.test_type.template_stem(),
            script_extension(framework)
        );
        let name = if self.list(framework).contains(&specific) {
            specific
        } else {
            fallback_name(framework).to_owned()
        };
        tracing::debug!("Rendering {} template {}", framework, name);
        let text = self.load(framework, &name)?;
        render(&text, &context_vars(plan)).map_err(AppError::config)
    }
}
