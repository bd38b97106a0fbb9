//! Test settings, validated plans and preset storage.
mod apply;
mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use apply::apply_run_args;
pub use store::PresetStore;
pub use types::{TestPlan, TestSettings, parse_target_url, url_for_test_type};
