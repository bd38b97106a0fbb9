//! State of one interactive session: current settings, theme and the runs
//! made so far.
use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::config::{PresetStore, TestSettings};
use crate::metrics::TestResults;
use crate::templates::TemplateManager;
use crate::ui::Theme;

/// A finished run as kept in the session history.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    pub id: u64,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub settings: TestSettings,
    pub results: TestResults,
}

#[derive(Debug)]
pub struct Session {
    pub settings: TestSettings,
    pub presets: PresetStore,
    pub theme: Theme,
    pub history: Vec<RunRecord>,
    pub output_dir: PathBuf,
    pub templates: TemplateManager,
    /// Live dashboard allowed (TTY and no `--no-ui`).
    pub dashboard: bool,
}

impl Session {
    #[must_use]
    pub fn new(presets: PresetStore, theme: Theme, output_dir: PathBuf) -> Self {
        let templates = TemplateManager::for_config_dir(presets.dir());
        Self {
            settings: TestSettings::default(),
            presets,
            theme,
            history: Vec::new(),
            output_dir,
            templates,
            dashboard: false,
        }
    }

    #[must_use]
    pub fn last(&self) -> Option<&RunRecord> {
        self.history.last()
    }

    #[must_use]
    pub fn find(&self, id: u64) -> Option<&RunRecord> {
        self.history.iter().find(|record| record.id == id)
    }

    #[must_use]
    pub fn next_id(&self) -> u64 {
        self.history
            .last()
            .map_or(1, |record| record.id.saturating_add(1))
    }

    /// Appends a finished run and returns its id.
    pub fn record(
        &mut self,
        started_at: DateTime<Local>,
        settings: TestSettings,
        results: TestResults,
    ) -> u64 {
        let id = self.next_id();
        let record = RunRecord {
            id,
            started_at,
            finished_at: Local::now(),
            settings,
            results,
        };
        self.history.push(record);
        id
    }
}
