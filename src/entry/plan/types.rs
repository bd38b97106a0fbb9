use std::path::PathBuf;

use crate::args::ExportFormat;
use crate::session::Session;

pub(in crate::entry) enum Mode {
    Shell,
    Run {
        exports: Vec<ExportFormat>,
        output: Option<PathBuf>,
    },
    Frameworks,
    Themes,
}

/// Resolved session and what to do with it.
pub(in crate::entry) struct RunPlan {
    pub(super) session: Session,
    pub(super) mode: Mode,
}
