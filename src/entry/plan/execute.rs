use std::io::{self, Write};
use std::path::Path;

use crate::args::ExportFormat;
use crate::error::AppResult;
use crate::execution::run_test;
use crate::export::export_record;
use crate::frameworks::detect_availability;
use crate::repl::run_shell;
use crate::session::Session;
use crate::system::banner;
use crate::ui::{Role, framework_menu, results_lines, theme_menu};

use super::types::{Mode, RunPlan};

pub(in crate::entry) async fn execute_plan(plan: RunPlan) -> AppResult<()> {
    let RunPlan { session, mode } = plan;
    match mode {
        Mode::Shell => run_shell(session).await,
        Mode::Run { exports, output } => run_once(session, &exports, output.as_deref()).await,
        Mode::Frameworks => print_lines(&framework_menu(session.theme, &detect_availability())),
        Mode::Themes => print_lines(&theme_menu(session.theme)),
    }
}

fn print_lines(lines: &[String]) -> AppResult<()> {
    let mut out = io::stdout().lock();
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// `chakload run`: one test, the results table, then the requested exports.
async fn run_once(
    mut session: Session,
    exports: &[ExportFormat],
    output: Option<&Path>,
) -> AppResult<()> {
    let theme = session.theme;
    banner::print_banner(theme);
    println!();

    let id = run_test(&mut session, &mut io::stdout()).await?;
    let Some(record) = session.find(id) else {
        return Ok(());
    };
    print_lines(&results_lines(theme, record))?;

    for format in exports {
        let path = export_record(record, *format, output, &session.output_dir, theme).await?;
        println!(
            "{}",
            theme.paint(Role::Success, &format!("Results exported to {}", path.display()))
        );
    }
    Ok(())
}
