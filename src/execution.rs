//! Drives one test from the current session settings to a recorded run.
use std::io::Write;

use chrono::Local;
use tokio::sync::watch;

use crate::error::AppResult;
use crate::frameworks::{RunContext, runner_for};
use crate::metrics::LiveStats;
use crate::session::Session;
use crate::shutdown_handlers::{setup_signal_shutdown_handler, shutdown_channel};
use crate::ui::{Role, spawn_dashboard};

/// Validates the session settings, runs the test and appends the outcome to
/// the history. Ctrl+C or SIGTERM stops the run early; whatever was
/// collected up to that point is still recorded.
///
/// # Errors
///
/// Returns an error when the settings are incomplete, the framework cannot
/// run the plan, or the run itself fails.
pub async fn run_test<W: Write>(session: &mut Session, out: &mut W) -> AppResult<u64> {
    let plan = session.settings.to_plan()?;
    let runner = runner_for(plan.framework, &session.templates);
    let prepared = runner.prepare(&plan).await?;
    let theme = session.theme;

    writeln!(
        out,
        "{}",
        theme.paint(
            Role::Info,
            &format!(
                "Starting {} test: {} {} with {} users for {}s (ramp-up {}s)",
                plan.framework.display_name(),
                plan.test_type,
                plan.url,
                plan.users,
                plan.duration.as_secs(),
                plan.rampup.as_secs()
            ),
        )
    )?;
    out.flush()?;

    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let (live_tx, dashboard) = if session.dashboard {
        let (live_tx, live_rx) = watch::channel(LiveStats {
            target: plan.duration,
            ..LiveStats::default()
        });
        let title = format!("{} | {}", plan.framework.display_name(), plan.url);
        (Some(live_tx), Some(spawn_dashboard(theme, title, live_rx)))
    } else {
        (None, None)
    };

    let started_at = Local::now();
    tracing::info!(
        "Running {} against {} with {} users",
        plan.framework,
        plan.url,
        plan.users
    );
    let outcome = runner
        .execute(
            &prepared,
            &plan,
            RunContext {
                shutdown_tx,
                live_tx,
            },
        )
        .await;

    signal_handle.abort();
    if let Some(dashboard) = dashboard
        && let Err(err) = dashboard.await
    {
        tracing::debug!("Dashboard task ended abnormally: {}", err);
    }

    let results = outcome?;
    let id = session.record(started_at, session.settings.clone(), results);
    tracing::info!("Recorded run #{}", id);
    Ok(id)
}
