//! Terminal presentation: themes, menus, the live dashboard and result tables.
mod menus;
mod progress;
mod results;
pub mod theme;

#[cfg(test)]
mod tests;

pub use menus::{config_summary, framework_menu, test_type_menu, theme_menu};
pub(crate) use menus::table_lines;
pub use progress::{DASHBOARD_HEIGHT, draw_dashboard, spawn_dashboard};
pub use results::{group_thousands, history_lines, results_lines};
pub use theme::{Palette, Role, Theme, ThemeName};
