use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::args::Framework;

/// Every framework paired with whether it can run on this machine.
#[must_use]
pub fn detect_availability() -> Vec<(Framework, bool)> {
    Framework::ALL
        .into_iter()
        .map(|framework| (framework, is_available(framework)))
        .collect()
}

#[must_use]
pub fn is_available(framework: Framework) -> bool {
    framework.is_builtin() || find_binary(framework).is_some()
}

/// Resolves the framework's executable on `PATH`.
#[must_use]
pub fn find_binary(framework: Framework) -> Option<PathBuf> {
    let binary = framework.binary()?;
    let path = std::env::var_os("PATH")?;
    search_path(binary, &path, &executable_suffixes())
}

pub(crate) fn search_path(binary: &str, path: &OsString, suffixes: &[String]) -> Option<PathBuf> {
    std::env::split_paths(path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| {
            suffixes
                .iter()
                .map(move |suffix| dir.join(format!("{binary}{suffix}")))
        })
        .find(|candidate| is_executable(candidate))
}

fn executable_suffixes() -> Vec<String> {
    #[cfg(windows)]
    {
        let mut suffixes = vec![String::new()];
        let pathext = std::env::var("PATHEXT").unwrap_or_else(|_| ".EXE;.CMD;.BAT".to_owned());
        suffixes.extend(
            pathext
                .split(';')
                .filter(|ext| !ext.is_empty())
                .map(str::to_ascii_lowercase),
        );
        suffixes
    }

    #[cfg(not(windows))]
    {
        vec![String::new()]
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
