use std::path::PathBuf;

pub(crate) const DEFAULT_THEME: &str = "gemini";

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("chakload/", env!("CARGO_PKG_VERSION"));

pub(crate) fn default_config_dir() -> PathBuf {
    default_base_dir().join("configs")
}

fn default_base_dir() -> PathBuf {
    if let Some(home) = user_home_dir() {
        return home.join(".chakload");
    }

    PathBuf::from(".chakload")
}

fn user_home_dir() -> Option<PathBuf> {
    #[cfg(windows)]
    {
        if let Some(value) = std::env::var_os("USERPROFILE") {
            return Some(PathBuf::from(value));
        }
        if let (Some(drive), Some(path)) =
            (std::env::var_os("HOMEDRIVE"), std::env::var_os("HOMEPATH"))
        {
            let mut full = PathBuf::from(drive);
            full.push(path);
            return Some(full);
        }
    }

    std::env::var_os("HOME").map(PathBuf::from)
}
