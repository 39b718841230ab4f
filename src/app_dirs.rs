use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/keycadence`, or the platform data dir without a HOME
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("keycadence"),
            )
        } else {
            ProjectDirs::from("", "", "keycadence")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }

    pub fn export_dir() -> PathBuf {
        Self::state_dir().unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_dir() -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join("logs"))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_is_inside_export_dir() {
        if AppDirs::state_dir().is_some() {
            assert!(AppDirs::log_dir().starts_with(AppDirs::export_dir()));
        }
    }
}
