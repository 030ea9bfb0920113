//! Path utilities for the AudioSwitch agent.
//!
//! Defines standard locations for configuration, preferences, and logs.

use std::path::PathBuf;

/// Base data directory for the agent.
///
/// On Windows: `%APPDATA%\AudioSwitch` (per-user tray agent)
/// On other platforms: `~/.local/share/audioswitch` (for development)
pub fn data_dir() -> PathBuf {
    #[cfg(windows)]
    {
        dirs::config_dir()
            .map(|p| p.join("AudioSwitch"))
            .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData\AudioSwitch"))
    }

    #[cfg(not(windows))]
    {
        // For development on macOS/Linux
        directories::ProjectDirs::from("com", "AudioSwitch", "AudioSwitch")
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("."))
                    .join(".local")
                    .join("share")
                    .join("audioswitch")
            })
    }
}

/// Configuration file path.
///
/// On Windows: `%APPDATA%\AudioSwitch\config.toml`
pub fn config_file() -> PathBuf {
    // Check environment variable first
    if let Ok(path) = std::env::var("AUDIOSWITCH_CONFIG") {
        return PathBuf::from(path);
    }

    data_dir().join("config.toml")
}

/// Persisted user preferences (preferred device and behaviour flags).
///
/// On Windows: `%APPDATA%\AudioSwitch\preferences.json`
pub fn preferences_file() -> PathBuf {
    data_dir().join("preferences.json")
}

/// Log directory.
///
/// On Windows: `%APPDATA%\AudioSwitch\logs`
pub fn log_dir() -> std::io::Result<PathBuf> {
    let path = data_dir().join("logs");
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// Ensure all required directories exist.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(data_dir())?;
    std::fs::create_dir_all(log_dir()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_valid() {
        // Just ensure these don't panic
        let _ = data_dir();
        let _ = config_file();
        let _ = preferences_file();
    }

    #[test]
    fn test_preferences_file_lives_in_data_dir() {
        assert!(preferences_file().starts_with(data_dir()));
    }
}
