use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
    Unknown,
}

pub fn detect() -> Platform {
    match std::env::consts::OS {
        "macos" => Platform::MacOS,
        "linux" => Platform::Linux,
        "windows" => Platform::Windows,
        _ => Platform::Unknown,
    }
}

pub fn home_dir() -> Option<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .or_else(|| {
            std::env::var_os("HOME")
                .or_else(|| std::env::var_os("USERPROFILE"))
                .map(PathBuf::from)
        })
}

/// Interpreter names probed on PATH, in order of preference.
pub fn python_candidates(platform: Platform) -> &'static [&'static str] {
    match platform {
        // python3.exe is usually the Microsoft Store shim
        Platform::Windows => &["python", "py", "python3"],
        Platform::MacOS | Platform::Linux | Platform::Unknown => &["python3", "python"],
    }
}

/// Interpreter inside a virtual environment directory.
pub fn venv_interpreter(venv: &Path, platform: Platform) -> PathBuf {
    match platform {
        Platform::Windows => venv.join("Scripts").join("python.exe"),
        Platform::MacOS | Platform::Linux | Platform::Unknown => venv.join("bin").join("python"),
    }
}

/// Expand a leading `~` or `~/` against the home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn venv_interpreter_layout() {
        let venv = Path::new("/work/.venv");
        assert_eq!(
            venv_interpreter(venv, Platform::Linux),
            PathBuf::from("/work/.venv/bin/python")
        );
        assert_eq!(
            venv_interpreter(venv, Platform::Windows),
            Path::new("/work/.venv").join("Scripts").join("python.exe")
        );
    }

    #[test]
    fn tilde_expands_only_at_start() {
        let untouched = Path::new("/var/~cache");
        assert_eq!(expand_tilde(untouched), untouched);

        if let Some(home) = home_dir() {
            assert_eq!(expand_tilde(Path::new("~/.envsnap")), home.join(".envsnap"));
            assert_eq!(expand_tilde(Path::new("~")), home);
        }
    }

    #[test]
    fn unix_prefers_python3() {
        assert_eq!(python_candidates(Platform::Linux)[0], "python3");
    }
}
