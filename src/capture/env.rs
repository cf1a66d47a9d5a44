use std::collections::HashMap;

/// Read access to environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the running process.
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        // non-utf8 values are kept lossily rather than reported as unset
        std::env::var_os(key).map(|v| v.to_string_lossy().into_owned())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}
