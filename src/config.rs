use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::sync::OnceLock;

/// Environment variable naming the configuration file.
pub const CONFIG_FILE_VAR: &str = "STUDYLOCK_CONFIG";

/// Configuration file read when [CONFIG_FILE_VAR] is not set.
pub const DEFAULT_CONFIG_FILE: &str = "studylock.toml";

static CONFIG: OnceLock<Figment> = OnceLock::new();

pub fn get_config() -> &'static Figment {
    CONFIG.get_or_init(build_config)
}

/// The configuration file, overridden by `STUDYLOCK_`-prefixed environment variables.
pub fn build_config() -> Figment {
    let file = Env::var(CONFIG_FILE_VAR).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    Figment::new()
        .merge(Toml::file(file))
        .merge(Env::prefixed("STUDYLOCK_").split("_"))
        .merge(Env::prefixed("STUDYLOCK_"))
}
