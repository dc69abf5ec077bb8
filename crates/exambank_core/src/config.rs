//! Runtime settings with environment overrides.

use crate::compile::compiler::PdfLatexCompiler;
use crate::db::Store;
use crate::logging::{default_log_level, init_logging, LoggingError};
use crate::render::converter::PandocConverter;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "EXAMBANK_DB_PATH";
pub const ENV_OUTPUT_DIR: &str = "EXAMBANK_OUTPUT_DIR";
pub const ENV_CONVERTER: &str = "EXAMBANK_CONVERTER";
pub const ENV_COMPILER: &str = "EXAMBANK_COMPILER";
pub const ENV_LOG_LEVEL: &str = "EXAMBANK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "EXAMBANK_LOG_DIR";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// SQLite file holding modules, pools, tasks and exam configs.
    pub db_path: PathBuf,
    /// Where generated exams land.
    pub output_dir: PathBuf,
    pub converter_program: String,
    pub compiler_program: String,
    pub log_level: String,
    /// Must be absolute.
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("exambank.db"),
            output_dir: PathBuf::from("exams"),
            converter_program: "pandoc".to_string(),
            compiler_program: "pdflatex".to_string(),
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join("exambank").join("logs"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Blank values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let default = Self::default();
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Self {
            db_path: value(ENV_DB_PATH).map(PathBuf::from).unwrap_or(default.db_path),
            output_dir: value(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or(default.output_dir),
            converter_program: value(ENV_CONVERTER).unwrap_or(default.converter_program),
            compiler_program: value(ENV_COMPILER).unwrap_or(default.compiler_program),
            log_level: value(ENV_LOG_LEVEL).unwrap_or(default.log_level),
            log_dir: value(ENV_LOG_DIR)
                .map(PathBuf::from)
                .filter(|dir| dir.is_absolute())
                .unwrap_or(default.log_dir),
        }
    }

    pub fn store(&self) -> Store {
        Store::new(&self.db_path)
    }

    pub fn converter(&self) -> PandocConverter {
        PandocConverter::new(&self.converter_program)
    }

    pub fn compiler(&self) -> PdfLatexCompiler {
        PdfLatexCompiler::new(&self.compiler_program)
    }

    pub fn init_logging(&self) -> Result<(), LoggingError> {
        init_logging(&self.log_level, &self.log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ENV_COMPILER, ENV_DB_PATH, ENV_LOG_DIR, ENV_OUTPUT_DIR};
    use std::collections::HashMap;
    use std::path::Path;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        assert_eq!(Config::from_lookup(|_| None), Config::default());
    }

    #[test]
    fn overrides_are_applied() {
        let config = Config::from_lookup(lookup(&[
            (ENV_DB_PATH, "/data/bank.db"),
            (ENV_OUTPUT_DIR, "/data/out"),
            (ENV_COMPILER, "lualatex"),
        ]));
        assert_eq!(config.store().path(), Path::new("/data/bank.db"));
        assert_eq!(config.output_dir, Path::new("/data/out"));
        assert_eq!(config.compiler_program, "lualatex");
        assert_eq!(config.converter().program(), "pandoc");
    }

    #[test]
    fn blank_and_relative_values_fall_back() {
        let config = Config::from_lookup(lookup(&[(ENV_DB_PATH, "   "), (ENV_LOG_DIR, "logs")]));
        let default = Config::default();
        assert_eq!(config.db_path, default.db_path);
        assert_eq!(config.log_dir, default.log_dir);
    }
}
