//! 配置加载
//!
//! 从 TOML 文件加载优化器与日志配置，缺省字段使用默认值。

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::{FuseError, FuseResult};
use crate::planner::rewrite::DEFAULT_MAX_DEPTH;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub optimizer: OptimizerConfig,
    pub log: LogConfig,
}

/// 优化器配置
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 单次优化允许的最大重写步数
    pub max_depth: usize,
    /// 是否记录规则应用轨迹
    pub enable_trace: bool,
    /// 禁用的规则名称，例如 "ScanScanFusionRule"
    pub disabled_rules: Vec<String>,
    /// 额外的外部效应调用模式（正则）
    pub effect_patterns: Vec<String>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            enable_trace: false,
            disabled_rules: Vec::new(),
            effect_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub dir: String,
    pub file: String,
    pub max_file_size: u64,
    pub max_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: "logs".to_string(),
            file: "streamfuse".to_string(),
            max_file_size: 100 * 1024 * 1024, // 100MB
            max_files: 5,
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> FuseResult<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> FuseResult<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> FuseResult<()> {
        if self.log.max_files == 0 {
            return Err(FuseError::config("log.max_files 必须大于 0"));
        }
        if self.log.max_file_size == 0 {
            return Err(FuseError::config("log.max_file_size 必须大于 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.optimizer.max_depth, 100);
        assert!(!config.optimizer.enable_trace);
        assert_eq!(config.log.level, "info");
        assert_eq!(config.log.max_files, 5);
    }

    #[test]
    fn test_config_load_save() {
        let temp_file = NamedTempFile::new().expect("Failed to create temporary file");

        let mut config = Config::default();
        config.optimizer.disabled_rules.push("ScanScanFusionRule".to_string());
        config.optimizer.effect_patterns.push("^db_".to_string());
        config.save(temp_file.path()).expect("Failed to save config");

        let loaded = Config::load(temp_file.path()).expect("Failed to load config from temporary file");
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"[optimizer]\nmax_depth = 8\n")
            .expect("Failed to write TOML content to temporary file");

        let loaded = Config::load(temp_file.path()).expect("Failed to load config");
        assert_eq!(loaded.optimizer.max_depth, 8);
        assert!(loaded.optimizer.disabled_rules.is_empty());
        assert_eq!(loaded.log, LogConfig::default());
    }

    #[test]
    fn test_invalid_config() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temporary file");
        temp_file
            .write_all(b"[log]\nmax_files = 0\n")
            .expect("Failed to write TOML content to temporary file");
        assert!(matches!(Config::load(temp_file.path()), Err(FuseError::Config(_))));

        assert!(Config::load("/nonexistent/streamfuse.toml").is_err());
    }
}
