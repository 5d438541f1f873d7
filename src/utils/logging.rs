// 优化器日志
//
// 日志写入按大小轮转的文件，异步写出。全局只保留一个句柄，退出前由 shutdown 刷盘。

use std::sync::{Mutex, MutexGuard, PoisonError};

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

use crate::config::LogConfig;
use crate::core::FuseResult;

static LOGGER_HANDLE: Mutex<Option<LoggerHandle>> = Mutex::new(None);

/// 取出句柄槽位，持锁线程崩溃后槽位内容仍然可用
fn handle_slot() -> MutexGuard<'static, Option<LoggerHandle>> {
    LOGGER_HANDLE.lock().unwrap_or_else(PoisonError::into_inner)
}

fn start_logger(config: &LogConfig) -> FuseResult<LoggerHandle> {
    let spec = FileSpec::default().basename(&config.file).directory(&config.dir);
    let handle = Logger::try_with_str(&config.level)?
        .log_to_file(spec)
        .rotate(
            Criterion::Size(config.max_file_size),
            Naming::Numbers,
            Cleanup::KeepLogFiles(config.max_files),
        )
        .write_mode(WriteMode::Async)
        .append()
        .start()?;
    Ok(handle)
}

/// 按 `[log]` 配置启动文件日志
///
/// 已经启动时不做任何事，第一次的配置继续生效。
/// 级别字符串非法或日志目录不可写时返回错误。
///
/// ```no_run
/// use streamfuse::config::Config;
/// use streamfuse::utils::logging;
///
/// let config = Config::default();
/// logging::init(&config.log).expect("日志初始化失败");
/// ```
pub fn init(config: &LogConfig) -> FuseResult<()> {
    let mut slot = handle_slot();
    if slot.is_none() {
        *slot = Some(start_logger(config)?);
        log::info!("优化器日志写入 {}/{}", config.dir, config.file);
    }
    Ok(())
}

/// 刷出缓冲中的日志并释放句柄，未启动时什么也不做
pub fn shutdown() {
    if let Some(handle) = handle_slot().take() {
        handle.flush();
    }
}

pub fn is_initialized() -> bool {
    handle_slot().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_logging_init_and_shutdown() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let config = LogConfig {
            dir: dir.path().to_string_lossy().into_owned(),
            level: "debug".to_string(),
            ..LogConfig::default()
        };

        let result = init(&config);
        assert!(result.is_ok(), "日志初始化失败: {:?}", result.err());
        assert!(is_initialized());

        // 第二次调用沿用已有句柄
        assert!(init(&config).is_ok());

        log::debug!("融合规则命中");

        shutdown();
        assert!(!is_initialized());
    }

    #[test]
    #[serial]
    fn test_poisoned_handle_is_recovered() {
        let _ = std::thread::spawn(|| {
            let _slot = LOGGER_HANDLE.lock();
            panic!("持锁线程崩溃");
        })
        .join();
        assert!(LOGGER_HANDLE.is_poisoned());

        assert!(!is_initialized());
        shutdown();
        assert!(!is_initialized());
    }
}
