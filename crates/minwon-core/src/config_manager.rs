//! 설정 파일 관리.
//!
//! 지정된 경로의 JSON 파일로 텔레메트리 설정을 저장/로드한다.
//! 파일이 없으면 기본 설정을 생성해 기록한다.

use crate::config::TelemetryConfig;
use crate::error::CoreError;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// 설정 관리자
///
/// 설정 파일의 로드/저장 및 런타임 설정 변경을 관리한다.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// 현재 설정 (스레드 안전)
    config: Arc<RwLock<TelemetryConfig>>,
    /// 설정 파일 경로
    config_path: PathBuf,
}

impl ConfigManager {
    /// 지정된 경로로 설정 관리자 생성
    ///
    /// 설정 파일이 없으면 기본 설정을 생성하고 저장한다.
    pub fn with_path(config_path: PathBuf) -> Result<Self, CoreError> {
        if let Some(parent) = config_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    CoreError::Config(format!(
                        "설정 디렉토리 생성 실패: {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
                info!("설정 디렉토리 생성: {}", parent.display());
            }
        }

        let config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            let default_config = TelemetryConfig::default_config();
            Self::save_to_file(&config_path, &default_config)?;
            info!("기본 설정 파일 생성: {}", config_path.display());
            default_config
        };

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_path,
        })
    }

    /// 현재 설정 반환 (복제본)
    pub fn get(&self) -> TelemetryConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// 설정 업데이트 및 파일 저장
    pub fn update(&self, new_config: TelemetryConfig) -> Result<(), CoreError> {
        {
            let mut config = self
                .config
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *config = new_config.clone();
        }
        Self::save_to_file(&self.config_path, &new_config)?;
        debug!("설정 저장: {}", self.config_path.display());
        Ok(())
    }

    /// 설정 파일 경로
    pub fn path(&self) -> &PathBuf {
        &self.config_path
    }

    fn load_from_file(path: &PathBuf) -> Result<TelemetryConfig, CoreError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("설정 파일 읽기 실패: {}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&contents)
            .map_err(|e| CoreError::Config(format!("설정 파일 파싱 실패: {}: {}", path.display(), e)))?;
        debug!("설정 로드: {}", path.display());
        Ok(config)
    }

    fn save_to_file(path: &PathBuf, config: &TelemetryConfig) -> Result<(), CoreError> {
        let contents = serde_json::to_string_pretty(config)?;
        fs::write(path, contents)
            .map_err(|e| CoreError::Config(format!("설정 파일 쓰기 실패: {}: {}", path.display(), e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Environment;

    #[test]
    fn creates_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");

        let manager = ConfigManager::with_path(path.clone()).unwrap();
        assert!(path.exists());
        assert_eq!(manager.get().dispatch.flush_threshold, 10);
    }

    #[test]
    fn update_persists_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");

        let manager = ConfigManager::with_path(path.clone()).unwrap();
        let mut config = manager.get();
        config.environment = Environment::Production;
        config.dispatch.flush_threshold = 25;
        manager.update(config).unwrap();

        // 새 관리자로 다시 로드 → 변경 내용이 유지되어야 한다
        let reloaded = ConfigManager::with_path(path).unwrap();
        assert!(reloaded.get().environment.is_production());
        assert_eq!(reloaded.get().dispatch.flush_threshold, 25);
    }

    #[test]
    fn corrupt_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("telemetry.json");
        fs::write(&path, "{ not json").unwrap();

        let result = ConfigManager::with_path(path);
        assert!(matches!(result, Err(CoreError::Config(_))));
    }
}
