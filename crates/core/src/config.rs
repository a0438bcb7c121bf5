//! 설정 관리 — natcheck.toml 파싱 및 런타임 설정
//!
//! [`NatcheckConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`NATCHECK_MANAGER_ENDPOINT=https://...` 형식)
//! 3. 설정 파일 (`natcheck.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), natcheck_core::error::NatcheckError> {
//! use natcheck_core::config::NatcheckConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = NatcheckConfig::load("natcheck.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = NatcheckConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, NatcheckError};

/// Natcheck 통합 설정
///
/// `natcheck.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NatcheckConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 매니저 API 설정
    #[serde(default)]
    pub manager: ManagerConfig,
    /// 검증 시나리오 설정
    #[serde(default)]
    pub verify: VerifyConfig,
}

impl NatcheckConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, NatcheckError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, NatcheckError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                NatcheckError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                NatcheckError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, NatcheckError> {
        toml::from_str(toml_str).map_err(|e| {
            NatcheckError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `NATCHECK_{SECTION}_{FIELD}`
    /// 예: `NATCHECK_MANAGER_ENDPOINT=https://nsx.local`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "NATCHECK_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "NATCHECK_GENERAL_LOG_FORMAT");

        // Manager
        override_string(&mut self.manager.endpoint, "NATCHECK_MANAGER_ENDPOINT");
        override_string(&mut self.manager.username, "NATCHECK_MANAGER_USERNAME");
        override_string(&mut self.manager.password, "NATCHECK_MANAGER_PASSWORD");
        override_u64(
            &mut self.manager.request_timeout_secs,
            "NATCHECK_MANAGER_REQUEST_TIMEOUT_SECS",
        );
        override_bool(
            &mut self.manager.accept_invalid_certs,
            "NATCHECK_MANAGER_ACCEPT_INVALID_CERTS",
        );

        // Verify
        override_string(
            &mut self.verify.router_display_name,
            "NATCHECK_VERIFY_ROUTER_DISPLAY_NAME",
        );
        override_string(
            &mut self.verify.edge_cluster_name,
            "NATCHECK_VERIFY_EDGE_CLUSTER_NAME",
        );
        override_string(&mut self.verify.router_id, "NATCHECK_VERIFY_ROUTER_ID");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), NatcheckError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // endpoint 검증
        if !self.manager.endpoint.is_empty()
            && !self.manager.endpoint.starts_with("http://")
            && !self.manager.endpoint.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                field: "manager.endpoint".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            }
            .into());
        }

        if self.manager.request_timeout_secs == 0 || self.manager.request_timeout_secs > 300 {
            return Err(ConfigError::InvalidValue {
                field: "manager.request_timeout_secs".to_owned(),
                reason: "must be 1-300".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 매니저 API 설정
///
/// NAT 규칙을 소유한 네트워크 매니저의 HTTP API 접속 정보입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// API 엔드포인트 (예: `https://nsx-manager.local`)
    pub endpoint: String,
    /// Basic 인증 사용자명
    pub username: String,
    /// Basic 인증 비밀번호
    pub password: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 자체 서명 인증서 허용 여부
    pub accept_invalid_certs: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: "admin".to_owned(),
            password: String::new(),
            request_timeout_secs: 30,
            accept_invalid_certs: false,
        }
    }
}

/// 검증 시나리오 설정
///
/// 시나리오가 사용할 라우터 픽스처 파라미터입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// 라우터 픽스처 표시 이름
    pub router_display_name: String,
    /// 엣지 클러스터 표시 이름
    pub edge_cluster_name: String,
    /// 규칙을 부착할 논리 라우터 ID
    pub router_id: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            router_display_name: "tier1_router".to_owned(),
            edge_cluster_name: "EDGECLUSTER1".to_owned(),
            router_id: String::new(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_sane_values() {
        let config = NatcheckConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.manager.request_timeout_secs, 30);
        assert!(!config.manager.accept_invalid_certs);
        assert_eq!(config.verify.router_display_name, "tier1_router");
    }

    #[test]
    fn default_config_passes_validation() {
        let config = NatcheckConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = NatcheckConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.manager.username, "admin");
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[manager]
endpoint = "https://nsx.local"
"#;
        let config = NatcheckConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.manager.endpoint, "https://nsx.local");
        assert_eq!(config.manager.request_timeout_secs, 30);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "pretty"

[manager]
endpoint = "https://nsx-manager.corp.local"
username = "auditor"
password = "secret"
request_timeout_secs = 60
accept_invalid_certs = true

[verify]
router_display_name = "edge_t1"
edge_cluster_name = "EC-PROD"
router_id = "rtr-77"
"#;
        let config = NatcheckConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.manager.username, "auditor");
        assert_eq!(config.manager.request_timeout_secs, 60);
        assert!(config.manager.accept_invalid_certs);
        assert_eq!(config.verify.edge_cluster_name, "EC-PROD");
        assert_eq!(config.verify.router_id, "rtr-77");
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let result = NatcheckConfig::parse("invalid = [[[toml");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            NatcheckError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = NatcheckConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = NatcheckConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_non_http_endpoint() {
        let mut config = NatcheckConfig::default();
        config.manager.endpoint = "nsx-manager.local".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("endpoint"));
    }

    #[test]
    fn validate_accepts_https_endpoint() {
        let mut config = NatcheckConfig::default();
        config.manager.endpoint = "https://nsx.local".to_owned();
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = NatcheckConfig::default();
        config.manager.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_excessive_timeout() {
        let mut config = NatcheckConfig::default();
        config.manager.request_timeout_secs = 301;
        assert!(config.validate().is_err());
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NATCHECK_STR", "overridden") };
        override_string(&mut val, "TEST_NATCHECK_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_NATCHECK_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NATCHECK_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_NATCHECK_BOOL_BAD");
        assert!(!val); // 원래 값 유지
        unsafe { std::env::remove_var("TEST_NATCHECK_BOOL_BAD") };
    }

    #[test]
    fn env_override_u64() {
        let mut val = 30u64;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_NATCHECK_U64", "90") };
        override_u64(&mut val, "TEST_NATCHECK_U64");
        assert_eq!(val, 90);
        unsafe { std::env::remove_var("TEST_NATCHECK_U64") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_NATCHECK_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = NatcheckConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = NatcheckConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(
            config.manager.request_timeout_secs,
            parsed.manager.request_timeout_secs
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = NatcheckConfig::from_file("/nonexistent/path/natcheck.toml").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            NatcheckError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn from_file_reads_toml() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[general]\nlog_level = \"debug\"").unwrap();
        let config = NatcheckConfig::from_file(file.path()).await.unwrap();
        assert_eq!(config.general.log_level, "debug");
    }
}
