//! 검증기 설정
//!
//! [`VerifierConfig`]는 core의 [`ManagerConfig`](natcheck_core::config::ManagerConfig)를
//! 기반으로 검증기 전용 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use natcheck_core::config::NatcheckConfig;
//! use natcheck_verifier::config::VerifierConfig;
//!
//! let core_config = NatcheckConfig::default();
//! let config = VerifierConfig::from_core(&core_config.manager);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::VerifierError;

/// 검증기 설정
///
/// core의 `ManagerConfig`에서 파생되며, 검증기 내부에서
/// 사용하는 추가 설정을 포함합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// 매니저 API 엔드포인트
    pub endpoint: String,
    /// Basic 인증 사용자명
    pub username: String,
    /// Basic 인증 비밀번호
    pub password: String,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 자체 서명 인증서 허용 여부
    pub accept_invalid_certs: bool,

    // --- 확장 설정 (core에 없는 추가 필드) ---
    /// API 경로 접두사
    pub api_prefix: String,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            username: "admin".to_owned(),
            password: String::new(),
            request_timeout_secs: 30,
            accept_invalid_certs: false,
            api_prefix: "/api/v1".to_owned(),
        }
    }
}

/// 설정 상한값 상수
const MAX_REQUEST_TIMEOUT_SECS: u64 = 300;

impl VerifierConfig {
    /// core의 `ManagerConfig`에서 검증기 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값이 적용됩니다.
    pub fn from_core(core: &natcheck_core::config::ManagerConfig) -> Self {
        Self {
            endpoint: core.endpoint.clone(),
            username: core.username.clone(),
            password: core.password.clone(),
            request_timeout_secs: core.request_timeout_secs,
            accept_invalid_certs: core.accept_invalid_certs,
            ..Self::default()
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), VerifierError> {
        if self.endpoint.is_empty() {
            return Err(VerifierError::Config {
                field: "endpoint".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(VerifierError::Config {
                field: "endpoint".to_owned(),
                reason: "must start with http:// or https://".to_owned(),
            });
        }

        if self.request_timeout_secs == 0 || self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(VerifierError::Config {
                field: "request_timeout_secs".to_owned(),
                reason: format!("must be 1-{MAX_REQUEST_TIMEOUT_SECS}"),
            });
        }

        if !self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/') {
            return Err(VerifierError::Config {
                field: "api_prefix".to_owned(),
                reason: "must start with '/' and not end with '/'".to_owned(),
            });
        }

        Ok(())
    }
}

/// 검증기 설정 빌더
#[derive(Default)]
pub struct VerifierConfigBuilder {
    config: VerifierConfig,
}

impl VerifierConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 엔드포인트를 설정합니다.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// 인증 정보를 설정합니다.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = username.into();
        self.config.password = password.into();
        self
    }

    /// 요청 타임아웃(초)을 설정합니다.
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    /// 자체 서명 인증서 허용 여부를 설정합니다.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.config.accept_invalid_certs = accept;
        self
    }

    /// API 경로 접두사를 설정합니다.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.api_prefix = prefix.into();
        self
    }

    /// 설정을 검증하고 `VerifierConfig`를 생성합니다.
    pub fn build(self) -> Result<VerifierConfig, VerifierError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
