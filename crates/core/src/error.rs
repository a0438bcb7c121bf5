//! 에러 타입 — 도메인별 에러 정의

/// Natcheck 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum NatcheckError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 규칙 스펙 에러
    #[error("rule error: {0}")]
    Rule(#[from] RuleError),

    /// 검증 에러
    #[error("verify error: {0}")]
    Verify(#[from] VerifyError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// NAT 규칙 스펙 에러
///
/// [`RuleSpec::validate`](crate::types::RuleSpec::validate)에서
/// 선언된 규칙이 불변식을 위반할 때 반환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// 필수 필드 누락
    #[error("missing required field '{field}'")]
    MissingField { field: String },

    /// 유효하지 않은 네트워크 주소/CIDR
    #[error("invalid network for '{field}': '{value}': {reason}")]
    InvalidNetwork {
        /// 문제가 된 필드명
        field: String,
        /// 입력된 값
        value: String,
        /// 거부 사유
        reason: String,
    },

    /// 규칙 종류에 허용되지 않는 속성
    #[error("attribute '{field}' is not allowed for {action} rules")]
    AttributeNotAllowed { field: String, action: String },

    /// 알 수 없는 규칙 종류
    #[error("unknown nat action '{0}' (must be SNAT or DNAT)")]
    UnknownAction(String),
}

/// 검증 에러
///
/// 생성/갱신/삭제 후 원격 상태 확인이 실패한 모든 경우를 표현합니다.
/// 세분화된 변형은 verifier 크레이트의 `VerifierError`에 있으며
/// 상위 레이어 전파 시 이 타입으로 변환됩니다.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// 리소스 핸들에 필수 식별자가 없음
    #[error("missing identifier: {0}")]
    MissingIdentifier(String),

    /// 원격 읽기 실패 (전송 오류 또는 비정상 상태 코드)
    #[error("remote read failed{}: {message}", status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Remote {
        /// HTTP 상태 코드 (전송 단계 실패 시 None)
        status: Option<u16>,
        /// 실패 메시지
        message: String,
    },

    /// 선언된 속성과 관측된 속성이 불일치
    #[error("attribute mismatch at '{field}': expected '{expected}', got '{actual}'")]
    Mismatch {
        field: String,
        expected: String,
        actual: String,
    },

    /// 삭제 확인 중 동일한 이름의 객체가 여전히 존재
    #[error("rule '{0}' still exists")]
    StillExists(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound {
            path: "/etc/natcheck.toml".to_owned(),
        };
        assert!(err.to_string().contains("/etc/natcheck.toml"));
    }

    #[test]
    fn rule_error_invalid_network_display() {
        let err = RuleError::InvalidNetwork {
            field: "translated_network".to_owned(),
            value: "300.1.1.1".to_owned(),
            reason: "not an IP address or CIDR".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("translated_network"));
        assert!(msg.contains("300.1.1.1"));
    }

    #[test]
    fn rule_error_attribute_not_allowed_display() {
        let err = RuleError::AttributeNotAllowed {
            field: "match_source_network".to_owned(),
            action: "DNAT".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("match_source_network"));
        assert!(msg.contains("DNAT"));
    }

    #[test]
    fn verify_error_remote_with_status_display() {
        let err = VerifyError::Remote {
            status: Some(500),
            message: "internal error".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("internal error"));
    }

    #[test]
    fn verify_error_remote_without_status_display() {
        let err = VerifyError::Remote {
            status: None,
            message: "connection refused".to_owned(),
        };
        let msg = err.to_string();
        assert!(!msg.contains("status"));
        assert!(msg.contains("connection refused"));
    }

    #[test]
    fn verify_error_mismatch_display() {
        let err = VerifyError::Mismatch {
            field: "tags.#".to_owned(),
            expected: "2".to_owned(),
            actual: "1".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("tags.#"));
        assert!(msg.contains("expected '2'"));
        assert!(msg.contains("got '1'"));
    }

    #[test]
    fn verify_error_still_exists_display() {
        let err = VerifyError::StillExists("test-nsx-snat-rule".to_owned());
        assert!(err.to_string().contains("test-nsx-snat-rule"));
    }

    #[test]
    fn natcheck_error_wraps_domains() {
        let err: NatcheckError = ConfigError::ParseFailed {
            reason: "bad toml".to_owned(),
        }
        .into();
        assert!(matches!(err, NatcheckError::Config(_)));

        let err: NatcheckError = RuleError::MissingField {
            field: "display_name".to_owned(),
        }
        .into();
        assert!(matches!(err, NatcheckError::Rule(_)));

        let err: NatcheckError = VerifyError::MissingIdentifier("id".to_owned()).into();
        assert!(matches!(err, NatcheckError::Verify(_)));
    }
}
