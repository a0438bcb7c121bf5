//! 검증기 에러 타입
//!
//! [`VerifierError`]는 검증기 내부에서 발생하는 모든 에러를 표현합니다.
//! `From<VerifierError> for NatcheckError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.
//!
//! "구조화된 404"와 "전송 단계 실패"는 별도 변형으로 구분합니다.
//! 삭제 확인은 [`NotFound`](VerifierError::NotFound)만 부재의 증거로
//! 인정하고, 전송 실패는 치명적 에러로 취급합니다.

use natcheck_core::error::{NatcheckError, RuleError, VerifyError};

/// 검증기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum VerifierError {
    /// 리소스 핸들에 필수 식별자가 없음
    #[error("missing identifier '{field}' in rule handle")]
    MissingIdentifier {
        /// 누락된 필드명
        field: String,
    },

    /// 원격에 해당 규칙이 존재하지 않음 (구조화된 404)
    #[error("nat rule '{rule_id}' not found on router '{router_id}'")]
    NotFound {
        /// 조회한 라우터 ID
        router_id: String,
        /// 조회한 규칙 ID
        rule_id: String,
    },

    /// 비정상 상태 코드 응답
    #[error("manager api returned status {status}: {message}")]
    Remote {
        /// HTTP 상태 코드
        status: u16,
        /// 응답 본문 또는 요약
        message: String,
    },

    /// 전송 단계 실패 (연결 거부, 타임아웃 등)
    #[error("transport error: {0}")]
    Transport(String),

    /// 응답 본문 역직렬화 실패
    #[error("failed to decode response body: {0}")]
    Decode(String),

    /// 선언된 속성과 관측된 속성의 불일치
    #[error("attribute mismatch at '{field}': expected '{expected}', got '{actual}'")]
    Mismatch {
        /// 속성 경로 (예: `tags.#`, `action`)
        field: String,
        /// 선언된 값
        expected: String,
        /// 관측된 값
        actual: String,
    },

    /// 삭제 확인 중 동일 이름의 규칙이 여전히 존재
    #[error("nat rule '{display_name}' still exists")]
    StillExists {
        /// 선언된 표시 이름
        display_name: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 규칙 스펙 에러
    #[error("rule spec error: {0}")]
    Rule(#[from] RuleError),
}

impl VerifierError {
    /// 구조화된 not-found 응답인지 여부.
    ///
    /// 삭제 확인에서 부재의 증거로 인정되는 유일한 에러 클래스입니다.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VerifierError::NotFound { .. })
    }
}

impl From<VerifierError> for NatcheckError {
    fn from(err: VerifierError) -> Self {
        match &err {
            VerifierError::MissingIdentifier { field } => {
                NatcheckError::Verify(VerifyError::MissingIdentifier(field.clone()))
            }
            VerifierError::NotFound { .. } => NatcheckError::Verify(VerifyError::Remote {
                status: Some(404),
                message: err.to_string(),
            }),
            VerifierError::Remote { status, message } => {
                NatcheckError::Verify(VerifyError::Remote {
                    status: Some(*status),
                    message: message.clone(),
                })
            }
            VerifierError::Transport(msg) | VerifierError::Decode(msg) => {
                NatcheckError::Verify(VerifyError::Remote {
                    status: None,
                    message: msg.clone(),
                })
            }
            VerifierError::Mismatch {
                field,
                expected,
                actual,
            } => NatcheckError::Verify(VerifyError::Mismatch {
                field: field.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            }),
            VerifierError::StillExists { display_name } => {
                NatcheckError::Verify(VerifyError::StillExists(display_name.clone()))
            }
            VerifierError::Config { field, reason } => {
                NatcheckError::Config(natcheck_core::error::ConfigError::InvalidValue {
                    field: field.clone(),
                    reason: reason.clone(),
                })
            }
            VerifierError::Rule(rule_err) => NatcheckError::Verify(VerifyError::Mismatch {
                field: "spec".to_owned(),
                expected: "valid rule spec".to_owned(),
                actual: rule_err.to_string(),
            }),
        }
    }
}
