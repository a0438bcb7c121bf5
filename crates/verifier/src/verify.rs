//! 생명주기 검증기
//!
//! 선언된 규칙 명세와 매니저가 보고하는 상태를 비교하는 읽기 전용
//! 검증 연산을 제공합니다. 모든 읽기는 매 호출마다 새로 수행되며
//! 캐시하지 않습니다.

use std::sync::Arc;

use tracing::{debug, info, warn};

use natcheck_core::types::{ObservedRule, RuleHandle, RuleSpec};

use crate::client::ManagerClient;
use crate::error::VerifierError;

/// NAT 규칙에 대한 존재/부재/속성 검증기
///
/// 각 검증은 전부-또는-전무입니다. 실패는 그 검증에 대해 종단적이며
/// 내부에서 재시도하거나 복구하지 않습니다.
pub struct LifecycleVerifier<C: ManagerClient> {
    client: Arc<C>,
}

impl<C: ManagerClient> LifecycleVerifier<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }

    /// 핸들이 가리키는 규칙을 읽어 옵니다.
    ///
    /// # Errors
    ///
    /// 핸들에 식별자가 비어 있으면 [`VerifierError::MissingIdentifier`]를
    /// 반환합니다. 읽기 오류는 그대로 전파됩니다.
    pub async fn read(&self, handle: &RuleHandle) -> Result<ObservedRule, VerifierError> {
        if handle.id.is_empty() {
            return Err(VerifierError::MissingIdentifier {
                field: "rule_id".to_owned(),
            });
        }
        if handle.logical_router_id.is_empty() {
            return Err(VerifierError::MissingIdentifier {
                field: "logical_router_id".to_owned(),
            });
        }
        self.client
            .get_nat_rule(&handle.logical_router_id, &handle.id)
            .await
    }

    /// 규칙이 존재하고 표시 이름이 기대값과 일치하는지 확인합니다.
    ///
    /// # Errors
    ///
    /// - [`VerifierError::MissingIdentifier`]: 핸들에 규칙 id 또는
    ///   라우터 id가 없음
    /// - [`VerifierError::NotFound`] / [`VerifierError::Remote`] /
    ///   [`VerifierError::Transport`]: 읽기 실패
    /// - [`VerifierError::Mismatch`]: 원격 표시 이름이 다름
    pub async fn exists(
        &self,
        display_name: &str,
        handle: &RuleHandle,
    ) -> Result<(), VerifierError> {
        let observed = self.read(handle).await?;
        if observed.display_name != display_name {
            return Err(VerifierError::Mismatch {
                field: "display_name".to_owned(),
                expected: display_name.to_owned(),
                actual: observed.display_name,
            });
        }
        debug!(rule_id = %handle.id, display_name, "rule exists with expected name");
        Ok(())
    }

    /// 추적된 모든 핸들이 파괴되었는지 확인합니다.
    ///
    /// 구조화된 404만 부재의 증거로 인정합니다. 읽기가 성공했고 표시
    /// 이름이 일치하면 [`VerifierError::StillExists`]로 실패하며, 다른
    /// 이름의 살아 있는 규칙은 이 검증의 대상이 아니므로 통과시킵니다.
    /// 전송 오류 등 그 외의 읽기 오류는 치명적입니다.
    pub async fn destroyed(
        &self,
        display_name: &str,
        handles: &[RuleHandle],
    ) -> Result<(), VerifierError> {
        for handle in handles {
            match self.read(handle).await {
                Err(err) if err.is_not_found() => {
                    debug!(rule_id = %handle.id, "rule confirmed absent");
                }
                Err(err) => {
                    warn!(rule_id = %handle.id, error = %err, "destroy check read failed");
                    return Err(err);
                }
                Ok(observed) if observed.display_name == display_name => {
                    return Err(VerifierError::StillExists {
                        display_name: display_name.to_owned(),
                    });
                }
                Ok(observed) => {
                    debug!(
                        rule_id = %handle.id,
                        observed_name = %observed.display_name,
                        "live rule with different name ignored"
                    );
                }
            }
        }
        info!(display_name, handles = handles.len(), "destroy check passed");
        Ok(())
    }

    /// 관측된 규칙의 모든 속성이 명세와 일치하는지 확인합니다.
    ///
    /// 스칼라 속성, 플래그, 태그 개수(`tags.#`)와 태그별 scope/tag를
    /// 순서대로 비교하며 첫 불일치에서 [`VerifierError::Mismatch`]로
    /// 실패합니다.
    pub fn check_attrs(
        &self,
        spec: &RuleSpec,
        observed: &ObservedRule,
    ) -> Result<(), VerifierError> {
        check_str("display_name", &spec.display_name, &observed.display_name)?;
        check_str("description", &spec.description, &observed.description)?;
        check_str(
            "action",
            &spec.action.to_string(),
            &observed.action.to_string(),
        )?;
        check_str(
            "translated_network",
            &spec.translated_network,
            &observed.translated_network,
        )?;
        check_opt(
            "match_destination_network",
            spec.match_destination_network.as_deref(),
            observed.match_destination_network.as_deref(),
        )?;
        check_opt(
            "match_source_network",
            spec.match_source_network.as_deref(),
            observed.match_source_network.as_deref(),
        )?;
        check_bool("enabled", spec.enabled, observed.enabled)?;
        check_bool("logging", spec.logging, observed.logging)?;
        check_bool("nat_pass", spec.nat_pass, observed.nat_pass)?;

        if spec.tags.len() != observed.tags.len() {
            return Err(VerifierError::Mismatch {
                field: "tags.#".to_owned(),
                expected: spec.tags.len().to_string(),
                actual: observed.tags.len().to_string(),
            });
        }
        for (i, (expected, actual)) in spec.tags.iter().zip(observed.tags.iter()).enumerate() {
            check_str(&format!("tags.{i}.scope"), &expected.scope, &actual.scope)?;
            check_str(&format!("tags.{i}.tag"), &expected.tag, &actual.tag)?;
        }
        Ok(())
    }

    /// 규칙을 읽어 명세 전체와 대조합니다. `exists`와 `check_attrs`를
    /// 합친 편의 연산입니다.
    pub async fn verify(
        &self,
        spec: &RuleSpec,
        handle: &RuleHandle,
    ) -> Result<(), VerifierError> {
        let observed = self.read(handle).await?;
        self.check_attrs(spec, &observed)
    }
}

fn check_str(field: &str, expected: &str, actual: &str) -> Result<(), VerifierError> {
    if expected != actual {
        return Err(VerifierError::Mismatch {
            field: field.to_owned(),
            expected: expected.to_owned(),
            actual: actual.to_owned(),
        });
    }
    Ok(())
}

fn check_opt(
    field: &str,
    expected: Option<&str>,
    actual: Option<&str>,
) -> Result<(), VerifierError> {
    if expected != actual {
        return Err(VerifierError::Mismatch {
            field: field.to_owned(),
            expected: expected.unwrap_or("<unset>").to_owned(),
            actual: actual.unwrap_or("<unset>").to_owned(),
        });
    }
    Ok(())
}

fn check_bool(field: &str, expected: bool, actual: bool) -> Result<(), VerifierError> {
    if expected != actual {
        return Err(VerifierError::Mismatch {
            field: field.to_owned(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}
