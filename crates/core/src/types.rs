//! 도메인 타입 — NAT 규칙 선언/관측 모델
//!
//! 선언된 규칙([`RuleSpec`])과 원격 시스템이 보고하는 규칙
//! ([`ObservedRule`])을 구분합니다. 검증은 항상 두 값의 비교로
//! 이루어지며, 관측 값은 호출마다 새로 조회되고 캐시되지 않습니다.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use ipnet::IpNet;
use serde::{Deserialize, Serialize};

use crate::error::RuleError;

/// NAT 규칙 종류
///
/// 원격 API와 설정 텍스트 양쪽에서 대문자 표기(`SNAT`/`DNAT`)를 사용합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NatAction {
    /// 출발지 주소 변환
    #[serde(rename = "SNAT")]
    Snat,
    /// 목적지 주소 변환
    #[serde(rename = "DNAT")]
    Dnat,
}

impl fmt::Display for NatAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NatAction::Snat => write!(f, "SNAT"),
            NatAction::Dnat => write!(f, "DNAT"),
        }
    }
}

impl FromStr for NatAction {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SNAT" => Ok(NatAction::Snat),
            "DNAT" => Ok(NatAction::Dnat),
            other => Err(RuleError::UnknownAction(other.to_owned())),
        }
    }
}

/// 규칙에 부착되는 (scope, tag) 쌍
///
/// 순서가 의미를 가지므로 정렬하지 않고 선언된 순서를 유지합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTag {
    /// 태그 범위
    pub scope: String,
    /// 태그 값
    pub tag: String,
}

impl RuleTag {
    /// (scope, tag) 쌍을 생성합니다.
    pub fn new(scope: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            tag: tag.into(),
        }
    }
}

/// 선언된 NAT 규칙 스펙
///
/// 하나의 테스트 시나리오 단계가 원격 시스템에 적용하려는 의도를
/// 표현합니다. 적용 전 [`validate`](Self::validate)로 불변식을
/// 검사합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// 소유 논리 라우터 ID
    pub logical_router_id: String,
    /// 표시 이름
    pub display_name: String,
    /// 설명
    pub description: String,
    /// 규칙 종류 (SNAT/DNAT)
    pub action: NatAction,
    /// 변환 대상 네트워크 (SNAT: CIDR, DNAT: 단일 주소)
    pub translated_network: String,
    /// 목적지 매칭 네트워크 (CIDR)
    pub match_destination_network: Option<String>,
    /// 출발지 매칭 네트워크 (CIDR, SNAT 전용)
    pub match_source_network: Option<String>,
    /// 활성화 여부
    pub enabled: bool,
    /// 로깅 여부
    pub logging: bool,
    /// nat_pass 플래그
    pub nat_pass: bool,
    /// 태그 목록 (선언 순서 유지)
    pub tags: Vec<RuleTag>,
}

impl RuleSpec {
    /// 스펙의 불변식을 검증합니다.
    ///
    /// - 필수 필드(`display_name`, `logical_router_id`,
    ///   `translated_network`)가 비어 있지 않아야 합니다.
    /// - SNAT의 `translated_network`는 CIDR 또는 호스트 주소,
    ///   DNAT의 `translated_network`는 단일 호스트 주소여야 합니다.
    /// - 매칭 네트워크는 존재할 경우 유효한 CIDR 또는 호스트 주소여야
    ///   합니다.
    /// - `match_source_network`는 SNAT에서만 허용됩니다.
    pub fn validate(&self) -> Result<(), RuleError> {
        if self.display_name.is_empty() {
            return Err(RuleError::MissingField {
                field: "display_name".to_owned(),
            });
        }
        if self.logical_router_id.is_empty() {
            return Err(RuleError::MissingField {
                field: "logical_router_id".to_owned(),
            });
        }
        if self.translated_network.is_empty() {
            return Err(RuleError::MissingField {
                field: "translated_network".to_owned(),
            });
        }

        match self.action {
            NatAction::Snat => {
                validate_network("translated_network", &self.translated_network)?;
            }
            NatAction::Dnat => {
                // DNAT는 단일 변환 주소만 허용
                if self.translated_network.parse::<IpAddr>().is_err() {
                    return Err(RuleError::InvalidNetwork {
                        field: "translated_network".to_owned(),
                        value: self.translated_network.clone(),
                        reason: "DNAT requires a single host address".to_owned(),
                    });
                }
                if self.match_source_network.is_some() {
                    return Err(RuleError::AttributeNotAllowed {
                        field: "match_source_network".to_owned(),
                        action: self.action.to_string(),
                    });
                }
            }
        }

        if let Some(net) = &self.match_destination_network {
            validate_network("match_destination_network", net)?;
        }
        if let Some(net) = &self.match_source_network {
            validate_network("match_source_network", net)?;
        }

        Ok(())
    }
}

/// CIDR 또는 호스트 주소 문자열을 검증합니다.
fn validate_network(field: &str, value: &str) -> Result<(), RuleError> {
    if value.parse::<IpNet>().is_ok() || value.parse::<IpAddr>().is_ok() {
        return Ok(());
    }
    Err(RuleError::InvalidNetwork {
        field: field.to_owned(),
        value: value.to_owned(),
        reason: "not a valid CIDR or host address".to_owned(),
    })
}

/// 원격 시스템이 보고하는 NAT 규칙
///
/// 생성/갱신 응답과 읽기 응답의 본문입니다. 검증기에게는 읽기 전용이며
/// 비교 목적 외에는 사용되지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedRule {
    /// 시스템이 부여한 규칙 ID
    pub id: String,
    /// 소유 논리 라우터 ID
    pub logical_router_id: String,
    /// 표시 이름
    pub display_name: String,
    /// 설명
    #[serde(default)]
    pub description: String,
    /// 규칙 종류
    pub action: NatAction,
    /// 변환 대상 네트워크
    pub translated_network: String,
    /// 목적지 매칭 네트워크
    #[serde(default)]
    pub match_destination_network: Option<String>,
    /// 출발지 매칭 네트워크
    #[serde(default)]
    pub match_source_network: Option<String>,
    /// 활성화 여부
    pub enabled: bool,
    /// 로깅 여부
    pub logging: bool,
    /// nat_pass 플래그
    pub nat_pass: bool,
    /// 태그 목록
    #[serde(default)]
    pub tags: Vec<RuleTag>,
}

impl fmt::Display for ObservedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' (id={}, router={})",
            self.action, self.display_name, self.id, self.logical_router_id,
        )
    }
}

/// 적용된 규칙을 추적하는 핸들
///
/// 전역 상태 레지스트리 대신, 적용 결과에서 얻은 식별자 쌍을
/// 명시적으로 전달합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHandle {
    /// 시스템이 부여한 규칙 ID
    pub id: String,
    /// 소유 논리 라우터 ID
    pub logical_router_id: String,
}

impl RuleHandle {
    /// 관측된 규칙에서 핸들을 추출합니다.
    pub fn from_observed(rule: &ObservedRule) -> Self {
        Self {
            id: rule.id.clone(),
            logical_router_id: rule.logical_router_id.clone(),
        }
    }
}

/// 라우터 픽스처
///
/// 규칙이 부착될 논리 라우터와 이를 수용하는 엣지 클러스터를
/// 선언하는 설정 블록의 파라미터입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterFixture {
    /// 라우터 표시 이름
    pub display_name: String,
    /// 엣지 클러스터 표시 이름
    pub edge_cluster_name: String,
}

impl Default for RouterFixture {
    fn default() -> Self {
        Self {
            display_name: "tier1_router".to_owned(),
            edge_cluster_name: "EDGECLUSTER1".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snat_spec() -> RuleSpec {
        RuleSpec {
            logical_router_id: "rtr-1".to_owned(),
            display_name: "test-nsx-snat-rule".to_owned(),
            description: "Acceptance Test".to_owned(),
            action: NatAction::Snat,
            translated_network: "4.4.4.0/24".to_owned(),
            match_destination_network: Some("3.3.3.0/24".to_owned()),
            match_source_network: Some("5.5.5.0/24".to_owned()),
            enabled: true,
            logging: true,
            nat_pass: false,
            tags: vec![RuleTag::new("scope1", "tag1")],
        }
    }

    fn dnat_spec() -> RuleSpec {
        RuleSpec {
            logical_router_id: "rtr-1".to_owned(),
            display_name: "test-nsx-dnat-rule".to_owned(),
            description: "Acceptance Test".to_owned(),
            action: NatAction::Dnat,
            translated_network: "4.4.4.4".to_owned(),
            match_destination_network: Some("3.3.3.0/24".to_owned()),
            match_source_network: None,
            enabled: true,
            logging: true,
            nat_pass: true,
            tags: vec![RuleTag::new("scope1", "tag1")],
        }
    }

    #[test]
    fn action_display_uppercase() {
        assert_eq!(NatAction::Snat.to_string(), "SNAT");
        assert_eq!(NatAction::Dnat.to_string(), "DNAT");
    }

    #[test]
    fn action_from_str() {
        assert_eq!("SNAT".parse::<NatAction>().unwrap(), NatAction::Snat);
        assert_eq!("DNAT".parse::<NatAction>().unwrap(), NatAction::Dnat);
        assert!("snat".parse::<NatAction>().is_err());
        assert!("MASQUERADE".parse::<NatAction>().is_err());
    }

    #[test]
    fn action_serde_uses_uppercase() {
        let json = serde_json::to_string(&NatAction::Snat).unwrap();
        assert_eq!(json, "\"SNAT\"");
        let back: NatAction = serde_json::from_str("\"DNAT\"").unwrap();
        assert_eq!(back, NatAction::Dnat);
    }

    #[test]
    fn valid_snat_spec_passes() {
        snat_spec().validate().unwrap();
    }

    #[test]
    fn valid_dnat_spec_passes() {
        dnat_spec().validate().unwrap();
    }

    #[test]
    fn snat_accepts_host_translated_address() {
        let mut spec = snat_spec();
        spec.translated_network = "4.4.4.4".to_owned();
        spec.validate().unwrap();
    }

    #[test]
    fn dnat_rejects_cidr_translated_network() {
        let mut spec = dnat_spec();
        spec.translated_network = "4.4.4.0/24".to_owned();
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, RuleError::InvalidNetwork { .. }));
    }

    #[test]
    fn dnat_rejects_match_source_network() {
        let mut spec = dnat_spec();
        spec.match_source_network = Some("5.5.5.0/24".to_owned());
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, RuleError::AttributeNotAllowed { .. }));
    }

    #[test]
    fn empty_display_name_rejected() {
        let mut spec = snat_spec();
        spec.display_name = String::new();
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, RuleError::MissingField { .. }));
    }

    #[test]
    fn empty_router_id_rejected() {
        let mut spec = snat_spec();
        spec.logical_router_id = String::new();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn empty_translated_network_rejected() {
        let mut spec = snat_spec();
        spec.translated_network = String::new();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn garbage_network_rejected() {
        let mut spec = snat_spec();
        spec.match_source_network = Some("not-a-network".to_owned());
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, RuleError::InvalidNetwork { .. }));
    }

    #[test]
    fn out_of_range_octet_rejected() {
        let mut spec = snat_spec();
        spec.translated_network = "300.0.0.0/24".to_owned();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn ipv6_networks_accepted() {
        let mut spec = snat_spec();
        spec.translated_network = "2001:db8::/64".to_owned();
        spec.match_source_network = Some("2001:db8:1::/64".to_owned());
        spec.match_destination_network = None;
        spec.validate().unwrap();
    }

    #[test]
    fn handle_from_observed() {
        let rule = ObservedRule {
            id: "nat-42".to_owned(),
            logical_router_id: "rtr-1".to_owned(),
            display_name: "x".to_owned(),
            description: String::new(),
            action: NatAction::Snat,
            translated_network: "4.4.4.0/24".to_owned(),
            match_destination_network: None,
            match_source_network: None,
            enabled: true,
            logging: false,
            nat_pass: false,
            tags: Vec::new(),
        };
        let handle = RuleHandle::from_observed(&rule);
        assert_eq!(handle.id, "nat-42");
        assert_eq!(handle.logical_router_id, "rtr-1");
    }

    #[test]
    fn observed_rule_deserializes_with_defaults() {
        let json = r#"{
            "id": "nat-7",
            "logical_router_id": "rtr-9",
            "display_name": "r",
            "action": "DNAT",
            "translated_network": "4.4.4.4",
            "enabled": true,
            "logging": true,
            "nat_pass": true
        }"#;
        let rule: ObservedRule = serde_json::from_str(json).unwrap();
        assert_eq!(rule.action, NatAction::Dnat);
        assert!(rule.description.is_empty());
        assert!(rule.tags.is_empty());
        assert!(rule.match_destination_network.is_none());
    }

    #[test]
    fn rule_spec_serde_roundtrip() {
        let spec = snat_spec();
        let json = serde_json::to_string(&spec).unwrap();
        let back: RuleSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(spec, back);
    }

    #[test]
    fn default_router_fixture() {
        let fixture = RouterFixture::default();
        assert_eq!(fixture.display_name, "tier1_router");
        assert!(!fixture.edge_cluster_name.is_empty());
    }
}
