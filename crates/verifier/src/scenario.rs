//! 시나리오 정의와 순차 실행기
//!
//! 하나의 시나리오는 생성 명세와 갱신 명세의 쌍이며, 실행기는
//! `적용 → 검증 → 갱신 → 재검증 → 파괴 → 부재확인` 여섯 단계를
//! 엄격히 순차적으로 수행합니다. 단계는 자동으로 재시도되지 않으며,
//! 실패한 단계에서 시나리오가 중단됩니다.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use natcheck_core::report::{ScenarioReport, ScenarioStep, StepStatus};
use natcheck_core::types::{NatAction, RouterFixture, RuleHandle, RuleSpec, RuleTag};

use crate::client::ManagerClient;
use crate::error::VerifierError;
use crate::render::rule_document;
use crate::verify::LifecycleVerifier;

/// 하나의 생명주기 시나리오
///
/// 갱신 명세는 생성 명세와 같은 논리적 슬롯을 덮어씁니다.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub fixture: RouterFixture,
    pub create: RuleSpec,
    pub update: RuleSpec,
}

impl Scenario {
    /// 기본 SNAT 시나리오
    ///
    /// 생성: `test-nsx-snat-rule`, 변환 대역 `4.4.4.0/24`, 소스 매칭
    /// `5.5.5.0/24`, 활성, `nat_pass` 꺼짐, 태그 1개.
    /// 갱신: 이름에 `-update` 접미사, 소스 매칭 `6.6.6.0/24`, 비활성,
    /// `nat_pass` 켜짐, 태그 2개.
    pub fn snat_basic(router_id: &str) -> Self {
        let create = RuleSpec {
            logical_router_id: router_id.to_owned(),
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
        };
        let update = RuleSpec {
            display_name: "test-nsx-snat-rule-update".to_owned(),
            description: "Acceptance Test Update".to_owned(),
            match_source_network: Some("6.6.6.0/24".to_owned()),
            enabled: false,
            nat_pass: true,
            tags: vec![RuleTag::new("scope1", "tag1"), RuleTag::new("scope2", "tag2")],
            ..create.clone()
        };
        Self {
            name: "snat-basic".to_owned(),
            fixture: RouterFixture::default(),
            create,
            update,
        }
    }

    /// 기본 DNAT 시나리오
    ///
    /// 생성: `test-nsx-dnat-rule`, 변환 주소 `4.4.4.4`, 목적지 매칭
    /// `3.3.3.0/24`. 갱신: 목적지 매칭을 `7.7.7.0/24`로 변경, 태그 2개.
    pub fn dnat_basic(router_id: &str) -> Self {
        let create = RuleSpec {
            logical_router_id: router_id.to_owned(),
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
        };
        let update = RuleSpec {
            display_name: "test-nsx-dnat-rule-update".to_owned(),
            description: "Acceptance Test Update".to_owned(),
            match_destination_network: Some("7.7.7.0/24".to_owned()),
            tags: vec![RuleTag::new("scope1", "tag1"), RuleTag::new("scope2", "tag2")],
            ..create.clone()
        };
        Self {
            name: "dnat-basic".to_owned(),
            fixture: RouterFixture::default(),
            create,
            update,
        }
    }

    /// 생성 단계의 구성 텍스트
    pub fn render_create(&self) -> Result<String, VerifierError> {
        rule_document(&self.create, &self.fixture).map(|doc| doc.render())
    }

    /// 갱신 단계의 구성 텍스트
    pub fn render_update(&self) -> Result<String, VerifierError> {
        rule_document(&self.update, &self.fixture).map(|doc| doc.render())
    }
}

/// [`ScenarioRunner`] 빌더
pub struct ScenarioRunnerBuilder<C: ManagerClient> {
    client: Option<Arc<C>>,
    fixture: RouterFixture,
}

impl<C: ManagerClient> ScenarioRunnerBuilder<C> {
    pub fn new() -> Self {
        Self {
            client: None,
            fixture: RouterFixture::default(),
        }
    }

    pub fn client(mut self, client: Arc<C>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn fixture(mut self, fixture: RouterFixture) -> Self {
        self.fixture = fixture;
        self
    }

    /// # Errors
    ///
    /// 클라이언트가 설정되지 않았으면 [`VerifierError::Config`]를
    /// 반환합니다.
    pub fn build(self) -> Result<ScenarioRunner<C>, VerifierError> {
        let client = self.client.ok_or_else(|| VerifierError::Config {
            field: "client".to_owned(),
            reason: "manager client is required".to_owned(),
        })?;
        Ok(ScenarioRunner {
            verifier: LifecycleVerifier::new(Arc::clone(&client)),
            client,
        })
    }
}

impl<C: ManagerClient> Default for ScenarioRunnerBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// 시나리오를 끝까지 실행하고 단계별 보고서를 생성하는 실행기
pub struct ScenarioRunner<C: ManagerClient> {
    client: Arc<C>,
    verifier: LifecycleVerifier<C>,
}

impl<C: ManagerClient> ScenarioRunner<C> {
    pub fn builder() -> ScenarioRunnerBuilder<C> {
        ScenarioRunnerBuilder::new()
    }

    /// 시나리오를 실행합니다.
    ///
    /// 여섯 단계를 순서대로 수행하며, 각 단계의 소요 시간을 기록합니다.
    /// 실패한 단계가 있으면 그 지점에서 중단하고 지금까지의 보고서를
    /// 반환합니다. 갱신 단계는 매니저 응답으로 핸들을 갱신하므로 id를
    /// 재할당하는 매니저도 허용됩니다.
    pub async fn run(&self, scenario: &Scenario) -> ScenarioReport {
        info!(scenario = %scenario.name, "starting lifecycle scenario");
        let mut report = ScenarioReport::new(&scenario.name);
        let mut handles: Vec<RuleHandle> = Vec::new();

        // Applied
        let started = Instant::now();
        let applied = self.apply(scenario).await;
        let handle = match applied {
            Ok(handle) => {
                report.record(ScenarioStep::Applied, StepStatus::Passed, started.elapsed());
                handles.push(handle.clone());
                handle
            }
            Err(err) => {
                self.fail(&mut report, ScenarioStep::Applied, started, err);
                return report;
            }
        };

        // Verified
        let started = Instant::now();
        let verified = self.verify_against(&scenario.create, &handle).await;
        if let Err(err) = verified {
            self.fail(&mut report, ScenarioStep::Verified, started, err);
            return report;
        }
        report.record(ScenarioStep::Verified, StepStatus::Passed, started.elapsed());

        // Updated
        let started = Instant::now();
        let updated = self.apply_update(scenario, &handle).await;
        let handle = match updated {
            Ok(observed) => {
                report.record(ScenarioStep::Updated, StepStatus::Passed, started.elapsed());
                let refreshed = RuleHandle::from_observed(&observed);
                if !handles.contains(&refreshed) {
                    handles.push(refreshed.clone());
                }
                refreshed
            }
            Err(err) => {
                self.fail(&mut report, ScenarioStep::Updated, started, err);
                return report;
            }
        };

        // ReVerified
        let started = Instant::now();
        let reverified = self.verify_against(&scenario.update, &handle).await;
        if let Err(err) = reverified {
            self.fail(&mut report, ScenarioStep::ReVerified, started, err);
            return report;
        }
        report.record(ScenarioStep::ReVerified, StepStatus::Passed, started.elapsed());

        // Destroyed
        let started = Instant::now();
        let destroyed = self
            .client
            .delete_nat_rule(&handle.logical_router_id, &handle.id)
            .await;
        if let Err(err) = destroyed {
            self.fail(&mut report, ScenarioStep::Destroyed, started, err);
            return report;
        }
        report.record(ScenarioStep::Destroyed, StepStatus::Passed, started.elapsed());

        // VerifiedAbsent
        let started = Instant::now();
        let absent = self
            .verifier
            .destroyed(&scenario.update.display_name, &handles)
            .await;
        match absent {
            Ok(()) => {
                report.record(
                    ScenarioStep::VerifiedAbsent,
                    StepStatus::Passed,
                    started.elapsed(),
                );
                info!(scenario = %scenario.name, "lifecycle scenario passed");
            }
            Err(err) => {
                self.fail(&mut report, ScenarioStep::VerifiedAbsent, started, err);
            }
        }
        report
    }

    /// 구성 텍스트를 렌더링한 뒤 생성 요청을 보냅니다. 렌더링 실패는
    /// 적용 실패로 취급합니다.
    async fn apply(&self, scenario: &Scenario) -> Result<RuleHandle, VerifierError> {
        let rendered = scenario.render_create()?;
        debug!(scenario = %scenario.name, config = %rendered, "rendered create configuration");
        let observed = self
            .client
            .create_nat_rule(&scenario.create.logical_router_id, &scenario.create)
            .await?;
        Ok(RuleHandle::from_observed(&observed))
    }

    /// 갱신 구성 텍스트를 렌더링한 뒤 갱신 요청을 보냅니다.
    async fn apply_update(
        &self,
        scenario: &Scenario,
        handle: &RuleHandle,
    ) -> Result<natcheck_core::types::ObservedRule, VerifierError> {
        let rendered = scenario.render_update()?;
        debug!(scenario = %scenario.name, config = %rendered, "rendered update configuration");
        self.client
            .update_nat_rule(&handle.logical_router_id, &handle.id, &scenario.update)
            .await
    }

    async fn verify_against(
        &self,
        spec: &RuleSpec,
        handle: &RuleHandle,
    ) -> Result<(), VerifierError> {
        self.verifier.exists(&spec.display_name, handle).await?;
        self.verifier.verify(spec, handle).await
    }

    fn fail(
        &self,
        report: &mut ScenarioReport,
        step: ScenarioStep,
        started: Instant,
        err: VerifierError,
    ) {
        warn!(?step, error = %err, "scenario step failed");
        report.record(step, StepStatus::Failed(err.to_string()), started.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockManagerClient;

    fn runner(client: &Arc<MockManagerClient>) -> ScenarioRunner<MockManagerClient> {
        ScenarioRunner::builder()
            .client(Arc::clone(client))
            .build()
            .unwrap()
    }

    #[test]
    fn snat_scenario_matches_declared_literals() {
        let scenario = Scenario::snat_basic("rtr-1");
        assert_eq!(scenario.create.display_name, "test-nsx-snat-rule");
        assert_eq!(scenario.update.display_name, "test-nsx-snat-rule-update");
        assert_eq!(
            scenario.create.match_source_network.as_deref(),
            Some("5.5.5.0/24")
        );
        assert_eq!(
            scenario.update.match_source_network.as_deref(),
            Some("6.6.6.0/24")
        );
        assert!(scenario.create.enabled && !scenario.update.enabled);
        assert!(!scenario.create.nat_pass && scenario.update.nat_pass);
        assert_eq!(scenario.create.tags.len(), 1);
        assert_eq!(scenario.update.tags.len(), 2);
    }

    #[test]
    fn dnat_scenario_matches_declared_literals() {
        let scenario = Scenario::dnat_basic("rtr-1");
        assert_eq!(scenario.create.translated_network, "4.4.4.4");
        assert_eq!(
            scenario.create.match_destination_network.as_deref(),
            Some("3.3.3.0/24")
        );
        assert_eq!(
            scenario.update.match_destination_network.as_deref(),
            Some("7.7.7.0/24")
        );
        assert!(scenario.create.match_source_network.is_none());
        assert!(scenario.create.nat_pass && scenario.update.nat_pass);
    }

    #[test]
    fn both_scenario_templates_render() {
        let scenario = Scenario::snat_basic("rtr-1");
        let create = scenario.render_create().unwrap();
        let update = scenario.render_update().unwrap();
        assert!(create.contains("test-nsx-snat-rule"));
        assert!(update.contains("test-nsx-snat-rule-update"));
        assert_ne!(create, update);
    }

    #[test]
    fn builder_requires_client() {
        let result = ScenarioRunnerBuilder::<MockManagerClient>::new().build();
        assert!(matches!(
            result,
            Err(VerifierError::Config { ref field, .. }) if field == "client"
        ));
    }

    #[tokio::test]
    async fn snat_scenario_runs_to_completion() {
        let client = Arc::new(MockManagerClient::new());
        let report = runner(&client).run(&Scenario::snat_basic("rtr-1")).await;

        assert!(report.passed(), "failure: {:?}", report.first_failure());
        assert_eq!(report.steps.len(), 6);
        assert_eq!(client.rule_count().await, 0);
    }

    #[tokio::test]
    async fn dnat_scenario_runs_to_completion() {
        let client = Arc::new(MockManagerClient::new());
        let report = runner(&client).run(&Scenario::dnat_basic("rtr-1")).await;

        assert!(report.passed(), "failure: {:?}", report.first_failure());
    }

    #[tokio::test]
    async fn invalid_update_spec_fails_at_updated_step() {
        let client = Arc::new(MockManagerClient::new());
        let mut scenario = Scenario::snat_basic("rtr-1");
        scenario.update.translated_network = "999.999.0.0/24".to_owned();
        let report = runner(&client).run(&scenario).await;

        assert!(!report.passed());
        let failure = report.first_failure().unwrap();
        assert_eq!(failure.step, ScenarioStep::Updated);
    }

    #[tokio::test]
    async fn transport_failure_stops_at_first_step() {
        let client = Arc::new(MockManagerClient::new().with_failing_transport());
        let report = runner(&client).run(&Scenario::snat_basic("rtr-1")).await;

        assert!(!report.passed());
        assert_eq!(report.steps.len(), 1);
        let failure = report.first_failure().unwrap();
        assert_eq!(failure.step, ScenarioStep::Applied);
    }
}
