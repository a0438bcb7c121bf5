//! 시나리오 리포트 — 단계별 검증 결과
//!
//! 시나리오 러너가 각 상태 전이를 기록하고, CLI가 텍스트/JSON으로
//! 출력합니다. 리포트는 단일 시나리오 실행 내에서 생성되어 소비되는
//! 일회성 값입니다.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 시나리오 상태 전이 단계
///
/// `Declared -> Applied -> Verified -> Updated -> ReVerified
/// -> Destroyed -> VerifiedAbsent` 순서로 진행됩니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStep {
    /// 생성 설정 적용
    Applied,
    /// 생성 결과 검증
    Verified,
    /// 갱신 설정 적용
    Updated,
    /// 갱신 결과 검증
    ReVerified,
    /// 리소스 제거
    Destroyed,
    /// 제거 확인
    VerifiedAbsent,
}

impl ScenarioStep {
    /// 전체 단계를 실행 순서대로 반환합니다.
    pub fn all() -> [ScenarioStep; 6] {
        [
            ScenarioStep::Applied,
            ScenarioStep::Verified,
            ScenarioStep::Updated,
            ScenarioStep::ReVerified,
            ScenarioStep::Destroyed,
            ScenarioStep::VerifiedAbsent,
        ]
    }
}

impl fmt::Display for ScenarioStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScenarioStep::Applied => "applied",
            ScenarioStep::Verified => "verified",
            ScenarioStep::Updated => "updated",
            ScenarioStep::ReVerified => "re-verified",
            ScenarioStep::Destroyed => "destroyed",
            ScenarioStep::VerifiedAbsent => "verified-absent",
        };
        write!(f, "{name}")
    }
}

/// 단계 실행 결과
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum StepStatus {
    /// 통과
    Passed,
    /// 실패 (사유 포함)
    Failed(String),
}

impl StepStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, StepStatus::Passed)
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Passed => write!(f, "passed"),
            StepStatus::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// 단일 단계 리포트
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    /// 어느 단계인지
    pub step: ScenarioStep,
    /// 결과
    pub status: StepStatus,
    /// 소요 시간
    pub elapsed: Duration,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<16} {} ({:.1}ms)",
            self.step.to_string(),
            self.status,
            self.elapsed.as_secs_f64() * 1000.0,
        )
    }
}

/// 시나리오 전체 리포트
///
/// 실패한 단계 이후의 단계는 기록되지 않습니다 (각 검사는 현재
/// 검사에 대해 종결적이므로 이어서 실행할 의미가 없습니다).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    /// 시나리오 이름
    pub name: String,
    /// 단계별 결과 (실행 순서)
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    /// 빈 리포트를 생성합니다.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// 단계 결과를 기록합니다.
    pub fn record(&mut self, step: ScenarioStep, status: StepStatus, elapsed: Duration) {
        self.steps.push(StepReport {
            step,
            status,
            elapsed,
        });
    }

    /// 모든 기록된 단계가 통과했고 끝 단계까지 도달했는지 여부.
    pub fn passed(&self) -> bool {
        self.steps.len() == ScenarioStep::all().len()
            && self.steps.iter().all(|s| s.status.is_passed())
    }

    /// 첫 실패 단계를 반환합니다.
    pub fn first_failure(&self) -> Option<&StepReport> {
        self.steps.iter().find(|s| !s.status.is_passed())
    }
}

impl fmt::Display for ScenarioReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "scenario '{}': {}",
            self.name,
            if self.passed() { "PASS" } else { "FAIL" },
        )?;
        for step in &self.steps {
            writeln!(f, "  {step}")?;
        }
        Ok(())
    }
}
