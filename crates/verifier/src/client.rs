//! Manager API abstraction for testability.
//!
//! The [`ManagerClient`] trait abstracts the NAT-rule HTTP API, allowing
//! production code to use [`HttpManagerClient`] while tests use in-memory
//! fakes.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────┐
//! │ LifecycleVerifier │
//! │  ScenarioRunner   │
//! └─────────┬─────────┘
//!           │
//!           ▼
//!    ┌──────────────┐
//!    │ManagerClient │ (trait)
//!    └──────────────┘
//!        │      │
//!        ▼      ▼
//!    ┌──────┐ ┌────┐
//!    │ HTTP │ │Mock│
//!    └───┬──┘ └────┘
//!        │
//!        ▼
//!   Manager API
//! ```
//!
//! # Error Mapping
//!
//! - **Structured 404**: [`VerifierError::NotFound`] — the only error class
//!   the destroy check accepts as proof of absence
//! - **Other non-success statuses**: [`VerifierError::Remote`]
//! - **Connection-level failures**: [`VerifierError::Transport`]
//! - **Malformed bodies**: [`VerifierError::Decode`]
//!
//! # Identifier Validation
//!
//! Router and rule identifiers are interpolated into request paths, so
//! every method validates them first: non-empty, at most 128 characters,
//! and restricted to `[A-Za-z0-9._:-]`.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use natcheck_core::types::{ObservedRule, RuleSpec};

use crate::config::VerifierConfig;
use crate::error::VerifierError;

/// Validates an identifier before it is used in a request path.
fn validate_identifier(field: &str, id: &str) -> Result<(), VerifierError> {
    if id.is_empty() || id.len() > 128 {
        return Err(VerifierError::Config {
            field: field.to_owned(),
            reason: format!("invalid identifier length {} (must be 1-128)", id.len()),
        });
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':'))
    {
        return Err(VerifierError::Config {
            field: field.to_owned(),
            reason: "identifier contains characters outside [A-Za-z0-9._:-]".to_owned(),
        });
    }
    Ok(())
}

/// Trait abstracting the manager's NAT-rule API.
///
/// All remote calls from the verifier and the scenario runner go through
/// this trait, enabling testability via in-memory fakes. The read side
/// (`get_nat_rule`) is the contract spec'd for verification; the write
/// side is what the scenario runner uses to drive the lifecycle.
pub trait ManagerClient: Send + Sync + 'static {
    /// Reads a NAT rule. Idempotent; never cached by callers.
    ///
    /// # Errors
    ///
    /// - [`VerifierError::NotFound`]: the manager answered with a
    ///   structured 404
    /// - [`VerifierError::Remote`]: any other non-success status
    /// - [`VerifierError::Transport`]: the request never completed
    fn get_nat_rule(
        &self,
        router_id: &str,
        rule_id: &str,
    ) -> impl Future<Output = Result<ObservedRule, VerifierError>> + Send;

    /// Creates a NAT rule on the given router and returns the manager's
    /// view of it (including the system-assigned id).
    fn create_nat_rule(
        &self,
        router_id: &str,
        spec: &RuleSpec,
    ) -> impl Future<Output = Result<ObservedRule, VerifierError>> + Send;

    /// Replaces an existing NAT rule in place (same logical slot).
    ///
    /// Returns the manager's view after the update; callers refresh their
    /// handle from it, so a manager that reassigns ids is tolerated.
    fn update_nat_rule(
        &self,
        router_id: &str,
        rule_id: &str,
        spec: &RuleSpec,
    ) -> impl Future<Output = Result<ObservedRule, VerifierError>> + Send;

    /// Deletes a NAT rule.
    fn delete_nat_rule(
        &self,
        router_id: &str,
        rule_id: &str,
    ) -> impl Future<Output = Result<(), VerifierError>> + Send;

    /// Checks manager connectivity.
    fn ping(&self) -> impl Future<Output = Result<(), VerifierError>> + Send;
}

/// Production manager client over HTTP.
///
/// Issues JSON requests against `{endpoint}{api_prefix}/logical-routers/
/// {router}/nat/rules[/{rule}]` with basic auth. Timeout handling lives
/// entirely here; callers issue one blocking call at a time and never
/// retry.
pub struct HttpManagerClient {
    http: reqwest::Client,
    base: String,
    username: String,
    password: String,
}

impl HttpManagerClient {
    /// Builds a client from a validated [`VerifierConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`VerifierError::Config`] when the configuration is
    /// invalid and [`VerifierError::Transport`] when the underlying HTTP
    /// client cannot be constructed.
    pub fn new(config: &VerifierConfig) -> Result<Self, VerifierError> {
        config.validate()?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| VerifierError::Transport(format!("failed to build http client: {e}")))?;

        let base = format!(
            "{}{}",
            config.endpoint.trim_end_matches('/'),
            config.api_prefix,
        );

        Ok(Self {
            http,
            base,
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    fn rules_url(&self, router_id: &str) -> String {
        format!("{}/logical-routers/{router_id}/nat/rules", self.base)
    }

    fn rule_url(&self, router_id: &str, rule_id: &str) -> String {
        format!("{}/{rule_id}", self.rules_url(router_id))
    }

    /// Maps a non-success response into the structured error taxonomy.
    async fn error_for(
        router_id: &str,
        rule_id: Option<&str>,
        response: reqwest::Response,
    ) -> VerifierError {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(rule_id) = rule_id {
                return VerifierError::NotFound {
                    router_id: router_id.to_owned(),
                    rule_id: rule_id.to_owned(),
                };
            }
        }
        let message = response.text().await.unwrap_or_default();
        VerifierError::Remote {
            status: status.as_u16(),
            message,
        }
    }

    async fn decode_rule(response: reqwest::Response) -> Result<ObservedRule, VerifierError> {
        response
            .json::<ObservedRule>()
            .await
            .map_err(|e| VerifierError::Decode(e.to_string()))
    }
}

impl ManagerClient for HttpManagerClient {
    async fn get_nat_rule(
        &self,
        router_id: &str,
        rule_id: &str,
    ) -> Result<ObservedRule, VerifierError> {
        validate_identifier("logical_router_id", router_id)?;
        validate_identifier("rule_id", rule_id)?;

        debug!(router_id, rule_id, "reading nat rule");
        let response = self
            .http
            .get(self.rule_url(router_id, rule_id))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| VerifierError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(router_id, Some(rule_id), response).await);
        }
        Self::decode_rule(response).await
    }

    async fn create_nat_rule(
        &self,
        router_id: &str,
        spec: &RuleSpec,
    ) -> Result<ObservedRule, VerifierError> {
        validate_identifier("logical_router_id", router_id)?;
        spec.validate()?;

        debug!(router_id, display_name = %spec.display_name, "creating nat rule");
        let response = self
            .http
            .post(self.rules_url(router_id))
            .basic_auth(&self.username, Some(&self.password))
            .json(spec)
            .send()
            .await
            .map_err(|e| VerifierError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(router_id, None, response).await);
        }
        Self::decode_rule(response).await
    }

    async fn update_nat_rule(
        &self,
        router_id: &str,
        rule_id: &str,
        spec: &RuleSpec,
    ) -> Result<ObservedRule, VerifierError> {
        validate_identifier("logical_router_id", router_id)?;
        validate_identifier("rule_id", rule_id)?;
        spec.validate()?;

        debug!(router_id, rule_id, display_name = %spec.display_name, "updating nat rule");
        let response = self
            .http
            .put(self.rule_url(router_id, rule_id))
            .basic_auth(&self.username, Some(&self.password))
            .json(spec)
            .send()
            .await
            .map_err(|e| VerifierError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(router_id, Some(rule_id), response).await);
        }
        Self::decode_rule(response).await
    }

    async fn delete_nat_rule(&self, router_id: &str, rule_id: &str) -> Result<(), VerifierError> {
        validate_identifier("logical_router_id", router_id)?;
        validate_identifier("rule_id", rule_id)?;

        debug!(router_id, rule_id, "deleting nat rule");
        let response = self
            .http
            .delete(self.rule_url(router_id, rule_id))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| VerifierError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_for(router_id, Some(rule_id), response).await);
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), VerifierError> {
        let response = self
            .http
            .get(format!("{}/node", self.base))
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|e| VerifierError::Transport(format!("ping failed: {e}")))?;

        if !response.status().is_success() {
            return Err(VerifierError::Remote {
                status: response.status().as_u16(),
                message: "ping returned non-success status".to_owned(),
            });
        }
        Ok(())
    }
}

/// 테스트용 Mock 매니저 클라이언트
///
/// 메모리 내 규칙 저장소를 유지하며, 매니저 없이도 생명주기 전체를
/// 실행할 수 있습니다.
#[cfg(test)]
pub struct MockManagerClient {
    rules: tokio::sync::Mutex<Vec<ObservedRule>>,
    next_id: std::sync::atomic::AtomicU64,
    /// 모든 호출을 전송 오류로 실패시킬지 여부
    pub fail_transport: bool,
}

#[cfg(test)]
impl MockManagerClient {
    pub fn new() -> Self {
        Self {
            rules: tokio::sync::Mutex::new(Vec::new()),
            next_id: std::sync::atomic::AtomicU64::new(1),
            fail_transport: false,
        }
    }

    pub fn with_failing_transport(mut self) -> Self {
        self.fail_transport = true;
        self
    }

    pub async fn rule_count(&self) -> usize {
        self.rules.lock().await.len()
    }

    fn observed_from(&self, router_id: &str, id: String, spec: &RuleSpec) -> ObservedRule {
        ObservedRule {
            id,
            logical_router_id: router_id.to_owned(),
            display_name: spec.display_name.clone(),
            description: spec.description.clone(),
            action: spec.action,
            translated_network: spec.translated_network.clone(),
            match_destination_network: spec.match_destination_network.clone(),
            match_source_network: spec.match_source_network.clone(),
            enabled: spec.enabled,
            logging: spec.logging,
            nat_pass: spec.nat_pass,
            tags: spec.tags.clone(),
        }
    }

    fn check_transport(&self) -> Result<(), VerifierError> {
        if self.fail_transport {
            return Err(VerifierError::Transport("mock transport failure".to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
impl ManagerClient for MockManagerClient {
    async fn get_nat_rule(
        &self,
        router_id: &str,
        rule_id: &str,
    ) -> Result<ObservedRule, VerifierError> {
        self.check_transport()?;
        self.rules
            .lock()
            .await
            .iter()
            .find(|r| r.logical_router_id == router_id && r.id == rule_id)
            .cloned()
            .ok_or_else(|| VerifierError::NotFound {
                router_id: router_id.to_owned(),
                rule_id: rule_id.to_owned(),
            })
    }

    async fn create_nat_rule(
        &self,
        router_id: &str,
        spec: &RuleSpec,
    ) -> Result<ObservedRule, VerifierError> {
        self.check_transport()?;
        spec.validate()?;
        let id = format!(
            "nat-{}",
            self.next_id
                .fetch_add(1, std::sync::atomic::Ordering::Relaxed)
        );
        let rule = self.observed_from(router_id, id, spec);
        self.rules.lock().await.push(rule.clone());
        Ok(rule)
    }

    async fn update_nat_rule(
        &self,
        router_id: &str,
        rule_id: &str,
        spec: &RuleSpec,
    ) -> Result<ObservedRule, VerifierError> {
        self.check_transport()?;
        spec.validate()?;
        let mut rules = self.rules.lock().await;
        let slot = rules
            .iter_mut()
            .find(|r| r.logical_router_id == router_id && r.id == rule_id)
            .ok_or_else(|| VerifierError::NotFound {
                router_id: router_id.to_owned(),
                rule_id: rule_id.to_owned(),
            })?;
        *slot = self.observed_from(router_id, rule_id.to_owned(), spec);
        Ok(slot.clone())
    }

    async fn delete_nat_rule(&self, router_id: &str, rule_id: &str) -> Result<(), VerifierError> {
        self.check_transport()?;
        let mut rules = self.rules.lock().await;
        let before = rules.len();
        rules.retain(|r| !(r.logical_router_id == router_id && r.id == rule_id));
        if rules.len() == before {
            return Err(VerifierError::NotFound {
                router_id: router_id.to_owned(),
                rule_id: rule_id.to_owned(),
            });
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), VerifierError> {
        self.check_transport()
    }
}
