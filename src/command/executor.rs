//! Message handling - runs the planner and reports to the task framework

use crate::command::request::InboundMessage;
use crate::core::config::PlannerConfig;
use crate::core::error::Result;
use crate::core::types::PlanResult;
use crate::llm::client::OracleClient;
use crate::planner::Planner;
use crate::scene::safety::SafetyRuleTable;
use async_trait::async_trait;
use serde::Serialize;
use std::io::Write;

/// Status message sent once planning starts
pub const PLANNING_STATUS: &str = "Planning actions...";

/// Status message sent before echoing an opaque message
pub const ECHO_STATUS: &str = "Thinking...";

/// Progress and result sink of the surrounding task framework
#[async_trait]
pub trait TaskReporter: Send {
    /// Report that the task is in progress
    async fn update_status(&mut self, message: &str) -> Result<()>;

    /// Attach a named result artifact
    async fn add_artifact(&mut self, name: &str, text: &str) -> Result<()>;
}

/// Artifact body: `{"actions": {trial_id: [...]}}`
#[derive(Serialize)]
struct ActionsArtifact<'a> {
    actions: &'a PlanResult,
}

/// Serialize a plan as the `Actions` artifact body
pub fn actions_artifact(plan: &PlanResult) -> Result<String> {
    Ok(serde_json::to_string(&ActionsArtifact { actions: plan })?)
}

/// Answer one decoded message using an already-built planner
pub async fn respond(
    message: InboundMessage,
    planner: &Planner<'_>,
    reporter: &mut dyn TaskReporter,
) -> Result<()> {
    match message {
        InboundMessage::Plan(trials) => {
            reporter.update_status(PLANNING_STATUS).await?;
            let plan = planner.plan_batch(&trials).await;
            reporter
                .add_artifact("Actions", &actions_artifact(&plan)?)
                .await
        }
        InboundMessage::Opaque(text) => {
            reporter.update_status(ECHO_STATUS).await?;
            reporter.add_artifact("Echo", &text).await
        }
    }
}

/// Handles inbound messages with a planner built from configuration
pub struct MessageHandler {
    config: PlannerConfig,
}

impl MessageHandler {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Decode and answer one message
    ///
    /// A plan request gets its own oracle client, dropped when the batch
    /// completes.
    pub async fn handle(&self, text: &str, reporter: &mut dyn TaskReporter) -> Result<()> {
        let message = InboundMessage::parse(text);

        let client = match &message {
            InboundMessage::Plan(trials) => {
                tracing::info!(trials = trials.len(), "Plan request received");
                self.connect()
            }
            InboundMessage::Opaque(_) => None,
        };

        let planner = match &client {
            Some(client) => Planner::new(
                client,
                SafetyRuleTable::load_or_empty(&self.config.safety_rules_path),
                self.config.action_style,
            ),
            None => Planner::without_oracle(),
        };

        respond(message, &planner, reporter).await
    }

    /// An oracle client, or `None` when no credential is configured
    fn connect(&self) -> Option<OracleClient> {
        if !self.config.oracle.has_credential() {
            return None;
        }
        match OracleClient::new(self.config.oracle.clone()) {
            Ok(client) => {
                tracing::info!(model = client.model(), "Oracle client ready");
                Some(client)
            }
            Err(e) => {
                tracing::warn!("Oracle client unavailable: {}", e);
                None
            }
        }
    }
}

/// Reports status on stderr and writes artifact bodies to `out`
pub struct ConsoleReporter<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[async_trait]
impl<W: Write + Send> TaskReporter for ConsoleReporter<W> {
    async fn update_status(&mut self, message: &str) -> Result<()> {
        eprintln!("[working] {}", message);
        Ok(())
    }

    async fn add_artifact(&mut self, name: &str, text: &str) -> Result<()> {
        tracing::debug!("Artifact {} ({} bytes)", name, text.len());
        writeln!(self.out, "{}", text)?;
        self.out.flush()?;
        Ok(())
    }
}
