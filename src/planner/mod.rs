//! Two-stage planning pipeline
//!
//! Per trial: goal -> subgoal prompt -> oracle -> subgoals -> action prompt
//! -> oracle -> normalized actions. Every stage degrades to "empty" on
//! failure; the only fallback decision is made once, in [`Planner::plan_trial`].

use crate::core::config::ActionStyle;
use crate::core::error::PlannerError;
use crate::core::types::{ActionRecord, PlanResult, Trial};
use crate::llm::client::Oracle;
use crate::llm::parser::{parse_actions, parse_subgoals};
use crate::llm::prompts::{action_prompt, subgoal_prompt, PromptPair};
use crate::scene::safety::SafetyRuleTable;

/// Why a stage produced nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyReason {
    /// The oracle call failed (transport, status, timeout)
    Unavailable(String),
    /// The oracle replied but nothing usable could be parsed
    Unparseable,
}

/// Output of one pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub enum StageOutput<T> {
    Produced(T),
    Empty(EmptyReason),
}

impl<T> StageOutput<Vec<T>> {
    /// Produced when `items` is non-empty, otherwise `Empty(Unparseable)`
    pub fn from_parsed(items: Vec<T>) -> Self {
        if items.is_empty() {
            Self::Empty(EmptyReason::Unparseable)
        } else {
            Self::Produced(items)
        }
    }
}

impl<T: Default> StageOutput<T> {
    /// The produced value, or the empty default
    pub fn unwrap_or_default(self) -> T {
        match self {
            Self::Produced(value) => value,
            Self::Empty(_) => T::default(),
        }
    }
}

/// Terminal state of one trial
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    Planned(Vec<ActionRecord>),
    Fallback,
}

impl TrialOutcome {
    /// The action list to emit. Never empty.
    pub fn into_actions(self) -> Vec<ActionRecord> {
        match self {
            Self::Planned(actions) => actions,
            Self::Fallback => vec![ActionRecord::done()],
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

/// Drives the pipeline over a batch of trials
///
/// Holds at most one oracle for the batch's lifetime. Without one, every
/// trial falls back immediately.
pub struct Planner<'a> {
    oracle: Option<&'a dyn Oracle>,
    safety_rules: SafetyRuleTable,
    action_style: ActionStyle,
}

impl<'a> Planner<'a> {
    pub fn new(
        oracle: &'a dyn Oracle,
        safety_rules: SafetyRuleTable,
        action_style: ActionStyle,
    ) -> Self {
        Self {
            oracle: Some(oracle),
            safety_rules,
            action_style,
        }
    }

    /// A planner with no oracle configured: every trial falls back
    pub fn without_oracle() -> Self {
        Self {
            oracle: None,
            safety_rules: SafetyRuleTable::new(),
            action_style: ActionStyle::default(),
        }
    }

    pub fn has_oracle(&self) -> bool {
        self.oracle.is_some()
    }

    /// Plan every trial with a non-blank id, in input order
    ///
    /// Trials are processed one after another; one trial's failures never
    /// affect another's outcome.
    pub async fn plan_batch(&self, trials: &[Trial]) -> PlanResult {
        let mut result = PlanResult::new();

        if self.oracle.is_none() {
            tracing::info!("No oracle configured - {} trial(s) fall back", trials.len());
        }

        for trial in trials {
            let Some(key) = trial.key() else {
                tracing::debug!("Skipping trial with blank id");
                continue;
            };

            let outcome = self.plan_trial(trial).await;
            if outcome.is_fallback() {
                tracing::info!(trial_id = key, "Trial fell back to Done");
            }
            result.insert(key, outcome.into_actions());
        }

        result
    }

    /// Run both stages for one trial
    pub async fn plan_trial(&self, trial: &Trial) -> TrialOutcome {
        let Some(oracle) = self.oracle else {
            return TrialOutcome::Fallback;
        };

        let subgoals = self.subgoal_stage(oracle, trial).await;
        if let StageOutput::Empty(reason) = &subgoals {
            tracing::warn!(
                trial_id = %trial.trial_id,
                ?reason,
                "No subgoals, planning from goal alone"
            );
        }
        let subgoals = subgoals.unwrap_or_default();

        match self.action_stage(oracle, trial, &subgoals).await {
            StageOutput::Produced(actions) => {
                tracing::info!(
                    trial_id = %trial.trial_id,
                    subgoals = subgoals.len(),
                    actions = actions.len(),
                    "Trial planned"
                );
                TrialOutcome::Planned(actions)
            }
            StageOutput::Empty(reason) => {
                tracing::warn!(trial_id = %trial.trial_id, ?reason, "No usable actions");
                TrialOutcome::Fallback
            }
        }
    }

    async fn subgoal_stage(
        &self,
        oracle: &dyn Oracle,
        trial: &Trial,
    ) -> StageOutput<Vec<String>> {
        let constraints = self.safety_rules.constraints_for(&trial.metadata.objects);
        let prompt = subgoal_prompt(trial, &constraints);
        match ask(oracle, &prompt).await {
            Ok(text) => StageOutput::from_parsed(parse_subgoals(&text)),
            Err(reason) => StageOutput::Empty(reason),
        }
    }

    async fn action_stage(
        &self,
        oracle: &dyn Oracle,
        trial: &Trial,
        subgoals: &[String],
    ) -> StageOutput<Vec<ActionRecord>> {
        let prompt = action_prompt(trial, subgoals, self.action_style);
        match ask(oracle, &prompt).await {
            Ok(text) => StageOutput::from_parsed(parse_actions(&text)),
            Err(reason) => StageOutput::Empty(reason),
        }
    }
}

async fn ask(oracle: &dyn Oracle, prompt: &PromptPair) -> Result<String, EmptyReason> {
    oracle
        .complete(&prompt.system, &prompt.user)
        .await
        .map_err(|e: PlannerError| {
            tracing::debug!("Oracle call failed: {}", e);
            EmptyReason::Unavailable(e.to_string())
        })
}
