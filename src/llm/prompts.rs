//! Prompt templates for the two planning stages
//!
//! Both builders are pure string templates over the trial's scene: the
//! subgoal prompt decomposes the goal, the action prompt expands subgoals
//! into an executable action array.

use crate::core::config::ActionStyle;
use crate::core::types::Trial;
use crate::scene::render::{render_inventory, render_objects, render_pose};

/// A system + user message pair for one oracle call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Shown in place of the subgoal list when decomposition produced nothing
pub const NO_VALID_SUBGOALS: &str =
    "No valid subgoals were produced. Plan directly from the goal and the scene as a baseline.";

/// Build the goal-decomposition prompt
pub fn subgoal_prompt(trial: &Trial, safety_constraints: &str) -> PromptPair {
    let scene = &trial.metadata;
    let user = format!(
        "GOAL:\n{}\n\nAGENT:\n{}\n\nOBJECTS:\n{}\n\nSAFETY CONSTRAINTS:\n{}\n\n{}",
        trial.goal_instruction,
        render_pose(&scene.agent),
        render_objects(&scene.objects, false),
        safety_constraints,
        SUBGOAL_OUTPUT_INSTRUCTIONS,
    );

    PromptPair {
        system: SUBGOAL_SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// Build the action-sequence prompt for the chosen vocabulary
pub fn action_prompt(trial: &Trial, subgoals: &[String], style: ActionStyle) -> PromptPair {
    let scene = &trial.metadata;
    let user = format!(
        "GOAL:\n{}\n\nAGENT:\n{}\nHolding: {}\n\nSUBGOALS (achieve in order):\n{}\n\nOBJECTS:\n{}\n\n{}\n\n{}",
        trial.goal_instruction,
        render_pose(&scene.agent),
        render_inventory(scene),
        numbered_subgoals(subgoals),
        render_objects(&scene.objects, false),
        action_vocabulary(style),
        ACTION_OUTPUT_INSTRUCTIONS,
    );

    PromptPair {
        system: ACTION_SYSTEM_PROMPT.to_string(),
        user,
    }
}

/// `1. first\n2. second`, or the no-subgoals notice
pub fn numbered_subgoals(subgoals: &[String]) -> String {
    if subgoals.is_empty() {
        return NO_VALID_SUBGOALS.to_string();
    }
    subgoals
        .iter()
        .enumerate()
        .map(|(i, s)| format!("{}. {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Action list for the chosen vocabulary, followed by the shared rules
pub fn action_vocabulary(style: ActionStyle) -> String {
    let movement = match style {
        ActionStyle::Goto => GOTO_ACTIONS,
        ActionStyle::Primitive => PRIMITIVE_ACTIONS,
    };
    let example = match style {
        ActionStyle::Goto => GOTO_EXAMPLE,
        ActionStyle::Primitive => PRIMITIVE_EXAMPLE,
    };
    format!(
        "AVAILABLE ACTIONS:\n{}\n{}\n\n{}\n\nEXAMPLE OUTPUT:\n{}",
        movement, MANIPULATION_ACTIONS, PLANNING_RULES, example
    )
}

const SUBGOAL_SYSTEM_PROMPT: &str = r#"You are a task planner for a household robot in a simulated home.
Break the user's goal into a short ordered list of subgoals the robot must achieve in sequence.
Each subgoal is one concrete step that refers to objects by their type or id, e.g. "find the mug", "pick up Mug|1", "put the mug in the sink"."#;

const SUBGOAL_OUTPUT_INSTRUCTIONS: &str = r#"OUTPUT FORMAT:
Respond with strictly one JSON object and nothing else: no prose, no markdown fencing.
{"subgoals": ["first subgoal", "second subgoal"]}"#;

const ACTION_SYSTEM_PROMPT: &str = r#"You are an action planner for a household robot in a simulated home.
Convert ordered subgoals into a concrete sequence of executable actions using only the available actions and object ids present in the scene."#;

const GOTO_ACTIONS: &str = r#"- GotoLocation <object_id>: navigate next to an object"#;

const PRIMITIVE_ACTIONS: &str = r#"- MoveAhead: step forward
- MoveBack: step backward
- MoveLeft: step left
- MoveRight: step right
- RotateLeft: turn 90 degrees left
- RotateRight: turn 90 degrees right
- LookUp: tilt the camera up
- LookDown: tilt the camera down"#;

const MANIPULATION_ACTIONS: &str = r#"- PickupObject <object_id>: pick up an object
- PutObject <object_id> <receptacle_id>: place the held object into or onto a receptacle
- OpenObject <object_id>: open an object
- CloseObject <object_id>: close an object
- ToggleObjectOn <object_id>: switch an object on
- ToggleObjectOff <object_id>: switch an object off
- SliceObject <object_id>: slice an object (requires holding a knife)
- stop: finish the task"#;

const PLANNING_RULES: &str = r#"PLANNING RULES:
1. Achieve the subgoals in the given order.
2. Navigate to an object before interacting with it.
3. PutObject always takes two arguments: object_id and receptacle_id.
4. Open a closed receptacle before taking anything out of it.
5. End the sequence with a stop action."#;

const GOTO_EXAMPLE: &str = r#"[
  {"action": "GotoLocation", "object_id": "Fridge|-1.5|0.0|2.0"},
  {"action": "OpenObject", "object_id": "Fridge|-1.5|0.0|2.0"},
  {"action": "PickupObject", "object_id": "Egg|-1.4|0.8|2.1"},
  {"action": "GotoLocation", "object_id": "SinkBasin|0.5|0.9|1.0"},
  {"action": "PutObject", "object_id": "Egg|-1.4|0.8|2.1", "receptacle_id": "SinkBasin|0.5|0.9|1.0"},
  {"action": "stop"}
]"#;

const PRIMITIVE_EXAMPLE: &str = r#"[
  {"action": "RotateRight"},
  {"action": "MoveAhead"},
  {"action": "MoveAhead"},
  {"action": "OpenObject", "object_id": "Fridge|-1.5|0.0|2.0"},
  {"action": "PickupObject", "object_id": "Egg|-1.4|0.8|2.1"},
  {"action": "RotateLeft"},
  {"action": "MoveAhead"},
  {"action": "PutObject", "object_id": "Egg|-1.4|0.8|2.1", "receptacle_id": "SinkBasin|0.5|0.9|1.0"},
  {"action": "stop"}
]"#;

const ACTION_OUTPUT_INSTRUCTIONS: &str = r#"OUTPUT FORMAT:
Respond with strictly one JSON array of action objects and nothing else: no prose, no markdown fencing.
Each action object has an "action" field and, where the action takes arguments, "object_id" and "receptacle_id"."#;
