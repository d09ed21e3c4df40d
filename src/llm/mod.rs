//! Oracle access and oracle-output handling
//!
//! client -> raw text -> extract -> parser -> normalized records

pub mod client;
pub mod extract;
pub mod parser;
pub mod prompts;

pub use client::{Oracle, OracleClient};
pub use parser::{parse_actions, parse_subgoals};
pub use prompts::{action_prompt, subgoal_prompt, PromptPair};
