//! Embodied Planner - two-stage LLM action planning for household agents

pub mod command;
pub mod core;
pub mod llm;
pub mod planner;
pub mod scene;
