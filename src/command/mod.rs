//! Message handling around the planner
//!
//! Inbound text -> InboundMessage -> Planner -> TaskReporter (status + artifact)

pub mod executor;
pub mod request;

pub use executor::{actions_artifact, respond, ConsoleReporter, MessageHandler, TaskReporter};
pub use request::InboundMessage;
