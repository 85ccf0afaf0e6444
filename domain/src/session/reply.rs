//! Provider-neutral result of one generation step.

use crate::tool::entities::ToolCall;

/// Either the model wants tools run, or it has produced a draft answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelReply {
    ToolCalls(Vec<ToolCall>),
    Draft(String),
}
