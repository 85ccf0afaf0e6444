//! Prompt domain
//!
//! System prompt, corrective guidance and the canned texts the pipeline
//! releases when it refuses or falls back.

mod template;

pub use template::PromptTemplate;
