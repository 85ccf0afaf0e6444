//! Topic classifiers for the input guard.

pub mod keyword;
pub mod model;

pub use keyword::KeywordClassifier;
pub use model::ModelClassifier;
