//! Market regime classification pipeline

mod classifier;
mod prompt;

pub use classifier::RegimeClassifier;
pub use prompt::{SYSTEM_PROMPT, regime_prompt};
