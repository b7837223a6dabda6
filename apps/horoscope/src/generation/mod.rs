// Content generation: daily predictions for sign pages and article bodies.
// All model calls go through llm_client; nothing here talks HTTP.

pub mod articles;
pub mod generator;
pub mod matching;
pub mod prediction;
pub mod prompts;
