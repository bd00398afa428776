pub mod advisor;
pub mod calculator;
pub mod extractor;
pub mod prompts;
pub mod session;
