pub mod config;
pub mod daemon;
pub mod prompts;
pub mod run;
