pub mod engine;
pub mod protocol;
pub mod session;
pub mod error;
pub mod config;

pub mod apply_choice;
pub mod classify;
pub mod events;
pub mod graph;
pub mod odds;
pub mod termination;

pub mod prompt_builder;
pub mod llm_client;
