pub mod stats;
pub mod roster;
pub mod lifestyle;
pub mod scenario;
pub mod run_state;
pub mod outcome;

pub mod event_result;
pub mod message;
pub mod game_context;
pub mod game_save;
pub mod llm_decode;
