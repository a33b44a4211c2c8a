//! Practice scenario configuration: industry, customer persona, MOT stage
//! and the coaching playbook behind the simulated customer prompt.

mod config;
mod playbook;

pub use config::{Industry, Persona, PracticeConfig, Stage, VOICE_NAMES};
pub use playbook::{system_instruction, Playbook, PlaybookEntry};
