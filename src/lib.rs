// math-advisor - Solve photographed math problems with Gemini
// Author: kelexine (https://github.com/kelexine)

pub mod cli;
pub mod config;
pub mod error;
pub mod gemini;
pub mod metrics;
pub mod models;
pub mod server;
pub mod solver;
pub mod utils;
pub mod vision;
