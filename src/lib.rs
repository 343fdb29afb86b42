// Library surface for headless/integration tests and reuse.
// The binary in main.rs only adds terminal setup and the CLI.
pub mod app;
pub mod card;
pub mod config;
pub mod game;
pub mod parser;
pub mod runtime;
pub mod speech;
pub mod ui;
