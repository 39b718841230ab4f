// Library surface for headless/integration tests and reuse.
// Rendering stays in the binary; everything here is plain data.
pub mod analyzer;
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod export;
pub mod passages;
pub mod recorder;
pub mod runtime;
pub mod session;
pub mod util;
