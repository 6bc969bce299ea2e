//! # Observability
//!
//! Structured logging for the link and the simulator, built on `tracing`.
//! Library code only emits events; binaries call [`init_logging`] once.
//!
//! | Level   | Events                                                     |
//! |---------|------------------------------------------------------------|
//! | `warn`  | complex channel handed to the SVD, zero singular values    |
//! | `info`  | test start and per-test summary                            |
//! | `debug` | link construction, padding, seeds                          |
//! | `trace` | per-vector transmission                                    |

pub mod logging;

pub use logging::{init_logging, LogConfig, LogFormat, LogLevel};
