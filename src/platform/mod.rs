//! Platform glue
//!
//! The browser host lives in `web`. Native builds have no host of their own;
//! `main.rs` drives a session headlessly through `scheduler::ManualTimers`.

#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(target_arch = "wasm32")]
pub use web::GameHandle;
