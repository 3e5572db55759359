//! LSP (Language Server Protocol) implementation layer
//!
//! # Modules
//!
//! - [`backend`]: Main LSP backend implementing `LanguageServer` trait
//! - [`diagnostics`]: Uppercase-word diagnostics generation
//! - [`publisher`]: Ticketed publication that drops superseded results
//! - [`code_action`]: Lowercase quick fixes for published diagnostics
//! - [`command`]: Version-fenced reverse command
//! - [`edit`]: Edit submission boundary to the client
//! - [`completion`]: Static completion items and resolve
//! - [`formatting`]: Formatting stub
//! - [`server`]: LSP server initialization and lifecycle

pub mod backend;
pub mod code_action;
pub mod command;
pub mod completion;
pub mod diagnostics;
pub mod edit;
pub mod error;
pub mod formatting;
pub mod publisher;
pub mod server;
