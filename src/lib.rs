//! Conversation window engine (convwin)
//!
//! Window and tab management for a multi-protocol instant messenger: which
//! window a new conversation lands in, how tabs are merged, closed, parked
//! and dragged between windows, how unseen activity is tracked, and how
//! stored backlog and animated buddy icons are fed in without blocking.
//!
//! The library follows a Pure Core / Impure Shell split: `model`, `state`
//! and `scheduler` are plain data and functions, `engine` is the facade
//! collaborators drive, and `source`/`view` hold the scenario driver's I/O.

pub mod config;
pub mod engine;
pub mod logging;
pub mod model;
pub mod scheduler;
pub mod source;
pub mod state;
pub mod view;

// Script runner for the scenario driver
pub mod integration;
