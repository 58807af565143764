//! Ticketgraph - a dependency graph engine for project tickets.
//!
//! Stores typed edges between tickets of a project (`blocks` and `related`),
//! keeps the blocking subgraph acyclic, and answers graph queries: the whole
//! project overlay or a bounded neighborhood around one ticket.
//!
//! The library can be embedded behind any transport through
//! [`service::DependencyService`]; the `ticketgraph` binary exposes the same
//! operations on the command line.

#![forbid(unsafe_code)]

// Public modules for library usage
pub mod domain;
pub mod error;
pub mod graph;
pub mod guard;
pub mod normalize;
pub mod service;
pub mod storage;
pub mod tickets;

// CLI support (needed by binary)
pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod output;
