//! Backend side of the desktop app: command queue, notifier, and the worker runtime.

pub mod commands;
pub mod notifier;
pub mod runtime;
