//! Change propagation between views sharing one portal.

pub mod change_bus;
