//! Core library for Scaffy.
//!
//! Holds everything the site does that is independent of HTTP: the field
//! validators and error taxonomy, form and error-map state, the async
//! submission tracker, the quote model, the hero reveal state machine, the
//! session provider contract and the lead intake seam. The server crate
//! renders pages on top of these.

pub mod action;
pub mod auth;
pub mod error;
pub mod form;
pub mod hero;
pub mod leads;
pub mod notice;
pub mod quote;
pub mod validation;
