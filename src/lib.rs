//! Edgeless copilot: AI action dispatch and insertion for a whiteboard editor.
//!
//! SYSTEM CONTEXT
//! ==============
//! A completed AI answer flows from the provider into the panel, and from the
//! panel into the document through `actions::dispatch`. Menus expose the
//! action catalog; `routes` puts all of it behind HTTP.

pub mod actions;
pub mod config;
pub mod doc;
pub mod editor;
pub mod error;
pub mod host;
pub mod i18n;
pub mod images;
pub mod menu;
pub mod panel;
pub mod provider;
pub mod routes;
pub mod tasks;
pub mod telemetry;
