//! Mirror Study - Research-Survey Chatbot
//!
//! This crate implements a fixed-sequence experiment session: a participant
//! picks a chatbot condition, chats long enough for a style profile to be
//! derived, completes a short timed task conversation, and answers a survey
//! whose results are appended to a spreadsheet-backed store.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
