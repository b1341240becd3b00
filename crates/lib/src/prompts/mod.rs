//! # Prompt Template Modules
//!
//! This module organizes the prompt templates used by the `dbchat` scenes.
//! It is divided into sub-modules based on the scene the prompts belong to.

pub mod chat_db;
