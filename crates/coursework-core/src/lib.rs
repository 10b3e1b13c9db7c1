//! coursework-core — course tree loading, problem decoding, and quiz grading.
//!
//! This crate reads course directories (configuration, access rules, tasks,
//! and an optional syllabus) into typed values, grades quiz submissions, and
//! projects courses into views that are safe to show students.

pub mod access;
pub mod config;
pub mod error;
pub mod grading;
pub mod loader;
pub mod problem;
pub mod runner;
pub mod settings;
pub mod syllabus;
pub mod task;
pub mod view;
