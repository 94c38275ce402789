//! Core use-case services.
//!
//! # Responsibility
//! - Translate wire requests into repository calls and back.
//! - Own transaction boundaries for multi-call units of work.

pub mod article_service;
