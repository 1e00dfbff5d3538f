//! Unit tests for ocr-provision
//!
//! These tests use mocked dependencies and run fast without external I/O.

mod helpers;
mod property_tests;
