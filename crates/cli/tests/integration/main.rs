//! End-to-end tests driving the `kiln` binary against stand-in toolchains.

#![cfg(unix)]

mod common;

mod bootstrap_tests;
mod build_tests;
