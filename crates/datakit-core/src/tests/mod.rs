#![cfg(test)]

pub mod common;
pub mod integration_tests;
