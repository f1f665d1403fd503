#![cfg(test)]

pub mod exprs;
pub mod programs;
