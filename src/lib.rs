//! Settlement AI - autonomous build orchestration for colony settlements

pub mod ai;
pub mod city;
pub mod core;
pub mod scheduler;
pub mod simulation;
