// Integration tests for permshift

pub mod unit;
