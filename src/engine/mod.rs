pub mod allocation;
pub mod lifecycle;
pub mod matching;
pub mod pricing;
