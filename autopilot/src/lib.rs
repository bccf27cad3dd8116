pub mod benchmark;
pub mod course;
pub mod rng;
pub mod runner;
pub mod util;
