#![allow(dead_code)]

pub mod backends;
pub mod builders;

pub use backends::*;
pub use builders::*;
