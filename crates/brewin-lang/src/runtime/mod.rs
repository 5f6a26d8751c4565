pub mod value;
pub mod env;
pub mod object;
pub mod interpreter;
