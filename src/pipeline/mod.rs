pub mod filter;
pub mod parser;
pub mod render;
pub mod serialize;

pub use filter::*;
pub use parser::*;
pub use render::*;
pub use serialize::*;
