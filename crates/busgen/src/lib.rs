pub mod assemble;
pub mod ctype;
pub mod generate;
pub mod indent;
pub mod marshal;
pub mod report;
pub mod signature;
pub mod typevar;

pub const BUSGEN_VERSION: &str = env!("CARGO_PKG_VERSION");
