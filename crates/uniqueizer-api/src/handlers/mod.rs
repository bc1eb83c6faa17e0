pub mod index;
pub mod process;
