pub mod abi;
pub mod handle;
pub mod module;
