//! Background loading of island grids and pixel regions

pub mod async_loader;

pub use async_loader::{AsyncLoader, LoadTask};
