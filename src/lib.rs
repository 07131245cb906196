pub mod cli;
pub mod data_paths;
pub mod logging;
pub mod portfolio;
pub mod pricing;
pub mod storage;
pub mod ticker;
