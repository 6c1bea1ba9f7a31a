pub mod ai_provider;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod ocr;
pub mod scanner;
pub mod storage;
pub mod verify;
