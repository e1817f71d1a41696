pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod i18n;
pub mod normalizer;
pub mod resolver;
pub mod retry;
pub mod selector;
pub mod upstream;
