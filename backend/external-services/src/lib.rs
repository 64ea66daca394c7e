pub mod configs;
pub mod logger;
pub mod normalizer;
pub mod service;
