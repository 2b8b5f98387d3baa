pub mod repository;
pub mod service;
pub mod split_service;
