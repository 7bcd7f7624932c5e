pub mod pom;
pub mod reactor;
pub mod repository;
pub mod service;
