pub mod api;
pub mod entity;
pub mod geo;
pub mod infra;
pub mod repository;
pub mod service;
pub mod usecase;
