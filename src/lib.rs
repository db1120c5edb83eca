pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod plans;
pub mod remote;
pub mod state;
