pub mod auth;
pub mod cart;
pub mod catalog;
pub mod connection;
pub mod domain;
pub mod identity;
pub mod orders;
pub mod ports;
