/// Request middleware for the API server

pub mod auth;
