// src/models/mod.rs

pub mod comment;
pub mod pagination;
