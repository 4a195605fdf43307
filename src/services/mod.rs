// src/services/mod.rs

pub mod comment_tree;

pub use comment_tree::CommentTreeService;
