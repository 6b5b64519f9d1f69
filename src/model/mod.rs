pub mod data_core;
pub mod expansion;
pub mod observer;
pub mod parser;
pub mod performance;
pub mod shadow_tree;
pub mod tree_index;
