//! Problem definitions the search engine can be applied to

pub mod rest;
