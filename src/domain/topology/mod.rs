pub mod dynamic_apsp;
pub mod graph;
pub mod path;
pub mod topology;
