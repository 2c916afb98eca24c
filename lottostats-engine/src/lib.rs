pub mod combinations;
pub mod config;
pub mod detail;
pub mod fixtures;
pub mod frequency;
pub mod gaps;
pub mod hot_cold;
pub mod quick_pick;
pub mod recommend;
pub mod ticket;
