pub mod catalog;
pub mod expeditions;
pub mod health;
pub mod items;
pub mod players;
pub mod time;
