pub mod health;
pub mod translation;
