pub mod cities;
pub mod courses;
pub mod games;
pub mod health;
pub mod holes;
pub mod players;
pub mod statistics;
pub mod strokes;
