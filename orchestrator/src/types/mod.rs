pub mod constant;
pub mod health;
pub mod jobs;
pub mod params;
pub mod webhook;
