pub mod application;
pub mod candidate;
pub mod draft;
pub mod interview;
pub mod job;
pub mod notification;
pub mod offer;
pub mod pipeline;
pub mod position;
pub mod user;
