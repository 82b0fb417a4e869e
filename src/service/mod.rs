//! Business logic between the Discord commands, the scheduler and the data layer.

pub mod event;
pub mod maintenance;
pub mod observer;
pub mod pacte;
pub mod points;
pub mod progress;
pub mod user;

#[cfg(test)]
mod test;
