pub mod complaint;
pub mod dashboard;
pub mod health;
pub mod onboarding;
pub mod store;
pub mod task;
