pub mod batch;
pub mod indexing;
pub mod lightbox;
pub mod onboarding;
