pub mod batch_commands;
pub mod indexing_commands;
pub mod lightbox_commands;
pub mod onboarding_commands;
pub mod settings_commands;
