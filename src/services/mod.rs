pub mod attachments;
pub mod generator;
pub mod notifier;
pub mod publisher;
pub mod site_files;
