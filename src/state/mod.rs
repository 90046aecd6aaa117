pub mod app_settings;
pub mod app_state;
pub mod detail;
pub mod entity;
pub mod filters;
pub mod form;
pub mod list;
pub mod memo;
pub mod messages;
pub mod network;
pub mod page;
