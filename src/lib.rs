pub mod access;
pub mod files_view;
pub mod links;
pub mod logging;
pub mod model;
pub mod remote;
pub mod store;
pub mod tui;

mod tui_shell;
