// Front ends: the HTTP API and the interactive menu.

pub mod http;
pub mod menu;
pub mod table;
