pub mod access;
pub mod bulk;
pub mod config;
pub mod file;
pub mod filter;
pub mod form;
pub mod notifications;
pub mod page;
pub mod refresh;
pub mod route;
pub mod sort;
pub mod spreadsheet;
pub mod store;
pub mod upload;
