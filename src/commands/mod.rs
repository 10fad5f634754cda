pub mod history;
pub mod init;
pub mod lint;
pub mod list;
pub mod show;
pub mod status;
