pub mod eprint_client;

pub use eprint_client::{eprint_link, link_filename, Downloaded, EprintClient};
