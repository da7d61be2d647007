//! Welcome to the documentation of masterblog. This crate owns the
//! canonical blog post collection: a durable JSON document on disk,
//! the validation applied before any mutation, and the sort/search
//! queries answered over it. Transport adapters live in the server
//! crate and talk to the store through the [`Command`] vocabulary.
mod error;
pub mod config;
pub mod post;
pub mod query;
pub mod state;
pub mod store;
pub mod validate;

pub use error::{BlogError, BlogResult};

pub mod constant {
    pub const CONFIG_DIR: &str = ".masterblog";
    pub const CONFIG_FILE: &str = "config.toml";
    pub const CONFIG_ENV: &str = "MASTERBLOGCONF";
    pub const STORE_FILE: &str = "posts.json";
}

/// Used to send acknowledgements to the connection handler.
pub type Responder<T> = tokio::sync::oneshot::Sender<T>;

/// One request from the adapter to the store task. Field members of
/// `Create`, `Update` and `Search` are optional on the wire; the store
/// decides what absence means for each operation.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum Command {
    List {
        #[serde(default)]
        sort: Option<String>,
        #[serde(default)]
        direction: Option<String>,
    },
    Create {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        author: Option<String>,
        #[serde(default)]
        date: Option<String>,
    },
    Update {
        id: u32,
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        author: Option<String>,
        #[serde(default)]
        date: Option<String>,
    },
    Delete {
        id: u32,
    },
    Search {
        #[serde(default)]
        title: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        author: Option<String>,
        #[serde(default)]
        date: Option<String>,
    },
    Get {
        id: u32,
    },
    Metadata {},
}

pub struct StoreCommand {
    pub cmd: Command,
    pub resp: Option<Responder<Vec<u8>>>,
}
