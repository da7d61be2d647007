use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use tokio::{net::TcpListener, signal::ctrl_c, sync::mpsc};

use blog_core::{
    config::BlogConfig,
    constant::CONFIG_ENV,
    post::{PostDraft, PostPatch},
    query::{self, SearchCriteria, SortDirection, SortField},
    state::{ErrorResponse, MessageResponse, PostsResponse},
    store::{self, PostStore},
    BlogError, BlogResult, Command, StoreCommand,
};

use server::{
    handle_conn_request, interprocess::respond_with_bytes, setup_server, ServerError,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, value_name = "FILE")]
    /// Path to config file; defaults to ~/.masterblog/config.toml
    config: Option<PathBuf>,

    #[arg(short, long)]
    /// Socket address to listen on; overrides the config file
    socket_addr: Option<SocketAddr>,

    #[arg(long)]
    /// Path to the JSON store document; overrides the config file
    store: Option<PathBuf>,

    #[arg(long, action = ArgAction::SetTrue)]
    /// Serve a throwaway store under the temp dir and delete it on exit
    ephemeral: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = resolve_config(&cli);
    let socket = cli.socket_addr.unwrap_or(config.socket);
    let ephemeral = cli.ephemeral;
    let store_path = if ephemeral {
        store::generate_temp_store()
    } else {
        cli.store.clone().unwrap_or(config.store)
    };

    let (tx, mut rx) = mpsc::channel(16);

    let store_path_outer = store_path.to_owned();
    let store_handle = tokio::spawn(async move {
        //-------
        // Setups
        //-------
        println!("Store task running...");
        let store = setup_server(store_path).expect("Unable to setup store");
        println!("Serving posts from {}", store.path().display());

        //-------
        // Handle requests from the conn handler
        //-------
        while let Some(StoreCommand { cmd, resp }) = rx.recv().await {
            let Some(responder) = resp else { continue };
            let payload = dispatch(&store, cmd).unwrap_or_else(failure_payload);
            respond_with_bytes(responder, payload);
        }
    });

    let conn_handle = tokio::spawn(async move {
        println!("Setting up connection handler...");
        let listener = TcpListener::bind(socket).await.expect("Unable to bind socket");
        println!("Listening on {}...", listener.local_addr().expect("No local address"));

        loop {
            let _tx = tx.clone();
            let conn = listener.accept().await;

            if let Ok((stream, _)) = conn {
                tokio::spawn(async move {
                    handle_conn_request(stream, _tx).await;
                });
            }
        }
    });

    let safe_exit_handle = tokio::spawn(async move {
        ctrl_c().await.expect("Unable to listen for ctrl-c");
        println!("\nCtrl-C");
        if ephemeral {
            std::fs::remove_file(store_path_outer).expect("Unable to remove store file");
        }
        std::process::exit(0);
    });

    if ephemeral {
        println!("Press Ctrl-C to stop the server; this also deletes the throwaway store");
    }

    //-------
    // Wait for all threads
    //-------
    conn_handle.await.unwrap();
    store_handle.await.unwrap();
    safe_exit_handle.await.unwrap();
}

/// Config file resolution order: --config, then $MASTERBLOGCONF, then
/// the default location. A missing file falls back to defaults.
fn resolve_config(cli: &Cli) -> BlogConfig {
    let path = cli
        .config
        .clone()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(BlogConfig::default_path);
    if path.is_file() {
        match BlogConfig::load(&path) {
            Ok(config) => return config,
            Err(e) => eprintln!("Ignoring unreadable config {}: {e}", path.display()),
        }
    }
    BlogConfig::default()
}

/// Run one command against the store and serialize the success payload.
/// Failures bubble out as errors and are mapped in `failure_payload`.
fn dispatch(store: &PostStore, cmd: Command) -> BlogResult<Vec<u8>> {
    match cmd {
        Command::List { sort, direction } => list_posts(store, sort, direction),

        Command::Create {
            title,
            content,
            author,
            date,
        } => {
            let post = store.add(PostDraft {
                title,
                content,
                author,
                date,
            })?;
            Ok(serde_json::to_vec(&post)?)
        }

        Command::Update {
            id,
            title,
            content,
            author,
            date,
        } => {
            let post = store.update(
                id,
                PostPatch {
                    title,
                    content,
                    author,
                    date,
                },
            )?;
            Ok(serde_json::to_vec(&post)?)
        }

        Command::Delete { id } => match store.delete(id)? {
            Some(post) => Ok(serde_json::to_vec(&MessageResponse::deleted(post.id()))?),
            None => Ok(serde_json::to_vec(&ErrorResponse::id_not_found())?),
        },

        Command::Search {
            title,
            content,
            author,
            date,
        } => {
            let posts = store.search(&SearchCriteria {
                title,
                content,
                author,
                date,
            })?;
            Ok(serde_json::to_vec(&PostsResponse { posts })?)
        }

        Command::Get { id } => match store.get(id)? {
            Some(post) => Ok(serde_json::to_vec(&post)?),
            None => Ok(serde_json::to_vec(&ErrorResponse::id_not_found())?),
        },

        Command::Metadata {} => Ok(serde_json::to_vec(&store.metadata()?)?),
    }
}

/// Sort arguments are validated here, before the store is asked to
/// reorder anything; the store itself assumes pre-validated values.
fn list_posts(
    store: &PostStore,
    sort: Option<String>,
    direction: Option<String>,
) -> BlogResult<Vec<u8>> {
    let posts = store.load()?;
    let posts = if sort.is_none() && direction.is_none() {
        posts
    } else {
        // both must be present and valid; an absent one fails its own
        // parse with the descriptive message
        let field: SortField = sort.as_deref().unwrap_or_default().parse()?;
        let dir: SortDirection = direction.as_deref().unwrap_or_default().parse()?;
        query::sort_posts(posts, field, dir)?
    };
    Ok(serde_json::to_vec(&PostsResponse { posts })?)
}

/// Map a failed operation onto the wire payload the adapter contract
/// promises: not-found gets the fixed payload, validation and storage
/// errors carry their own message.
fn failure_payload(err: anyhow::Error) -> Vec<u8> {
    let response = match err.downcast_ref::<BlogError>() {
        Some(BlogError::PostNotFound { .. }) => ErrorResponse::id_not_found(),
        Some(inner) => ErrorResponse {
            error: inner.to_string(),
        },
        None => ErrorResponse {
            error: ServerError::custom_error(format!("request failed: {err}")).to_string(),
        },
    };
    serde_json::to_vec(&response).unwrap_or_default()
}
