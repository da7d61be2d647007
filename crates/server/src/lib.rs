mod error;

pub use error::ServerError;

use blog_core::{state::ErrorResponse, store::PostStore, Command, StoreCommand};
use std::path::PathBuf;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::{mpsc, oneshot},
};

/// 10Kb buffer
const BUFFER_SIZE: usize = 10240;

pub mod interprocess {
    use super::oneshot;

    /// Sending a response over a oneshot channel returns the input value
    /// as the error. So, no point in error handling thus this function.
    pub fn respond_with_bytes(responder: oneshot::Sender<Vec<u8>>, msg: Vec<u8>) {
        let _ = responder.send(msg);
    }
}

pub fn setup_server(store_path: PathBuf) -> anyhow::Result<PostStore> {
    PostStore::attach(store_path)
}

/// One request per connection: read a JSON command until EOF, forward it
/// to the store task and write the serialized response back. A body that
/// fails to decode is answered with the fixed decode-error payload
/// without ever reaching the store.
pub async fn handle_conn_request(mut conn: TcpStream, tx: mpsc::Sender<StoreCommand>) {
    println!("Succesfully connected with {:?}", conn.peer_addr());

    let mut kb_buffer = Vec::with_capacity(BUFFER_SIZE);

    match conn.read_to_end(&mut kb_buffer).await {
        Ok(bytes) => {
            println!("Read {bytes} bytes");
            let cmd = match serde_json::from_slice::<Command>(&kb_buffer[..bytes]) {
                Ok(cmd) => cmd,
                Err(_) => {
                    let payload =
                        serde_json::to_vec(&ErrorResponse::decode_failure()).unwrap_or_default();
                    let _ = conn.write_all(&payload).await;
                    let _ = conn.shutdown().await;
                    return;
                }
            };
            let (responder, receiver) = oneshot::channel();
            let wrapped_cmd = StoreCommand {
                cmd,
                resp: Some(responder),
            };
            if tx.send(wrapped_cmd).await.is_err() {
                eprintln!("Store task is no longer running");
                return;
            }
            match receiver.await {
                Ok(result) => {
                    if let Err(e) = conn.write_all(result.as_slice()).await {
                        eprintln!("Error writing response: {:?}", e);
                    }
                    let _ = conn.shutdown().await;
                }
                Err(e) => eprintln!("Store task dropped the response channel: {:?}", e),
            }
        }
        Err(e) => eprintln!("Error reading into buffer: {:?}", e),
    }
}
