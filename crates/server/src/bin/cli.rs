use blog_core::{
    post::Post,
    state::{ErrorResponse, MessageResponse, PostsResponse, StoreMetadata},
    BlogResult, Command,
};
use clap::{ArgAction, Parser, Subcommand};
use server::ServerError;
use std::io::{Read, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
};

const BUFFER_SIZE: usize = 10240;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long)]
    /// The socket address of the masterblog server. For ex, localhost:8080
    socket_addr: Option<SocketAddr>,

    #[arg(short, long, action = ArgAction::SetTrue)]
    /// Select if the output should be json
    json: bool,

    #[command(subcommand)]
    command: BlogCommand,
}

#[derive(Subcommand, Clone, Debug)]
pub enum BlogCommand {
    /// Creates a new post; prompts for any field not given as a flag
    NewPost {
        #[arg(short, long)]
        title: Option<String>,
        #[arg(short, long)]
        content: Option<String>,
        #[arg(short, long)]
        author: Option<String>,
        #[arg(short, long)]
        date: Option<String>,
    },

    /// All posts, optionally sorted by one field
    List {
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        direction: Option<String>,
    },

    /// Posts containing the given word(s), searched per field
    Search {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },

    GetPost {
        id: u32,
    },

    DeletePost {
        id: u32,
    },

    UpdatePost {
        id: u32,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },

    Metadata {},
}

/// Ship one command to the server and collect the whole response.
async fn send_command(socket: SocketAddr, request: &Command) -> BlogResult<Vec<u8>> {
    let mut stream = TcpStream::connect(socket).await?;
    stream
        .write_all(serde_json::to_vec(request)?.as_slice())
        .await?;
    stream.shutdown().await?;

    let mut kb_buffer = Vec::with_capacity(BUFFER_SIZE);
    stream.read_to_end(&mut kb_buffer).await?;
    Ok(kb_buffer)
}

fn print_error(buf: &[u8]) -> BlogResult<()> {
    let response = serde_json::from_slice::<ErrorResponse>(buf).map_err(|e| {
        ServerError::DecodeError { msg: e.to_string() }
    })?;
    eprintln!("ERROR: {}", response.error);
    Ok(())
}

fn print_post(buf: &[u8], json: bool) -> BlogResult<()> {
    if let Ok(post) = serde_json::from_slice::<Post>(buf) {
        if json {
            println!("{:#?}", post);
        } else {
            println!("{}", post);
        }
        return Ok(());
    }
    print_error(buf)
}

fn print_posts(buf: &[u8], json: bool) -> BlogResult<()> {
    if let Ok(response) = serde_json::from_slice::<PostsResponse>(buf) {
        if json {
            println!("{:#?}", response);
        } else {
            for post in response.posts.into_iter() {
                println!("{}", post);
            }
        }
        return Ok(());
    }
    print_error(buf)
}

fn print_message(buf: &[u8]) -> BlogResult<()> {
    if let Ok(response) = serde_json::from_slice::<MessageResponse>(buf) {
        println!("{}", response.message);
        return Ok(());
    }
    print_error(buf)
}

fn print_metadata(buf: &[u8]) -> BlogResult<()> {
    if let Ok(metadata) = serde_json::from_slice::<StoreMetadata>(buf) {
        println!("{:#?}", metadata);
        return Ok(());
    }
    print_error(buf)
}

fn prompt_line(label: &str) -> String {
    print!("Enter {label}: ");
    std::io::stdout().flush().expect("Unable to flush stdout");
    let mut buf = String::new();
    std::io::stdin()
        .read_line(&mut buf)
        .expect("Unable to read input");
    buf.trim().to_string()
}

fn prompt_content() -> String {
    println!("Enter post content(Press Ctrl-d on new line to end): ");
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .expect("Unable to read post content.");
    buf.replace("\n", " ").trim().into()
}

fn validate_socket(cli: &Cli) -> SocketAddr {
    cli.socket_addr.unwrap_or_else(|| {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), 8080)
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let socket = validate_socket(&cli);

    let result = match cli.command.clone() {
        BlogCommand::NewPost {
            title,
            content,
            author,
            date,
        } => {
            let request = Command::Create {
                title: Some(title.unwrap_or_else(|| prompt_line("post title"))),
                content: Some(content.unwrap_or_else(prompt_content)),
                author: Some(author.unwrap_or_else(|| prompt_line("author name"))),
                date: Some(date.unwrap_or_else(|| prompt_line("date (YYYY-MM-DD)"))),
            };
            send_command(socket, &request)
                .await
                .and_then(|buf| print_post(&buf, cli.json))
        }

        BlogCommand::List { sort, direction } => {
            let request = Command::List { sort, direction };
            send_command(socket, &request)
                .await
                .and_then(|buf| print_posts(&buf, cli.json))
        }

        BlogCommand::Search {
            title,
            content,
            author,
            date,
        } => {
            let request = Command::Search {
                title,
                content,
                author,
                date,
            };
            send_command(socket, &request)
                .await
                .and_then(|buf| print_posts(&buf, cli.json))
        }

        BlogCommand::GetPost { id } => {
            let request = Command::Get { id };
            send_command(socket, &request)
                .await
                .and_then(|buf| print_post(&buf, cli.json))
        }

        BlogCommand::DeletePost { id } => {
            let request = Command::Delete { id };
            send_command(socket, &request)
                .await
                .and_then(|buf| print_message(&buf))
        }

        BlogCommand::UpdatePost {
            id,
            title,
            content,
            author,
            date,
        } => {
            let request = Command::Update {
                id,
                title,
                content,
                author,
                date,
            };
            send_command(socket, &request)
                .await
                .and_then(|buf| print_post(&buf, cli.json))
        }

        BlogCommand::Metadata {} => {
            let request = Command::Metadata {};
            send_command(socket, &request)
                .await
                .and_then(|buf| print_metadata(&buf))
        }
    };

    if result.is_err() {
        eprintln!("ERROR: {}", result.unwrap_err());
    }
}
