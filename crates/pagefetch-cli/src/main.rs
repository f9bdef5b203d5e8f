//! PageFetch CLI - Command-line interface for fetching readable web content

mod mcp;

use clap::{Parser, Subcommand};
use pagefetch::{FetchRequest, TextContent, Tool, DEFAULT_MAX_LENGTH, TOOL_LLMTXT};
use std::io::{self, Write};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// PageFetch - readable, paginated web page fetching
#[derive(Parser, Debug)]
#[command(name = "pagefetch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print full help with examples (llmtxt)
    #[arg(long)]
    llmtxt: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as MCP (Model Context Protocol) server over stdio
    Mcp {
        #[command(flatten)]
        config: ToolArgs,
    },
    /// Fetch URL and print one window of its content
    Fetch {
        /// URL to fetch
        url: String,

        /// Maximum characters to return
        #[arg(long, default_value_t = DEFAULT_MAX_LENGTH)]
        max_length: usize,

        /// Starting character index
        #[arg(long, default_value_t = 0)]
        start_index: usize,

        /// Return raw content instead of extracted markdown
        #[arg(long)]
        raw: bool,

        #[command(flatten)]
        config: ToolArgs,
    },
}

/// Tool configuration shared by all subcommands
#[derive(clap::Args, Debug, Clone, Default)]
struct ToolArgs {
    /// Custom User-Agent
    #[arg(long)]
    user_agent: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Only allow URLs starting with this prefix (repeatable)
    #[arg(long = "allow-prefix")]
    allow_prefixes: Vec<String>,

    /// Reject URLs starting with this prefix (repeatable)
    #[arg(long = "block-prefix")]
    block_prefixes: Vec<String>,
}

impl ToolArgs {
    fn build_tool(self) -> Tool {
        let mut builder = Tool::builder();
        if let Some(ua) = self.user_agent {
            builder = builder.user_agent(ua);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        for prefix in self.allow_prefixes {
            builder = builder.allow_prefix(prefix);
        }
        for prefix in self.block_prefixes {
            builder = builder.block_prefix(prefix);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries tool output only
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    // Handle --llmtxt flag
    if cli.llmtxt {
        writeln_safe(TOOL_LLMTXT);
        std::process::exit(0);
    }

    match cli.command {
        Some(Commands::Mcp { config }) => {
            mcp::run_server(config.build_tool()).await;
        }
        Some(Commands::Fetch {
            url,
            max_length,
            start_index,
            raw,
            config,
        }) => {
            let mut request = FetchRequest::new(url)
                .max_length(max_length)
                .start_index(start_index);
            if raw {
                request = request.raw();
            }
            run_fetch(&config.build_tool(), request).await;
        }
        None => {
            eprintln!("Usage: pagefetch fetch <URL>");
            eprintln!("   or: pagefetch mcp");
            eprintln!("   or: pagefetch --help");
            std::process::exit(1);
        }
    }
}

async fn run_fetch(tool: &Tool, request: FetchRequest) {
    match tool.execute(request).await {
        Ok(blocks) => writeln_safe(&format_blocks(&blocks)),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Join the text of all returned blocks
fn format_blocks(blocks: &[TextContent]) -> String {
    blocks
        .iter()
        .map(TextContent::as_text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Write to stdout, exit silently on broken pipe
fn writeln_safe(s: &str) {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if let Err(e) = writeln!(handle, "{}", s) {
        if e.kind() == io::ErrorKind::BrokenPipe {
            std::process::exit(0);
        }
        eprintln!("Error writing to stdout: {}", e);
        std::process::exit(1);
    }
}
