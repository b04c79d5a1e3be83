//! dcpctl CLI
//!
//! Command-line interface for driving a cinema server over its control port.

use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use dcpctl::protocol::bytes::to_hex;
use dcpctl::protocol::{codec, ResponseElement};
use dcpctl::{Args, Catalog, ClientConfig, DcpClient, DcpError, Record, Response, Value};
use tracing_subscriber::{fmt, EnvFilter};

/// dcpctl
#[derive(Parser, Debug)]
#[command(name = "dcpctl")]
#[command(about = "Control client for Digital Cinema servers")]
#[command(version)]
struct Cli {
    /// Server host
    #[arg(long, global = true, default_value = "127.0.0.1")]
    host: String,

    /// Server control port
    #[arg(short, long, global = true, default_value_t = dcpctl::config::DEFAULT_PORT)]
    port: u16,

    /// Reply timeout in seconds (commands with a longer budget keep it)
    #[arg(short, long, global = true, default_value_t = 30)]
    timeout: u64,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Log frames and protocol details to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List known command names
    Commands,

    /// Show the layout of a command
    Describe {
        /// Command name
        name: String,
    },

    /// Print the request frame for a command without connecting
    Encode {
        /// Command name
        name: String,

        /// Arguments in field order
        args: Vec<String>,

        /// Bind an argument by field name (name=value)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        named: Vec<String>,
    },

    /// Send a command and print the decoded response
    Call {
        /// Command name
        name: String,

        /// Arguments in field order
        args: Vec<String>,

        /// Bind an argument by field name (name=value)
        #[arg(long = "set", value_name = "FIELD=VALUE")]
        named: Vec<String>,

        /// Fail when the response does not echo the request id
        #[arg(long)]
        strict_ids: bool,
    },
}

// =============================================================================
// Exit Codes
// =============================================================================

/// The device answered with a non-zero status
const EXIT_DEVICE_STATUS: u8 = 1;

fn exit_code(err: &DcpError) -> u8 {
    match err {
        DcpError::Configuration(_) => 3,
        DcpError::Parameter { .. } => 4,
        DcpError::MalformedField { .. } => 5,
        DcpError::Protocol(_) => 6,
        DcpError::Timeout(_) => 7,
        DcpError::Connection(_) | DcpError::Io(_) => 8,
    }
}

fn category(err: &DcpError) -> &'static str {
    match err {
        DcpError::Configuration(_) => "unknown command",
        DcpError::Parameter { .. } => "parameter error",
        DcpError::MalformedField { .. } => "malformed response",
        DcpError::Protocol(_) => "protocol error",
        DcpError::Timeout(_) => "timeout",
        DcpError::Connection(_) | DcpError::Io(_) => "connection error",
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.debug {
            "info,dcpctl=debug"
        } else {
            "warn"
        })
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("{}: {}", category(&e), e);
            if let DcpError::MalformedField { partial, .. } = &e {
                if !partial.is_empty() {
                    eprintln!("decoded before the failure:");
                    eprint!("{}", render_record(partial, 1));
                }
            }
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: &Cli) -> dcpctl::Result<u8> {
    let catalog = Catalog::builtin()?;

    match &cli.command {
        Commands::Commands => {
            let names: Vec<&str> = catalog.requests.list_names().into_iter().collect();
            match cli.format {
                Format::Text => names.iter().for_each(|name| println!("{}", name)),
                Format::Json => println!("{}", to_json(&names)?),
            }
            Ok(0)
        }

        Commands::Describe { name } => {
            describe(&catalog, name, cli.format)?;
            Ok(0)
        }

        Commands::Encode { name, args, named } => {
            let definition = catalog.requests.resolve(name.as_str())?;
            let frame = codec::construct(definition, &build_args(args, named)?)?;
            match cli.format {
                Format::Text => {
                    println!("{}", to_hex(frame.as_bytes()));
                    if cli.debug {
                        println!("{}", frame.explain());
                    }
                }
                Format::Json => println!(
                    "{}",
                    to_json(&serde_json::json!({
                        "command": frame.command,
                        "request_id": frame.request_id,
                        "frame": to_hex(frame.as_bytes()),
                    }))?
                ),
            }
            Ok(0)
        }

        Commands::Call {
            name,
            args,
            named,
            strict_ids,
        } => {
            let config = ClientConfig::builder()
                .host(&cli.host)
                .port(cli.port)
                .read_timeout(Duration::from_secs(cli.timeout))
                .strict_request_id(*strict_ids)
                .build();

            // Resolve and bind before connecting so bad input never reaches the device
            let definition = catalog.requests.resolve(name.as_str())?;
            let args = build_args(args, named)?;
            definition.encode_fields(&args)?;

            let client = DcpClient::connect(config)?;
            let result = client.call(name, &args);
            if let Err(e) = client.close() {
                tracing::debug!("Close failed: {}", e);
            }

            let response = result?;
            print_response(&response, cli.format)?;
            Ok(if response.is_success() {
                0
            } else {
                EXIT_DEVICE_STATUS
            })
        }
    }
}

/// Positional arguments stay text; encoders coerce them per field
fn build_args(positional: &[String], named: &[String]) -> dcpctl::Result<Args> {
    let mut args: Args = positional.iter().map(String::as_str).collect();
    for binding in named {
        let (field, value) = binding.split_once('=').ok_or_else(|| {
            DcpError::parameter("--set", binding, "expected FIELD=VALUE")
        })?;
        args = args.named(field.trim(), value);
    }
    Ok(args)
}

// =============================================================================
// Rendering
// =============================================================================

fn to_json<S: serde::Serialize>(value: &S) -> dcpctl::Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| DcpError::Io(e.into()))
}

fn print_response(response: &Response, format: Format) -> dcpctl::Result<()> {
    match format {
        Format::Text => {
            println!("{} (request id {})", response.command, response.request_id);
            print!("{}", render_record(&response.fields, 1));
        }
        Format::Json => println!("{}", to_json(response)?),
    }
    Ok(())
}

fn render_record(record: &Record, depth: usize) -> String {
    let indent = "  ".repeat(depth);
    let mut out = String::new();
    for (name, value) in record {
        match value {
            Value::Records(items) => {
                out.push_str(&format!("{}{}: {} item(s)\n", indent, name, items.len()));
                for (i, item) in items.iter().enumerate() {
                    out.push_str(&format!("{}  [{}]\n", indent, i));
                    out.push_str(&render_record(item, depth + 2));
                }
            }
            other => out.push_str(&format!("{}{}: {}\n", indent, name, other)),
        }
    }
    out
}

fn describe(catalog: &Catalog, name: &str, format: Format) -> dcpctl::Result<()> {
    let request = catalog.requests.resolve(name)?;
    let response = catalog.responses.get_by_name(name);

    let arguments: Vec<(String, String, Option<&Value>)> = request
        .fields
        .iter()
        .map(|f| (f.name.clone(), f.encoding.label(), f.default.as_ref()))
        .collect();
    let reply: Vec<String> = response
        .map(|r| r.fields.iter().map(ResponseElement::name).map(str::to_string).collect())
        .unwrap_or_default();

    match format {
        Format::Text => {
            println!("{}", request.name);
            println!("  request key : {}", request.key);
            if let Some(response) = response {
                println!("  response key: {}", response.key);
            }
            if let Some(timeout) = request.timeout {
                println!("  timeout     : {}s", timeout.as_secs());
            }
            println!("  arguments   :");
            if arguments.is_empty() {
                println!("    (none)");
            }
            for (field, label, default) in &arguments {
                match default {
                    Some(value) => println!("    {} ({}, default {})", field, label, value),
                    None => println!("    {} ({})", field, label),
                }
            }
            println!("  reply       : {}", reply.join(", "));
        }
        Format::Json => println!(
            "{}",
            to_json(&serde_json::json!({
                "name": request.name,
                "request_key": request.key.to_string(),
                "response_key": response.map(|r| r.key.to_string()),
                "timeout_secs": request.timeout.map(|t| t.as_secs()),
                "arguments": arguments
                    .iter()
                    .map(|(field, label, default)| {
                        serde_json::json!({ "name": field, "type": label, "default": default })
                    })
                    .collect::<Vec<_>>(),
                "reply": reply,
            }))?
        ),
    }
    Ok(())
}
