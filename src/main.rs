//! IPC Call CLI
//!
//! Entry point for the `ipc-call` command-line tool.

use clap::{Parser, Subcommand};
use ipc_call::transport::serve;
use ipc_call::{demo, logging, Config, Dispatcher, FramedTransport, Loopback};
use std::path::PathBuf;
use std::process::{self, Command, Stdio};

#[derive(Parser)]
#[command(name = "ipc-call")]
#[command(about = "Typed remote function calls over byte streams", version)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Log filter directive (overrides the config file; RUST_LOG wins over both)
    #[arg(long, global = true)]
    log_filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the demo functions over stdin/stdout frames
    Serve {
        /// Largest accepted frame in bytes
        #[arg(long)]
        max_frame_bytes: Option<usize>,
    },

    /// List registered functions and their signatures
    Functions {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Call every demo function and print the results
    Demo {
        /// Run the server as a child process instead of in-process
        #[arg(long)]
        process: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let mut config = load_config(cli.config);
    if let Some(filter) = cli.log_filter {
        config.log.filter = filter;
    }
    logging::init(&config.log);

    match cli.command {
        Commands::Serve { max_frame_bytes } => {
            if let Some(max) = max_frame_bytes {
                config.max_frame_bytes = max;
            }
            run_serve(&config);
        }
        Commands::Functions { json } => {
            run_functions(json);
        }
        Commands::Demo { process } => {
            run_demo(&config, process);
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Config {
    let Some(path) = path else {
        return Config::default();
    };

    match Config::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_serve(config: &Config) {
    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    let dispatcher = Dispatcher::new(demo::registry());
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();

    if let Err(e) = serve(
        &dispatcher,
        &mut stdin.lock(),
        &mut stdout.lock(),
        config.max_frame_bytes,
    ) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run_functions(json: bool) {
    let registry = demo::registry();
    let descriptors = registry.descriptors();

    if json {
        match serde_json::to_string_pretty(&descriptors) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        }
    } else {
        for descriptor in descriptors {
            println!("{}", descriptor);
        }
    }
}

fn run_demo(config: &Config, in_child: bool) {
    let result = if in_child {
        run_demo_in_child(config)
    } else {
        let mut transport = Loopback::new(Dispatcher::new(demo::registry()));
        demo::run(&mut transport).map_err(|e| e.to_string())
    };

    match result {
        Ok(lines) => {
            for line in lines {
                println!("{}", line);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_demo_in_child(config: &Config) -> Result<Vec<String>, String> {
    let exe = std::env::current_exe().map_err(|e| format!("cannot locate executable: {}", e))?;

    let mut child = Command::new(exe)
        .arg("--log-filter")
        .arg(&config.log.filter)
        .arg("serve")
        .arg("--max-frame-bytes")
        .arg(config.max_frame_bytes.to_string())
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to start server: {}", e))?;

    let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
        return Err("server stdio not captured".to_string());
    };

    let mut transport =
        FramedTransport::new(stdout, stdin).with_max_frame_bytes(config.max_frame_bytes);
    let result = demo::run(&mut transport).map_err(|e| e.to_string());

    // Closing the server's stdin ends its serve loop
    drop(transport);
    match child.wait() {
        Ok(status) if !status.success() => {
            return Err(format!("server exited with {}", status));
        }
        Err(e) => return Err(format!("failed to wait for server: {}", e)),
        Ok(_) => {}
    }

    result
}
