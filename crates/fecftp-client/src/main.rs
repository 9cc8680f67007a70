//! fecftp — client for the FEC-protected trivial file transfer protocol.

use std::path::Path;
use std::process::ExitCode;

use fecftp_client::transfer;
use fecftp_core::config::ClientConfig;

fn usage() -> ExitCode {
    eprintln!("usage: fecftp <error|noerror> <host> <file>");
    ExitCode::from(2)
}

/// Map the mode argument to the noisy flag, case-insensitively.
fn parse_mode(mode: &str) -> Option<bool> {
    match mode.to_ascii_lowercase().as_str() {
        "error" => Some(true),
        "noerror" => Some(false),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [mode, host, file] = match <[String; 3]>::try_from(args) {
        Ok(args) => args,
        Err(_) => return usage(),
    };
    let Some(noisy) = parse_mode(&mode) else {
        return usage();
    };

    let config = ClientConfig::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load config, using defaults");
        ClientConfig::default()
    });

    // The output file carries the same name as the requested remote file.
    match transfer::download(&host, &file, Path::new(&file), noisy, &config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fecftp: {e:#}");
            ExitCode::FAILURE
        }
    }
}
