//! Boundary walkthrough
//!
//! Builds an error chain in a fake request path, reports it, then sends it
//! across an HTTP boundary and an RPC boundary and back.
//!
//! # Environment Variables
//!
//! - `RUST_LOG=debug` - Show decode fallbacks and per-node events
//! - `CERROR_CAPTURE=0` - Disable stack capture
//! - `CERROR_STACK_DEPTH=4` - Limit recorded frames per node

use cerror::{
    cerr, decode, encode, encode_public, from_grpc, record_error, sprint, trace_error, CError,
    CResult, ResultExt,
};
use tracing_subscriber::EnvFilter;

// RUST_LOG=debug cargo run -p cerror-boundary
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    println!("=== cerror Boundary Example ===\n");

    let err = match handle_request(7) {
        Ok(body) => {
            println!("unexpected success: {}", body);
            return;
        }
        Err(err) => err,
    };

    // ── Report ──
    println!("--- chain ({} nodes, classified {}) ---", err.depth(), err.classify());
    print!("{}", sprint(&err));
    println!("\nstack of head:\n{}", err.stack());
    trace_error(&err);
    record_error(&err);

    // ── HTTP boundary ──
    println!("\n--- HTTP boundary ---");
    let internal = encode(&err);
    let public = encode_public(&err);
    println!("internal: {}", String::from_utf8_lossy(&internal));
    println!("public:   {}", String::from_utf8_lossy(&public));

    let received = decode(&internal);
    println!(
        "decoded:  status={} code={:?} message={:?}",
        received.http_status(),
        received.app_code(),
        received.message()
    );

    let garbage = decode(b"<html>502 Bad Gateway</html>");
    println!("garbage:  status={} code={:?}", garbage.http_status(), garbage.app_code());

    // ── RPC boundary ──
    println!("\n--- RPC boundary ---");
    let rpc = err.to_grpc();
    println!("sent:     {}", rpc);
    match from_grpc(&rpc) {
        Some(back) => println!("received: {:?}", back),
        None => println!("received: OK"),
    }

    let unclassified = CError::msg("disk on fire").wrap("flushing journal");
    println!("unclassified: {}", unclassified.to_grpc());

    // ── Foreign errors ──
    println!("\n--- foreign errors ---");
    if let Err(e) = read_settings() {
        print!("{}", sprint(&e));
    }

    println!("\n=== Example Complete ===");
}

fn find_user(id: u32) -> CResult<String> {
    if id != 1 {
        return Err(cerr!(NotFound, code = "USER_NOT_FOUND", "user {} missing", id)
            .with_dev_message(format!("shard={}", id % 4)));
    }
    Ok("root".to_string())
}

fn load_profile(id: u32) -> CResult<String> {
    let name = find_user(id).map_err(|e| e.wrap("loading profile"))?;
    Ok(format!("profile of {}", name))
}

fn handle_request(id: u32) -> CResult<String> {
    load_profile(id).map_err(|e| cerror::wrapf!(e, "GET /users/{}", id))
}

fn read_settings() -> CResult<String> {
    std::fs::read_to_string("/nonexistent/cerror/settings.toml").wrap_err("reading settings")
}
