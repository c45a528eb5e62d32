use serde::Serialize;
use serde_json::to_string_pretty;
use std::io::Write;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber. `RUST_LOG` wins over the `--debug` default.
pub fn init(debug: bool) {
    let default = if debug { "mobius_prime=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn print_json_debug<T: Serialize>(stage: &str, req: &T, raw_resp: &str) -> anyhow::Result<()> {
    let req_json = to_string_pretty(req)?;
    let resp_json = match serde_json::from_str::<serde_json::Value>(raw_resp) {
        Ok(v) => to_string_pretty(&v)?,
        Err(_) => raw_resp.to_string(),
    };
    eprintln!("\n===== DEBUG [{stage}]: REQUEST JSON =====\n{}\n", req_json);
    eprintln!("===== DEBUG [{stage}]: RESPONSE JSON =====\n{}\n", resp_json);
    std::io::stderr().flush().ok();
    Ok(())
}
