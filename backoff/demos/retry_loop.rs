//! A caller-owned retry loop: the counter says how long, tokio does the waiting.
//!
//! Run with `cargo run --example retry_loop`.

use backoff::Backoff;
use std::time::Duration;

async fn flaky_connect(attempt: u32) -> Result<&'static str, String> {
    if attempt < 4 {
        Err(format!("connection refused (attempt {})", attempt))
    } else {
        Ok("connected")
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut backoff = Backoff::new(Duration::from_millis(10), Duration::from_millis(200), 2.0, true)?;
    let max_attempts = 8;

    for campaign in 1..=2 {
        let mut attempt = 0;
        loop {
            match flaky_connect(attempt).await {
                Ok(msg) => {
                    println!("campaign {}: {}", campaign, msg);
                    // next failure sequence starts from min again
                    backoff.reset();
                    break;
                }
                Err(e) if attempt + 1 < max_attempts => {
                    let delay = backoff.next_delay();
                    println!("campaign {}: {}, retrying in {:?}", campaign, e, delay);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}
