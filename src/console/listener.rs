// console/listener.rs

use crate::console::Dashboard;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

/// Reads commands from stdin, one per line, until `/quit` or end of input.
pub async fn listen_for_commands(dashboard: &mut Dashboard) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("Type /help for the command list.");

    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if line.trim().is_empty() {
                    continue;
                }
                let reply = dashboard.handle(&line).await;
                println!("{}\n", reply.text);
                if reply.quit {
                    break;
                }
            }
            Ok(None) => {
                info!("Input closed.");
                break;
            }
            Err(e) => {
                warn!("Failed to read command: {:?}", e);
                break;
            }
        }
    }
}
