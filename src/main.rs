use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = transcribe_relay::app::run().await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
