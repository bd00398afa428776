#[tokio::main]
async fn main() {
    if let Err(err) = taxbuddy_lib::run().await {
        eprintln!("taxbuddy failed to start: {err}");
        std::process::exit(1);
    }
}
