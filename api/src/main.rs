use pdf_chat::{build_app, config, routes};

#[tokio::main]
async fn main() {
    // Initialize environment variables and logging
    dotenv::dotenv().ok();
    env_logger::init();

    let lookup = |key: &str| std::env::var(key).ok();

    let addr = match config::bind_addr(&lookup) {
        Ok(addr) => addr,
        Err(e) => {
            eprintln!("Invalid listen address: {}", e);
            std::process::exit(1);
        }
    };

    let app = build_app(&lookup);

    if let Err(e) = routes::start_server(addr, app).await {
        eprintln!("Server error: {:#}", e);
        std::process::exit(1);
    }
}
