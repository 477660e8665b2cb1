//! Leanttro backend - binary entry point.
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() {
    leanttro_backend::run().await;
}
