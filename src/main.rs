#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    checkin_backend::run().await;
}
