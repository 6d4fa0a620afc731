use chrono::Utc;
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const DURATION_SECS: u64 = 15;
const GUESTS: usize = 200;

struct Target {
    name: &'static str,
    method: &'static str,
    /// Requests rotate through these so concurrent scans hit different guests.
    urls: Vec<String>,
    csrf: Option<String>,
}

struct Session {
    csrf_token: String,
    guest_ids: Vec<String>,
    ticket_tokens: Vec<String>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let base_url = std::env::var("BENCH_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let admin_password = std::env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must match the server's admin account");

    println!("{}", "🚀 Starting Check-in Benchmark".bold().green());
    println!("Target URL: {}", base_url);

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .cookie_store(true)
        .build()
        .unwrap();

    if client.get(format!("{}/health", base_url)).send().await.is_err() {
        eprintln!("{}", format!("❌ Server is NOT reachable at {}. Please start it first.", base_url).red().bold());
        return;
    }

    println!("\n{}", "⚙️  Seeding event, senior and guests...".yellow());
    let session = setup(&client, &base_url, &admin_password).await;
    println!("{}", format!("✅ Seeded {} guests.", session.guest_ids.len()).green());

    let targets = vec![
        Target {
            name: "Health Check (Public)",
            method: "GET",
            urls: vec![format!("{}/health", base_url)],
            csrf: None,
        },
        Target {
            name: "Mark Guest (Write + Broadcast)",
            method: "POST",
            urls: session.guest_ids.iter().map(|id| format!("{}/api/v1/guests/{}/mark", base_url, id)).collect(),
            csrf: Some(session.csrf_token.clone()),
        },
        Target {
            name: "Unmark Guest (Write + Broadcast)",
            method: "POST",
            urls: session.guest_ids.iter().map(|id| format!("{}/api/v1/guests/{}/unmark", base_url, id)).collect(),
            csrf: Some(session.csrf_token.clone()),
        },
        Target {
            name: "Ticket AutoMark (Public)",
            method: "GET",
            urls: session.ticket_tokens.iter().map(|t| format!("{}/api/v1/checkin/{}", base_url, t)).collect(),
            csrf: None,
        },
        Target {
            name: "Statistics Dashboard (Aggregate Read)",
            method: "GET",
            urls: vec![format!("{}/api/v1/statistics/dashboard", base_url)],
            csrf: None,
        },
    ];

    let rps_stages = vec![10, 50, 200, 500];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.urls[0]);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

async fn post_json(client: &Client, url: String, csrf: &str, body: Value) -> Value {
    let res = client.post(&url)
        .header("X-CSRF-Token", csrf)
        .json(&body)
        .send()
        .await
        .unwrap_or_else(|e| panic!("Request to {} failed: {}", url, e));

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Setup call {} failed. Status: {}. Body: {}", url, status, txt);
    }
    res.json().await.expect("Setup response was not JSON")
}

async fn setup(client: &Client, base_url: &str, admin_password: &str) -> Session {
    let login_res = client.post(format!("{}/api/v1/auth/login", base_url))
        .json(&json!({ "username": "admin", "password": admin_password }))
        .send()
        .await
        .expect("Login failed during setup");

    if !login_res.status().is_success() {
        panic!("Login failed. Status: {}", login_res.status());
    }

    let auth_body: Value = login_res.json().await.unwrap();
    let csrf_token = auth_body["csrf_token"].as_str().unwrap().to_string();

    let event = post_json(client, format!("{}/api/v1/events", base_url), &csrf_token, json!({
        "name": format!("Benchmark {}", Uuid::new_v4()),
        "date": Utc::now().to_rfc3339(),
        "location": "Load Lab",
        "is_active": true
    })).await;
    let event_id = event["id"].as_str().expect("No event id").to_string();

    let senior = post_json(client, format!("{}/api/v1/seniors", base_url), &csrf_token, json!({
        "event_id": event_id,
        "name": "Benchmark Host",
        "number_of_guests": GUESTS
    })).await;
    let senior_id = senior["id"].as_str().expect("No senior id").to_string();

    let mut guest_ids = Vec::with_capacity(GUESTS);
    let mut ticket_tokens = Vec::with_capacity(GUESTS);
    for i in 0..GUESTS {
        let guest = post_json(client, format!("{}/api/v1/seniors/{}/guests", base_url, senior_id), &csrf_token, json!({
            "name": format!("Guest {:03}", i)
        })).await;
        let guest_id = guest["id"].as_str().expect("No guest id").to_string();

        let ticket = post_json(client, format!("{}/api/v1/guests/{}/ticket-token", base_url, guest_id), &csrf_token, json!({})).await;
        ticket_tokens.push(ticket["ticket_token"].as_str().expect("No ticket token").to_string());
        guest_ids.push(guest_id);
    }

    Session { csrf_token, guest_ids, ticket_tokens }
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);
    let cursor = AtomicUsize::new(0);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.urls[cursor.fetch_add(1, Ordering::Relaxed) % target.urls.len()].clone();
            let csrf = target.csrf.clone();
            let method = target.method;
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = match method {
                    "POST" => {
                        let mut req = client.post(&url);
                        if let Some(token) = csrf {
                            req = req.header("X-CSRF-Token", token);
                        }
                        req.send().await
                    },
                    _ => client.get(&url).send().await,
                };
                let latency = req_start.elapsed();

                let success = match res {
                    Ok(r) => r.status().is_success(),
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
