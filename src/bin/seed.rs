use chrono::Utc;
use dotenvy::dotenv;

use eventboard_server::config::Config;
use eventboard_server::seed::{self, SeedConfig};
use eventboard_server::{db, init_tracing};

#[tokio::main]
async fn main() {
    dotenv().ok();
    init_tracing();

    let config = Config::from_env();
    let seed_config = SeedConfig::from_env();

    let pool = db::connect(&config)
        .await
        .expect("Failed to prepare database");

    let mut rng = rand::thread_rng();
    let report = match seed::run(&pool, &seed_config, &mut rng, Utc::now()).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(error = %e, "Seeding failed");
            std::process::exit(1);
        }
    };

    println!("\nSTATISTICS:");
    println!("   Users: {}", report.users);
    println!("   Events: {}", report.events);
    println!(
        "   Attendances: {} ({} confirmed, {} pending)",
        report.attendances, report.confirmed_attendances, report.pending_attendances
    );

    println!("\nADMIN ACCOUNTS:");
    for admin in &report.admins {
        println!("   Email: {}", admin.email);
        println!("   Name: {}", admin.full_name());
    }
    println!("   Password: {}", report.admin_password);
    println!("   URL: {}", report.admin_login_url);
}
