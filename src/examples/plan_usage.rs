//! Plan Usage Example
//!
//! Prints the subscription plan of an account and how close it is to its row limit.
//!
//! Run with: REPORTCLIENT_AUTHTOKEN=... cargo run --example plan_usage -- user@example.com

use reportclient_rs::{ClientError, ReportClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let token = std::env::var("REPORTCLIENT_AUTHTOKEN")?;
    let email = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: plan_usage <email>"))?;

    let client = ReportClient::new(token)?;
    let user_uri = client.user_uri(&email);

    let plan = match client.get_plan_info(&user_uri, None).await {
        Ok(plan) => plan,
        Err(ClientError::Server { code, message, .. }) => {
            println!("❌ Server refused the request ({}): {}", code, message);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("📋 Plan: {}", plan.plan());
    println!("   Add-ons: {}", plan.addons());
    println!("   Billing date: {}", plan.billing_date());

    let used = plan.rows_used();
    let allowed = plan.rows_allowed();
    let percent = if allowed == 0 {
        0.0
    } else {
        used as f64 / allowed as f64 * 100.0
    };
    println!("   Rows: {} of {} ({:.1}%)", used, allowed, percent);

    if plan.is_trial_availed() {
        println!(
            "   Trial: {} ends {}",
            plan.trial_plan().unwrap_or("unknown"),
            plan.trial_end_date().unwrap_or("unknown")
        );
    }

    Ok(())
}
