//! Share Audit Example
//!
//! Lists who can see what in a database: owners, shared users, groups and public links.
//!
//! Run with: REPORTCLIENT_AUTHTOKEN=... cargo run --example share_audit -- user@example.com "Sales DB"

use reportclient_rs::{PermissionInfo, ReportClient};

fn summarize(perm: &PermissionInfo) -> String {
    let granted: Vec<&str> = perm
        .permissions()
        .iter()
        .filter(|(_, allowed)| **allowed)
        .map(|(name, _)| name.as_str())
        .collect();
    format!("{} [{}]", perm.view_name(), granted.join(", "))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let token = std::env::var("REPORTCLIENT_AUTHTOKEN")?;
    let mut args = std::env::args().skip(1);
    let (email, db) = match (args.next(), args.next()) {
        (Some(email), Some(db)) => (email, db),
        _ => anyhow::bail!("usage: share_audit <email> <database>"),
    };

    let client = ReportClient::new(token)?;
    let info = client.get_share_info(&client.db_uri(&email, &db), None).await?;

    println!("👑 Owners: {}", info.database_owners().join(", "));

    println!("\n👤 Shared users:");
    for (user, views) in info.shared_user_permissions() {
        if views.is_empty() {
            println!("   {} (no views)", user);
        }
        for perm in views {
            println!("   {} -> {}", user, summarize(perm));
            if let Some(criteria) = perm.filter_criteria() {
                println!("      filter: {}", criteria);
            }
        }
    }

    println!("\n👥 Groups:");
    for group in info.group_members() {
        println!("   {}: {}", group.name, group.members.join(", "));
        if let Some(views) = info.group_permissions().get(&group.name) {
            for perm in views {
                println!("      {}", summarize(perm));
            }
        }
    }

    for (label, map) in [
        ("🌐 Public", info.public_permissions()),
        ("🔗 Private link", info.private_link_permissions()),
    ] {
        for (principal, views) in map {
            for perm in views {
                println!("\n{} ({}): {}", label, principal, summarize(perm));
            }
        }
    }

    Ok(())
}
