use anyhow::{bail, Context, Result};
use reportclient_rs::{ExportFormat, ImportErrorPolicy, ImportType, ReportClient};
use std::io::Write;

pub const USAGE: &str = "\
usage: reportclient <command> [args]

commands:
  plan <email>
  share-info <email> <db>
  db-exists <email> <db>
  view-url <email> <db> <view>
  export <email> <db> <view> <format> [criteria]
  sql <email> <db> <format> <query>
  import <email> <db> <table> <file> <append|truncateadd|updateadd>";

#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    Plan {
        email: String,
    },
    ShareInfo {
        email: String,
        db: String,
    },
    DbExists {
        email: String,
        db: String,
    },
    ViewUrl {
        email: String,
        db: String,
        view: String,
    },
    Export {
        email: String,
        db: String,
        view: String,
        format: ExportFormat,
        criteria: Option<String>,
    },
    Sql {
        email: String,
        db: String,
        format: ExportFormat,
        query: String,
    },
    Import {
        email: String,
        db: String,
        table: String,
        file: String,
        import_type: ImportType,
    },
}

impl Command {
    /// Parse the arguments following the program name
    pub fn parse(args: &[String]) -> Result<Self> {
        let (name, rest) = args.split_first().context("missing command")?;
        let arg = |i: usize| -> Result<String> {
            rest.get(i)
                .cloned()
                .with_context(|| format!("{}: missing argument {}", name, i + 1))
        };

        let command = match name.as_str() {
            "plan" => Command::Plan { email: arg(0)? },
            "share-info" => Command::ShareInfo {
                email: arg(0)?,
                db: arg(1)?,
            },
            "db-exists" => Command::DbExists {
                email: arg(0)?,
                db: arg(1)?,
            },
            "view-url" => Command::ViewUrl {
                email: arg(0)?,
                db: arg(1)?,
                view: arg(2)?,
            },
            "export" => Command::Export {
                email: arg(0)?,
                db: arg(1)?,
                view: arg(2)?,
                format: arg(3)?.parse()?,
                criteria: rest.get(4).cloned(),
            },
            "sql" => Command::Sql {
                email: arg(0)?,
                db: arg(1)?,
                format: arg(2)?.parse()?,
                query: arg(3)?,
            },
            "import" => Command::Import {
                email: arg(0)?,
                db: arg(1)?,
                table: arg(2)?,
                file: arg(3)?,
                import_type: arg(4)?.parse()?,
            },
            other => bail!("unknown command: {}", other),
        };
        Ok(command)
    }
}

pub async fn run(client: &ReportClient, command: Command) -> Result<()> {
    match command {
        Command::Plan { email } => {
            let plan = client.get_plan_info(&client.user_uri(&email), None).await?;
            println!("plan: {}", plan.plan());
            println!("addons: {}", plan.addons());
            println!("billing date: {}", plan.billing_date());
            println!("rows: {} / {}", plan.rows_used(), plan.rows_allowed());
            if plan.is_trial_availed() {
                println!(
                    "trial: {} (active: {}) until {}",
                    plan.trial_plan().unwrap_or_default(),
                    plan.trial_status().unwrap_or(false),
                    plan.trial_end_date().unwrap_or_default()
                );
            }
        }
        Command::ShareInfo { email, db } => {
            let info = client.get_share_info(&client.db_uri(&email, &db), None).await?;
            println!("owners: {}", info.database_owners().join(", "));
            for (user, permissions) in info.shared_user_permissions() {
                for perm in permissions {
                    println!(
                        "user {} view {} read={} export={} shared by {}",
                        user,
                        perm.view_name(),
                        perm.has_read_permission(),
                        perm.has_export_permission(),
                        perm.shared_by()
                    );
                }
            }
            for group in info.group_members() {
                println!(
                    "group {} ({} members): {}",
                    group.name,
                    group.members.len(),
                    group.description
                );
            }
        }
        Command::DbExists { email, db } => {
            let exists = client.is_db_exist(&client.user_uri(&email), &db, None).await?;
            println!("{}", exists);
        }
        Command::ViewUrl { email, db, view } => {
            let url = client
                .get_view_url(&client.table_uri(&email, &db, &view), None)
                .await?;
            println!("{}", url);
        }
        Command::Export {
            email,
            db,
            view,
            format,
            criteria,
        } => {
            let uri = client.table_uri(&email, &db, &view);
            let bytes = client
                .export_data(&uri, format, criteria.as_deref(), None)
                .await?;
            std::io::stdout().write_all(&bytes)?;
        }
        Command::Sql {
            email,
            db,
            format,
            query,
        } => {
            let uri = client.db_uri(&email, &db);
            let bytes = client.export_data_using_sql(&uri, format, &query, None).await?;
            std::io::stdout().write_all(&bytes)?;
        }
        Command::Import {
            email,
            db,
            table,
            file,
            import_type,
        } => {
            let uri = client.table_uri(&email, &db, &table);
            let result = client
                .import_data(&uri, import_type, &file, true, ImportErrorPolicy::Abort, None)
                .await?;
            println!("{}", result);
            if !result.import_errors().is_null() {
                println!("errors: {}", result.import_errors());
            }
        }
    }
    Ok(())
}
