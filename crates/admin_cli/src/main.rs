use std::{error::Error, io::Write};

use chrono::{Days, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{Engine, EngineError, ExpenseNew, Money};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};

/// Palette used for the demo categories.
const SEED_COLORS: [&str; 4] = ["#ec4899", "#8b5cf6", "#06b6d4", "#10b981"];

#[derive(Parser, Debug)]
#[command(name = "expenses_admin")]
#[command(about = "Admin utilities for the expense tracker (users, demo data)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./expenses.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Insert a demo user with categories, expenses and budgets.
    Seed(SeedArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
    List,
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    email: String,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[arg(long, default_value = "Demo User")]
    name: String,
    #[arg(long, default_value = "demo@example.com")]
    email: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.chars().count() < engine::MIN_PASSWORD_LEN {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print(format!(
                    "Password must be at least {} characters.\r\n",
                    engine::MIN_PASSWORD_LEN
                ))
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Demo data: one user, four categories, a dozen expenses over the last
/// ten days and two budgets for the current month.
async fn seed(
    engine: &Engine,
    args: &SeedArgs,
    password: &str,
) -> Result<engine::User, Box<dyn Error + Send + Sync>> {
    let user = engine.register_user(&args.name, &args.email, password).await?;

    let mut categories = Vec::with_capacity(SEED_COLORS.len());
    for (name, color) in ["Food", "Transport", "Rent", "Health"]
        .into_iter()
        .zip(SEED_COLORS)
    {
        categories.push(engine.create_category(user.id, name, Some(color)).await?);
    }
    let food = categories[0].id;
    let transport = categories[1].id;

    let today = Utc::now().date_naive();
    let days_ago = |n: u64| -> Result<chrono::DateTime<Utc>, Box<dyn Error + Send + Sync>> {
        let day = today
            .checked_sub_days(Days::new(n))
            .ok_or("date out of range")?;
        Ok(day.and_time(NaiveTime::MIN).and_utc())
    };

    let mut expenses = Vec::new();
    for i in 0..10u64 {
        expenses.push((format!("Lunch {}", i + 1), 1250, days_ago(i)?, food));
    }
    expenses.push(("Bus pass".to_string(), 4500, days_ago(2)?, transport));
    expenses.push(("Groceries".to_string(), 8210, days_ago(1)?, food));

    for (description, amount, spent_at, category_id) in expenses {
        engine
            .create_expense(
                user.id,
                ExpenseNew {
                    description,
                    amount: Money::new(amount),
                    spent_at,
                    category_id: Some(category_id),
                },
            )
            .await?;
    }

    engine
        .create_budget(user.id, today, Money::new(120_000), None)
        .await?;
    engine
        .create_budget(user.id, today, Money::new(30_000), Some(food))
        .await?;

    Ok(user)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            let password = prompt_password_twice()?;

            match engine.register_user(&args.name, &args.email, &password).await {
                Ok(user) => println!("created user: {} ({})", user.email, user.id),
                Err(EngineError::ExistingKey(_)) => {
                    eprintln!("user already exists: {}", args.email);
                    std::process::exit(1);
                }
                Err(err) => return Err(err.into()),
            }
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in engine.list_users().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    user.id,
                    user.email,
                    user.name,
                    user.created_at.format("%Y-%m-%d %H:%M")
                );
            }
        }
        Command::Seed(args) => {
            if !engine.list_users().await?.is_empty() {
                eprintln!("database already has users, skipping seed");
                return Ok(());
            }

            let password = prompt_password_twice()?;
            let user = seed(&engine, &args, &password).await?;
            println!("seeded demo data for {} ({})", user.email, user.id);
        }
    }

    Ok(())
}
