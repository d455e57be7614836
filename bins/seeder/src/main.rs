//! Database seeder for Expensa development and testing.
//!
//! Seeds a demo company with an admin, a manager and an employee reporting
//! to that manager, plus one draft expense for the employee.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

use expensa_core::auth::hash_password;
use expensa_db::entities::{
    companies, expenses,
    sea_orm_active_enums::{ExpenseStatus, UserRole},
    users,
};

/// Demo company ID (consistent for all seeds)
const DEMO_COMPANY_ID: Uuid = Uuid::from_u128(1);
const ADMIN_ID: Uuid = Uuid::from_u128(2);
const MANAGER_ID: Uuid = Uuid::from_u128(3);
const EMPLOYEE_ID: Uuid = Uuid::from_u128(4);
const DRAFT_EXPENSE_ID: Uuid = Uuid::from_u128(5);

/// Password shared by every seeded account.
const DEMO_PASSWORD: &str = "password123";

struct SeedUser {
    id: Uuid,
    email: &'static str,
    first_name: &'static str,
    last_name: &'static str,
    role: UserRole,
    manager_id: Option<Uuid>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = expensa_db::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    println!("Seeding demo company...");
    seed_company(&db).await?;

    println!("Seeding demo users...");
    let password_hash =
        hash_password(DEMO_PASSWORD).map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;
    let seed_users = [
        SeedUser {
            id: ADMIN_ID,
            email: "admin@expensa.dev",
            first_name: "Ada",
            last_name: "Admin",
            role: UserRole::Admin,
            manager_id: None,
        },
        SeedUser {
            id: MANAGER_ID,
            email: "manager@expensa.dev",
            first_name: "Morgan",
            last_name: "Manager",
            role: UserRole::Manager,
            manager_id: None,
        },
        SeedUser {
            id: EMPLOYEE_ID,
            email: "employee@expensa.dev",
            first_name: "Erin",
            last_name: "Employee",
            role: UserRole::Employee,
            manager_id: Some(MANAGER_ID),
        },
    ];
    for user in &seed_users {
        seed_user(&db, user, &password_hash).await?;
    }

    println!("Seeding draft expense...");
    seed_draft_expense(&db).await?;

    println!("Seeding complete! Every account uses the password '{DEMO_PASSWORD}'.");
    Ok(())
}

/// Seeds the demo company.
async fn seed_company(db: &DatabaseConnection) -> anyhow::Result<()> {
    if companies::Entity::find_by_id(DEMO_COMPANY_ID)
        .one(db)
        .await?
        .is_some()
    {
        println!("  Demo company already exists, skipping...");
        return Ok(());
    }

    companies::ActiveModel {
        id: Set(DEMO_COMPANY_ID),
        name: Set("Demo Company".to_string()),
        country_code: Set("US".to_string()),
        currency_code: Set("USD".to_string()),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;

    println!("  Created demo company: {DEMO_COMPANY_ID}");
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    user: &SeedUser,
    password_hash: &str,
) -> anyhow::Result<()> {
    if users::Entity::find_by_id(user.id).one(db).await?.is_some() {
        println!("  {} already exists, skipping...", user.email);
        return Ok(());
    }

    let now = Utc::now();
    users::ActiveModel {
        id: Set(user.id),
        company_id: Set(DEMO_COMPANY_ID),
        email: Set(user.email.to_string()),
        password_hash: Set(password_hash.to_string()),
        first_name: Set(user.first_name.to_string()),
        last_name: Set(user.last_name.to_string()),
        role: Set(user.role),
        manager_id: Set(user.manager_id),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await
    .with_context(|| format!("Failed to insert {}", user.email))?;

    println!("  Created {} ({:?})", user.email, user.role);
    Ok(())
}

async fn seed_draft_expense(db: &DatabaseConnection) -> anyhow::Result<()> {
    if expenses::Entity::find_by_id(DRAFT_EXPENSE_ID)
        .one(db)
        .await?
        .is_some()
    {
        println!("  Draft expense already exists, skipping...");
        return Ok(());
    }

    let now = Utc::now();
    expenses::ActiveModel {
        id: Set(DRAFT_EXPENSE_ID),
        submitter_id: Set(EMPLOYEE_ID),
        company_id: Set(DEMO_COMPANY_ID),
        description: Set("Team lunch with client".to_string()),
        amount: Set(Decimal::new(12_550, 2)),
        currency_code: Set("USD".to_string()),
        category: Set("Meals".to_string()),
        expense_date: Set(NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or_default()),
        status: Set(ExpenseStatus::Draft),
        submitted_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    println!("  Created draft expense for employee@expensa.dev");
    Ok(())
}
