use crate::cli::{GlobalArgs, PropertiesArgs, ReservationsArgs, UserArgs, UserLookup};
use crate::output;
use anyhow::Context;
use lightbnb_db::{Database, DbConfig, repo};

fn open(global: &GlobalArgs) -> anyhow::Result<Database> {
    let config = match &global.database {
        Some(url) => DbConfig::from_url(url.clone()),
        None => DbConfig::from_env().context("failed to load database configuration")?,
    };
    Database::connect(&config).context("failed to create database pool")
}

/// Run `f` against a freshly opened database and close it afterwards.
async fn with_database<T, F, Fut>(global: &GlobalArgs, f: F) -> anyhow::Result<T>
where
    F: FnOnce(Database) -> Fut,
    Fut: std::future::Future<Output = anyhow::Result<T>>,
{
    let db = open(global)?;
    let result = f(db.clone()).await;
    db.close();
    result
}

pub async fn user(args: UserArgs) -> anyhow::Result<()> {
    let lookup = args.lookup.clone();
    let user = with_database(&args.global, |db| async move {
        let user = match &lookup {
            UserLookup::Email(email) => repo::get_user_with_email(&db, email).await,
            UserLookup::Id(id) => repo::get_user_with_id(&db, *id).await,
        };
        user.context("user lookup failed")
    })
    .await?;

    match user {
        Some(user) => output::print_users(&[user], args.global.json),
        None => {
            tracing::info!(lookup = ?args.lookup, "no matching user");
            anyhow::bail!("no user matches {:?}", args.lookup)
        }
    }
}

pub async fn properties(args: PropertiesArgs) -> anyhow::Result<()> {
    let filter = args.filter.clone();
    let listings = with_database(&args.global, |db| async move {
        repo::get_all_properties(&db, &filter)
            .await
            .context("property search failed")
    })
    .await?;
    output::print_properties(&listings, args.global.json)
}

pub async fn reservations(args: ReservationsArgs) -> anyhow::Result<()> {
    let guest_id = args.guest_id;
    let limit = args.limit;
    let reservations = with_database(&args.global, |db| async move {
        repo::get_all_reservations(&db, guest_id, limit)
            .await
            .context("reservation lookup failed")
    })
    .await?;
    output::print_reservations(&reservations, args.global.json)
}
