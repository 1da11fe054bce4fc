use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use diesel::{Connection, MysqlConnection};

use foodgram::cache::{self, IngredientCache};
use foodgram::config::Config;
use foodgram::models::{NewIngredient, NewTag};
use foodgram::query;
use foodgram::repository::RepoError;

#[derive(Parser)]
#[command(
    name = "load-data",
    about = "Foodgram catalogue loader",
    long_about = "Import ingredient or tag fixtures from a JSON array; rows already present are skipped"
)]
struct LoadArgs {
    /// Which catalogue the file holds
    #[arg(value_enum)]
    kind: FixtureKind,

    /// JSON fixture file
    path: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FixtureKind {
    Ingredients,
    Tags,
}

fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = LoadArgs::parse();
    let config = Config::load()?;
    let connection = MysqlConnection::establish(&config.database_url)?;
    let raw = fs::read_to_string(&args.path)?;

    log::info!("loading {:?} from {}", args.kind, args.path.display());
    let (total, inserted) = match args.kind {
        FixtureKind::Ingredients => {
            let rows: Vec<NewIngredient> = serde_json::from_str(&raw)?;
            let inserted = connection
                .transaction::<_, RepoError, _>(|| query::insert_ingredients(&connection, &rows))?;
            invalidate_ingredient_cache(&config);
            (rows.len(), inserted)
        }
        FixtureKind::Tags => {
            let rows: Vec<NewTag> = serde_json::from_str(&raw)?;
            let inserted = connection
                .transaction::<_, RepoError, _>(|| query::insert_tags(&connection, &rows))?;
            (rows.len(), inserted)
        }
    };

    log::info!(
        "loaded {} new {:?} ({} already present)",
        inserted,
        args.kind,
        total - inserted
    );
    Ok(())
}

fn invalidate_ingredient_cache(config: &Config) {
    if let Some(url) = config.redis_url.as_deref() {
        match cache::build_pool(url) {
            Ok(pool) => IngredientCache::new(pool).invalidate(),
            Err(e) => log::warn!("could not reach redis to invalidate cache: {}", e),
        }
    }
}
