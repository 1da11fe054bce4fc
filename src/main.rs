use std::io;
use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};

use foodgram::breaker::{circuit_breaker, CircuitBreakerType};
use foodgram::cache::{self, IngredientCache};
use foodgram::config::Config;
use foodgram::render::{DocumentRenderer, PlainTextRenderer};
use foodgram::repository::{MysqlRepository, Repository};
use foodgram::routes;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::load().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    // set up database connection pool
    let repo = MysqlRepository::connect(&config.database_url)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    let repo: Arc<dyn Repository> = Arc::new(repo);

    let ingredient_cache = match config.redis_url.as_deref() {
        Some(url) => match cache::build_pool(url) {
            Ok(pool) => IngredientCache::new(pool),
            Err(e) => {
                log::warn!("redis unavailable, ingredient cache disabled: {}", e);
                IngredientCache::disabled()
            }
        },
        None => IngredientCache::disabled(),
    };

    let renderer: Arc<dyn DocumentRenderer> = Arc::new(PlainTextRenderer);
    let circuit_breaker: CircuitBreakerType = circuit_breaker();

    let repo = web::Data::from(repo);
    let renderer = web::Data::from(renderer);
    let circuit_breaker = web::Data::new(circuit_breaker);
    let ingredient_cache = web::Data::new(ingredient_cache);
    let app_config = web::Data::new(config.clone());

    log::info!(
        "starting HTTP server at http://{}:{}",
        config.bind_address,
        config.port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(repo.clone())
            .app_data(renderer.clone())
            .app_data(circuit_breaker.clone())
            .app_data(ingredient_cache.clone())
            .app_data(app_config.clone())
            .wrap(middleware::Logger::default())
            .configure(routes::configure)
    })
    .bind((config.bind_address.as_str(), config.port))?
    .run()
    .await
}
