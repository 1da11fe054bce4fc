use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{delete, get, post, web, HttpRequest, HttpResponse};
use failsafe::CircuitBreaker;
use serde::Deserialize;

use crate::auth::AuthenticatedUser;
use crate::breaker::CircuitBreakerType;
use crate::cache::IngredientCache;
use crate::config::Config;
use crate::error::{ServiceError, NOT_FOUND};
use crate::membership;
use crate::pagination::{page_base_url, PageQuery, PageRequest, Paginated};
use crate::render::DocumentRenderer;
use crate::repository::{IngredientRepository, ListKind, Repository, TagRepository};
use crate::shopping_list::{ShoppingListAggregator, ShoppingListError};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(list_ingredients)
            .service(get_ingredient)
            .service(list_tags)
            .service(get_tag)
            .service(download_shopping_cart)
            .service(add_to_shopping_cart)
            .service(remove_from_shopping_cart)
            .service(add_to_favorites)
            .service(remove_from_favorites)
            .service(list_subscriptions)
            .service(subscribe)
            .service(unsubscribe),
    );
}

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    name: Option<String>,
}

#[get("/ingredients")]
async fn list_ingredients(
    query: web::Query<IngredientQuery>,
    cache: web::Data<IngredientCache>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let name = query.into_inner().name.filter(|name| !name.is_empty());
    let ingredients = web::block(move || match name {
        Some(prefix) => repo.list_ingredients(Some(&prefix)),
        None => {
            if let Some(cached) = cache.get_all() {
                return Ok(cached);
            }
            let all = repo.list_ingredients(None)?;
            cache.put_all(&all);
            Ok(all)
        }
    })
    .await??;
    Ok(HttpResponse::Ok().json(ingredients))
}

#[get("/ingredients/{id}")]
async fn get_ingredient(
    ingredient_id: web::Path<i32>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let ingredient_id = ingredient_id.into_inner();
    let ingredient = web::block(move || repo.find_ingredient(ingredient_id))
        .await??
        .ok_or(ServiceError::NotFound(NOT_FOUND))?;
    Ok(HttpResponse::Ok().json(ingredient))
}

#[get("/tags")]
async fn list_tags(repo: web::Data<dyn Repository>) -> Result<HttpResponse, ServiceError> {
    let tags = web::block(move || repo.list_tags()).await??;
    Ok(HttpResponse::Ok().json(tags))
}

#[get("/tags/{id}")]
async fn get_tag(
    tag_id: web::Path<i32>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let tag_id = tag_id.into_inner();
    let tag = web::block(move || repo.find_tag(tag_id))
        .await??
        .ok_or(ServiceError::NotFound(NOT_FOUND))?;
    Ok(HttpResponse::Ok().json(tag))
}

#[get("/recipes/download_shopping_cart")]
async fn download_shopping_cart(
    user: AuthenticatedUser,
    circuit_breaker: web::Data<CircuitBreakerType>,
    renderer: web::Data<dyn DocumentRenderer>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = user.id();
    let document = web::block(move || {
        let aggregator = ShoppingListAggregator::new(repo.get_ref(), renderer.get_ref());
        // only store failures count against the breaker
        match circuit_breaker.call_with(ShoppingListError::is_backend_failure, || {
            aggregator.generate_shopping_list(user_id)
        }) {
            Ok(document) => Ok(document),
            Err(failsafe::Error::Inner(e)) => Err(ServiceError::from(e)),
            Err(failsafe::Error::Rejected) => Err(ServiceError::Unavailable),
        }
    })
    .await??;

    log::info!(
        "user {} downloaded shopping list ({} bytes)",
        user_id,
        document.body.len()
    );
    Ok(HttpResponse::Ok()
        .content_type(document.content_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(document.filename.to_string())],
        })
        .body(document.body))
}

async fn add_entry(
    kind: ListKind,
    user: AuthenticatedUser,
    recipe_id: i32,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = user.id();
    let recipe =
        web::block(move || membership::add_entry(repo.get_ref(), kind, user_id, recipe_id))
            .await??;
    Ok(HttpResponse::Created().json(recipe))
}

async fn remove_entry(
    kind: ListKind,
    user: AuthenticatedUser,
    recipe_id: i32,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = user.id();
    web::block(move || membership::remove_entry(repo.get_ref(), kind, user_id, recipe_id))
        .await??;
    Ok(HttpResponse::NoContent().finish())
}

#[post("/recipes/{id}/shopping_cart")]
async fn add_to_shopping_cart(
    user: AuthenticatedUser,
    recipe_id: web::Path<i32>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    add_entry(ListKind::ShoppingCart, user, recipe_id.into_inner(), repo).await
}

#[delete("/recipes/{id}/shopping_cart")]
async fn remove_from_shopping_cart(
    user: AuthenticatedUser,
    recipe_id: web::Path<i32>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    remove_entry(ListKind::ShoppingCart, user, recipe_id.into_inner(), repo).await
}

#[post("/recipes/{id}/favorite")]
async fn add_to_favorites(
    user: AuthenticatedUser,
    recipe_id: web::Path<i32>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    add_entry(ListKind::Favorites, user, recipe_id.into_inner(), repo).await
}

#[delete("/recipes/{id}/favorite")]
async fn remove_from_favorites(
    user: AuthenticatedUser,
    recipe_id: web::Path<i32>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    remove_entry(ListKind::Favorites, user, recipe_id.into_inner(), repo).await
}

#[get("/users/subscriptions")]
async fn list_subscriptions(
    req: HttpRequest,
    user: AuthenticatedUser,
    query: web::Query<PageQuery>,
    config: web::Data<Config>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let query = query.into_inner();
    let page = PageRequest::from_query(&query, config.page_size)?;
    let recipes_limit = query.recipes_limit;
    let user_id = user.id();
    let (count, authors) = web::block(move || {
        membership::subscriptions(repo.get_ref(), user_id, page, recipes_limit.map(i64::from))
    })
    .await??;

    let extra: Vec<(&str, u32)> = recipes_limit
        .map(|limit| ("recipes_limit", limit))
        .into_iter()
        .collect();
    Ok(HttpResponse::Ok().json(Paginated::new(
        &page_base_url(&req),
        page,
        count,
        authors,
        &extra,
    )))
}

#[derive(Debug, Deserialize)]
pub struct RecipesLimitQuery {
    recipes_limit: Option<u32>,
}

#[post("/users/{id}/subscribe")]
async fn subscribe(
    user: AuthenticatedUser,
    author_id: web::Path<i32>,
    query: web::Query<RecipesLimitQuery>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = user.id();
    let author_id = author_id.into_inner();
    let recipes_limit = query.into_inner().recipes_limit.map(i64::from);
    let author = web::block(move || {
        membership::subscribe(repo.get_ref(), user_id, author_id, recipes_limit)
    })
    .await??;
    log::info!("user {} subscribed to {}", user_id, author_id);
    Ok(HttpResponse::Created().json(author))
}

#[delete("/users/{id}/subscribe")]
async fn unsubscribe(
    user: AuthenticatedUser,
    author_id: web::Path<i32>,
    repo: web::Data<dyn Repository>,
) -> Result<HttpResponse, ServiceError> {
    let user_id = user.id();
    let author_id = author_id.into_inner();
    web::block(move || membership::unsubscribe(repo.get_ref(), user_id, author_id)).await??;
    Ok(HttpResponse::NoContent().finish())
}
