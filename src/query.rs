use std::collections::BTreeSet;

use diesel::dsl::exists;
use diesel::mysql::Mysql;
use diesel::prelude::*;
use diesel::query_builder::QueryFragment;
use diesel::query_dsl::LoadQuery;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::models::{
    Ingredient, IngredientAmount, NewIngredient, NewTag, RecipeShort, Tag, User,
};
use crate::repository::{ListKind, RepoError};
use crate::schema::{
    auth_tokens, favorites, ingredients, recipe_ingredients, recipes, shopping_cart,
    subscriptions, tags, users,
};

type RecipeShortColumns = (
    recipes::id,
    recipes::name,
    recipes::image,
    recipes::cooking_time,
);

const RECIPE_SHORT_COLUMNS: RecipeShortColumns = (
    recipes::id,
    recipes::name,
    recipes::image,
    recipes::cooking_time,
);

pub fn find_user_by_token(conn: &MysqlConnection, token: &str) -> Result<Option<User>, RepoError> {
    let user = auth_tokens::table
        .inner_join(users::table)
        .filter(auth_tokens::key.eq(token))
        .select(users::all_columns)
        .first::<User>(conn)
        .optional()?;
    Ok(user)
}

pub fn find_user(conn: &MysqlConnection, user_id: i32) -> Result<Option<User>, RepoError> {
    Ok(users::table.find(user_id).first::<User>(conn).optional()?)
}

pub fn find_ingredients(
    conn: &MysqlConnection,
    name_prefix: Option<&str>,
) -> Result<Vec<Ingredient>, RepoError> {
    Ok(ingredients_query(name_prefix).load::<Ingredient>(conn)?)
}

fn ingredients_query(name_prefix: Option<&str>) -> ingredients::BoxedQuery<'static, Mysql> {
    let mut query = ingredients::table
        .order((ingredients::name.asc(), ingredients::measurement_unit.asc()))
        .into_boxed();
    if let Some(prefix) = name_prefix {
        // the column collation makes LIKE and ORDER BY case-insensitive
        let pattern = format!("{}%", escape_like(prefix));
        query = query.filter(ingredients::name.like(pattern).escape('\\'));
    }
    query
}

pub fn find_ingredient(
    conn: &MysqlConnection,
    ingredient_id: i32,
) -> Result<Option<Ingredient>, RepoError> {
    Ok(ingredients::table
        .find(ingredient_id)
        .first::<Ingredient>(conn)
        .optional()?)
}

pub fn find_amounts_for_recipes(
    conn: &MysqlConnection,
    recipe_ids: &BTreeSet<i32>,
) -> Result<Vec<IngredientAmount>, RepoError> {
    Ok(amounts_query(recipe_ids).load::<IngredientAmount>(conn)?)
}

// left join: a dangling ingredient id comes back with NULL name and unit
fn amounts_query(
    recipe_ids: &BTreeSet<i32>,
) -> impl RunQueryDsl<MysqlConnection>
       + LoadQuery<MysqlConnection, IngredientAmount>
       + QueryFragment<Mysql> {
    let ids: Vec<i32> = recipe_ids.iter().copied().collect();
    recipe_ingredients::table
        .left_join(ingredients::table)
        .filter(recipe_ingredients::recipe_id.eq_any(ids))
        .select((
            recipe_ingredients::ingredient_id,
            ingredients::name.nullable(),
            ingredients::measurement_unit.nullable(),
            recipe_ingredients::amount,
        ))
}

pub fn find_all_tags(conn: &MysqlConnection) -> Result<Vec<Tag>, RepoError> {
    Ok(tags::table.order(tags::id.asc()).load::<Tag>(conn)?)
}

pub fn find_tag(conn: &MysqlConnection, tag_id: i32) -> Result<Option<Tag>, RepoError> {
    Ok(tags::table.find(tag_id).first::<Tag>(conn).optional()?)
}

pub fn find_recipe(
    conn: &MysqlConnection,
    recipe_id: i32,
) -> Result<Option<RecipeShort>, RepoError> {
    Ok(recipes::table
        .find(recipe_id)
        .select(RECIPE_SHORT_COLUMNS)
        .first::<RecipeShort>(conn)
        .optional()?)
}

pub fn find_recipes_by_author(
    conn: &MysqlConnection,
    author_id: i32,
    limit: Option<i64>,
) -> Result<Vec<RecipeShort>, RepoError> {
    let mut query = recipes::table
        .filter(recipes::author_id.eq(author_id))
        .order(recipes::id.desc())
        .select(RECIPE_SHORT_COLUMNS)
        .into_boxed();
    if let Some(limit) = limit {
        query = query.limit(limit);
    }
    Ok(query.load::<RecipeShort>(conn)?)
}

pub fn count_recipes_by_author(conn: &MysqlConnection, author_id: i32) -> Result<i64, RepoError> {
    Ok(recipes::table
        .filter(recipes::author_id.eq(author_id))
        .count()
        .get_result::<i64>(conn)?)
}

pub fn find_cart_recipe_ids(
    conn: &MysqlConnection,
    user_id: i32,
) -> Result<BTreeSet<i32>, RepoError> {
    let ids = shopping_cart::table
        .filter(shopping_cart::user_id.eq(user_id))
        .select(shopping_cart::recipe_id)
        .load::<i32>(conn)?;
    Ok(ids.into_iter().collect())
}

fn entry_exists(
    conn: &MysqlConnection,
    kind: ListKind,
    user_id: i32,
    recipe_id: i32,
) -> QueryResult<bool> {
    match kind {
        ListKind::ShoppingCart => diesel::select(exists(
            shopping_cart::table
                .filter(shopping_cart::user_id.eq(user_id))
                .filter(shopping_cart::recipe_id.eq(recipe_id)),
        ))
        .get_result(conn),
        ListKind::Favorites => diesel::select(exists(
            favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::recipe_id.eq(recipe_id)),
        ))
        .get_result(conn),
    }
}

pub fn insert_entry(
    conn: &MysqlConnection,
    kind: ListKind,
    user_id: i32,
    recipe_id: i32,
) -> Result<(), RepoError> {
    conn.transaction::<_, RepoError, _>(|| {
        if entry_exists(conn, kind, user_id, recipe_id)? {
            return Err(RepoError::Conflict);
        }
        let inserted = match kind {
            ListKind::ShoppingCart => diesel::insert_into(shopping_cart::table)
                .values((
                    shopping_cart::user_id.eq(user_id),
                    shopping_cart::recipe_id.eq(recipe_id),
                ))
                .execute(conn),
            ListKind::Favorites => diesel::insert_into(favorites::table)
                .values((
                    favorites::user_id.eq(user_id),
                    favorites::recipe_id.eq(recipe_id),
                ))
                .execute(conn),
        };
        inserted.map(|_| ()).map_err(conflict_on_duplicate)
    })
}

pub fn delete_entry(
    conn: &MysqlConnection,
    kind: ListKind,
    user_id: i32,
    recipe_id: i32,
) -> Result<bool, RepoError> {
    let deleted = match kind {
        ListKind::ShoppingCart => diesel::delete(
            shopping_cart::table
                .filter(shopping_cart::user_id.eq(user_id))
                .filter(shopping_cart::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?,
        ListKind::Favorites => diesel::delete(
            favorites::table
                .filter(favorites::user_id.eq(user_id))
                .filter(favorites::recipe_id.eq(recipe_id)),
        )
        .execute(conn)?,
    };
    Ok(deleted > 0)
}

pub fn insert_subscription(
    conn: &MysqlConnection,
    subscriber_id: i32,
    author_id: i32,
) -> Result<(), RepoError> {
    conn.transaction::<_, RepoError, _>(|| {
        let already = diesel::select(exists(
            subscriptions::table
                .filter(subscriptions::subscriber_id.eq(subscriber_id))
                .filter(subscriptions::author_id.eq(author_id)),
        ))
        .get_result::<bool>(conn)?;
        if already {
            return Err(RepoError::Conflict);
        }
        diesel::insert_into(subscriptions::table)
            .values((
                subscriptions::subscriber_id.eq(subscriber_id),
                subscriptions::author_id.eq(author_id),
            ))
            .execute(conn)
            .map(|_| ())
            .map_err(conflict_on_duplicate)
    })
}

pub fn delete_subscription(
    conn: &MysqlConnection,
    subscriber_id: i32,
    author_id: i32,
) -> Result<bool, RepoError> {
    let deleted = diesel::delete(
        subscriptions::table
            .filter(subscriptions::subscriber_id.eq(subscriber_id))
            .filter(subscriptions::author_id.eq(author_id)),
    )
    .execute(conn)?;
    Ok(deleted > 0)
}

pub fn find_subscribed_authors(
    conn: &MysqlConnection,
    subscriber_id: i32,
    offset: i64,
    limit: i64,
) -> Result<(i64, Vec<User>), RepoError> {
    let count = subscriptions::table
        .filter(subscriptions::subscriber_id.eq(subscriber_id))
        .count()
        .get_result::<i64>(conn)?;
    let authors = subscribed_authors_query(subscriber_id, offset, limit).load::<User>(conn)?;
    Ok((count, authors))
}

fn subscribed_authors_query(
    subscriber_id: i32,
    offset: i64,
    limit: i64,
) -> impl RunQueryDsl<MysqlConnection> + LoadQuery<MysqlConnection, User> + QueryFragment<Mysql> {
    users::table
        .inner_join(subscriptions::table.on(subscriptions::author_id.eq(users::id)))
        .filter(subscriptions::subscriber_id.eq(subscriber_id))
        .select(users::all_columns)
        .order(users::username.asc())
        .offset(offset)
        .limit(limit)
}

/// Inserts catalogue rows, skipping those that collide with a unique key. Returns the number inserted.
pub fn insert_ingredients(conn: &MysqlConnection, rows: &[NewIngredient]) -> Result<usize, RepoError> {
    Ok(diesel::insert_or_ignore_into(ingredients::table)
        .values(rows)
        .execute(conn)?)
}

pub fn insert_tags(conn: &MysqlConnection, rows: &[NewTag]) -> Result<usize, RepoError> {
    Ok(diesel::insert_or_ignore_into(tags::table)
        .values(rows)
        .execute(conn)?)
}

fn conflict_on_duplicate(err: DieselError) -> RepoError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => RepoError::Conflict,
        other => RepoError::Query(other),
    }
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
