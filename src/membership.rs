use crate::error::{
    ServiceError, DOUBLE_ADD, DOUBLE_SUB, NOT_ADDED, NOT_FOUND, NOT_SUBSCRIBED, NO_RECIPE,
    SELF_SUB,
};
use crate::models::{RecipeShort, SubscribedAuthor, User};
use crate::pagination::PageRequest;
use crate::repository::{
    ListKind, MembershipRepository, RecipeRepository, RepoError, SubscriptionRepository,
    UserRepository,
};

pub fn add_entry<R>(
    repo: &R,
    kind: ListKind,
    user_id: i32,
    recipe_id: i32,
) -> Result<RecipeShort, ServiceError>
where
    R: RecipeRepository + MembershipRepository + ?Sized,
{
    let recipe = repo
        .find_recipe(recipe_id)?
        .ok_or(ServiceError::BadRequest(NO_RECIPE))?;
    match repo.add_entry(kind, user_id, recipe_id) {
        Ok(()) => {
            log::info!("user {} added recipe {} to {:?}", user_id, recipe_id, kind);
            Ok(recipe)
        }
        Err(RepoError::Conflict) => Err(ServiceError::BadRequest(DOUBLE_ADD)),
        Err(e) => Err(e.into()),
    }
}

pub fn remove_entry<R>(
    repo: &R,
    kind: ListKind,
    user_id: i32,
    recipe_id: i32,
) -> Result<(), ServiceError>
where
    R: RecipeRepository + MembershipRepository + ?Sized,
{
    if repo.find_recipe(recipe_id)?.is_none() {
        return Err(ServiceError::NotFound(NOT_FOUND));
    }
    if !repo.remove_entry(kind, user_id, recipe_id)? {
        return Err(ServiceError::BadRequest(NOT_ADDED));
    }
    Ok(())
}

pub fn subscribe<R>(
    repo: &R,
    subscriber_id: i32,
    author_id: i32,
    recipes_limit: Option<i64>,
) -> Result<SubscribedAuthor, ServiceError>
where
    R: UserRepository + RecipeRepository + SubscriptionRepository + ?Sized,
{
    let author = repo
        .find_user(author_id)?
        .ok_or(ServiceError::NotFound(NOT_FOUND))?;
    if author.id == subscriber_id {
        return Err(ServiceError::BadRequest(SELF_SUB));
    }
    match repo.subscribe(subscriber_id, author_id) {
        Ok(()) => author_with_recipes(repo, author, recipes_limit),
        Err(RepoError::Conflict) => Err(ServiceError::BadRequest(DOUBLE_SUB)),
        Err(e) => Err(e.into()),
    }
}

pub fn unsubscribe<R>(repo: &R, subscriber_id: i32, author_id: i32) -> Result<(), ServiceError>
where
    R: UserRepository + SubscriptionRepository + ?Sized,
{
    if repo.find_user(author_id)?.is_none() {
        return Err(ServiceError::NotFound(NOT_FOUND));
    }
    if !repo.unsubscribe(subscriber_id, author_id)? {
        return Err(ServiceError::BadRequest(NOT_SUBSCRIBED));
    }
    Ok(())
}

/// One page of followed authors plus the total count.
pub fn subscriptions<R>(
    repo: &R,
    subscriber_id: i32,
    page: PageRequest,
    recipes_limit: Option<i64>,
) -> Result<(i64, Vec<SubscribedAuthor>), ServiceError>
where
    R: RecipeRepository + SubscriptionRepository + ?Sized,
{
    let (count, authors) = repo.subscribed_authors(subscriber_id, page.offset(), page.limit)?;
    page.check_in_range(count)?;
    let authors = authors
        .into_iter()
        .map(|author| author_with_recipes(repo, author, recipes_limit))
        .collect::<Result<Vec<_>, _>>()?;
    Ok((count, authors))
}

fn author_with_recipes<R>(
    repo: &R,
    author: User,
    recipes_limit: Option<i64>,
) -> Result<SubscribedAuthor, ServiceError>
where
    R: RecipeRepository + ?Sized,
{
    let recipes = repo.recipes_by_author(author.id, recipes_limit)?;
    let recipes_count = repo.count_recipes_by_author(author.id)?;
    Ok(SubscribedAuthor {
        user: author,
        is_subscribed: true,
        recipes,
        recipes_count,
    })
}
