table! {
    auth_tokens (key) {
        key -> Varchar,
        user_id -> Integer,
    }
}

table! {
    favorites (id) {
        id -> Integer,
        user_id -> Integer,
        recipe_id -> Integer,
    }
}

table! {
    ingredients (id) {
        id -> Integer,
        name -> Varchar,
        measurement_unit -> Varchar,
    }
}

table! {
    recipe_ingredients (id) {
        id -> Integer,
        recipe_id -> Integer,
        ingredient_id -> Integer,
        amount -> Integer,
    }
}

table! {
    recipe_tags (recipe_id, tag_id) {
        recipe_id -> Integer,
        tag_id -> Integer,
    }
}

table! {
    recipes (id) {
        id -> Integer,
        author_id -> Integer,
        name -> Varchar,
        image -> Varchar,
        text -> Text,
        cooking_time -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    shopping_cart (id) {
        id -> Integer,
        user_id -> Integer,
        recipe_id -> Integer,
    }
}

table! {
    subscriptions (id) {
        id -> Integer,
        subscriber_id -> Integer,
        author_id -> Integer,
    }
}

table! {
    tags (id) {
        id -> Integer,
        name -> Varchar,
        color -> Varchar,
        slug -> Varchar,
    }
}

table! {
    users (id) {
        id -> Integer,
        email -> Varchar,
        username -> Varchar,
        first_name -> Varchar,
        last_name -> Varchar,
    }
}

joinable!(auth_tokens -> users (user_id));
joinable!(favorites -> recipes (recipe_id));
joinable!(recipe_ingredients -> ingredients (ingredient_id));
joinable!(recipe_ingredients -> recipes (recipe_id));
joinable!(recipe_tags -> recipes (recipe_id));
joinable!(recipe_tags -> tags (tag_id));
joinable!(recipes -> users (author_id));
joinable!(shopping_cart -> recipes (recipe_id));

allow_tables_to_appear_in_same_query!(
    auth_tokens,
    favorites,
    ingredients,
    recipe_ingredients,
    recipe_tags,
    recipes,
    shopping_cart,
    subscriptions,
    tags,
    users,
);
