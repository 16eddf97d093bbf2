//! Saved-for-later courses

use axum::extract::{Path, State};
use axum::Extension;
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::services::wishlist::WishlistEntry;
use crate::application::AppServices;
use crate::infrastructure::database::entities::wishlist_item;
use crate::interfaces::http::common::{ok, ApiResult};
use crate::interfaces::http::middleware::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub struct WishlistMembership {
    pub course_id: String,
    pub in_wishlist: bool,
}

#[utoipa::path(
    get,
    path = "/api/v1/wishlist",
    tag = "Wishlist",
    security(("bearer_auth" = [])),
    responses((status = 200, description = "Wishlist, newest first"))
)]
pub async fn list_wishlist(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
) -> ApiResult<Vec<WishlistEntry>> {
    ok(app.wishlist.list(&user.user_id).await?)
}

#[utoipa::path(
    put,
    path = "/api/v1/wishlist/{course_id}",
    tag = "Wishlist",
    security(("bearer_auth" = [])),
    params(("course_id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Course saved; repeating is a no-op"))
)]
pub async fn add_to_wishlist(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(course_id): Path<String>,
) -> ApiResult<wishlist_item::Model> {
    ok(app.wishlist.add(&user.user_id, &course_id).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/wishlist/{course_id}",
    tag = "Wishlist",
    security(("bearer_auth" = [])),
    params(("course_id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Whether the course is saved", body = WishlistMembership))
)]
pub async fn wishlist_contains(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(course_id): Path<String>,
) -> ApiResult<WishlistMembership> {
    let in_wishlist = app.wishlist.contains(&user.user_id, &course_id).await?;
    ok(WishlistMembership { course_id, in_wishlist })
}

#[utoipa::path(
    delete,
    path = "/api/v1/wishlist/{course_id}",
    tag = "Wishlist",
    security(("bearer_auth" = [])),
    params(("course_id" = String, Path, description = "Course ID")),
    responses((status = 200, description = "Membership after removal", body = WishlistMembership))
)]
pub async fn remove_from_wishlist(
    State(app): State<AppServices>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(course_id): Path<String>,
) -> ApiResult<WishlistMembership> {
    app.wishlist.remove(&user.user_id, &course_id).await?;
    ok(WishlistMembership {
        course_id,
        in_wishlist: false,
    })
}
