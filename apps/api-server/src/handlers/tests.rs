//! Handler tests against in-memory repositories.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use actix_web::{App, http::header, test, web};
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use quill_core::domain::{
    Category, Comment, CommentStatus, Post, PostContent, PostStatus, Role, User,
};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, CommentQuery, CommentRecord, CommentRepository, Page,
    PasswordService, PostQuery, PostRecord, PostRepository, TokenService, UserRepository,
};
use quill_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// In-memory store

#[derive(Default)]
struct Store {
    users: Mutex<HashMap<Uuid, User>>,
    posts: Mutex<HashMap<Uuid, Post>>,
    categories: Mutex<HashMap<Uuid, Category>>,
    comments: Mutex<HashMap<Uuid, Comment>>,
}

fn paginate<T>(items: Vec<T>, page: u64, per_page: u64) -> Page<T> {
    let page = page.max(1);
    let total = items.len() as u64;
    let items = items
        .into_iter()
        .skip(((page - 1) * per_page) as usize)
        .take(per_page as usize)
        .collect();
    Page {
        items,
        total,
        page,
        per_page,
    }
}

struct MemUsers(Arc<Store>);

#[async_trait]
impl BaseRepository<User, Uuid> for MemUsers {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.0.users.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, entity: User) -> Result<User, RepoError> {
        self.0
            .users
            .lock()
            .unwrap()
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: User) -> Result<User, RepoError> {
        let mut users = self.0.users.lock().unwrap();
        if !users.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0
            .users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for MemUsers {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

struct MemPosts(Arc<Store>);

impl MemPosts {
    fn hydrate(&self, post: Post) -> Option<PostRecord> {
        let author = self.0.users.lock().unwrap().get(&post.author_id).cloned()?;
        let category = post
            .category_id
            .and_then(|id| self.0.categories.lock().unwrap().get(&id).cloned());
        Some(PostRecord {
            post,
            author,
            category,
        })
    }

    fn all(&self) -> Vec<Post> {
        self.0.posts.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for MemPosts {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.0.posts.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, entity: Post) -> Result<Post, RepoError> {
        self.0
            .posts
            .lock()
            .unwrap()
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Post) -> Result<Post, RepoError> {
        let mut posts = self.0.posts.lock().unwrap();
        if !posts.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0
            .posts
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl PostRepository for MemPosts {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        Ok(self.all().into_iter().find(|p| p.slug == slug))
    }

    async fn find_record(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let post = self.0.posts.lock().unwrap().get(&id).cloned();
        Ok(post.and_then(|p| self.hydrate(p)))
    }

    async fn list(&self, query: &PostQuery) -> Result<Page<PostRecord>, RepoError> {
        let mut posts: Vec<Post> = self
            .all()
            .into_iter()
            .filter(|p| query.author_id.is_none_or(|id| p.author_id == id))
            .filter(|p| query.status.is_none_or(|s| p.status == s))
            .filter(|p| {
                query.search.as_deref().is_none_or(|term| {
                    let term = term.to_lowercase();
                    p.title.to_lowercase().contains(&term)
                        || p.excerpt.to_lowercase().contains(&term)
                })
            })
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let records = posts.into_iter().filter_map(|p| self.hydrate(p)).collect();
        Ok(paginate(records, query.page, query.per_page))
    }

    async fn list_published(
        &self,
        category_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<PostRecord>, RepoError> {
        let mut posts: Vec<Post> = self
            .all()
            .into_iter()
            .filter(|p| p.is_published())
            .filter(|p| category_id.is_none_or(|id| p.category_id == Some(id)))
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));

        let records = posts.into_iter().filter_map(|p| self.hydrate(p)).collect();
        Ok(paginate(records, page, per_page))
    }

    async fn related(
        &self,
        category_id: Option<Uuid>,
        exclude_id: Uuid,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let Some(category_id) = category_id else {
            return Ok(Vec::new());
        };
        let mut posts: Vec<Post> = self
            .all()
            .into_iter()
            .filter(|p| p.is_published())
            .filter(|p| p.category_id == Some(category_id) && p.id != exclude_id)
            .collect();
        posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        posts.truncate(limit as usize);
        Ok(posts.into_iter().filter_map(|p| self.hydrate(p)).collect())
    }

    async fn latest_published(&self) -> Result<Option<PostRecord>, RepoError> {
        let latest = self
            .all()
            .into_iter()
            .filter(|p| p.is_published())
            .max_by_key(|p| p.published_at);
        Ok(latest.and_then(|p| self.hydrate(p)))
    }

    async fn recent(&self, author_id: Option<Uuid>, limit: u64) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self
            .all()
            .into_iter()
            .filter(|p| author_id.is_none_or(|id| p.author_id == id))
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn count(
        &self,
        author_id: Option<Uuid>,
        status: Option<PostStatus>,
    ) -> Result<u64, RepoError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|p| author_id.is_none_or(|id| p.author_id == id))
            .filter(|p| status.is_none_or(|s| p.status == s))
            .count() as u64)
    }
}

struct MemCategories(Arc<Store>);

#[async_trait]
impl BaseRepository<Category, Uuid> for MemCategories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.0.categories.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, entity: Category) -> Result<Category, RepoError> {
        self.0
            .categories
            .lock()
            .unwrap()
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Category) -> Result<Category, RepoError> {
        let mut categories = self.0.categories.lock().unwrap();
        if !categories.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        categories.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0
            .categories
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CategoryRepository for MemCategories {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .0
            .categories
            .lock()
            .unwrap()
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories: Vec<Category> =
            self.0.categories.lock().unwrap().values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn list_with_posts(&self) -> Result<Vec<Category>, RepoError> {
        let posts = self.0.posts.lock().unwrap();
        let mut categories: Vec<Category> = self
            .0
            .categories
            .lock()
            .unwrap()
            .values()
            .filter(|c| posts.values().any(|p| p.category_id == Some(c.id)))
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.0.categories.lock().unwrap().contains_key(&id))
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.0.categories.lock().unwrap().len() as u64)
    }
}

struct MemComments(Arc<Store>);

impl MemComments {
    fn hydrate(&self, comment: Comment, with_post: bool) -> Option<CommentRecord> {
        let author = self
            .0
            .users
            .lock()
            .unwrap()
            .get(&comment.user_id)
            .cloned()?;
        let post = if with_post {
            self.0.posts.lock().unwrap().get(&comment.post_id).cloned()
        } else {
            None
        };
        Some(CommentRecord {
            comment,
            author,
            post,
        })
    }

    fn all(&self) -> Vec<Comment> {
        self.0.comments.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for MemComments {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        Ok(self.0.comments.lock().unwrap().get(&id).cloned())
    }

    async fn insert(&self, entity: Comment) -> Result<Comment, RepoError> {
        self.0
            .comments
            .lock()
            .unwrap()
            .insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn update(&self, entity: Comment) -> Result<Comment, RepoError> {
        let mut comments = self.0.comments.lock().unwrap();
        if !comments.contains_key(&entity.id) {
            return Err(RepoError::NotFound);
        }
        comments.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.0
            .comments
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for MemComments {
    async fn list(&self, query: &CommentQuery) -> Result<Page<CommentRecord>, RepoError> {
        let mut comments: Vec<Comment> = self
            .all()
            .into_iter()
            .filter(|c| query.status.is_none_or(|s| c.status == s))
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let records = comments
            .into_iter()
            .filter_map(|c| self.hydrate(c, true))
            .collect();
        Ok(paginate(records, query.page, query.per_page))
    }

    async fn list_for_post(
        &self,
        post_id: Uuid,
        status: Option<CommentStatus>,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let mut comments: Vec<Comment> = self
            .all()
            .into_iter()
            .filter(|c| c.post_id == post_id)
            .filter(|c| status.is_none_or(|s| c.status == s))
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(comments
            .into_iter()
            .filter_map(|c| self.hydrate(c, false))
            .collect())
    }

    async fn count(&self, status: Option<CommentStatus>) -> Result<u64, RepoError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .count() as u64)
    }

    async fn count_for_post(
        &self,
        post_id: Uuid,
        status: Option<CommentStatus>,
    ) -> Result<u64, RepoError> {
        Ok(self
            .all()
            .into_iter()
            .filter(|c| c.post_id == post_id)
            .filter(|c| status.is_none_or(|s| c.status == s))
            .count() as u64)
    }
}

// ---------------------------------------------------------------------------
// Test harness

fn mem_state() -> (Arc<Store>, AppState) {
    let store = Arc::new(Store::default());
    let state = AppState {
        users: Arc::new(MemUsers(store.clone())),
        posts: Arc::new(MemPosts(store.clone())),
        categories: Arc::new(MemCategories(store.clone())),
        comments: Arc::new(MemComments(store.clone())),
    };
    (store, state)
}

fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(JwtConfig {
        secret: "test-secret-key".to_string(),
        expiration_hours: 1,
        issuer: "test-issuer".to_string(),
    }))
}

fn password_service() -> Arc<dyn PasswordService> {
    Arc::new(Argon2PasswordService::new())
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new(token_service()))
                .app_data(web::Data::new(password_service()))
                .configure(super::configure_routes),
        )
        .await
    };
}

fn token_for(user: &User) -> String {
    token_service()
        .generate_token(user.id, &user.email, user.role)
        .unwrap()
}

fn bearer(user: &User) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token_for(user)))
}

fn seed_user(store: &Store, name: &str, role: Role) -> User {
    let user = User::new(
        name.to_owned(),
        format!("{}@example.com", Uuid::new_v4()),
        "not-a-real-hash".to_owned(),
        role,
    );
    store.users.lock().unwrap().insert(user.id, user.clone());
    user
}

fn seed_post(
    store: &Store,
    author: &User,
    title: &str,
    status: PostStatus,
    category_id: Option<Uuid>,
) -> Post {
    let post = Post::new(
        author.id,
        PostContent {
            title: title.to_owned(),
            excerpt: "An excerpt".to_owned(),
            content: "Body text".to_owned(),
            status,
            category_id,
        },
    );
    store.posts.lock().unwrap().insert(post.id, post.clone());
    post
}

fn seed_category(store: &Store, name: &str) -> Category {
    let category = Category::new(name.to_owned(), None);
    store
        .categories
        .lock()
        .unwrap()
        .insert(category.id, category.clone());
    category
}

fn seed_comment(store: &Store, post: &Post, user: &User, status: CommentStatus) -> Comment {
    let mut comment = Comment::new(post.id, user.id, "A comment".to_owned());
    comment.set_status(status);
    store
        .comments
        .lock()
        .unwrap()
        .insert(comment.id, comment.clone());
    comment
}

// ---------------------------------------------------------------------------
// Public surface

#[actix_web::test]
async fn health_check_is_public() {
    let (_store, state) = mem_state();
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/health-check").to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn home_page_lists_only_published_posts() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    seed_post(&store, &author, "Shipped", PostStatus::Published, None);
    seed_post(&store, &author, "Work in Progress", PostStatus::Draft, None);

    let app = test_app!(state);
    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let posts = body["posts"]["data"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "Shipped");
    assert_eq!(body["featured_post"]["title"], "Shipped");
}

#[actix_web::test]
async fn draft_post_is_not_publicly_visible() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let draft = seed_post(&store, &author, "Secret Draft", PostStatus::Draft, None);

    let app = test_app!(state);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/blog/{}", draft.slug))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn published_post_shows_only_approved_comments() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let reader = seed_user(&store, "Bob", Role::Author);
    let post = seed_post(&store, &author, "Shipped", PostStatus::Published, None);
    seed_comment(&store, &post, &reader, CommentStatus::Pending);
    let approved = seed_comment(&store, &post, &reader, CommentStatus::Approved);
    seed_comment(&store, &post, &reader, CommentStatus::Rejected);

    let app = test_app!(state);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/blog/{}", post.slug))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let comments = body["comments"].as_array().unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0]["id"], approved.id.to_string());
    assert_eq!(body["comment_count"], 1);
}

#[actix_web::test]
async fn category_page_lists_its_published_posts() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let category = seed_category(&store, "Systems");
    seed_post(
        &store,
        &author,
        "In Category",
        PostStatus::Published,
        Some(category.id),
    );
    seed_post(&store, &author, "Elsewhere", PostStatus::Published, None);
    seed_post(
        &store,
        &author,
        "Draft In Category",
        PostStatus::Draft,
        Some(category.id),
    );

    let app = test_app!(state);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/category/{}", category.slug))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["category"]["slug"], "systems");
    let posts = body["posts"]["data"].as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"], "In Category");
}

#[actix_web::test]
async fn related_posts_share_the_category_capped_and_newest_first() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let category = seed_category(&store, "Systems");
    let current = seed_post(
        &store,
        &author,
        "Current",
        PostStatus::Published,
        Some(category.id),
    );

    // Four published siblings with distinct publication times
    for (i, title) in ["Oldest", "Older", "Newer", "Newest"].iter().enumerate() {
        let mut post = Post::new(
            author.id,
            PostContent {
                title: (*title).to_owned(),
                excerpt: "An excerpt".to_owned(),
                content: "Body text".to_owned(),
                status: PostStatus::Published,
                category_id: Some(category.id),
            },
        );
        post.published_at = Some(Utc::now() - TimeDelta::minutes(4 - i as i64));
        store.posts.lock().unwrap().insert(post.id, post.clone());
    }
    seed_post(
        &store,
        &author,
        "Draft Sibling",
        PostStatus::Draft,
        Some(category.id),
    );
    seed_post(&store, &author, "Elsewhere", PostStatus::Published, None);

    let app = test_app!(state);
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/blog/{}", current.slug))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let titles: Vec<&str> = body["related_posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Newest", "Newer", "Older"]);
}

// ---------------------------------------------------------------------------
// Auth

#[actix_web::test]
async fn registration_always_creates_an_author() {
    let (store, state) = mem_state();
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Carol",
                "email": "carol@example.com",
                "password": "supersecret1"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 201);
    let users = store.users.lock().unwrap();
    let carol = users.values().find(|u| u.name == "Carol").unwrap();
    assert_eq!(carol.role, Role::Author);
}

#[actix_web::test]
async fn duplicate_email_registration_conflicts() {
    let (store, state) = mem_state();
    let existing = seed_user(&store, "Alice", Role::Author);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/register")
            .set_json(json!({
                "name": "Imposter",
                "email": existing.email,
                "password": "supersecret1"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 409);
}

#[actix_web::test]
async fn login_then_me_round_trip() {
    let (store, state) = mem_state();
    let hash = password_service().hash("supersecret1").unwrap();
    let user = User::new(
        "Dave".to_owned(),
        "dave@example.com".to_owned(),
        hash,
        Role::Author,
    );
    store.users.lock().unwrap().insert(user.id, user.clone());

    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({
                "email": "dave@example.com",
                "password": "supersecret1"
            }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let token = body["access_token"].as_str().unwrap().to_owned();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/auth/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["email"], "dave@example.com");
}

#[actix_web::test]
async fn protected_routes_require_a_token() {
    let (_store, state) = mem_state();
    let app = test_app!(state);

    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/dashboard").to_request()).await;

    assert_eq!(resp.status(), 401);
}

// ---------------------------------------------------------------------------
// Posts

#[actix_web::test]
async fn creating_a_draft_derives_slug_and_leaves_published_at_unset() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts")
            .insert_header(bearer(&author))
            .set_json(json!({
                "title": "Hello World",
                "excerpt": "An excerpt",
                "content": "Body text",
                "status": "draft",
                "category_id": null
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["slug"], "hello-world");
    assert!(body["data"]["published_at"].is_null());
}

#[actix_web::test]
async fn publishing_an_update_sets_published_at() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let post = seed_post(&store, &author, "Hello World", PostStatus::Draft, None);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(bearer(&author))
            .set_json(json!({
                "title": "Hello World",
                "excerpt": "An excerpt",
                "content": "Body text",
                "status": "published",
                "category_id": null
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "published");
    assert!(!body["data"]["published_at"].is_null());
}

#[actix_web::test]
async fn post_validation_reports_field_errors() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts")
            .insert_header(bearer(&author))
            .set_json(json!({
                "title": "",
                "excerpt": "",
                "content": "",
                "status": "draft",
                "category_id": null
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["excerpt"].is_array());
    assert!(body["errors"]["content"].is_array());
}

#[actix_web::test]
async fn nonexistent_category_is_a_field_error() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/posts")
            .insert_header(bearer(&author))
            .set_json(json!({
                "title": "Hello World",
                "excerpt": "An excerpt",
                "content": "Body text",
                "status": "draft",
                "category_id": Uuid::new_v4()
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["category_id"].is_array());
}

#[actix_web::test]
async fn authors_cannot_open_each_others_posts() {
    let (store, state) = mem_state();
    let alice = seed_user(&store, "Alice", Role::Author);
    let bob = seed_user(&store, "Bob", Role::Author);
    let admin = seed_user(&store, "Root", Role::Admin);
    let post = seed_post(&store, &alice, "Hers", PostStatus::Draft, None);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(bearer(&bob))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
}

#[actix_web::test]
async fn post_listing_is_scoped_for_authors_and_global_for_admins() {
    let (store, state) = mem_state();
    let alice = seed_user(&store, "Alice", Role::Author);
    let bob = seed_user(&store, "Bob", Role::Author);
    let admin = seed_user(&store, "Root", Role::Admin);
    seed_post(&store, &alice, "One", PostStatus::Draft, None);
    seed_post(&store, &alice, "Two", PostStatus::Published, None);
    seed_post(&store, &bob, "Three", PostStatus::Draft, None);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/posts")
            .insert_header(bearer(&bob))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["posts"]["data"].as_array().unwrap().len(), 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/posts")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["posts"]["data"].as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn post_search_matches_title_or_excerpt_case_insensitively() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    for (title, excerpt) in [
        ("Rust Ownership", "Moves and borrows"),
        ("Gardening Notes", "Why RUST never sleeps on iron tools"),
        ("Cooking", "Pasta basics"),
    ] {
        let post = Post::new(
            author.id,
            PostContent {
                title: title.to_owned(),
                excerpt: excerpt.to_owned(),
                content: "Body text".to_owned(),
                status: PostStatus::Draft,
                category_id: None,
            },
        );
        store.posts.lock().unwrap().insert(post.id, post.clone());
    }
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/posts?search=rUsT")
            .insert_header(bearer(&author))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    let titles: Vec<&str> = body["posts"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles.len(), 2);
    assert!(titles.contains(&"Rust Ownership"));
    assert!(titles.contains(&"Gardening Notes"));
    assert_eq!(body["filters"]["search"], "rUsT");
}

#[actix_web::test]
async fn unknown_status_filter_is_rejected() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/posts?status=archived")
            .insert_header(bearer(&author))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 422);
}

#[actix_web::test]
async fn deleting_anothers_post_is_forbidden() {
    let (store, state) = mem_state();
    let alice = seed_user(&store, "Alice", Role::Author);
    let bob = seed_user(&store, "Bob", Role::Author);
    let post = seed_post(&store, &alice, "Hers", PostStatus::Published, None);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(bearer(&bob))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);
    assert!(store.posts.lock().unwrap().contains_key(&post.id));

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/posts/{}", post.id))
            .insert_header(bearer(&alice))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert!(!store.posts.lock().unwrap().contains_key(&post.id));
}

// ---------------------------------------------------------------------------
// Comments

#[actix_web::test]
async fn client_supplied_comment_status_is_ignored() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let reader = seed_user(&store, "Bob", Role::Author);
    let post = seed_post(&store, &author, "Shipped", PostStatus::Published, None);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/comments")
            .insert_header(bearer(&reader))
            .set_json(json!({
                "post_id": post.id,
                "content": "Nice one",
                "status": "approved"
            }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 201);
    let comments = store.comments.lock().unwrap();
    let stored = comments.values().next().unwrap();
    assert_eq!(stored.status, CommentStatus::Pending);
    assert_eq!(stored.user_id, reader.id);
}

#[actix_web::test]
async fn comment_moderation_is_admin_only_and_idempotent() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let admin = seed_user(&store, "Root", Role::Admin);
    let post = seed_post(&store, &author, "Shipped", PostStatus::Published, None);
    let comment = seed_comment(&store, &post, &author, CommentStatus::Pending);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/comments/{}", comment.id))
            .insert_header(bearer(&author))
            .set_json(json!({ "status": "approved" }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            test::TestRequest::put()
                .uri(&format!("/comments/{}", comment.id))
                .insert_header(bearer(&admin))
                .set_json(json!({ "status": "approved" }))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 200);
        let stored = store.comments.lock().unwrap()[&comment.id].clone();
        assert_eq!(stored.status, CommentStatus::Approved);
    }
}

#[actix_web::test]
async fn comment_deletion_is_owner_or_admin() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let other = seed_user(&store, "Bob", Role::Author);
    let post = seed_post(&store, &author, "Shipped", PostStatus::Published, None);
    let comment = seed_comment(&store, &post, &author, CommentStatus::Approved);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/comments/{}", comment.id))
            .insert_header(bearer(&other))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/comments/{}", comment.id))
            .insert_header(bearer(&author))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    assert!(store.comments.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn moderation_queue_filters_by_status() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let admin = seed_user(&store, "Root", Role::Admin);
    let post = seed_post(&store, &author, "Shipped", PostStatus::Published, None);
    seed_comment(&store, &post, &author, CommentStatus::Pending);
    seed_comment(&store, &post, &author, CommentStatus::Approved);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/comments?status=pending")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["comments"]["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["filters"]["status"], "pending");

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/comments?status=all")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["comments"]["data"].as_array().unwrap().len(), 2);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/comments")
            .insert_header(bearer(&author))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);
}

// ---------------------------------------------------------------------------
// Categories

#[actix_web::test]
async fn category_management_requires_admin() {
    let (store, state) = mem_state();
    let author = seed_user(&store, "Alice", Role::Author);
    let admin = seed_user(&store, "Root", Role::Admin);
    let app = test_app!(state);

    let payload = json!({ "name": "Systems Programming", "description": null });

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/categories")
            .insert_header(bearer(&author))
            .set_json(&payload)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/categories")
            .insert_header(bearer(&admin))
            .set_json(&payload)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["slug"], "systems-programming");
}

#[actix_web::test]
async fn renaming_a_category_rederives_its_slug() {
    let (store, state) = mem_state();
    let admin = seed_user(&store, "Root", Role::Admin);
    let category = seed_category(&store, "Old Name");
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/categories/{}", category.id))
            .insert_header(bearer(&admin))
            .set_json(json!({ "name": "New Name", "description": null }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["slug"], "new-name");
}

// ---------------------------------------------------------------------------
// Dashboard

#[actix_web::test]
async fn dashboard_stats_are_scoped_by_role() {
    let (store, state) = mem_state();
    let alice = seed_user(&store, "Alice", Role::Author);
    let bob = seed_user(&store, "Bob", Role::Author);
    let admin = seed_user(&store, "Root", Role::Admin);
    seed_category(&store, "Systems");
    let post = seed_post(&store, &alice, "Hers", PostStatus::Published, None);
    seed_post(&store, &bob, "His", PostStatus::Draft, None);
    seed_comment(&store, &post, &bob, CommentStatus::Pending);
    let app = test_app!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/dashboard")
            .insert_header(bearer(&alice))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["stats"]["total_posts"], 1);
    assert_eq!(body["stats"]["published_posts"], 1);
    assert_eq!(body["stats"]["total_categories"], 0);
    assert_eq!(body["recent_posts"].as_array().unwrap().len(), 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/dashboard")
            .insert_header(bearer(&admin))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["stats"]["total_posts"], 2);
    assert_eq!(body["stats"]["pending_comments"], 1);
    assert_eq!(body["stats"]["total_categories"], 1);
    assert_eq!(body["recent_posts"].as_array().unwrap().len(), 2);
}
