//! Handler-level tests running the full app against the in-memory store.

use actix_web::http::header;
use actix_web::{App, test, web};
use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use ripple_core::ports::{PasswordService, TokenService};
use ripple_infra::auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
use ripple_shared::dto::{
    AuthResponse, FollowToggleResponse, LikeToggleResponse, PostResponse, ProfileResponse,
};

use crate::handlers::{configure_routes, fallback};
use crate::state::AppState;

fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "test-secret".to_string(),
        expiration_hours: 24,
        issuer: "test".to_string(),
    }
}

fn token_service() -> Arc<dyn TokenService> {
    Arc::new(JwtTokenService::new(jwt_config()))
}

macro_rules! test_app {
    ($state:expr, $tokens:expr) => {{
        let password_service: Arc<dyn PasswordService> = Arc::new(Argon2PasswordService::new());
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .app_data(web::Data::new($tokens.clone()))
                .app_data(web::Data::new(password_service))
                .configure(configure_routes)
                .default_service(web::route().to(fallback)),
        )
        .await
    }};
}

macro_rules! register {
    ($app:expr, $name:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/register")
            .set_json(json!({
                "email": format!("{}@example.com", $name),
                "username": $name,
                "password": "password123",
            }))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), 201);
        test::read_body_json::<AuthResponse, _>(resp).await
    }};
}

macro_rules! create_post {
    ($app:expr, $token:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", $token)))
            .set_json($body)
            .to_request();
        test::call_service($app, req).await
    }};
}

macro_rules! get_posts {
    ($app:expr, $uri:expr) => {{
        let req = test::TestRequest::get().uri($uri).to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), 200);
        test::read_body_json::<Vec<PostResponse>, _>(resp).await
    }};
}

macro_rules! toggle_follow {
    ($app:expr, $token:expr, $user_id:expr) => {{
        let req = test::TestRequest::post()
            .uri(&format!("/api/users/{}/follow", $user_id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", $token)))
            .to_request();
        test::call_service($app, req).await
    }};
}

#[actix_rt::test]
async fn register_login_and_profile() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    let auth = register!(&app, "alice");
    assert_eq!(auth.user.username, "alice");
    assert!(!auth.token.is_empty());

    // correct credentials
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"email": "alice@example.com", "password": "password123"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // wrong password: uniform 401
    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({"email": "alice@example.com", "password": "wrong-password"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    // profile is public and counts start at zero
    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", auth.user.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let profile: ProfileResponse = test::read_body_json(resp).await;
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.posts, 0);
    assert_eq!(profile.followers, 0);

    // unknown user
    let req = test::TestRequest::get()
        .uri(&format!("/api/users/{}", Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn duplicate_registration_is_rejected() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    register!(&app, "alice");

    // same email, different username
    let req = test::TestRequest::post()
        .uri("/api/register")
        .set_json(json!({
            "email": "alice@example.com",
            "username": "alice2",
            "password": "password123",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn feed_composes_followed_roots_newest_first() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    let alice = register!(&app, "alice");
    let bob = register!(&app, "bob");
    let carol = register!(&app, "carol");

    let resp = create_post!(&app, bob.token, json!({"content": "from bob"}));
    assert_eq!(resp.status(), 201);
    let bob_post: PostResponse = test::read_body_json(resp).await;
    assert_eq!(bob_post.author.username, "bob");

    let resp = create_post!(&app, carol.token, json!({"content": "from carol"}));
    assert_eq!(resp.status(), 201);
    let carol_post: PostResponse = test::read_body_json(resp).await;

    // a reply to bob's post, newer than both roots
    let resp = create_post!(
        &app,
        bob.token,
        json!({"content": "a reply", "replyToId": bob_post.id})
    );
    assert_eq!(resp.status(), 201);

    let resp = toggle_follow!(&app, alice.token, bob.user.id);
    assert_eq!(resp.status(), 200);
    let outcome: FollowToggleResponse = test::read_body_json(resp).await;
    assert!(outcome.success && outcome.following);
    let resp = toggle_follow!(&app, alice.token, carol.user.id);
    assert_eq!(resp.status(), 200);

    // newest first, replies excluded, reply count live
    let req = test::TestRequest::get()
        .uri("/api/feed")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", alice.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let feed: Vec<PostResponse> = test::read_body_json(resp).await;
    let ids: Vec<Uuid> = feed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![carol_post.id, bob_post.id]);
    assert_eq!(feed[1].reply_count, 1);

    // public listing also shows only the two roots
    let roots = get_posts!(&app, "/api/posts");
    assert_eq!(roots.len(), 2);

    // the reply is reachable under its parent
    let replies = get_posts!(&app, &format!("/api/posts/{}/replies", bob_post.id));
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].content, "a reply");

    // unfollowing bob drops his post from the feed
    let resp = toggle_follow!(&app, alice.token, bob.user.id);
    let outcome: FollowToggleResponse = test::read_body_json(resp).await;
    assert!(!outcome.following);

    let req = test::TestRequest::get()
        .uri("/api/feed")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", alice.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let feed: Vec<PostResponse> = test::read_body_json(resp).await;
    let ids: Vec<Uuid> = feed.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![carol_post.id]);
}

#[actix_rt::test]
async fn like_toggle_flips_and_counts_live() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    let alice = register!(&app, "alice");
    let bob = register!(&app, "bob");

    let resp = create_post!(&app, bob.token, json!({"content": "like me"}));
    let post: PostResponse = test::read_body_json(resp).await;

    for expected in [true, false, true] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/posts/{}/like", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", alice.token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let outcome: LikeToggleResponse = test::read_body_json(resp).await;
        assert!(outcome.success);
        assert_eq!(outcome.liked, expected);
    }

    let roots = get_posts!(&app, "/api/posts");
    assert_eq!(roots[0].like_count, 1);
}

#[actix_rt::test]
async fn self_follow_is_rejected() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    let alice = register!(&app, "alice");

    let resp = toggle_follow!(&app, alice.token, alice.user.id);
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn invalid_content_and_missing_reply_target_are_rejected() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    let alice = register!(&app, "alice");

    let resp = create_post!(&app, alice.token, json!({"content": ""}));
    assert_eq!(resp.status(), 400);

    let resp = create_post!(&app, alice.token, json!({"content": "   \n"}));
    assert_eq!(resp.status(), 400);

    let resp = create_post!(
        &app,
        alice.token,
        json!({"content": "orphan", "replyToId": Uuid::new_v4()})
    );
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
async fn junk_pagination_parameters_fall_back_to_defaults() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    let alice = register!(&app, "alice");
    let resp = create_post!(&app, alice.token, json!({"content": "hello"}));
    assert_eq!(resp.status(), 201);

    let posts = get_posts!(&app, "/api/posts?page=abc&limit=-5");
    assert_eq!(posts.len(), 1);
}

#[actix_rt::test]
async fn auth_failures_are_uniform_across_causes() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    let alice = register!(&app, "alice");

    // valid credential sanity check
    let req = test::TestRequest::get()
        .uri("/api/feed")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", alice.token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    // expired token, signed with the right key
    let expired_issuer = JwtTokenService::new(JwtConfig {
        expiration_hours: -1,
        ..jwt_config()
    });
    let expired = expired_issuer
        .generate_token(alice.user.id, "alice")
        .unwrap();

    // well-formed token whose subject was never registered
    let ghost = tokens.generate_token(Uuid::new_v4(), "ghost").unwrap();

    let mut bodies = Vec::new();
    for auth_header in [
        None,
        Some("Bearer garbage".to_string()),
        Some(format!("Bearer {expired}")),
        Some(format!("Bearer {ghost}")),
    ] {
        let mut req = test::TestRequest::get().uri("/api/feed");
        if let Some(value) = auth_header {
            req = req.insert_header((header::AUTHORIZATION, value));
        }
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), 401);
        bodies.push(test::read_body(resp).await);
    }

    // one body for every cause - nothing leaks which check failed
    assert!(bodies.windows(2).all(|w| w[0] == w[1]));
}

#[actix_rt::test]
async fn unknown_routes_fall_back_with_200() {
    let state = AppState::new(None).await;
    let tokens = token_service();
    let app = test_app!(state, tokens);

    for uri in ["/api/not-a-thing", "/definitely/not/here"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200, "uri: {uri}");
        let body = test::read_body(resp).await;
        assert!(std::str::from_utf8(&body).unwrap().contains("Check the path"));
    }
}
