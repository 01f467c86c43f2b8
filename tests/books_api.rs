use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use folio_app::App;
use folio_kernel::settings::Settings;
use serde_json::Value;
use tower::ServiceExt;

async fn app() -> App {
    let mut settings = Settings::default();
    settings.database.path = ":memory:".to_string();
    App::bootstrap(settings).await.unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, headers, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn get_with_cookie(uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn post_form(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

async fn first_book_id(router: &Router) -> i64 {
    let (_, _, books) = send(router, get("/api/books")).await;
    books[0]["id"].as_i64().unwrap()
}

fn flash_cookie(headers: &HeaderMap) -> String {
    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn lists_seeded_books_by_title() {
    let router = app().await.router();

    let (status, _, books) = send(&router, get("/api/books")).await;

    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = books
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Clean Code", "Deep Learning", "Fluent Python"]);
    assert_eq!(books[0]["author"], "Robert C. Martin");
}

#[tokio::test]
async fn root_redirects_to_book_list() {
    let router = app().await.router();

    let (status, headers, _) = send(&router, get("/")).await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], "/api/books");
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let router = app().await.router();

    let (status, _, body) = send(&router, get("/api/books/9999")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn detail_without_reviews_has_no_flash() {
    let router = app().await.router();
    let book_id = first_book_id(&router).await;

    let (status, headers, body) = send(&router, get(&format!("/api/books/{book_id}"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["book"]["title"], "Clean Code");
    assert_eq!(body["reviews"], serde_json::json!([]));
    assert!(body["flash"].is_null());
    assert!(headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn valid_review_redirects_with_success_flash() {
    let router = app().await.router();
    let book_id = first_book_id(&router).await;
    let detail_path = format!("/api/books/{book_id}");

    let (status, headers, body) = send(
        &router,
        post_form(
            &format!("{detail_path}/reviews"),
            "username=alice&rating=5&comment=Great+read",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], detail_path.as_str());
    assert_eq!(body["flash"]["kind"], "success");
    assert_eq!(body["flash"]["message"], "Your review has been added!");

    let cookie = flash_cookie(&headers);
    assert_eq!(cookie, "folio_flash=review_added");

    let (status, headers, detail) = send(&router, get_with_cookie(&detail_path, &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["flash"]["kind"], "success");
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(detail["reviews"][0]["username"], "alice");
    assert_eq!(detail["reviews"][0]["rating"], 5);
    assert_eq!(detail["reviews"][0]["comment"], "Great read");
    assert!(headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));
}

#[tokio::test]
async fn newer_reviews_are_listed_first() {
    let router = app().await.router();
    let book_id = first_book_id(&router).await;
    let detail_path = format!("/api/books/{book_id}");

    for name in ["first", "second", "third"] {
        let (status, _, _) = send(
            &router,
            post_form(
                &format!("{detail_path}/reviews"),
                &format!("username={name}&rating=4&comment=ok"),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::SEE_OTHER);
    }

    let (_, _, detail) = send(&router, get(&detail_path)).await;
    let names: Vec<&str> = detail["reviews"]
        .as_array()
        .unwrap()
        .iter()
        .map(|review| review["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn out_of_range_rating_redirects_with_error_and_stores_nothing() {
    let router = app().await.router();
    let book_id = first_book_id(&router).await;
    let detail_path = format!("/api/books/{book_id}");

    let (status, headers, body) = send(
        &router,
        post_form(
            &format!("{detail_path}/reviews"),
            "username=alice&rating=6&comment=Great+read",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], detail_path.as_str());
    assert_eq!(flash_cookie(&headers), "folio_flash=invalid_rating");
    assert_eq!(body["flash"]["kind"], "error");
    assert_eq!(
        body["flash"]["message"],
        "Rating must be a number between 1 and 5."
    );

    let (_, _, detail) = send(&router, get(&detail_path)).await;
    assert_eq!(detail["reviews"], serde_json::json!([]));
}

#[tokio::test]
async fn non_numeric_rating_gets_the_rating_message() {
    let router = app().await.router();
    let book_id = first_book_id(&router).await;

    let (status, headers, _) = send(
        &router,
        post_form(
            &format!("/api/books/{book_id}/reviews"),
            "username=alice&rating=abc&comment=Great+read",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(flash_cookie(&headers), "folio_flash=invalid_rating");
}

#[tokio::test]
async fn blank_or_missing_fields_get_the_required_message() {
    let router = app().await.router();
    let book_id = first_book_id(&router).await;
    let reviews_path = format!("/api/books/{book_id}/reviews");

    for form in ["username=&rating=4&comment=Good", "username=+++&rating=4&comment=Good", ""] {
        let (status, headers, body) = send(&router, post_form(&reviews_path, form)).await;

        assert_eq!(status, StatusCode::SEE_OTHER, "form {form:?}");
        assert_eq!(flash_cookie(&headers), "folio_flash=missing_fields");
        assert_eq!(body["flash"]["message"], "All fields are required.");
    }

    let (_, _, detail) = send(&router, get(&format!("/api/books/{book_id}"))).await;
    assert_eq!(detail["reviews"], serde_json::json!([]));
}

#[tokio::test]
async fn review_for_unknown_book_is_not_found() {
    let router = app().await.router();

    let (status, headers, body) = send(
        &router,
        post_form("/api/books/9999/reviews", "username=&rating=&comment="),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert!(headers.get(header::SET_COOKIE).is_none());
}

fn post_without_content_type(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn unreadable_body_for_unknown_book_is_not_found() {
    let router = app().await.router();

    let (status, headers, body) = send(
        &router,
        post_without_content_type("/api/books/9999/reviews", "username=a&rating=5&comment=x"),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert!(headers.get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn unreadable_body_counts_as_missing_fields() {
    let router = app().await.router();
    let book_id = first_book_id(&router).await;
    let detail_path = format!("/api/books/{book_id}");

    let (status, headers, body) = send(
        &router,
        post_without_content_type(
            &format!("{detail_path}/reviews"),
            "username=a&rating=5&comment=x",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(headers[header::LOCATION], detail_path.as_str());
    assert_eq!(flash_cookie(&headers), "folio_flash=missing_fields");
    assert_eq!(body["flash"]["message"], "All fields are required.");

    let (_, _, detail) = send(&router, get(&detail_path)).await;
    assert_eq!(detail["reviews"], serde_json::json!([]));
}

#[tokio::test]
async fn duplicate_fields_keep_the_first_value() {
    let router = app().await.router();
    let book_id = first_book_id(&router).await;
    let detail_path = format!("/api/books/{book_id}");

    let (status, headers, _) = send(
        &router,
        post_form(
            &format!("{detail_path}/reviews"),
            "username=a&username=b&rating=5&comment=x",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(flash_cookie(&headers), "folio_flash=review_added");

    let (_, _, detail) = send(&router, get(&detail_path)).await;
    assert_eq!(detail["reviews"][0]["username"], "a");
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn non_integer_book_id_is_not_found() {
    let router = app().await.router();

    let (status, _, body) = send(&router, get("/api/books/abc")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");

    let (status, headers, body) = send(
        &router,
        post_form("/api/books/abc/reviews", "username=a&rating=5&comment=x"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
    assert!(headers.get(header::SET_COOKIE).is_none());
}
