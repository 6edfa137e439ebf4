//! End-to-end HTTP tests: routing, sessions, CSRF, and role redirects.

mod common;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use regex::Regex;

use shala::auth::rate_limit::LoginThrottle;
use shala::models::submission::{FormType, Status};
use shala::repo::{MemoryRepository, Repository};
use shala::routes;
use shala::workflow::submission;
use common::*;

macro_rules! test_app {
    ($env:expr) => {
        test::init_service(
            App::new()
                .wrap(
                    SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&[7u8; 64]))
                        .cookie_secure(false)
                        .build(),
                )
                .app_data(web::Data::new($env.repo.clone()))
                .app_data(web::Data::new($env.uploads.clone()))
                .app_data(web::Data::new(LoginThrottle::new()))
                .configure(routes::configure::<MemoryRepository>)
                .default_service(web::to(routes::not_found)),
        )
        .await
    };
}

/// Log `$user` in through the login form, updating `$jar`.
macro_rules! log_in {
    ($app:expr, $jar:expr, $user:expr, $pass:expr) => {{
        let req = $jar.attach(test::TestRequest::get().uri("/login")).to_request();
        let resp = test::call_service(&$app, req).await;
        $jar.update(&resp);
        let token = csrf_token(std::str::from_utf8(&test::read_body(resp).await).unwrap());
        let form = serde_urlencoded::to_string([
            ("username", $user),
            ("password", $pass),
            ("csrf_token", token.as_str()),
        ])
        .unwrap();
        let req = $jar
            .attach(test::TestRequest::post().uri("/login"))
            .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
            .set_payload(form)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        $jar.update(&resp);
    }};
}

/// Session cookie carried between requests.
#[derive(Default)]
struct Jar(Option<Cookie<'static>>);

impl Jar {
    fn attach(&self, req: test::TestRequest) -> test::TestRequest {
        match &self.0 {
            Some(cookie) => req.cookie(cookie.clone()),
            None => req,
        }
    }

    fn update<B>(&mut self, resp: &ServiceResponse<B>) {
        if let Some(cookie) = resp.response().cookies().find(|c| c.name() == "id") {
            self.0 = Some(cookie.into_owned());
        }
    }
}

fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn csrf_token(body: &str) -> String {
    let re = Regex::new(r#"name="csrf_token" value="([0-9a-f]+)""#).unwrap();
    re.captures(body)
        .map(|c| c[1].to_string())
        .expect("no csrf token in page")
}

fn multipart_body(boundary: &str, fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

#[actix_rt::test]
async fn test_protected_pages_redirect_to_login() {
    let env = setup();
    let app = test_app!(env);

    for path in ["/student_dashboard", "/admin_dashboard", "/bonafide_form", "/admin/forms/bonafide"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&resp), format!("/login?next={path}"), "{path}");
    }

    // Non-GET requests are sent to the plain login page
    let req = test::TestRequest::post().uri("/admin/form/bonafide/1/update_status").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
}

#[actix_rt::test]
async fn test_unknown_paths_are_not_found_without_login() {
    let env = setup();
    let app = test_app!(env);

    for path in ["/no/such/page", "/admin/forms", "/uploads"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[actix_rt::test]
async fn test_login_returns_to_requested_page() {
    let env = setup();
    register_student(&env.repo, "asha", "Asha Patil").await;
    let app = test_app!(env);
    let mut jar = Jar::default();

    let req = test::TestRequest::get().uri("/login?next=/hostel_form").to_request();
    let resp = test::call_service(&app, req).await;
    jar.update(&resp);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains(r#"name="next""#));
    let token = csrf_token(&page);

    let form = serde_urlencoded::to_string([
        ("username", "asha"),
        ("password", STUDENT_PASS),
        ("csrf_token", token.as_str()),
        ("next", "/hostel_form"),
    ])
    .unwrap();
    let req = jar
        .attach(test::TestRequest::post().uri("/login"))
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/hostel_form");
}

#[actix_rt::test]
async fn test_login_ignores_offsite_next() {
    let env = setup();
    register_student(&env.repo, "asha", "Asha Patil").await;
    let app = test_app!(env);
    let mut jar = Jar::default();

    let req = test::TestRequest::get().uri("/login?next=//evil.example/").to_request();
    let resp = test::call_service(&app, req).await;
    jar.update(&resp);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(!page.contains(r#"name="next""#));
    let token = csrf_token(&page);

    let form = serde_urlencoded::to_string([
        ("username", "asha"),
        ("password", STUDENT_PASS),
        ("csrf_token", token.as_str()),
        ("next", "https://evil.example/"),
    ])
    .unwrap();
    let req = jar
        .attach(test::TestRequest::post().uri("/login"))
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/student_dashboard");
}

#[actix_rt::test]
async fn test_oversized_submission_body_is_refused() {
    let env = setup_with_limit(1024);
    register_student(&env.repo, "asha", "Asha Patil").await;
    let app = test_app!(env);
    let mut jar = Jar::default();
    log_in!(app, jar, "asha", STUDENT_PASS);

    let req = jar.attach(test::TestRequest::get().uri("/hostel_form")).to_request();
    let resp = test::call_service(&app, req).await;
    jar.update(&resp);
    let token = csrf_token(std::str::from_utf8(&test::read_body(resp).await).unwrap());

    let big = vec![b'x'; 400 * 1024];
    let boundary = "----shalaboundary";
    let body = multipart_body(
        boundary,
        &[("csrf_token", token.as_str()), ("student_name", "Asha Patil")],
        &[("parent_signature", "sign.png", big.as_slice())],
    );
    let req = jar
        .attach(test::TestRequest::post().uri("/hostel_form"))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains("larger than"));

    assert_eq!(env.repo.count_submissions(FormType::Hostel, None, None).await.unwrap(), 0);
    assert_eq!(stored_files(&env), 0);
}

#[actix_rt::test]
async fn test_file_parts_outside_the_form_are_not_kept() {
    let env = setup();
    register_student(&env.repo, "asha", "Asha Patil").await;
    let app = test_app!(env);
    let mut jar = Jar::default();
    log_in!(app, jar, "asha", STUDENT_PASS);

    let req = jar.attach(test::TestRequest::get().uri("/bonafide_form")).to_request();
    let resp = test::call_service(&app, req).await;
    jar.update(&resp);
    let token = csrf_token(std::str::from_utf8(&test::read_body(resp).await).unwrap());

    let boundary = "----shalaboundary";
    let body = multipart_body(
        boundary,
        &[
            ("csrf_token", token.as_str()),
            ("student_name", "Asha Patil"),
            ("academic_year", "2024-25"),
            ("class_standard", "8"),
            ("division", "A"),
            ("conduct", "Good"),
            ("caste", "Maratha"),
            ("birth_date", "2011-06-15"),
            ("birth_place", "Pune"),
            ("school_place", "Shirur"),
        ],
        &[("junk1", "a.png", b"png".as_slice()), ("junk2", "b.png", b"png".as_slice())],
    );
    let req = jar
        .attach(test::TestRequest::post().uri("/bonafide_form"))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert!(location(&resp).starts_with("/form_success/bonafide/"));
    assert_eq!(stored_files(&env), 0);
}

#[actix_rt::test]
async fn test_login_without_csrf_token_is_forbidden() {
    let env = setup();
    register_student(&env.repo, "asha", "Asha Patil").await;
    let app = test_app!(env);

    let body = serde_urlencoded::to_string([
        ("username", "asha"),
        ("password", STUDENT_PASS),
        ("csrf_token", "forged"),
    ])
    .unwrap();
    let req = test::TestRequest::post()
        .uri("/login")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_rt::test]
async fn test_register_login_submit_and_review_over_http() {
    let env = setup();
    seed_admin(&env.repo).await;
    let app = test_app!(env);
    let mut student = Jar::default();

    // Register
    let resp = test::call_service(&app, test::TestRequest::get().uri("/register").to_request()).await;
    student.update(&resp);
    let token = csrf_token(std::str::from_utf8(&test::read_body(resp).await).unwrap());

    let form = serde_urlencoded::to_string([
        ("username", "asha"),
        ("email", "asha@example.com"),
        ("full_name", "Asha Patil"),
        ("password", STUDENT_PASS),
        ("password2", STUDENT_PASS),
        ("csrf_token", token.as_str()),
    ])
    .unwrap();
    let req = student
        .attach(test::TestRequest::post().uri("/register"))
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/login");
    student.update(&resp);

    // The flash carries the new student id
    let req = student.attach(test::TestRequest::get().uri("/login")).to_request();
    let resp = test::call_service(&app, req).await;
    student.update(&resp);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains("STU001"));
    let token = csrf_token(&page);

    // Login
    let form = serde_urlencoded::to_string([
        ("username", "asha"),
        ("password", STUDENT_PASS),
        ("csrf_token", token.as_str()),
    ])
    .unwrap();
    let req = student
        .attach(test::TestRequest::post().uri("/login"))
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/student_dashboard");
    student.update(&resp);

    // Submit a bonafide request as multipart
    let req = student.attach(test::TestRequest::get().uri("/bonafide_form")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    student.update(&resp);
    let token = csrf_token(std::str::from_utf8(&test::read_body(resp).await).unwrap());

    let boundary = "----shalaboundary";
    let body = multipart_body(
        boundary,
        &[
            ("csrf_token", token.as_str()),
            ("student_name", "Asha Patil"),
            ("academic_year", "2024-25"),
            ("class_standard", "8"),
            ("division", "A"),
            ("conduct", "Good"),
            ("caste", "Maratha"),
            ("birth_date", "2011-06-15"),
            ("birth_place", "Pune"),
            ("school_place", "Shirur"),
        ],
        &[],
    );
    let req = student
        .attach(test::TestRequest::post().uri("/bonafide_form"))
        .insert_header((
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let success = location(&resp);
    assert!(success.starts_with("/form_success/bonafide/"), "{success}");
    student.update(&resp);

    let id: i64 = success.rsplit('/').next().unwrap().parse().unwrap();
    let stored = env.repo.find_submission(FormType::Bonafide, id).await.unwrap().unwrap();
    assert_eq!(stored.status, Status::Pending);

    let req = student.attach(test::TestRequest::get().uri(&success)).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains("Asha Patil"));

    // Admin approves
    let mut admin = Jar::default();
    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    admin.update(&resp);
    let token = csrf_token(std::str::from_utf8(&test::read_body(resp).await).unwrap());
    let form = serde_urlencoded::to_string([
        ("username", ADMIN_USER),
        ("password", ADMIN_PASS),
        ("csrf_token", token.as_str()),
    ])
    .unwrap();
    let req = admin
        .attach(test::TestRequest::post().uri("/login"))
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(location(&resp), "/admin_dashboard");
    admin.update(&resp);

    let req = admin.attach(test::TestRequest::get().uri("/admin/forms/bonafide")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    admin.update(&resp);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains("Asha Patil"));
    assert!(page.contains("STU001"));
    let token = csrf_token(&page);

    let form = serde_urlencoded::to_string([("status", "approved"), ("csrf_token", token.as_str())])
        .unwrap();
    let req = admin
        .attach(test::TestRequest::post().uri(&format!("/admin/form/bonafide/{id}/update_status")))
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/admin/forms/bonafide");

    let stored = env.repo.find_submission(FormType::Bonafide, id).await.unwrap().unwrap();
    assert_eq!(stored.status, Status::Approved);
}

#[actix_rt::test]
async fn test_student_cannot_open_admin_list() {
    let env = setup();
    let asha = register_student(&env.repo, "asha", "Asha Patil").await;
    register_student(&env.repo, "ravi", "Ravi Kale").await;
    submission::submit(
        &env.repo,
        &env.uploads,
        &principal(&asha),
        FormType::Bonafide,
        bonafide_input("Asha Patil"),
    )
    .await
    .unwrap();
    let app = test_app!(env);
    let mut ravi = Jar::default();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    ravi.update(&resp);
    let token = csrf_token(std::str::from_utf8(&test::read_body(resp).await).unwrap());
    let form = serde_urlencoded::to_string([
        ("username", "ravi"),
        ("password", STUDENT_PASS),
        ("csrf_token", token.as_str()),
    ])
    .unwrap();
    let req = ravi
        .attach(test::TestRequest::post().uri("/login"))
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    ravi.update(&resp);

    let req = ravi.attach(test::TestRequest::get().uri("/admin/forms/bonafide")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&resp), "/student_dashboard");
    ravi.update(&resp);
    let body = test::read_body(resp).await;
    assert!(!std::str::from_utf8(&body).unwrap().contains("Asha Patil"));

    let req = ravi.attach(test::TestRequest::get().uri("/student_dashboard")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page = String::from_utf8(test::read_body(resp).await.to_vec()).unwrap();
    assert!(page.contains("Access denied"));
    assert!(!page.contains("Asha Patil"));

    // Nor someone else's certificate
    let req = ravi.attach(test::TestRequest::get().uri("/bonafide_certificate/1")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
}

#[actix_rt::test]
async fn test_upload_paths_must_be_plain_names() {
    let env = setup();
    register_student(&env.repo, "asha", "Asha Patil").await;
    std::fs::write(env.dir.path().join("secret.txt"), b"secret").unwrap();
    let app = test_app!(env);
    let mut jar = Jar::default();

    let resp = test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
    jar.update(&resp);
    let token = csrf_token(std::str::from_utf8(&test::read_body(resp).await).unwrap());
    let form = serde_urlencoded::to_string([
        ("username", "asha"),
        ("password", STUDENT_PASS),
        ("csrf_token", token.as_str()),
    ])
    .unwrap();
    let req = jar
        .attach(test::TestRequest::post().uri("/login"))
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    jar.update(&resp);

    let req = jar.attach(test::TestRequest::get().uri("/uploads/..%2Fsecret.txt")).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    std::fs::write(env.uploads.dir().join("20240101_000000_photo.png"), b"png").unwrap();
    let req = jar
        .attach(test::TestRequest::get().uri("/uploads/20240101_000000_photo.png"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}
