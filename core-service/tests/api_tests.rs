//! Typed API handles against a scripted backend.

use async_trait::async_trait;
use bridge_desktop::{LoggingNavigator, MemoryKeyValueStore};
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::platform::Notifier;
use bridge_traits::storage::KeyValueStore;
use core_request::RequestError;
use core_runtime::config::CoreConfig;
use core_runtime::events::{AuthEvent, CoreEvent};
use core_service::{CoreError, CoreService, QuestionQuery, RegisterForm};
use mockall::mock;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const BASE: &str = "http://127.0.0.1:8000/api/";

mock! {
    Toast {}

    impl Notifier for Toast {
        fn notify(&self, message: &str);
    }
}

/// Answers by `(method, path)`; anything unscripted is a 404.
struct Backend {
    routes: Vec<(HttpMethod, &'static str, u16, &'static str)>,
    calls: Mutex<Vec<HttpRequest>>,
}

impl Backend {
    fn new(routes: Vec<(HttpMethod, &'static str, u16, &'static str)>) -> Arc<Self> {
        Arc::new(Self {
            routes,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    fn only_call(&self) -> HttpRequest {
        let calls = self.calls();
        assert_eq!(calls.len(), 1, "expected exactly one call");
        calls.into_iter().next().unwrap()
    }
}

fn path_of(url: &str) -> &str {
    let rest = url.strip_prefix(BASE).unwrap_or(url);
    rest.split('?').next().unwrap_or(rest)
}

fn json_body(request: &HttpRequest) -> Value {
    serde_json::from_slice(request.body.as_deref().expect("request has a body")).unwrap()
}

#[async_trait]
impl HttpClient for Backend {
    async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
        let path = path_of(&request.url).to_string();
        let method = request.method;
        self.calls.lock().unwrap().push(request);

        let response = self
            .routes
            .iter()
            .find(|(m, p, _, _)| *m == method && *p == path)
            .map(|(_, _, status, body)| HttpResponse::new(*status, *body))
            .unwrap_or_else(|| HttpResponse::new(404, r#"{"detail": "Not found."}"#));
        Ok(response)
    }
}

fn quiet() -> MockToast {
    let mut toast = MockToast::new();
    toast.expect_notify().times(0).return_const(());
    toast
}

async fn service(
    backend: Arc<Backend>,
    toast: MockToast,
    tokens: &[(&str, &str)],
) -> (CoreService, Arc<MemoryKeyValueStore>) {
    let store = Arc::new(MemoryKeyValueStore::new());
    for (key, value) in tokens {
        store.set(key, value).await.unwrap();
    }

    let config = CoreConfig::builder()
        .base_url(BASE)
        .http_client(backend)
        .credential_storage(store.clone())
        .notifier(Arc::new(toast))
        .login_navigator(Arc::new(LoggingNavigator))
        .build()
        .unwrap();

    (CoreService::new(config).unwrap(), store)
}

fn logged_in() -> [(&'static str, &'static str); 2] {
    [("access_token", "A1"), ("refresh_token", "R1")]
}

#[tokio::test]
async fn login_persists_tokens_and_announces_sign_in() {
    let backend = Backend::new(vec![(
        HttpMethod::Post,
        "auth/token/",
        200,
        r#"{"access": "A1", "refresh": "R1"}"#,
    )]);
    let (core, store) = service(backend.clone(), quiet(), &[]).await;
    let mut events = core.events();

    core.auth().login("alice", "pw").await.unwrap();

    let call = backend.only_call();
    assert_eq!(call.authorization(), None);
    assert_eq!(json_body(&call), json!({"username": "alice", "password": "pw"}));
    assert_eq!(store.get("access_token").await.unwrap().as_deref(), Some("A1"));
    assert_eq!(store.get("refresh_token").await.unwrap().as_deref(), Some("R1"));
    assert!(core.auth().is_logged_in().await);

    let event = events.try_recv().unwrap().unwrap();
    assert_eq!(
        event,
        CoreEvent::Auth(AuthEvent::SignedIn {
            username: Some("alice".to_string())
        })
    );
}

#[tokio::test]
async fn login_rejection_reports_server_message_without_touching_the_session() {
    let backend = Backend::new(vec![(
        HttpMethod::Post,
        "auth/token/",
        401,
        r#"{"error": "用户名或密码错误"}"#,
    )]);
    let mut toast = MockToast::new();
    toast
        .expect_notify()
        .withf(|message| message == "用户名或密码错误")
        .times(1)
        .return_const(());
    let (core, store) = service(backend.clone(), toast, &[]).await;

    let err = core.auth().login("alice", "wrong").await.unwrap_err();

    match err {
        CoreError::Request(RequestError::RequestFailed { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "用户名或密码错误");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(backend.calls().len(), 1);
    assert!(store.is_empty().await);
    assert!(!core.auth().is_logged_in().await);
}

#[tokio::test]
async fn login_response_without_access_token_is_rejected() {
    let backend = Backend::new(vec![(
        HttpMethod::Post,
        "auth/token/",
        200,
        r#"{"refresh": "R1"}"#,
    )]);
    let (core, store) = service(backend, quiet(), &[]).await;

    let err = core.auth().login("alice", "pw").await.unwrap_err();

    assert!(matches!(err, CoreError::InvalidResponse(_)));
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn register_is_sent_anonymously() {
    let backend = Backend::new(vec![(
        HttpMethod::Post,
        "auth/register/",
        201,
        r#"{"username": "bob"}"#,
    )]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;

    let body = core
        .auth()
        .register(&RegisterForm::new("bob", "bob@example.com", "pw12345!"))
        .await
        .unwrap();

    assert_eq!(body, json!({"username": "bob"}));
    let call = backend.only_call();
    assert_eq!(call.authorization(), None);
    assert_eq!(json_body(&call)["password_confirm"], json!("pw12345!"));
}

#[tokio::test]
async fn logout_clears_the_session_even_when_the_server_fails() {
    let backend = Backend::new(vec![(
        HttpMethod::Post,
        "auth/logout/",
        500,
        r#"{"error": "boom"}"#,
    )]);
    let mut toast = MockToast::new();
    toast.expect_notify().times(1).return_const(());
    let (core, store) = service(backend.clone(), toast, &logged_in()).await;
    store.set("user", r#"{"username": "alice"}"#).await.unwrap();
    let mut events = core
        .events()
        .filter(|event| matches!(event, CoreEvent::Auth(_)));

    core.auth().logout().await.unwrap();

    assert_eq!(backend.only_call().authorization(), Some("Bearer A1"));
    assert!(store.is_empty().await);
    assert_eq!(
        events.try_recv().unwrap().unwrap(),
        CoreEvent::Auth(AuthEvent::SignedOut)
    );
}

#[tokio::test]
async fn logout_when_signed_out_skips_the_server() {
    let backend = Backend::new(vec![]);
    let (core, _) = service(backend.clone(), quiet(), &[]).await;

    core.auth().logout().await.unwrap();

    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn profile_is_fetched_with_bearer_and_cached() {
    let backend = Backend::new(vec![(
        HttpMethod::Get,
        "auth/profile/",
        200,
        r#"{"username": "alice", "email": "a@example.com"}"#,
    )]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;

    let profile = core.auth().profile().await.unwrap();

    assert_eq!(backend.only_call().authorization(), Some("Bearer A1"));
    assert_eq!(core.auth().current_user().await.unwrap(), Some(profile));
}

#[tokio::test]
async fn change_password_sends_confirmation() {
    let backend = Backend::new(vec![(
        HttpMethod::Post,
        "auth/change-password/",
        200,
        r#"{"message": "ok"}"#,
    )]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;

    core.auth().change_password("old", "new-pw").await.unwrap();

    assert_eq!(
        json_body(&backend.only_call()),
        json!({
            "old_password": "old",
            "new_password": "new-pw",
            "new_password_confirm": "new-pw"
        })
    );
}

#[tokio::test]
async fn question_filters_become_query_parameters() {
    let backend = Backend::new(vec![(
        HttpMethod::Get,
        "questions/questions/",
        200,
        r#"{"count": 0, "results": []}"#,
    )]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;

    let page = core
        .questions()
        .list(&QuestionQuery::page(2).with_subject(3))
        .await
        .unwrap();

    assert_eq!(page["count"], json!(0));
    let call = backend.only_call();
    assert!(call.url.contains("page=2"), "{}", call.url);
    assert!(call.url.contains("subject=3"), "{}", call.url);
    assert!(!call.url.contains("search"));
    assert!(call.body.is_none());
}

#[tokio::test]
async fn question_crud_targets_detail_paths() {
    let backend = Backend::new(vec![
        (HttpMethod::Get, "questions/questions/9/", 200, r#"{"id": 9}"#),
        (HttpMethod::Post, "questions/questions/", 201, r#"{"id": 10}"#),
        (HttpMethod::Put, "questions/questions/9/", 200, r#"{"id": 9, "title": "t"}"#),
        (HttpMethod::Delete, "questions/questions/9/", 204, ""),
    ]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;
    let questions = core.questions();

    assert_eq!(questions.get(9).await.unwrap(), json!({"id": 9}));
    assert_eq!(
        questions.create(json!({"title": "new"})).await.unwrap(),
        json!({"id": 10})
    );
    questions.update(9, json!({"title": "t"})).await.unwrap();
    questions.delete(9).await.unwrap();

    let methods: Vec<HttpMethod> = backend.calls().iter().map(|c| c.method).collect();
    assert_eq!(
        methods,
        vec![
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete
        ]
    );
}

#[tokio::test]
async fn missing_question_surfaces_not_found() {
    let backend = Backend::new(vec![]);
    let mut toast = MockToast::new();
    toast
        .expect_notify()
        .withf(|message| message == "Not found.")
        .times(1)
        .return_const(());
    let (core, _) = service(backend, toast, &logged_in()).await;

    let err = core.questions().get(404).await.unwrap_err();

    assert!(matches!(
        err,
        CoreError::Request(RequestError::RequestFailed { status: 404, .. })
    ));
}

#[tokio::test]
async fn answers_are_filtered_by_question() {
    let backend = Backend::new(vec![(HttpMethod::Get, "answers/answers/", 200, "[]")]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;

    core.answers().list_for_question(5).await.unwrap();

    assert!(backend.only_call().url.ends_with("answers/answers/?question_id=5"));
}

#[tokio::test]
async fn categories_list_and_detail() {
    let backend = Backend::new(vec![
        (HttpMethod::Get, "categories/categories/", 200, "[]"),
        (HttpMethod::Get, "categories/categories/2/", 200, r#"{"id": 2}"#),
    ]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;

    assert_eq!(core.categories().list().await.unwrap(), json!([]));
    assert_eq!(core.categories().get(2).await.unwrap(), json!({"id": 2}));
}

#[tokio::test]
async fn search_and_suggestions_use_their_query_keys() {
    let backend = Backend::new(vec![
        (HttpMethod::Get, "search/search-list/", 200, r#"{"results": []}"#),
        (HttpMethod::Get, "search/search-suggestions/", 200, r#"["algebra"]"#),
    ]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;

    core.search().search("alg", 1).await.unwrap();
    let suggestions = core.search().suggestions("alg").await.unwrap();

    assert_eq!(suggestions, json!(["algebra"]));
    let calls = backend.calls();
    assert!(calls[0].url.contains("query=alg"));
    assert!(calls[0].url.contains("page=1"));
    assert!(calls[1].url.ends_with("search/search-suggestions/?q=alg"));
}

#[tokio::test]
async fn category_writes_target_the_categories_collection() {
    let backend = Backend::new(vec![
        (HttpMethod::Post, "categories/categories/", 201, r#"{"id": 3}"#),
        (HttpMethod::Put, "categories/categories/3/", 200, r#"{"id": 3, "name": "Geometry"}"#),
        (HttpMethod::Delete, "categories/categories/3/", 204, ""),
    ]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;
    let categories = core.categories();

    let created = categories.create(json!({"name": "Algebra"})).await.unwrap();
    assert_eq!(created, json!({"id": 3}));
    categories.update(3, json!({"name": "Geometry"})).await.unwrap();
    categories.delete(3).await.unwrap();

    let calls = backend.calls();
    assert_eq!(json_body(&calls[0]), json!({"name": "Algebra"}));
    assert_eq!(calls[1].method, HttpMethod::Put);
    assert_eq!(calls[2].method, HttpMethod::Delete);
    assert!(calls[2].url.ends_with("categories/categories/3/"));
}

#[tokio::test]
async fn search_history_is_read_recorded_and_cleared() {
    let backend = Backend::new(vec![
        (HttpMethod::Get, "search/history/", 200, r#"[{"query": "alg"}]"#),
        (HttpMethod::Post, "search/search-history/", 200, r#"{"results": []}"#),
        (HttpMethod::Post, "search/history/clear/", 200, r#"{"deleted": 1}"#),
    ]);
    let (core, _) = service(backend.clone(), quiet(), &logged_in()).await;
    let search = core.search();

    assert_eq!(search.history().await.unwrap(), json!([{"query": "alg"}]));
    search.record_history("alg").await.unwrap();
    search.clear_history().await.unwrap();

    let calls = backend.calls();
    assert_eq!(calls[0].method, HttpMethod::Get);
    assert_eq!(calls[1].method, HttpMethod::Post);
    assert_eq!(json_body(&calls[1]), json!({"query": "alg"}));
    assert!(calls[2].url.ends_with("search/history/clear/"));
    assert!(calls.iter().all(|c| c.authorization() == Some("Bearer A1")));
}
