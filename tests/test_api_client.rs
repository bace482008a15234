use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use schedule_sync::api::{ApiClient, ApiError, Resource, ScheduleApi};
use schedule_sync::models::event_model::ScheduledEventRecord;
use schedule_sync::models::reference_model::Teacher;
use schedule_sync::models::{DateRange, EventQuery};
use schedule_sync::notify::{Level, Notifier};
use schedule_sync::session::{MemoryTokenStore, Navigator, Session, AUTH_FAILED_MESSAGE};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
pub struct TestNotifier {
    pub notices: Mutex<Vec<(String, Level)>>,
}

impl Notifier for TestNotifier {
    fn notify(&self, message: &str, level: Level) {
        self.notices
            .lock()
            .unwrap()
            .push((message.to_owned(), level));
    }
}

pub struct TestNavigator {
    pub visited: Arc<Mutex<Vec<String>>>,
}

impl Navigator for TestNavigator {
    fn redirect(&self, url: &str) {
        self.visited.lock().unwrap().push(url.to_owned());
    }
}

fn lesson_json(id: u32) -> serde_json::Value {
    json!({
        "id": id,
        "specific_date": "2024-05-01",
        "start_time": "09:00:00",
        "end_time": "10:30:00",
        "topic": "",
        "duration_minutes": 90,
        "group_course": {
            "id": 7,
            "group": {"id": 1, "name": "10A"},
            "course": {"id": 3, "subject": {"id": 4, "name": "Math"}}
        },
        "room": {"id": 5, "name": "101"},
        "schedule_plan": 3
    })
}

fn client_for(server: &MockServer, session: Session) -> ApiClient {
    ApiClient::with_http_client(
        reqwest::Client::new(),
        &format!("{}/api", server.uri()),
        Arc::new(session),
    )
    .unwrap()
}

fn may_week() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 4, 29).unwrap(),
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap(),
    )
}

#[tokio::test]
async fn list_events_unwraps_envelope_and_omits_absent_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scheduled-events/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "next": null,
            "previous": null,
            "results": [lesson_json(1), lesson_json(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Session::new(Arc::new(TestNotifier::default())));
    let mut query = EventQuery::for_range(&may_week());
    query.group = Some(1);
    let events = client.list_events(&query).await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].group_name(), Some("10A"));
    assert_eq!(events[1].id, 2);

    let requests = server.received_requests().await.unwrap();
    let pairs: Vec<(String, String)> = requests[0]
        .url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("start_date".to_owned(), "2024-04-29".to_owned()),
            ("end_date".to_owned(), "2024-05-06".to_owned()),
            ("group".to_owned(), "1".to_owned()),
        ]
    );
}

#[tokio::test]
async fn list_accepts_bare_array() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/teachers/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 2, "user": "Ivanova", "subsidiary": 1},
            {"id": 3, "user": null}
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server, Session::new(Arc::new(TestNotifier::default())));
    let teachers: Vec<Teacher> = client.list_teachers().await.unwrap();
    assert_eq!(teachers.len(), 2);
    assert_eq!(teachers[0].user.as_deref(), Some("Ivanova"));
    assert_eq!(teachers[1].user, None);
}

#[tokio::test]
async fn unauthorized_resets_session_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scheduled-events/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("token expired"))
        .mount(&server)
        .await;

    let notifier = Arc::new(TestNotifier::default());
    let visited = Arc::new(Mutex::new(Vec::new()));
    let session = Session::new(notifier.clone())
        .with_store(Box::new(MemoryTokenStore::with_token("stale")))
        .with_navigator(Box::new(TestNavigator {
            visited: visited.clone(),
        }));
    assert!(session.is_authenticated());
    let client = client_for(&server, session);

    let result = client.list_events(&EventQuery::for_range(&may_week())).await;

    assert_eq!(
        result,
        Err(ApiError::Auth {
            body: "token expired".to_owned()
        })
    );
    assert!(!client.session().is_authenticated());
    assert_eq!(
        *notifier.notices.lock().unwrap(),
        vec![(AUTH_FAILED_MESSAGE.to_owned(), Level::Error)]
    );
    assert_eq!(*visited.lock().unwrap(), vec!["/admin/login/".to_owned()]);
}

#[tokio::test]
async fn server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scheduled-events/9/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let notifier = Arc::new(TestNotifier::default());
    let client = client_for(&server, Session::new(notifier.clone()));
    let err = client.get_event(9).await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Http {
            status: 500,
            body: "boom".to_owned()
        }
    );
    assert_eq!(err.status(), Some(500));
    assert!(notifier.notices.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/rooms/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client_for(&server, Session::new(Arc::new(TestNotifier::default())));
    assert!(matches!(
        client.list_rooms().await,
        Err(ApiError::Decode { .. })
    ));
}

#[tokio::test]
async fn authenticate_stores_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/token/"))
        .and(body_json(json!({"username": "admin", "password": "secret"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "tok", "refresh": "r"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/groups/"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Session::new(Arc::new(TestNotifier::default())));
    client.authenticate("admin", "secret").await.unwrap();

    assert_eq!(client.session().token().as_deref(), Some("tok"));
    assert!(client.list_groups().await.unwrap().is_empty());
}

#[tokio::test]
async fn csrf_header_only_on_mutations() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/scheduled-events/1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lesson_json(1)))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/scheduled-events/1/"))
        .and(header("X-CSRFToken", "csrf123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lesson_json(1)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/scheduled-events/1/"))
        .and(header("X-CSRFToken", "csrf123"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let session = Session::new(Arc::new(TestNotifier::default()))
        .with_csrf_token(Some("csrf123".to_owned()));
    let client = client_for(&server, session);

    let record = client.get_event(1).await.unwrap();
    client.update_event(1, &record).await.unwrap();
    client.delete_event(1).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].headers.get("X-CSRFToken").is_none());
    let sent: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(sent["schedule_plan"], json!(3));
    assert_eq!(sent["room"]["name"], json!("101"));
}

#[test]
fn record_round_trips_unknown_fields() {
    let record: ScheduledEventRecord = serde_json::from_value(lesson_json(4)).unwrap();
    assert_eq!(record.extra.get("schedule_plan"), Some(&json!(3)));
    assert_eq!(serde_json::to_value(&record).unwrap(), lesson_json(4));
}

#[tokio::test]
async fn conflict_actions_hit_plan_routes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/schedule-plans/4/check_conflicts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conflicts_found": 1,
            "conflicts": [{"id": 8, "description": "Room 101 is double booked", "status": "new"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/check_conflicts/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "plan_id": 4,
            "plan_name": "Spring",
            "conflicts": [],
            "total_conflicts": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Session::new(Arc::new(TestNotifier::default())));
    let report = client.check_conflicts(4).await.unwrap();
    assert_eq!(report.conflicts_found, 1);
    assert_eq!(report.conflicts[0].id, 8);
    assert!(!report.conflicts[0].is_resolved());

    let active = client.check_active_plan_conflicts().await.unwrap();
    assert_eq!(active.plan_name, "Spring");
    assert!(active.conflicts.is_empty());
    assert_eq!(Resource::SchedulePlans.item_path(4), "schedule-plans/4/");
}

#[tokio::test]
async fn filter_options_loads_every_facet() {
    let server = MockServer::start().await;
    let lists = [
        ("/api/groups/", json!([{"id": 1, "name": "10A"}])),
        ("/api/teachers/", json!({"results": [{"id": 2, "user": "Ivanova"}]})),
        ("/api/subjects/", json!([{"id": 4, "name": "Math"}, {"id": 6, "name": "Art"}])),
        ("/api/rooms/", json!({"count": 0, "results": []})),
    ];
    for (route, body) in lists {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server, Session::new(Arc::new(TestNotifier::default())));
    let options = client.filter_options().await.unwrap();

    assert_eq!(options.groups[0].name, "10A");
    assert_eq!(options.teachers[0].id, 2);
    assert_eq!(options.subjects.len(), 2);
    assert!(options.rooms.is_empty());
}

#[tokio::test]
async fn list_follows_every_page() {
    let server = MockServer::start().await;
    let next = format!(
        "{}/api/scheduled-events/?end_date=2024-05-06&page=2&start_date=2024-04-29",
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/api/scheduled-events/"))
        .and(query_param_is_missing("page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "next": next,
            "previous": null,
            "results": [lesson_json(1), lesson_json(2)]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/scheduled-events/"))
        .and(query_param("page", "2"))
        .and(query_param("start_date", "2024-04-29"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "next": null,
            "previous": format!("{}/api/scheduled-events/", server.uri()),
            "results": [lesson_json(3)]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Session::new(Arc::new(TestNotifier::default())));
    let events = client
        .list_events(&EventQuery::for_range(&may_week()))
        .await
        .unwrap();

    let ids: Vec<u32> = events.iter().map(|event| event.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[test]
fn base_url_gains_trailing_slash() {
    let session = Arc::new(Session::new(Arc::new(TestNotifier::default())));
    let client =
        ApiClient::with_http_client(reqwest::Client::new(), "http://host/api/v1", session).unwrap();
    assert_eq!(client.base_url().as_str(), "http://host/api/v1/");
    assert_eq!(
        client.base_url().join(Resource::Rooms.path()).unwrap().as_str(),
        "http://host/api/v1/rooms/"
    );
}
