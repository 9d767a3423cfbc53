use chrono::Utc;
use scout_calendar::{CalendarError, CalendarSource, GoogleCalendar, ScanWindow, UserCredentials};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(server: &MockServer, refresh_token: Option<&str>) -> UserCredentials {
    UserCredentials {
        token: "stale".to_string(),
        refresh_token: refresh_token.map(String::from),
        token_uri: format!("{}/token", server.uri()),
        client_id: "cid".to_string(),
        client_secret: Some("secret".to_string()),
        scopes: vec!["https://www.googleapis.com/auth/calendar.readonly".to_string()],
        expiry: None,
        extra: Default::default(),
    }
}

fn window() -> ScanWindow {
    ScanWindow::ahead(Utc::now(), 24, 48, 10)
}

#[tokio::test]
async fn refreshes_on_401_and_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "fresh",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header("authorization", "Bearer fresh"))
        .and(query_param("singleEvents", "true"))
        .and(query_param("orderBy", "startTime"))
        .and(query_param("maxResults", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "items": [{
                "id": "ev1",
                "summary": "Intro call",
                "start": { "dateTime": "2026-03-02T15:00:00Z" },
                "attendees": [{ "email": "cto@acme.com" }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let calendar = GoogleCalendar::with_events_url(format!("{}/events", server.uri()));
    let mut creds = credentials(&server, Some("r1"));
    let events = calendar
        .upcoming_events(&mut creds, &window())
        .await
        .expect("events after refresh");

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].summary, "Intro call");
    assert_eq!(events[0].attendees, vec!["cto@acme.com"]);
    assert_eq!(creds.token, "fresh");
    assert!(creds.expiry.is_some());
    assert_eq!(creds.refresh_token.as_deref(), Some("r1"));
}

#[tokio::test]
async fn missing_refresh_token_reports_auth_expired() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let calendar = GoogleCalendar::with_events_url(format!("{}/events", server.uri()));
    let mut creds = credentials(&server, None);
    let err = calendar
        .upcoming_events(&mut creds, &window())
        .await
        .unwrap_err();
    assert!(matches!(err, CalendarError::AuthExpired));
    assert_eq!(creds.token, "stale");
}

#[tokio::test]
async fn server_errors_surface_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/events"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let calendar = GoogleCalendar::with_events_url(format!("{}/events", server.uri()));
    let mut creds = credentials(&server, Some("r1"));
    match calendar.upcoming_events(&mut creds, &window()).await {
        Err(CalendarError::Api { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "unavailable");
        }
        other => panic!("expected API error, got {other:?}"),
    }
}
