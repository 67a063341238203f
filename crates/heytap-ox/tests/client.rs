use std::collections::BTreeMap;

use heytap_ox::{
    App, BatchCommand, BatchSession, BatchSpec, Heytap, HeytapRequestError, PricePolicy,
    SessionStep, SlotRequest, SlotTemplate, report::registry_income_with, sign::sign_request,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string_contains, header, method, path, query_param},
};

const CLIENT_SECRET: &str = "test-secret";

fn test_client(server: &MockServer) -> Heytap {
    Heytap::builder()
        .client_id("test-client")
        .client_secret(CLIENT_SECRET)
        .media_id("30001")
        .base_url(server.uri())
        .build()
}

async fn mount_token(server: &MockServer, expire_in: i64, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/oauth2/v1/token"))
        .and(query_param("grant_type", "client_credentials"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "success",
            "data": {"access_token": "tok-1", "expire_in": expire_in}
        })))
        .expect(expected_calls)
        .mount(server)
        .await;
}

async fn mount_create_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/union/v1/order/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "success",
            "data": {"posId": "9001"}
        })))
        .mount(server)
        .await;
}

fn native_fixed_request(index: u32) -> SlotRequest {
    SlotRequest {
        pos_name: format!("MyApp-Banner-5-{index}"),
        config: SlotTemplate::native_fixed().config,
        target_price: Some(5),
    }
}

#[tokio::test]
async fn create_signs_exactly_what_it_sends() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    mount_create_success(&server).await;

    let client = test_client(&server);
    let envelope = client
        .create_ad_slot(&native_fixed_request(1))
        .await
        .expect("create should not error");
    assert!(envelope.is_success());
    assert_eq!(envelope.pos_id().as_deref(), Some("9001"));

    let requests = server.received_requests().await.expect("recording enabled");
    let create = requests
        .iter()
        .find(|r| r.url.path() == "/union/v1/order/create")
        .expect("create request recorded");

    // The form body is sorted by key and carries no empty values.
    let body = String::from_utf8(create.body.clone()).expect("form body is utf-8");
    assert!(body.starts_with("adMultiDevCrtTypes="));
    assert!(!body.contains("videoPlayDirection"));
    assert!(!body.contains("biddingPattern"));
    assert!(!body.contains("=&"));
    assert!(!body.ends_with('='));

    // Recomputing the signature over the transmitted params must reproduce
    // the X-Api-Sign header, proving signed set == sent set.
    let params: BTreeMap<String, String> = url::form_urlencoded::parse(&create.body)
        .into_owned()
        .collect();
    let header = |name: &str| {
        create
            .headers
            .get(name)
            .expect(name)
            .to_str()
            .expect("ascii header")
            .to_string()
    };
    assert_eq!(header("Authorization"), "tok-1");
    let expected = sign_request(
        CLIENT_SECRET,
        &header("Authorization"),
        &header("X-Client-Send-Utc-Ms"),
        &header("X-Nonce"),
        &params,
    );
    assert_eq!(header("X-Api-Sign"), expected);
}

#[tokio::test]
async fn token_is_reused_within_its_validity_window() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    mount_create_success(&server).await;

    let client = test_client(&server);
    client.create_ad_slot(&native_fixed_request(1)).await.expect("first call");
    client.create_ad_slot(&native_fixed_request(2)).await.expect("second call");

    // The .expect(1) on the token mock verifies exactly one token request
    // was made for the two operations.
    let requests = server.received_requests().await.expect("recording enabled");
    let creates: Vec<_> = requests
        .iter()
        .filter(|r| r.url.path() == "/union/v1/order/create")
        .collect();
    assert_eq!(creates.len(), 2);
    for create in creates {
        assert_eq!(create.headers.get("Authorization").unwrap(), "tok-1");
    }
}

#[tokio::test]
async fn expired_token_is_reacquired() {
    let server = MockServer::start().await;
    // expire_in equal to the 300s safety margin leaves a zero-width validity
    // window, so every call has to fetch a fresh token.
    mount_token(&server, 300, 2).await;
    mount_create_success(&server).await;

    let client = test_client(&server);
    client.create_ad_slot(&native_fixed_request(1)).await.expect("first call");
    client.create_ad_slot(&native_fixed_request(2)).await.expect("second call");
}

#[tokio::test]
async fn rejected_credentials_surface_the_platform_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/oauth2/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1001,
            "message": "invalid client"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .create_ad_slot(&native_fixed_request(1))
        .await
        .expect_err("auth failure must abort the operation");
    match err {
        HeytapRequestError::Auth { message } => assert_eq!(message, "invalid client"),
        other => panic!("expected Auth error, got {other:?}"),
    }
}

#[tokio::test]
async fn batch_continues_past_a_failed_item() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    // Item 3 fails; mounted before the catch-all success mock so it wins.
    Mock::given(method("POST"))
        .and(path("/union/v1/order/create"))
        .and(body_string_contains("MyApp-Banner-5-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 500001,
            "message": "pos name already exists"
        })))
        .mount(&server)
        .await;
    mount_create_success(&server).await;

    let client = test_client(&server);
    let spec = BatchSpec::builder()
        .template(SlotTemplate::native_fixed())
        .app_name("MyApp")
        .base_name("Banner")
        .price(PricePolicy::Fixed(5))
        .count(5)
        .build();

    let report = client.create_batch(&spec).await.expect("batch runs");
    assert_eq!(report.total(), 5);
    assert_eq!(report.success_count, 4);

    let failed = &report.outcomes[2];
    assert!(!failed.success);
    assert_eq!(failed.pos_name, "MyApp-Banner-5-3");
    assert_eq!(failed.error.as_deref(), Some("pos name already exists"));
    assert_eq!(failed.response.code, 500001);

    for (i, outcome) in report.outcomes.iter().enumerate() {
        if i != 2 {
            assert!(outcome.success);
            assert_eq!(outcome.pos_id.as_deref(), Some("9001"));
        }
    }
}

#[tokio::test]
async fn zero_count_is_rejected_before_any_network_call() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    let spec = BatchSpec::builder()
        .template(SlotTemplate::native_fixed())
        .app_name("MyApp")
        .base_name("Banner")
        .price(PricePolicy::Fixed(5))
        .count(0)
        .build();

    let err = client.create_batch(&spec).await.expect_err("invalid count");
    assert!(matches!(err, HeytapRequestError::Validation(_)));
    assert!(server.received_requests().await.expect("recording enabled").is_empty());
}

#[tokio::test]
async fn fixed_price_on_a_bidding_template_is_rejected() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    let spec = BatchSpec::builder()
        .template(SlotTemplate::native_bidding())
        .app_name("MyApp")
        .base_name("Banner")
        .price(PricePolicy::Fixed(5))
        .count(1)
        .build();

    let err = client.create_batch(&spec).await.expect_err("mismatched policy");
    assert!(matches!(err, HeytapRequestError::Validation(_)));
}

#[tokio::test]
async fn session_accumulates_until_stop() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    mount_create_success(&server).await;

    let client = test_client(&server);
    let mut session = BatchSession::new();

    let spec = BatchSpec::builder()
        .template(SlotTemplate::rewarded_bidding())
        .app_name("MyApp")
        .base_name("Video")
        .price(PricePolicy::Bidding)
        .count(2)
        .build();

    match session.run(&client, BatchCommand::Create(spec.clone())).await.expect("batch") {
        SessionStep::Report(report) => assert_eq!(report.success_count, 2),
        SessionStep::Finished(_) => panic!("create must not finish the session"),
    }
    match session.run(&client, BatchCommand::Create(spec)).await.expect("batch") {
        SessionStep::Report(report) => assert_eq!(report.success_count, 2),
        SessionStep::Finished(_) => panic!("create must not finish the session"),
    }

    match session.run(&client, BatchCommand::Stop).await.expect("stop") {
        SessionStep::Finished(created) => {
            assert_eq!(created.len(), 4);
            assert_eq!(created[0].pos_name, "MyApp-Video-激励-bidding-1");
        }
        SessionStep::Report(_) => panic!("stop must finish the session"),
    }
    assert!(session.created().is_empty());
}

#[tokio::test]
async fn media_status_maps_union_status_codes() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    Mock::given(method("POST"))
        .and(path("/union/v1/app/list"))
        .and(body_string_contains("searchingWord=MyApp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "success",
            "data": {"items": [
                {"mediaName": "MyApp", "unionStatus": 4},
                {"mediaName": "MyApp Lite", "unionStatus": 2},
                {"mediaName": "MyApp Pro", "unionStatus": 7},
            ]}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = client.query_media_status("MyApp").await.expect("query");
    assert!(query.envelope.is_success());
    assert_eq!(query.reports.len(), 3);
    assert!(query.reports[0].status.is_frozen());
    assert_eq!(query.reports[1].status, heytap_ox::MediaStatus::Normal);
    assert_eq!(query.reports[2].status, heytap_ox::MediaStatus::Unknown);
}

#[tokio::test]
async fn media_status_transport_failure_is_a_uniform_envelope() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    // No app/list route mounted: the non-JSON 404 becomes a code -1
    // envelope, the same shape every other operation reports.
    let client = test_client(&server);

    let query = client.query_media_status("MyApp").await.expect("no error raised");
    assert_eq!(query.envelope.code, -1);
    assert!(!query.envelope.is_success());
    assert!(query.reports.is_empty());
}

#[tokio::test]
async fn media_status_platform_error_keeps_its_envelope() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    Mock::given(method("POST"))
        .and(path("/union/v1/app/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 2001,
            "message": "permission denied"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = client.query_media_status("MyApp").await.expect("no error raised");
    assert_eq!(query.envelope.code, 2001);
    assert_eq!(query.envelope.message.as_deref(), Some("permission denied"));
    assert!(query.reports.is_empty());
}

#[tokio::test]
async fn transport_failure_becomes_a_uniform_failure_envelope() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    // No income route mounted: the 404 has no JSON envelope, so the client
    // synthesizes a code -1 result instead of erroring.
    let client = test_client(&server);

    let query = client.query_income(1).await.expect("no error raised");
    assert_eq!(query.envelope.code, -1);
    assert!(!query.envelope.is_success());
    assert!(query.rows().is_empty());
    // date is the resolved YYYY-MM-DD for yesterday
    assert_eq!(query.date.len(), 10);
    assert_eq!(query.date.matches('-').count(), 2);
}

#[tokio::test]
async fn income_query_requests_the_offset_day() {
    let server = MockServer::start().await;
    mount_token(&server, 3600, 1).await;
    Mock::given(method("POST"))
        .and(path("/union/api/report/appQuery"))
        .and(body_string_contains("timeGranularity=day"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "success",
            "data": [
                {"appName": "MyApp", "biddingType": 2, "income": "10.5", "ecpm": "25.4"},
                {"appName": "MyApp", "biddingType": 1, "income": "99"},
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = client.query_income(1).await.expect("query");
    assert!(query.envelope.is_success());
    assert_eq!(query.rows().len(), 2);

    let requests = server.received_requests().await.expect("recording enabled");
    let income = requests
        .iter()
        .find(|r| r.url.path() == "/union/api/report/appQuery")
        .expect("income request recorded");
    let body = String::from_utf8(income.body.clone()).expect("utf-8");
    // startTime and endTime are the same YYYYMMDD day.
    let start = body
        .split('&')
        .find_map(|kv| kv.strip_prefix("startTime="))
        .expect("startTime sent");
    let end = body
        .split('&')
        .find_map(|kv| kv.strip_prefix("endTime="))
        .expect("endTime sent");
    assert_eq!(start, end);
    assert_eq!(start.len(), 8);
}

fn registry_app(name: &str, company: &str, client_id: &str) -> App {
    App::builder()
        .app_name(name)
        .company(company)
        .client_id(client_id)
        .client_secret(CLIENT_SECRET)
        .media_id("30001")
        .build()
}

async fn mount_company_token(server: &MockServer, client_id: &str, token: &str) {
    Mock::given(method("GET"))
        .and(path("/oauth2/v1/token"))
        .and(query_param("client_id", client_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "success",
            "data": {"access_token": token, "expire_in": 3600}
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn registry_income_queries_once_per_company() {
    let server = MockServer::start().await;
    mount_company_token(&server, "id-acme", "tok-acme").await;
    mount_company_token(&server, "id-globex", "tok-globex").await;

    // Each company answers with its own rows, matched by access token.
    Mock::given(method("POST"))
        .and(path("/union/api/report/appQuery"))
        .and(header("Authorization", "tok-acme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": [
                {"appName": "A", "biddingType": 2, "income": "10"},
                {"appName": "B", "biddingType": null, "income": "2.5"},
                {"appName": "X", "biddingType": 2, "income": "100"},
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/union/api/report/appQuery"))
        .and(header("Authorization", "tok-globex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "data": [
                {"appName": "C", "biddingType": 2, "income": "4"},
                {"appName": "A", "biddingType": 1, "income": "50"},
            ]
        })))
        .mount(&server)
        .await;

    // Two Acme apps share one credential set; only one query goes out for
    // them. App "X" earns revenue but is not registered, so it is dropped.
    let apps = vec![
        registry_app("A", "Acme", "id-acme"),
        registry_app("B", "Acme", "id-acme"),
        registry_app("C", "Globex", "id-globex"),
    ];

    let (summary, date) =
        registry_income_with(&apps, 1, |app| Heytap::for_app_at(app, server.uri()))
            .await
            .expect("registry query");

    assert!((summary.total - 16.5).abs() < f64::EPSILON);
    assert_eq!(summary.lines.len(), 3);
    assert_eq!(date.len(), 10);

    let requests = server.received_requests().await.expect("recording enabled");
    let income_calls = requests
        .iter()
        .filter(|r| r.url.path() == "/union/api/report/appQuery")
        .count();
    assert_eq!(income_calls, 2);
}

#[tokio::test]
async fn registry_income_skips_failed_company_queries() {
    let server = MockServer::start().await;
    mount_company_token(&server, "id-acme", "tok-acme").await;
    mount_company_token(&server, "id-globex", "tok-globex").await;
    // No income route mounted: both company queries come back as transport
    // failure envelopes and contribute nothing, without aborting.
    let apps = vec![
        registry_app("A", "Acme", "id-acme"),
        registry_app("C", "Globex", "id-globex"),
    ];

    let (summary, _date) =
        registry_income_with(&apps, 1, |app| Heytap::for_app_at(app, server.uri()))
            .await
            .expect("failed queries must not abort the sweep");

    assert!(summary.lines.is_empty());
    assert!(summary.total.abs() < f64::EPSILON);
}
