use std::io::Write as _;

use activity_roster_backend::error::{AppError, ErrorDetail};
use activity_roster_backend::store::{Catalog, CatalogError, EnrollResult};
use activity_roster_config::Config;
use activity_roster_e2e::{request, test_config, Result, TestServer};
use hyper::header::{CONTENT_TYPE, LOCATION};
use hyper::{Method, StatusCode};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

#[tokio::test]
async fn chess_club_scenario() -> Result<()> {
    init_tracing();
    let server = TestServer::start(test_config()).await?;

    let response = server
        .request(Method::POST, "/activities/Chess%20Club/signup?email=new%40x.edu")
        .await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.json::<EnrollResult>()?.message,
        "Signed up new@x.edu for Chess Club"
    );
    let activities: Catalog = server.request(Method::GET, "/activities").await?.json()?;
    assert_eq!(activities.get("Chess Club").unwrap().participants.len(), 3);

    let response = server
        .request(
            Method::POST,
            "/activities/Chess%20Club/signup?email=michael@mergington.edu",
        )
        .await?;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response
        .json::<ErrorDetail>()?
        .detail
        .contains("already signed up"));

    let response = server
        .request(
            Method::DELETE,
            "/activities/Chess%20Club/unregister?email=michael@mergington.edu",
        )
        .await?;
    assert_eq!(response.status, StatusCode::OK);
    let activities: Catalog = server.request(Method::GET, "/activities").await?.json()?;
    let chess = activities.get("Chess Club").unwrap();
    assert_eq!(chess.participants.len(), 2);
    assert!(!chess.is_enrolled("michael@mergington.edu"));

    let response = server
        .request(
            Method::DELETE,
            "/activities/Chess%20Club/unregister?email=ghost@x.edu",
        )
        .await?;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response
        .json::<ErrorDetail>()?
        .detail
        .contains("not registered"));

    let response = server
        .request(Method::POST, "/activities/Ghost%20Club/signup?email=x@y.edu")
        .await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json::<ErrorDetail>()?.detail, "Activity not found");

    server.stop().await
}

#[tokio::test]
async fn activities_keep_catalog_order() -> Result<()> {
    let server = TestServer::start(test_config()).await?;

    let response = server.request(Method::GET, "/activities").await?;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.headers[CONTENT_TYPE], "application/json");
    let activities: Catalog = response.json()?;
    assert_eq!(activities, Catalog::mergington());
    assert_eq!(
        activities.names().collect::<Vec<_>>(),
        Catalog::mergington().names().collect::<Vec<_>>()
    );

    server.stop().await
}

#[tokio::test]
async fn root_redirects_to_frontend() -> Result<()> {
    let server = TestServer::start(test_config()).await?;

    let response = server.request(Method::GET, "/").await?;
    assert_eq!(response.status, StatusCode::TEMPORARY_REDIRECT);
    let location = response.headers[LOCATION].to_str()?.to_owned();
    assert_eq!(location, "/static/index.html");

    let page = server.request(Method::GET, &location).await?;
    assert_eq!(page.status, StatusCode::OK);
    assert!(page.text()?.contains("<title>Mergington High School Activities</title>"));

    let script = server.request(Method::GET, "/static/app.js").await?;
    assert_eq!(script.status, StatusCode::OK);
    assert_eq!(
        script.headers[CONTENT_TYPE],
        "application/javascript; charset=utf-8"
    );

    server.stop().await
}

#[tokio::test]
async fn concurrent_signups_admit_one() -> Result<()> {
    let server = TestServer::start(test_config()).await?;

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let address = server.address;
            tokio::spawn(async move {
                request(
                    address,
                    Method::POST,
                    "/activities/Drama%20Club/signup?email=race@mergington.edu",
                )
                .await
            })
        })
        .collect();

    let mut statuses = Vec::new();
    for task in tasks {
        statuses.push(task.await??.status);
    }
    assert_eq!(
        statuses.iter().filter(|&&status| status == StatusCode::OK).count(),
        1
    );
    assert_eq!(
        statuses
            .iter()
            .filter(|&&status| status == StatusCode::BAD_REQUEST)
            .count(),
        19
    );

    let activities: Catalog = server.request(Method::GET, "/activities").await?.json()?;
    assert_eq!(activities.get("Drama Club").unwrap().participants.len(), 3);

    server.stop().await
}

#[tokio::test]
async fn seed_file_replaces_catalog() -> Result<()> {
    let mut seed = tempfile::NamedTempFile::new()?;
    seed.write_all(
        br#"{
            "Robotics": {
                "description": "Build and program robots",
                "schedule": "Thursdays, 3:30 PM - 5:00 PM",
                "max_participants": 10,
                "participants": ["ada@mergington.edu"]
            },
            "Astronomy": {
                "description": "Stargazing nights",
                "schedule": "Fridays, 8:00 PM - 10:00 PM",
                "max_participants": 8,
                "participants": []
            }
        }"#,
    )?;

    let server = TestServer::start(Config {
        seed_file: Some(seed.path().to_owned()),
        ..test_config()
    })
    .await?;

    let activities: Catalog = server.request(Method::GET, "/activities").await?.json()?;
    assert_eq!(activities.names().collect::<Vec<_>>(), ["Robotics", "Astronomy"]);

    let response = server
        .request(Method::POST, "/activities/Chess%20Club/signup?email=a@x.edu")
        .await?;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = server
        .request(Method::POST, "/activities/Astronomy/signup?email=a@x.edu")
        .await?;
    assert_eq!(response.status, StatusCode::OK);

    server.stop().await
}

#[tokio::test]
async fn invalid_seed_file_fails_startup() -> Result<()> {
    let mut seed = tempfile::NamedTempFile::new()?;
    seed.write_all(
        br#"{"Robotics": {"description": "d", "schedule": "s", "max_participants": 0, "participants": []}}"#,
    )?;

    let result = TestServer::start(Config {
        seed_file: Some(seed.path().to_owned()),
        ..test_config()
    })
    .await;
    assert!(matches!(
        result,
        Err(AppError::Catalog(CatalogError::ZeroCapacity { .. }))
    ));
    Ok(())
}

#[tokio::test]
async fn stopped_server_refuses_connections() -> Result<()> {
    let server = TestServer::start(test_config()).await?;
    let address = server.address;
    assert_eq!(
        server.request(Method::GET, "/activities").await?.status,
        StatusCode::OK
    );

    server.stop().await?;
    assert!(request(address, Method::GET, "/activities").await.is_err());
    Ok(())
}
