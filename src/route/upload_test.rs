use std::sync::Arc;

use poem::{
    http::StatusCode,
    test::{TestClient, TestForm, TestFormField},
};
use sqlx::PgPool;

use crate::{
    core::test_utils::{
        generate_test_identity, init_test_app_state, init_test_app_state_with_gateway,
        FakeUploadGateway,
    },
    init_openapi_route,
    settings::get_config,
};

#[sqlx::test]
async fn test_upload_returns_permanent_url(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let test_identity = generate_test_identity(&app_state, "maria@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));

    // When
    let resp = cli
        .post("/api/upload")
        .header("authorization", format!("Bearer {}", test_identity.token))
        .multipart(
            TestForm::new().field(
                TestFormField::bytes(b"%PDF-1.4".to_vec())
                    .name("file")
                    .filename("pauta.pdf")
                    .content_type("application/pdf"),
            ),
        )
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(body["url"], "https://cdn.test/8/pauta.pdf");
    Ok(())
}

#[sqlx::test]
async fn test_upload_without_file(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let test_identity = generate_test_identity(&app_state, "maria@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));

    // When
    let resp = cli
        .post("/api/upload")
        .header("authorization", format!("Bearer {}", test_identity.token))
        .multipart(TestForm::new().field(TestFormField::text("nothing").name("note")))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_upload_gateway_failure(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state_with_gateway(
        pool,
        config,
        Arc::new(FakeUploadGateway { fail: true }),
    );
    let test_identity = generate_test_identity(&app_state, "maria@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));

    // When
    let resp = cli
        .post("/api/upload")
        .header("authorization", format!("Bearer {}", test_identity.token))
        .multipart(
            TestForm::new().field(
                TestFormField::bytes(b"\x89PNG".to_vec())
                    .name("file")
                    .filename("foto.png")
                    .content_type("image/png"),
            ),
        )
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(body["error"], "upload failed");
    Ok(())
}

#[sqlx::test]
async fn test_upload_requires_session(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let cli = TestClient::new(init_openapi_route(app_state));

    // When
    let resp = cli
        .post("/api/upload")
        .header("authorization", "Bearer not-a-session")
        .multipart(
            TestForm::new().field(
                TestFormField::bytes(b"data".to_vec())
                    .name("file")
                    .filename("a.txt"),
            ),
        )
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    Ok(())
}
