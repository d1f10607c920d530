use poem::{http::StatusCode, test::TestClient};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    core::test_utils::{generate_test_identity, init_test_app_state},
    init_openapi_route,
    settings::get_config,
};

async fn count_rows(pool: &PgPool, table: &str) -> anyhow::Result<i64> {
    let count: (i64,) = sqlx::query_as(format!("SELECT count(*) FROM {}", table).as_str())
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

#[sqlx::test]
async fn test_create_project_classifies_attachments(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let test_identity = generate_test_identity(&app_state, "maria@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));

    // When
    let resp = cli
        .post("/api/projects")
        .header("authorization", format!("Bearer {}", test_identity.token))
        .body_json(&json!({
            "title": "Cobertura eleitoral",
            "description": "Especial sobre o segundo turno",
            "pdfUrls": ["https://cdn.test/reportagem.pdf", "  "],
            "category": "VIDEO",
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(body["title"], "Cobertura eleitoral");
    assert_eq!(body["category"], "TEXT");
    assert_eq!(body["owner"]["id"], test_identity.identity.id.to_string());
    assert_eq!(body["owner"]["name"], "maria");
    let attachments = body["attachments"].as_array().unwrap();
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0]["url"], "https://cdn.test/reportagem.pdf");
    assert_eq!(attachments[0]["mediaType"], "PDF");
    assert_eq!(count_rows(&app_state.db, "public.project").await?, 1);
    assert_eq!(count_rows(&app_state.db, "public.attachment").await?, 1);
    Ok(())
}

#[sqlx::test]
async fn test_create_project_validation(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let test_identity = generate_test_identity(&app_state, "maria@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));

    for payload in [
        json!({ "title": "   ", "imageUrls": ["https://cdn.test/foto.jpg"] }),
        json!({ "imageUrls": ["https://cdn.test/foto.jpg"] }),
        json!({ "title": "Sem anexos" }),
        json!({ "title": "Listas vazias", "imageUrls": [], "pdfUrls": [""], "youtubeLinks": [] }),
    ] {
        // When
        let resp = cli
            .post("/api/projects")
            .header("authorization", format!("Bearer {}", test_identity.token))
            .body_json(&payload)
            .send()
            .await;

        // Expect
        resp.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = resp.json().await.value().deserialize();
        assert!(body["error"].is_string());
    }
    assert_eq!(count_rows(&app_state.db, "public.project").await?, 0);
    assert_eq!(count_rows(&app_state.db, "public.attachment").await?, 0);
    Ok(())
}

#[sqlx::test]
async fn test_create_project_requires_session(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let cli = TestClient::new(init_openapi_route(app_state.clone()));
    let payload = json!({ "title": "Pauta", "imageUrls": ["https://cdn.test/foto.jpg"] });

    // When
    let resp = cli.post("/api/projects").body_json(&payload).send().await;

    // Expect
    resp.assert_status(StatusCode::UNAUTHORIZED);
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert!(body["error"].is_string());
    assert_eq!(count_rows(&app_state.db, "public.project").await?, 0);
    Ok(())
}

#[sqlx::test]
async fn test_update_project_replaces_attachments(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let test_identity = generate_test_identity(&app_state, "maria@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));
    let resp = cli
        .post("/api/projects")
        .header("authorization", format!("Bearer {}", test_identity.token))
        .body_json(&json!({
            "title": "Cobertura eleitoral",
            "pdfUrls": ["https://cdn.test/reportagem.pdf"],
            "youtubeLinks": ["https://www.youtube.com/watch?v=abc123&t=1"],
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = resp.json().await.value().deserialize();
    let project_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["category"], "MULTIMEDIA");

    // When
    let resp = cli
        .put("/api/projects")
        .header("authorization", format!("Bearer {}", test_identity.token))
        .body_json(&json!({
            "id": project_id,
            "title": "Cobertura eleitoral (fotos)",
            "imageUrls": ["https://cdn.test/u1.jpg", "https://cdn.test/u2.jpg"],
        }))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let updated: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(updated["category"], "PHOTOS");
    assert_eq!(updated["createdAt"], created["createdAt"]);

    let resp = cli
        .get("/api/project-detail")
        .query("id", &project_id)
        .send()
        .await;
    resp.assert_status_is_ok();
    let detail: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(detail["project"]["title"], "Cobertura eleitoral (fotos)");
    let attachments: Vec<(&str, &str)> = detail["attachments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|x| (x["url"].as_str().unwrap(), x["mediaType"].as_str().unwrap()))
        .collect();
    assert_eq!(
        attachments,
        vec![
            ("https://cdn.test/u1.jpg", "PHOTO"),
            ("https://cdn.test/u2.jpg", "PHOTO")
        ]
    );
    assert_eq!(detail["project"]["imageUrls"].as_array().unwrap().len(), 2);
    assert_eq!(detail["project"]["pdfUrls"], json!([]));
    assert_eq!(count_rows(&app_state.db, "public.attachment").await?, 2);
    Ok(())
}

#[sqlx::test]
async fn test_update_project_errors(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let test_identity = generate_test_identity(&app_state, "maria@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));
    let auth = format!("Bearer {}", test_identity.token);

    // When unknown project
    let resp = cli
        .put("/api/projects")
        .header("authorization", &auth)
        .body_json(&json!({
            "id": Uuid::now_v7().to_string(),
            "title": "Pauta",
            "imageUrls": ["https://cdn.test/foto.jpg"],
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);

    // When malformed id
    let resp = cli
        .put("/api/projects")
        .header("authorization", &auth)
        .body_json(&json!({
            "id": "42",
            "title": "Pauta",
            "imageUrls": ["https://cdn.test/foto.jpg"],
        }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::BAD_REQUEST);

    // When attachments removed
    let resp = cli
        .put("/api/projects")
        .header("authorization", &auth)
        .body_json(&json!({ "id": Uuid::now_v7().to_string(), "title": "Pauta" }))
        .send()
        .await;

    // Expect validation before lookup
    resp.assert_status(StatusCode::BAD_REQUEST);
    Ok(())
}

#[sqlx::test]
async fn test_delete_project_removes_attachments(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let test_identity = generate_test_identity(&app_state, "maria@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));
    let auth = format!("Bearer {}", test_identity.token);
    let resp = cli
        .post("/api/projects")
        .header("authorization", &auth)
        .body_json(&json!({
            "title": "Ensaio",
            "imageUrls": ["https://cdn.test/a.jpg", "https://cdn.test/b.jpg"],
            "pdfUrls": ["https://cdn.test/c.pdf"],
        }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = resp.json().await.value().deserialize();
    let project_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(count_rows(&app_state.db, "public.attachment").await?, 3);

    // When
    let resp = cli
        .delete("/api/projects")
        .header("authorization", &auth)
        .body_json(&json!({ "id": project_id }))
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert!(body["message"].is_string());
    assert_eq!(count_rows(&app_state.db, "public.project").await?, 0);
    assert_eq!(count_rows(&app_state.db, "public.attachment").await?, 0);
    let resp = cli
        .get("/api/project-detail")
        .query("id", &project_id)
        .send()
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);

    // When deleted twice
    let resp = cli
        .delete("/api/projects")
        .header("authorization", &auth)
        .body_json(&json!({ "id": project_id }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::NOT_FOUND);
    Ok(())
}

#[sqlx::test]
async fn test_list_projects_filters(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let maria = generate_test_identity(&app_state, "maria@example.com").await?;
    let joao = generate_test_identity(&app_state, "joao@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));
    for (token, payload) in [
        (
            &maria.token,
            json!({ "title": "Ensaio fotográfico", "imageUrls": ["https://cdn.test/a.jpg"] }),
        ),
        (
            &joao.token,
            json!({
                "title": "Entrevista com MARIA Bethânia",
                "youtubeLinks": ["https://youtu.be/xyz789"],
            }),
        ),
        (
            &joao.token,
            json!({ "title": "Cobertura eleitoral", "pdfUrls": ["https://cdn.test/b.pdf"] }),
        ),
    ] {
        let resp = cli
            .post("/api/projects")
            .header("authorization", format!("Bearer {}", token))
            .body_json(&payload)
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);
    }

    // When unfiltered
    let resp = cli.get("/api/projects").send().await;

    // Expect newest first
    resp.assert_status_is_ok();
    let body: serde_json::Value = resp.json().await.value().deserialize();
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|x| x["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec![
            "Cobertura eleitoral",
            "Entrevista com MARIA Bethânia",
            "Ensaio fotográfico"
        ]
    );
    assert_eq!(body[0]["preview"]["kind"], "PDF");
    assert_eq!(
        body[1]["preview"]["url"],
        "https://img.youtube.com/vi/xyz789/mqdefault.jpg"
    );
    assert_eq!(body[2]["owner"]["name"], "maria");

    // When search by title or owner name
    let resp = cli
        .get("/api/projects")
        .query("search", &" Maria ")
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(body.as_array().unwrap().len(), 2);

    // When category filter
    let resp = cli.get("/api/projects").query("type", &"video").send().await;

    // Expect
    resp.assert_status_is_ok();
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["category"], "VIDEO");

    // When unknown category
    let resp = cli.get("/api/projects").query("type", &"BOGUS").send().await;

    // Expect filter ignored
    resp.assert_status_is_ok();
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(body.as_array().unwrap().len(), 3);

    // When both
    let resp = cli
        .get("/api/projects")
        .query("search", &"maria")
        .query("type", &"PHOTOS")
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Ensaio fotográfico");
    Ok(())
}

#[sqlx::test]
async fn test_ownership_enforced_when_enabled(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    config.enforce_project_ownership = true;
    let app_state = init_test_app_state(pool, config);
    let owner = generate_test_identity(&app_state, "owner@example.com").await?;
    let intruder = generate_test_identity(&app_state, "intruder@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));
    let resp = cli
        .post("/api/projects")
        .header("authorization", format!("Bearer {}", owner.token))
        .body_json(&json!({ "title": "Pauta", "imageUrls": ["https://cdn.test/a.jpg"] }))
        .send()
        .await;
    resp.assert_status(StatusCode::CREATED);
    let created: serde_json::Value = resp.json().await.value().deserialize();
    let project_id = created["id"].as_str().unwrap().to_string();

    // When
    let resp = cli
        .delete("/api/projects")
        .header("authorization", format!("Bearer {}", intruder.token))
        .body_json(&json!({ "id": project_id }))
        .send()
        .await;

    // Expect
    resp.assert_status(StatusCode::FORBIDDEN);
    assert_eq!(count_rows(&app_state.db, "public.project").await?, 1);
    Ok(())
}

#[sqlx::test]
async fn test_unsupported_verb(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let cli = TestClient::new(init_openapi_route(app_state));

    // When
    let resp = cli.patch("/api/projects").send().await;

    // Expect
    resp.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert!(body["error"].is_string());
    Ok(())
}

#[sqlx::test]
async fn test_list_projects_search_accented_uppercase(pool: PgPool) -> anyhow::Result<()> {
    // Given
    let mut config = get_config();
    config.prefix = Some("/api".to_string());
    let app_state = init_test_app_state(pool, config);
    let test_identity = generate_test_identity(&app_state, "redacao@example.com").await?;
    let cli = TestClient::new(init_openapi_route(app_state.clone()));
    for title in ["Entrevista com JOÃO", "Cobertura eleitoral"] {
        let resp = cli
            .post("/api/projects")
            .header("authorization", format!("Bearer {}", test_identity.token))
            .body_json(&json!({ "title": title, "imageUrls": ["https://cdn.test/a.jpg"] }))
            .send()
            .await;
        resp.assert_status(StatusCode::CREATED);
    }

    // When
    let resp = cli
        .get("/api/projects")
        .query("search", &"joão")
        .send()
        .await;

    // Expect
    resp.assert_status_is_ok();
    let body: serde_json::Value = resp.json().await.value().deserialize();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Entrevista com JOÃO");
    Ok(())
}
