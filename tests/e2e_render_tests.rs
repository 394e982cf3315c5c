mod common;

use common::{test_wav_bytes, TestClient, TestServer};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::collections::HashSet;

#[tokio::test]
async fn default_render_produces_the_three_generic_variations() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let loop_id = client
        .create_loop_with_audio("renderable", test_wav_bytes())
        .await;

    let response = client.render(loop_id, json!({ "length_seconds": 4.0 })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["loop_id"].as_i64().unwrap(), loop_id);

    let variations = body["variations"].as_array().unwrap();
    let names: Vec<&str> = variations
        .iter()
        .map(|v| v["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Commercial", "Creative", "Experimental"]);

    let urls: HashSet<&str> = variations
        .iter()
        .map(|v| v["url"].as_str().unwrap())
        .collect();
    assert_eq!(urls.len(), 3, "variation URLs must be distinct");
    for url in &urls {
        assert!(url.starts_with("/renders/"));
        assert!(url.ends_with(".wav"));
    }
}

#[tokio::test]
async fn rendered_variations_are_downloadable_wavs_of_the_target_length() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let loop_id = client
        .create_loop_with_audio("tiled", test_wav_bytes())
        .await;

    let response = client
        .render(loop_id, json!({ "length_seconds": 3.0, "variations": 1 }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let url = body["variations"][0]["url"].as_str().unwrap().to_string();

    let response = client.get(&url).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.bytes().await.unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");

    // 22050 Hz mono source tiled from 1s to 3s: data chunk holds
    // 3 * 22050 16-bit samples
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes.to_vec())).unwrap();
    let duration_seconds = reader.duration() as f64 / reader.spec().sample_rate as f64;
    assert!((duration_seconds - 3.0).abs() < 0.01);
}

#[tokio::test]
async fn styled_render_names_profiles_after_the_styles() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let loop_id = client
        .create_loop_with_audio("styled", test_wav_bytes())
        .await;

    let response = client
        .render(
            loop_id,
            json!({
                "length_seconds": 2.0,
                "variations": 2,
                "variation_styles": ["Atlanta Trap", "Lofi Chill"]
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let variations = body["variations"].as_array().unwrap();
    assert_eq!(variations.len(), 2);
    assert_eq!(variations[0]["name"], "Atlanta Trap");
    assert_eq!(variations[0]["style_hint"], "Atlanta Trap");
    assert_eq!(variations[1]["name"], "Lofi Chill");
    assert_eq!(variations[1]["style_hint"], "Lofi Chill");
}

#[tokio::test]
async fn custom_style_render_leads_with_a_custom_variation() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let loop_id = client
        .create_loop_with_audio("custom", test_wav_bytes())
        .await;

    let response = client
        .render(
            loop_id,
            json!({
                "length_seconds": 2.0,
                "variations": 2,
                "custom_style": "Night Drive"
            }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.unwrap();
    let variations = body["variations"].as_array().unwrap();
    assert_eq!(variations.len(), 2);
    assert_eq!(variations[0]["name"], "Custom");
    assert_eq!(variations[0]["style_hint"], "Night Drive");
    assert_eq!(variations[1]["name"], "Commercial");
}

#[tokio::test]
async fn render_of_unknown_loop_is_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.render(777, json!({})).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn render_without_uploaded_audio_is_a_precondition_failure() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.create_loop(json!({ "name": "silent" })).await;
    let id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let response = client.render(id, json!({})).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "precondition_failed");

    // No variation files were produced
    let renders = std::fs::read_dir(server.media_path.join("renders")).unwrap();
    assert_eq!(renders.count(), 0);
}

#[tokio::test]
async fn render_with_missing_audio_file_is_unprocessable() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client
        .create_loop(json!({ "name": "dangling", "file_url": "/uploads/vanished.wav" }))
        .await;
    let id = response.json::<Value>().await.unwrap()["id"].as_i64().unwrap();

    let response = client.render(id, json!({})).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "resource_unavailable");
}

#[tokio::test]
async fn render_with_non_positive_length_is_rejected() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let loop_id = client
        .create_loop_with_audio("short", test_wav_bytes())
        .await;

    let response = client.render(loop_id, json!({ "length_seconds": 0.0 })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
