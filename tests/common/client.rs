//! Thin HTTP client for the end-to-end tests.
//!
//! When API routes or request formats change, update only this file.
#![allow(dead_code)] // Not every suite uses every helper

use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde_json::Value;

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn create_loop(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/v1/loops"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn get_loop(&self, id: i64) -> Response {
        self.get(&format!("/api/v1/loops/{}", id)).await
    }

    pub async fn list_loops(&self) -> Response {
        self.get("/api/v1/loops").await
    }

    pub async fn patch_loop(&self, id: i64, body: Value) -> Response {
        self.client
            .patch(self.url(&format!("/api/v1/loops/{}", id)))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn delete_loop(&self, id: i64) -> Response {
        self.client
            .delete(self.url(&format!("/api/v1/loops/{}", id)))
            .send()
            .await
            .unwrap()
    }

    pub async fn upload(&self, bytes: Vec<u8>, filename: &str, content_type: &str) -> Response {
        let part = Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .unwrap();
        let form = Form::new().part("file", part);
        self.client
            .post(self.url("/api/v1/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    pub async fn render(&self, loop_id: i64, body: Value) -> Response {
        self.client
            .post(self.url(&format!("/api/v1/loops/{}/render", loop_id)))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    pub async fn arrangement(&self, body: Value) -> Response {
        self.client
            .post(self.url("/api/v1/arrangement"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    /// Upload a WAV and create a loop pointing at it; returns the loop id.
    pub async fn create_loop_with_audio(&self, name: &str, wav_bytes: Vec<u8>) -> i64 {
        let upload_response = self.upload(wav_bytes, "loop.wav", "audio/wav").await;
        assert_eq!(upload_response.status(), reqwest::StatusCode::OK);
        let uploaded: Value = upload_response.json().await.unwrap();
        let file_url = uploaded["url"].as_str().unwrap().to_string();

        let create_response = self
            .create_loop(serde_json::json!({ "name": name, "file_url": file_url }))
            .await;
        assert_eq!(create_response.status(), reqwest::StatusCode::CREATED);
        let created: Value = create_response.json().await.unwrap();
        created["id"].as_i64().unwrap()
    }
}
