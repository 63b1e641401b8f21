//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates an in-memory DB, a temporary
//! upload directory and the full [`AppContext`]. Requests are driven through
//! the router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::path::PathBuf;

use axum::{
    body::Body,
    http::{header, Request, Response},
    Router,
};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use vitae::config::Config;
use vitae::images::{ImageService, UploadStorage};
use vitae::server::{create_router, AppContext};
use vitae_common::TituloId;
use vitae_db::pool::{init_memory_pool, DbPool, PooledConnection};
use vitae_db::queries::titulos;

pub const BOUNDARY: &str = "vitae-test-boundary";

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database and a temporary upload directory.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    /// Parent of the upload directory; holds files that must never be served.
    pub root: TempDir,
}

impl TestHarness {
    pub fn new() -> Self {
        let root = tempfile::tempdir().expect("failed to create temp dir");
        let upload_dir = root.path().join("uploads");

        let mut config = Config::default();
        config.storage.upload_dir = upload_dir.clone();

        let db = init_memory_pool().expect("failed to create in-memory pool");
        let storage = UploadStorage::init(&upload_dir).expect("failed to init upload dir");
        let ctx = AppContext::new(config, ImageService::new(storage, db.clone()));

        Self { ctx, db, root }
    }

    pub fn app(&self) -> Router {
        create_router(self.ctx.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app().oneshot(request).await.expect("router failed")
    }

    /// Get a database connection from the pool.
    ///
    /// The pool holds a single connection; drop it before sending requests.
    pub fn conn(&self) -> PooledConnection {
        vitae_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.root.path().join("uploads")
    }

    /// Names of the files currently in the upload directory.
    pub fn uploaded_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir())
            .expect("upload dir readable")
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    pub fn create_titulo(&self) -> TituloId {
        let conn = self.conn();
        titulos::create_titulo(&conn, "Ingeniería en Sistemas", Some("UTN"))
            .expect("failed to create titulo")
            .id
    }

    pub fn titulo_with_inline(&self, encoded: &str) -> TituloId {
        let id = self.create_titulo();
        let conn = self.conn();
        titulos::set_inline_image(&conn, id, encoded).expect("failed to set inline image");
        id
    }

    pub fn image_of(&self, id: TituloId) -> vitae_db::models::ImageRef {
        let conn = self.conn();
        titulos::get_image_ref(&conn, id)
            .expect("query failed")
            .expect("titulo missing")
    }
}

/// One multipart form part.
pub struct Part<'a> {
    pub name: &'a str,
    pub file_name: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Self {
        Self {
            name: "file",
            file_name: Some(file_name),
            content_type: Some(content_type),
            data,
        }
    }

    pub fn text(name: &'a str, value: &'a str) -> Self {
        Self {
            name,
            file_name: None,
            content_type: None,
            data: value.as_bytes(),
        }
    }
}

/// Encode parts as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(file_name) = part.file_name {
            disposition.push_str(&format!("; filename=\"{file_name}\""));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(ct) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {ct}\r\n").as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Build an upload request for a credential.
pub fn upload_request(id: &str, parts: &[Part<'_>]) -> Request<Body> {
    Request::post(format!("/api/titulos/{id}/imagen"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
