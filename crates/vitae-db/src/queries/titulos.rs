//! Credential ("titulo") queries.
//!
//! This module provides create/read operations for credential records and
//! the two image updates: pointing a record at an uploaded file and storing
//! an inline image. Both updates keep exactly one representation.

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension};
use vitae_common::{Error, Result, TituloId};

use crate::models::{ImageRef, Titulo};

/// Parse a titulo from a database row.
///
/// Expects columns in order: id, nombre, institucion, imagen_path,
/// imagen_base64, created_at, updated_at.
fn parse_titulo_row(row: &rusqlite::Row) -> rusqlite::Result<Titulo> {
    let id: String = row.get(0)?;
    let id = id
        .parse::<TituloId>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    Ok(Titulo {
        id,
        nombre: row.get(1)?,
        institucion: row.get(2)?,
        image: ImageRef::from_columns(row.get(3)?, row.get(4)?),
        created_at: parse_timestamp(row, 5)?,
        updated_at: parse_timestamp(row, 6)?,
    })
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Create a new credential record without an image.
///
/// # Arguments
///
/// * `conn` - Database connection
/// * `nombre` - Display name of the credential
/// * `institucion` - Issuing institution, if known
pub fn create_titulo(
    conn: &Connection,
    nombre: &str,
    institucion: Option<&str>,
) -> Result<Titulo> {
    let now = Utc::now();
    let titulo = Titulo {
        id: TituloId::new(),
        nombre: nombre.to_string(),
        institucion: institucion.map(str::to_string),
        image: ImageRef::None,
        created_at: now,
        updated_at: now,
    };

    insert_titulo(conn, &titulo)?;
    Ok(titulo)
}

/// Insert a fully-formed credential record.
pub fn insert_titulo(conn: &Connection, titulo: &Titulo) -> Result<TituloId> {
    let (imagen_path, imagen_base64) = titulo.image.to_columns();

    conn.execute(
        "INSERT INTO titulos (id, nombre, institucion, imagen_path, imagen_base64, created_at, updated_at)
         VALUES (:id, :nombre, :institucion, :imagen_path, :imagen_base64, :created_at, :updated_at)",
        rusqlite::named_params! {
            ":id": titulo.id.to_string(),
            ":nombre": &titulo.nombre,
            ":institucion": &titulo.institucion,
            ":imagen_path": imagen_path,
            ":imagen_base64": imagen_base64,
            ":created_at": titulo.created_at.to_rfc3339(),
            ":updated_at": titulo.updated_at.to_rfc3339(),
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(titulo.id)
}

/// Get a credential record by ID.
///
/// # Returns
///
/// * `Ok(Some(Titulo))` - The record if found
/// * `Ok(None)` - If no record has this id
/// * `Err(Error)` - If a database error occurs
pub fn get_titulo(conn: &Connection, id: TituloId) -> Result<Option<Titulo>> {
    conn.query_row(
        "SELECT id, nombre, institucion, imagen_path, imagen_base64, created_at, updated_at
         FROM titulos WHERE id = :id",
        rusqlite::named_params! { ":id": id.to_string() },
        parse_titulo_row,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// Get only the image columns of a record.
///
/// Returns `Ok(None)` when the record does not exist.
pub fn get_image_ref(conn: &Connection, id: TituloId) -> Result<Option<ImageRef>> {
    conn.query_row(
        "SELECT imagen_path, imagen_base64 FROM titulos WHERE id = :id",
        rusqlite::named_params! { ":id": id.to_string() },
        |row| Ok(ImageRef::from_columns(row.get(0)?, row.get(1)?)),
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List all credential records, newest first.
pub fn list_titulos(conn: &Connection) -> Result<Vec<Titulo>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, nombre, institucion, imagen_path, imagen_base64, created_at, updated_at
             FROM titulos
             ORDER BY created_at DESC, id DESC",
        )
        .map_err(|e| Error::database(e.to_string()))?;

    let titulos = stmt
        .query_map([], parse_titulo_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(titulos)
}

/// Point a record at an uploaded file and clear its inline image.
///
/// # Returns
///
/// * `Ok(true)` - If the record was updated
/// * `Ok(false)` - If no record has this id
pub fn set_image_path(conn: &Connection, id: TituloId, path: &str) -> Result<bool> {
    set_image(conn, id, &ImageRef::File(path.to_string()))
}

/// Store an inline image on a record and clear its file path.
///
/// The value is stored as given; it is decoded when served.
pub fn set_inline_image(conn: &Connection, id: TituloId, encoded: &str) -> Result<bool> {
    set_image(conn, id, &ImageRef::Inline(encoded.to_string()))
}

/// Replace the image of a record, whatever it was.
pub fn set_image(conn: &Connection, id: TituloId, image: &ImageRef) -> Result<bool> {
    let (imagen_path, imagen_base64) = image.to_columns();

    let rows = conn
        .execute(
            "UPDATE titulos
             SET imagen_path = :imagen_path,
                 imagen_base64 = :imagen_base64,
                 updated_at = :updated_at
             WHERE id = :id",
            rusqlite::named_params! {
                ":id": id.to_string(),
                ":imagen_path": imagen_path,
                ":imagen_base64": imagen_base64,
                ":updated_at": Utc::now().to_rfc3339(),
            },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows > 0)
}
