//! Vitae-DB: Document store, migrations, and query operations
//!
//! This crate stores credential documents in SQLite using rusqlite and r2d2
//! connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```no_run
//! use vitae_db::pool::{init_pool, get_conn};
//! use vitae_db::queries::titulos;
//!
//! let pool = init_pool("/var/lib/vitae/ProyectoFinal.sqlite").unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let titulo = titulos::create_titulo(&conn, "Ingeniería Civil", None).unwrap();
//! println!("Created titulo: {}", titulo.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
