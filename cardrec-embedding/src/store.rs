//! SQLite storage for card and category embeddings using rusqlite

use std::path::Path;
use std::sync::Arc;

use bincode::config;
use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, instrument};

use crate::{
    error::Result,
    types::{CardEmbedding, CategoryEmbedding, EmbeddingVector},
};

/// SQLite store for embeddings
pub struct EmbeddingStore {
    conn: Arc<Mutex<Connection>>,
}

fn encode_vector(embedding: &EmbeddingVector) -> Result<Vec<u8>> {
    Ok(bincode::encode_to_vec(embedding, config::standard())?)
}

fn decode_vector(bytes: &[u8]) -> Result<EmbeddingVector> {
    let (embedding, _) = bincode::decode_from_slice(bytes, config::standard())?;
    Ok(embedding)
}

fn timestamp(secs: i64) -> chrono::DateTime<Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now)
}

impl EmbeddingStore {
    /// Create a new embedding store
    ///
    /// # Arguments
    /// * `database_path` - Path to SQLite database file
    #[instrument(skip(database_path))]
    pub fn new<P: AsRef<Path> + std::fmt::Debug>(database_path: P) -> Result<Self> {
        info!("Opening embedding database: {:?}", database_path.as_ref());
        let conn = Connection::open(database_path.as_ref())?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.init_tables()?;
        Ok(store)
    }

    /// Create an in-memory store (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        store.init_tables()?;
        Ok(store)
    }

    /// Initialize database tables
    fn init_tables(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS card_embeddings (
                row_index INTEGER PRIMARY KEY,
                card_name TEXT NOT NULL,
                embedding BLOB NOT NULL,
                dimension INTEGER NOT NULL,
                model TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );

            CREATE TABLE IF NOT EXISTS category_embeddings (
                category TEXT NOT NULL,
                model TEXT NOT NULL,
                embedding BLOB NOT NULL,
                dimension INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (category, model)
            );
            "#,
        )?;

        info!("Embedding database tables initialized");
        Ok(())
    }

    /// Replace all stored card embeddings with `embeddings`
    ///
    /// Rows are written in one transaction so a crash never leaves a
    /// partially aligned matrix behind.
    #[instrument(skip(self, embeddings), fields(count = embeddings.len()))]
    pub fn replace_card_embeddings(&self, embeddings: &[CardEmbedding]) -> Result<()> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM card_embeddings", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO card_embeddings
                 (row_index, card_name, embedding, dimension, model, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )?;

            for embedding in embeddings {
                stmt.execute(params![
                    embedding.row_index as i64,
                    &embedding.card_name,
                    encode_vector(&embedding.embedding)?,
                    embedding.dimension as i64,
                    &embedding.model,
                    embedding.created_at.timestamp(),
                ])?;
            }
        }
        tx.commit()?;

        info!("Saved {} card embeddings", embeddings.len());
        Ok(())
    }

    /// Load card embeddings produced by `model`, ordered by corpus row
    #[instrument(skip(self))]
    pub fn load_card_embeddings(&self, model: &str) -> Result<Vec<CardEmbedding>> {
        let conn = self.conn.lock();

        let mut stmt = conn.prepare(
            "SELECT row_index, card_name, embedding, dimension, model, created_at
             FROM card_embeddings
             WHERE model = ?
             ORDER BY row_index ASC",
        )?;

        let rows = stmt.query_map(params![model], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i64>(5)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (row_index, card_name, bytes, dimension, model, created_at) = row?;
            results.push(CardEmbedding {
                row_index: row_index as usize,
                card_name,
                embedding: decode_vector(&bytes)?,
                dimension: dimension as usize,
                model,
                created_at: timestamp(created_at),
            });
        }

        info!("Loaded {} card embeddings", results.len());
        Ok(results)
    }

    /// Save or update a category embedding
    #[instrument(skip(self, embedding))]
    pub fn save_category_embedding(&self, embedding: &CategoryEmbedding) -> Result<()> {
        let embedding_bytes = encode_vector(&embedding.embedding)?;
        let conn = self.conn.lock();

        conn.execute(
            "INSERT INTO category_embeddings
             (category, model, embedding, dimension, created_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(category, model) DO UPDATE SET
                embedding = excluded.embedding,
                dimension = excluded.dimension,
                created_at = excluded.created_at",
            params![
                &embedding.category,
                &embedding.model,
                &embedding_bytes,
                embedding.dimension as i64,
                embedding.created_at.timestamp(),
            ],
        )?;

        debug!("Cached embedding for category: {}", embedding.category);
        Ok(())
    }

    /// Get a cached category embedding
    #[instrument(skip(self))]
    pub fn get_category_embedding(
        &self,
        category: &str,
        model: &str,
    ) -> Result<Option<CategoryEmbedding>> {
        let conn = self.conn.lock();

        let row = conn
            .query_row(
                "SELECT category, model, embedding, dimension, created_at
                 FROM category_embeddings
                 WHERE category = ? AND model = ?",
                params![category, model],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Vec<u8>>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((category, model, bytes, dimension, created_at)) => Ok(Some(CategoryEmbedding {
                category,
                model,
                embedding: decode_vector(&bytes)?,
                dimension: dimension as usize,
                created_at: timestamp(created_at),
            })),
            None => Ok(None),
        }
    }

    /// Get statistics about stored embeddings
    pub fn get_stats(&self) -> Result<EmbeddingStats> {
        let conn = self.conn.lock();

        let card_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM card_embeddings", [], |row| row.get(0))
            .unwrap_or(0);

        let category_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM category_embeddings", [], |row| row.get(0))
            .unwrap_or(0);

        // Get database size (page_count * page_size)
        let page_count: i64 = conn
            .query_row("PRAGMA page_count", [], |row| row.get(0))
            .unwrap_or(0);
        let page_size: i64 = conn
            .query_row("PRAGMA page_size", [], |row| row.get(0))
            .unwrap_or(4096);

        Ok(EmbeddingStats {
            card_count: card_count as usize,
            category_count: category_count as usize,
            database_size_bytes: (page_count * page_size) as usize,
        })
    }
}

/// Statistics about embedding storage
#[derive(Debug, Clone)]
pub struct EmbeddingStats {
    pub card_count: usize,
    pub category_count: usize,
    pub database_size_bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> EmbeddingStore {
        EmbeddingStore::new_in_memory().expect("Failed to create test store")
    }

    #[test]
    fn test_replace_and_load_card_embeddings_in_order() {
        let store = create_test_store();

        let embeddings: Vec<CardEmbedding> = (0..5)
            .rev()
            .map(|i| CardEmbedding::new(i, format!("card_{}", i), "test-model", vec![i as f32; 8]))
            .collect();
        store.replace_card_embeddings(&embeddings).unwrap();

        let loaded = store.load_card_embeddings("test-model").unwrap();
        assert_eq!(loaded.len(), 5);
        for (i, row) in loaded.iter().enumerate() {
            assert_eq!(row.row_index, i);
            assert_eq!(row.card_name, format!("card_{}", i));
            assert_eq!(row.embedding, vec![i as f32; 8]);
        }

        assert!(store.load_card_embeddings("other-model").unwrap().is_empty());
    }

    #[test]
    fn test_replace_drops_previous_rows() {
        let store = create_test_store();

        let first: Vec<CardEmbedding> = (0..3)
            .map(|i| CardEmbedding::new(i, format!("old_{}", i), "m", vec![0.1; 4]))
            .collect();
        store.replace_card_embeddings(&first).unwrap();

        let second = vec![CardEmbedding::new(0, "new_0".to_string(), "m", vec![0.2; 4])];
        store.replace_card_embeddings(&second).unwrap();

        let loaded = store.load_card_embeddings("m").unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].card_name, "new_0");
    }

    #[test]
    fn test_category_embedding_cache() {
        let store = create_test_store();

        assert!(store.get_category_embedding("dining", "m").unwrap().is_none());

        let embedding = CategoryEmbedding::new("dining".to_string(), "m", vec![0.5; 16]);
        store.save_category_embedding(&embedding).unwrap();

        let loaded = store.get_category_embedding("dining", "m").unwrap();
        assert_eq!(loaded.unwrap().embedding, vec![0.5; 16]);

        // Keyed by model as well as label
        assert!(store.get_category_embedding("dining", "other").unwrap().is_none());
        // Labels are case-sensitive
        assert!(store.get_category_embedding("Dining", "m").unwrap().is_none());

        let stats = store.get_stats().unwrap();
        assert_eq!(stats.category_count, 1);
        assert_eq!(stats.card_count, 0);
    }
}
