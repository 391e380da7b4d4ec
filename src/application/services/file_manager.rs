use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    application::{
        error::ApplicationError,
        repositories::token_repository::TokenRepository,
        services::{storage_service::StorageService, token_generator::TokenGenerator},
    },
    domain::models::file::{is_valid_file_name, FileReader, StoredFile},
};

/// Stores files and hands out tokens for them. The only place that knows both
/// the storage and the token repository exist.
#[derive(Clone)]
pub struct FileManager {
    storage: Arc<dyn StorageService>,
    tokens: Arc<dyn TokenRepository>,
    generator: Arc<dyn TokenGenerator>,
    max_token_attempts: u32,
}

impl FileManager {
    pub fn new(
        storage: Arc<dyn StorageService>,
        tokens: Arc<dyn TokenRepository>,
        generator: Arc<dyn TokenGenerator>,
        max_token_attempts: u32,
    ) -> Self {
        Self {
            storage,
            tokens,
            generator,
            max_token_attempts: max_token_attempts.max(1),
        }
    }

    /// Persists `content` under `file_name` and returns a fresh token bound to it.
    ///
    /// Storage is written first, so a failed write never leaves a token behind.
    /// A failed bind after a successful write leaves the bytes stored but unreachable.
    pub async fn save_file(
        &self,
        file_name: &str,
        content: &mut FileReader,
    ) -> Result<String, ApplicationError> {
        if !is_valid_file_name(file_name) {
            warn!(file_name, "Rejected file name");
            return Err(ApplicationError::BadRequest(format!(
                "Invalid file name: {:?}",
                file_name
            )));
        }

        self.storage.save(file_name, content).await?;
        info!(file_name, "File stored");

        let token = self.bind_token(file_name).await?;
        info!(file_name, token = %token, "Token issued");

        Ok(token)
    }

    pub async fn load_file(&self, token: &str) -> Result<StoredFile, ApplicationError> {
        let file_name = self
            .tokens
            .get(token)
            .await?
            .ok_or(ApplicationError::UnknownToken)?;

        match self.storage.load(&file_name).await {
            Ok(file) => Ok(file),
            Err(ApplicationError::NotFound) => {
                error!(token, file_name = %file_name, "Token bound to a missing file");
                Err(ApplicationError::DanglingReference(token.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn close(&self) {
        self.tokens.close().await;
    }

    async fn bind_token(&self, file_name: &str) -> Result<String, ApplicationError> {
        for attempt in 1..=self.max_token_attempts {
            let candidate = self.generator.generate();

            if self.tokens.has(&candidate).await? {
                debug!(attempt, "Token candidate already taken");
                continue;
            }

            // Another writer may claim the candidate between `has` and `record`.
            match self.tokens.record(&candidate, file_name).await {
                Ok(()) => return Ok(candidate),
                Err(ApplicationError::TokenConflict) => {
                    warn!(attempt, "Token candidate claimed concurrently, retrying");
                }
                Err(e) => return Err(e),
            }
        }

        error!(
            file_name,
            attempts = self.max_token_attempts,
            "Could not find a free token"
        );
        Err(ApplicationError::TokenSpaceExhausted(self.max_token_attempts))
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::{HashSet, VecDeque},
        io::Cursor,
        sync::Mutex,
    };

    use async_trait::async_trait;
    use tokio::io::AsyncReadExt;

    use super::*;
    use crate::{
        adapters::repositories::MemoryTokenRepository,
        application::services::token_generator::{RandomTokenGenerator, TOKEN_LENGTH},
        services::MemoryStorageService,
    };

    struct ScriptedGenerator {
        tokens: Mutex<VecDeque<String>>,
        fallback: String,
    }

    impl ScriptedGenerator {
        fn new(script: &[&str], fallback: &str) -> Self {
            Self {
                tokens: Mutex::new(script.iter().map(|s| s.to_string()).collect()),
                fallback: fallback.to_string(),
            }
        }
    }

    impl TokenGenerator for ScriptedGenerator {
        fn generate(&self) -> String {
            self.tokens
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone())
        }
    }

    /// Reports every token as free, then refuses the first `conflicts` inserts,
    /// mimicking a concurrent writer winning the unique index.
    struct RacingTokenRepository {
        inner: MemoryTokenRepository,
        conflicts: Mutex<u32>,
    }

    #[async_trait]
    impl TokenRepository for RacingTokenRepository {
        async fn record(&self, token: &str, file_name: &str) -> Result<(), ApplicationError> {
            {
                let mut remaining = self.conflicts.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(ApplicationError::TokenConflict);
                }
            }
            self.inner.record(token, file_name).await
        }

        async fn get(&self, token: &str) -> Result<Option<String>, ApplicationError> {
            self.inner.get(token).await
        }

        async fn has(&self, _token: &str) -> Result<bool, ApplicationError> {
            Ok(false)
        }

        async fn clear(&self) -> Result<(), ApplicationError> {
            self.inner.clear().await
        }

        async fn close(&self) {}
    }

    struct BrokenStorage;

    #[async_trait]
    impl StorageService for BrokenStorage {
        async fn save(&self, _: &str, _: &mut FileReader) -> Result<(), ApplicationError> {
            Err(ApplicationError::InternalError("disk full".to_string()))
        }

        async fn load(&self, _: &str) -> Result<StoredFile, ApplicationError> {
            Err(ApplicationError::NotFound)
        }

        async fn clear(&self) -> Result<(), ApplicationError> {
            Ok(())
        }
    }

    fn reader(content: &str) -> FileReader {
        Box::new(Cursor::new(content.as_bytes().to_vec()))
    }

    fn manager_with(
        storage: Arc<dyn StorageService>,
        tokens: Arc<dyn TokenRepository>,
        generator: Arc<dyn TokenGenerator>,
    ) -> FileManager {
        FileManager::new(storage, tokens, generator, 32)
    }

    fn memory_manager() -> (FileManager, Arc<MemoryStorageService>, Arc<MemoryTokenRepository>) {
        let storage = Arc::new(MemoryStorageService::new());
        let tokens = Arc::new(MemoryTokenRepository::new());
        let manager = manager_with(
            storage.clone(),
            tokens.clone(),
            Arc::new(RandomTokenGenerator),
        );
        (manager, storage, tokens)
    }

    async fn read_all(file: &mut StoredFile) -> String {
        let mut buf = String::new();
        file.reader.read_to_string(&mut buf).await.unwrap();
        buf
    }

    #[tokio::test]
    async fn save_then_load_returns_same_content() {
        let (manager, _, tokens) = memory_manager();

        let token = manager
            .save_file("manual.txt", &mut reader("test content"))
            .await
            .unwrap();

        assert_eq!(token.len(), TOKEN_LENGTH);
        assert!(token.chars().all(|c| c.is_ascii_alphabetic()));
        assert_eq!(
            tokens.get(&token).await.unwrap(),
            Some("manual.txt".to_string())
        );

        let mut file = manager.load_file(&token).await.unwrap();
        assert_eq!(read_all(&mut file).await, "test content");
        assert_eq!(file.size, 12);
        assert_eq!(file.file_name, "manual.txt");
        assert_eq!(file.mime_type, "text/plain");
    }

    #[tokio::test]
    async fn issues_distinct_tokens() {
        let (manager, _, _) = memory_manager();
        let mut seen = HashSet::new();

        for i in 0..300 {
            let token = manager
                .save_file(&format!("file-{i}.bin"), &mut reader("x"))
                .await
                .unwrap();
            assert!(seen.insert(token));
        }
    }

    #[tokio::test]
    async fn unknown_token_is_reported_as_such() {
        let (manager, _, _) = memory_manager();
        let err = manager.load_file("aaaaaaaaaaaaaaaa").await.unwrap_err();
        assert_eq!(err, ApplicationError::UnknownToken);
    }

    #[tokio::test]
    async fn retries_until_generator_yields_free_token() {
        let storage = Arc::new(MemoryStorageService::new());
        let tokens = Arc::new(MemoryTokenRepository::new());
        let taken = "aaaaaaaaaaaaaaaa";
        let fresh = "bbbbbbbbbbbbbbbb";
        let generator = Arc::new(ScriptedGenerator::new(
            &[taken, taken, taken, taken],
            fresh,
        ));
        let manager = manager_with(storage, tokens.clone(), generator);

        let first = manager
            .save_file("existing.txt", &mut reader("old"))
            .await
            .unwrap();
        assert_eq!(first, taken);

        let second = manager
            .save_file("test.txt", &mut reader("new"))
            .await
            .unwrap();
        assert_eq!(second, fresh);

        assert_eq!(
            tokens.get(taken).await.unwrap(),
            Some("existing.txt".to_string())
        );
        assert_eq!(tokens.get(fresh).await.unwrap(), Some("test.txt".to_string()));
    }

    #[tokio::test]
    async fn gives_up_after_attempt_cap() {
        let storage = Arc::new(MemoryStorageService::new());
        let tokens = Arc::new(MemoryTokenRepository::new());
        tokens.record("aaaaaaaaaaaaaaaa", "existing.txt").await.unwrap();
        let generator = Arc::new(ScriptedGenerator::new(&[], "aaaaaaaaaaaaaaaa"));
        let manager = FileManager::new(storage, tokens, generator, 5);

        let err = manager
            .save_file("test.txt", &mut reader("new"))
            .await
            .unwrap_err();
        assert_eq!(err, ApplicationError::TokenSpaceExhausted(5));
    }

    #[tokio::test]
    async fn insert_conflict_is_retried_with_new_candidate() {
        let storage = Arc::new(MemoryStorageService::new());
        let tokens = Arc::new(RacingTokenRepository {
            inner: MemoryTokenRepository::new(),
            conflicts: Mutex::new(2),
        });
        let generator = Arc::new(ScriptedGenerator::new(
            &["aaaaaaaaaaaaaaaa", "bbbbbbbbbbbbbbbb"],
            "cccccccccccccccc",
        ));
        let manager = manager_with(storage, tokens.clone(), generator);

        let token = manager
            .save_file("race.txt", &mut reader("data"))
            .await
            .unwrap();
        assert_eq!(token, "cccccccccccccccc");
        assert_eq!(tokens.inner.get("aaaaaaaaaaaaaaaa").await.unwrap(), None);
    }

    #[tokio::test]
    async fn failed_write_issues_no_token() {
        let tokens = Arc::new(MemoryTokenRepository::new());
        let generator = Arc::new(ScriptedGenerator::new(&[], "aaaaaaaaaaaaaaaa"));
        let manager = manager_with(Arc::new(BrokenStorage), tokens.clone(), generator);

        let err = manager
            .save_file("test.txt", &mut reader("data"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::InternalError(_)));
        assert!(!tokens.has("aaaaaaaaaaaaaaaa").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_path_traversal_before_writing() {
        let (manager, storage, _) = memory_manager();

        let err = manager
            .save_file("../escape.txt", &mut reader("data"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApplicationError::BadRequest(_)));
        assert_eq!(
            storage.load("../escape.txt").await.unwrap_err(),
            ApplicationError::NotFound
        );
    }

    #[tokio::test]
    async fn missing_content_is_a_dangling_reference() {
        let (manager, storage, _) = memory_manager();
        let token = manager
            .save_file("gone.txt", &mut reader("data"))
            .await
            .unwrap();

        storage.clear().await.unwrap();

        let err = manager.load_file(&token).await.unwrap_err();
        assert_eq!(err, ApplicationError::DanglingReference(token));
    }

    #[tokio::test]
    async fn clearing_both_backends_forgets_tokens() {
        let (manager, storage, tokens) = memory_manager();
        let token = manager
            .save_file("manual.txt", &mut reader("test content"))
            .await
            .unwrap();

        tokens.clear().await.unwrap();
        storage.clear().await.unwrap();

        let err = manager.load_file(&token).await.unwrap_err();
        assert_eq!(err, ApplicationError::UnknownToken);
    }

    #[tokio::test]
    async fn same_name_overwrites_but_keeps_both_tokens() {
        let (manager, _, _) = memory_manager();
        let first = manager
            .save_file("doc.txt", &mut reader("v1"))
            .await
            .unwrap();
        let second = manager
            .save_file("doc.txt", &mut reader("version two"))
            .await
            .unwrap();
        assert_ne!(first, second);

        for token in [first, second] {
            let mut file = manager.load_file(&token).await.unwrap();
            assert_eq!(read_all(&mut file).await, "version two");
            assert_eq!(file.size, 11);
        }
    }
}
