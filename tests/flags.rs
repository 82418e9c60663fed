#[cfg(test)]
mod tests {
    use museo::db::db::Db;
    use museo::db::flags::FlagStore;
    use museo::db::migrations::{get_db_version, init_with_migrations};
    use museo::libs::config::DEFAULT_ENTRY_FLAG_KEY;
    use museo::libs::monitor::{entry_flag_set, reset_entry_flag, ENTRY_FLAG_VALUE};
    use museo::libs::store::{KeyValueStore, MemoryStore};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, AsyncTestContext, TestContext};

    struct FlagsTestContext {
        temp_dir: TempDir,
    }

    impl TestContext for FlagsTestContext {
        fn setup() -> Self {
            FlagsTestContext {
                temp_dir: tempfile::tempdir().unwrap(),
            }
        }
    }

    impl FlagsTestContext {
        fn db_path(&self) -> PathBuf {
            self.temp_dir.path().join("museo.db")
        }

        fn store(&self) -> FlagStore {
            FlagStore::open(&self.db_path()).unwrap()
        }
    }

    /// Same database setup for the async `KeyValueStore` tests.
    struct AsyncFlagsTestContext {
        _temp_dir: TempDir,
        store: FlagStore,
    }

    impl AsyncTestContext for AsyncFlagsTestContext {
        async fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let store = FlagStore::open(&temp_dir.path().join("museo.db")).unwrap();
            AsyncFlagsTestContext {
                _temp_dir: temp_dir,
                store,
            }
        }
    }

    #[test_context(FlagsTestContext)]
    #[test]
    fn test_upsert_fetch_remove(ctx: &mut FlagsTestContext) {
        let store = ctx.store();
        assert!(store.fetch("visited").unwrap().is_none());

        store.upsert("visited", "true").unwrap();
        let flag = store.fetch("visited").unwrap().unwrap();
        assert_eq!(flag.key, "visited");
        assert_eq!(flag.value, "true");

        store.upsert("visited", "false").unwrap();
        assert_eq!(store.fetch("visited").unwrap().unwrap().value, "false");

        store.remove("visited").unwrap();
        assert!(store.fetch("visited").unwrap().is_none());
    }

    #[test_context(FlagsTestContext)]
    #[test]
    fn test_removing_absent_key_is_ok(ctx: &mut FlagsTestContext) {
        let store = ctx.store();
        assert!(store.remove("never-set").is_ok());
    }

    #[test_context(FlagsTestContext)]
    #[test]
    fn test_flag_survives_reopen(ctx: &mut FlagsTestContext) {
        {
            let store = ctx.store();
            store.upsert(DEFAULT_ENTRY_FLAG_KEY, ENTRY_FLAG_VALUE).unwrap();
        }

        let reopened = ctx.store();
        let flag = reopened.fetch(DEFAULT_ENTRY_FLAG_KEY).unwrap().unwrap();
        assert_eq!(flag.value, ENTRY_FLAG_VALUE);
    }

    #[test_context(AsyncFlagsTestContext)]
    #[tokio::test]
    async fn test_key_value_store_api(ctx: &mut AsyncFlagsTestContext) {
        let store = &ctx.store;

        assert!(!entry_flag_set(store, DEFAULT_ENTRY_FLAG_KEY).await.unwrap());

        store.set(DEFAULT_ENTRY_FLAG_KEY, ENTRY_FLAG_VALUE).await.unwrap();
        assert_eq!(store.get(DEFAULT_ENTRY_FLAG_KEY).await.unwrap().as_deref(), Some(ENTRY_FLAG_VALUE));
        assert!(entry_flag_set(store, DEFAULT_ENTRY_FLAG_KEY).await.unwrap());
        assert!(store.fetch(DEFAULT_ENTRY_FLAG_KEY).unwrap().is_some());

        reset_entry_flag(store, DEFAULT_ENTRY_FLAG_KEY).await.unwrap();
        assert_eq!(store.get(DEFAULT_ENTRY_FLAG_KEY).await.unwrap(), None);

        // Resetting twice is harmless
        reset_entry_flag(store, DEFAULT_ENTRY_FLAG_KEY).await.unwrap();
    }

    #[tokio::test]
    async fn test_memory_store_matches_flag_semantics() {
        let store = MemoryStore::new();

        store.set("key", "other").await.unwrap();
        assert!(!entry_flag_set(&store, "key").await.unwrap());

        store.set("key", ENTRY_FLAG_VALUE).await.unwrap();
        assert!(entry_flag_set(&store, "key").await.unwrap());

        store.delete("key").await.unwrap();
        store.delete("key").await.unwrap();
        assert_eq!(store.get("key").await.unwrap(), None);
    }

    #[test_context(FlagsTestContext)]
    #[test]
    fn test_migrations_applied_once(ctx: &mut FlagsTestContext) {
        let mut db = Db::open(&ctx.db_path()).unwrap();
        assert_eq!(get_db_version(&db.conn).unwrap(), 1);

        init_with_migrations(&mut db.conn).unwrap();
        assert_eq!(get_db_version(&db.conn).unwrap(), 1);

        let applied: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM migrations", [], |row| row.get(0))
            .unwrap();
        assert_eq!(applied, 1);
    }
}
