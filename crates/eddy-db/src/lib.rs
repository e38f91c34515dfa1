//! Async execution of `eddy-core` queries over pooled connections.
//!
//! A [`Manager`] resolves a connection URL to a driver and a dialect,
//! yielding a [`Swirl`] handle. Queries become reusable [`Operation`]s
//! through the [`Executable`] trait and run against any handle:
//!
//! ```no_run
//! use eddy_core::Query;
//! use eddy_db::{Executable, Manager};
//!
//! # async fn demo() -> eddy_db::Result<()> {
//! let swirl = Manager::sqlite().bind("sqlite::memory:")?;
//!
//! let person = Query::table("person").select(["id", "firstname"]);
//! let rows: Vec<(i64, String)> = swirl.run(&person.result()).await?;
//! # Ok(())
//! # }
//! ```

pub mod driver;
pub mod error;
pub mod manager;
pub mod operation;
pub mod pool;
pub mod row;
pub mod sqlite;
pub mod swirl;

pub use driver::{Connection, Driver, ExecResult, QueryResult};
pub use error::{DbError, Result};
pub use manager::Manager;
pub use operation::{Executable, Operation};
pub use pool::{Pool, PoolOptions, PooledConnection};
pub use row::{FromRow, RowError, ToRow};
pub use sqlite::{SqliteConnection, SqliteDriver};
pub use swirl::Swirl;

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::future::BoxFuture;
    use futures::FutureExt;

    use eddy_core::{Query, Sql, Value};

    use super::*;

    fn memory() -> Swirl {
        Manager::sqlite()
            .bind_with("sqlite::memory:", PoolOptions { max_connections: 1 })
            .unwrap()
    }

    async fn seed_people(swirl: &Swirl) {
        swirl
            .execute(Sql::new(
                "CREATE TABLE person (id INTEGER, firstname TEXT)",
            ))
            .await
            .unwrap();
        let person = Query::table("person").select(["id", "firstname"]);
        swirl
            .run(&person.insert_all(vec![(1i64, "Ada"), (2i64, "Grace")]))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn insert_then_select_round_trips() {
        let swirl = memory();
        seed_people(&swirl).await;

        let person = Query::table("person").select(["id", "firstname"]);
        let rows: Vec<(i64, String)> = swirl.run(&person.result()).await.unwrap();
        assert_eq!(
            rows,
            vec![(1, "Ada".to_string()), (2, "Grace".to_string())]
        );
    }

    #[tokio::test]
    async fn filtered_select_matches_only_the_predicate() {
        let swirl = memory();
        seed_people(&swirl).await;

        let person = Query::table("person");
        let id = person.col("id").bind::<i64>();
        let query = person.select(["firstname"]).filter(|_| id.eq(2));

        let rows: Vec<(String,)> = swirl.run(&query.result()).await.unwrap();
        assert_eq!(rows, vec![("Grace".to_string(),)]);
    }

    #[tokio::test]
    async fn select_matching_nothing_is_empty_not_an_error() {
        let swirl = memory();
        seed_people(&swirl).await;

        let person = Query::table("person");
        let id = person.col("id").bind::<i64>();
        let query = person.select(["firstname"]).filter(|_| id.eq(999));

        let rows: Vec<(String,)> = swirl.run(&query.result()).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn update_and_delete_report_affected_rows() {
        let swirl = memory();
        seed_people(&swirl).await;

        let person = Query::table("person");
        let id = person.col("id").bind::<i64>();

        let rename = person
            .select(["firstname"])
            .filter(|_| id.eq(1))
            .update(("Ada Lovelace",));
        assert_eq!(swirl.run(&rename).await.unwrap(), 1);

        let purge = Query::from(person.clone()).delete();
        assert_eq!(swirl.run(&purge).await.unwrap(), 2);

        let rows: Vec<Vec<Value>> = swirl
            .run(&Query::from(person).result())
            .await
            .unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn upsert_inserts_when_nothing_matches_then_updates() {
        let swirl = memory();
        swirl
            .execute(Sql::new("CREATE TABLE counter (name TEXT, hits INTEGER)"))
            .await
            .unwrap();

        let counter = Query::table("counter");
        let name = counter.col("name").bind::<String>();
        let query = counter
            .select(["name", "hits"])
            .filter(|_| name.eq("clicks"));

        assert_eq!(
            swirl.run(&query.upsert(("clicks", 1i64))).await.unwrap(),
            1
        );
        assert_eq!(
            swirl.run(&query.upsert(("clicks", 2i64))).await.unwrap(),
            1
        );

        let rows: Vec<(String, i64)> = swirl.run(&query.result()).await.unwrap();
        assert_eq!(rows, vec![("clicks".to_string(), 2)]);
    }

    #[tokio::test]
    async fn run_all_executes_in_order_on_one_connection() {
        let swirl = memory();
        swirl
            .execute(Sql::new("CREATE TABLE log (seq INTEGER)"))
            .await
            .unwrap();

        let log = Query::table("log").select(["seq"]);
        let batch: Vec<_> = (0..5i64).map(|i| log.insert((i,))).collect();

        let affected = swirl.run_all(&batch).await.unwrap();
        assert_eq!(affected, vec![1, 1, 1, 1, 1]);

        let rows: Vec<(i64,)> = swirl.run(&log.result()).await.unwrap();
        let seqs: Vec<i64> = rows.into_iter().map(|(s,)| s).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn operations_are_reusable() {
        let swirl = memory();
        swirl
            .execute(Sql::new("CREATE TABLE log (seq INTEGER)"))
            .await
            .unwrap();

        let insert = Query::table("log").select(["seq"]).insert((7i64,));
        swirl.run(&insert).await.unwrap();
        swirl.run(&insert).await.unwrap();

        let rows: Vec<(i64,)> = swirl
            .run(&Query::from(Query::table("log")).result())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn file_backed_databases_persist_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}", dir.path().join("data.db").display());

        let manager = Manager::sqlite();
        {
            let swirl = manager.bind(&url).unwrap();
            seed_people(&swirl).await;
        }

        let swirl = manager.bind(&url).unwrap();
        let rows: Vec<(i64, String)> = swirl
            .run(&Query::table("person").select(["id", "firstname"]).result())
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[tokio::test]
    async fn binding_reports_missing_pieces_before_connecting() {
        let mut driver_only = Manager::new();
        driver_only.register_driver(Arc::new(SqliteDriver::new()));
        let err = driver_only.bind("sqlite::memory:").unwrap_err();
        assert!(matches!(err, DbError::NoDialect(scheme) if scheme == "sqlite"));

        let err = Manager::sqlite().bind("postgres://nope").unwrap_err();
        assert!(matches!(err, DbError::NoDriver(scheme) if scheme == "postgres"));

        let err = Manager::sqlite().bind("::nope").unwrap_err();
        assert!(matches!(err, DbError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn write_over_a_join_is_a_compile_error() {
        let swirl = memory();
        let joined = Query::from(Query::table("a")).zip(Query::table("b"));
        let err = swirl.run(&joined.delete()).await.unwrap_err();
        assert!(matches!(err, DbError::Compile(_)));
    }

    struct FakeConnection;

    impl Connection for FakeConnection {
        fn execute(&self, _sql: Sql) -> BoxFuture<'static, Result<ExecResult>> {
            async { Ok(ExecResult::Done { affected: 0 }) }.boxed()
        }
    }

    #[tokio::test]
    async fn pool_reuses_idle_connections() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let pool = Pool::new(PoolOptions { max_connections: 2 }, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FakeConnection) as Arc<dyn Connection>)
        });

        drop(pool.acquire().await.unwrap());
        drop(pool.acquire().await.unwrap());
        assert_eq!(opened.load(Ordering::SeqCst), 1);

        let first = pool.acquire().await.unwrap();
        let second = pool.acquire().await.unwrap();
        assert_eq!(opened.load(Ordering::SeqCst), 2);
        drop(first);
        drop(second);
    }

    struct FailingConnection;

    impl Connection for FailingConnection {
        fn execute(&self, _sql: Sql) -> BoxFuture<'static, Result<ExecResult>> {
            async { Err(DbError::Execute("connection lost".to_string())) }.boxed()
        }
    }

    #[tokio::test]
    async fn pool_discards_connections_after_a_failed_statement() {
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opened);
        let pool = Pool::new(PoolOptions { max_connections: 1 }, move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(FailingConnection) as Arc<dyn Connection>)
        });

        let conn = pool.acquire().await.unwrap();
        assert!(conn.execute(Sql::new("SELECT 1")).await.is_err());
        drop(conn);

        // the failed connection must not be recycled
        drop(pool.acquire().await.unwrap());
        assert_eq!(opened.load(Ordering::SeqCst), 2);
    }
}
