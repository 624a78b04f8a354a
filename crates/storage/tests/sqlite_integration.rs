use storage::repository::{ProgressRepository, Storage};
use storage::sqlite::SqliteRepository;
use study_core::model::{CardId, Grade, ProgressRecord, StudySettings};
use study_core::review::apply_review;
use study_core::time::fixed_now_ms;

fn id(s: &str) -> CardId {
    CardId::new(s).unwrap()
}

#[tokio::test]
async fn sqlite_roundtrip_persists_full_record() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let now = fixed_now_ms();
    let settings = StudySettings::default();
    let failed = apply_review(None, Grade::Fail, now, &settings);
    let record = apply_review(Some(&failed), Grade::Pass, now + 1_000, &settings);

    repo.set(&id("你好|nǐ hǎo"), &record).await.unwrap();

    let fetched = repo.get(&id("你好|nǐ hǎo")).await.unwrap().expect("stored");
    assert_eq!(fetched, record);
    assert_eq!(fetched.last_grade, Some(Grade::Pass));
    assert_eq!(fetched.fails, 1);
    assert_eq!(fetched.interval_days, 1);
}

#[tokio::test]
async fn sqlite_upsert_is_last_writer_wins() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_upsert?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    let first = ProgressRecord {
        weight: 6.04,
        fails: 2,
        ..ProgressRecord::default()
    };
    let second = ProgressRecord {
        weight: 3.77,
        fails: 2,
        streak: 1,
        ..ProgressRecord::default()
    };
    repo.set(&id("a"), &first).await.unwrap();
    repo.set(&id("a"), &second).await.unwrap();
    repo.set(&id("b"), &first).await.unwrap();

    let all = repo.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[&id("a")], second);
    assert_eq!(all[&id("b")], first);
    assert!(repo.get(&id("c")).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.migrate().await.expect("second migrate");

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn sqlite_malformed_columns_read_leniently() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_lenient?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    sqlx::query(
        r"
            INSERT INTO progress (
                card_id, weight, interval_days, streak, fails, pass_count,
                fail_streak, pass_streak, due_at_ms, last_grade, last_seen_at_ms
            )
            VALUES ('broken', -4.0, -1, 3, -7, 2, 0, 1, -500, 'meh', -1)
        ",
    )
    .execute(repo.pool())
    .await
    .unwrap();

    let rec = repo.get(&id("broken")).await.unwrap().expect("row");
    assert_eq!(rec.interval_days, 0);
    assert_eq!(rec.streak, 3);
    assert_eq!(rec.fails, 0);
    assert_eq!(rec.pass_count, 2);
    assert_eq!(rec.due_at_ms, 0);
    assert_eq!(rec.last_grade, None);
    assert_eq!(rec.last_seen_at_ms, 0);
    assert_eq!(study_core::weight::weight_of(Some(&rec)), 1.0);
}

#[tokio::test]
async fn storage_sqlite_runs_migrations() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage
        .progress
        .set(&id("x"), &ProgressRecord::default())
        .await
        .unwrap();
    assert_eq!(storage.progress.get_all().await.unwrap().len(), 1);
}
