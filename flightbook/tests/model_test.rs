use chrono::NaiveDate;
use flightbook::database::{self, Booking, Expansion, Post, User};
use flightbook::seed;
use flightbook_orm::{Database, Pagination};

const COST: u32 = 4;

async fn setup() -> Database {
    let _ = env_logger::builder().is_test(true).try_init();
    let db = Database::builder().max_connections(1).connect("sqlite::memory:").await.unwrap();
    database::migrate(&db).await.unwrap();
    db
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn edison(db: &Database) -> User {
    User::new("Thomas Edison", "toby", "123toby", date(1847, 2, 11), COST).unwrap().create(db).await.unwrap()
}

#[tokio::test]
async fn test_user_round_trip() {
    let db = setup().await;
    let user = edison(&db).await;
    assert_eq!(user.id(), Some(1));

    let fetched = User::find_by_uid(&db, "toby").await.unwrap().unwrap();
    assert_eq!(fetched.snapshot(), user.snapshot());
    assert_eq!(fetched.dob(), "02-11-1847");
    assert!(fetched.is_password("123toby"));
    assert!(fetched.is_uid("toby"));

    assert!(User::find_by_uid(&db, "niko").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_uid_is_tagged() {
    let db = setup().await;
    edison(&db).await;

    let err = User::new("Impostor", "toby", "pw", database::today(), COST).unwrap().create(&db).await.unwrap_err();
    assert!(err.is_duplicate());
    assert_eq!(User::all(&db, None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_user_update_skips_empty_values() {
    let db = setup().await;
    let mut user = edison(&db).await;

    user.update(&db, "", "", "", COST).await.unwrap();
    let same = User::find(&db, 1).await.unwrap().unwrap();
    assert_eq!(same.name(), "Thomas Edison");
    assert!(same.is_password("123toby"));

    user.update(&db, "Tom Edison", "", "newpass", COST).await.unwrap();
    let changed = User::find(&db, 1).await.unwrap().unwrap();
    assert_eq!(changed.name(), "Tom Edison");
    assert_eq!(changed.uid(), "toby");
    assert!(changed.is_password("newpass"));
    assert!(!changed.is_password("123toby"));
}

#[tokio::test]
async fn test_booking_update_and_relink() {
    let db = setup().await;
    let user = edison(&db).await;

    let mut booking = Booking::new("B1", "Ada", "ada1").create(&db).await.unwrap();
    assert_eq!(booking.user_id(), None);

    booking.update(&db, "", "", "").await.unwrap();
    assert_eq!(Booking::find(&db, "B1").await.unwrap().unwrap(), booking);

    booking.update(&db, "Ada Lovelace", "toby", "SFO").await.unwrap();
    let fetched = Booking::find(&db, "B1").await.unwrap().unwrap();
    assert_eq!(fetched.travelername(), "Ada Lovelace");
    assert_eq!(fetched.destination(), "SFO");
    assert_eq!(fetched.uid(), "toby");
    assert_eq!(fetched.user_id(), user.id());
    assert_eq!(fetched.read(), booking.read());

    let before = booking.read();
    let too_long = booking.update(&db, "Someone Else", "", "Llanfairpwllgwyngyll Station").await;
    assert!(too_long.is_err());
    assert_eq!(booking.read(), before);
    assert_eq!(Booking::find(&db, "B1").await.unwrap().unwrap().read(), before);
}

#[tokio::test]
async fn test_rejected_user_update_keeps_state() {
    let db = setup().await;
    let mut user = edison(&db).await;
    User::new("Nicholas Teslo", "niko", "123niko", database::today(), COST).unwrap().create(&db).await.unwrap();

    let err = user.update(&db, "Tom", "niko", "", COST).await.unwrap_err();
    assert!(err.is_duplicate());
    assert_eq!(user.name(), "Thomas Edison");
    assert_eq!(user.uid(), "toby");

    let stored = User::find(&db, user.id().unwrap()).await.unwrap().unwrap();
    assert_eq!(stored.snapshot(), user.snapshot());
}

#[tokio::test]
async fn test_uid_rename_follows_to_bookings() {
    let db = setup().await;
    let mut user = edison(&db).await;
    Booking::new("E1", "Thomas Edison", "toby").create(&db).await.unwrap();
    Booking::new("A1", "Ada", "ada1").create(&db).await.unwrap();

    user.update(&db, "", "tom2", "", COST).await.unwrap();

    let renamed = Booking::find(&db, "E1").await.unwrap().unwrap();
    assert_eq!(renamed.uid(), "tom2");
    assert_eq!(renamed.user_id(), user.id());
    assert_eq!(Booking::find(&db, "A1").await.unwrap().unwrap().uid(), "ada1");
}

#[tokio::test]
async fn test_bookings_for_user_sort_ids_as_text() {
    let db = setup().await;
    let user = edison(&db).await;
    for id in ["2", "10", "1"] {
        Booking::new(id, "Thomas Edison", "toby").create(&db).await.unwrap();
    }

    let ids: Vec<String> = Booking::for_user(&db, user.id().unwrap(), None)
        .await
        .unwrap()
        .iter()
        .map(|b| b.bookingid().to_string())
        .collect();
    assert_eq!(ids, vec!["1", "10", "2"]);
}

#[tokio::test]
async fn test_delete_cascades_to_posts_and_bookings() {
    let db = setup().await;
    let user = edison(&db).await;
    let user_id = user.id().unwrap();
    let other = User::new("Eli Whitney", "whit", "123whit", database::today(), COST).unwrap().create(&db).await.unwrap();

    Post::new(user_id, "phonograph", None).create(&db).await.unwrap();
    Post::new(other.id().unwrap(), "cotton gin", None).create(&db).await.unwrap();
    Booking::new("E1", "Thomas Edison", "toby").create(&db).await.unwrap();
    Booking::new("W1", "Eli Whitney", "whit").create(&db).await.unwrap();

    user.delete(&db).await.unwrap();

    assert!(User::find(&db, user_id).await.unwrap().is_none());
    assert!(Post::for_user(&db, user_id, None).await.unwrap().is_empty());
    let left: Vec<String> = Booking::all(&db).await.unwrap().iter().map(|b| b.bookingid().to_string()).collect();
    assert_eq!(left, vec!["W1".to_string()]);
}

#[tokio::test]
async fn test_post_requires_existing_user() {
    let db = setup().await;
    let err = Post::new(42, "orphan", None).create(&db).await.unwrap_err();
    assert!(err.is_constraint_violation());
    assert!(!err.is_duplicate());
}

#[tokio::test]
async fn test_read_expands_children_on_request() {
    let db = setup().await;
    let uploads = tempfile::tempdir().unwrap();
    std::fs::write(uploads.path().join("logo.png"), b"png").unwrap();

    let user = edison(&db).await;
    let user_id = user.id().unwrap();
    for n in 0..3 {
        Post::new(user_id, &format!("note {}", n), Some("logo.png")).create(&db).await.unwrap();
        Booking::new(&format!("E{}", n), "Thomas Edison", "toby").create(&db).await.unwrap();
    }

    let bare = user.read(&db, uploads.path(), Expansion::None).await.unwrap();
    assert!(bare.posts.is_empty() && bare.bookings.is_empty());

    let page = user.read(&db, uploads.path(), Expansion::Page(Pagination::new(0, 2))).await.unwrap();
    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.bookings.len(), 2);

    let all = user.read(&db, uploads.path(), Expansion::All).await.unwrap();
    assert_eq!(all.posts.len(), 3);
    assert_eq!(all.bookings.len(), 3);
    assert_eq!(all.posts[0].note, "note 0");
    assert_eq!(all.posts[0].base64, "cG5n");
    assert_eq!(all.bookings[2].bookingid, "E2");
}

#[tokio::test]
async fn test_read_fails_on_missing_image() {
    let db = setup().await;
    let uploads = tempfile::tempdir().unwrap();
    let user = edison(&db).await;
    Post::new(user.id().unwrap(), "lost", Some("missing.png")).create(&db).await.unwrap();

    let err = user.read(&db, uploads.path(), Expansion::All).await.unwrap_err();
    assert!(matches!(err, flightbook::Error::Io(_)));
}

#[tokio::test]
async fn test_seed_creates_sample_users() {
    let db = setup().await;
    Booking::new("stale", "Old", "old").create(&db).await.unwrap();

    let created = seed::init_users(&db, COST).await.unwrap();
    assert_eq!(created, 5);

    let users = User::all(&db, None).await.unwrap();
    let uids: Vec<&str> = users.iter().map(User::uid).collect();
    assert_eq!(uids, vec!["toby", "niko", "lex", "whit", "jm1021"]);
    assert!(users[0].is_password("123toby"));
    assert!(users[4].is_password(User::DEFAULT_PASSWORD));
    assert_eq!(users[4].dob(), "10-21-1959");

    let bookings = Booking::all(&db).await.unwrap();
    assert!(bookings.iter().all(|b| b.bookingid() != "stale"));

    let mut notes = 0;
    for user in &users {
        let posts = Post::for_user(&db, user.id().unwrap(), None).await.unwrap();
        assert!((1..=3).contains(&posts.len()));
        assert_eq!(posts[0].note(), seed::sample_note(user.name(), 0));
        assert_eq!(posts[0].image(), Some(seed::SAMPLE_IMAGE));
        assert_eq!(Booking::for_user(&db, user.id().unwrap(), None).await.unwrap().len(), posts.len());
        notes += posts.len();
    }
    assert_eq!(bookings.len(), notes);
    assert!(bookings.iter().all(|b| b.destination() == "LAX"));
}
