use gatepost::posts::{Post, PostStore, sqlite::SqlitePosts};
use smallvec::{SmallVec, smallvec};

fn post(date: &str, title: &str, body: &str, refs: &[&str]) -> Post {
    Post {
        date: date.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        image_refs: refs.iter().map(|s| s.to_string()).collect(),
    }
}

#[tokio::test]
async fn append_assigns_sequential_numbers() {
    let store = SqlitePosts::new("sqlite::memory:").await.unwrap();
    assert_eq!(store.append(&post("2025-06-01 09:00", "A", "a", &[])).await.unwrap(), 1);
    assert_eq!(store.append(&post("2025-06-01 10:00", "B", "b", &[])).await.unwrap(), 2);
    assert_eq!(store.append(&post("2025-06-01 11:00", "C", "c", &[])).await.unwrap(), 3);
}

#[tokio::test]
async fn reversed_listing_is_newest_first() {
    let store = SqlitePosts::new("sqlite::memory:").await.unwrap();
    for title in ["A", "B", "C"] {
        store.append(&post("2025-06-01 09:00", title, "body", &[])).await.unwrap();
    }

    let titles: Vec<String> = store
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .rev()
        .map(|(_, p)| p.title)
        .collect();
    assert_eq!(titles, vec!["C", "B", "A"]);
}

#[tokio::test]
async fn round_trip_preserves_every_field_verbatim() {
    let store = SqlitePosts::new("sqlite::memory:").await.unwrap();
    let original = post(
        "2025-06-01 09:30",
        "Daily wrap",
        "Body with markup **bold** and\nseveral lines.\n",
        &["https://img.example/1.png", "https://img.example/2.png"],
    );
    store.append(&original).await.unwrap();

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].1, original);
}

#[tokio::test]
async fn nothing_is_validated_on_append() {
    let store = SqlitePosts::new("sqlite::memory:").await.unwrap();
    // Duplicate titles and an empty body are stored as given.
    store.append(&post("2025-06-01 09:00", "Same", "", &[])).await.unwrap();
    store.append(&post("2025-06-01 09:00", "Same", "", &[])).await.unwrap();

    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].1.title, listed[1].1.title);
    assert_eq!(listed[0].1.body, "");
}

#[tokio::test]
async fn empty_image_list_round_trips_empty() {
    let store = SqlitePosts::new("sqlite::memory:").await.unwrap();
    store.append(&post("2025-06-01 09:00", "A", "a", &[])).await.unwrap();

    let (_, fetched) = store.list_all().await.unwrap().remove(0);
    let expected: SmallVec<[String; 4]> = smallvec![];
    assert_eq!(fetched.image_refs, expected);
}

#[tokio::test]
async fn get_by_number() {
    let store = SqlitePosts::new("sqlite::memory:").await.unwrap();
    store.append(&post("2025-06-01 09:00", "A", "first", &[])).await.unwrap();
    store.append(&post("2025-06-01 10:00", "B", "second", &[])).await.unwrap();

    let fetched = store.get(2).await.unwrap().expect("post exists");
    assert_eq!(fetched.body, "second");
    assert!(store.get(99).await.unwrap().is_none());
}
