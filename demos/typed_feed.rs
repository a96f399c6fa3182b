//! Typed-view demo.
//!
//! A raw JSON source (as a data layer would expose it) is presented to the
//! rest of the program as two typed views sharing one upstream, and a
//! two-source `ready2` waits for a post list and its author together.
//!
//! Run with: cargo run --example typed_feed

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use statuswatch::{ready2, JsonSource, Loadable, SourceCell, TransformedSource};
use tokio::time::sleep;

#[derive(Clone, Debug, Deserialize)]
struct Post {
    title: String,
    likes: u64,
}

#[derive(Clone, Debug, Deserialize)]
struct Author {
    name: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    println!("Statuswatch Typed Feed Demo");
    println!("===========================\n");

    // Raw JSON cells, driven here by a simulated data layer.
    let raw_posts = Arc::new(SourceCell::<serde_json::Value>::new());
    let raw_author = Arc::new(SourceCell::<serde_json::Value>::new());

    let data_layer = tokio::spawn({
        let raw_posts = Arc::clone(&raw_posts);
        let raw_author = Arc::clone(&raw_author);
        async move {
            raw_posts.begin_load();
            raw_author.begin_load();
            sleep(Duration::from_millis(100)).await;
            raw_author.supply(json!({ "name": "Grace" }));
            sleep(Duration::from_millis(100)).await;
            raw_posts.supply(json!([
                { "title": "On aggregating loadables", "likes": 12 },
                { "title": "Combine-latest in practice", "likes": 7 },
            ]));
        }
    });

    // Typed views over the raw cells.
    let posts: Arc<JsonSource<_, Vec<Post>>> = Arc::new(JsonSource::new(Arc::clone(&raw_posts)));
    let author: JsonSource<_, Author> = JsonSource::new(Arc::clone(&raw_author));

    // A derived view of the same upstream: total likes, no re-fetch.
    let total_likes = TransformedSource::new(Arc::clone(&posts), |posts: Option<Vec<Post>>| {
        posts.map(|p| p.iter().map(|post| post.likes).sum::<u64>())
    });

    match ready2(&*posts, &author).await {
        Ok((posts, author)) => {
            println!("{} posted:", author.name);
            for post in posts {
                println!("  - {} ({} likes)", post.title, post.likes);
            }
            println!(
                "total likes: {}",
                total_likes.state().content.unwrap_or_default()
            );
        }
        Err(error) => println!("failed to load feed: {}", error.user_message()),
    }

    data_layer.await.expect("data layer task");
}
