//! End-to-end tests driving sources and a group model the way a screen would.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use statuswatch::{
    ready2, AnyLoadable, FutureSource, GroupStatus, GroupStatusModel, GroupStatusRule,
    JsonSource, LoadError, Loadable, SourceCell, StatusStream, TransformedSource,
};

async fn wait_for(stream: &mut StatusStream, expected: Option<GroupStatus>) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(status) = stream.next().await {
            if status == expected {
                return;
            }
        }
        panic!("status stream ended before reaching {expected:?}");
    })
    .await
    .expect("timed out waiting for expected status");
}

#[tokio::test]
async fn screen_lifecycle_with_standard_rules() {
    let posts = Arc::new(SourceCell::<Vec<String>>::new());
    let profile = Arc::new(SourceCell::<String>::new());

    let model = GroupStatusModel::new(
        vec![
            Arc::clone(&posts) as AnyLoadable,
            Arc::clone(&profile) as AnyLoadable,
        ],
        GroupStatusRule::STANDARD.to_vec(),
    );
    let mut statuses = model.subscribe();

    // Both sources idle and empty: the standard rules have no match yet.
    assert_eq!(model.status(), None);

    // Fetches begin.
    posts.begin_load();
    profile.begin_load();
    wait_for(&mut statuses, Some(GroupStatus::Loading)).await;

    // The first result arrives; standard rules prefer partial data over a
    // spinner even though the profile is still loading.
    posts.supply(vec!["first post".into()]);
    wait_for(&mut statuses, Some(GroupStatus::Data)).await;

    // The profile fetch fails, but data is still the preferred display.
    profile.fail(LoadError::source("profile fetch failed"));
    assert_eq!(model.status(), Some(GroupStatus::Data));
}

#[tokio::test]
async fn error_first_rules_surface_failures() {
    let posts = Arc::new(SourceCell::<Vec<String>>::new());
    let profile = Arc::new(SourceCell::<String>::new());

    let model = GroupStatusModel::new(
        vec![
            Arc::clone(&posts) as AnyLoadable,
            Arc::clone(&profile) as AnyLoadable,
        ],
        vec![
            GroupStatusRule::Error,
            GroupStatusRule::Loading,
            GroupStatusRule::AllData,
        ],
    );
    let mut statuses = model.subscribe();

    posts.supply(vec!["cached".into()]);
    profile.fail(LoadError::source("boom"));
    wait_for(
        &mut statuses,
        Some(GroupStatus::Error(LoadError::source("boom"))),
    )
    .await;

    // Recovery is an explicit caller action observed through the stream.
    profile.supply("profile".into());
    wait_for(&mut statuses, Some(GroupStatus::Data)).await;
}

#[tokio::test]
async fn try_again_round_trip() {
    // The reload hook notifies a simulated external data layer, which
    // answers by failing the first attempt and satisfying the retry.
    let (reload_tx, mut reload_rx) = tokio::sync::mpsc::unbounded_channel::<()>();
    let source = Arc::new(SourceCell::<String>::new().with_reloader(move || {
        let _ = reload_tx.send(());
    }));

    let data_layer = tokio::spawn({
        let source = Arc::clone(&source);
        async move {
            let mut attempts = 0usize;
            while reload_rx.recv().await.is_some() {
                attempts += 1;
                source.begin_load();
                if attempts == 1 {
                    source.fail(LoadError::source("first attempt failed"));
                } else {
                    source.supply("second attempt".into());
                    break;
                }
            }
            attempts
        }
    });

    let model = GroupStatusModel::new(
        vec![Arc::clone(&source) as AnyLoadable],
        vec![GroupStatusRule::Error, GroupStatusRule::AlwaysData],
    );
    let mut statuses = model.subscribe();
    assert!(model.can_try_again());

    model.try_again();
    wait_for(
        &mut statuses,
        Some(GroupStatus::Error(LoadError::source("first attempt failed"))),
    )
    .await;

    // The retry fires because the source still has no content: a lingering
    // error does not count as freshness.
    model.try_again();
    wait_for(&mut statuses, Some(GroupStatus::Data)).await;
    assert_eq!(data_layer.await.unwrap(), 2);
}

#[tokio::test]
async fn typed_pipeline_over_raw_json() {
    #[derive(Clone, Debug, Deserialize, PartialEq)]
    struct Repo {
        name: String,
        stars: u64,
    }

    // Raw JSON arrives from some external layer.
    let raw = Arc::new(SourceCell::with_content(json!([
        { "name": "statuswatch", "stars": 7 },
        { "name": "other", "stars": 3 },
    ])));

    // One typed view and one derived view over the same upstream.
    let repos: Arc<JsonSource<_, Vec<Repo>>> = Arc::new(JsonSource::new(Arc::clone(&raw)));
    let star_total = TransformedSource::new(Arc::clone(&repos), |repos: Option<Vec<Repo>>| {
        repos.map(|r| r.iter().map(|repo| repo.stars).sum::<u64>())
    });

    assert_eq!(star_total.state().content, Some(10));

    // A later payload of the wrong shape degrades to a content-type error,
    // which every derived view mirrors alongside its absent content.
    raw.supply(json!("not a repo list"));
    assert_eq!(
        repos.state().latest_error,
        Some(LoadError::WrongContentType)
    );
    let state = star_total.state();
    assert!(state.content.is_none());
    assert_eq!(state.latest_error, Some(LoadError::WrongContentType));
}

#[tokio::test]
async fn ready2_with_simulated_fetches() {
    let user = FutureSource::new(|| async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Ok("octocat".to_string())
    });
    let repos = FutureSource::new(|| async {
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(vec!["statuswatch".to_string()])
    });

    let (user, repos) = ready2(&*user, &*repos).await.unwrap();
    assert_eq!(user, "octocat");
    assert_eq!(repos, vec!["statuswatch".to_string()]);
}

#[tokio::test]
async fn dropping_the_model_ends_its_status_stream() {
    let cell = Arc::new(SourceCell::with_content(1));
    let model = GroupStatusModel::new(
        vec![Arc::clone(&cell) as AnyLoadable],
        GroupStatusRule::DATA_ONLY.to_vec(),
    );
    let mut statuses = model.subscribe();
    assert_eq!(statuses.next().await, Some(Some(GroupStatus::Data)));

    drop(model);
    let end = tokio::time::timeout(Duration::from_secs(5), async {
        while let Some(_status) = statuses.next().await {}
    })
    .await;
    assert!(end.is_ok(), "stream should end once the model is dropped");
}
