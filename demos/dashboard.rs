//! Multi-source dashboard demo.
//!
//! Simulates a screen that loads a user profile and a repository list from
//! two independent fetches, aggregates them with the standard rules, and
//! retries after a simulated failure.
//!
//! Run with: cargo run --example dashboard

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use statuswatch::{
    AnyLoadable, FutureSource, GroupStatus, GroupStatusModel, GroupStatusRule, LoadError,
    Loadable,
};
use tokio::time::sleep;

#[derive(Clone, Debug)]
struct Profile {
    login: String,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    println!("Statuswatch Dashboard Demo");
    println!("==========================\n");

    // The profile fetch is reliable but slow.
    let profile = FutureSource::new(|| async {
        sleep(Duration::from_millis(300)).await;
        Ok(Profile {
            login: "octocat".to_string(),
        })
    });

    // The repository fetch fails on its first attempt.
    let attempts = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&attempts);
    let repos = FutureSource::new(move || {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            sleep(Duration::from_millis(100)).await;
            if attempt == 0 {
                Err(LoadError::source("repository service unavailable"))
            } else {
                Ok(vec!["statuswatch".to_string(), "octoverse".to_string()])
            }
        }
    });

    let model = GroupStatusModel::new(
        vec![
            Arc::clone(&profile) as AnyLoadable,
            Arc::clone(&repos) as AnyLoadable,
        ],
        vec![
            GroupStatusRule::Error,
            GroupStatusRule::Loading,
            GroupStatusRule::AllData,
        ],
    );

    let mut statuses = model.subscribe();
    let mut retried = false;

    while let Some(status) = statuses.next().await {
        match status {
            Some(GroupStatus::Loading) => println!("[screen] loading..."),
            Some(GroupStatus::Error(error)) => {
                println!("[screen] error: {}", error.user_message());
                if model.can_try_again() && !retried {
                    retried = true;
                    println!("[screen] pressing the retry button");
                    model.reload_all();
                }
            }
            Some(GroupStatus::Data) => {
                let profile = profile.state().content.expect("profile loaded");
                let repos = repos.state().content.expect("repos loaded");
                println!("[screen] {} has {} repositories:", profile.login, repos.len());
                for name in repos {
                    println!("         - {name}");
                }
                break;
            }
            None => println!("[screen] undetermined (no rule matched)"),
        }
    }
}
