//! End-to-end flow over the in-memory collaborators: accounts, submission,
//! voting, triage, live views, export and account deletion.

use std::sync::Arc;

use grievance_desk::aggregate::GrievanceFilter;
use grievance_desk::auth::{AccountService, InMemoryIdentityProvider, Landing, SessionStore};
use grievance_desk::export::to_csv;
use grievance_desk::feed::{AdminView, DashboardView, GrievanceFeed};
use grievance_desk::lifecycle::GrievanceService;
use grievance_desk::model::{GrievanceDraft, GrievanceStatus, SubmitterDetails, UserDetails};
use grievance_desk::repository::{DocumentRepository, GrievanceStore, InMemoryRepository};
use grievance_desk::DeskError;

const ADMIN: &str = "admin@bolobharat.com";

struct Desk {
    repo: Arc<InMemoryRepository>,
    provider: Arc<InMemoryIdentityProvider>,
    accounts: AccountService,
    grievances: GrievanceService,
    store: GrievanceStore,
}

fn desk() -> Desk {
    let repo = Arc::new(InMemoryRepository::new());
    let provider = Arc::new(InMemoryIdentityProvider::new());
    let admins = vec![ADMIN.to_string()];
    let accounts = AccountService::new(provider.clone(), repo.clone(), &admins);
    let store = GrievanceStore::new(repo.clone());
    Desk {
        repo,
        provider,
        accounts,
        grievances: GrievanceService::new(store.clone()),
        store,
    }
}

fn draft(domain: &str, title: &str, details: SubmitterDetails) -> GrievanceDraft {
    GrievanceDraft {
        domain: domain.to_string(),
        problem_title: title.to_string(),
        description: format!("{} since last week", title),
        preferred_language: "hindi".to_string(),
        submitter_details: details,
    }
}

#[tokio::test]
async fn test_citizen_to_admin_flow() {
    let desk = desk();
    let admins = vec![ADMIN.to_string()];
    let session = SessionStore::new(desk.provider.as_ref(), &admins);
    assert!(session.current().is_none());

    // Citizens register and file grievances
    let ravi = desk.accounts.register("ravi@example.com", "secret1").await.unwrap();
    let asha = desk.accounts.register("asha@example.com", "secret1").await.unwrap();
    assert_eq!(session.require_current().unwrap().id, asha.id);

    desk.accounts
        .save_user_details(
            &asha,
            &UserDetails {
                name: "Asha".into(),
                phone: "9800000000".into(),
            },
        )
        .await
        .unwrap();
    let details = desk.accounts.submitter_details(&asha).await.unwrap();
    let leak = desk
        .grievances
        .submit(Some(&asha), draft("Water Supply", "Pipe leak", details))
        .await
        .unwrap();

    let ravi_details = desk.accounts.submitter_details(&ravi).await.unwrap();
    let bus = desk
        .grievances
        .submit(Some(&ravi), draft("Transport", "Bus late", ravi_details))
        .await
        .unwrap();

    // Live views follow the repository
    let mut admin_feed = GrievanceFeed::<AdminView>::spawn(&desk.store, GrievanceFilter::default())
        .await
        .unwrap();
    let mut dashboard = GrievanceFeed::<DashboardView>::spawn(&desk.store, asha.id.clone())
        .await
        .unwrap();
    assert_eq!(desk.repo.subscriber_count(), 2);

    let view = admin_feed.changed().await.unwrap();
    assert_eq!(view.total, 2);
    let mine = dashboard.changed().await.unwrap();
    assert_eq!(mine.mine.len(), 1);
    assert_eq!(mine.mine[0].id, leak);
    assert_eq!(mine.others[0].id, bus);

    // Ravi endorses Asha's grievance, twice; Asha cannot endorse her own
    desk.grievances.cast_vote(&ravi, &asha.id, &leak).await.unwrap();
    desk.grievances.cast_vote(&ravi, &asha.id, &leak).await.unwrap();
    let err = desk
        .grievances
        .cast_vote(&asha, &asha.id, &leak)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::SelfVote { .. }));

    // Citizens cannot triage
    let err = desk
        .grievances
        .change_status(&asha, &asha.id, &leak, GrievanceStatus::Resolved)
        .await
        .unwrap_err();
    assert!(matches!(err, DeskError::Authorization(_)));

    // The administrator lands on the console and moves the grievance along
    let outcome = desk.accounts.login(ADMIN, "secret1").await;
    assert!(outcome.is_err());
    desk.accounts.register(ADMIN, "secret1").await.unwrap();
    let outcome = desk.accounts.login(ADMIN, "secret1").await.unwrap();
    assert_eq!(outcome.landing, Landing::AdminConsole);
    assert!(session.current().unwrap().is_admin());

    let admin = outcome.actor;
    desk.grievances
        .change_status(&admin, &asha.id, &leak, GrievanceStatus::BeingStudied)
        .await
        .unwrap();
    let updated = desk
        .grievances
        .change_status(&admin, &asha.id, &leak, GrievanceStatus::Resolved)
        .await
        .unwrap();
    assert_eq!(updated.status_history.len(), 2);
    assert_eq!(updated.status_history[0].previous_status, GrievanceStatus::Pending);
    assert_eq!(
        updated.status_history[1].previous_status,
        GrievanceStatus::BeingStudied
    );
    assert_eq!(updated.vote_count(), 1);

    admin_feed.set_params(GrievanceFilter {
        status: Some(GrievanceStatus::Resolved),
        ..Default::default()
    });
    let view = loop {
        let view = admin_feed.changed().await.unwrap();
        if view.grievances.len() == 1 && view.grievances[0].id == leak {
            break view;
        }
    };
    assert_eq!(view.total, 2);

    // Export carries every grievance
    let all = desk.grievances.list_all().await.unwrap();
    let csv = to_csv(&all);
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.contains("Water Supply,Pipe leak,Pipe leak since last week,Resolved,"));
    assert!(csv
        .lines()
        .any(|l| l.starts_with("Transport,Bus late,") && l.contains(",Pending,")));

    // Asha deletes her account; her grievances disappear from the views
    desk.accounts.login("asha@example.com", "secret1").await.unwrap();
    desk.accounts.delete_account(&asha).await.unwrap();
    assert!(desk
        .repo
        .read(&format!("grievances/{}", asha.id))
        .await
        .unwrap()
        .is_none());

    let mine = loop {
        let view = dashboard.changed().await.unwrap();
        if view.mine.is_empty() {
            break view;
        }
    };
    assert_eq!(mine.others.len(), 1);

    admin_feed.close().await;
    dashboard.close().await;
    assert_eq!(desk.repo.subscriber_count(), 0);
}

#[tokio::test]
async fn test_unauthenticated_submission_is_rejected() {
    let desk = desk();
    let err = desk
        .grievances
        .submit(None, draft("Health", "Clinic closed", Default::default()))
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "User not authenticated. Please log in.");
    assert!(desk.store.list_all().await.unwrap().is_empty());
}

#[test]
fn test_repository_outage_surfaces_retry_prompt() {
    let desk = desk();
    tokio_test::block_on(async {
        let asha = desk.accounts.register("asha@example.com", "secret1").await.unwrap();
        desk.repo.set_fail_writes(true);
        let err = desk
            .grievances
            .submit(Some(&asha), draft("Health", "Clinic closed", Default::default()))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.user_message(), "Something went wrong. Please try again.");
    });
}
