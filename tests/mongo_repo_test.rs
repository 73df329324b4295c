// Runs against the MongoDB named in .env:
// cargo test --test mongo_repo_test -- --ignored
use bson::oid::ObjectId;
use leadhub_backend::config::mongo_conf::MongoConfig;
use leadhub_backend::model::newsletter::{NewsletterSubscriber, SubscriberStatus};
use leadhub_backend::model::now_timestamp;
use leadhub_backend::repository::lead_repo::{InsertOutcome, LeadRepository, ListFilter};
use leadhub_backend::repository::mongo_lead_repo::{connect_database, MongoLeadRepository};
use leadhub_backend::repository::repository_error::{RepositoryError, RepositoryResult};

async fn setup_newsletter_repository() -> RepositoryResult<MongoLeadRepository<NewsletterSubscriber>> {
    let _ = dotenv::dotenv();
    let config = MongoConfig::from_env()
        .map_err(|e| RepositoryError::database(format!("Failed to load MongoConfig: {}", e)))?;
    let database = connect_database(&config).await?;
    let repo = MongoLeadRepository::new(&database);
    repo.ensure_indexes().await?;
    Ok(repo)
}

fn subscriber(email: &str) -> NewsletterSubscriber {
    let now = now_timestamp();
    NewsletterSubscriber {
        id: None,
        email: email.to_string(),
        status: SubscriberStatus::Active,
        created_at: now.clone(),
        updated_at: now,
    }
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_newsletter_repository_workflow() {
    let repo = setup_newsletter_repository().await.expect("Failed to setup repository");
    let email = format!("it-{}@example.com", ObjectId::new().to_hex());

    let InsertOutcome::Inserted(created) = repo
        .insert_if_absent(subscriber(&email))
        .await
        .expect("Failed to insert subscriber")
    else {
        panic!("fresh email should be inserted");
    };
    let id = created.id.expect("inserted record has an id");

    // Same key again: the stored record comes back untouched
    let again = repo.insert_if_absent(subscriber(&email)).await.expect("upsert failed");
    assert_eq!(again, InsertOutcome::Existing(created.clone()));

    // The unique index backs the plain insert path too
    let err = repo.create(subscriber(&email)).await.unwrap_err();
    assert!(matches!(err, RepositoryError::AlreadyExists(_)));

    let changes = vec![("status", "unsubscribed".to_string())];
    let missed = repo
        .update_fields(id, Some(("status", "unsubscribed")), &changes)
        .await
        .expect("guarded update failed");
    assert!(missed.is_none());

    let updated = repo
        .update_fields(id, None, &changes)
        .await
        .expect("update failed")
        .expect("record should match");
    assert_eq!(updated.status, SubscriberStatus::Unsubscribed);
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let again = repo
        .update_fields(id, None, &changes)
        .await
        .expect("update failed")
        .expect("record should match");
    assert!(again.updated_at > updated.updated_at);

    let filter = ListFilter {
        equals: vec![("status", "unsubscribed".to_string()), ("email", email.clone())],
        skip: 0,
        limit: 10,
    };
    let listed = repo.list(&filter).await.expect("list failed");
    assert_eq!(listed.len(), 1);
    assert_eq!(repo.count(&filter).await.expect("count failed"), 1);

    repo.delete(id).await.expect("delete failed");
    assert!(matches!(repo.get_by_id(id).await, Err(RepositoryError::NotFound(_))));
}
