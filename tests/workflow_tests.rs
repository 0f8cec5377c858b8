use course_portal::{
    MemoryRepository, enrollment,
    models::{AddCartItemRequest, CreateClassRequest, ProcessPaymentRequest},
    repository::{Repository, RepositoryState},
};
use std::sync::Arc;
use uuid::Uuid;

async fn seeded_class(repo: &Arc<MemoryRepository>, seats: i32) -> Uuid {
    repo.create_class(CreateClassRequest {
        name: "Guitar".to_string(),
        image: "g.jpg".to_string(),
        instructor_name: None,
        instructor_email: "i@x.com".to_string(),
        price: 80.0,
        available_seats: seats,
    })
    .await
    .id
}

async fn staged_cart_item(repo: &Arc<MemoryRepository>, email: &str, class_id: Uuid) -> Uuid {
    repo.add_cart_item(AddCartItemRequest {
        email: email.to_string(),
        class_id,
        class_name: None,
        price: 80.0,
    })
    .await
    .id
}

#[tokio::test]
async fn test_workflow_returns_all_three_acknowledgements() {
    let repo = Arc::new(MemoryRepository::new());
    let class_id = seeded_class(&repo, 5).await;
    let c1 = staged_cart_item(&repo, "b@x.com", class_id).await;
    let c2 = staged_cart_item(&repo, "b@x.com", class_id).await;
    let state = repo.clone() as RepositoryState;

    let outcome = enrollment::process_payment(
        &state,
        ProcessPaymentRequest {
            email: "b@x.com".to_string(),
            transaction_id: "txn_w1".to_string(),
            amount: 160.0,
            cart_items: vec![c1, c2],
            class_items: vec![class_id],
        },
    )
    .await;

    assert_eq!(outcome.payment.email, "b@x.com");
    assert_eq!(outcome.removed_cart_items, 2);
    assert_eq!(outcome.updated_classes, 1);
    assert_eq!(repo.get_class(class_id).await.unwrap().available_seats, 4);
    assert!(repo.get_cart_items("b@x.com").await.is_empty());
    assert_eq!(repo.get_payments("b@x.com").await.len(), 1);
}

#[tokio::test]
async fn test_workflow_records_payment_even_when_references_are_stale() {
    // Cart ids and class ids that point at nothing: the payment is still
    // inserted first and unconditionally, the later steps simply touch zero
    // documents. No rollback happens.
    let repo = Arc::new(MemoryRepository::new());
    let state = repo.clone() as RepositoryState;

    let outcome = enrollment::process_payment(
        &state,
        ProcessPaymentRequest {
            email: "b@x.com".to_string(),
            transaction_id: "txn_stale".to_string(),
            amount: 42.0,
            cart_items: vec![Uuid::new_v4()],
            class_items: vec![Uuid::new_v4()],
        },
    )
    .await;

    assert_eq!(outcome.removed_cart_items, 0);
    assert_eq!(outcome.updated_classes, 0);
    assert_eq!(repo.get_payments("b@x.com").await.len(), 1);
}

#[tokio::test]
async fn test_workflow_replay_drives_seats_negative() {
    let repo = Arc::new(MemoryRepository::new());
    let class_id = seeded_class(&repo, 1).await;
    let c1 = staged_cart_item(&repo, "b@x.com", class_id).await;
    let state = repo.clone() as RepositoryState;

    let req = ProcessPaymentRequest {
        email: "b@x.com".to_string(),
        transaction_id: "txn_r".to_string(),
        amount: 80.0,
        cart_items: vec![c1],
        class_items: vec![class_id],
    };

    enrollment::process_payment(&state, req.clone()).await;
    assert_eq!(repo.get_class(class_id).await.unwrap().available_seats, 0);

    // No idempotency key and no floor check: the replay decrements again.
    enrollment::process_payment(&state, req).await;
    assert_eq!(repo.get_class(class_id).await.unwrap().available_seats, -1);
    assert_eq!(repo.get_payments("b@x.com").await.len(), 2);
}

#[tokio::test]
async fn test_workflow_decrements_each_listed_class_once() {
    let repo = Arc::new(MemoryRepository::new());
    let a = seeded_class(&repo, 3).await;
    let b = seeded_class(&repo, 3).await;
    let state = repo.clone() as RepositoryState;

    enrollment::process_payment(
        &state,
        ProcessPaymentRequest {
            email: "b@x.com".to_string(),
            transaction_id: "txn_multi".to_string(),
            amount: 160.0,
            cart_items: vec![],
            class_items: vec![a, b],
        },
    )
    .await;

    assert_eq!(repo.get_class(a).await.unwrap().available_seats, 2);
    assert_eq!(repo.get_class(b).await.unwrap().available_seats, 2);
}
